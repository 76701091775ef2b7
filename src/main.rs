mod app;
mod backlink_core;
mod panel_dom;

use app::App;

fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
