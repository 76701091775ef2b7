use leptos::task::spawn_local;

use leptos::prelude::*;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::backlink_core::{BacklinkSettings, SortOrder, SETTINGS_UPDATED_EVENT};
use crate::panel_dom;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["window", "__TAURI__", "core"])]
    async fn invoke(cmd: &str, args: JsValue) -> JsValue;
}

#[derive(Serialize)]
struct VaultPathArgs<'a> { vault_path: &'a str }
#[derive(Serialize)]
struct SaveSettingsArgs<'a> { vault_path: &'a str, settings: &'a str }

#[component]
pub fn App() -> impl IntoView {
    let (vault_path, set_vault_path) = signal(String::new());
    let (settings, set_settings) = signal(BacklinkSettings::default());

    // One reconciliation pass against whatever the document holds right
    // now. Overlapping passes are benign: the capability path is
    // idempotent and the click path only touches inactive controls.
    let run_reconcile = move || {
        let snapshot = settings.get_untracked();
        spawn_local(async move {
            let _ = panel_dom::reconcile_document(&snapshot).await;
        });
    };

    // Host lifecycle events arrive as DOM custom events forwarded by the
    // shell. The file-open payload is only a trigger, never read.
    let closure = Closure::<dyn FnMut(leptos::web_sys::CustomEvent)>::new(move |_e: leptos::web_sys::CustomEvent| {
        run_reconcile();
    });
    let _ = window().add_event_listener_with_callback("bedrock-layout-change", closure.as_ref().unchecked_ref());
    let _ = window().add_event_listener_with_callback("bedrock-file-open", closure.as_ref().unchecked_ref());
    closure.forget();

    // Settings saved from another window come back as a broadcast; swap
    // the record in and reapply immediately.
    let closure = Closure::<dyn FnMut(leptos::web_sys::CustomEvent)>::new(move |e: leptos::web_sys::CustomEvent| {
        if let Some(detail) = e.detail().as_string() {
            let next = BacklinkSettings::from_json(&detail);
            set_settings.set(next);
            spawn_local(async move {
                let _ = panel_dom::reconcile_document(&next).await;
            });
        }
    });
    let _ = window().add_event_listener_with_callback(SETTINGS_UPDATED_EVENT, closure.as_ref().unchecked_ref());
    closure.forget();

    let is_settings_window = window().location().search().unwrap_or_default().contains("settings=true");

    Effect::new(move |_| {
        spawn_local(async move {
            let path_val = invoke("resolve_vault", JsValue::NULL).await;
            if let Some(path_str) = path_val.as_string() {
                set_vault_path.set(path_str.clone());
                let vault_args = serde_wasm_bindgen::to_value(&VaultPathArgs { vault_path: &path_str }).unwrap();
                let s_val = invoke("load_backlink_settings", vault_args).await;
                if let Some(s_str) = s_val.as_string() {
                    let loaded = BacklinkSettings::from_json(&s_str);
                    set_settings.set(loaded);
                    let _ = panel_dom::reconcile_document(&loaded).await;
                }
            }
        });
    });

    let save_settings_to_disk = move |s: BacklinkSettings| {
        let v_path = vault_path.get_untracked();
        if !v_path.is_empty() {
            let s_json = s.to_json();
            spawn_local(async move {
                let args = serde_wasm_bindgen::to_value(&SaveSettingsArgs { vault_path: &v_path, settings: &s_json }).unwrap();
                invoke("save_backlink_settings", args).await;
            });
        }
    };

    let app_view = move || {
        if is_settings_window {
            view! {
                <div style="flex: 1; padding: 3rem; overflow-y: auto;">
                    <h2 style="margin-top: 0; margin-bottom: 2rem;">"Backlink Settings"</h2>

                    <div style="display: flex; flex-direction: column; gap: 1.5rem; max-width: 520px;">
                        <div style="display: flex; align-items: center; justify-content: space-between; gap: 1rem;">
                            <div style="display: flex; flex-direction: column; gap: 0.25rem;">
                                <label style="font-weight: 600; font-size: 0.9em;">"Collapse results"</label>
                                <span style="font-size: 0.8em; color: var(--text-muted);">"Automatically collapse backlink results."</span>
                            </div>
                            <input type="checkbox" style="width: 18px; height: 18px; cursor: pointer;" prop:checked=move || settings.get().collapse_results on:change=move |e| {
                                let mut s = settings.get_untracked(); s.collapse_results = event_target_checked(&e); set_settings.set(s); save_settings_to_disk(s);
                            } />
                        </div>
                        <div style="display: flex; align-items: center; justify-content: space-between; gap: 1rem;">
                            <div style="display: flex; flex-direction: column; gap: 0.25rem;">
                                <label style="font-weight: 600; font-size: 0.9em;">"Show more context"</label>
                                <span style="font-size: 0.8em; color: var(--text-muted);">"Automatically show more context for backlink results."</span>
                            </div>
                            <input type="checkbox" style="width: 18px; height: 18px; cursor: pointer;" prop:checked=move || settings.get().show_more_context on:change=move |e| {
                                let mut s = settings.get_untracked(); s.show_more_context = event_target_checked(&e); set_settings.set(s); save_settings_to_disk(s);
                            } />
                        </div>
                        <div style="display: flex; align-items: center; justify-content: space-between; gap: 1rem;">
                            <div style="display: flex; flex-direction: column; gap: 0.25rem;">
                                <label style="font-weight: 600; font-size: 0.9em;">"Sort order"</label>
                                <span style="font-size: 0.8em; color: var(--text-muted);">"Default sort order for backlink results."</span>
                            </div>
                            <select style="padding: 0.5rem; border-radius: 4px; border: 1px solid var(--border-color); background: var(--bg-secondary); color: var(--text-primary); cursor: pointer;" prop:value=move || settings.get().sort_order.id().to_string() on:change=move |e| {
                                let mut s = settings.get_untracked(); s.sort_order = SortOrder::from_id(&event_target_value(&e)); set_settings.set(s); save_settings_to_disk(s);
                            }>
                                {SortOrder::ALL.into_iter().map(|order| view! {
                                    <option value=order.id()>{order.menu_label()}</option>
                                }).collect::<Vec<_>>()}
                            </select>
                        </div>
                    </div>
                </div>
            }.into_any()
        } else {
            // Embedded mode: the plugin listens for host events and
            // drives the backlinks panel. Its only visible surface is
            // the button that opens the settings window.
            view! {
                <button
                    class="backlink-settings-open"
                    on:click=move |_| {
                        spawn_local(async move {
                            invoke("open_settings_window", JsValue::NULL).await;
                        });
                    }
                    style="background: transparent; border: none; font-size: 1.2rem; cursor: pointer; color: var(--text-muted);"
                    title="Backlink settings"
                >
                    "⚙"
                </button>
            }.into_any()
        }
    };

    view! {
        <main class="plugin-root" style="display: flex; height: 100%; width: 100%; background: var(--bg-primary); color: var(--text-primary);">
            {app_view}
        </main>
    }
}
