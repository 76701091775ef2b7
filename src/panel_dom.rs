use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::backlink_core::{
    reconcile, BacklinkHandle, BacklinkSettings, Outcome, PanelControls, PanelProbe,
    SortOrder, SORT_MENU_LABEL,
};

/// Marker the host renders around the embedded backlinks panel.
pub const PANEL_SELECTOR: &str = "div.embedded-backlinks";

fn document() -> Option<web_sys::Document> {
    web_sys::window()?.document()
}

fn query_html(selector: &str) -> Option<web_sys::HtmlElement> {
    document()?
        .query_selector(selector)
        .ok()?
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
}

fn click_first(selector: &str) -> bool {
    match query_html(selector) {
        Some(el) => {
            el.click();
            true
        }
        None => false,
    }
}

/// Probes the live document for the panel marker.
pub struct DomPanelProbe;

impl PanelProbe for DomPanelProbe {
    fn panel_size(&self) -> Option<(f64, f64)> {
        let panel = query_html(PANEL_SELECTOR)?;
        Some((panel.offset_width() as f64, panel.offset_height() as f64))
    }
}

/// Drives the panel's buttons with synthetic clicks when no capability
/// handle is available.
pub struct DomPanelControls;

impl PanelControls for DomPanelControls {
    fn click_if_inactive(&mut self, label: &str) -> bool {
        // `:not(.is-active)` keeps this idempotent: an already-active
        // toggle never matches, so it never gets clicked back off.
        let selector =
            format!("{PANEL_SELECTOR} .clickable-icon[aria-label=\"{label}\"]:not(.is-active)");
        click_first(&selector)
    }

    fn open_sort_menu(&mut self) -> bool {
        let selector = format!("{PANEL_SELECTOR} .clickable-icon[aria-label=\"{SORT_MENU_LABEL}\"]");
        click_first(&selector)
    }

    fn click_sort_option(&mut self, label: &str) -> bool {
        // The menu is rendered at document level, outside the panel
        // subtree, and only after the trigger click has been processed.
        // If it has not appeared yet there is nothing to do.
        let Some(document) = document() else {
            return false;
        };
        let Ok(items) = document.query_selector_all(".menu .menu-item") else {
            return false;
        };
        for index in 0..items.length() {
            let Some(node) = items.item(index) else {
                continue;
            };
            let matches = node
                .text_content()
                .is_some_and(|text| text.trim() == label);
            if !matches {
                continue;
            }
            if let Ok(el) = node.dyn_into::<web_sys::HtmlElement>() {
                el.click();
                return true;
            }
        }
        false
    }
}

/// Capability handle over the view object resolved from the host's view
/// registry. All calls go through `Reflect` so a host build that renamed
/// or dropped a setter degrades to a no-op instead of throwing.
pub struct JsBacklinkHandle {
    view: JsValue,
}

impl JsBacklinkHandle {
    fn call_setter(&self, name: &str, arg: &JsValue) {
        let Ok(method) = js_sys::Reflect::get(&self.view, &JsValue::from_str(name)) else {
            return;
        };
        let Some(method) = method.dyn_ref::<js_sys::Function>() else {
            return;
        };
        let _ = method.call1(&self.view, arg);
    }
}

impl BacklinkHandle for JsBacklinkHandle {
    fn set_collapse_all(&mut self, on: bool) {
        self.call_setter("setCollapseAll", &JsValue::from_bool(on));
    }

    fn set_extra_context(&mut self, on: bool) {
        self.call_setter("setExtraContext", &JsValue::from_bool(on));
    }

    fn set_sort_order(&mut self, order: SortOrder) {
        self.call_setter("setSortOrder", &JsValue::from_str(order.id()));
    }
}

fn nonnull(value: JsValue) -> Option<JsValue> {
    if value.is_undefined() || value.is_null() {
        None
    } else {
        Some(value)
    }
}

/// Asks the host view registry for the backlink view. The registry
/// materializes deferred views before resolving its promise, so awaiting
/// it doubles as the "panel is ready" signal. Any missing hook, rejected
/// promise, or nullish result means there is no capability this time.
pub async fn resolve_backlink_handle() -> Option<JsBacklinkHandle> {
    let window = web_sys::window()?;
    let registry = nonnull(js_sys::Reflect::get(&window, &JsValue::from_str("__BEDROCK__")).ok()?)?;
    let views = nonnull(js_sys::Reflect::get(&registry, &JsValue::from_str("views")).ok()?)?;
    let getter = js_sys::Reflect::get(&views, &JsValue::from_str("getBacklinkView")).ok()?;
    let getter = getter.dyn_ref::<js_sys::Function>()?;
    let promise: js_sys::Promise = getter.call0(&views).ok()?.dyn_into().ok()?;
    let view = nonnull(JsFuture::from(promise).await.ok()?)?;
    Some(JsBacklinkHandle { view })
}

/// Full reconciliation pass against the live document: probe, resolve the
/// optional capability handle, then run the core routine.
pub async fn reconcile_document(settings: &BacklinkSettings) -> Outcome {
    let probe = DomPanelProbe;

    // Skip the registry round trip when the panel is absent or inert.
    // The core re-checks after the await since layout may have changed.
    match probe.panel_size() {
        None => return Outcome::NoPanel,
        Some((width, height)) if width <= 0.0 || height <= 0.0 => return Outcome::Hidden,
        Some(_) => {}
    }

    let mut handle = resolve_backlink_handle().await;
    let mut controls = DomPanelControls;
    reconcile(
        &probe,
        handle.as_mut().map(|h| h as &mut dyn BacklinkHandle),
        &mut controls,
        settings,
    )
}
