//! Page bootstrap: builds the panels once the document has finished parsing.

use crate::dom;
use crate::error::{js_error_message, UiError};
use crate::panel::CommandPanel;
use crate::shell::AppShell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// `window` property that keeps a mounted shell alive for the page.
pub const RUNTIME_GLOBAL: &str = "runtime";

const INIT_FAILED: &str =
    "Failed to initialize application. Please check the console for details.";

fn is_loading(ready_state: Option<&str>) -> bool {
    ready_state == Some("loading")
}

/// Runs `work` now, or on `DOMContentLoaded` while the document is still loading.
fn when_ready(work: impl FnOnce() + 'static) -> Result<(), UiError> {
    let doc = dom::document()?;
    let state = js_sys::Reflect::get(&doc, &JsValue::from_str("readyState"))
        .ok()
        .and_then(|v| v.as_string());
    if !is_loading(state.as_deref()) {
        work();
        return Ok(());
    }
    let callback = Closure::once_into_js(work);
    doc.add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())
        .map_err(|e| UiError::MissingElement(js_error_message(&e)))
}

fn show_page_error(message: &str) {
    let Ok(doc) = dom::document() else { return };
    let Some(body) = doc.body() else { return };
    if let Ok(banner) = dom::create(&doc, "div", "error") {
        banner.set_text_content(Some(message));
        let first = body.first_child();
        let _ = body.insert_before(&banner, first.as_ref());
    }
}

/// Builds the runtime shell, publishes its inline-handler bridge and keeps it
/// on `window.runtime`.
#[wasm_bindgen(js_name = mountRuntime)]
pub fn mount_runtime(config_json: Option<String>) -> Result<(), JsValue> {
    when_ready(move || {
        let mounted = AppShell::new(config_json).and_then(|shell| {
            shell.expose_globals()?;
            let window = dom::window()?;
            js_sys::Reflect::set(
                &window,
                &JsValue::from_str(RUNTIME_GLOBAL),
                &JsValue::from(shell),
            )?;
            Ok(())
        });
        if let Err(err) = mounted {
            web_sys::console::error_2(&"Error initializing runtime:".into(), &err);
            show_page_error(INIT_FAILED);
        }
    })
    .map_err(JsValue::from)
}

/// Builds the command panel and starts it. Its listeners keep it alive.
#[wasm_bindgen(js_name = mountCommandPanel)]
pub fn mount_command_panel(config_json: Option<String>) -> Result<(), JsValue> {
    when_ready(move || {
        let started = CommandPanel::new(config_json).and_then(|panel| panel.start());
        if let Err(err) = started {
            web_sys::console::error_2(&"Error initializing application:".into(), &err);
            show_page_error(INIT_FAILED);
        }
    })
    .map_err(JsValue::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_a_loading_document_defers() {
        assert!(is_loading(Some("loading")));
        assert!(!is_loading(Some("interactive")));
        assert!(!is_loading(Some("complete")));
        assert!(!is_loading(None));
    }
}
