//! Command runner panel: lists build commands and shows their output.

use crate::commands::{
    self, CommandList, RunControl, RunGuard, RunLock, RunOutcome, RunRequest, RunResponse,
};
use crate::config::{self, PanelConfig};
use crate::dom;
use crate::error::{js_error_message, UiError};
use crate::network;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::{Document, Element, HtmlButtonElement, HtmlInputElement, KeyboardEvent};

const LOAD_FAILED: &str = "Failed to load commands. Please refresh the page to try again.";
const NO_COMMANDS: &str = "No commands available";

struct Panel {
    config: PanelConfig,
    doc: Document,
    container: Element,
    input: HtmlInputElement,
    button: HtmlButtonElement,
    output: Element,
    commands: RefCell<Vec<String>>,
    run_lock: RunLock,
}

#[wasm_bindgen]
pub struct CommandPanel {
    inner: Rc<Panel>,
}

#[wasm_bindgen]
impl CommandPanel {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<CommandPanel, JsValue> {
        let config: PanelConfig = config::from_json(config_json.as_deref())?;
        let doc = dom::document()?;
        let panel = Panel {
            container: dom::element_by_id(&doc, &config.commands_container)?,
            input: dom::typed_by_id(&doc, &config.command_input)?,
            button: dom::typed_by_id(&doc, &config.run_button)?,
            output: dom::element_by_id(&doc, &config.output)?,
            doc,
            config,
            commands: RefCell::new(Vec::new()),
            run_lock: RunLock::new(),
        };
        Ok(CommandPanel {
            inner: Rc::new(panel),
        })
    }

    /// Wires the page listeners and starts loading the command list.
    pub fn start(&self) -> Result<(), JsValue> {
        attach_listeners(&self.inner)?;
        let panel = self.inner.clone();
        spawn_local(async move {
            load_commands(&panel).await;
            web_sys::console::log_1(&"Application initialized".into());
        });
        Ok(())
    }

    #[wasm_bindgen(js_name = loadCommands)]
    pub fn load_commands(&self) -> js_sys::Promise {
        let panel = self.inner.clone();
        future_to_promise(async move {
            load_commands(&panel).await;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = renderCommandList)]
    pub fn render_command_list(&self) -> Result<(), JsValue> {
        render_command_list(&self.inner).map_err(JsValue::from)
    }

    /// Resolves once the run has finished and the controls are restored.
    #[wasm_bindgen(js_name = runCommand)]
    pub fn run_command(&self) -> js_sys::Promise {
        let panel = self.inner.clone();
        future_to_promise(async move {
            run_command(&panel).await;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.inner.run_lock.is_busy()
    }

    pub fn commands(&self) -> Vec<JsValue> {
        self.inner
            .commands
            .borrow()
            .iter()
            .map(|c| JsValue::from_str(c))
            .collect()
    }
}

fn attach_listeners(panel: &Rc<Panel>) -> Result<(), UiError> {
    let p = panel.clone();
    let on_click = Closure::<dyn FnMut()>::new(move || {
        spawn_local(run_command_owned(p.clone()));
    });
    panel
        .button
        .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
        .map_err(|e| UiError::MissingElement(js_error_message(&e)))?;
    on_click.forget();

    let p = panel.clone();
    let on_keypress = Closure::<dyn FnMut(KeyboardEvent)>::new(move |e: KeyboardEvent| {
        if e.key() == "Enter" && !p.run_lock.is_busy() {
            spawn_local(run_command_owned(p.clone()));
        }
    });
    panel
        .input
        .add_event_listener_with_callback("keypress", on_keypress.as_ref().unchecked_ref())
        .map_err(|e| UiError::MissingElement(js_error_message(&e)))?;
    on_keypress.forget();

    let p = panel.clone();
    let on_input = Closure::<dyn FnMut()>::new(move || {
        let blank = p.input.value().trim().is_empty();
        p.button.set_disabled(blank || p.run_lock.is_busy());
    });
    panel
        .input
        .add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())
        .map_err(|e| UiError::MissingElement(js_error_message(&e)))?;
    on_input.forget();

    // One delegated handler serves every rendered command item.
    let p = panel.clone();
    let on_pick = Closure::<dyn FnMut(web_sys::Event)>::new(move |e: web_sys::Event| {
        let Some(item) = dom::closest_target(&e, ".command-item") else {
            return;
        };
        if let Some(cmd) = item.get_attribute("data-command") {
            p.input.set_value(&cmd);
            spawn_local(run_command_owned(p.clone()));
        }
    });
    panel
        .container
        .add_event_listener_with_callback("click", on_pick.as_ref().unchecked_ref())
        .map_err(|e| UiError::MissingElement(js_error_message(&e)))?;
    on_pick.forget();

    Ok(())
}

/// Prefers a list the hosting page injected; otherwise asks the server once.
fn preloaded_commands(global: &str) -> Option<Vec<String>> {
    let window = web_sys::window()?;
    let value = js_sys::Reflect::get(&window, &JsValue::from_str(global)).ok()?;
    if !js_sys::Array::is_array(&value) {
        return None;
    }
    let array: js_sys::Array = value.unchecked_into();
    Some(array.iter().filter_map(|v| v.as_string()).collect())
}

async fn fetch_commands(panel: &Panel) -> Result<Vec<String>, UiError> {
    if let Some(cmds) = preloaded_commands(&panel.config.preloaded_global) {
        web_sys::console::log_1(&"Using preloaded commands".into());
        return Ok(cmds);
    }
    let list: CommandList = network::get_json(&panel.config.commands_url).await?;
    Ok(list.commands)
}

async fn load_commands(panel: &Rc<Panel>) {
    let loaded = fetch_commands(panel).await;
    let rendered = loaded.and_then(|cmds| {
        *panel.commands.borrow_mut() = cmds;
        render_command_list(panel)
    });
    if let Err(err) = rendered {
        web_sys::console::error_1(&format!("Error loading commands: {}", err).into());
        panel.commands.borrow_mut().clear();
        show_list_message(panel, LOAD_FAILED);
    }
}

fn show_list_message(panel: &Panel, message: &str) {
    panel.container.set_inner_html("");
    if let Ok(p) = dom::create(&panel.doc, "p", "error") {
        p.set_text_content(Some(message));
        let _ = panel.container.append_child(&p);
    }
}

fn render_command_list(panel: &Panel) -> Result<(), UiError> {
    let list = panel.commands.borrow();
    if list.is_empty() {
        show_list_message(panel, NO_COMMANDS);
        return Ok(());
    }

    panel.container.set_inner_html("");
    for (group, cmds) in commands::group_commands(&list) {
        let group_el = dom::create(&panel.doc, "div", "command-group")?;

        let title = dom::create(&panel.doc, "h3", "")?;
        title.set_text_content(Some(&commands::group_title(&group)));
        append(&group_el, &title)?;

        let list_el = dom::create(&panel.doc, "div", "commands-list")?;
        for cmd in &cmds {
            let item = dom::create(&panel.doc, "div", "command-item")?;
            item.set_text_content(Some(cmd));
            let _ = item.set_attribute("title", &format!("Run: {}", cmd));
            let _ = item.set_attribute("data-command", cmd);
            append(&list_el, &item)?;
        }
        append(&group_el, &list_el)?;
        append(&panel.container, &group_el)?;
    }
    Ok(())
}

fn append(parent: &Element, child: &Element) -> Result<(), UiError> {
    parent
        .append_child(child)
        .map(|_| ())
        .map_err(|e| UiError::MissingElement(js_error_message(&e)))
}

impl RunControl for Panel {
    fn show_busy(&self) {
        self.button.set_disabled(true);
        self.button.set_text_content(Some(&self.config.running_label));
    }

    fn show_idle(&self) {
        self.button.set_disabled(false);
        self.button.set_text_content(Some(&self.config.run_label));
        dom::scroll_to_bottom(&self.output);
    }
}

async fn run_command_owned(panel: Rc<Panel>) {
    run_command(&panel).await;
}

async fn run_command(panel: &Panel) {
    let command = panel.input.value().trim().to_string();
    if command.is_empty() {
        return;
    }
    let Some(_guard) = RunGuard::engage(&panel.run_lock, panel) else {
        return;
    };
    let prefix = panel.config.command_prefix.as_str();

    panel
        .output
        .set_text_content(Some(&commands::running_text(prefix, &command)));
    dom::scroll_to_bottom(&panel.output);

    let request = RunRequest { command: &command };
    let reply = network::post_json::<_, RunResponse>(&panel.config.run_url, &request).await;
    let outcome = match reply {
        Ok(resp) => RunOutcome::from_response(prefix, &command, &resp),
        Err(err) => {
            web_sys::console::error_1(&format!("Error running command: {}", err).into());
            RunOutcome::from_error(prefix, &command, &err)
        }
    };

    panel.output.set_text_content(Some(&outcome.text));
    panel.output.set_class_name(outcome.style.class_name());
}
