//! Runtime environment shell: app cards, the app window, services, the
//! console and the simulated system monitor.

use crate::appwindow::{placeholder_document, AppWindow};
use crate::config::{self, ShellConfig};
use crate::dom;
use crate::error::{js_error_message, UiError};
use crate::logview::{LogLevel, LogView};
use crate::monitor::{format_uptime, SystemStats};
use crate::registry::{default_apps, App, AppRegistry, ServiceRegistry};
use crate::tasks::{ScheduledTask, TaskSet};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, File, HtmlIFrameElement, HtmlInputElement, KeyboardEvent};

const CORE_SERVICES: [(&str, &str); 3] = [
    ("file-system", "File System"),
    ("network", "Network"),
    ("security", "Security"),
];

const STAT_FIELDS: [&str; 4] = ["cpu-usage", "memory-usage", "disk-usage", "uptime"];

/// Window functions installed by `exposeGlobals` for inline page handlers.
const GLOBAL_BRIDGE: [&str; 5] = [
    "runApp",
    "installApp",
    "closeAppWindow",
    "clearConsole",
    "toggleAutoScroll",
];

struct ShellState {
    apps: AppRegistry,
    services: ServiceRegistry,
    window: AppWindow,
    /// Repeated requests for one app each run to completion.
    pending_installs: TaskSet,
    monitor: Option<ScheduledTask>,
}

impl ShellState {
    fn new() -> Self {
        ShellState {
            apps: AppRegistry::new(),
            services: ServiceRegistry::new(),
            window: AppWindow::default(),
            pending_installs: TaskSet::default(),
            monitor: None,
        }
    }
}

struct Shell {
    config: ShellConfig,
    doc: Document,
    console: LogView,
    app_window: Element,
    app_frame: HtmlIFrameElement,
    overlay: Element,
    file_input: HtmlInputElement,
    started_at: f64,
    state: RefCell<ShellState>,
}

#[wasm_bindgen]
pub struct AppShell {
    inner: Rc<Shell>,
}

#[wasm_bindgen]
impl AppShell {
    /// Builds the shell against the current page and runs its startup sequence.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<AppShell, JsValue> {
        let config: ShellConfig = config::from_json(config_json.as_deref())?;
        let doc = dom::document()?;
        let console = LogView::new(
            doc.clone(),
            dom::element_by_id(&doc, &config.console_output)?,
            &config.locale,
        );
        let shell = Rc::new(Shell {
            app_window: dom::element_by_id(&doc, &config.app_window)?,
            app_frame: dom::typed_by_id(&doc, &config.app_frame)?,
            overlay: dom::element_by_id(&doc, &config.overlay)?,
            file_input: dom::typed_by_id(&doc, &config.file_input)?,
            console,
            doc,
            config,
            started_at: js_sys::Date::now(),
            state: RefCell::new(ShellState::new()),
        });
        initialize(&shell)?;
        Ok(AppShell { inner: shell })
    }

    #[wasm_bindgen(js_name = runApp)]
    pub fn run_app(&self, app_id: &str) {
        run_app(&self.inner, app_id);
    }

    #[wasm_bindgen(js_name = installApp)]
    pub fn install_app(&self, app_id: &str) {
        install_app(&self.inner, app_id);
    }

    #[wasm_bindgen(js_name = installAppFromFile)]
    pub fn install_app_from_file(&self, file: File) {
        install_app_from_file(&self.inner, file);
    }

    #[wasm_bindgen(js_name = closeAppWindow)]
    pub fn close_app_window(&self) {
        close_app_window(&self.inner);
    }

    #[wasm_bindgen(js_name = isAppWindowOpen)]
    pub fn is_app_window_open(&self) -> bool {
        self.inner.state.borrow().window.is_open()
    }

    #[wasm_bindgen(js_name = registerService)]
    pub fn register_service(&self, id: &str, name: &str, status: &str, version: &str) {
        register_service(&self.inner, id, name, status, version);
    }

    pub fn log(&self, level: &str, message: &str) {
        self.inner.console.log(LogLevel::from_name(level), message);
    }

    #[wasm_bindgen(js_name = clearConsole)]
    pub fn clear_console(&self) {
        clear_console(&self.inner);
    }

    #[wasm_bindgen(js_name = toggleAutoScroll)]
    pub fn toggle_auto_scroll(&self) {
        toggle_auto_scroll(&self.inner);
    }

    #[wasm_bindgen(js_name = consoleJson)]
    pub fn console_json(&self) -> Result<String, JsValue> {
        self.inner.console.entries_json().map_err(JsValue::from)
    }

    /// Publishes `runApp`, `installApp`, `closeAppWindow`, `clearConsole` and
    /// `toggleAutoScroll` on `window` so inline `onclick` handlers reach this
    /// shell.
    #[wasm_bindgen(js_name = exposeGlobals)]
    pub fn expose_globals(&self) -> Result<(), JsValue> {
        install_global_bridge(&self.inner).map_err(JsValue::from)
    }

    #[wasm_bindgen(js_name = appsJson)]
    pub fn apps_json(&self) -> Result<String, JsValue> {
        let state = self.inner.state.borrow();
        let apps: Vec<&App> = state.apps.iter().collect();
        serde_json::to_string(&apps).map_err(|e| UiError::from(e).into())
    }

    #[wasm_bindgen(js_name = servicesJson)]
    pub fn services_json(&self) -> Result<String, JsValue> {
        let state = self.inner.state.borrow();
        serde_json::to_string(&state.services.list()).map_err(|e| UiError::from(e).into())
    }

    /// Stops the monitor and drops any simulated install still waiting.
    pub fn dispose(&self) {
        let mut state = self.inner.state.borrow_mut();
        if let Some(monitor) = state.monitor.take() {
            monitor.cancel();
        }
        for task in state.pending_installs.drain() {
            task.cancel();
        }
    }
}

fn clear_console(shell: &Shell) {
    shell.console.clear();
    shell.console.log(LogLevel::Info, "Console cleared");
}

fn toggle_auto_scroll(shell: &Shell) {
    let enabled = shell.console.toggle_auto_scroll();
    if let Some(status) = shell.doc.get_element_by_id(&shell.config.auto_scroll_status) {
        status.set_text_content(Some(if enabled { "On" } else { "Off" }));
    }
    let word = if enabled { "enabled" } else { "disabled" };
    shell
        .console
        .log(LogLevel::Info, &format!("Auto-scroll {}", word));
}

fn publish(window: &web_sys::Window, name: &str, function: &JsValue) -> Result<(), UiError> {
    js_sys::Reflect::set(window, &JsValue::from_str(name), function)
        .map(|_| ())
        .map_err(|e| UiError::Config(js_error_message(&e)))
}

fn install_global_bridge(shell: &Rc<Shell>) -> Result<(), UiError> {
    let window = dom::window()?;
    let [run, install, close, clear, toggle] = GLOBAL_BRIDGE;

    let weak = Rc::downgrade(shell);
    let by_id = Closure::<dyn FnMut(String)>::new(move |id: String| {
        if let Some(shell) = weak.upgrade() {
            run_app(&shell, &id);
        }
    });
    publish(&window, run, by_id.as_ref())?;
    by_id.forget();

    let weak = Rc::downgrade(shell);
    let by_id = Closure::<dyn FnMut(String)>::new(move |id: String| {
        if let Some(shell) = weak.upgrade() {
            install_app(&shell, &id);
        }
    });
    publish(&window, install, by_id.as_ref())?;
    by_id.forget();

    let actions: [(&str, fn(&Shell)); 3] = [
        (close, close_app_window),
        (clear, clear_console),
        (toggle, toggle_auto_scroll),
    ];
    for (name, action) in actions {
        let weak = Rc::downgrade(shell);
        let call = Closure::<dyn FnMut()>::new(move || {
            if let Some(shell) = weak.upgrade() {
                action(&shell);
            }
        });
        publish(&window, name, call.as_ref())?;
        call.forget();
    }
    Ok(())
}

fn initialize(shell: &Rc<Shell>) -> Result<(), UiError> {
    shell
        .console
        .log(LogLevel::Info, "Initializing Veridock Runtime Environment...");
    attach_listeners(shell)?;
    initialize_services(shell);
    load_installed_apps(shell);
    start_system_monitor(shell);
    shell
        .console
        .log(LogLevel::Success, "Runtime Environment ready");
    Ok(())
}

fn listen(
    target: &web_sys::EventTarget,
    event: &str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Result<(), UiError> {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(|e| UiError::MissingElement(js_error_message(&e)))?;
    closure.forget();
    Ok(())
}

fn attach_listeners(shell: &Rc<Shell>) -> Result<(), UiError> {
    let weak = Rc::downgrade(shell);
    listen(&shell.file_input, "change", move |_: web_sys::Event| {
        let Some(shell) = weak.upgrade() else { return };
        let file = shell.file_input.files().and_then(|files| files.get(0));
        if let Some(file) = file {
            install_app_from_file(&shell, file);
        }
    })?;

    if let Some(button) = dom::query(&shell.doc, &shell.config.install_button) {
        let weak = Rc::downgrade(shell);
        listen(&button, "click", move |_: web_sys::Event| {
            if let Some(shell) = weak.upgrade() {
                shell.file_input.click();
            }
        })?;
    }

    let weak = Rc::downgrade(shell);
    listen(&shell.overlay, "click", move |_: web_sys::Event| {
        if let Some(shell) = weak.upgrade() {
            close_app_window(&shell);
        }
    })?;

    let weak = Rc::downgrade(shell);
    listen(&shell.doc, "keydown", move |e: web_sys::Event| {
        let escape = e
            .dyn_ref::<KeyboardEvent>()
            .is_some_and(|k| k.key() == "Escape");
        if !escape {
            return;
        }
        if let Some(shell) = weak.upgrade() {
            close_app_window(&shell);
        }
    })?;

    // Cards are re-rendered often; one delegated handler on the grid serves them all.
    if let Some(grid) = dom::query(&shell.doc, &shell.config.app_grid) {
        let weak = Rc::downgrade(shell);
        listen(&grid, "click", move |e: web_sys::Event| {
            let Some(shell) = weak.upgrade() else { return };
            let Some(id) = dom::closest_target(&e, ".card")
                .and_then(|card| card.get_attribute("data-app-id"))
            else {
                return;
            };
            let installed = shell.state.borrow().apps.get(&id).map(|a| a.installed);
            match installed {
                Some(true) => run_app(&shell, &id),
                Some(false) => install_app(&shell, &id),
                None => shell
                    .console
                    .log(LogLevel::Error, &UiError::AppNotFound(id).to_string()),
            }
        })?;
    }

    Ok(())
}

fn initialize_services(shell: &Shell) {
    for (id, name) in CORE_SERVICES {
        register_service(shell, id, name, "running", "1.0.0");
    }
    shell.console.log(LogLevel::Info, "Core services initialized");
}

fn load_installed_apps(shell: &Shell) {
    {
        let mut state = shell.state.borrow_mut();
        for app in default_apps() {
            state.apps.upsert(app);
        }
    }
    render_app_grid(shell);
}

fn render_app_grid(shell: &Shell) {
    let Some(grid) = dom::query(&shell.doc, &shell.config.app_grid) else {
        return;
    };
    grid.set_inner_html("");

    let state = shell.state.borrow();
    for app in state.apps.iter() {
        match app_card(&shell.doc, app) {
            Ok(card) => {
                let _ = grid.append_child(&card);
            }
            Err(err) => web_sys::console::warn_1(&err.to_string().into()),
        }
    }
}

fn app_card(doc: &Document, app: &App) -> Result<Element, UiError> {
    let card = dom::create(doc, "div", "card")?;
    let _ = card.set_attribute("data-app-id", &app.id);

    let header = dom::create(doc, "div", "card-header")?;
    let title = dom::create(doc, "h3", "card-title")?;
    title.set_text_content(Some(&app.name));
    let icon = dom::create(doc, "div", "card-icon")?;
    icon.set_text_content(Some(&app.icon));
    let _ = header.append_child(&title);
    let _ = header.append_child(&icon);

    let description = dom::create(doc, "p", "card-description")?;
    description.set_text_content(Some(&app.description));

    let meta = dom::create(doc, "div", "card-meta")?;
    let version = dom::create(doc, "span", "")?;
    version.set_text_content(Some(&format!("v{}", app.version)));
    let badge = dom::create(doc, "span", "card-badge")?;
    badge.set_text_content(Some(if app.installed { "Installed" } else { "Install" }));
    let _ = meta.append_child(&version);
    let _ = meta.append_child(&badge);

    for child in [&header, &description, &meta] {
        let _ = card.append_child(child);
    }
    Ok(card)
}

fn run_app(shell: &Shell, app_id: &str) {
    let name = shell.state.borrow().apps.get(app_id).map(|a| a.name.clone());
    let Some(name) = name else {
        shell.console.log(
            LogLevel::Error,
            &UiError::AppNotFound(app_id.to_string()).to_string(),
        );
        return;
    };

    shell
        .console
        .log(LogLevel::Info, &format!("Starting {}...", name));

    if let Some(title) = shell.doc.get_element_by_id(&shell.config.app_window_title) {
        title.set_text_content(Some(&name));
    }
    shell.app_frame.set_srcdoc(&placeholder_document(&name));
    show_app_window(shell);
}

fn show_app_window(shell: &Shell) {
    shell.state.borrow_mut().window.open();
    dom::set_active(&shell.app_window, true);
    dom::set_active(&shell.overlay, true);
    dom::lock_page_scroll(true);
}

fn close_app_window(shell: &Shell) {
    if !shell.state.borrow_mut().window.close() {
        return;
    }
    dom::set_active(&shell.app_window, false);
    dom::set_active(&shell.overlay, false);
    dom::lock_page_scroll(false);
}

fn install_app(shell: &Rc<Shell>, app_id: &str) {
    let name = shell.state.borrow().apps.get(app_id).map(|a| a.name.clone());
    let Some(name) = name else {
        shell.console.log(
            LogLevel::Error,
            &UiError::AppNotFound(app_id.to_string()).to_string(),
        );
        return;
    };

    shell
        .console
        .log(LogLevel::Info, &format!("Installing {}...", name));

    let serial = shell.state.borrow_mut().pending_installs.reserve();
    let weak: Weak<Shell> = Rc::downgrade(shell);
    let id = app_id.to_string();
    let task = ScheduledTask::after(shell.config.install_delay_ms, move || {
        if let Some(shell) = weak.upgrade() {
            finish_install(&shell, serial, &id);
        }
    });
    shell.state.borrow_mut().pending_installs.insert(serial, task);
}

fn finish_install(shell: &Shell, serial: u32, app_id: &str) {
    let (finished, result) = {
        let mut state = shell.state.borrow_mut();
        let finished = state.pending_installs.finish(serial);
        let result = state.apps.mark_installed(app_id).map(|a| a.name.clone());
        (finished, result)
    };
    match result {
        Ok(name) => {
            render_app_grid(shell);
            shell
                .console
                .log(LogLevel::Success, &format!("{} installed successfully", name));
        }
        Err(err) => shell.console.log(LogLevel::Error, &err.to_string()),
    }
    drop(finished);
}

fn install_app_from_file(shell: &Rc<Shell>, file: File) {
    let weak = Rc::downgrade(shell);
    spawn_local(async move {
        let contents = read_file_text(&file).await;
        let Some(shell) = weak.upgrade() else { return };
        match contents {
            Ok(text) => import_app(&shell, &file.name(), &text),
            Err(err) => shell.console.log(LogLevel::Error, &err.to_string()),
        }
    });
}

async fn read_file_text(file: &File) -> Result<String, UiError> {
    let text = JsFuture::from(file.text())
        .await
        .map_err(|_| UiError::FileRead)?;
    text.as_string().ok_or(UiError::FileRead)
}

fn import_app(shell: &Shell, file_name: &str, text: &str) {
    let parsed = serde_json::from_str::<serde_json::Value>(text)
        .map_err(UiError::from)
        .and_then(|value| {
            shell.console.log(
                LogLevel::Info,
                &format!("Installing app from file: {}", file_name),
            );
            App::from_file_value(value)
        });

    match parsed {
        Ok(app) => {
            let name = app.name.clone();
            shell.state.borrow_mut().apps.upsert(app);
            render_app_grid(shell);
            shell.console.log(
                LogLevel::Success,
                &format!("App \"{}\" installed successfully", name),
            );
        }
        Err(err) => shell
            .console
            .log(LogLevel::Error, &format!("Failed to install app: {}", err)),
    }
}

fn register_service(shell: &Shell, id: &str, name: &str, status: &str, version: &str) {
    shell
        .state
        .borrow_mut()
        .services
        .register(id, name, status, version, js_sys::Date::now());
    shell.console.log(
        LogLevel::Info,
        &format!("Service registered: {} ({})", name, id),
    );
    update_service_status(shell);
}

fn update_service_status(shell: &Shell) {
    let all_running = shell.state.borrow().services.all_running();
    if let Some(dot) = dom::query(&shell.doc, &shell.config.status_dot) {
        let state = if all_running { "active" } else { "warning" };
        dot.set_class_name(&format!("status-dot {}", state));
    }
}

fn start_system_monitor(shell: &Rc<Shell>) {
    update_system_stats(shell);
    let weak = Rc::downgrade(shell);
    let task = ScheduledTask::every(shell.config.monitor_interval_ms, move || {
        if let Some(shell) = weak.upgrade() {
            update_system_stats(&shell);
        }
    });
    shell.state.borrow_mut().monitor = Some(task);
}

fn update_system_stats(shell: &Shell) {
    let stats = SystemStats::sample(js_sys::Math::random);
    let uptime = format_uptime(js_sys::Date::now() - shell.started_at);
    let values = [
        format!("{}%", stats.cpu),
        format!("{}%", stats.memory),
        format!("{}%", stats.disk),
        uptime,
    ];
    for (id, value) in STAT_FIELDS.iter().zip(values.iter()) {
        if let Some(el) = shell.doc.get_element_by_id(id) {
            el.set_text_content(Some(value));
        }
    }
}
