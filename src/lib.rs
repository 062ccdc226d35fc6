pub mod appwindow;
pub mod commands;
pub mod config;
pub mod dom;
pub mod error;
pub mod logview;
pub mod monitor;
pub mod mount;
pub mod network;
pub mod panel;
pub mod registry;
pub mod shell;
pub mod tasks;

pub use error::UiError;
pub use mount::{mount_command_panel, mount_runtime};
pub use panel::CommandPanel;
pub use shell::AppShell;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}
