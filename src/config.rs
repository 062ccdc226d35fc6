//! Host-page configuration for both panels.
//!
//! Pages may pass a JSON object to either constructor; any key left out keeps
//! its default, so `{}` and no argument at all are equivalent.

use crate::error::UiError;
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub commands_url: String,
    pub run_url: String,
    /// Global the hosting page may define with a pre-rendered command list.
    pub preloaded_global: String,
    pub command_prefix: String,
    pub run_label: String,
    pub running_label: String,
    pub commands_container: String,
    pub command_input: String,
    pub run_button: String,
    pub output: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        PanelConfig {
            commands_url: "/api/commands".into(),
            run_url: "/api/run".into(),
            preloaded_global: "availableCommands".into(),
            command_prefix: "make".into(),
            run_label: "Run".into(),
            running_label: "Running...".into(),
            commands_container: "commandsContainer".into(),
            command_input: "commandInput".into(),
            run_button: "runButton".into(),
            output: "output".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub install_delay_ms: u32,
    pub monitor_interval_ms: u32,
    pub locale: String,
    pub console_output: String,
    pub app_window: String,
    pub app_frame: String,
    pub app_window_title: String,
    pub overlay: String,
    pub file_input: String,
    pub auto_scroll_status: String,
    pub app_grid: String,
    pub install_button: String,
    pub status_dot: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            install_delay_ms: 1500,
            monitor_interval_ms: 5000,
            locale: "en-US".into(),
            console_output: "console-output".into(),
            app_window: "appWindow".into(),
            app_frame: "appFrame".into(),
            app_window_title: "appWindowTitle".into(),
            overlay: "overlay".into(),
            file_input: "fileInput".into(),
            auto_scroll_status: "autoScrollStatus".into(),
            app_grid: ".main-content".into(),
            install_button: ".install-app-btn".into(),
            status_dot: ".status-dot".into(),
        }
    }
}

pub fn from_json<T: DeserializeOwned + Default>(json: Option<&str>) -> Result<T, UiError> {
    match json.map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(raw) => serde_json::from_str(raw).map_err(|e| UiError::Config(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_uses_defaults() {
        let cfg: PanelConfig = from_json(None).unwrap();
        assert_eq!(cfg, PanelConfig::default());
        let cfg: ShellConfig = from_json(Some("  ")).unwrap();
        assert_eq!(cfg.install_delay_ms, 1500);
        assert_eq!(cfg.monitor_interval_ms, 5000);
    }

    #[test]
    fn test_partial_override() {
        let cfg: PanelConfig =
            from_json(Some(r#"{"run_url":"/v2/run","unknown":true}"#)).unwrap();
        assert_eq!(cfg.run_url, "/v2/run");
        assert_eq!(cfg.commands_url, "/api/commands");
        assert_eq!(cfg.command_prefix, "make");
    }

    #[test]
    fn test_malformed_config_is_rejected() {
        let err = from_json::<ShellConfig>(Some("{not json")).unwrap_err();
        assert!(matches!(err, UiError::Config(_)));
    }
}
