use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Debug, Error)]
pub enum UiError {
    /// The request never produced a response (network down, CORS, aborted).
    #[error("{0}")]
    Transport(String),
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Invalid app format: {0}")]
    InvalidApp(&'static str),
    #[error("Failed to read the app file")]
    FileRead,
    #[error("App not found: {0}")]
    AppNotFound(String),
    #[error("element not found: {0}")]
    MissingElement(String),
    #[error("no window object")]
    NoWindow,
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<UiError> for JsValue {
    fn from(err: UiError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}

/// Best-effort message for a rejected promise or thrown JS value.
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
