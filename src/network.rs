use crate::error::{js_error_message, UiError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

pub async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, UiError> {
    let opts = RequestInit::new();
    opts.set_method("GET");

    let request = Request::new_with_str_and_init(url, &opts)
        .map_err(|e| UiError::Transport(js_error_message(&e)))?;

    decode(&send(&request).await?)
}

pub async fn post_json<B: Serialize, T: DeserializeOwned>(
    url: &str,
    body: &B,
) -> Result<T, UiError> {
    let payload = serde_json::to_string(body)?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_body(&JsValue::from_str(&payload));

    let request = Request::new_with_str_and_init(url, &opts)
        .map_err(|e| UiError::Transport(js_error_message(&e)))?;

    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(|e| UiError::Transport(js_error_message(&e)))?;

    decode(&send(&request).await?)
}

/// Fetches `request` and returns the body text of a 2xx response.
async fn send(request: &Request) -> Result<String, UiError> {
    let window = web_sys::window().ok_or(UiError::NoWindow)?;
    let resp_value = JsFuture::from(window.fetch_with_request(request))
        .await
        .map_err(|e| UiError::Transport(js_error_message(&e)))?;

    let resp: Response = resp_value
        .dyn_into()
        .map_err(|_| UiError::Transport("Response is not a Response object".into()))?;

    if !resp.ok() {
        return Err(UiError::HttpStatus(resp.status()));
    }

    let text = JsFuture::from(
        resp.text()
            .map_err(|e| UiError::Decode(js_error_message(&e)))?,
    )
    .await
    .map_err(|e| UiError::Decode(js_error_message(&e)))?;

    text.as_string()
        .ok_or_else(|| UiError::Decode("response text is not a string".into()))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, UiError> {
    serde_json::from_str(body).map_err(|e| UiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandList, RunResponse};

    #[test]
    fn test_decode_command_list() {
        let list: CommandList = decode(r#"{"commands":["build","test-unit"]}"#).unwrap();
        assert_eq!(list.commands, vec!["build", "test-unit"]);
    }

    #[test]
    fn test_decode_failure_is_decode_error() {
        let err = decode::<CommandList>(r#"{"commands":"nope"}"#).unwrap_err();
        assert!(matches!(err, UiError::Decode(_)));
    }

    #[test]
    fn test_decode_run_response_optional_fields() {
        let resp: RunResponse = decode("{}").unwrap();
        assert_eq!(resp.output, None);
        assert_eq!(resp.error, None);
    }
}
