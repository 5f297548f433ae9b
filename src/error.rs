use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failure modes of the remote calls. Classification misses and empty
/// "latest" responses are valid negative results, not errors, and are
/// modeled as `None` by the client instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("error de red: {0}")]
    Transport(String),
    #[error("HTTP {0}")]
    Http(u16),
    #[error("respuesta inválida: {0}")]
    Parse(String),
}

impl From<JsValue> for ApiError {
    fn from(value: JsValue) -> Self {
        let detail = value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}"));
        ApiError::Transport(detail)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::Parse(value.to_string())
    }
}
