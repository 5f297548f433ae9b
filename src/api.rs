//! Remote Command Client: the movement REST endpoints plus the voice-intent
//! classification call and its credential.

use std::cell::RefCell;

use serde_json::{json, Value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{console, Headers, Request, RequestInit, Response};

use crate::config::Config;
use crate::error::ApiError;
use crate::parse;
use crate::types::{ServerRecord, MOVEMENTS};

pub struct ApiClient {
    base: String,
    key_url: String,
    chat_url: String,
    chat_model: String,
    /// Classifier credential, fetched once per page lifetime.
    api_key: RefCell<Option<String>>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            base: config.api_base.clone(),
            key_url: config.key_url.clone(),
            chat_url: config.chat_url.clone(),
            chat_model: config.chat_model.clone(),
            api_key: RefCell::new(None),
        }
    }

    /// `POST {base}/movimientos`. Returns the server-assigned timestamp when
    /// the response carries one.
    pub async fn submit_movement(&self, id: u32) -> Result<Option<String>, ApiError> {
        let url = format!("{}/movimientos", self.base);
        let body = json!({ "id_movimiento": id });
        let value = self.post_json(&url, &body, None).await?;
        Ok(parse::submit_timestamp(&value))
    }

    /// `GET {base}/movimientos/ultimo`. `Ok(None)` means "no record yet".
    pub async fn fetch_latest(&self) -> Result<Option<ServerRecord>, ApiError> {
        let url = format!("{}/movimientos/ultimo", self.base);
        let value = self.get_json(&url).await?;
        parse::latest(&value)
    }

    /// `GET {base}/movimientos/ultimos?n=..`, most recent first.
    pub async fn fetch_latest_n(&self, n: u32) -> Result<Vec<ServerRecord>, ApiError> {
        let url = format!("{}/movimientos/ultimos?n={n}", self.base);
        let value = self.get_json(&url).await?;
        parse::record_list(&value)
    }

    pub async fn fetch_api_key(&self) -> Result<String, ApiError> {
        if let Some(key) = self.api_key.borrow().clone() {
            return Ok(key);
        }
        let value = self.get_json(&self.key_url).await?;
        let key = parse::api_key(&value)?;
        *self.api_key.borrow_mut() = Some(key.clone());
        Ok(key)
    }

    /// Sends the transcript plus the fixed catalog to the classifier.
    /// `None` covers both the classifier's negative result shape and any
    /// transport or parse failure (degraded mode, logged).
    pub async fn classify_intent(&self, transcript: &str, keyword: &str) -> Option<String> {
        let key = match self.fetch_api_key().await {
            Ok(key) => key,
            Err(err) => {
                console::error_1(&format!("clave del clasificador: {err}").into());
                return None;
            }
        };
        let body = json!({
            "model": self.chat_model,
            "messages": [{ "role": "user", "content": classifier_prompt(transcript, keyword) }],
            "max_tokens": 20,
        });
        match self.post_json(&self.chat_url, &body, Some(&key)).await {
            Ok(value) => parse::classifier_reply(&value),
            Err(err) => {
                console::error_1(&format!("clasificador: {err}").into());
                None
            }
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        let request = Request::new_with_str(url)?;
        request_json(request).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        bearer: Option<&str>,
    ) -> Result<Value, ApiError> {
        let headers = Headers::new()?;
        headers.set("Content-Type", "application/json")?;
        if let Some(key) = bearer {
            headers.set("Authorization", &format!("Bearer {key}"))?;
        }
        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_headers(headers.as_ref());
        opts.set_body(&JsValue::from_str(&body.to_string()));
        let request = Request::new_with_str_and_init(url, &opts)?;
        request_json(request).await
    }
}

async fn request_json(request: Request) -> Result<Value, ApiError> {
    let window =
        web_sys::window().ok_or_else(|| ApiError::Transport("window no disponible".into()))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|_| ApiError::Transport("respuesta no es Response".into()))?;
    if !resp.ok() {
        return Err(ApiError::Http(resp.status()));
    }
    let text = JsFuture::from(resp.text()?).await?;
    let raw = text.as_string().unwrap_or_default();
    Ok(serde_json::from_str(&raw)?)
}

/// The classification prompt: the fixed catalog as a numbered list, the
/// already-validated activation keyword, and the transcript. The model must
/// answer with an exact catalog label or `"ninguno"`.
fn classifier_prompt(transcript: &str, keyword: &str) -> String {
    let catalog = MOVEMENTS
        .iter()
        .map(|m| format!("{}. {}", m.id, m.label.replace('°', "")))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Eres un sistema que controla un carrito.\n\
         El usuario ya dijo la palabra clave \"{keyword}\", ahora identifica el movimiento exacto.\n\
         Los movimientos válidos son:\n\n{catalog}\n\n\
         Texto reconocido: \"{transcript}\"\n\
         Responde SOLO con el nombre exacto del movimiento de la lista.\n\
         Si no encuentras coincidencia, responde \"ninguno\".\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_the_whole_catalog() {
        let prompt = classifier_prompt("mike adelante", "mike");
        assert!(prompt.contains("1. Adelante"));
        assert!(prompt.contains("11. Giro 360 izquierda"));
        assert!(prompt.contains("palabra clave \"mike\""));
        assert!(prompt.contains("Texto reconocido: \"mike adelante\""));
        assert!(prompt.contains("\"ninguno\""));
    }

    #[test]
    fn prompt_strips_degree_signs_like_the_spoken_labels() {
        let prompt = classifier_prompt("x", "mike");
        assert!(prompt.contains("8. Giro 90 derecha"));
        assert!(!prompt.contains('°'));
    }
}
