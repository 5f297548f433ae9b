//! Voice Pipeline: speech capture, keyword gate, intent resolution.
//!
//! The remote half of the pipeline (classification, dispatch) is driven
//! from `app.rs`; this module owns the browser speech engine and the pure
//! decision steps.

use wasm_bindgen::prelude::*;
use web_sys::{SpeechRecognition, SpeechRecognitionEvent, SpeechSynthesisUtterance};
use yew::Callback;

use crate::types::Movement;

/// Progress of a single voice command. Every error path returns to `Idle`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum VoicePhase {
    #[default]
    Idle,
    Listening,
    Transcribed,
    KeywordChecked,
    IntentResolved,
    Dispatched,
}

impl VoicePhase {
    pub fn label(self) -> &'static str {
        match self {
            VoicePhase::Idle => "inactivo",
            VoicePhase::Listening => "escuchando",
            VoicePhase::Transcribed => "transcrito",
            VoicePhase::KeywordChecked => "palabra clave validada",
            VoicePhase::IntentResolved => "movimiento identificado",
            VoicePhase::Dispatched => "enviado",
        }
    }
}

/// The activation keyword must appear somewhere in the transcript before
/// any remote call is made.
pub fn contains_keyword(transcript: &str, keyword: &str) -> bool {
    transcript.to_lowercase().contains(&keyword.to_lowercase())
}

/// Maps the classifier reply onto the catalog. The literal `"ninguno"` is
/// the classifier's negative result.
pub fn resolve_intent(reply: &str) -> Option<Movement> {
    let reply = reply.trim();
    if reply.eq_ignore_ascii_case("ninguno") {
        return None;
    }
    Movement::from_label(reply)
}

/// Single-shot speech recognizer. Owns the engine callbacks; dropping the
/// recognizer detaches them.
pub struct SpeechRecognizer {
    inner: SpeechRecognition,
    _on_result: Closure<dyn FnMut(SpeechRecognitionEvent)>,
    _on_start: Closure<dyn FnMut(web_sys::Event)>,
    _on_end: Closure<dyn FnMut(web_sys::Event)>,
    _on_error: Closure<dyn FnMut(web_sys::Event)>,
}

impl SpeechRecognizer {
    pub fn new(
        lang: &str,
        on_transcript: Callback<String>,
        on_listening: Callback<bool>,
        on_error: Callback<String>,
    ) -> Result<Self, JsValue> {
        let inner = recognition_handle()?;
        inner.set_lang(lang);
        inner.set_continuous(false);
        inner.set_interim_results(false);

        let result_cb = Closure::wrap(Box::new(move |event: SpeechRecognitionEvent| {
            // Only the first candidate of the first result is used.
            let transcript = event
                .results()
                .and_then(|list| list.get(0))
                .and_then(|result| result.get(0))
                .map(|alt| alt.transcript().trim().to_lowercase());
            if let Some(transcript) = transcript {
                on_transcript.emit(transcript);
            }
        }) as Box<dyn FnMut(SpeechRecognitionEvent)>);
        inner.set_onresult(Some(result_cb.as_ref().unchecked_ref()));

        let start_cb = {
            let on_listening = on_listening.clone();
            Closure::wrap(Box::new(move |_: web_sys::Event| {
                on_listening.emit(true);
            }) as Box<dyn FnMut(web_sys::Event)>)
        };
        inner.set_onstart(Some(start_cb.as_ref().unchecked_ref()));

        let end_cb = Closure::wrap(Box::new(move |_: web_sys::Event| {
            on_listening.emit(false);
        }) as Box<dyn FnMut(web_sys::Event)>);
        inner.set_onend(Some(end_cb.as_ref().unchecked_ref()));

        let error_cb = Closure::wrap(Box::new(move |event: web_sys::Event| {
            on_error.emit(error_message(&event));
        }) as Box<dyn FnMut(web_sys::Event)>);
        inner.set_onerror(Some(error_cb.as_ref().unchecked_ref()));

        Ok(Self {
            inner,
            _on_result: result_cb,
            _on_start: start_cb,
            _on_end: end_cb,
            _on_error: error_cb,
        })
    }

    pub fn start(&self) -> Result<(), JsValue> {
        self.inner.start()
    }
}

impl Drop for SpeechRecognizer {
    fn drop(&mut self) {
        self.inner.set_onresult(None);
        self.inner.set_onstart(None);
        self.inner.set_onend(None);
        self.inner.set_onerror(None);
    }
}

/// Chrome still ships the engine under the `webkit` prefix.
fn recognition_handle() -> Result<SpeechRecognition, JsValue> {
    if let Ok(inner) = SpeechRecognition::new() {
        return Ok(inner);
    }
    let window =
        web_sys::window().ok_or_else(|| JsValue::from_str("window no disponible"))?;
    let ctor = js_sys::Reflect::get(window.as_ref(), &"webkitSpeechRecognition".into())?;
    let ctor: js_sys::Function = ctor
        .dyn_into()
        .map_err(|_| JsValue::from_str("reconocimiento de voz no soportado"))?;
    let instance = js_sys::Reflect::construct(&ctor, &js_sys::Array::new())?;
    Ok(instance.unchecked_into())
}

fn error_message(event: &web_sys::Event) -> String {
    let code = js_sys::Reflect::get(event.as_ref(), &"error".into())
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default();
    match code.as_str() {
        "not-allowed" | "service-not-allowed" => {
            "Acceso al micrófono denegado".to_string()
        }
        "no-speech" => "No se detectó voz".to_string(),
        "" => "Error de reconocimiento".to_string(),
        other => format!("Error de reconocimiento: {other}"),
    }
}

/// Spoken feedback via the browser's synthesis engine; best effort.
pub fn speak(text: &str, lang: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(synth) = window.speech_synthesis() else {
        return;
    };
    if let Ok(utterance) = SpeechSynthesisUtterance::new_with_text(text) {
        utterance.set_lang(lang);
        synth.speak(&utterance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_gate_is_a_case_insensitive_substring_match() {
        assert!(contains_keyword("mike adelante", "mike"));
        assert!(contains_keyword("oye Mike, detener", "mike"));
        assert!(!contains_keyword("adelante por favor", "mike"));
        assert!(!contains_keyword("", "mike"));
    }

    #[test]
    fn ninguno_resolves_to_no_movement() {
        assert!(resolve_intent("ninguno").is_none());
        assert!(resolve_intent("NINGUNO").is_none());
        assert!(resolve_intent("  Ninguno  ").is_none());
    }

    #[test]
    fn classifier_reply_resolves_against_the_catalog() {
        assert_eq!(resolve_intent("Adelante").unwrap().id, 1);
        assert_eq!(resolve_intent("giro 360 derecha").unwrap().id, 10);
        assert_eq!(resolve_intent("Vuelta atras derecha").unwrap().id, 6);
    }

    #[test]
    fn off_catalog_reply_resolves_to_none() {
        assert!(resolve_intent("acelera mucho").is_none());
    }

    #[test]
    fn phases_start_idle() {
        assert_eq!(VoicePhase::default(), VoicePhase::Idle);
        assert_eq!(VoicePhase::default().label(), "inactivo");
    }
}
