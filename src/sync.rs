//! Cross-Tab Sync Bus.
//!
//! A successful submission is broadcast to every other open tab by writing a
//! `SyncEnvelope` to a shared localStorage key; the browser delivers the
//! resulting `storage` event to every tab except the writer. The same
//! envelope is also re-dispatched as a same-tab `movimientoGuardado`
//! CustomEvent so in-page listeners see local and remote saves uniformly.

use wasm_bindgen::prelude::*;
use web_sys::{console, CustomEvent, CustomEventInit, StorageEvent};
use yew::Callback;

use crate::types::SyncEnvelope;

pub const SYNC_KEY: &str = "ultimoMovimientoSync";
pub const SAVED_EVENT: &str = "movimientoGuardado";

pub struct SyncBus;

impl SyncBus {
    /// Broadcasts a saved movement to other tabs and to same-tab listeners.
    pub fn publish(envelope: &SyncEnvelope) {
        let Some(window) = web_sys::window() else {
            return;
        };
        match serde_json::to_string(envelope) {
            Ok(raw) => {
                if let Ok(Some(store)) = window.local_storage() {
                    let _ = store.set_item(SYNC_KEY, &raw);
                }
            }
            Err(err) => console::warn_1(&format!("sync publish: {err}").into()),
        }
        dispatch_saved_event(envelope);
    }

    /// Removes the broadcast key so freshly opened tabs do not replay a
    /// stale movement.
    pub fn clear() {
        if let Some(window) = web_sys::window() {
            if let Ok(Some(store)) = window.local_storage() {
                let _ = store.remove_item(SYNC_KEY);
            }
        }
    }

    /// Installs the storage-event listener. The returned guard owns the
    /// closure and detaches the listener when dropped. Malformed payloads
    /// are logged and dropped, never propagated.
    pub fn subscribe(on_envelope: Callback<SyncEnvelope>) -> Option<SyncSubscription> {
        let window = web_sys::window()?;
        let listener = Closure::wrap(Box::new(move |event: StorageEvent| {
            if event.key().as_deref() != Some(SYNC_KEY) {
                return;
            }
            let Some(raw) = event.new_value() else {
                return;
            };
            match serde_json::from_str::<SyncEnvelope>(&raw) {
                Ok(envelope) => {
                    dispatch_saved_event(&envelope);
                    on_envelope.emit(envelope);
                }
                Err(err) => {
                    console::warn_1(&format!("sync payload inválido: {err}").into());
                }
            }
        }) as Box<dyn FnMut(StorageEvent)>);
        window
            .add_event_listener_with_callback("storage", listener.as_ref().unchecked_ref())
            .ok()?;
        Some(SyncSubscription { listener })
    }
}

fn dispatch_saved_event(envelope: &SyncEnvelope) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let init = CustomEventInit::new();
    if let Ok(detail) = serde_wasm_bindgen::to_value(envelope) {
        init.set_detail(&detail);
    }
    if let Ok(event) = CustomEvent::new_with_event_init_dict(SAVED_EVENT, &init) {
        let _ = window.dispatch_event(&event);
    }
}

pub struct SyncSubscription {
    listener: Closure<dyn FnMut(StorageEvent)>,
}

impl Drop for SyncSubscription {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback(
                "storage",
                self.listener.as_ref().unchecked_ref(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_json_matches_the_shared_wire_shape() {
        let envelope = SyncEnvelope {
            id_movimiento: Some(3),
            movimiento: "Detener".into(),
            fecha: Some("2025-11-05T10:00:00Z".into()),
            ts: "2025-11-05T10:00:01Z".into(),
        };
        let raw = serde_json::to_string(&envelope).unwrap();
        let back: SyncEnvelope = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, envelope);
    }

    #[test]
    fn malformed_payload_is_an_error_not_a_panic() {
        assert!(serde_json::from_str::<SyncEnvelope>("no es json").is_err());
        assert!(serde_json::from_str::<SyncEnvelope>(r#"{"ts": 7}"#).is_err());
    }

    #[test]
    fn minimal_foreign_payload_is_accepted() {
        let envelope: SyncEnvelope =
            serde_json::from_str(r#"{"movimiento":"Detener","ts":"2025-11-05T10:00:00Z"}"#)
                .unwrap();
        assert_eq!(envelope.id_movimiento, None);
        assert_eq!(envelope.movimiento, "Detener");
    }
}
