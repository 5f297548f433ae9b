//! Typed parsing of the backend's loose response shapes.
//!
//! The API wraps payloads in a `data` envelope inconsistently and names
//! fields differently across deployments (`id_movimiento` vs `id`,
//! `fecha_hora` vs `created_at`). The fallback precedence lives here,
//! explicitly, instead of being spread over the call sites.

use serde_json::Value;

use crate::error::ApiError;
use crate::types::{Movement, ServerRecord};

/// Unwraps the optional `data` envelope.
fn unwrap_data(value: &Value) -> &Value {
    match value.get("data") {
        Some(inner) => inner,
        None => value,
    }
}

/// Numeric fields sometimes arrive as JSON strings.
fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn field_string(value: &Value, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| value.get(*name).and_then(Value::as_str))
        .map(str::to_owned)
}

/// One movement record. Id precedence: `id_movimiento`, then `id`. Label
/// precedence: `movimiento`, then the local catalog. Timestamp precedence:
/// `fecha_hora`, then `created_at`, then absent.
pub fn server_record(value: &Value) -> Result<ServerRecord, ApiError> {
    let id = value
        .get("id_movimiento")
        .and_then(as_u32)
        .or_else(|| value.get("id").and_then(as_u32))
        .ok_or_else(|| ApiError::Parse("registro sin id de movimiento".into()))?;
    let label = field_string(value, &["movimiento"])
        .or_else(|| Movement::from_id(id).map(|m| m.label.to_owned()))
        .unwrap_or_else(|| format!("Movimiento {id}"));
    let timestamp = field_string(value, &["fecha_hora", "created_at"]);
    Ok(ServerRecord { id, label, timestamp })
}

/// Response of `GET /movimientos/ultimo`. `{data: null}` means "no record
/// yet" and is not an error.
pub fn latest(value: &Value) -> Result<Option<ServerRecord>, ApiError> {
    let inner = unwrap_data(value);
    if inner.is_null() {
        return Ok(None);
    }
    server_record(inner).map(Some)
}

/// Response of `GET /movimientos/ultimos?n=..`: either `{data: [...]}` or a
/// bare array. Entries without a usable id are dropped.
pub fn record_list(value: &Value) -> Result<Vec<ServerRecord>, ApiError> {
    let inner = unwrap_data(value);
    let items = inner
        .as_array()
        .ok_or_else(|| ApiError::Parse("se esperaba una lista de movimientos".into()))?;
    Ok(items
        .iter()
        .filter_map(|item| server_record(item).ok())
        .collect())
}

/// Server-assigned timestamp of a submission response, preferred over the
/// client clock when present.
pub fn submit_timestamp(value: &Value) -> Option<String> {
    value
        .get("data")
        .and_then(|data| field_string(data, &["fecha_hora"]))
        .or_else(|| field_string(value, &["fecha_hora", "created_at"]))
}

/// Key-service response: an array whose first element carries `Api_Key`.
pub fn api_key(value: &Value) -> Result<String, ApiError> {
    value
        .as_array()
        .and_then(|items| items.first())
        .and_then(|item| item.get("Api_Key"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| ApiError::Parse("respuesta del servicio de claves sin Api_Key".into()))
}

/// First chat-completion choice, trimmed. `None` when the shape is off.
pub fn classifier_reply(value: &Value) -> Option<String> {
    let content = value
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()?
        .trim();
    if content.is_empty() {
        None
    } else {
        Some(content.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_prefers_id_movimiento_over_id() {
        let rec = server_record(&json!({"id_movimiento": 3, "id": 99})).unwrap();
        assert_eq!(rec.id, 3);
        assert_eq!(rec.label, "Detener");
    }

    #[test]
    fn record_accepts_plain_id_and_string_numbers() {
        let rec = server_record(&json!({"id": "2", "created_at": "2025-11-05T10:00:00Z"})).unwrap();
        assert_eq!(rec.id, 2);
        assert_eq!(rec.label, "Atrás");
        assert_eq!(rec.timestamp.as_deref(), Some("2025-11-05T10:00:00Z"));
    }

    #[test]
    fn record_prefers_server_label_and_fecha_hora() {
        let rec = server_record(&json!({
            "id_movimiento": 1,
            "movimiento": "Arranque",
            "fecha_hora": "2025-11-05T10:00:00Z",
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(rec.label, "Arranque");
        assert_eq!(rec.timestamp.as_deref(), Some("2025-11-05T10:00:00Z"));
    }

    #[test]
    fn record_without_id_is_a_parse_error() {
        assert!(matches!(
            server_record(&json!({"movimiento": "Adelante"})),
            Err(ApiError::Parse(_))
        ));
    }

    #[test]
    fn latest_maps_null_data_to_absence() {
        assert_eq!(latest(&json!({"data": null})).unwrap(), None);
    }

    #[test]
    fn latest_unwraps_data_envelope() {
        let rec = latest(&json!({"data": {"id_movimiento": 5}})).unwrap().unwrap();
        assert_eq!(rec.id, 5);
        assert_eq!(rec.label, "Vuelta adelante izquierda");
    }

    #[test]
    fn record_list_accepts_envelope_and_bare_array() {
        let enveloped = json!({"data": [{"id_movimiento": 1}, {"id": 2}]});
        let bare = json!([{"id_movimiento": 3}]);
        assert_eq!(record_list(&enveloped).unwrap().len(), 2);
        assert_eq!(record_list(&bare).unwrap()[0].id, 3);
    }

    #[test]
    fn record_list_drops_entries_without_id() {
        let list = record_list(&json!([{"movimiento": "x"}, {"id": 4}])).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, 4);
    }

    #[test]
    fn record_list_rejects_non_arrays() {
        assert!(record_list(&json!({"data": {"id": 1}})).is_err());
    }

    #[test]
    fn submit_timestamp_precedence() {
        assert_eq!(
            submit_timestamp(&json!({"data": {"fecha_hora": "a"}, "created_at": "b"})),
            Some("a".into())
        );
        assert_eq!(
            submit_timestamp(&json!({"created_at": "b"})),
            Some("b".into())
        );
        assert_eq!(submit_timestamp(&json!({"data": {}})), None);
    }

    #[test]
    fn api_key_reads_first_entry() {
        assert_eq!(
            api_key(&json!([{"Api_Key": "sk-abc"}, {"Api_Key": "sk-def"}])).unwrap(),
            "sk-abc"
        );
        assert!(api_key(&json!([])).is_err());
        assert!(api_key(&json!({"Api_Key": "sk"})).is_err());
    }

    #[test]
    fn classifier_reply_trims_first_choice() {
        let value = json!({"choices": [{"message": {"content": "  Adelante \n"}}]});
        assert_eq!(classifier_reply(&value).as_deref(), Some("Adelante"));
        assert_eq!(classifier_reply(&json!({"choices": []})), None);
        assert_eq!(
            classifier_reply(&json!({"choices": [{"message": {"content": "  "}}]})),
            None
        );
    }
}
