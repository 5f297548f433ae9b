use serde::{Deserialize, Serialize};

/// One of the 11 fixed vehicle commands. The catalog is shared with the
/// backend; ids are stable and 1-based.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Movement {
    pub id: u32,
    pub label: &'static str,
    pub icon: &'static str,
}

pub const MOVEMENTS: [Movement; 11] = [
    Movement { id: 1, label: "Adelante", icon: "🚗" },
    Movement { id: 2, label: "Atrás", icon: "↩️" },
    Movement { id: 3, label: "Detener", icon: "⏹️" },
    Movement { id: 4, label: "Vuelta adelante derecha", icon: "↘️" },
    Movement { id: 5, label: "Vuelta adelante izquierda", icon: "↙️" },
    Movement { id: 6, label: "Vuelta atrás derecha", icon: "↩️➡️" },
    Movement { id: 7, label: "Vuelta atrás izquierda", icon: "↩️⬅️" },
    Movement { id: 8, label: "Giro 90° derecha", icon: "↪️" },
    Movement { id: 9, label: "Giro 90° izquierda", icon: "↩️" },
    Movement { id: 10, label: "Giro 360° derecha", icon: "🔄" },
    Movement { id: 11, label: "Giro 360° izquierda", icon: "🔄" },
];

impl Movement {
    pub fn from_id(id: u32) -> Option<Movement> {
        MOVEMENTS.iter().copied().find(|m| m.id == id)
    }

    /// Case-insensitive catalog lookup. Tolerates the accent-stripping
    /// artifact of speech transcripts ("atras" for "atrás") and missing
    /// degree signs ("giro 90 derecha").
    pub fn from_label(label: &str) -> Option<Movement> {
        let wanted = normalize_label(label);
        if wanted.is_empty() {
            return None;
        }
        MOVEMENTS
            .iter()
            .copied()
            .find(|m| normalize_label(m.label) == wanted)
    }
}

/// Normalization applied before any label comparison.
pub fn normalize_label(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace("atras", "atrás")
        .replace('°', "")
}

/// One accepted command inside the current tab session.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SessionEntry {
    pub id: u32,
    pub ts: String,
}

/// Typed projection of a backend movement record.
#[derive(Clone, PartialEq, Debug)]
pub struct ServerRecord {
    pub id: u32,
    pub label: String,
    pub timestamp: Option<String>,
}

/// Cross-tab broadcast payload written to the sync storage key. The id may
/// be absent in payloads from older pages; the label is authoritative.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SyncEnvelope {
    #[serde(default)]
    pub id_movimiento: Option<u32>,
    pub movimiento: String,
    #[serde(default)]
    pub fecha: Option<String>,
    pub ts: String,
}

impl SyncEnvelope {
    /// The movement this envelope refers to, by id when present, by label
    /// otherwise.
    pub fn movement(&self) -> Option<Movement> {
        self.id_movimiento
            .and_then(Movement::from_id)
            .or_else(|| Movement::from_label(&self.movimiento))
    }
}

/// One rendered history row.
#[derive(Clone, PartialEq, Debug)]
pub struct HistoryEntry {
    pub label: String,
    pub icon: String,
    pub ts: String,
    pub pct: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_ids_1_to_11() {
        for id in 1..=11 {
            assert!(Movement::from_id(id).is_some(), "missing id {id}");
        }
        assert!(Movement::from_id(0).is_none());
        assert!(Movement::from_id(12).is_none());
    }

    #[test]
    fn label_lookup_is_case_insensitive() {
        assert_eq!(Movement::from_label("adelante").unwrap().id, 1);
        assert_eq!(Movement::from_label("DETENER").unwrap().id, 3);
        assert_eq!(Movement::from_label("Vuelta Adelante Derecha").unwrap().id, 4);
    }

    #[test]
    fn label_lookup_repairs_stripped_accent() {
        assert_eq!(Movement::from_label("atras").unwrap().id, 2);
        assert_eq!(Movement::from_label("vuelta atras izquierda").unwrap().id, 7);
    }

    #[test]
    fn label_lookup_ignores_degree_sign() {
        assert_eq!(Movement::from_label("Giro 90 derecha").unwrap().id, 8);
        assert_eq!(Movement::from_label("Giro 360° izquierda").unwrap().id, 11);
    }

    #[test]
    fn unknown_label_resolves_to_none() {
        assert!(Movement::from_label("saltar").is_none());
        assert!(Movement::from_label("").is_none());
    }

    #[test]
    fn envelope_resolves_by_id_before_label() {
        let env = SyncEnvelope {
            id_movimiento: Some(3),
            movimiento: "Adelante".into(),
            fecha: None,
            ts: "2025-11-05T10:34:12.000Z".into(),
        };
        assert_eq!(env.movement().unwrap().id, 3);
    }

    #[test]
    fn envelope_without_id_resolves_by_label() {
        let env: SyncEnvelope =
            serde_json::from_str(r#"{"movimiento":"Detener","ts":"2025-11-05T10:00:00Z"}"#)
                .unwrap();
        assert_eq!(env.movement().unwrap().id, 3);
    }
}
