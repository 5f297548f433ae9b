//! Session Ledger (sessionStorage) and Persistence Mirror (localStorage).
//!
//! Storage handles can be unavailable (private windows, disabled storage);
//! every operation degrades silently to the empty state in that case, the
//! page keeps working without persistence.

use web_sys::Storage;

use crate::types::SessionEntry;

pub const SESSION_KEY: &str = "sessionMovs";
pub const LAST_ID_KEY: &str = "ultimoMovimiento";
pub const LAST_TS_KEY: &str = "ultimaFecha";

fn session_store() -> Option<Storage> {
    web_sys::window()?.session_storage().ok().flatten()
}

fn local_store() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

pub fn now_iso() -> String {
    String::from(js_sys::Date::new_0().to_iso_string())
}

/// Should `id` be recorded given the current tail of the ledger? Rejects
/// only a consecutive repeat of the same id.
pub fn is_distinct_from_last(entries: &[SessionEntry], id: u32) -> bool {
    entries.last().map(|last| last.id != id).unwrap_or(true)
}

/// Append-only, per-tab list of accepted commands.
pub struct SessionLedger;

impl SessionLedger {
    pub fn entries() -> Vec<SessionEntry> {
        let raw = session_store().and_then(|s| s.get_item(SESSION_KEY).ok().flatten());
        match raw {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            None => Vec::new(),
        }
    }

    fn write(entries: &[SessionEntry]) {
        if let (Some(store), Ok(raw)) = (session_store(), serde_json::to_string(entries)) {
            let _ = store.set_item(SESSION_KEY, &raw);
        }
    }

    pub fn append(id: u32) {
        let mut entries = Self::entries();
        entries.push(SessionEntry { id, ts: now_iso() });
        Self::write(&entries);
    }

    /// Duplicate-suppressing append used by the voice path: a command equal
    /// to the immediately preceding one is dropped. Returns whether the
    /// entry was recorded.
    pub fn append_if_distinct(id: u32) -> bool {
        let mut entries = Self::entries();
        if !is_distinct_from_last(&entries, id) {
            return false;
        }
        entries.push(SessionEntry { id, ts: now_iso() });
        Self::write(&entries);
        true
    }

    pub fn clear() {
        if let Some(store) = session_store() {
            let _ = store.remove_item(SESSION_KEY);
        }
    }

    pub fn count() -> usize {
        Self::entries().len()
    }
}

/// Durable last-known movement, used to repaint the status line on reload
/// without a network round trip.
pub struct LastMovementMirror;

impl LastMovementMirror {
    pub fn set(id: u32, ts: Option<&str>) {
        if let Some(store) = local_store() {
            let _ = store.set_item(LAST_ID_KEY, &id.to_string());
            if let Some(ts) = ts {
                let _ = store.set_item(LAST_TS_KEY, ts);
            }
        }
    }

    pub fn get() -> Option<(u32, Option<String>)> {
        let store = local_store()?;
        let id: u32 = store.get_item(LAST_ID_KEY).ok().flatten()?.parse().ok()?;
        let ts = store.get_item(LAST_TS_KEY).ok().flatten();
        Some((id, ts))
    }

    /// Forgets the mirrored movement. The session-clear button keeps the
    /// mirror so the status line survives a reset; nothing in the page
    /// calls this, it exists for a full device hand-off.
    pub fn clear() {
        if let Some(store) = local_store() {
            let _ = store.remove_item(LAST_ID_KEY);
            let _ = store.remove_item(LAST_TS_KEY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32) -> SessionEntry {
        SessionEntry { id, ts: "2025-11-05T10:00:00Z".into() }
    }

    #[test]
    fn first_entry_is_always_distinct() {
        assert!(is_distinct_from_last(&[], 3));
    }

    #[test]
    fn consecutive_repeat_is_suppressed() {
        assert!(!is_distinct_from_last(&[entry(1), entry(3)], 3));
    }

    #[test]
    fn non_consecutive_repeat_is_recorded() {
        assert!(is_distinct_from_last(&[entry(3), entry(1)], 3));
    }

    #[test]
    fn ledger_entries_round_trip_as_json() {
        let entries = vec![entry(1), entry(2)];
        let raw = serde_json::to_string(&entries).unwrap();
        let back: Vec<SessionEntry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, entries);
    }

    #[test]
    fn corrupt_ledger_payload_degrades_to_empty() {
        let back: Vec<SessionEntry> =
            serde_json::from_str("{not json").unwrap_or_default();
        assert!(back.is_empty());
    }
}
