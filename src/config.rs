/// Application context built once at startup and handed to the components
/// that need it. Replaces the ambient module globals of earlier revisions.
#[derive(Clone, PartialEq, Debug)]
pub struct Config {
    /// Base URL of the movement REST API.
    pub api_base: String,
    /// Key-retrieval service for the classifier credential.
    pub key_url: String,
    /// Chat-completion endpoint used for intent classification.
    pub chat_url: String,
    pub chat_model: String,
    /// Trigger word that must appear in a transcript before any remote
    /// classification is attempted.
    pub activation_keyword: String,
    /// BCP-47 tag for recognition and synthesis.
    pub speech_lang: String,
    pub poll_interval_ms: i32,
    /// Row count requested by the polling table.
    pub poll_window: u32,
    /// Maximum rendered history rows.
    pub history_cap: usize,
    /// Entries replayed from the ledger on startup.
    pub restore_window: usize,
    /// Session movements that count as a full progress bar.
    pub progress_goal: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "http://52.72.153.166:5500/api".into(),
            key_url: "https://68e538928e116898997ee64c.mockapi.io/apikey".into(),
            chat_url: "https://api.openai.com/v1/chat/completions".into(),
            chat_model: "gpt-4o-mini".into(),
            activation_keyword: "mike".into(),
            speech_lang: "es-ES".into(),
            poll_interval_ms: 2000,
            poll_window: 5,
            history_cap: 50,
            restore_window: 8,
            progress_goal: 5,
        }
    }
}

/// Progress of the session toward `goal`, clamped at 100.
pub fn progress_pct(count: usize, goal: usize) -> u32 {
    if goal == 0 {
        return 100;
    }
    let pct = (count as f64 / goal as f64 * 100.0).round() as u32;
    pct.min(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_proportional_below_goal() {
        assert_eq!(progress_pct(0, 5), 0);
        assert_eq!(progress_pct(1, 5), 20);
        assert_eq!(progress_pct(3, 5), 60);
    }

    #[test]
    fn progress_clamps_at_100() {
        assert_eq!(progress_pct(5, 5), 100);
        assert_eq!(progress_pct(7, 5), 100);
    }
}
