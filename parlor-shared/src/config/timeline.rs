use serde::{Deserialize, Serialize};

/// Tuning knobs for the timeline view engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineConfig {
    /// Minimum elapsed time between two consecutive events, in
    /// seconds, that triggers a time-gap header between them.
    #[serde(default = "default_gap_threshold_seconds")]
    pub gap_threshold_seconds: u32,

    /// Whether consecutive events from one sender share a single
    /// sender header. When disabled, no sender headers are created.
    #[serde(default = "default_group_by_sender")]
    pub group_by_sender: bool,

    /// Number of events to request per history page.
    #[serde(default = "default_history_page_size")]
    pub history_page_size: u32,
}

const fn default_gap_threshold_seconds() -> u32 {
    600
}

const fn default_group_by_sender() -> bool {
    true
}

const fn default_history_page_size() -> u32 {
    30
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            gap_threshold_seconds: default_gap_threshold_seconds(),
            group_by_sender: default_group_by_sender(),
            history_page_size: default_history_page_size(),
        }
    }
}

impl TimelineConfig {
    /// The gap threshold in milliseconds, for comparison against event
    /// timestamp deltas.
    #[must_use]
    pub fn gap_threshold_ms(&self) -> i64 {
        i64::from(self.gap_threshold_seconds) * 1_000
    }
}
