//! Bounded in-memory verdict history.

use std::collections::VecDeque;

use crate::common::types::DetectionResult;

/// How many verdicts the history retains.
pub const HISTORY_CAPACITY: usize = 10;

/// One remembered submission.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub filename: String,
    pub result: DetectionResult,
}

/// Most-recent-first history of analyzed images.
///
/// New entries go to the front; anything beyond the capacity falls off the
/// back. Entries are kept exactly as submitted, with no deduplication, and
/// live only in memory.
#[derive(Debug, Default)]
pub struct DetectionHistory {
    entries: VecDeque<HistoryEntry>,
}

impl DetectionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, filename: impl Into<String>, result: DetectionResult) {
        self.entries.push_front(HistoryEntry {
            filename: filename.into(),
            result,
        });
        self.entries.truncate(HISTORY_CAPACITY);
    }

    /// Entries from most recent to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::DetectedFeatures;
    use chrono::Utc;

    fn result(confidence: f64) -> DetectionResult {
        DetectionResult {
            is_israeli_product: false,
            confidence,
            detected_features: DetectedFeatures::default(),
            brand_info: None,
            timestamp: Utc::now(),
            processing_time_ms: None,
        }
    }

    #[test]
    fn newest_entry_comes_first() {
        let mut history = DetectionHistory::new();
        history.record("first.png", result(0.1));
        history.record("second.png", result(0.2));

        let files: Vec<_> = history.iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(files, ["second.png", "first.png"]);
        assert_eq!(history.latest().unwrap().filename, "second.png");
    }

    #[test]
    fn history_never_exceeds_capacity() {
        let mut history = DetectionHistory::new();
        for i in 0..25 {
            history.record(format!("{}.png", i), result(0.5));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        // The survivors are the 10 most recent, newest first
        let files: Vec<_> = history.iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(files[0], "24.png");
        assert_eq!(files[9], "15.png");
    }

    #[test]
    fn duplicate_submissions_are_kept() {
        let mut history = DetectionHistory::new();
        history.record("same.png", result(0.5));
        history.record("same.png", result(0.5));
        assert_eq!(history.len(), 2);
    }
}
