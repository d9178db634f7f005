//! Feature extraction
//!
//! Reduces a submission's raw event stream to the aggregate features the
//! scorer reads. Extraction is total: unknown event types are skipped and
//! missing optional fields fall back to explicit defaults.

use crate::types::{Event, FeatureSet, Submission};

/// Keystroke gap above which a pause counts as long (5 minutes, in milliseconds)
pub const LONG_PAUSE_THRESHOLD_MS: f64 = 300_000.0;

/// Feature extractor for writing sessions
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Extract the feature set from a submission
    pub fn extract(submission: &Submission) -> FeatureSet {
        let events = &submission.events;

        // A key event without a gap contributes nothing; it is not a zero gap.
        let gaps: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                Event::Key { gap } => *gap,
                _ => None,
            })
            .collect();

        // Paste and sudden-insert lengths default to zero when missing.
        let paste_lengths: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                Event::Paste { length } => Some(length.unwrap_or(0)),
                _ => None,
            })
            .collect();

        let insert_lengths: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                Event::SuddenInsert { length } => Some(length.unwrap_or(0)),
                _ => None,
            })
            .collect();

        // Saturate rather than wrap; a wrapped total would hide the paste.
        let total_pasted = paste_lengths
            .iter()
            .fold(0u64, |acc, &len| acc.saturating_add(len));

        FeatureSet {
            avg_gap: compute_mean(&gaps),
            long_pauses: count_long_pauses(&gaps),
            paste_ratio: compute_paste_ratio(total_pasted, submission.total_chars),
            max_paste: max_or_zero(&paste_lengths),
            total_time: submission.duration_seconds,
            total_words: submission.total_words,
            sudden_inserts: insert_lengths.len() as u32,
            max_sudden_insert: max_or_zero(&insert_lengths),
        }
    }
}

/// Arithmetic mean, 0 for an empty slice
fn compute_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Count gaps strictly above the long-pause threshold
fn count_long_pauses(gaps: &[f64]) -> u32 {
    gaps.iter().filter(|&&g| g > LONG_PAUSE_THRESHOLD_MS).count() as u32
}

/// Compute paste ratio
///
/// Formula: `total_pasted / max(total_chars, 1)`
/// The denominator floors at 1 so an empty document never divides by zero.
/// The result is not clamped and can exceed 1 when pasted text was later deleted.
fn compute_paste_ratio(total_pasted: u64, total_chars: i64) -> f64 {
    total_pasted as f64 / total_chars.max(1) as f64
}

fn max_or_zero(values: &[u64]) -> u64 {
    values.iter().copied().max().unwrap_or(0)
}
