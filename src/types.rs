//! Submission data types
//!
//! This module defines the writing-session payload received from the editor
//! frontend, the intermediate feature set, and the scored report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A single editor event, discriminated by its `type` tag.
///
/// Only the fields the scorer reads are modelled. Anything else the frontend
/// attaches (`key`, `time`, `words`, `delta`, ...) is ignored during parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Keystroke
    Key {
        /// Milliseconds since the previous keystroke
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gap: Option<f64>,
    },
    /// Clipboard paste
    Paste {
        /// Characters pasted
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<u64>,
    },
    /// Text that appeared without a matching keystroke or paste
    SuddenInsert {
        /// Characters inserted at once
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<u64>,
    },
    /// Any event type the scorer does not look at (`edit`, `large_insert`, ...)
    #[serde(other)]
    Other,
}

/// A complete writing session as posted by the editor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// Final document text
    pub text: String,
    /// Character count of the final text
    pub total_chars: i64,
    /// Word count of the final text
    pub total_words: i64,
    /// Session start (epoch milliseconds)
    #[serde(rename = "startTime")]
    pub start_time: i64,
    /// Session end (epoch milliseconds)
    #[serde(rename = "endTime")]
    pub end_time: i64,
    /// Session length in whole seconds
    pub duration_seconds: i64,
    /// Recorded editor events, in capture order
    pub events: Vec<Event>,
}

impl Submission {
    /// Reject shapes that deserialize fine but make no sense as counts.
    ///
    /// `endTime < startTime` is tolerated.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.total_chars < 0 {
            return Err(ValidationError::NegativeCount {
                field: "total_chars",
                value: self.total_chars,
            });
        }
        if self.total_words < 0 {
            return Err(ValidationError::NegativeCount {
                field: "total_words",
                value: self.total_words,
            });
        }
        Ok(())
    }

    /// Session start and end as UTC timestamps, if both are representable.
    pub fn session_window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = DateTime::<Utc>::from_timestamp_millis(self.start_time)?;
        let end = DateTime::<Utc>::from_timestamp_millis(self.end_time)?;
        Some((start, end))
    }
}

/// Aggregate behavioral features extracted from a submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Mean keystroke gap in milliseconds (0 when no gaps were recorded)
    pub avg_gap: f64,
    /// Keystroke gaps longer than five minutes
    pub long_pauses: u32,
    /// Pasted characters / max(total_chars, 1); not clamped
    pub paste_ratio: f64,
    /// Largest single paste
    pub max_paste: u64,
    /// Session duration in seconds
    pub total_time: i64,
    /// Word count of the final text
    pub total_words: i64,
    /// Number of sudden insertions
    pub sudden_inserts: u32,
    /// Largest single sudden insertion
    pub max_sudden_insert: u64,
}

/// Risk score and the reasons that contributed to it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Bounded risk, 0-100
    pub risk: u32,
    /// Reasons in rule order
    pub reasons: Vec<String>,
}

/// Response body for a scored submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReport {
    pub risk: u32,
    pub reasons: Vec<String>,
    pub features: FeatureSet,
}

impl SubmissionReport {
    pub fn new(score: ScoreResult, features: FeatureSet) -> Self {
        Self {
            risk: score.risk,
            reasons: score.reasons,
            features,
        }
    }
}
