//! Submission pipeline orchestration
//!
//! This module provides the public API for scoring a writing session.
//! Pipeline: Submission JSON → Validation → Features → Scoring → Report JSON

use tracing::{debug, info};

use crate::error::IntegrityError;
use crate::features::FeatureExtractor;
use crate::scoring::RiskScorer;
use crate::types::{Submission, SubmissionReport};

/// Parse a submission JSON string
pub fn parse_submission(json: &str) -> Result<Submission, IntegrityError> {
    Ok(serde_json::from_str(json)?)
}

/// Score submission JSON and return report JSON (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let report_json = analyze_submission(submission_json)?;
/// ```
pub fn analyze_submission(submission_json: &str) -> Result<String, IntegrityError> {
    // Stage 1: Parse
    let submission = parse_submission(submission_json)?;

    // Stage 2-4: Validate, extract, score
    let report = IntegrityAnalyzer::new().analyze(&submission)?;

    // Stage 5: Encode
    serde_json::to_string(&report).map_err(|e| IntegrityError::EncodingError(e.to_string()))
}

/// Scores submissions one at a time.
///
/// Holds no per-request state; a single instance can be shared across
/// concurrent requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegrityAnalyzer;

impl IntegrityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Validate, extract features, and score a submission
    pub fn analyze(&self, submission: &Submission) -> Result<SubmissionReport, IntegrityError> {
        submission.validate()?;

        let features = FeatureExtractor::extract(submission);
        let score = RiskScorer::score(&features);

        match submission.session_window() {
            Some((start, end)) => debug!(%start, %end, events = submission.events.len(), "session window"),
            None => debug!(
                start_time = submission.start_time,
                end_time = submission.end_time,
                "session window out of range"
            ),
        }

        info!(
            words = submission.total_words,
            duration_seconds = submission.duration_seconds,
            features = ?features,
            risk = score.risk,
            reasons = ?score.reasons,
            "scored submission"
        );

        Ok(SubmissionReport::new(score, features))
    }
}
