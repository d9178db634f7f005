//! Integrity Checker - heuristic authorship-risk scoring for writing sessions
//!
//! The checker turns a recorded editor session (keystrokes, pastes, sudden
//! insertions, timing) into a bounded risk score with human-readable reasons
//! through a deterministic pipeline: validation → feature extraction → rule
//! scoring → report.
//!
//! ## Modules
//!
//! - **Core**: [`features`] and [`scoring`], pure functions over a single submission
//! - **Pipeline**: [`pipeline`], JSON in, report out
//! - **Transport**: [`server`], the `POST /submit` HTTP endpoint (feature `server`)

pub mod config;
pub mod error;
pub mod features;
pub mod pipeline;
pub mod scoring;
pub mod types;

#[cfg(feature = "server")]
pub mod server;

pub use config::ServiceConfig;
pub use error::{IntegrityError, ValidationError};
pub use features::FeatureExtractor;
pub use pipeline::{analyze_submission, IntegrityAnalyzer};
pub use scoring::{RiskScorer, Rule, MAX_RISK};
pub use types::{Event, FeatureSet, ScoreResult, Submission, SubmissionReport};

#[cfg(feature = "server")]
pub use server::{serve, IntegrityService};

/// Crate version reported by the CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
