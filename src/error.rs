//! Error types for u-rotation.
//!
//! The assignment engine itself never fails on an individual placement:
//! shortfalls are reported through [`ScheduleReport`](crate::scheduler::ScheduleReport).
//! These errors cover configuration, catalogue loading, and manual
//! single-assignment operations on a [`Schedule`](crate::models::Schedule).

use std::io;

/// Result type alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-level error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error while reading a catalogue or configuration file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid scheduler configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A manual assignment was rejected.
    #[error("Assignment rejected: {0}")]
    Assignment(#[from] AssignmentError),
}

/// Reasons a manual assignment is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentError {
    /// The referenced block does not exist.
    #[error("block {block_id} not found")]
    BlockNotFound { block_id: String },

    /// The resident already holds a rotation in that period.
    #[error("resident {resident_id} is already assigned to {rotation} in period {period}, year {year}")]
    PeriodConflict {
        resident_id: String,
        rotation: String,
        period: u32,
        year: i32,
    },

    /// The block is full.
    #[error("block {block_id} is at max capacity ({max_occupancy} residents)")]
    AtCapacity { block_id: String, max_occupancy: u32 },
}
