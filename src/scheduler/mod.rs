//! Rotation assignment engine and outcome reporting.
//!
//! # Algorithm
//!
//! `RotationScheduler` runs six greedy phases over one explicit
//! [`SchedulerState`]. It is not optimal, but never double-books a
//! resident, never overfills a block and always terminates.
//!
//! # Report
//!
//! `ScheduleReport` lists every shortfall the heuristic left behind:
//! residents below quota, blocks below minimum, sites below minimum.

mod phases;
mod report;
mod rotation;
mod state;

pub use phases::quota_for;
pub use report::{
    BlockShortfall, PhasePlacements, QuotaShortfall, RunStatus, ScheduleReport, SiteShortfall,
};
pub use rotation::{RotationScheduler, ScheduleOutcome, ScheduleRequest};
pub use state::SchedulerState;
