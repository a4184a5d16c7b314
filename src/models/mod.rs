//! Residency scheduling domain models.
//!
//! Provides the data types for describing a residency program (residents,
//! rotation blocks, the constraint catalogue) and the schedules produced
//! for it.
//!
//! # Domain Mappings
//!
//! | u-rotation | Meaning |
//! |------------|---------|
//! | Resident | Trainee with an entry year and specialty |
//! | Block | One rotation at one site in one period of one academic year |
//! | Assignment | Resident placed on a block |
//! | ConstraintCatalogue | Eligibility, period rules, site minimums, specialty keywords |

mod block;
mod calendar;
mod catalogue;
mod resident;
mod roster;
mod schedule;

pub use block::{Block, PeriodKey};
pub use calendar::{generate_blocks, generate_calendar, generate_fallback_blocks};
pub use catalogue::{
    ConstraintCatalogue, PeriodRule, RotationRule, SpecialtyKeywords, YearRequirement,
};
pub use resident::{ProgramYear, Resident, Specialty, UNDECIDED};
pub use roster::{cohort_counts, ensure_cohorts};
pub use schedule::{Assignment, Schedule};
