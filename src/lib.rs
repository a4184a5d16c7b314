//! Residency rotation scheduling.
//!
//! Assigns residents of a multi-year training program to rotation blocks
//! (site × rotation × period × academic year) under program-year
//! eligibility, per-period rules, specialty preferences and capacity limits.
//!
//! # Modules
//!
//! - **`models`**: Domain types (`Resident`, `Block`, `Schedule`,
//!   `Assignment`, `ConstraintCatalogue`) plus block calendar and roster helpers
//! - **`eligibility`**: Pure legality predicates over (resident, rotation, block)
//! - **`dispatching`**: Candidate priority rules and the rule engine
//! - **`scheduler`**: The multi-phase assignment engine and its report
//! - **`validation`**: Input integrity checks (duplicate IDs, bounds, periods)
//! - **`config`**: Run configuration
//!
//! # Example
//!
//! ```
//! use u_rotation::models::{generate_blocks, ConstraintCatalogue, Resident, RotationRule};
//! use u_rotation::scheduler::{RotationScheduler, ScheduleRequest};
//! use u_rotation::SchedulerConfig;
//!
//! let catalogue = ConstraintCatalogue::with_reference_specialties()
//!     .with_rotation(
//!         "SMH",
//!         RotationRule::new("SMH").with_eligible_years(1..=5).with_occupancy(0, 4),
//!     );
//! let blocks = generate_blocks(&catalogue, 2025, 1, 13);
//! let residents = vec![Resident::new("R001", 2025), Resident::new("R002", 2023)];
//!
//! let config = SchedulerConfig::default().with_seed(7);
//! let request = ScheduleRequest::new(residents, blocks).with_catalogue(catalogue);
//! let outcome = RotationScheduler::with_config(config).unwrap().schedule(&request);
//! assert!(outcome.report.is_complete());
//! ```

pub mod config;
pub mod dispatching;
pub mod eligibility;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use config::SchedulerConfig;
pub use error::{AssignmentError, Error, Result};
pub use scheduler::{RotationScheduler, ScheduleOutcome, ScheduleReport, ScheduleRequest};
