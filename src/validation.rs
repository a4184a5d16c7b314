//! Input validation for rotation scheduling.
//!
//! Checks structural integrity of the roster, the block calendar and the
//! catalogue before scheduling. Detects:
//! - Duplicate IDs
//! - Inverted occupancy bounds
//! - Periods outside the academic year
//! - Duplicate (year, period, rotation) blocks
//! - Period rules naming impossible periods

use std::collections::HashSet;

use crate::config::SchedulerConfig;
use crate::models::{Block, ConstraintCatalogue, Resident};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// Minimum occupancy above maximum.
    InvalidOccupancy,
    /// Period outside 1..=P.
    PeriodOutOfRange,
    /// Two blocks for the same rotation in the same period.
    DuplicateBlock,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the inputs of a scheduling run.
///
/// Checks:
/// 1. No duplicate resident IDs
/// 2. No duplicate block IDs
/// 3. Block and rotation-rule occupancy has min <= max
/// 4. Block periods lie in 1..=P
/// 5. At most one block per (year, period, rotation)
/// 6. Period rules only name periods in 1..=P
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    residents: &[Resident],
    blocks: &[Block],
    catalogue: &ConstraintCatalogue,
    config: &SchedulerConfig,
) -> ValidationResult {
    let mut errors = Vec::new();
    let periods = 1..=config.periods_per_year;

    let mut resident_ids = HashSet::new();
    for r in residents {
        if !resident_ids.insert(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate resident ID: {}", r.id),
            ));
        }
    }

    let mut block_ids = HashSet::new();
    let mut slots = HashSet::new();
    for b in blocks {
        if !block_ids.insert(b.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate block ID: {}", b.id),
            ));
        }

        if b.min_occupancy > b.max_occupancy {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidOccupancy,
                format!(
                    "Block '{}' has min occupancy {} above max {}",
                    b.id, b.min_occupancy, b.max_occupancy
                ),
            ));
        }

        if !periods.contains(&b.period) {
            errors.push(ValidationError::new(
                ValidationErrorKind::PeriodOutOfRange,
                format!(
                    "Block '{}' is in period {} outside 1..={}",
                    b.id, b.period, config.periods_per_year
                ),
            ));
        }

        if !slots.insert((b.year, b.period, b.rotation.as_str())) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateBlock,
                format!(
                    "Duplicate block for {} in {} P{} ('{}')",
                    b.rotation, b.year, b.period, b.id
                ),
            ));
        }
    }

    for (name, rule) in &catalogue.rotations {
        if rule.min_per_block > rule.max_per_block {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidOccupancy,
                format!(
                    "Rotation '{name}' has min per block {} above max {}",
                    rule.min_per_block, rule.max_per_block
                ),
            ));
        }
    }

    for rule in &catalogue.period_rules {
        for period in rule.periods.iter().filter(|&&p| !periods.contains(&p)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::PeriodOutOfRange,
                format!(
                    "Period rule '{}' names period {period} outside 1..={}",
                    rule.name, config.periods_per_year
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
