//! Block model.
//!
//! A block is one occupiable instance of a rotation, scoped to a single
//! period of a single academic year, with its own occupancy bounds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A (academic year, period) pair. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    /// Academic year.
    pub year: i32,
    /// Period number within the year (1-based).
    pub period: u32,
}

impl PeriodKey {
    pub fn new(year: i32, period: u32) -> Self {
        Self { year, period }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} P{}", self.year, self.period)
    }
}

/// One rotation slot in one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Unique block identifier.
    pub id: String,
    /// Period number (1..=P).
    pub period: u32,
    /// Academic year.
    pub year: i32,
    /// Rotation name; key into the constraint catalogue.
    pub rotation: String,
    /// Hospital site.
    pub site: String,
    /// Minimum residents required.
    pub min_occupancy: u32,
    /// Maximum residents allowed.
    pub max_occupancy: u32,
}

impl Block {
    /// Creates a block with occupancy bounds 1..=1.
    pub fn new(
        id: impl Into<String>,
        period: u32,
        year: i32,
        rotation: impl Into<String>,
        site: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            period,
            year,
            rotation: rotation.into(),
            site: site.into(),
            min_occupancy: 1,
            max_occupancy: 1,
        }
    }

    /// Sets the occupancy bounds.
    pub fn with_occupancy(mut self, min: u32, max: u32) -> Self {
        self.min_occupancy = min;
        self.max_occupancy = max;
        self
    }

    #[inline]
    pub fn period_key(&self) -> PeriodKey {
        PeriodKey::new(self.year, self.period)
    }
}
