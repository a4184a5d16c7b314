//! Resident model.
//!
//! A resident is a trainee who enters the program in a given academic year
//! and advances one program year per academic year until graduation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Specialty tag for residents who have not declared one.
pub const UNDECIDED: &str = "Undecided";

/// A resident's declared specialty.
///
/// Specialties are open-ended names; the constraint catalogue maps them to
/// rotation keywords.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Specialty(String);

impl Specialty {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The undecided specialty.
    pub fn undecided() -> Self {
        Self(UNDECIDED.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether no specialty has been declared.
    ///
    /// An empty name counts as undecided.
    pub fn is_undecided(&self) -> bool {
        self.0.is_empty() || self.0 == UNDECIDED
    }
}

impl Default for Specialty {
    fn default() -> Self {
        Self::undecided()
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Specialty {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A resident's position in the training sequence for one academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgramYear {
    /// Enters the program `years_until` academic years later.
    NotStarted { years_until: u32 },
    /// Active in program year 1..=N.
    Active(u32),
    /// Completed training.
    Graduated,
}

impl ProgramYear {
    /// Derives the program year for `academic_year`.
    pub fn for_academic_year(entry_year: i32, academic_year: i32, training_years: u32) -> Self {
        let offset = i64::from(academic_year) - i64::from(entry_year);
        if offset < 0 {
            ProgramYear::NotStarted {
                years_until: offset.unsigned_abs() as u32,
            }
        } else if offset >= i64::from(training_years) {
            ProgramYear::Graduated
        } else {
            ProgramYear::Active(offset as u32 + 1)
        }
    }

    /// The active program year, if any.
    #[inline]
    pub fn active(self) -> Option<u32> {
        match self {
            ProgramYear::Active(year) => Some(year),
            _ => None,
        }
    }

    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, ProgramYear::Active(_))
    }

    /// Integer encoding: negative before entry, 0 once graduated, 1..=N active.
    pub fn number(self) -> i32 {
        match self {
            ProgramYear::NotStarted { years_until } => -(years_until as i32),
            ProgramYear::Active(year) => year as i32,
            ProgramYear::Graduated => 0,
        }
    }
}

/// A resident in the training program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resident {
    /// Unique resident identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Academic year the resident entered the program.
    pub entry_year: i32,
    /// Declared specialty.
    #[serde(default)]
    pub specialty: Specialty,
    /// Opaque preference payload, carried for the data layer.
    #[serde(default)]
    pub preferences: Option<serde_json::Value>,
}

impl Resident {
    /// Creates an undecided resident.
    pub fn new(id: impl Into<String>, entry_year: i32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            entry_year,
            specialty: Specialty::default(),
            preferences: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_specialty(mut self, specialty: impl Into<Specialty>) -> Self {
        self.specialty = specialty.into();
        self
    }

    pub fn with_preferences(mut self, preferences: serde_json::Value) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// Program year during `academic_year`.
    pub fn program_year(&self, academic_year: i32, training_years: u32) -> ProgramYear {
        ProgramYear::for_academic_year(self.entry_year, academic_year, training_years)
    }

    /// Whether the resident is in training during `academic_year`.
    pub fn is_active_in(&self, academic_year: i32, training_years: u32) -> bool {
        self.program_year(academic_year, training_years).is_active()
    }
}
