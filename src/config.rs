//! Scheduler configuration.
//!
//! Every field has a default matching the reference residency program
//! (5 training years, 13 periods per year, 13/5 annual block quotas), so a
//! partial JSON document is enough to override a single knob.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Knobs for one scheduling run.
///
/// # Examples
///
/// ```
/// use u_rotation::SchedulerConfig;
///
/// let config = SchedulerConfig::default()
///     .with_quotas(13, 5)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Training length N; program years run 1..=N and N is the graduating year.
    #[serde(default = "default_training_years")]
    pub training_years: u32,

    /// Periods P per academic year.
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,

    /// Annual block quota for program years 2..=N.
    #[serde(default = "default_full_year_quota")]
    pub full_year_quota: u32,

    /// Annual block quota for program year 1.
    #[serde(default = "default_first_year_quota")]
    pub first_year_quota: u32,

    /// Retry ceiling for first-year quota repair.
    #[serde(default = "default_max_first_year_attempts")]
    pub max_first_year_attempts: usize,

    /// Rotations that accept any program year during repair passes.
    #[serde(default = "default_general_rotations")]
    pub general_rotations: Vec<String>,

    /// Sites cycled over when the catalogue defines no rotations.
    #[serde(default = "default_fallback_sites")]
    pub fallback_sites: Vec<String>,

    /// Maximum occupancy of a fallback site block.
    #[serde(default = "default_residents_per_block")]
    pub residents_per_block: u32,

    /// Random seed. `None` draws a fresh seed per run.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_training_years() -> u32 {
    5
}

fn default_periods_per_year() -> u32 {
    13
}

fn default_full_year_quota() -> u32 {
    13
}

fn default_first_year_quota() -> u32 {
    5
}

fn default_max_first_year_attempts() -> usize {
    200
}

fn default_general_rotations() -> Vec<String> {
    [
        "SMH",
        "MCH/Shriners",
        "Community",
        "Electives",
        "Research",
        "MGH/Sports",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_fallback_sites() -> Vec<String> {
    vec!["Site A".into(), "Site B".into(), "Site C".into()]
}

fn default_residents_per_block() -> u32 {
    1
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            training_years: default_training_years(),
            periods_per_year: default_periods_per_year(),
            full_year_quota: default_full_year_quota(),
            first_year_quota: default_first_year_quota(),
            max_first_year_attempts: default_max_first_year_attempts(),
            general_rotations: default_general_rotations(),
            fallback_sites: default_fallback_sites(),
            residents_per_block: default_residents_per_block(),
            seed: None,
        }
    }
}

impl SchedulerConfig {
    /// Parses a (possibly partial) JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_training_years(mut self, years: u32) -> Self {
        self.training_years = years;
        self
    }

    pub fn with_periods_per_year(mut self, periods: u32) -> Self {
        self.periods_per_year = periods;
        self
    }

    /// Sets the full-year and first-year quotas.
    pub fn with_quotas(mut self, full_year: u32, first_year: u32) -> Self {
        self.full_year_quota = full_year;
        self.first_year_quota = first_year;
        self
    }

    pub fn with_max_first_year_attempts(mut self, attempts: usize) -> Self {
        self.max_first_year_attempts = attempts;
        self
    }

    pub fn with_general_rotations<I, S>(mut self, rotations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.general_rotations = rotations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fallback_sites<I, S>(mut self, sites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallback_sites = sites.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_residents_per_block(mut self, residents: u32) -> Self {
        self.residents_per_block = residents;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Whether `rotation` is tagged as accepting all program years.
    pub fn is_general_rotation(&self, rotation: &str) -> bool {
        self.general_rotations.iter().any(|r| r == rotation)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.training_years == 0 {
            return Err(Error::Config("training_years must be positive".into()));
        }
        if self.periods_per_year == 0 {
            return Err(Error::Config("periods_per_year must be positive".into()));
        }
        if self.full_year_quota == 0 || self.full_year_quota > self.periods_per_year {
            return Err(Error::Config(format!(
                "full_year_quota must be in 1..={}, got {}",
                self.periods_per_year, self.full_year_quota
            )));
        }
        if self.first_year_quota == 0 || self.first_year_quota > self.full_year_quota {
            return Err(Error::Config(format!(
                "first_year_quota must be in 1..={}, got {}",
                self.full_year_quota, self.first_year_quota
            )));
        }
        if self.max_first_year_attempts == 0 {
            return Err(Error::Config("max_first_year_attempts must be positive".into()));
        }
        if self.residents_per_block == 0 {
            return Err(Error::Config("residents_per_block must be positive".into()));
        }
        Ok(())
    }
}
