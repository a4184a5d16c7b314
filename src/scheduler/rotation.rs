//! Multi-phase rotation scheduler.
//!
//! # Algorithm
//!
//! 1. Honor pinned period rules (Phase A).
//! 2. Front-load graduating residents onto their specialty (Phase B).
//! 3. Backfill site minimums (Phase C).
//! 4. Greedily fill every block toward its occupancy target (Phase D).
//! 5. Repair annual quotas for senior and first-year residents (Phases E, F).
//!
//! The heuristic never backtracks. Residents it cannot bring up to quota are
//! reported, not treated as errors.
//!
//! # Complexity
//! Phase D dominates at O(b * r^2) for b blocks and r residents.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use super::phases::{self, PhaseContext};
use super::{PhasePlacements, ScheduleReport, SchedulerState};
use crate::config::SchedulerConfig;
use crate::dispatching::RuleEngine;
use crate::models::{Block, ConstraintCatalogue, Resident, Schedule};
use crate::Result;

/// Input container for scheduling.
#[derive(Debug, Clone, Default)]
pub struct ScheduleRequest {
    /// Roster, after cohort normalization.
    pub residents: Vec<Resident>,
    /// Block calendar.
    pub blocks: Vec<Block>,
    /// Constraint catalogue snapshot.
    pub catalogue: ConstraintCatalogue,
}

impl ScheduleRequest {
    /// Creates a request with an empty catalogue (every rotation open).
    pub fn new(residents: Vec<Resident>, blocks: Vec<Block>) -> Self {
        Self {
            residents,
            blocks,
            catalogue: ConstraintCatalogue::default(),
        }
    }

    /// Sets the constraint catalogue.
    pub fn with_catalogue(mut self, catalogue: ConstraintCatalogue) -> Self {
        self.catalogue = catalogue;
        self
    }
}

/// Result of one scheduling run.
#[derive(Debug, Clone)]
pub struct ScheduleOutcome {
    /// The full assignment set.
    pub schedule: Schedule,
    /// Post-hoc summary, including every shortfall.
    pub report: ScheduleReport,
}

/// Multi-phase greedy rotation scheduler.
///
/// Immutable once built; every call runs on fresh per-call state.
///
/// # Example
///
/// ```
/// use u_rotation::models::{Block, Resident};
/// use u_rotation::scheduler::{RotationScheduler, ScheduleRequest};
/// use u_rotation::SchedulerConfig;
///
/// let residents = vec![Resident::new("R1", 2025), Resident::new("R2", 2024)];
/// let blocks = vec![
///     Block::new("B1", 1, 2025, "A", "S1"),
///     Block::new("B2", 1, 2025, "B", "S2").with_occupancy(1, 2),
/// ];
/// let config = SchedulerConfig::default()
///     .with_periods_per_year(1)
///     .with_quotas(1, 1)
///     .with_seed(42);
///
/// let scheduler = RotationScheduler::with_config(config).unwrap();
/// let outcome = scheduler.schedule(&ScheduleRequest::new(residents, blocks));
/// assert_eq!(outcome.schedule.assignment_count(), 2);
/// assert!(outcome.report.is_complete());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RotationScheduler {
    config: SchedulerConfig,
    rule_engine: RuleEngine,
}

impl RotationScheduler {
    /// Creates a scheduler with the default configuration and ranking.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scheduler with a validated configuration.
    pub fn with_config(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rule_engine: RuleEngine::residency_default(),
        })
    }

    /// Replaces the candidate ranking used by the greedy fill.
    pub fn with_rule_engine(mut self, engine: RuleEngine) -> Self {
        self.rule_engine = engine;
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Runs all phases with an RNG seeded from the configuration.
    ///
    /// Without a configured seed a fresh one is drawn and logged.
    pub fn schedule(&self, request: &ScheduleRequest) -> ScheduleOutcome {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        info!(seed, "Seeding scheduler RNG");
        let mut rng = StdRng::seed_from_u64(seed);
        self.schedule_with_rng(request, &mut rng)
    }

    /// Runs all phases with a caller-supplied randomness source.
    pub fn schedule_with_rng<R: Rng + ?Sized>(
        &self,
        request: &ScheduleRequest,
        rng: &mut R,
    ) -> ScheduleOutcome {
        if request.blocks.is_empty() {
            warn!("No blocks available; nothing to schedule");
            let schedule = Schedule::new();
            let report = ScheduleReport::calculate(&schedule, request, &self.config);
            return ScheduleOutcome { schedule, report };
        }

        info!(
            residents = request.residents.len(),
            blocks = request.blocks.len(),
            "Starting rotation scheduling"
        );

        let ctx = PhaseContext::new(
            &request.residents,
            &request.blocks,
            &request.catalogue,
            &self.config,
            &self.rule_engine,
        );
        let mut state = SchedulerState::new(request.residents.len(), &request.blocks);

        let placements = PhasePlacements {
            pins: phases::place_pins(&ctx, &mut state, rng),
            specialty: phases::front_load_specialties(&ctx, &mut state),
            site_minimums: phases::backfill_site_minimums(&ctx, &mut state),
            greedy: phases::greedy_fill(&ctx, &mut state, rng),
            full_quota_repair: phases::repair_full_quota(&ctx, &mut state),
            first_year_repair: phases::repair_first_year_quota(&ctx, &mut state, rng),
        };

        let schedule =
            Schedule::from_assignments(state.into_assignments(&request.residents, &request.blocks));
        let mut report = ScheduleReport::calculate(&schedule, request, &self.config);
        report.phase_placements = placements;

        for shortfall in &report.quota_shortfalls {
            warn!(
                resident = %shortfall.resident_id,
                year = shortfall.year,
                program_year = shortfall.program_year,
                assigned = shortfall.assigned,
                required = shortfall.required,
                "Resident below annual quota"
            );
        }
        info!(
            assignments = report.assignment_count,
            status = ?report.status,
            fill_rate = report.fill_rate,
            "Rotation scheduling finished"
        );

        ScheduleOutcome { schedule, report }
    }
}
