//! The six placement phases.
//!
//! Each phase walks periods chronologically over one shared
//! [`SchedulerState`] and returns the number of placements it made.
//!
//! # Algorithm
//!
//! | Phase | Purpose |
//! |-------|---------|
//! | A | Hard period pins (`OnlyProgramYear` rules marked pinned) |
//! | B | Graduating-year specialty front-loading |
//! | C | Site-minimum backfill |
//! | D | Capacity-driven greedy fill, ranked by the rule engine |
//! | E | Full-quota repair for program years 2..=N |
//! | F | First-year quota repair with relaxation passes |

use std::cmp::Reverse;
use std::collections::BTreeMap;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use tracing::{debug, warn};

use super::SchedulerState;
use crate::config::SchedulerConfig;
use crate::dispatching::{Candidate, PlacementContext, RuleEngine};
use crate::eligibility::Eligibility;
use crate::models::{Block, ConstraintCatalogue, PeriodKey, ProgramYear, Resident};

/// Read-only inputs shared by every phase.
pub(crate) struct PhaseContext<'a> {
    pub residents: &'a [Resident],
    pub blocks: &'a [Block],
    pub catalogue: &'a ConstraintCatalogue,
    pub config: &'a SchedulerConfig,
    pub rules: &'a RuleEngine,
    pub eligibility: Eligibility<'a>,
    /// Academic years present in the calendar, ascending.
    pub years: Vec<i32>,
}

impl<'a> PhaseContext<'a> {
    pub fn new(
        residents: &'a [Resident],
        blocks: &'a [Block],
        catalogue: &'a ConstraintCatalogue,
        config: &'a SchedulerConfig,
        rules: &'a RuleEngine,
    ) -> Self {
        let mut years: Vec<i32> = blocks.iter().map(|b| b.year).collect();
        years.sort_unstable();
        years.dedup();

        Self {
            residents,
            blocks,
            catalogue,
            config,
            rules,
            eligibility: Eligibility::new(catalogue, config.training_years),
            years,
        }
    }

    #[inline]
    fn program_year(&self, resident: usize, year: i32) -> ProgramYear {
        self.residents[resident].program_year(year, self.config.training_years)
    }

    /// Annual quota for an active program year.
    #[inline]
    fn quota_for(&self, program_year: u32) -> u32 {
        quota_for(self.config, program_year)
    }

    /// Whether the resident still has quota room in `year`.
    fn below_quota(&self, state: &SchedulerState, resident: usize, year: i32) -> bool {
        match self.program_year(resident, year).active() {
            Some(py) => state.year_count(resident, year) < self.quota_for(py),
            None => false,
        }
    }

    fn is_legal(&self, resident: usize, block_idx: usize) -> bool {
        self.eligibility
            .is_legal(&self.residents[resident], &self.blocks[block_idx])
    }

    fn period_legal(&self, resident: usize, block_idx: usize) -> bool {
        let block = &self.blocks[block_idx];
        self.eligibility
            .satisfies_period_rules(&self.residents[resident], &block.rotation, block)
    }

    /// Places and logs refusals; refusals should not happen once callers
    /// have filtered candidates.
    fn place(&self, state: &mut SchedulerState, resident: usize, block_idx: usize) -> bool {
        let placed = state.place(resident, block_idx, &self.blocks[block_idx]);
        if !placed {
            debug!(
                resident = %self.residents[resident].id,
                block = %self.blocks[block_idx].id,
                "Placement refused"
            );
        }
        placed
    }
}

/// Annual block quota for an active program year, zero otherwise.
pub fn quota_for(config: &SchedulerConfig, program_year: u32) -> u32 {
    match program_year {
        1 => config.first_year_quota,
        py if py >= 2 && py <= config.training_years => config.full_year_quota,
        _ => 0,
    }
}

/// Phase A: honors pinned `OnlyProgramYear` rules.
pub(crate) fn place_pins<R: Rng + ?Sized>(
    ctx: &PhaseContext,
    state: &mut SchedulerState,
    rng: &mut R,
) -> usize {
    let mut placed = 0;

    for key in state.periods() {
        for rule in ctx.catalogue.pinned_rules() {
            let Some(pin_year) = rule.pin_year() else {
                continue;
            };
            if !rule.periods.contains(&key.period) {
                continue;
            }

            let Some(&block_idx) = state
                .blocks_in_period(key)
                .iter()
                .find(|&&b| ctx.blocks[b].rotation == rule.rotation)
            else {
                continue;
            };
            let block = &ctx.blocks[block_idx];
            if !state.has_capacity(block_idx, block) {
                warn!(rule = %rule.name, block = %block.id, "Pin skipped: block full");
                continue;
            }

            let pool: Vec<usize> = (0..ctx.residents.len())
                .filter(|&r| ctx.program_year(r, key.year).active() == Some(pin_year))
                .filter(|&r| !state.is_committed(r, key))
                .filter(|&r| ctx.period_legal(r, block_idx))
                .collect();

            // Pins count toward rotation exposure and annual totals
            match pool.choose(rng) {
                Some(&resident) => {
                    if ctx.place(state, resident, block_idx) {
                        placed += 1;
                    }
                }
                None => warn!(
                    rule = %rule.name,
                    period = %key,
                    program_year = pin_year,
                    "Pin skipped: no available resident"
                ),
            }
        }
    }

    debug!(placed, "Phase A: period pins");
    placed
}

/// Phase B: front-loads graduating residents onto their specialty rotations.
pub(crate) fn front_load_specialties(ctx: &PhaseContext, state: &mut SchedulerState) -> usize {
    let graduating = ctx.config.training_years;
    let quota = ctx.config.full_year_quota;
    let mut placed = 0;

    for &year in &ctx.years {
        for (r, resident) in ctx.residents.iter().enumerate() {
            if resident.specialty.is_undecided()
                || ctx.program_year(r, year).active() != Some(graduating)
            {
                continue;
            }

            let mut matching: Vec<usize> = ctx
                .blocks
                .iter()
                .enumerate()
                .filter(|(_, b)| b.year == year)
                .filter(|(_, b)| {
                    ctx.eligibility
                        .matches_specialty(&b.rotation, &resident.specialty)
                })
                .filter(|&(b, _)| ctx.is_legal(r, b))
                .filter(|(_, b)| !state.is_committed(r, b.period_key()))
                .map(|(b, _)| b)
                .collect();
            matching.sort_by_key(|&b| ctx.blocks[b].period);

            for b in matching {
                if state.year_count(r, year) >= quota {
                    break;
                }
                let block = &ctx.blocks[b];
                if state.has_capacity(b, block)
                    && !state.is_committed(r, block.period_key())
                    && ctx.place(state, r, b)
                {
                    placed += 1;
                }
            }
        }
    }

    debug!(placed, "Phase B: specialty front-loading");
    placed
}

/// Phase C: tops sites up to their per-period minimum.
pub(crate) fn backfill_site_minimums(ctx: &PhaseContext, state: &mut SchedulerState) -> usize {
    if ctx.catalogue.site_minimums.is_empty() {
        return 0;
    }
    let mut placed = 0;

    for key in state.periods() {
        let period_blocks = state.blocks_in_period(key).to_vec();
        let mut site_counts: BTreeMap<&str, u32> = BTreeMap::new();
        for &b in &period_blocks {
            *site_counts.entry(ctx.blocks[b].site.as_str()).or_insert(0) += state.occupancy(b);
        }

        for (site, &minimum) in &ctx.catalogue.site_minimums {
            let current = site_counts.get(site.as_str()).copied().unwrap_or(0);
            let mut deficit = minimum.saturating_sub(current);

            for r in 0..ctx.residents.len() {
                if deficit == 0 {
                    break;
                }
                if state.is_committed(r, key) || !ctx.below_quota(state, r, key.year) {
                    continue;
                }

                let target = period_blocks.iter().copied().find(|&b| {
                    ctx.blocks[b].site == *site
                        && state.has_capacity(b, &ctx.blocks[b])
                        && ctx.is_legal(r, b)
                });
                if let Some(b) = target {
                    if ctx.place(state, r, b) {
                        placed += 1;
                        deficit -= 1;
                    }
                }
            }

            if deficit > 0 {
                debug!(site = %site, period = %key, deficit, "Site minimum not reached");
            }
        }
    }

    debug!(placed, "Phase C: site minimums");
    placed
}

/// Phase D: fills each block toward its occupancy target.
///
/// Shuffles every period's block order; later phases see the shuffled order.
pub(crate) fn greedy_fill<R: Rng + ?Sized>(
    ctx: &PhaseContext,
    state: &mut SchedulerState,
    rng: &mut R,
) -> usize {
    let graduating = ctx.config.training_years;
    let mut placed = 0;

    for key in state.periods() {
        if let Some(order) = state.blocks_in_period_mut(key) {
            order.shuffle(rng);
        }

        for b in state.blocks_in_period(key).to_vec() {
            let block = &ctx.blocks[b];
            let target = if state.occupancy(b) < block.min_occupancy {
                block.min_occupancy
            } else {
                block.max_occupancy
            };

            let mut candidates: Vec<Candidate> = ctx
                .residents
                .iter()
                .enumerate()
                .filter(|&(r, _)| !state.is_committed(r, key))
                .filter_map(|(r, resident)| {
                    let py = ctx.program_year(r, key.year).active()?;
                    ctx.is_legal(r, b).then(|| {
                        let matched = ctx
                            .eligibility
                            .matches_specialty(&block.rotation, &resident.specialty);
                        Candidate::new(r, py, matched)
                    })
                })
                .collect();

            while state.occupancy(b) < target {
                candidates.retain(|c| {
                    state.year_count(c.resident, key.year) < ctx.quota_for(c.program_year)
                });
                let best = {
                    let context = PlacementContext::new(&block.rotation, graduating, state);
                    ctx.rules.select_best(&candidates, &context)
                };
                let Some(best) = best else {
                    break;
                };

                let candidate = candidates.remove(best);
                if ctx.place(state, candidate.resident, b) {
                    placed += 1;
                }
            }
        }
    }

    debug!(placed, "Phase D: greedy fill");
    placed
}

/// Phase E: brings program years 2..=N up to the full-year quota.
pub(crate) fn repair_full_quota(ctx: &PhaseContext, state: &mut SchedulerState) -> usize {
    let quota = ctx.config.full_year_quota;
    let mut placed = 0;

    for &year in &ctx.years {
        for r in 0..ctx.residents.len() {
            let Some(py) = ctx.program_year(r, year).active() else {
                continue;
            };
            if py < 2 {
                continue;
            }

            for period in 1..=ctx.config.periods_per_year {
                if state.year_count(r, year) >= quota {
                    break;
                }
                let key = PeriodKey::new(year, period);
                if state.is_committed(r, key) {
                    continue;
                }

                let open: Vec<usize> = state
                    .blocks_in_period(key)
                    .iter()
                    .copied()
                    .filter(|&b| state.has_capacity(b, &ctx.blocks[b]) && ctx.period_legal(r, b))
                    .collect();
                let eligible = |b: &usize| {
                    let block = &ctx.blocks[*b];
                    ctx.eligibility
                        .is_eligible(&ctx.residents[r], &block.rotation, block)
                };

                let mut pool: Vec<usize> = open.iter().copied().filter(eligible).collect();
                if pool.is_empty() {
                    pool = open
                        .iter()
                        .copied()
                        .filter(|b| {
                            eligible(b) || ctx.config.is_general_rotation(&ctx.blocks[*b].rotation)
                        })
                        .collect();
                }

                let choice = pool.into_iter().min_by_key(|&b| {
                    let block = &ctx.blocks[b];
                    (
                        Reverse(state.remaining_capacity(b, block)),
                        state.rotation_count(r, &block.rotation),
                    )
                });
                match choice {
                    Some(b) => {
                        if ctx.place(state, r, b) {
                            placed += 1;
                        }
                    }
                    None => debug!(
                        resident = %ctx.residents[r].id,
                        period = %key,
                        "No block available for quota repair"
                    ),
                }
            }
        }
    }

    debug!(placed, "Phase E: full-quota repair");
    placed
}

/// Phase F: brings first-year residents up to the first-year quota.
pub(crate) fn repair_first_year_quota<R: Rng + ?Sized>(
    ctx: &PhaseContext,
    state: &mut SchedulerState,
    rng: &mut R,
) -> usize {
    let quota = ctx.config.first_year_quota;
    let mut placed = 0;

    for &year in &ctx.years {
        let year_periods: Vec<PeriodKey> = state
            .periods()
            .into_iter()
            .filter(|k| k.year == year)
            .collect();

        for r in 0..ctx.residents.len() {
            if ctx.program_year(r, year).active() != Some(1) {
                continue;
            }

            let mut attempts = 0;
            while state.year_count(r, year) < quota
                && attempts < ctx.config.max_first_year_attempts
            {
                attempts += 1;

                let open: Vec<usize> = year_periods
                    .iter()
                    .filter(|&&k| !state.is_committed(r, k))
                    .flat_map(|&k| state.blocks_in_period(k).iter().copied())
                    .filter(|&b| state.has_capacity(b, &ctx.blocks[b]) && ctx.period_legal(r, b))
                    .collect();
                let strict: Vec<usize> =
                    open.iter().copied().filter(|&b| ctx.is_legal(r, b)).collect();
                let pool = if !strict.is_empty() {
                    strict
                } else {
                    let general: Vec<usize> = open
                        .iter()
                        .copied()
                        .filter(|&b| ctx.config.is_general_rotation(&ctx.blocks[b].rotation))
                        .collect();
                    if !general.is_empty() {
                        general
                    } else {
                        open
                    }
                };

                let Some(&b) = pool.choose(rng) else {
                    warn!(
                        resident = %ctx.residents[r].id,
                        year,
                        assigned = state.year_count(r, year),
                        required = quota,
                        "First-year quota repair exhausted"
                    );
                    log_year_diagnostics(ctx, state, r, year);
                    break;
                };
                if ctx.place(state, r, b) {
                    placed += 1;
                }
            }
        }
    }

    debug!(placed, "Phase F: first-year quota repair");
    placed
}

fn log_year_diagnostics(ctx: &PhaseContext, state: &SchedulerState, resident: usize, year: i32) {
    for (b, block) in ctx.blocks.iter().enumerate().filter(|(_, b)| b.year == year) {
        debug!(
            block = %block.id,
            rotation = %block.rotation,
            period = block.period,
            occupancy = state.occupancy(b),
            max = block.max_occupancy,
            committed = state.is_committed(resident, block.period_key()),
            period_legal = ctx.period_legal(resident, b),
            "Block status"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PeriodRule, RotationRule};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const YEAR: i32 = 2025;

    fn resident(id: &str, py: i32) -> Resident {
        Resident::new(id, YEAR - py + 1)
    }

    fn config(periods: u32) -> SchedulerConfig {
        SchedulerConfig::default()
            .with_periods_per_year(periods)
            .with_quotas(periods, 1.min(periods))
    }

    #[test]
    fn test_quota_for() {
        let config = SchedulerConfig::default();
        assert_eq!(quota_for(&config, 1), 5);
        assert_eq!(quota_for(&config, 2), 13);
        assert_eq!(quota_for(&config, 5), 13);
        assert_eq!(quota_for(&config, 6), 0);
        assert_eq!(quota_for(&config, 0), 0);
    }

    #[test]
    fn test_pins_choose_program_year() {
        let catalogue = ConstraintCatalogue::new()
            .with_rotation("MGH/Trauma", RotationRule::new("MGH").with_eligible_years([2]))
            .with_period_rule(PeriodRule::named("r1_mgh_trauma_p3").unwrap());
        let blocks = vec![
            Block::new("B1", 3, YEAR, "MGH/Trauma", "MGH"),
            Block::new("B2", 4, YEAR, "MGH/Trauma", "MGH"),
        ];
        let residents = vec![resident("R2", 2), resident("R1", 1)];
        let config = config(13);
        let rules = RuleEngine::residency_default();
        let ctx = PhaseContext::new(&residents, &blocks, &catalogue, &config, &rules);
        let mut state = SchedulerState::new(residents.len(), &blocks);

        let placed = place_pins(&ctx, &mut state, &mut StdRng::seed_from_u64(7));
        assert_eq!(placed, 1);
        // The pin bypasses the eligible-year window
        assert!(state.is_committed(1, PeriodKey::new(YEAR, 3)));
        assert!(!state.is_committed(0, PeriodKey::new(YEAR, 3)));
    }

    #[test]
    fn test_front_loading_respects_quota() {
        let catalogue = ConstraintCatalogue::with_reference_specialties()
            .with_rotation("MGH/Spine", RotationRule::new("MGH").with_eligible_years([2, 3]));
        let blocks: Vec<Block> = (1..=4)
            .map(|p| Block::new(format!("S{p}"), p, YEAR, "MGH/Spine", "MGH"))
            .collect();
        let residents = vec![resident("G", 5).with_specialty("Spine")];
        let config = SchedulerConfig::default()
            .with_periods_per_year(4)
            .with_quotas(3, 1);
        let rules = RuleEngine::residency_default();
        let ctx = PhaseContext::new(&residents, &blocks, &catalogue, &config, &rules);
        let mut state = SchedulerState::new(1, &blocks);

        assert_eq!(front_load_specialties(&ctx, &mut state), 3);
        assert_eq!(state.year_count(0, YEAR), 3);
        assert!(!state.is_committed(0, PeriodKey::new(YEAR, 4)));
    }

    #[test]
    fn test_greedy_fill_stops_at_minimum_target() {
        let catalogue = ConstraintCatalogue::new();
        let blocks = vec![Block::new("B1", 1, YEAR, "A", "S").with_occupancy(1, 3)];
        let residents = vec![resident("R1", 2), resident("R2", 3), resident("R3", 4)];
        let config = config(1);
        let rules = RuleEngine::residency_default();
        let ctx = PhaseContext::new(&residents, &blocks, &catalogue, &config, &rules);
        let mut state = SchedulerState::new(residents.len(), &blocks);

        // Empty block below its minimum: fill to the minimum only, senior first
        assert_eq!(greedy_fill(&ctx, &mut state, &mut StdRng::seed_from_u64(1)), 1);
        assert!(state.is_committed(2, PeriodKey::new(YEAR, 1)));
    }

    #[test]
    fn test_full_quota_repair_prefers_roomiest_block() {
        let catalogue = ConstraintCatalogue::new();
        let blocks = vec![
            Block::new("B1", 1, YEAR, "A", "S").with_occupancy(0, 1),
            Block::new("B2", 1, YEAR, "B", "S").with_occupancy(0, 3),
        ];
        let residents = vec![resident("R", 2)];
        let config = config(1);
        let rules = RuleEngine::residency_default();
        let ctx = PhaseContext::new(&residents, &blocks, &catalogue, &config, &rules);
        let mut state = SchedulerState::new(1, &blocks);

        assert_eq!(repair_full_quota(&ctx, &mut state), 1);
        assert_eq!(state.occupancy(1), 1);
    }

    #[test]
    fn test_first_year_repair_relaxes_to_any_block() {
        // A only admits PY3 and is not general; pass 3 still uses it
        let catalogue = ConstraintCatalogue::new()
            .with_rotation("A", RotationRule::new("S").with_eligible_years([3]));
        let blocks = vec![Block::new("B1", 1, YEAR, "A", "S")];
        let residents = vec![resident("R", 1)];
        let config = config(1);
        let rules = RuleEngine::residency_default();
        let ctx = PhaseContext::new(&residents, &blocks, &catalogue, &config, &rules);
        let mut state = SchedulerState::new(1, &blocks);

        let placed = repair_first_year_quota(&ctx, &mut state, &mut StdRng::seed_from_u64(3));
        assert_eq!(placed, 1);
        assert_eq!(state.year_count(0, YEAR), 1);
    }

    #[test]
    fn test_first_year_repair_gives_up_without_blocks() {
        let catalogue = ConstraintCatalogue::new();
        let blocks = vec![Block::new("B1", 1, YEAR, "A", "S")];
        let residents = vec![resident("R1", 1), resident("R2", 1)];
        let config = SchedulerConfig::default()
            .with_periods_per_year(1)
            .with_quotas(1, 1);
        let rules = RuleEngine::residency_default();
        let ctx = PhaseContext::new(&residents, &blocks, &catalogue, &config, &rules);
        let mut state = SchedulerState::new(2, &blocks);

        let placed = repair_first_year_quota(&ctx, &mut state, &mut StdRng::seed_from_u64(9));
        assert_eq!(placed, 1);
        assert_eq!(state.len(), 1);
    }
}
