//! Built-in candidate rules.
//!
//! # Score Convention
//! All rules return lower scores for higher priority candidates.

use super::{Candidate, CandidateRule, PlacementContext, RuleScore};

/// Bonus for a graduating resident whose specialty matches the rotation.
pub const GRADUATING_MATCH_BONUS: f64 = 100.0;

/// Bonus for any other specialty match.
pub const MATCH_BONUS: f64 = 10.0;

/// Senior residents first.
#[derive(Debug, Clone, Copy)]
pub struct Seniority;

impl CandidateRule for Seniority {
    fn name(&self) -> &'static str {
        "SENIORITY"
    }

    fn evaluate(&self, candidate: &Candidate, _context: &PlacementContext) -> RuleScore {
        -(candidate.program_year as f64)
    }

    fn description(&self) -> &'static str {
        "Highest program year first"
    }
}

/// Specialty matches first, graduating matches strongest.
#[derive(Debug, Clone, Copy)]
pub struct SpecialtyAffinity;

impl CandidateRule for SpecialtyAffinity {
    fn name(&self) -> &'static str {
        "SPECIALTY_AFFINITY"
    }

    fn evaluate(&self, candidate: &Candidate, context: &PlacementContext) -> RuleScore {
        if !candidate.specialty_match {
            0.0
        } else if context.is_graduating(candidate) {
            -GRADUATING_MATCH_BONUS
        } else {
            -MATCH_BONUS
        }
    }

    fn description(&self) -> &'static str {
        "Specialty match bonus"
    }
}

/// Prior exposure to the rotation.
///
/// Graduating residents matching the rotation are concentrated on it (more
/// exposure first); everyone else is spread out (less exposure first).
#[derive(Debug, Clone, Copy)]
pub struct RotationExposure;

impl CandidateRule for RotationExposure {
    fn name(&self) -> &'static str {
        "ROTATION_EXPOSURE"
    }

    fn evaluate(&self, candidate: &Candidate, context: &PlacementContext) -> RuleScore {
        let count = context.rotation_count(candidate) as f64;
        if candidate.specialty_match && context.is_graduating(candidate) {
            -count
        } else {
            count
        }
    }

    fn description(&self) -> &'static str {
        "Rotation exposure balancing"
    }
}

/// Fewest placements so far.
#[derive(Debug, Clone, Copy)]
pub struct LeastLoaded;

impl CandidateRule for LeastLoaded {
    fn name(&self) -> &'static str {
        "LEAST_LOADED"
    }

    fn evaluate(&self, candidate: &Candidate, context: &PlacementContext) -> RuleScore {
        context.total_count(candidate) as f64
    }

    fn description(&self) -> &'static str {
        "Fewest total placements first"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Block;
    use crate::scheduler::SchedulerState;

    fn state_with_history() -> (Vec<Block>, SchedulerState) {
        let blocks = vec![
            Block::new("B1", 1, 2025, "MGH/Spine", "MGH").with_occupancy(0, 3),
            Block::new("B2", 2, 2025, "MGH/Spine", "MGH").with_occupancy(0, 3),
            Block::new("B3", 3, 2025, "SMH", "SMH").with_occupancy(0, 3),
        ];
        let mut state = SchedulerState::new(2, &blocks);
        state.place(0, 0, &blocks[0]);
        state.place(0, 1, &blocks[1]);
        state.place(0, 2, &blocks[2]);
        (blocks, state)
    }

    #[test]
    fn test_seniority() {
        let (_, state) = state_with_history();
        let ctx = PlacementContext::new("SMH", 5, &state);
        assert!(
            Seniority.evaluate(&Candidate::new(1, 5, false), &ctx)
                < Seniority.evaluate(&Candidate::new(1, 1, false), &ctx)
        );
    }

    #[test]
    fn test_specialty_affinity() {
        let (_, state) = state_with_history();
        let ctx = PlacementContext::new("MGH/Spine", 5, &state);
        assert_eq!(SpecialtyAffinity.evaluate(&Candidate::new(0, 5, true), &ctx), -100.0);
        assert_eq!(SpecialtyAffinity.evaluate(&Candidate::new(0, 3, true), &ctx), -10.0);
        assert_eq!(SpecialtyAffinity.evaluate(&Candidate::new(0, 5, false), &ctx), 0.0);
    }

    #[test]
    fn test_rotation_exposure() {
        let (_, state) = state_with_history();
        let ctx = PlacementContext::new("MGH/Spine", 5, &state);
        assert_eq!(RotationExposure.evaluate(&Candidate::new(0, 5, true), &ctx), -2.0);
        assert_eq!(RotationExposure.evaluate(&Candidate::new(0, 3, true), &ctx), 2.0);
        assert_eq!(RotationExposure.evaluate(&Candidate::new(1, 5, false), &ctx), 0.0);
    }

    #[test]
    fn test_least_loaded() {
        let (_, state) = state_with_history();
        let ctx = PlacementContext::new("SMH", 5, &state);
        assert_eq!(LeastLoaded.evaluate(&Candidate::new(0, 2, false), &ctx), 3.0);
        assert_eq!(LeastLoaded.evaluate(&Candidate::new(1, 2, false), &ctx), 0.0);
    }
}
