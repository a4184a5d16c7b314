//! Rule engine for multi-criteria candidate ranking.
//!
//! Composes candidate rules into a lexicographic key. Ties after the last
//! rule keep the candidates' input order.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{rules, Candidate, CandidateRule, PlacementContext, RuleScore};

/// A composable rule engine for candidate prioritization.
///
/// # Example
/// ```
/// use u_rotation::dispatching::RuleEngine;
///
/// let engine = RuleEngine::residency_default();
/// assert_eq!(engine.len(), 4);
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn CandidateRule>>,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            epsilon: 1e-9,
        }
    }

    /// Standard residency ranking: seniority, specialty affinity,
    /// rotation exposure, then least loaded.
    pub fn residency_default() -> Self {
        Self::new()
            .with_rule(rules::Seniority)
            .with_rule(rules::SpecialtyAffinity)
            .with_rule(rules::RotationExposure)
            .with_rule(rules::LeastLoaded)
    }

    /// Appends a rule to the chain.
    pub fn with_rule<R: CandidateRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Number of rules in the chain.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Sorts candidates by priority (highest priority first).
    ///
    /// Returns indices into `candidates`. The sort is stable.
    pub fn sort_indices(&self, candidates: &[Candidate], context: &PlacementContext) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..candidates.len()).collect();
        indices.sort_by(|&a, &b| self.compare(&candidates[a], &candidates[b], context));
        indices
    }

    /// Returns the index of the highest-priority candidate.
    ///
    /// The earliest candidate wins ties.
    pub fn select_best(
        &self,
        candidates: &[Candidate],
        context: &PlacementContext,
    ) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (idx, candidate) in candidates.iter().enumerate() {
            match best {
                Some(b) if self.compare(candidate, &candidates[b], context) != Ordering::Less => {}
                _ => best = Some(idx),
            }
        }
        best
    }

    /// Scores from each rule, in chain order.
    pub fn evaluate(&self, candidate: &Candidate, context: &PlacementContext) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|rule| rule.evaluate(candidate, context))
            .collect()
    }

    fn compare(&self, a: &Candidate, b: &Candidate, context: &PlacementContext) -> Ordering {
        for rule in &self.rules {
            let score_a = rule.evaluate(a, context);
            let score_b = rule.evaluate(b, context);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal);
            }
        }
        Ordering::Equal
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::residency_default()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Block;
    use crate::scheduler::SchedulerState;

    fn blocks() -> Vec<Block> {
        vec![
            Block::new("B1", 1, 2025, "MGH/Spine", "MGH").with_occupancy(0, 5),
            Block::new("B2", 2, 2025, "MGH/Spine", "MGH").with_occupancy(0, 5),
            Block::new("B3", 3, 2025, "SMH", "SMH").with_occupancy(0, 5),
        ]
    }

    #[test]
    fn test_seniority_first() {
        let blocks = blocks();
        let state = SchedulerState::new(3, &blocks);
        let ctx = PlacementContext::new("SMH", 5, &state);
        let candidates = vec![
            Candidate::new(0, 2, false),
            Candidate::new(1, 4, false),
            Candidate::new(2, 3, true),
        ];

        let engine = RuleEngine::residency_default();
        assert_eq!(engine.sort_indices(&candidates, &ctx), vec![1, 2, 0]);
    }

    #[test]
    fn test_specialty_breaks_seniority_tie() {
        let blocks = blocks();
        let state = SchedulerState::new(2, &blocks);
        let ctx = PlacementContext::new("MGH/Spine", 5, &state);
        let candidates = vec![Candidate::new(0, 3, false), Candidate::new(1, 3, true)];

        let engine = RuleEngine::residency_default();
        assert_eq!(engine.select_best(&candidates, &ctx), Some(1));
    }

    #[test]
    fn test_exposure_direction() {
        let blocks = blocks();
        let mut state = SchedulerState::new(4, &blocks);
        // Residents 0 and 2 already did a Spine block
        state.place(0, 0, &blocks[0]);
        state.place(2, 0, &blocks[0]);
        let ctx = PlacementContext::new("MGH/Spine", 5, &state);
        let engine = RuleEngine::residency_default();

        // Graduating matches prefer more exposure
        let grads = vec![Candidate::new(1, 5, true), Candidate::new(0, 5, true)];
        assert_eq!(engine.select_best(&grads, &ctx), Some(1));

        // Everyone else prefers less exposure
        let others = vec![Candidate::new(2, 3, false), Candidate::new(3, 3, false)];
        assert_eq!(engine.select_best(&others, &ctx), Some(1));
    }

    #[test]
    fn test_least_loaded_then_stable() {
        let blocks = blocks();
        let mut state = SchedulerState::new(3, &blocks);
        state.place(0, 2, &blocks[2]);
        let ctx = PlacementContext::new("MGH/Spine", 5, &state);
        let candidates = vec![
            Candidate::new(0, 2, false),
            Candidate::new(1, 2, false),
            Candidate::new(2, 2, false),
        ];

        let engine = RuleEngine::residency_default();
        // 1 and 2 tie on everything; input order holds
        assert_eq!(engine.sort_indices(&candidates, &ctx), vec![1, 2, 0]);
        assert_eq!(engine.select_best(&candidates, &ctx), Some(1));
    }

    #[test]
    fn test_empty_candidates() {
        let blocks = blocks();
        let state = SchedulerState::new(0, &blocks);
        let ctx = PlacementContext::new("SMH", 5, &state);
        let engine = RuleEngine::residency_default();
        assert!(engine.sort_indices(&[], &ctx).is_empty());
        assert!(engine.select_best(&[], &ctx).is_none());
    }

    #[test]
    fn test_evaluate_scores() {
        let blocks = blocks();
        let state = SchedulerState::new(1, &blocks);
        let ctx = PlacementContext::new("MGH/Spine", 5, &state);
        let engine = RuleEngine::residency_default();
        let scores = engine.evaluate(&Candidate::new(0, 5, true), &ctx);
        assert_eq!(scores, vec![-5.0, -100.0, 0.0, 0.0]);
    }
}
