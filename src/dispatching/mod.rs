//! Candidate priority rules and rule engine.
//!
//! When a block has room for fewer residents than are eligible, candidates
//! are ranked by a chain of rules evaluated sequentially: the next rule is
//! consulted only when every earlier rule ties.
//!
//! # Usage
//!
//! ```
//! use u_rotation::dispatching::{rules, RuleEngine};
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::Seniority)
//!     .with_rule(rules::LeastLoaded);
//! assert_eq!(engine.rule_names(), vec!["SENIORITY", "LEAST_LOADED"]);
//! ```

mod context;
mod engine;
pub mod rules;

pub use context::{Candidate, PlacementContext};
pub use engine::RuleEngine;

use std::fmt::Debug;

/// Score returned by a candidate rule.
///
/// Lower scores = higher priority (placed first).
pub type RuleScore = f64;

/// A rule that ranks residents competing for a block.
///
/// # Score Convention
/// **Lower score = higher priority.**
pub trait CandidateRule: Send + Sync + Debug {
    /// Rule name (e.g., "SENIORITY").
    fn name(&self) -> &'static str;

    /// Evaluates the priority of a candidate in the current context.
    fn evaluate(&self, candidate: &Candidate, context: &PlacementContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
