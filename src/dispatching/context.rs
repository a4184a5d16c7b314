//! Placement context for candidate rule evaluation.

use crate::scheduler::SchedulerState;

/// A resident under consideration for one block.
///
/// Static per-block facts are computed once when the candidate list is
/// built; run-dependent counts are read from the context's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Resident index into the request roster.
    pub resident: usize,
    /// Active program year in the block's academic year.
    pub program_year: u32,
    /// Whether the resident's specialty matches the block's rotation.
    pub specialty_match: bool,
}

impl Candidate {
    pub fn new(resident: usize, program_year: u32, specialty_match: bool) -> Self {
        Self {
            resident,
            program_year,
            specialty_match,
        }
    }
}

/// Runtime state passed to candidate rules.
#[derive(Debug, Clone, Copy)]
pub struct PlacementContext<'a> {
    /// Rotation of the block being filled.
    pub rotation: &'a str,
    /// Program year N (training length).
    pub graduating_year: u32,
    /// Assignments made so far.
    pub state: &'a SchedulerState,
}

impl<'a> PlacementContext<'a> {
    pub fn new(rotation: &'a str, graduating_year: u32, state: &'a SchedulerState) -> Self {
        Self {
            rotation,
            graduating_year,
            state,
        }
    }

    /// Whether the candidate is in the graduating year.
    #[inline]
    pub fn is_graduating(&self, candidate: &Candidate) -> bool {
        candidate.program_year == self.graduating_year
    }

    /// Prior placements of the candidate on this context's rotation.
    #[inline]
    pub fn rotation_count(&self, candidate: &Candidate) -> u32 {
        self.state.rotation_count(candidate.resident, self.rotation)
    }

    /// All placements of the candidate so far.
    #[inline]
    pub fn total_count(&self, candidate: &Candidate) -> u32 {
        self.state.total_count(candidate.resident)
    }
}
