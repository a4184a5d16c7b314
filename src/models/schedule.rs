//! Schedule (solution) model.
//!
//! A schedule is the set of resident-block assignments for one or more
//! academic years. Each assignment carries the block's rotation, site,
//! period and year so consumers need not join against the block calendar.

use serde::{Deserialize, Serialize};

use super::Block;
use crate::AssignmentError;

/// A complete rotation schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Resident-block assignments.
    pub assignments: Vec<Assignment>,
}

/// A resident-block assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned resident ID.
    pub resident_id: String,
    /// Assigned block ID.
    pub block_id: String,
    /// Rotation name (denormalized from the block).
    pub rotation: String,
    /// Site (denormalized).
    pub site: String,
    /// Period number (denormalized).
    pub period: u32,
    /// Academic year (denormalized).
    pub year: i32,
}

impl Assignment {
    /// Creates an assignment, copying descriptive fields from `block`.
    pub fn from_block(resident_id: impl Into<String>, block: &Block) -> Self {
        Self {
            resident_id: resident_id.into(),
            block_id: block.id.clone(),
            rotation: block.rotation.clone(),
            site: block.site.clone(),
            period: block.period,
            year: block.year,
        }
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing assignment list.
    pub fn from_assignments(assignments: Vec<Assignment>) -> Self {
        Self { assignments }
    }

    /// Assigns a resident to a block by ID, enforcing schedule invariants.
    ///
    /// Re-adding an existing (resident, block) pair is a no-op that returns
    /// the existing record.
    ///
    /// # Errors
    /// - [`AssignmentError::BlockNotFound`] if `block_id` is not in `blocks`
    /// - [`AssignmentError::PeriodConflict`] if the resident already holds a
    ///   rotation in that period
    /// - [`AssignmentError::AtCapacity`] if the block is full
    pub fn assign(
        &mut self,
        resident_id: &str,
        block_id: &str,
        blocks: &[Block],
    ) -> Result<&Assignment, AssignmentError> {
        let block = blocks
            .iter()
            .find(|b| b.id == block_id)
            .ok_or_else(|| AssignmentError::BlockNotFound {
                block_id: block_id.to_string(),
            })?;

        if let Some(pos) = self
            .assignments
            .iter()
            .position(|a| a.resident_id == resident_id && a.block_id == block_id)
        {
            return Ok(&self.assignments[pos]);
        }

        if let Some(existing) = self.assignment_in_period(resident_id, block.year, block.period) {
            return Err(AssignmentError::PeriodConflict {
                resident_id: resident_id.to_string(),
                rotation: existing.rotation.clone(),
                period: block.period,
                year: block.year,
            });
        }

        if self.occupancy(block_id) >= block.max_occupancy as usize {
            return Err(AssignmentError::AtCapacity {
                block_id: block_id.to_string(),
                max_occupancy: block.max_occupancy,
            });
        }

        self.assignments.push(Assignment::from_block(resident_id, block));
        Ok(&self.assignments[self.assignments.len() - 1])
    }

    /// Removes assignments from a block: only `resident_id`'s if given,
    /// otherwise all of them. Returns the number removed.
    pub fn unassign(&mut self, block_id: &str, resident_id: Option<&str>) -> usize {
        let before = self.assignments.len();
        self.assignments.retain(|a| {
            a.block_id != block_id || resident_id.is_some_and(|r| a.resident_id != r)
        });
        before - self.assignments.len()
    }

    /// Removes every assignment held by a resident.
    pub fn remove_resident(&mut self, resident_id: &str) -> usize {
        let before = self.assignments.len();
        self.assignments.retain(|a| a.resident_id != resident_id);
        before - self.assignments.len()
    }

    /// Returns all assignments for a resident.
    pub fn assignments_for_resident(&self, resident_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.resident_id == resident_id)
            .collect()
    }

    /// Returns all assignments for a block.
    pub fn assignments_for_block(&self, block_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.block_id == block_id)
            .collect()
    }

    /// Returns all assignments in an academic year.
    pub fn assignments_for_year(&self, year: i32) -> Vec<&Assignment> {
        self.assignments.iter().filter(|a| a.year == year).collect()
    }

    /// The resident's assignment in a given period, if any.
    pub fn assignment_in_period(
        &self,
        resident_id: &str,
        year: i32,
        period: u32,
    ) -> Option<&Assignment> {
        self.assignments
            .iter()
            .find(|a| a.resident_id == resident_id && a.year == year && a.period == period)
    }

    /// Number of residents assigned to a block.
    pub fn occupancy(&self, block_id: &str) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.block_id == block_id)
            .count()
    }

    /// Number of blocks a resident holds in an academic year.
    pub fn resident_year_count(&self, resident_id: &str, year: i32) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.resident_id == resident_id && a.year == year)
            .count()
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_blocks() -> Vec<Block> {
        vec![
            Block::new("B1", 1, 2025, "MGH/Trauma", "MGH").with_occupancy(1, 2),
            Block::new("B2", 1, 2025, "SMH", "SMH").with_occupancy(0, 1),
            Block::new("B3", 2, 2025, "SMH", "SMH").with_occupancy(0, 1),
        ]
    }

    #[test]
    fn test_assign_denormalizes_block() {
        let blocks = sample_blocks();
        let mut s = Schedule::new();
        let a = s.assign("R1", "B1", &blocks).unwrap();
        assert_eq!(a.rotation, "MGH/Trauma");
        assert_eq!(a.site, "MGH");
        assert_eq!(a.period, 1);
        assert_eq!(a.year, 2025);
    }

    #[test]
    fn test_assign_is_idempotent() {
        let blocks = sample_blocks();
        let mut s = Schedule::new();
        s.assign("R1", "B1", &blocks).unwrap();
        let again = s.assign("R1", "B1", &blocks).unwrap().clone();
        assert_eq!(again.block_id, "B1");
        assert_eq!(s.assignment_count(), 1);
    }

    #[test]
    fn test_assign_rejects_period_conflict() {
        let blocks = sample_blocks();
        let mut s = Schedule::new();
        s.assign("R1", "B1", &blocks).unwrap();
        let err = s.assign("R1", "B2", &blocks).unwrap_err();
        assert_eq!(
            err,
            AssignmentError::PeriodConflict {
                resident_id: "R1".into(),
                rotation: "MGH/Trauma".into(),
                period: 1,
                year: 2025,
            }
        );
        // A different period is fine
        assert!(s.assign("R1", "B3", &blocks).is_ok());
    }

    #[test]
    fn test_assign_rejects_full_block() {
        let blocks = sample_blocks();
        let mut s = Schedule::new();
        s.assign("R1", "B2", &blocks).unwrap();
        let err = s.assign("R2", "B2", &blocks).unwrap_err();
        assert!(matches!(err, AssignmentError::AtCapacity { max_occupancy: 1, .. }));
        assert_eq!(s.occupancy("B2"), 1);
    }

    #[test]
    fn test_assign_unknown_block() {
        let mut s = Schedule::new();
        let err = s.assign("R1", "B99", &sample_blocks()).unwrap_err();
        assert!(matches!(err, AssignmentError::BlockNotFound { .. }));
    }

    #[test]
    fn test_unassign() {
        let blocks = sample_blocks();
        let mut s = Schedule::new();
        s.assign("R1", "B1", &blocks).unwrap();
        s.assign("R2", "B1", &blocks).unwrap();
        s.assign("R1", "B3", &blocks).unwrap();

        assert_eq!(s.unassign("B1", Some("R2")), 1);
        assert_eq!(s.assignments_for_block("B1").len(), 1);

        assert_eq!(s.unassign("B1", None), 1);
        assert_eq!(s.occupancy("B1"), 0);
        assert_eq!(s.assignment_count(), 1);
    }

    #[test]
    fn test_queries() {
        let blocks = sample_blocks();
        let mut s = Schedule::new();
        s.assign("R1", "B1", &blocks).unwrap();
        s.assign("R1", "B3", &blocks).unwrap();
        s.assign("R2", "B2", &blocks).unwrap();

        assert_eq!(s.assignments_for_resident("R1").len(), 2);
        assert_eq!(s.assignments_for_year(2025).len(), 3);
        assert_eq!(s.resident_year_count("R1", 2025), 2);
        assert_eq!(s.resident_year_count("R1", 2026), 0);
        assert!(s.assignment_in_period("R2", 2025, 1).is_some());
        assert!(s.assignment_in_period("R2", 2025, 2).is_none());

        assert_eq!(s.remove_resident("R1"), 2);
        assert_eq!(s.assignment_count(), 1);
    }

    #[test]
    fn test_empty_schedule() {
        let s = Schedule::new();
        assert!(s.is_empty());
        assert_eq!(s.assignment_count(), 0);
    }
}
