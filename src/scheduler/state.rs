//! Mutable scheduling state shared across phases.
//!
//! Residents and blocks are referenced by their index in the request's
//! slices. Every counter is maintained incrementally by [`SchedulerState::place`],
//! which is the only way to add an assignment.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{Assignment, Block, PeriodKey, Resident};

/// Per-run assignment state.
#[derive(Debug, Clone)]
pub struct SchedulerState {
    /// (resident, block) placements in order.
    placements: Vec<(usize, usize)>,
    pairs: HashSet<(usize, usize)>,
    /// Residents per block.
    occupancy: Vec<u32>,
    /// (resident, period) → block.
    commitments: HashMap<(usize, PeriodKey), usize>,
    /// Per-resident rotation counts across the whole run.
    rotation_counts: Vec<HashMap<String, u32>>,
    /// Per-resident placements across the whole run.
    totals: Vec<u32>,
    /// (resident, academic year) → blocks held.
    year_counts: HashMap<(usize, i32), u32>,
    /// Block indices per period; the order inside a period is mutable.
    period_blocks: BTreeMap<PeriodKey, Vec<usize>>,
}

impl SchedulerState {
    /// Creates empty state for a roster of `resident_count` over `blocks`.
    ///
    /// Blocks keep their input order within each period.
    pub fn new(resident_count: usize, blocks: &[Block]) -> Self {
        let mut period_blocks: BTreeMap<PeriodKey, Vec<usize>> = BTreeMap::new();
        for (idx, block) in blocks.iter().enumerate() {
            period_blocks.entry(block.period_key()).or_default().push(idx);
        }

        Self {
            placements: Vec::new(),
            pairs: HashSet::new(),
            occupancy: vec![0; blocks.len()],
            commitments: HashMap::new(),
            rotation_counts: vec![HashMap::new(); resident_count],
            totals: vec![0; resident_count],
            year_counts: HashMap::new(),
            period_blocks,
        }
    }

    /// Places a resident on a block.
    ///
    /// Returns `false` without changing anything if the pair already exists,
    /// the resident is committed in that period, or the block is full.
    pub fn place(&mut self, resident: usize, block_idx: usize, block: &Block) -> bool {
        let key = block.period_key();
        if self.pairs.contains(&(resident, block_idx))
            || self.commitments.contains_key(&(resident, key))
            || !self.has_capacity(block_idx, block)
        {
            return false;
        }

        self.placements.push((resident, block_idx));
        self.pairs.insert((resident, block_idx));
        self.occupancy[block_idx] += 1;
        self.commitments.insert((resident, key), block_idx);
        *self.rotation_counts[resident]
            .entry(block.rotation.clone())
            .or_insert(0) += 1;
        self.totals[resident] += 1;
        *self.year_counts.entry((resident, block.year)).or_insert(0) += 1;
        true
    }

    /// Whether the resident already holds a block in `key`.
    #[inline]
    pub fn is_committed(&self, resident: usize, key: PeriodKey) -> bool {
        self.commitments.contains_key(&(resident, key))
    }

    /// Residents currently on a block.
    #[inline]
    pub fn occupancy(&self, block_idx: usize) -> u32 {
        self.occupancy[block_idx]
    }

    /// Free places left on a block.
    #[inline]
    pub fn remaining_capacity(&self, block_idx: usize, block: &Block) -> u32 {
        block.max_occupancy.saturating_sub(self.occupancy[block_idx])
    }

    #[inline]
    pub fn has_capacity(&self, block_idx: usize, block: &Block) -> bool {
        self.remaining_capacity(block_idx, block) > 0
    }

    /// Blocks the resident holds in an academic year.
    #[inline]
    pub fn year_count(&self, resident: usize, year: i32) -> u32 {
        self.year_counts.get(&(resident, year)).copied().unwrap_or(0)
    }

    /// Prior placements of the resident on a rotation.
    #[inline]
    pub fn rotation_count(&self, resident: usize, rotation: &str) -> u32 {
        self.rotation_counts[resident]
            .get(rotation)
            .copied()
            .unwrap_or(0)
    }

    /// All placements of the resident so far.
    #[inline]
    pub fn total_count(&self, resident: usize) -> u32 {
        self.totals[resident]
    }

    /// Periods in chronological order.
    pub fn periods(&self) -> Vec<PeriodKey> {
        self.period_blocks.keys().copied().collect()
    }

    /// Block indices of a period, in current order.
    pub fn blocks_in_period(&self, key: PeriodKey) -> &[usize] {
        self.period_blocks
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Mutable block order of a period.
    pub fn blocks_in_period_mut(&mut self, key: PeriodKey) -> Option<&mut Vec<usize>> {
        self.period_blocks.get_mut(&key)
    }

    /// Number of placements.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Materializes assignments in placement order.
    pub fn into_assignments(self, residents: &[Resident], blocks: &[Block]) -> Vec<Assignment> {
        self.placements
            .into_iter()
            .map(|(r, b)| Assignment::from_block(&residents[r].id, &blocks[b]))
            .collect()
    }
}
