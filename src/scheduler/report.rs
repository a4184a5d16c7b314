//! Schedule outcome report.
//!
//! Computes coverage indicators from a completed schedule and its inputs.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Quota shortfall | Active resident-year with fewer blocks than its quota |
//! | Block shortfall | Block holding fewer residents than its minimum |
//! | Site shortfall | Site-period below the catalogue's site minimum |
//! | Fill rate | Sum of min(assigned, quota) over sum of quotas |

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use super::phases::quota_for;
use super::ScheduleRequest;
use crate::config::SchedulerConfig;
use crate::models::{PeriodKey, Schedule};

/// Overall run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every quota and minimum met.
    Complete,
    /// Assignments produced with at least one shortfall.
    Partial,
    /// No blocks to schedule.
    NoBlocks,
}

/// Placements made by each phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhasePlacements {
    pub pins: usize,
    pub specialty: usize,
    pub site_minimums: usize,
    pub greedy: usize,
    pub full_quota_repair: usize,
    pub first_year_repair: usize,
}

impl PhasePlacements {
    pub fn total(&self) -> usize {
        self.pins
            + self.specialty
            + self.site_minimums
            + self.greedy
            + self.full_quota_repair
            + self.first_year_repair
    }
}

/// Resident left below its annual quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaShortfall {
    pub resident_id: String,
    pub year: i32,
    pub program_year: u32,
    pub assigned: u32,
    pub required: u32,
}

/// Block left below its minimum occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockShortfall {
    pub block_id: String,
    pub rotation: String,
    pub year: i32,
    pub period: u32,
    pub assigned: u32,
    pub minimum: u32,
}

/// Site below its per-period minimum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteShortfall {
    pub site: String,
    pub year: i32,
    pub period: u32,
    pub assigned: u32,
    pub minimum: u32,
}

/// Coverage summary of one scheduling run.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleReport {
    pub status: RunStatus,
    /// Human-readable summary.
    pub message: String,
    pub assignment_count: usize,
    /// Filled in by the scheduler; zero when computed standalone.
    pub phase_placements: PhasePlacements,
    pub quota_shortfalls: Vec<QuotaShortfall>,
    pub block_shortfalls: Vec<BlockShortfall>,
    /// Only site-periods where the site has at least one block.
    pub site_shortfalls: Vec<SiteShortfall>,
    /// Quota fill rate (0.0..=1.0); 1.0 when nothing is required.
    pub fill_rate: f64,
}

impl ScheduleReport {
    /// Computes the report from a schedule and the request it was built for.
    pub fn calculate(
        schedule: &Schedule,
        request: &ScheduleRequest,
        config: &SchedulerConfig,
    ) -> Self {
        if request.blocks.is_empty() {
            return Self {
                status: RunStatus::NoBlocks,
                message: "No blocks available; generate blocks first".to_string(),
                assignment_count: schedule.assignment_count(),
                phase_placements: PhasePlacements::default(),
                quota_shortfalls: Vec::new(),
                block_shortfalls: Vec::new(),
                site_shortfalls: Vec::new(),
                fill_rate: 1.0,
            };
        }

        let mut year_counts: HashMap<(&str, i32), u32> = HashMap::new();
        let mut block_counts: HashMap<&str, u32> = HashMap::new();
        for a in &schedule.assignments {
            *year_counts.entry((a.resident_id.as_str(), a.year)).or_insert(0) += 1;
            *block_counts.entry(a.block_id.as_str()).or_insert(0) += 1;
        }

        let years: BTreeSet<i32> = request.blocks.iter().map(|b| b.year).collect();
        let mut quota_shortfalls = Vec::new();
        let mut required_total: u64 = 0;
        let mut filled_total: u64 = 0;
        for &year in &years {
            for resident in &request.residents {
                let Some(py) = resident.program_year(year, config.training_years).active() else {
                    continue;
                };
                let required = quota_for(config, py);
                let assigned = year_counts
                    .get(&(resident.id.as_str(), year))
                    .copied()
                    .unwrap_or(0);
                required_total += u64::from(required);
                filled_total += u64::from(assigned.min(required));
                if assigned < required {
                    quota_shortfalls.push(QuotaShortfall {
                        resident_id: resident.id.clone(),
                        year,
                        program_year: py,
                        assigned,
                        required,
                    });
                }
            }
        }

        let mut block_shortfalls = Vec::new();
        let mut site_counts: BTreeMap<(PeriodKey, &str), u32> = BTreeMap::new();
        for block in &request.blocks {
            let assigned = block_counts.get(block.id.as_str()).copied().unwrap_or(0);
            *site_counts
                .entry((block.period_key(), block.site.as_str()))
                .or_insert(0) += assigned;
            if assigned < block.min_occupancy {
                block_shortfalls.push(BlockShortfall {
                    block_id: block.id.clone(),
                    rotation: block.rotation.clone(),
                    year: block.year,
                    period: block.period,
                    assigned,
                    minimum: block.min_occupancy,
                });
            }
        }

        let site_shortfalls: Vec<SiteShortfall> = site_counts
            .into_iter()
            .filter_map(|((key, site), assigned)| {
                let minimum = request.catalogue.site_minimums.get(site).copied()?;
                (assigned < minimum).then(|| SiteShortfall {
                    site: site.to_string(),
                    year: key.year,
                    period: key.period,
                    assigned,
                    minimum,
                })
            })
            .collect();

        let fill_rate = if required_total == 0 {
            1.0
        } else {
            filled_total as f64 / required_total as f64
        };

        let complete = quota_shortfalls.is_empty()
            && block_shortfalls.is_empty()
            && site_shortfalls.is_empty();
        let (status, message) = if complete {
            (
                RunStatus::Complete,
                format!("Scheduled {} assignments", schedule.assignment_count()),
            )
        } else {
            (
                RunStatus::Partial,
                format!(
                    "Scheduled {} assignments; {} residents below quota, \
                     {} blocks and {} site periods below minimum",
                    schedule.assignment_count(),
                    quota_shortfalls.len(),
                    block_shortfalls.len(),
                    site_shortfalls.len()
                ),
            )
        };

        Self {
            status,
            message,
            assignment_count: schedule.assignment_count(),
            phase_placements: PhasePlacements::default(),
            quota_shortfalls,
            block_shortfalls,
            site_shortfalls,
            fill_rate,
        }
    }

    /// Whether no shortfall of any kind exists.
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Complete
    }
}
