//! Block calendar generation.
//!
//! Every rotation in the catalogue runs in every period of every academic
//! year, each instance capacity-bounded independently. A catalogue without
//! rotations falls back to one `Rotation-{site}` block per period, cycling
//! over the configured sites.

use super::{Block, ConstraintCatalogue};
use crate::config::SchedulerConfig;

/// Generates the calendar a run will schedule against.
///
/// Uses the catalogue's rotations when it has any, otherwise the fallback
/// sites and per-block capacity from `config`.
pub fn generate_calendar(
    catalogue: &ConstraintCatalogue,
    config: &SchedulerConfig,
    first_year: i32,
    years: u32,
) -> Vec<Block> {
    if catalogue.rotations.is_empty() {
        tracing::info!(
            sites = config.fallback_sites.len(),
            "catalogue has no rotations; generating fallback site blocks"
        );
        generate_fallback_blocks(
            &config.fallback_sites,
            config.residents_per_block,
            first_year,
            years,
            config.periods_per_year,
        )
    } else {
        generate_blocks(catalogue, first_year, years, config.periods_per_year)
    }
}

/// Generates the block calendar for `years` consecutive academic years.
///
/// Blocks are emitted year-major, then period, then rotation (catalogue
/// order), with sequential IDs `B0001`, `B0002`, ... and occupancy bounds
/// copied from each rotation rule.
///
/// # Examples
///
/// ```
/// use u_rotation::models::{generate_blocks, ConstraintCatalogue, RotationRule};
///
/// let catalogue = ConstraintCatalogue::new()
///     .with_rotation("SMH", RotationRule::new("SMH").with_occupancy(1, 2));
/// let blocks = generate_blocks(&catalogue, 2025, 1, 13);
/// assert_eq!(blocks.len(), 13);
/// assert_eq!(blocks[0].id, "B0001");
/// ```
pub fn generate_blocks(
    catalogue: &ConstraintCatalogue,
    first_year: i32,
    years: u32,
    periods_per_year: u32,
) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(
        catalogue.rotations.len() * years as usize * periods_per_year as usize,
    );
    let mut next_id = 1usize;

    for year_offset in 0..years {
        let year = first_year + year_offset as i32;
        for period in 1..=periods_per_year {
            for (rotation, rule) in &catalogue.rotations {
                blocks.push(
                    Block::new(format!("B{next_id:04}"), period, year, rotation, &rule.site)
                        .with_occupancy(rule.min_per_block, rule.max_per_block),
                );
                next_id += 1;
            }
        }
    }

    blocks
}

/// Generates one `Rotation-{site}` block per period, cycling over `sites`.
///
/// Period `p` goes to `sites[(p - 1) % sites.len()]`. Each block takes
/// between 1 and `residents_per_block` residents. Returns no blocks when
/// `sites` is empty.
pub fn generate_fallback_blocks<S: AsRef<str>>(
    sites: &[S],
    residents_per_block: u32,
    first_year: i32,
    years: u32,
    periods_per_year: u32,
) -> Vec<Block> {
    if sites.is_empty() {
        return Vec::new();
    }
    let mut blocks = Vec::with_capacity(years as usize * periods_per_year as usize);

    for year_offset in 0..years {
        let year = first_year + year_offset as i32;
        for period in 1..=periods_per_year {
            let site = sites[(period as usize - 1) % sites.len()].as_ref();
            let id = format!("B{:04}", blocks.len() + 1);
            blocks.push(
                Block::new(id, period, year, format!("Rotation-{site}"), site)
                    .with_occupancy(1, residents_per_block),
            );
        }
    }

    blocks
}
