//! Constraint catalogue.
//!
//! The catalogue is the static, per-run rule table that drives eligibility:
//! which program years may take each rotation, per-block occupancy bounds,
//! per-site minimum headcounts, named period rules, and the specialty to
//! rotation-keyword map.
//!
//! An empty catalogue is a valid degraded mode: every rotation is open,
//! there are no site minimums and no period rules.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::ProgramYear;
use crate::Result;

/// Eligibility and occupancy rule for one rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationRule {
    /// Site hosting the rotation.
    pub site: String,
    /// Program years normally eligible.
    pub eligible_years: BTreeSet<u32>,
    /// Program years admitted when needed.
    pub allowed_if_needed: BTreeSet<u32>,
    /// Minimum residents per block.
    pub min_per_block: u32,
    /// Maximum residents per block.
    pub max_per_block: u32,
}

impl RotationRule {
    /// Creates a rule with no eligible years and occupancy 1..=1.
    pub fn new(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            eligible_years: BTreeSet::new(),
            allowed_if_needed: BTreeSet::new(),
            min_per_block: 1,
            max_per_block: 1,
        }
    }

    pub fn with_eligible_years(mut self, years: impl IntoIterator<Item = u32>) -> Self {
        self.eligible_years = years.into_iter().collect();
        self
    }

    pub fn with_allowed_if_needed(mut self, years: impl IntoIterator<Item = u32>) -> Self {
        self.allowed_if_needed = years.into_iter().collect();
        self
    }

    pub fn with_occupancy(mut self, min: u32, max: u32) -> Self {
        self.min_per_block = min;
        self.max_per_block = max;
        self
    }

    /// Whether `program_year` is eligible or allowed if needed.
    pub fn admits(&self, program_year: u32) -> bool {
        self.eligible_years.contains(&program_year)
            || self.allowed_if_needed.contains(&program_year)
    }
}

/// What a period rule demands of the program year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearRequirement {
    /// Only this program year may take the rotation.
    OnlyProgramYear(u32),
    /// This program year may not take the rotation.
    ExcludeProgramYear(u32),
}

/// A rule restricting who may take a rotation in specific periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRule {
    /// Rule identifier.
    pub name: String,
    /// Rotation the rule governs.
    pub rotation: String,
    /// Periods the rule covers.
    pub periods: Vec<u32>,
    /// Program-year requirement.
    pub requirement: YearRequirement,
    /// Whether the scheduler must actively place one resident
    /// (only meaningful for [`YearRequirement::OnlyProgramYear`]).
    #[serde(default)]
    pub pinned: bool,
}

impl PeriodRule {
    /// Creates an unpinned rule.
    pub fn new(
        name: impl Into<String>,
        rotation: impl Into<String>,
        periods: Vec<u32>,
        requirement: YearRequirement,
    ) -> Self {
        Self {
            name: name.into(),
            rotation: rotation.into(),
            periods,
            requirement,
            pinned: false,
        }
    }

    /// Marks the rule as a placement mandate.
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    /// Names accepted by [`PeriodRule::named`], in evaluation order.
    pub const REFERENCE_NAMES: [&'static str; 4] = [
        "r1_mgh_trauma_p3",
        "r1_mgh_spine_p3",
        "no_r4_mgh_trauma_p12_p13",
        "only_r5_mgh_trauma_p12_p13",
    ];

    /// Reference-program rule for a named flag.
    ///
    /// | name | effect |
    /// |------|--------|
    /// | `r1_mgh_trauma_p3` | only PY1 on MGH/Trauma in P3, pinned |
    /// | `r1_mgh_spine_p3` | only PY1 on MGH/Spine in P3, pinned |
    /// | `no_r4_mgh_trauma_p12_p13` | no PY4 on MGH/Trauma in P12-P13 |
    /// | `only_r5_mgh_trauma_p12_p13` | only PY5 on MGH/Trauma in P12-P13 |
    pub fn named(name: &str) -> Option<Self> {
        let rule = match name {
            "r1_mgh_trauma_p3" => {
                Self::new(name, "MGH/Trauma", vec![3], YearRequirement::OnlyProgramYear(1)).pinned()
            }
            "r1_mgh_spine_p3" => {
                Self::new(name, "MGH/Spine", vec![3], YearRequirement::OnlyProgramYear(1)).pinned()
            }
            "no_r4_mgh_trauma_p12_p13" => Self::new(
                name,
                "MGH/Trauma",
                vec![12, 13],
                YearRequirement::ExcludeProgramYear(4),
            ),
            "only_r5_mgh_trauma_p12_p13" => Self::new(
                name,
                "MGH/Trauma",
                vec![12, 13],
                YearRequirement::OnlyProgramYear(5),
            ),
            _ => return None,
        };
        Some(rule)
    }

    /// Whether the rule covers this rotation and period.
    #[inline]
    pub fn applies(&self, rotation: &str, period: u32) -> bool {
        self.rotation == rotation && self.periods.contains(&period)
    }

    /// Whether the rule allows `program_year` on `rotation` in `period`.
    ///
    /// Rules that do not apply always permit.
    pub fn permits(&self, rotation: &str, period: u32, program_year: ProgramYear) -> bool {
        if !self.applies(rotation, period) {
            return true;
        }
        match self.requirement {
            YearRequirement::OnlyProgramYear(y) => program_year == ProgramYear::Active(y),
            YearRequirement::ExcludeProgramYear(y) => program_year != ProgramYear::Active(y),
        }
    }

    /// The program year a pinned rule must place, if this is a pin.
    pub fn pin_year(&self) -> Option<u32> {
        match self.requirement {
            YearRequirement::OnlyProgramYear(y) if self.pinned => Some(y),
            _ => None,
        }
    }
}

/// Specialty name → rotation-name keywords.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecialtyKeywords(BTreeMap<String, Vec<String>>);

impl SpecialtyKeywords {
    pub fn new() -> Self {
        Self::default()
    }

    /// The reference orthopaedic program's specialty map.
    pub fn reference() -> Self {
        let entries: [(&str, &[&str]); 12] = [
            ("Arthroplasty", &["Arthro"]),
            ("Spine", &["Spine"]),
            ("Orthopaedic Oncology", &["Tumor"]),
            ("Orthopaedic Trauma", &["Trauma"]),
            ("Sports Orthopaedics", &["Sports"]),
            ("Primary Care Sports Medicine", &["Sports"]),
            ("Foot and Ankle", &["Foot"]),
            ("Pediatric Orthopaedics", &["Shriners", "MCH"]),
            ("Upper Extremity", &["Hand"]),
            ("Musculoskeletal Research", &["Research"]),
            ("Limb Lengthening", &["Shriners", "MCH"]),
            ("Undecided", &[]),
        ];
        let mut map = Self::new();
        for (specialty, keywords) in entries {
            map.insert(specialty, keywords.iter().copied());
        }
        map
    }

    /// Sets the keywords for a specialty.
    pub fn insert<I, S>(&mut self, specialty: impl Into<String>, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(specialty.into(), keywords.into_iter().map(Into::into).collect());
    }

    /// Keywords for a specialty (empty if unknown).
    pub fn keywords(&self, specialty: &str) -> &[String] {
        self.0.get(specialty).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The complete rule table for one scheduling run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintCatalogue {
    /// Rotation name → rule.
    pub rotations: BTreeMap<String, RotationRule>,
    /// Site → minimum residents per period.
    pub site_minimums: BTreeMap<String, u32>,
    /// Period rules, evaluated together.
    pub period_rules: Vec<PeriodRule>,
    /// Specialty keyword map.
    pub specialty_keywords: SpecialtyKeywords,
}

/// On-disk layout of the catalogue.
#[derive(Debug, Default, Deserialize)]
struct CatalogueFile {
    #[serde(default)]
    rotations: BTreeMap<String, RotationEntry>,
    #[serde(default)]
    site_minimums: BTreeMap<String, u32>,
    #[serde(default)]
    period_constraints: BTreeMap<String, bool>,
    #[serde(default)]
    period_rules: Vec<PeriodRule>,
    #[serde(default)]
    specialty_keywords: Option<SpecialtyKeywords>,
}

#[derive(Debug, Deserialize)]
struct RotationEntry {
    #[serde(default = "unknown_site")]
    site: String,
    #[serde(default)]
    eligible_years: Vec<u32>,
    #[serde(default)]
    allowed_if_needed: Vec<u32>,
    #[serde(default)]
    min_residents_per_block: Option<u32>,
    #[serde(default)]
    max_residents_per_block: Option<u32>,
}

fn unknown_site() -> String {
    "Unknown".to_string()
}

impl ConstraintCatalogue {
    /// Creates an empty catalogue (every rotation open).
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty catalogue carrying the reference specialty map.
    pub fn with_reference_specialties() -> Self {
        Self {
            specialty_keywords: SpecialtyKeywords::reference(),
            ..Self::default()
        }
    }

    /// Parses the JSON catalogue layout.
    ///
    /// `period_constraints` flags enable reference rules by name; unknown
    /// names are logged and ignored.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CatalogueFile = serde_json::from_str(json)?;

        let rotations = file
            .rotations
            .into_iter()
            .map(|(name, entry)| {
                let rule = RotationRule::new(entry.site)
                    .with_eligible_years(entry.eligible_years)
                    .with_allowed_if_needed(entry.allowed_if_needed)
                    .with_occupancy(
                        entry.min_residents_per_block.unwrap_or(1),
                        entry.max_residents_per_block.unwrap_or(1),
                    );
                (name, rule)
            })
            .collect();

        let mut period_rules: Vec<PeriodRule> = PeriodRule::REFERENCE_NAMES
            .iter()
            .filter(|name| file.period_constraints.get(**name).copied().unwrap_or(false))
            .filter_map(|name| PeriodRule::named(name))
            .collect();
        for name in file.period_constraints.keys() {
            if PeriodRule::named(name).is_none() {
                tracing::warn!(rule = %name, "unknown period constraint ignored");
            }
        }
        period_rules.extend(file.period_rules);

        Ok(Self {
            rotations,
            site_minimums: file.site_minimums,
            period_rules,
            specialty_keywords: file
                .specialty_keywords
                .unwrap_or_else(SpecialtyKeywords::reference),
        })
    }

    /// Loads a catalogue file.
    ///
    /// A missing file yields the degraded-mode catalogue (no rotations, no
    /// site minimums, no period rules, reference specialty map).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "No constraint catalogue at {:?}, every rotation is open",
                path
            );
            return Ok(Self::with_reference_specialties());
        }
        let contents = std::fs::read_to_string(path)?;
        let catalogue = Self::from_json_str(&contents)?;
        tracing::info!(
            rotations = catalogue.rotations.len(),
            period_rules = catalogue.period_rules.len(),
            "Loaded constraint catalogue from {:?}",
            path
        );
        Ok(catalogue)
    }

    /// Builder: adds a rotation rule.
    pub fn with_rotation(mut self, name: impl Into<String>, rule: RotationRule) -> Self {
        self.rotations.insert(name.into(), rule);
        self
    }

    /// Builder: sets a site minimum.
    pub fn with_site_minimum(mut self, site: impl Into<String>, minimum: u32) -> Self {
        self.site_minimums.insert(site.into(), minimum);
        self
    }

    /// Builder: adds a period rule.
    pub fn with_period_rule(mut self, rule: PeriodRule) -> Self {
        self.period_rules.push(rule);
        self
    }

    /// Builder: sets the keywords of one specialty.
    pub fn with_specialty<I, S>(mut self, specialty: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.specialty_keywords.insert(specialty, keywords);
        self
    }

    /// Rule for a rotation, if constrained.
    pub fn rotation(&self, name: &str) -> Option<&RotationRule> {
        self.rotations.get(name)
    }

    /// Pinned rules, in catalogue order.
    pub fn pinned_rules(&self) -> impl Iterator<Item = &PeriodRule> {
        self.period_rules.iter().filter(|r| r.pin_year().is_some())
    }

    /// Whether the catalogue constrains nothing.
    pub fn is_empty(&self) -> bool {
        self.rotations.is_empty() && self.site_minimums.is_empty() && self.period_rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "rotations": {
            "MGH/Trauma": {
                "site": "MGH",
                "eligible_years": [1, 2, 3],
                "allowed_if_needed": [4],
                "min_residents_per_block": 2,
                "max_residents_per_block": 4
            },
            "Research": { "site": "Other" }
        },
        "site_minimums": { "MGH": 3 },
        "period_constraints": {
            "r1_mgh_trauma_p3": true,
            "no_r4_mgh_trauma_p12_p13": false,
            "made_up_rule": true
        },
        "period_rules": [
            {
                "name": "no_r2_hand_p1",
                "rotation": "JGH/Hand",
                "periods": [1],
                "requirement": { "exclude_program_year": 2 }
            }
        ]
    }"#;

    #[test]
    fn test_parse_catalogue() {
        let cat = ConstraintCatalogue::from_json_str(SAMPLE).unwrap();

        let trauma = cat.rotation("MGH/Trauma").unwrap();
        assert_eq!(trauma.site, "MGH");
        assert!(trauma.admits(1));
        assert!(trauma.admits(4));
        assert!(!trauma.admits(5));
        assert_eq!((trauma.min_per_block, trauma.max_per_block), (2, 4));

        let research = cat.rotation("Research").unwrap();
        assert_eq!((research.min_per_block, research.max_per_block), (1, 1));
        assert!(research.eligible_years.is_empty());

        assert_eq!(cat.site_minimums.get("MGH"), Some(&3));

        // Enabled reference flag + explicit rule; disabled and unknown flags dropped
        assert_eq!(cat.period_rules.len(), 2);
        assert_eq!(cat.period_rules[0].name, "r1_mgh_trauma_p3");
        assert!(cat.period_rules[0].pinned);
        assert_eq!(
            cat.period_rules[1].requirement,
            YearRequirement::ExcludeProgramYear(2)
        );
        assert!(!cat.period_rules[1].pinned);

        // Reference specialties when none given
        assert_eq!(cat.specialty_keywords.keywords("Spine"), &["Spine".to_string()]);
    }

    #[test]
    fn test_parse_empty_document() {
        let cat = ConstraintCatalogue::from_json_str("{}").unwrap();
        assert!(cat.is_empty());
        assert!(!cat.specialty_keywords.is_empty());
    }

    #[test]
    fn test_load_missing_file_is_degraded_mode() {
        let cat = ConstraintCatalogue::load(Path::new("/nonexistent/rotation_constraints.json"))
            .unwrap();
        assert!(cat.is_empty());
    }

    #[test]
    fn test_named_rules() {
        let pin = PeriodRule::named("r1_mgh_spine_p3").unwrap();
        assert_eq!(pin.pin_year(), Some(1));
        assert!(pin.applies("MGH/Spine", 3));
        assert!(!pin.applies("MGH/Spine", 4));

        let only_r5 = PeriodRule::named("only_r5_mgh_trauma_p12_p13").unwrap();
        assert_eq!(only_r5.pin_year(), None);
        assert!(PeriodRule::named("nope").is_none());
    }

    #[test]
    fn test_period_rule_permits() {
        let only_r1 = PeriodRule::named("r1_mgh_trauma_p3").unwrap();
        assert!(only_r1.permits("MGH/Trauma", 3, ProgramYear::Active(1)));
        assert!(!only_r1.permits("MGH/Trauma", 3, ProgramYear::Active(2)));
        // Outside the rule's scope
        assert!(only_r1.permits("MGH/Trauma", 4, ProgramYear::Active(2)));
        assert!(only_r1.permits("SMH", 3, ProgramYear::Active(2)));

        let no_r4 = PeriodRule::named("no_r4_mgh_trauma_p12_p13").unwrap();
        assert!(!no_r4.permits("MGH/Trauma", 12, ProgramYear::Active(4)));
        assert!(no_r4.permits("MGH/Trauma", 13, ProgramYear::Active(5)));
    }

    #[test]
    fn test_specialty_keywords_reference() {
        let map = SpecialtyKeywords::reference();
        assert_eq!(map.len(), 12);
        assert_eq!(map.keywords("Pediatric Orthopaedics").len(), 2);
        assert!(map.keywords("Undecided").is_empty());
        assert!(map.keywords("Cardiology").is_empty());
    }

    #[test]
    fn test_builder_and_pinned_rules() {
        let cat = ConstraintCatalogue::new()
            .with_rotation("SMH", RotationRule::new("SMH").with_eligible_years([2, 3]))
            .with_site_minimum("SMH", 1)
            .with_period_rule(PeriodRule::named("r1_mgh_trauma_p3").unwrap())
            .with_period_rule(PeriodRule::named("no_r4_mgh_trauma_p12_p13").unwrap())
            .with_specialty("Spine", ["Spine"]);

        assert_eq!(cat.pinned_rules().count(), 1);
        assert!(!cat.is_empty());
        assert_eq!(cat.specialty_keywords.len(), 1);
    }

    #[test]
    fn test_named_flags_keep_reference_order() {
        let json = r#"{
            "period_constraints": {
                "only_r5_mgh_trauma_p12_p13": true,
                "r1_mgh_spine_p3": true,
                "r1_mgh_trauma_p3": true,
                "no_r4_mgh_trauma_p12_p13": false,
                "r9_unknown": true
            }
        }"#;
        let cat = ConstraintCatalogue::from_json_str(json).unwrap();
        let names: Vec<&str> = cat.period_rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["r1_mgh_trauma_p3", "r1_mgh_spine_p3", "only_r5_mgh_trauma_p12_p13"]
        );
        let pins: Vec<&str> = cat.pinned_rules().map(|r| r.rotation.as_str()).collect();
        assert_eq!(pins, vec!["MGH/Trauma", "MGH/Spine"]);
    }
}
