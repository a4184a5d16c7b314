//! Eligibility and legality predicates.
//!
//! Pure functions deciding whether a (resident, rotation, block) triple is
//! structurally legal. They never look at capacity or existing assignments;
//! the scheduler layers those checks on top.

use crate::models::{Block, ConstraintCatalogue, Resident, Specialty};

/// Predicate set bound to one catalogue and training length.
#[derive(Debug, Clone, Copy)]
pub struct Eligibility<'a> {
    catalogue: &'a ConstraintCatalogue,
    training_years: u32,
}

impl<'a> Eligibility<'a> {
    pub fn new(catalogue: &'a ConstraintCatalogue, training_years: u32) -> Self {
        Self {
            catalogue,
            training_years,
        }
    }

    /// Whether the resident may take `rotation` in `block`'s academic year.
    ///
    /// Rotations without a catalogue entry are open to everyone. Otherwise
    /// the resident must be active and either in the rotation's eligible or
    /// allowed-if-needed years, or have a decided specialty matching the
    /// rotation name.
    pub fn is_eligible(&self, resident: &Resident, rotation: &str, block: &Block) -> bool {
        let Some(rule) = self.catalogue.rotation(rotation) else {
            return true;
        };

        let Some(program_year) = resident
            .program_year(block.year, self.training_years)
            .active()
        else {
            return false;
        };

        rule.admits(program_year) || self.matches_specialty(rotation, &resident.specialty)
    }

    /// Whether every period rule allows the pairing.
    pub fn satisfies_period_rules(
        &self,
        resident: &Resident,
        rotation: &str,
        block: &Block,
    ) -> bool {
        let program_year = resident.program_year(block.year, self.training_years);
        self.catalogue
            .period_rules
            .iter()
            .all(|rule| rule.permits(rotation, block.period, program_year))
    }

    /// Whether `rotation` contains (case-insensitive) a keyword of `specialty`.
    pub fn matches_specialty(&self, rotation: &str, specialty: &Specialty) -> bool {
        if specialty.is_undecided() {
            return false;
        }
        let rotation_upper = rotation.to_uppercase();
        self.catalogue
            .specialty_keywords
            .keywords(specialty.as_str())
            .iter()
            .any(|keyword| rotation_upper.contains(&keyword.to_uppercase()))
    }

    /// Eligible and period-legal.
    #[inline]
    pub fn is_legal(&self, resident: &Resident, block: &Block) -> bool {
        self.is_eligible(resident, &block.rotation, block)
            && self.satisfies_period_rules(resident, &block.rotation, block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PeriodRule, RotationRule, SpecialtyKeywords};

    const YEAR: i32 = 2025;

    fn catalogue() -> ConstraintCatalogue {
        ConstraintCatalogue {
            specialty_keywords: SpecialtyKeywords::reference(),
            ..ConstraintCatalogue::default()
        }
        .with_rotation(
            "MGH/Trauma",
            RotationRule::new("MGH")
                .with_eligible_years([1, 2, 3])
                .with_allowed_if_needed([5]),
        )
        .with_rotation("MGH/Spine", RotationRule::new("MGH").with_eligible_years([2, 3]))
        .with_period_rule(PeriodRule::named("r1_mgh_trauma_p3").unwrap())
        .with_period_rule(PeriodRule::named("no_r4_mgh_trauma_p12_p13").unwrap())
        .with_period_rule(PeriodRule::named("only_r5_mgh_trauma_p12_p13").unwrap())
    }

    /// Resident in program year `py` during YEAR.
    fn resident(py: i32) -> Resident {
        Resident::new(format!("PY{py}"), YEAR - py + 1)
    }

    fn block(rotation: &str, period: u32) -> Block {
        Block::new("B", period, YEAR, rotation, "MGH")
    }

    #[test]
    fn test_open_rotation() {
        let cat = catalogue();
        let e = Eligibility::new(&cat, 5);
        assert!(e.is_eligible(&resident(4), "Electives", &block("Electives", 1)));
    }

    #[test]
    fn test_eligible_and_allowed_years() {
        let cat = catalogue();
        let e = Eligibility::new(&cat, 5);
        let b = block("MGH/Trauma", 1);
        assert!(e.is_eligible(&resident(1), "MGH/Trauma", &b));
        assert!(e.is_eligible(&resident(5), "MGH/Trauma", &b)); // allowed if needed
        assert!(!e.is_eligible(&resident(4), "MGH/Trauma", &b));
    }

    #[test]
    fn test_inactive_resident_ineligible() {
        let cat = catalogue();
        let e = Eligibility::new(&cat, 5);
        let b = block("MGH/Trauma", 1);
        let graduated = Resident::new("G", YEAR - 5);
        let incoming = Resident::new("N", YEAR + 1);
        assert!(!e.is_eligible(&graduated, "MGH/Trauma", &b));
        assert!(!e.is_eligible(&incoming, "MGH/Trauma", &b));
    }

    #[test]
    fn test_specialty_override() {
        let cat = catalogue();
        let e = Eligibility::new(&cat, 5);
        let b = block("MGH/Spine", 5);
        assert!(!e.is_eligible(&resident(5), "MGH/Spine", &b));
        assert!(e.is_eligible(&resident(5).with_specialty("Spine"), "MGH/Spine", &b));
        // Override does not revive inactive residents
        let graduated = Resident::new("G", YEAR - 5).with_specialty("Spine");
        assert!(!e.is_eligible(&graduated, "MGH/Spine", &b));
    }

    #[test]
    fn test_matches_specialty() {
        let cat = catalogue();
        let e = Eligibility::new(&cat, 5);
        assert!(e.matches_specialty("MGH/Spine", &"Spine".into()));
        assert!(e.matches_specialty("mgh/spine", &"Spine".into()));
        assert!(e.matches_specialty("MCH/Shriners", &"Limb Lengthening".into()));
        assert!(!e.matches_specialty("MGH/Trauma", &"Spine".into()));
        assert!(!e.matches_specialty("MGH/Spine", &Specialty::undecided()));
        assert!(!e.matches_specialty("MGH/Spine", &"Cardiology".into()));
    }

    #[test]
    fn test_period_rules_pin_period() {
        let cat = catalogue();
        let e = Eligibility::new(&cat, 5);
        let p3 = block("MGH/Trauma", 3);
        assert!(e.satisfies_period_rules(&resident(1), "MGH/Trauma", &p3));
        assert!(!e.satisfies_period_rules(&resident(2), "MGH/Trauma", &p3));
        // Other periods unaffected
        assert!(e.satisfies_period_rules(&resident(2), "MGH/Trauma", &block("MGH/Trauma", 4)));
    }

    #[test]
    fn test_period_rules_are_conjunctive() {
        let cat = catalogue();
        let e = Eligibility::new(&cat, 5);
        let p12 = block("MGH/Trauma", 12);
        assert!(!e.satisfies_period_rules(&resident(4), "MGH/Trauma", &p12));
        assert!(!e.satisfies_period_rules(&resident(3), "MGH/Trauma", &p12));
        assert!(e.satisfies_period_rules(&resident(5), "MGH/Trauma", &p12));
    }

    #[test]
    fn test_is_legal() {
        let cat = catalogue();
        let e = Eligibility::new(&cat, 5);
        assert!(e.is_legal(&resident(1), &block("MGH/Trauma", 3)));
        assert!(!e.is_legal(&resident(2), &block("MGH/Trauma", 3)));
        assert!(!e.is_legal(&resident(4), &block("MGH/Trauma", 5)));
    }
}
