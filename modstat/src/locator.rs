//! Decide whether a peptide carries the modification under study
use super::*;
use serde::{Deserialize, Serialize};

/// How tags are matched against qualifying residues.
///
/// Some input preparations keep positions consistent with the reference
/// numbering, others only keep the residue letters right.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// A tag with the target mass must sit on one of the qualifying positions
    #[default]
    ExactPosition,
    /// Any tag with the target mass counts, as long as the peptide contains
    /// a qualifying residue
    AnyQualifyingResidue,
}

/// The modification being quantified: a mass shift on a set of residues
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    pub residues: ResidueSet,
    pub mass: MassShift,
    pub tolerance: Tolerance,
}

impl Target {
    pub fn new(residues: &str, mass: MassShift, tolerance: Tolerance) -> Target {
        Target {
            residues: ResidueSet::new(residues),
            mass,
            tolerance,
        }
    }
}

/// True if some tag with a matching mass sits on one of `qualifying`, which
/// must be sorted in ascending order
pub fn is_modified_at(
    tags: &Modifications,
    mass: MassShift,
    tolerance: Tolerance,
    qualifying: &[Position],
) -> bool {
    tags.iter().any(|tag| {
        tolerance.contains(mass, tag.mass()) && qualifying.binary_search(&tag.position()).is_ok()
    })
}

/// True if any tag has a matching mass, wherever it sits
pub fn carries_mass(tags: &Modifications, mass: MassShift, tolerance: Tolerance) -> bool {
    tags.iter().any(|tag| tolerance.contains(mass, tag.mass()))
}

impl MatchMode {
    pub fn is_modified(self, record: &PeptideRecord, target: &Target, qualifying: &[Position]) -> bool {
        match self {
            MatchMode::ExactPosition => {
                is_modified_at(record.modifications(), target.mass, target.tolerance, qualifying)
            }
            MatchMode::AnyQualifyingResidue => {
                target.residues.in_sequence(record.sequence())
                    && carries_mass(record.modifications(), target.mass, target.tolerance)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(start: Position, seq: &str, modification: &str) -> PeptideRecord {
        normalize(&RawPeptideRecord {
            start,
            end: start + seq.len() as Position - 1,
            sequence: seq.into(),
            modification: modification.into(),
            spectra: 1,
        })
        .unwrap()
    }

    fn oxidation() -> Target {
        Target::new("MPH", MassShift::from_da(15.995), Tolerance::default())
    }

    #[test]
    fn exact_position() {
        let r = record(20, "AMAAC", "21@15.995");
        let mode = MatchMode::ExactPosition;
        assert!(mode.is_modified(&r, &oxidation(), &[21]));
        assert!(!mode.is_modified(&r, &oxidation(), &[22, 23]));

        let cam = Target::new("C", MassShift::from_da(57.022), Tolerance::default());
        assert!(!mode.is_modified(&r, &cam, &[21, 24]));
    }

    #[test]
    fn tolerance_window() {
        let r = record(20, "AMAAC", "21@15.996");
        assert!(is_modified_at(
            r.modifications(),
            MassShift::from_da(15.995),
            Tolerance::default(),
            &[21]
        ));
        let r = record(20, "AMAAC", "21@15.997");
        assert!(!is_modified_at(
            r.modifications(),
            MassShift::from_da(15.995),
            Tolerance::default(),
            &[21]
        ));
    }

    #[test]
    fn any_qualifying_residue() {
        let mode = MatchMode::AnyQualifyingResidue;
        // mass on the cysteine, methionine present elsewhere
        let r = record(20, "AMAAC", "24@15.995");
        assert!(mode.is_modified(&r, &oxidation(), &[]));
        assert!(!MatchMode::ExactPosition.is_modified(&r, &oxidation(), &[21]));

        // no qualifying residue at all
        let r = record(20, "AAAAC", "24@15.995");
        assert!(!mode.is_modified(&r, &oxidation(), &[]));

        let r = record(20, "AMAAC", "-");
        assert!(!mode.is_modified(&r, &oxidation(), &[21]));
    }

    #[test]
    fn carries() {
        let r = record(1, "MC", "1@15.995 2@57.022");
        let tol = Tolerance::default();
        assert!(carries_mass(r.modifications(), MassShift::from_da(57.022), tol));
        assert!(!carries_mass(r.modifications(), MassShift::from_da(-87.986), tol));
    }
}
