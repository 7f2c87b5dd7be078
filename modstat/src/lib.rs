//! Modification statistics for peptide identification lists.
//!
//! This library's API is based around a small pipeline. Peptide lists, one
//! per experimental condition, are read as [`RawPeptideRecord`]s, cleaned up
//! into validated [`PeptideRecord`]s, and then aggregated into the fraction
//! of spectra carrying a given mass shift on a given set of residues.
//!
//! ```rust
//! # use modstat::*;
//! # use indexmap::IndexMap;
//! let raw = RawPeptideRecord {
//!     start: 19,
//!     end: 21,
//!     sequence: "AMA".into(),
//!     modification: "20@15.995".into(),
//!     spectra: 5,
//! };
//! let mut conditions = IndexMap::new();
//! conditions.insert("Nat_Crt_0".to_string(), vec![raw]);
//!
//! let mut analysis = Analysis::new(Settings::default());
//! let normalized = analysis.normalize(&conditions).unwrap();
//! let reference = "AAAAMAAAAAAAAAAAAAAMAAAAMAAAAA";
//! let stats = analysis.aggregate_by_condition(
//!     &normalized,
//!     "M",
//!     MassShift::from_da(15.995),
//!     Some(reference),
//! );
//! assert_eq!(stats["Nat_Crt_0"].percentage, 100.0);
//! ```
//!
//! Per-position tables ([`Analysis::aggregate_by_position`]) from several
//! batches can be joined with [`combine_batches`].

use indexmap::IndexMap;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

mod aggregation;
mod batch;
pub mod config;
mod error;
mod hits;
pub mod io;
mod locator;
mod modification;
mod normalize;
mod peptide;
mod position;
mod residue;
mod sequence;
pub mod stats;

pub use aggregation::{aggregate_by_condition, condition_statistics, select_conditions, ConditionStatistics};
pub use batch::{combine_batches, CombinedRow, CombinedTable};
pub use config::{ModificationKind, ModificationTable, Settings};
pub use error::{Error, RecordError};
pub use hits::{hit_statistics, HitStatistics};
pub use locator::{carries_mass, is_modified_at, MatchMode, Target};
pub use modification::{LabelMode, MassShift, ModificationTag, Modifications, Tolerance};
pub use normalize::{is_deamidation_site, merge, normalize, normalize_condition};
pub use peptide::{PeptideRecord, RawPeptideRecord};
pub use position::aggregate_by_position;
pub use residue::{describe_residues, residue_name};
pub use sequence::{find_residue_positions, ReferencePosition, ResidueSet, SequenceIndex};

/// 1-based residue number, in either peptide-source or reference numbering
pub type Position = u32;

/// A single analysis run: the engine settings plus the residue position
/// cache shared by every aggregation in the run
#[derive(Debug, Default)]
pub struct Analysis {
    index: SequenceIndex,
    settings: Settings,
}

impl Analysis {
    pub fn new(settings: Settings) -> Analysis {
        Analysis {
            index: SequenceIndex::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn target(&self, residues: &str, mass: MassShift) -> Target {
        Target::new(residues, mass, self.settings.tolerance)
    }

    /// Normalize and merge every condition, in parallel. Any bad record
    /// aborts the whole run; when several conditions fail, the error from
    /// the first of them in input order is reported.
    pub fn normalize(
        &self,
        conditions: &IndexMap<String, Vec<RawPeptideRecord>>,
    ) -> Result<IndexMap<String, Vec<PeptideRecord>>, Error> {
        conditions
            .iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(name, raw)| {
                let records = normalize_condition(name, raw)?;
                let before = records.len();
                let merged = merge(records);
                log::debug!("{}: merged {} rows into {}", name, before, merged.len());
                Ok((name.clone(), merged))
            })
            .collect::<Vec<Result<_, Error>>>()
            .into_iter()
            .collect()
    }

    /// Qualifying residue positions in a reference sequence, cached
    pub fn reference_positions(&mut self, sequence: &str, residues: &str) -> Arc<[ReferencePosition]> {
        self.index.positions(sequence, residues)
    }

    /// Modified/total spectra for every condition. Without a reference
    /// sequence, peptides are only checked against their own sequence.
    pub fn aggregate_by_condition(
        &mut self,
        conditions: &IndexMap<String, Vec<PeptideRecord>>,
        residues: &str,
        mass: MassShift,
        reference: Option<&str>,
    ) -> IndexMap<String, ConditionStatistics> {
        let target = self.target(residues, mass);
        let positions = reference.map(|seq| self.index.positions(seq, residues));
        aggregation::aggregate_by_condition(conditions, &target, positions.as_deref(), &self.settings)
    }

    /// Modified/total spectra at every qualifying position of `reference`
    /// that carries the modification in `records`
    pub fn aggregate_by_position(
        &mut self,
        records: &[PeptideRecord],
        reference: &str,
        residues: &str,
        mass: MassShift,
    ) -> Vec<ConditionStatistics> {
        let target = self.target(residues, mass);
        let positions = self.index.positions(reference, residues);
        position::aggregate_by_position(records, &positions, &target, self.settings.position_offset)
    }

    pub fn hits_by_condition(
        &self,
        conditions: &IndexMap<String, Vec<RawPeptideRecord>>,
    ) -> IndexMap<String, HitStatistics> {
        conditions
            .iter()
            .map(|(name, raw)| (name.clone(), hit_statistics(raw)))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn raw(start: Position, seq: &str, modification: &str, spectra: u64) -> RawPeptideRecord {
        RawPeptideRecord {
            start,
            end: start + seq.len() as Position - 1,
            sequence: seq.into(),
            modification: modification.into(),
            spectra,
        }
    }

    const REFERENCE: &str = "AAAAMAAAAAAAAAAAAAAMAAAAMAAAAA";

    #[test]
    fn pipeline() {
        let mut conditions = IndexMap::new();
        conditions.insert(
            "Nat_Crt_0".to_string(),
            vec![
                raw(19, "AMA", "20@15.995", 2),
                raw(19, "AMA", "20@15.995", 3),
                raw(19, "AMQ", "21@0.984", 3),
                raw(24, "AMA", "-", 2),
            ],
        );
        conditions.insert("Nat_Crt_1".to_string(), vec![]);

        let mut analysis = Analysis::new(Settings::default());
        let normalized = analysis.normalize(&conditions).unwrap();
        assert_eq!(normalized["Nat_Crt_0"].len(), 3);
        assert_eq!(normalized["Nat_Crt_0"][0].spectral_count(), 5);

        let stats = analysis.aggregate_by_condition(
            &normalized,
            "M",
            MassShift::from_da(15.995),
            Some(REFERENCE),
        );
        assert_eq!(stats["Nat_Crt_0"], ConditionStatistics::new("Nat_Crt_0", 5, 10));
        assert_eq!(stats["Nat_Crt_0"].percentage, 50.0);
        assert_eq!(stats["Nat_Crt_1"], ConditionStatistics::new("Nat_Crt_1", 0, 0));

        // second lookup of the same residues hits the cache
        analysis.aggregate_by_condition(&normalized, "m", MassShift::from_da(15.995), Some(REFERENCE));
        assert_eq!(analysis.index.len(), 1);

        let positions = analysis.aggregate_by_position(
            &normalized["Nat_Crt_0"],
            REFERENCE,
            "M",
            MassShift::from_da(15.995),
        );
        assert_eq!(positions, vec![ConditionStatistics::new("M37", 5, 8)]);

        let hits = analysis.hits_by_condition(&conditions);
        assert_eq!(hits["Nat_Crt_0"].total_hits, 10);
        assert_eq!(hits["Nat_Crt_0"].unique_hits, 4);
        assert_eq!(hits["Nat_Crt_0"].unique_sequences, 2);
    }

    #[test]
    fn bad_record_aborts() {
        let mut conditions = IndexMap::new();
        conditions.insert("ok".to_string(), vec![raw(1, "MA", "-", 1)]);
        conditions.insert(
            "broken".to_string(),
            vec![raw(1, "MA", "-", 1), raw(10, "ABCDEF", "20@15.995", 1)],
        );
        match Analysis::default().normalize(&conditions) {
            Err(Error::Record {
                condition,
                index,
                source,
            }) => {
                assert_eq!(condition, "broken");
                assert_eq!(index, 1);
                assert_eq!(
                    source,
                    RecordError::OutOfRangeModification {
                        position: 20,
                        start: 10,
                        end: 15
                    }
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn first_failing_condition_reported() {
        let mut conditions = IndexMap::new();
        for i in 0..16 {
            let rows = if i % 4 == 3 {
                vec![raw(10, "ABCDEF", "20@15.995", 1)]
            } else {
                vec![raw(1, "MA", "-", 1)]
            };
            conditions.insert(format!("c{:02}", i), rows);
        }
        for _ in 0..8 {
            match Analysis::default().normalize(&conditions) {
                Err(Error::Record { condition, .. }) => assert_eq!(condition, "c03"),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn merge_commutes() {
        let a = vec![raw(1, "MAC", "1@15.995", 2), raw(1, "MAC", "-", 1)];
        let b = vec![raw(1, "MAC", "-", 4), raw(1, "MAC", "1@15.995", 7)];

        let mut ab = IndexMap::new();
        ab.insert("x".to_string(), a.iter().chain(b.iter()).cloned().collect::<Vec<_>>());
        let mut ba = IndexMap::new();
        ba.insert("x".to_string(), b.iter().chain(a.iter()).cloned().collect::<Vec<_>>());

        let analysis = Analysis::default();
        let mut ab = analysis.normalize(&ab).unwrap().swap_remove("x").unwrap();
        let mut ba = analysis.normalize(&ba).unwrap().swap_remove("x").unwrap();
        let key = |r: &PeptideRecord| r.modifications().render(LabelMode::Plain);
        ab.sort_by_key(key);
        ba.sort_by_key(key);
        assert_eq!(ab, ba);
        assert_eq!(
            ab.iter().map(|r| r.spectral_count()).collect::<Vec<_>>(),
            vec![5, 9]
        );
    }

    #[test]
    fn tolerance_boundary() {
        let mut conditions = IndexMap::new();
        conditions.insert(
            "x".to_string(),
            vec![raw(1, "MA", "1@15.996", 1), raw(1, "MA", "1@15.997", 1)],
        );
        let mut analysis = Analysis::default();
        let normalized = analysis.normalize(&conditions).unwrap();
        let stats = analysis.aggregate_by_condition(&normalized, "M", MassShift::from_da(15.995), None);
        assert_eq!(stats["x"], ConditionStatistics::new("x", 1, 2));
    }
}
