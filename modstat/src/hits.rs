//! Identification counts for a peptide list, independent of any
//! modification
use super::*;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HitStatistics {
    /// Sum of spectral counts
    pub total_hits: u64,
    /// Number of peptide entries (rows)
    pub unique_hits: usize,
    /// Number of distinct peptide sequences, ignoring modifications
    pub unique_sequences: usize,
}

impl<'a> FromIterator<&'a RawPeptideRecord> for HitStatistics {
    fn from_iter<I: IntoIterator<Item = &'a RawPeptideRecord>>(iter: I) -> Self {
        let mut stats = HitStatistics::default();
        let mut sequences = HashSet::new();
        for record in iter {
            stats.total_hits += record.spectra;
            stats.unique_hits += 1;
            sequences.insert(record.sequence.to_ascii_uppercase());
        }
        stats.unique_sequences = sequences.len();
        stats
    }
}

pub fn hit_statistics(records: &[RawPeptideRecord]) -> HitStatistics {
    records.iter().collect()
}
