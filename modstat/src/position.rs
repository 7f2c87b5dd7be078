use super::*;
use crate::stats::Tally;

/// Modification statistics per qualifying residue position.
///
/// For every position, all records whose span covers it are eligible, and
/// those carrying a matching tag at exactly that position are modified.
/// Positions without any modified spectra are left out of the result.
/// Labels are the residue letter followed by the position shifted by
/// `offset`, e.g. `M135`.
pub fn aggregate_by_position(
    records: &[PeptideRecord],
    positions: &[ReferencePosition],
    target: &Target,
    offset: Position,
) -> Vec<ConditionStatistics> {
    positions
        .iter()
        .filter_map(|position| {
            let mut tally = Tally::default();
            for record in records.iter().filter(|r| r.covers(position.index)) {
                tally.add(
                    record.spectral_count(),
                    is_modified_at(
                        record.modifications(),
                        target.mass,
                        target.tolerance,
                        &[position.index],
                    ),
                );
            }
            if tally.modified == 0 {
                return None;
            }
            Some(ConditionStatistics::from_tally(position.label(offset), tally))
        })
        .collect()
}
