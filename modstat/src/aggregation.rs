use super::*;
use serde::Serialize;
use crate::stats::{self, Tally};

/// Modified and total eligible spectra for one condition (or one residue
/// position, see [`aggregate_by_position`])
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ConditionStatistics {
    pub name: String,
    pub modified_spectra: u64,
    pub total_spectra: u64,
    /// Rounded to 2 places, 0 when `total_spectra == 0`
    pub percentage: f64,
}

impl ConditionStatistics {
    pub fn new<S: Into<String>>(name: S, modified_spectra: u64, total_spectra: u64) -> Self {
        debug_assert!(modified_spectra <= total_spectra);
        ConditionStatistics {
            name: name.into(),
            modified_spectra,
            total_spectra,
            percentage: stats::percentage(modified_spectra, total_spectra),
        }
    }

    pub(crate) fn from_tally<S: Into<String>>(name: S, tally: Tally) -> Self {
        ConditionStatistics::new(name, tally.modified, tally.total)
    }
}

/// Compute modification statistics for the records of a single condition.
///
/// With `reference` positions, a record is eligible when its span contains
/// one of them. Without, it is eligible when its own sequence contains one
/// of the target residues, and the qualifying positions are those residues
/// in the record's own numbering.
pub fn condition_statistics(
    name: &str,
    records: &[PeptideRecord],
    target: &Target,
    reference: Option<&[ReferencePosition]>,
    mode: MatchMode,
) -> ConditionStatistics {
    let mut tally = Tally::default();

    for record in records {
        let qualifying = match reference {
            Some(positions) => record
                .covered(positions)
                .iter()
                .map(|p| p.index)
                .collect::<Vec<Position>>(),
            None => record.local_positions(&target.residues),
        };
        if qualifying.is_empty() {
            continue;
        }
        tally.add(
            record.spectral_count(),
            mode.is_modified(record, target, &qualifying),
        );
    }

    if tally.total == 0 {
        log::warn!("{}: no spectra cover {} residues", name, target.residues);
    } else {
        log::debug!(
            "{}: {}/{} spectra modified at {}",
            name,
            tally.modified,
            tally.total,
            target.residues
        );
    }
    ConditionStatistics::from_tally(name, tally)
}

/// Aggregate every condition independently, in parallel.
///
/// Reference positions at or below `settings.signal_peptide` are never
/// counted. The output keeps the input's condition order, and contains an
/// entry for every condition even if nothing in it was eligible.
pub fn aggregate_by_condition(
    conditions: &IndexMap<String, Vec<PeptideRecord>>,
    target: &Target,
    reference: Option<&[ReferencePosition]>,
    settings: &Settings,
) -> IndexMap<String, ConditionStatistics> {
    let reference = reference.map(|positions| {
        positions
            .iter()
            .filter(|p| p.index > settings.signal_peptide)
            .copied()
            .collect::<Vec<ReferencePosition>>()
    });

    let computed = conditions
        .iter()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|(name, records)| {
            condition_statistics(
                name,
                records,
                target,
                reference.as_deref(),
                settings.match_mode,
            )
        })
        .collect::<Vec<ConditionStatistics>>();

    computed
        .into_iter()
        .map(|stats| (stats.name.clone(), stats))
        .collect()
}

/// Reorder (and restrict) a condition map to `order`. Naming a condition
/// that is not present is an error.
pub fn select_conditions<T>(
    mut map: IndexMap<String, T>,
    order: &[String],
) -> Result<IndexMap<String, T>, Error> {
    order
        .iter()
        .map(|name| {
            map.swap_remove(name)
                .map(|v| (name.clone(), v))
                .ok_or_else(|| Error::UnknownCondition(name.clone()))
        })
        .collect()
}
