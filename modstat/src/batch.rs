//! Combine per-position tables from several batches into a single table
use super::*;

/// One position across all batches. `percentages[i]` is `None` when the
/// position was not reported (or was filtered) in batch `i`.
#[derive(Clone, Debug, PartialEq)]
pub struct CombinedRow {
    pub label: String,
    pub percentages: Vec<Option<f64>>,
    /// Mean of the reported percentages, rounded to 3 places
    pub average: f64,
}

impl CombinedRow {
    /// Residue number parsed from the label, `M135` -> 135
    pub fn position(&self) -> Option<Position> {
        self.label
            .trim_start_matches(|c: char| c.is_ascii_alphabetic())
            .parse()
            .ok()
    }

    pub fn observed(&self) -> usize {
        self.percentages.iter().filter(|p| p.is_some()).count()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CombinedTable {
    pub batches: Vec<String>,
    pub rows: Vec<CombinedRow>,
}

/// Outer join per-position statistics from each batch on the position label.
///
/// Within a batch, positions with `total_spectra <= min_total` are ignored.
/// Rows reported in fewer than `min_batches` batches are dropped. Rows are
/// sorted by residue number.
pub fn combine_batches(
    batches: &IndexMap<String, Vec<ConditionStatistics>>,
    min_total: u64,
    min_batches: usize,
) -> CombinedTable {
    let n = batches.len();
    let mut table: IndexMap<&str, Vec<Option<f64>>> = IndexMap::new();

    for (idx, positions) in batches.values().enumerate() {
        for stats in positions.iter().filter(|s| s.total_spectra > min_total) {
            table
                .entry(stats.name.as_str())
                .or_insert_with(|| vec![None; n])[idx] = Some(stats.percentage);
        }
    }

    let mut rows = table
        .into_iter()
        .map(|(label, percentages)| {
            let present = percentages.iter().flatten().copied().collect::<Vec<f64>>();
            CombinedRow {
                label: label.into(),
                average: crate::stats::mean(&present)
                    .map(|m| crate::stats::round(m, 3))
                    .unwrap_or_default(),
                percentages,
            }
        })
        .filter(|row| row.observed() >= min_batches)
        .collect::<Vec<CombinedRow>>();

    rows.sort_by(|a, b| {
        a.position()
            .cmp(&b.position())
            .then_with(|| a.label.cmp(&b.label))
    });

    CombinedTable {
        batches: batches.keys().cloned().collect(),
        rows,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn combine() {
        let mut batches = IndexMap::new();
        batches.insert(
            "2.5".to_string(),
            vec![
                ConditionStatistics::new("M135", 1, 4),
                ConditionStatistics::new("H99", 2, 4),
                ConditionStatistics::new("P40", 1, 1),
            ],
        );
        batches.insert(
            "3.5".to_string(),
            vec![
                ConditionStatistics::new("M135", 1, 2),
                ConditionStatistics::new("P40", 1, 10),
            ],
        );
        batches.insert(
            "1903F".to_string(),
            vec![ConditionStatistics::new("H99", 1, 8)],
        );

        let table = combine_batches(&batches, 1, 2);
        assert_eq!(table.batches, vec!["2.5", "3.5", "1903F"]);

        // P40 is only kept in one batch (total of 1 in "2.5")
        let labels = table.rows.iter().map(|r| r.label.as_str()).collect::<Vec<_>>();
        assert_eq!(labels, vec!["H99", "M135"]);

        let h99 = &table.rows[0];
        assert_eq!(h99.percentages, vec![Some(50.0), None, Some(12.5)]);
        assert_eq!(h99.average, 31.25);
        assert_eq!(h99.position(), Some(99));

        let m135 = &table.rows[1];
        assert_eq!(m135.percentages, vec![Some(25.0), Some(50.0), None]);
        assert_eq!(m135.average, 37.5);
    }

    #[test]
    fn single_batch() {
        let mut batches = IndexMap::new();
        batches.insert("only".to_string(), vec![ConditionStatistics::new("C163", 1, 3)]);
        let table = combine_batches(&batches, 0, 1);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].average, 33.33);
        assert!(combine_batches(&batches, 0, 2).rows.is_empty());
    }
}
