//! Clean up raw peptide lists: drop deamidation artifacts and merge
//! duplicate observations
use super::*;
use crate::modification::{tokens, Token};

/// The search engine reports deamidation-like mass shifts on glutamine and
/// glutamate that are not real modifications. Tags at these residues are
/// discarded during normalization.
#[inline]
pub fn is_deamidation_site(residue: u8) -> bool {
    matches!(residue.to_ascii_uppercase(), b'Q' | b'E')
}

/// Parse and validate a raw row, removing tags that sit on Q/E residues.
///
/// # Example
///
/// ```rust
/// # use modstat::*;
/// let raw = RawPeptideRecord {
///     start: 10,
///     end: 15,
///     sequence: "ABCDEF".into(),
///     modification: "12@15.995 14@0.984".into(),
///     spectra: 4,
/// };
/// let record = normalize(&raw).unwrap();
/// assert_eq!(record.modifications().render(LabelMode::ResidueLetter), "C12@15.995");
/// ```
pub fn normalize(raw: &RawPeptideRecord) -> Result<PeptideRecord, RecordError> {
    crate::peptide::check_span(raw.start, raw.end, &raw.sequence)?;
    let residues = raw.sequence.as_bytes();

    let mut tags = Vec::new();
    for token in tokens(&raw.modification) {
        let tok = token.parse::<Token>()?;
        if tok.position < raw.start || tok.position > raw.end {
            return Err(RecordError::OutOfRangeModification {
                position: tok.position,
                start: raw.start,
                end: raw.end,
            });
        }

        let residue = residues[(tok.position - raw.start) as usize].to_ascii_uppercase();
        match tok.residue {
            Some(letter) if letter != residue => {
                return Err(RecordError::MalformedModificationToken(token.into()))
            }
            _ => {}
        }

        if is_deamidation_site(residue) {
            continue;
        }
        tags.push(ModificationTag::new(tok.position, residue, tok.mass));
    }

    PeptideRecord::new(
        raw.start,
        raw.end,
        raw.sequence.as_str(),
        tags.into_iter().collect(),
        raw.spectra,
    )
}

/// Normalize every row of one condition. The first bad row aborts the
/// condition, reporting the condition name and row index.
pub fn normalize_condition(
    condition: &str,
    raws: &[RawPeptideRecord],
) -> Result<Vec<PeptideRecord>, Error> {
    raws.iter()
        .enumerate()
        .map(|(index, raw)| {
            normalize(raw).map_err(|source| Error::Record {
                condition: condition.into(),
                index,
                source,
            })
        })
        .collect()
}

/// Merge records sharing (sequence, modifications), summing their spectral
/// counts.
///
/// Groups are returned in order of first appearance and keep the span of
/// their first member. The totals do not depend on input order.
pub fn merge<I: IntoIterator<Item = PeptideRecord>>(records: I) -> Vec<PeptideRecord> {
    let mut merged: Vec<PeptideRecord> = Vec::new();
    let mut map: HashMap<(String, Modifications), usize> = HashMap::new();

    for record in records {
        match map.get(&record.key()) {
            Some(idx) => merged[*idx].absorb(&record),
            None => {
                map.insert(record.key(), merged.len());
                merged.push(record);
            }
        }
    }
    merged
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

    fn rendered(r: &PeptideRecord) -> String {
        r.modifications().render(LabelMode::ResidueLetter)
    }

    #[test]
    fn residue_letter_rewrite() {
        let r = normalize(&raw(10, "ABCDEF", "12@15.995", 1)).unwrap();
        assert_eq!(rendered(&r), "C12@15.995");
        assert_eq!(r.modifications().render(LabelMode::Plain), "12@15.995");
    }

    #[test]
    fn deamidation_removed() {
        // Q at 11, E at 14
        let r = normalize(&raw(10, "AQCDEF", "11@0.984", 1)).unwrap();
        assert_eq!(rendered(&r), "-");
        assert!(r.modifications().is_empty());

        let r = normalize(&raw(10, "AQCDEF", "11@0.984;14@0.984", 1)).unwrap();
        assert_eq!(rendered(&r), "-");

        let r = normalize(&raw(10, "AqCDEF", "11@0.984 12@57.022", 1)).unwrap();
        assert_eq!(rendered(&r), "C12@57.022");
    }

    #[test]
    fn unmodified() {
        let r = normalize(&raw(1, "PEPTIDE", "-", 7)).unwrap();
        assert!(r.modifications().is_empty());
        assert_eq!(r.spectral_count(), 7);
    }

    #[test]
    fn errors() {
        assert_eq!(
            normalize(&raw(10, "ABCDEF", "16@15.995", 1)),
            Err(RecordError::OutOfRangeModification {
                position: 16,
                start: 10,
                end: 15
            })
        );
        assert_eq!(
            normalize(&raw(10, "ABCDEF", "9@15.995", 1)),
            Err(RecordError::OutOfRangeModification {
                position: 9,
                start: 10,
                end: 15
            })
        );
        assert_eq!(
            normalize(&raw(10, "ABCDEF", "12:15.995", 1)),
            Err(RecordError::MalformedModificationToken("12:15.995".into()))
        );
        assert_eq!(
            normalize(&raw(10, "ABCDEF", "M12@15.995", 1)),
            Err(RecordError::MalformedModificationToken("M12@15.995".into()))
        );
        let mut bad = raw(10, "ABCDEF", "-", 1);
        bad.end = 20;
        assert!(matches!(
            normalize(&bad),
            Err(RecordError::InvalidSpan { .. })
        ));
    }

    #[test]
    fn letter_format_accepted() {
        let r = normalize(&raw(10, "ABCDEF", "C12@15.995", 1)).unwrap();
        assert_eq!(rendered(&r), "C12@15.995");
    }

    #[test]
    fn condition_context() {
        let rows = vec![raw(1, "MPH", "-", 1), raw(1, "MPH", "5@15.995", 1)];
        match normalize_condition("Nat_Crt_0", &rows) {
            Err(Error::Record {
                condition,
                index,
                source,
            }) => {
                assert_eq!(condition, "Nat_Crt_0");
                assert_eq!(index, 1);
                assert!(matches!(
                    source,
                    RecordError::OutOfRangeModification { position: 5, .. }
                ));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(normalize_condition("ok", &rows[..1]).unwrap().len(), 1);
    }

    #[test]
    fn merge_sums() {
        let a = normalize(&raw(10, "AQCDEF", "11@0.984", 5)).unwrap();
        let b = normalize(&raw(10, "AQCDEF", "-", 3)).unwrap();
        let c = normalize(&raw(10, "AQCDEF", "12@57.022", 2)).unwrap();

        let merged = merge(vec![a.clone(), b.clone(), c.clone()]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].spectral_count(), 8);
        assert_eq!(merged[1].spectral_count(), 2);

        let reversed = merge(vec![c, b, a]);
        assert_eq!(reversed.len(), 2);
        assert_eq!(reversed[0].spectral_count(), 2);
        assert_eq!(reversed[1].spectral_count(), 8);
    }

    #[test]
    fn merge_token_order() {
        let a = normalize(&raw(1, "MPHC", "1@15.995 4@57.022", 1)).unwrap();
        let b = normalize(&raw(1, "MPHC", "4@57.022;1@15.995", 2)).unwrap();
        let merged = merge(vec![a, b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].spectral_count(), 3);
    }
}
