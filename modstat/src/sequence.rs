//! Residue position lookup in a reference protein sequence
use super::*;
use std::sync::Arc;

/// A set of one-letter residue codes, stored upper-cased, sorted and
/// de-duplicated so that "hpm" and "MPH" compare equal
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResidueSet {
    letters: Vec<u8>,
}

impl ResidueSet {
    pub fn new(residues: &str) -> ResidueSet {
        let mut letters = residues
            .bytes()
            .filter(u8::is_ascii_alphabetic)
            .map(|b| b.to_ascii_uppercase())
            .collect::<Vec<u8>>();
        letters.sort_unstable();
        letters.dedup();
        ResidueSet { letters }
    }

    #[inline]
    pub fn contains(&self, residue: u8) -> bool {
        self.letters
            .binary_search(&residue.to_ascii_uppercase())
            .is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// Does `sequence` contain at least one member of the set?
    pub fn in_sequence(&self, sequence: &str) -> bool {
        sequence.bytes().any(|b| self.contains(b))
    }

    /// Scan `sequence` once, returning every 1-based position that holds a
    /// member of the set
    pub fn scan(&self, sequence: &str) -> Vec<ReferencePosition> {
        sequence
            .bytes()
            .enumerate()
            .filter(|(_, b)| self.contains(*b))
            .map(|(idx, b)| ReferencePosition {
                index: idx as Position + 1,
                residue: b.to_ascii_uppercase(),
            })
            .collect()
    }
}

impl std::fmt::Display for ResidueSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for &b in &self.letters {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

/// A qualifying residue in the reference sequence
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferencePosition {
    /// 1-based index into the reference sequence
    pub index: Position,
    /// Upper-case one-letter code
    pub residue: u8,
}

impl ReferencePosition {
    /// Externally meaningful label, e.g. `M135`, with the index shifted by
    /// `offset` residues
    pub fn label(&self, offset: Position) -> String {
        format!("{}{}", self.residue as char, self.index + offset)
    }
}

/// Return the 1-based positions of all `residues` in `sequence`, in
/// ascending order. Matching is case-insensitive.
///
/// ```rust
/// # use modstat::find_residue_positions;
/// let idx = find_residue_positions("ACAC", "C")
///     .iter()
///     .map(|p| p.index)
///     .collect::<Vec<_>>();
/// assert_eq!(idx, vec![2, 4]);
/// ```
pub fn find_residue_positions(sequence: &str, residues: &str) -> Vec<ReferencePosition> {
    ResidueSet::new(residues).scan(sequence)
}

/// Memoized [`find_residue_positions`], keyed by (sequence, residue set).
///
/// One index is built per run and shared by every aggregation in it.
#[derive(Default, Debug)]
pub struct SequenceIndex {
    cache: HashMap<(String, ResidueSet), Arc<[ReferencePosition]>>,
}

impl SequenceIndex {
    pub fn new() -> SequenceIndex {
        SequenceIndex::default()
    }

    pub fn positions(&mut self, sequence: &str, residues: &str) -> Arc<[ReferencePosition]> {
        let key = (sequence.to_ascii_uppercase(), ResidueSet::new(residues));
        self.cache
            .entry(key)
            .or_insert_with_key(|(seq, set)| {
                log::debug!("indexing {} positions in {} residues", set, seq.len());
                set.scan(seq).into()
            })
            .clone()
    }

    /// Number of distinct (sequence, residue set) pairs indexed so far
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
