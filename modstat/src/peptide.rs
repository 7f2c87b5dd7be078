use super::*;

/// One row of a peptide list, exactly as exported by the search engine
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawPeptideRecord {
    pub start: Position,
    pub end: Position,
    pub sequence: String,
    /// `-` or a list of `<position>@<mass>` tokens
    pub modification: String,
    pub spectra: u64,
}

/// A validated peptide identification with normalized modification tags.
///
/// Two records describe the same peptide observation when they share the
/// sequence and the set of modifications; see [`merge`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeptideRecord {
    start: Position,
    end: Position,
    sequence: String,
    modifications: Modifications,
    spectral_count: u64,
}

/// Check that `[start, end]` is a 1-based span covering exactly `sequence`
pub(crate) fn check_span(start: Position, end: Position, sequence: &str) -> Result<(), RecordError> {
    if !sequence.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(RecordError::InvalidSequence(sequence.into()));
    }
    if start == 0 || end < start || (end - start) as usize + 1 != sequence.len() {
        return Err(RecordError::InvalidSpan {
            start,
            end,
            length: sequence.len(),
        });
    }
    Ok(())
}

impl PeptideRecord {
    /// Build a record, rejecting spans that do not match the sequence and
    /// tags that fall outside the span or disagree with the residue found
    /// at their position
    pub fn new<S: Into<String>>(
        start: Position,
        end: Position,
        sequence: S,
        modifications: Modifications,
        spectral_count: u64,
    ) -> Result<PeptideRecord, RecordError> {
        let sequence = sequence.into();
        check_span(start, end, &sequence)?;

        let record = PeptideRecord {
            start,
            end,
            sequence,
            modifications,
            spectral_count,
        };

        for tag in &record.modifications {
            match record.residue_at(tag.position()) {
                None => {
                    return Err(RecordError::OutOfRangeModification {
                        position: tag.position(),
                        start,
                        end,
                    })
                }
                Some(r) if r != tag.residue() => {
                    return Err(RecordError::MalformedModificationToken(
                        tag.render(LabelMode::ResidueLetter),
                    ))
                }
                _ => {}
            }
        }
        Ok(record)
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn modifications(&self) -> &Modifications {
        &self.modifications
    }

    pub fn spectral_count(&self) -> u64 {
        self.spectral_count
    }

    /// Does the peptide span include `position`?
    #[inline]
    pub fn covers(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    /// Upper-case residue at `position` (peptide numbering)
    pub fn residue_at(&self, position: Position) -> Option<u8> {
        if !self.covers(position) {
            return None;
        }
        self.sequence
            .as_bytes()
            .get((position - self.start) as usize)
            .map(u8::to_ascii_uppercase)
    }

    /// Return the sub-slice of `positions` (which must be sorted by index)
    /// that lies within the peptide span
    pub fn covered<'p>(&self, positions: &'p [ReferencePosition]) -> &'p [ReferencePosition] {
        let lo = positions.partition_point(|p| p.index < self.start);
        let hi = positions.partition_point(|p| p.index <= self.end);
        &positions[lo..hi.max(lo)]
    }

    /// Positions, in peptide numbering, of all residues in `residues`
    pub fn local_positions(&self, residues: &ResidueSet) -> Vec<Position> {
        residues
            .scan(&self.sequence)
            .into_iter()
            .map(|p| p.index - 1 + self.start)
            .collect()
    }

    /// The merge identity of the record
    pub(crate) fn key(&self) -> (String, Modifications) {
        (self.sequence.clone(), self.modifications.clone())
    }

    pub(crate) fn absorb(&mut self, other: &PeptideRecord) {
        self.spectral_count += other.spectral_count;
    }

    /// Convert back into an output row
    pub fn to_raw(&self, mode: LabelMode) -> RawPeptideRecord {
        RawPeptideRecord {
            start: self.start,
            end: self.end,
            sequence: self.sequence.clone(),
            modification: self.modifications.render(mode),
            spectra: self.spectral_count,
        }
    }
}
