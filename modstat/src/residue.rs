//! Amino acid names for one-letter residue codes
use super::*;

const NAMES: [(u8, &str); 20] = [
    (b'A', "Alanine"),
    (b'C', "Cysteine"),
    (b'D', "Aspartic acid"),
    (b'E', "Glutamic acid"),
    (b'F', "Phenylalanine"),
    (b'G', "Glycine"),
    (b'H', "Histidine"),
    (b'I', "Isoleucine"),
    (b'K', "Lysine"),
    (b'L', "Leucine"),
    (b'M', "Methionine"),
    (b'N', "Asparagine"),
    (b'P', "Proline"),
    (b'Q', "Glutamine"),
    (b'R', "Arginine"),
    (b'S', "Serine"),
    (b'T', "Threonine"),
    (b'V', "Valine"),
    (b'W', "Tryptophan"),
    (b'Y', "Tyrosine"),
];

/// Look up the amino acid name for a one-letter code, case-insensitive
pub fn residue_name(letter: char) -> Result<&'static str, RecordError> {
    if !letter.is_ascii() {
        return Err(RecordError::UnknownResidueLetter(letter));
    }
    let upper = letter.to_ascii_uppercase() as u8;
    NAMES
        .iter()
        .find(|(code, _)| *code == upper)
        .map(|(_, name)| *name)
        .ok_or(RecordError::UnknownResidueLetter(letter))
}

/// Human readable description of a residue set, e.g. "MPH" becomes
/// "Methionine and Proline and Histidine"
pub fn describe_residues(residues: &str) -> Result<String, RecordError> {
    let names = residues
        .chars()
        .map(residue_name)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names.join(" and "))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(residue_name('M'), Ok("Methionine"));
        assert_eq!(residue_name('c'), Ok("Cysteine"));
        assert_eq!(
            residue_name('B'),
            Err(RecordError::UnknownResidueLetter('B'))
        );
        assert_eq!(
            residue_name('µ'),
            Err(RecordError::UnknownResidueLetter('µ'))
        );
    }

    #[test]
    fn describe() {
        assert_eq!(
            describe_residues("MPH").unwrap(),
            "Methionine and Proline and Histidine"
        );
        assert_eq!(
            describe_residues("CX"),
            Err(RecordError::UnknownResidueLetter('X'))
        );
    }
}
