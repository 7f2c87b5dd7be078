use super::Position;

/// Failures local to a single peptide record.
///
/// None of these are recoverable at the record level: skipping the record
/// would silently change the spectral count denominators.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum RecordError {
    #[error("modification at position {position} lies outside peptide span {start}-{end}")]
    OutOfRangeModification {
        position: Position,
        start: Position,
        end: Position,
    },
    #[error("malformed modification token `{0}`")]
    MalformedModificationToken(String),
    #[error("unknown residue letter `{0}`")]
    UnknownResidueLetter(char),
    #[error("peptide span {start}-{end} does not fit a sequence of length {length}")]
    InvalidSpan {
        start: Position,
        end: Position,
        length: usize,
    },
    #[error("peptide sequence `{0}` contains non-residue characters")]
    InvalidSequence(String),
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("condition {condition}, record {index}: {source}")]
    Record {
        condition: String,
        index: usize,
        #[source]
        source: RecordError,
    },
    #[error("{path}: missing column `{column}`")]
    MissingColumn { path: String, column: &'static str },
    #[error("{path}:{line}: invalid {column} value `{value}`")]
    InvalidField {
        path: String,
        line: usize,
        column: &'static str,
        value: String,
    },
    #[error("condition `{0}` is not present in the input")]
    UnknownCondition(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("reference sequence: {0}")]
    Reference(#[from] uniprot::fasta::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
