//! Retrieve reference protein sequences from local UniProtKB FASTA files
//!
//! # File format
//!
//! Standard FASTA, with UniProt style headers. The accession is taken from
//! the second `|` delimited field of the header line, or the first word of
//! the header if no `|` is present. Sequence lines are concatenated.
//!
//! ```text
//! $ cat calr.fasta
//! >sp|P27797|CALR_HUMAN Calreticulin OS=Homo sapiens OX=9606 GN=CALR
//! MLLSVPLLLGLLGLAVAEPAVYFKEQFLDGDGWTSRWIESKHKSDFGKFVLSSGKFYGDE
//! EKDKGLQTSQDARFYALSASFEPFSNKGQTLVVQFTVKHEQNIDCGGGYVKLFPNSLDQT
//! ...
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! # use uniprot::fasta::Fasta;
//! let db = Fasta::open("calr.fasta")?;
//! let calreticulin = db.get("P27797")?;
//! ```

use memchr::{memchr_iter, Memchr};

pub mod fasta;

/// Generalized wrapper around [`Memchr`] iterator for splitting `&[u8]` slices
/// by a byte.
///
/// Unlike `split`, a trailing delimiter does not produce a final empty slice.
struct Pitchfork<'a> {
    pos: usize,
    haystack: &'a [u8],
    inner: Memchr<'a>,
}

impl<'a> Pitchfork<'a> {
    pub fn new(needle: u8, haystack: &'a [u8]) -> Self {
        Self {
            pos: 0,
            haystack,
            inner: memchr_iter(needle, haystack),
        }
    }
}

impl<'a> Iterator for Pitchfork<'a> {
    type Item = &'a [u8];

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let end = match self.inner.next() {
            Some(e) => e,
            None => {
                if self.pos < self.haystack.len() {
                    self.haystack.len()
                } else {
                    return None;
                }
            }
        };
        let slice = &self.haystack[self.pos..end];
        self.pos = end + 1;
        Some(slice)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pitchfork() {
        let input = "Start\tEnd\tSequence\t\tSpectra";
        let mut pitch = Pitchfork::new(b'\t', input.as_bytes());
        assert_eq!(pitch.next().unwrap(), b"Start");
        assert_eq!(pitch.next().unwrap(), b"End");
        assert_eq!(pitch.next().unwrap(), b"Sequence");
        assert_eq!(pitch.next().unwrap(), b"");
        assert_eq!(pitch.next().unwrap(), b"Spectra");
        assert_eq!(pitch.next(), None);
    }

    #[test]
    fn pitchfork_trailing_delimiter() {
        let lines = Pitchfork::new(b'\n', b"a\nb\n").collect::<Vec<_>>();
        assert_eq!(lines, vec![&b"a"[..], &b"b"[..]]);
    }
}
