//! Utilities for loading reference protein sequences
use crate::Pitchfork;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, prelude::*};
use std::path::Path;
use std::str;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("fasta file contains no sequences")]
    Empty,
    #[error("accession {0} not found in fasta file")]
    MissingAccession(String),
    #[error("fasta file is not valid UTF-8")]
    Utf8(#[from] str::Utf8Error),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fasta {
    pub map: HashMap<String, String>,
}

/// Pull the accession out of a header line, `>sp|P27797|CALR_HUMAN ...`
fn accession(header: &str) -> &str {
    let header = header.trim_start_matches('>');
    match header.split('|').nth(1) {
        Some(acc) => acc,
        None => header.split_whitespace().next().unwrap_or_default(),
    }
}

impl Fasta {
    /// Build a fasta database from a file on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Fasta, Error> {
        let mut buf = Vec::new();
        File::open(path)?.read_to_end(&mut buf)?;
        Fasta::parse(&buf)
    }

    /// Parse fasta records from memory. Decoy entries (headers containing
    /// `Reverse` or starting with `rev_`) are skipped, sequences are
    /// upper-cased.
    pub fn parse(buf: &[u8]) -> Result<Fasta, Error> {
        let mut map = HashMap::new();
        let mut acc: Option<String> = None;
        let mut s = String::new();

        for line in Pitchfork::new(b'\n', buf) {
            let line = str::from_utf8(line)?.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            if line.starts_with('>') {
                if let Some(prev) = acc.take() {
                    map.insert(prev, std::mem::take(&mut s));
                }
                s.clear();
                let id = accession(line);
                if !line.contains("Reverse") && !id.starts_with("rev_") {
                    acc = Some(id.to_string());
                }
            } else if acc.is_some() {
                s.push_str(&line.trim().to_ascii_uppercase());
            }
        }
        if let Some(prev) = acc {
            map.insert(prev, s);
        }

        if map.is_empty() {
            return Err(Error::Empty);
        }
        Ok(Fasta { map })
    }

    pub fn sequence(&self, acc: &str) -> Option<&str> {
        self.map.get(acc).map(|s| s.as_str())
    }

    /// Like [`Fasta::sequence`], but a missing accession is an error
    pub fn get(&self, acc: &str) -> Result<&str, Error> {
        self.sequence(acc)
            .ok_or_else(|| Error::MissingAccession(acc.into()))
    }
}
