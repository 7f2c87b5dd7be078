//! Reading peptide lists and writing result tables
//!
//! Peptide lists are delimited text with a header row. Both the column names
//! of combined lists (`Start`, `End`, `Sequence`, `Modification`, `Spectra`)
//! and those of raw search engine exports (`from`, `to`, `seq`, `modifs`,
//! `#`) are recognized. Raw exports with a `V` column are restricted to the
//! rows marked `Y`.
use super::*;
use std::fs;
use std::io::prelude::*;

const START: [&str; 2] = ["Start", "from"];
const END: [&str; 2] = ["End", "to"];
const SEQUENCE: [&str; 2] = ["Sequence", "seq"];
const MODIFICATION: [&str; 2] = ["Modification", "modifs"];
const SPECTRA: [&str; 2] = ["Spectra", "#"];
const VALIDATED: &str = "V";

const EXTENSIONS: [&str; 3] = ["tsv", "txt", "csv"];

/// Column indices for the fields we need
struct Columns {
    start: usize,
    end: usize,
    sequence: usize,
    modification: usize,
    spectra: usize,
    validated: Option<usize>,
}

impl Columns {
    fn from_header(header: &[&str], path: &str) -> Result<Columns, Error> {
        let find = |names: &[&'static str]| {
            header
                .iter()
                .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
                .ok_or(Error::MissingColumn {
                    path: path.into(),
                    column: names[0],
                })
        };
        Ok(Columns {
            start: find(&START)?,
            end: find(&END)?,
            sequence: find(&SEQUENCE)?,
            modification: find(&MODIFICATION)?,
            spectra: find(&SPECTRA)?,
            validated: header.iter().position(|h| *h == VALIDATED),
        })
    }
}

/// Field delimiter implied by a file extension: `.csv` is comma separated,
/// everything else tab separated
pub fn delimiter_for<P: AsRef<Path>>(path: P) -> u8 {
    match path.as_ref().extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
        _ => b'\t',
    }
}

/// The condition a peptide list belongs to: its file stem
pub fn condition_name<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .map(String::from)
}

fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    column: &'static str,
    line: usize,
    path: &str,
) -> Result<&'r str, Error> {
    record.get(idx).ok_or_else(|| Error::InvalidField {
        path: path.into(),
        line,
        column,
        value: String::new(),
    })
}

fn number<T: std::str::FromStr>(
    value: &str,
    column: &'static str,
    line: usize,
    path: &str,
) -> Result<T, Error> {
    // Spreadsheet exports sometimes write integers as `12.0`
    let trimmed = value.strip_suffix(".0").unwrap_or(value);
    trimmed.parse::<T>().map_err(|_| Error::InvalidField {
        path: path.into(),
        line,
        column,
        value: value.into(),
    })
}

/// Parse a peptide list held in memory. `path` is only used for error
/// messages.
///
/// Rows are never dropped silently: a row that is too short, or that has an
/// unparseable number, is an error. The only rows skipped are blank ones and,
/// when a `V` column exists, rows not marked `Y`.
pub fn parse_peptide_list(
    buffer: &[u8],
    delimiter: u8,
    path: &str,
) -> Result<Vec<RawPeptideRecord>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(buffer);

    let header = reader.headers()?.clone();
    if header.iter().all(str::is_empty) {
        return Ok(Vec::new());
    }
    let cols = Columns::from_header(&header.iter().collect::<Vec<_>>(), path)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        let line = row
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or_default();

        if let Some(v) = cols.validated {
            match row.get(v) {
                Some("Y") => {}
                Some(_) => continue,
                None => {
                    return Err(Error::InvalidField {
                        path: path.into(),
                        line,
                        column: VALIDATED,
                        value: String::new(),
                    })
                }
            }
        }

        records.push(RawPeptideRecord {
            start: number(field(&row, cols.start, START[0], line, path)?, START[0], line, path)?,
            end: number(field(&row, cols.end, END[0], line, path)?, END[0], line, path)?,
            sequence: field(&row, cols.sequence, SEQUENCE[0], line, path)?.to_string(),
            modification: field(&row, cols.modification, MODIFICATION[0], line, path)?
                .to_string(),
            spectra: number(
                field(&row, cols.spectra, SPECTRA[0], line, path)?,
                SPECTRA[0],
                line,
                path,
            )?,
        });
    }
    Ok(records)
}

/// Read a peptide list from disk
pub fn read_peptide_list<P: AsRef<Path>>(path: P) -> Result<Vec<RawPeptideRecord>, Error> {
    let mut buffer = Vec::new();
    fs::File::open(path.as_ref())?.read_to_end(&mut buffer)?;
    parse_peptide_list(
        &buffer,
        delimiter_for(path.as_ref()),
        &path.as_ref().display().to_string(),
    )
}

/// Load every peptide list in `directory` in parallel, keyed by condition
/// name and sorted by it
pub fn scan_directory<P: AsRef<Path>>(
    directory: P,
) -> Result<IndexMap<String, Vec<RawPeptideRecord>>, Error> {
    let mut files = Vec::new();
    for entry in fs::read_dir(directory.as_ref())? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let listed = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
            .unwrap_or(false);
        if let (true, Some(name)) = (listed, condition_name(&path)) {
            files.push((name, path));
        }
    }
    files.sort();

    // first failing file by name wins, not by completion order
    files
        .into_par_iter()
        .map(|(name, path)| {
            let records = read_peptide_list(&path)?;
            log::debug!("{}: read {} peptides", path.display(), records.len());
            Ok((name, records))
        })
        .collect::<Vec<Result<_, Error>>>()
        .into_iter()
        .collect()
}

fn tsv<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer)
}

/// Write a normalized peptide list in the input column layout
pub fn write_peptide_list<W: Write>(
    writer: W,
    records: &[PeptideRecord],
    mode: LabelMode,
) -> Result<(), Error> {
    let mut w = tsv(writer);
    w.write_record(["Start", "End", "Sequence", "Modification", "Spectra"])?;
    for record in records {
        let raw = record.to_raw(mode);
        w.write_record(&[
            raw.start.to_string(),
            raw.end.to_string(),
            raw.sequence,
            raw.modification,
            raw.spectra.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Write condition (or position) statistics. `index` names the first
/// column, `Condition` or `Position`.
pub fn write_statistics<'a, W, I>(writer: W, index: &str, stats: I) -> Result<(), Error>
where
    W: Write,
    I: IntoIterator<Item = &'a ConditionStatistics>,
{
    let mut w = tsv(writer);
    w.write_record([index, "Percentage", "ModifiedSpectra", "TotalModSpectra"])?;
    for s in stats {
        w.write_record(&[
            s.name.clone(),
            format!("{:.2}", s.percentage),
            s.modified_spectra.to_string(),
            s.total_spectra.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_hits<W: Write>(
    writer: W,
    hits: &IndexMap<String, HitStatistics>,
) -> Result<(), Error> {
    let mut w = tsv(writer);
    w.write_record(["Condition", "TotalHits", "UniqueHits", "HitsOnlySeq"])?;
    for (name, h) in hits {
        w.write_record(&[
            name.clone(),
            h.total_hits.to_string(),
            h.unique_hits.to_string(),
            h.unique_sequences.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_combined<W: Write>(writer: W, table: &CombinedTable) -> Result<(), Error> {
    let mut w = tsv(writer);
    let mut header = vec!["Position".to_string()];
    header.extend(table.batches.iter().cloned());
    header.push("Average".into());
    w.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![row.label.clone()];
        record.extend(
            row.percentages
                .iter()
                .map(|p| p.map(|v| format!("{:.2}", v)).unwrap_or_default()),
        );
        record.push(format!("{:.3}", row.average));
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}
