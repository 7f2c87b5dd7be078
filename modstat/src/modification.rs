//! Modification tags, mass shifts and the annotation string format
//!
//! Search engine exports annotate modifications as a space separated list of
//! `<position>@<mass shift>` tokens, e.g. `135@15.995 163@57.022`, or `-` for
//! an unmodified peptide. Positions use the numbering of the exported
//! peptide (its `Start`/`End` columns), not necessarily that of the reference
//! sequence. After normalization tokens may also carry the residue letter,
//! `M135@15.995`.
use super::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mass shift with a fixed precision of 3 decimal digits, stored as an
/// integer number of thousandths of a dalton.
///
/// Comparing masses as integers avoids the formatting dependent matching of
/// annotation strings (`"@15.995"` is not a substring of `"@15.9950"`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct MassShift(i32);

impl MassShift {
    pub const fn from_millis(millis: i32) -> MassShift {
        MassShift(millis)
    }

    pub fn from_da(da: f64) -> MassShift {
        MassShift((da * 1000.0).round() as i32)
    }

    pub fn millis(self) -> i32 {
        self.0
    }

    pub fn da(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl From<f64> for MassShift {
    fn from(da: f64) -> Self {
        MassShift::from_da(da)
    }
}

impl From<MassShift> for f64 {
    fn from(mass: MassShift) -> Self {
        mass.da()
    }
}

impl fmt::Display for MassShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:03}", sign, abs / 1000, abs % 1000)
    }
}

impl FromStr for MassShift {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<f64>() {
            Ok(da) if da.is_finite() && da.abs() < (i32::MAX / 1000) as f64 => {
                Ok(MassShift::from_da(da))
            }
            _ => Err(RecordError::MalformedModificationToken(s.into())),
        }
    }
}

/// Inclusive mass window used when comparing two [`MassShift`]s, in
/// thousandths of a dalton. The default is 0.001 Da.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Tolerance(i32);

impl Tolerance {
    pub fn from_da(da: f64) -> Tolerance {
        Tolerance((da.abs() * 1000.0).round() as i32)
    }

    #[inline]
    pub fn contains(self, center: MassShift, rhs: MassShift) -> bool {
        (center.0 as i64 - rhs.0 as i64).abs() <= self.0 as i64
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance(1)
    }
}

impl From<f64> for Tolerance {
    fn from(da: f64) -> Self {
        Tolerance::from_da(da)
    }
}

impl From<Tolerance> for f64 {
    fn from(tol: Tolerance) -> Self {
        tol.0 as f64 / 1000.0
    }
}

/// Which of the two annotation formats to emit when rendering tags
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMode {
    /// `C12@15.995`
    #[default]
    ResidueLetter,
    /// `12@15.995`
    Plain,
}

/// A residue position carrying a modification with the given mass shift
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModificationTag {
    // Field order defines the canonical (position, mass) sort order
    position: Position,
    mass: MassShift,
    residue: u8,
}

impl ModificationTag {
    pub fn new(position: Position, residue: u8, mass: MassShift) -> ModificationTag {
        ModificationTag {
            position,
            mass,
            residue: residue.to_ascii_uppercase(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn mass(&self) -> MassShift {
        self.mass
    }

    pub fn residue(&self) -> u8 {
        self.residue
    }

    pub fn render(&self, mode: LabelMode) -> String {
        match mode {
            LabelMode::ResidueLetter => {
                format!("{}{}@{}", self.residue as char, self.position, self.mass)
            }
            LabelMode::Plain => format!("{}@{}", self.position, self.mass),
        }
    }
}

/// A single annotation token before its residue has been resolved against
/// the peptide sequence
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Token {
    pub residue: Option<u8>,
    pub position: Position,
    pub mass: MassShift,
}

impl FromStr for Token {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || RecordError::MalformedModificationToken(s.into());
        let (site, mass) = s.split_once('@').ok_or_else(malformed)?;

        let (residue, digits) = match site.as_bytes().first() {
            Some(b) if b.is_ascii_alphabetic() => (Some(b.to_ascii_uppercase()), &site[1..]),
            _ => (None, site),
        };
        let position = digits.parse::<Position>().map_err(|_| malformed())?;
        let mass = mass.parse::<MassShift>().map_err(|_| malformed())?;

        Ok(Token {
            residue,
            position,
            mass,
        })
    }
}

/// Split an annotation string into tokens. `-` and blank cells hold no
/// tokens; both spaces and semicolons separate tokens.
pub(crate) fn tokens(annotation: &str) -> impl Iterator<Item = &str> {
    let annotation = match annotation.trim() {
        "-" => "",
        s => s,
    };
    annotation
        .split(|c: char| c == ';' || c.is_whitespace())
        .filter(|s| !s.is_empty())
}

/// The ordered set of modification tags on a peptide.
///
/// Tags are kept sorted by (position, mass) without duplicates, so two
/// annotations listing the same tags in a different order are equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifications(Vec<ModificationTag>);

impl Modifications {
    pub fn new(mut tags: Vec<ModificationTag>) -> Modifications {
        tags.sort_unstable();
        tags.dedup_by_key(|t| (t.position, t.mass));
        Modifications(tags)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModificationTag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as an annotation string; the empty set renders as `-`
    pub fn render(&self, mode: LabelMode) -> String {
        if self.0.is_empty() {
            return "-".into();
        }
        self.0
            .iter()
            .map(|t| t.render(mode))
            .collect::<Vec<String>>()
            .join(" ")
    }
}

impl FromIterator<ModificationTag> for Modifications {
    fn from_iter<I: IntoIterator<Item = ModificationTag>>(iter: I) -> Self {
        Modifications::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Modifications {
    type Item = &'a ModificationTag;
    type IntoIter = std::slice::Iter<'a, ModificationTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
