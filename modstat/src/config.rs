//! Run configuration
//!
//! A JSON file is deserialized into [`Input`], where every field is
//! optional, and then resolved into a [`Run`] with defaults filled in and
//! the reference sequence loaded.
use super::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Parameters of the statistics engine itself
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub match_mode: MatchMode,
    pub label_mode: LabelMode,
    pub tolerance: Tolerance,
    /// Reference positions up to and including this one are never counted
    pub signal_peptide: Position,
    /// Added to reference positions when labelling per-position rows
    pub position_offset: Position,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            match_mode: MatchMode::default(),
            label_mode: LabelMode::default(),
            tolerance: Tolerance::default(),
            signal_peptide: 17,
            position_offset: 17,
        }
    }
}

/// A named mass shift on a set of residues, e.g. `Sulfinic` on `C`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModificationKind {
    pub name: String,
    pub residues: String,
    pub mass: MassShift,
}

impl ModificationKind {
    pub fn new(name: &str, residues: &str, mass: f64) -> ModificationKind {
        ModificationKind {
            name: name.into(),
            residues: residues.into(),
            mass: MassShift::from_da(mass),
        }
    }
}

/// The modifications quantified in a run, in output order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModificationTable(Vec<ModificationKind>);

impl ModificationTable {
    pub fn new(kinds: Vec<ModificationKind>) -> ModificationTable {
        ModificationTable(kinds)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModificationKind> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Name of the first entry with a mass within `tolerance` of `mass`
    pub fn label(&self, mass: MassShift, tolerance: Tolerance) -> Option<&str> {
        self.0
            .iter()
            .find(|kind| tolerance.contains(kind.mass, mass))
            .map(|kind| kind.name.as_str())
    }

    /// Every entry must name at least one standard residue
    pub fn validate(&self) -> Result<(), Error> {
        for kind in &self.0 {
            if kind.residues.is_empty() {
                return Err(Error::Config(format!(
                    "modification `{}` has no residues",
                    kind.name
                )));
            }
            describe_residues(&kind.residues).map_err(|e| {
                Error::Config(format!("modification `{}`: {}", kind.name, e))
            })?;
        }
        Ok(())
    }

    /// Methionine/proline/histidine oxidation
    pub fn oxidation() -> ModificationTable {
        ModificationTable(vec![ModificationKind::new("Oxidation", "MPH", 15.995)])
    }

    /// Cysteine modifications on an unalkylated sample
    pub fn cysteine() -> ModificationTable {
        ModificationTable(vec![
            ModificationKind::new("Oxidation", "MPH", 15.995),
            ModificationKind::new("Carbamidomethyl", "C", 57.022),
            ModificationKind::new("Dehydroalanine", "C", -33.988),
            ModificationKind::new("Cys_Oxidation", "C", 15.995),
            ModificationKind::new("Sulfinic", "C", 31.990),
            ModificationKind::new("SulfDiOx", "C", 63.962),
            ModificationKind::new("SulfOx", "C", 47.967),
            ModificationKind::new("Sulfonic", "C", 47.985),
            ModificationKind::new("SSulfonic", "C", 79.957),
            ModificationKind::new("SO3", "C", 91.957),
        ])
    }

    /// Cysteine modifications when searched with a fixed carbamidomethyl
    /// cysteine, so every mass is relative to +57.021
    pub fn cysteine_cbm() -> ModificationTable {
        ModificationTable(vec![
            ModificationKind::new("Oxidation", "MPH", 15.995),
            ModificationKind::new("Carbamidomethyl", "C", 57.022),
            ModificationKind::new("Dehydroalanine", "C", -87.986),
            ModificationKind::new("Cys_Oxidation", "C", -41.027),
            ModificationKind::new("Sulfinic", "C", -25.032),
            ModificationKind::new("SulfDiOx", "C", 6.940),
            ModificationKind::new("SulfOx", "C", -9.054),
            ModificationKind::new("Sulfonic", "C", -9.037),
            ModificationKind::new("SSulfonic", "C", 22.935),
            ModificationKind::new("SO3", "C", 34.935),
        ])
    }

    fn preset(name: &str) -> Option<ModificationTable> {
        match name {
            "oxidation" => Some(Self::oxidation()),
            "cysteine" => Some(Self::cysteine()),
            "cysteine_cbm" => Some(Self::cysteine_cbm()),
            _ => None,
        }
    }
}

impl<'a> IntoIterator for &'a ModificationTable {
    type Item = &'a ModificationKind;
    type IntoIter = std::slice::Iter<'a, ModificationKind>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Either an explicit list of modifications, or the name of a preset
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ModificationInput {
    Preset(String),
    Table(ModificationTable),
}

/// Where the reference protein sequence comes from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReferenceInput {
    Sequence { sequence: String },
    Fasta { fasta: PathBuf, accession: String },
}

impl ReferenceInput {
    pub fn resolve(&self) -> Result<String, Error> {
        match self {
            ReferenceInput::Sequence { sequence } => Ok(sequence.to_ascii_uppercase()),
            ReferenceInput::Fasta { fasta, accession } => {
                let db = uniprot::fasta::Fasta::open(fasta)?;
                Ok(db.get(accession)?.to_string())
            }
        }
    }
}

#[derive(Deserialize, Default)]
/// Run parameters deserialized from a JSON file
pub struct Input {
    reference: Option<ReferenceInput>,
    modifications: Option<ModificationInput>,
    match_mode: Option<MatchMode>,
    label_mode: Option<LabelMode>,
    tolerance: Option<Tolerance>,
    signal_peptide: Option<Position>,
    position_offset: Option<Position>,
    conditions: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    pub input_directory: Option<PathBuf>,
    pub output_directory: Option<PathBuf>,
    normalized_directory: Option<PathBuf>,
    pub per_position: Option<bool>,
    batches: Option<IndexMap<String, String>>,
    min_batch_spectra: Option<u64>,
    min_batches: Option<usize>,
}

#[derive(Serialize, Debug)]
/// Resolved run parameters, with defaults applied
pub struct Run {
    pub version: String,
    pub settings: Settings,
    pub reference: Option<ReferenceInput>,
    pub modifications: ModificationTable,
    pub conditions: Option<Vec<String>>,
    pub exclude: Vec<String>,
    pub input_directory: PathBuf,
    pub output_directory: PathBuf,
    pub normalized_directory: Option<PathBuf>,
    pub per_position: bool,
    pub batches: IndexMap<String, String>,
    pub min_batch_spectra: u64,
    pub min_batches: usize,

    #[serde(skip_serializing)]
    pub sequence: Option<String>,
}

impl Input {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Input, Error> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    pub fn from_json(json: &str) -> Result<Input, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn build(self) -> Result<Run, Error> {
        let defaults = Settings::default();
        let settings = Settings {
            match_mode: self.match_mode.unwrap_or(defaults.match_mode),
            label_mode: self.label_mode.unwrap_or(defaults.label_mode),
            tolerance: self.tolerance.unwrap_or(defaults.tolerance),
            signal_peptide: self.signal_peptide.unwrap_or(defaults.signal_peptide),
            position_offset: self.position_offset.unwrap_or(defaults.position_offset),
        };
        if f64::from(settings.tolerance) > 0.01 {
            log::warn!(
                "tolerance of {} Da is wider than the 3 decimal annotation precision warrants",
                f64::from(settings.tolerance)
            );
        }

        let modifications = match self.modifications {
            None => ModificationTable::oxidation(),
            Some(ModificationInput::Table(table)) => table,
            Some(ModificationInput::Preset(name)) => ModificationTable::preset(&name)
                .ok_or_else(|| Error::Config(format!("unknown modification preset `{}`", name)))?,
        };
        if modifications.is_empty() {
            return Err(Error::Config("no modifications given".into()));
        }
        modifications.validate()?;

        let input_directory = self
            .input_directory
            .ok_or_else(|| Error::Config("`input_directory` must be provided".into()))?;

        let sequence = match &self.reference {
            Some(reference) => {
                let sequence = reference.resolve()?;
                if sequence.is_empty() {
                    return Err(Error::Config("reference sequence is empty".into()));
                }
                Some(sequence)
            }
            None => {
                log::warn!("no reference sequence given, peptides are only checked against their own sequence");
                None
            }
        };

        let batches = self.batches.unwrap_or_default();
        let min_batches = self.min_batches.unwrap_or(2);
        if !batches.is_empty() && batches.len() < min_batches {
            log::warn!(
                "{} batches given, but rows need to appear in at least {}",
                batches.len(),
                min_batches
            );
        }

        Ok(Run {
            version: env!("CARGO_PKG_VERSION").into(),
            settings,
            reference: self.reference,
            modifications,
            conditions: self.conditions,
            exclude: self.exclude.unwrap_or_else(|| vec!["tryp".into()]),
            input_directory,
            output_directory: self.output_directory.unwrap_or_else(|| PathBuf::from(".")),
            normalized_directory: self.normalized_directory,
            per_position: self.per_position.unwrap_or(false),
            batches,
            min_batch_spectra: self.min_batch_spectra.unwrap_or(1),
            min_batches,
            sequence,
        })
    }
}

impl Run {
    /// True if hit statistics should skip this condition
    pub fn excluded(&self, condition: &str) -> bool {
        self.exclude.iter().any(|pat| condition.contains(pat.as_str()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let run = Input::from_json(r#"{ "input_directory": "lists" }"#)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(run.settings, Settings::default());
        assert_eq!(run.settings.signal_peptide, 17);
        assert_eq!(run.modifications, ModificationTable::oxidation());
        assert_eq!(run.output_directory, PathBuf::from("."));
        assert!(run.sequence.is_none());
        assert!(run.excluded("Nat_tryp_1"));
        assert!(!run.excluded("Nat_Crt_0"));
        assert_eq!(run.min_batches, 2);
    }

    #[test]
    fn full() {
        let json = r#"{
            "reference": { "sequence": "mkaacm" },
            "modifications": [
                { "name": "Sulfinic", "residues": "C", "mass": 31.99 },
                { "name": "Oxidation", "residues": "MPH", "mass": 15.995 }
            ],
            "match_mode": "any_qualifying_residue",
            "label_mode": "plain",
            "tolerance": 0.002,
            "signal_peptide": 0,
            "position_offset": 0,
            "exclude": [],
            "input_directory": "lists",
            "output_directory": "out",
            "per_position": true,
            "batches": { "2.5": "Nat_Crt_0", "3.5": "Nat_Crt_1" }
        }"#;
        let run = Input::from_json(json).unwrap().build().unwrap();
        assert_eq!(run.sequence.as_deref(), Some("MKAACM"));
        assert_eq!(run.settings.match_mode, MatchMode::AnyQualifyingResidue);
        assert_eq!(run.settings.label_mode, LabelMode::Plain);
        assert_eq!(run.settings.tolerance, Tolerance::from_da(0.002));
        assert_eq!(run.modifications.len(), 2);
        assert_eq!(
            run.modifications.iter().next().map(|m| m.mass),
            Some(MassShift::from_da(31.990))
        );
        assert!(!run.excluded("tryp"));
        assert!(run.per_position);
        assert_eq!(run.batches.keys().collect::<Vec<_>>(), vec!["2.5", "3.5"]);

        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["settings"]["match_mode"], "any_qualifying_residue");
        assert!(json.get("sequence").is_none());
    }

    #[test]
    fn presets() {
        let run = Input::from_json(r#"{ "input_directory": "x", "modifications": "cysteine_cbm" }"#)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(run.modifications.len(), 10);
        let tol = Tolerance::default();
        assert_eq!(run.modifications.label(MassShift::from_da(-87.986), tol), Some("Dehydroalanine"));
        assert_eq!(run.modifications.label(MassShift::from_da(-87.988), tol), None);

        // SulfOx and Sulfonic differ by 0.018 Da and must stay apart
        let cys = ModificationTable::cysteine();
        assert_eq!(cys.label(MassShift::from_da(47.967), tol), Some("SulfOx"));
        assert_eq!(cys.label(MassShift::from_da(47.985), tol), Some("Sulfonic"));

        assert!(Input::from_json(r#"{ "input_directory": "x", "modifications": "nope" }"#)
            .unwrap()
            .build()
            .is_err());
    }

    #[test]
    fn invalid() {
        assert!(matches!(Input::default().build(), Err(Error::Config(_))));

        let json = r#"{ "input_directory": "x", "modifications": [{ "name": "bad", "residues": "CX", "mass": 1.0 }] }"#;
        assert!(matches!(
            Input::from_json(json).unwrap().build(),
            Err(Error::Config(_))
        ));

        assert!(matches!(Input::from_json("{ not json"), Err(Error::Json(_))));
    }
}
