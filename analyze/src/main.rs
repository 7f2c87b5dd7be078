use anyhow::Context;
use clap::{Arg, Command, ValueHint};
use indexmap::IndexMap;
use modstat::config::{Input, Run};
use modstat::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

fn create<P: AsRef<Path>>(path: P) -> anyhow::Result<fs::File> {
    fs::File::create(path.as_ref())
        .with_context(|| format!("failed to create {}", path.as_ref().display()))
}

/// File-system friendly version of a modification or batch name
fn slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}

fn write_normalized(
    dir: &Path,
    normalized: &IndexMap<String, Vec<PeptideRecord>>,
    mode: LabelMode,
) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    for (name, records) in normalized {
        let path = dir.join(format!("{}.tsv", name));
        io::write_peptide_list(create(&path)?, records, mode)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    log::info!("wrote {} normalized lists to {}", normalized.len(), dir.display());
    Ok(())
}

fn run(params: &Run) -> anyhow::Result<()> {
    let start = Instant::now();
    let out = &params.output_directory;
    fs::create_dir_all(out).with_context(|| format!("failed to create {}", out.display()))?;

    let raw = io::scan_directory(&params.input_directory).with_context(|| {
        format!(
            "failed to read peptide lists from {}",
            params.input_directory.display()
        )
    })?;
    log::info!(
        "read {} conditions from {}",
        raw.len(),
        params.input_directory.display()
    );

    let mut analysis = Analysis::new(params.settings);
    let mut normalized = analysis.normalize(&raw)?;
    if let Some(order) = &params.conditions {
        normalized = select_conditions(normalized, order)?;
    }
    if let Some(dir) = &params.normalized_directory {
        write_normalized(dir, &normalized, params.settings.label_mode)?;
    }

    let reference = params.sequence.as_deref();
    for kind in &params.modifications {
        log::info!(
            "{} ({}) at {} Da",
            kind.name,
            describe_residues(&kind.residues)?,
            kind.mass
        );
        match params.modifications.label(kind.mass, params.settings.tolerance) {
            Some(first) if first != kind.name => log::warn!(
                "{} is within tolerance of {}, tags will count toward both",
                kind.name,
                first
            ),
            _ => {}
        }
        let stats =
            analysis.aggregate_by_condition(&normalized, &kind.residues, kind.mass, reference);
        let path = out.join(format!("{}_{}.tsv", slug(&kind.name), kind.residues));
        io::write_statistics(create(&path)?, "Condition", stats.values())
            .with_context(|| format!("failed to write {}", path.display()))?;

        let reference = match reference {
            Some(reference) => reference,
            None => continue,
        };

        let mut positions = IndexMap::new();
        if params.per_position || !params.batches.is_empty() {
            for (name, records) in &normalized {
                positions.insert(
                    name.as_str(),
                    analysis.aggregate_by_position(records, reference, &kind.residues, kind.mass),
                );
            }
        }

        if params.per_position {
            let dir = out.join(slug(&kind.name));
            fs::create_dir_all(&dir)?;
            for (name, table) in &positions {
                let path = dir.join(format!("{}.tsv", name));
                io::write_statistics(create(&path)?, "Position", table)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
        }

        if !params.batches.is_empty() {
            let mut batches = IndexMap::new();
            for (batch, condition) in &params.batches {
                let table = positions
                    .get(condition.as_str())
                    .ok_or_else(|| Error::UnknownCondition(condition.clone()))?;
                batches.insert(batch.clone(), table.clone());
            }
            let combined = combine_batches(&batches, params.min_batch_spectra, params.min_batches);
            let path = out.join(format!("{}_combined.tsv", slug(&kind.name)));
            io::write_combined(create(&path)?, &combined)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
    }
    if reference.is_none() && (params.per_position || !params.batches.is_empty()) {
        log::warn!("per-position and batch tables need a reference sequence, skipped");
    }

    let included = raw
        .into_iter()
        .filter(|(name, _)| !params.excluded(name))
        .collect::<IndexMap<_, _>>();
    let hits = analysis.hits_by_condition(&included);
    io::write_hits(create(out.join("hits.tsv"))?, &hits)?;

    let path = out.join("run.json");
    serde_json::to_writer_pretty(create(&path)?, params)?;

    log::info!(
        "finished in {:.2}s, results in {}",
        start.elapsed().as_secs_f32(),
        out.display()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::default()
        .filter_level(log::LevelFilter::Error)
        .parse_env(
            env_logger::Env::default().filter_or("MODSTAT_LOG", "error,modstat=info,analyze=info"),
        )
        .init();

    let matches = Command::new("analyze")
        .version(clap::crate_version!())
        .about("Per-condition modification statistics for peptide identification lists")
        .arg(
            Arg::new("parameters")
                .required(true)
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help("Path to run parameters (JSON file)")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("output_directory")
                .short('o')
                .long("output_directory")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path where result tables will be written. \
                     Overrides the directory specified in the configuration file.",
                )
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("per-position")
                .long("per-position")
                .action(clap::ArgAction::SetTrue)
                .help("Also write per-position tables for every condition"),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             {all-args}{after-help}",
        )
        .get_matches();

    let path = matches
        .get_one::<String>("parameters")
        .context("missing parameters file")?;
    let mut input =
        Input::load(path).with_context(|| format!("failed to read parameters from `{}`", path))?;

    if let Some(dir) = matches.get_one::<String>("output_directory") {
        input.output_directory = Some(PathBuf::from(dir));
    }
    if matches.get_flag("per-position") {
        input.per_position = Some(true);
    }

    let parameters = input.build()?;
    run(&parameters)
}
