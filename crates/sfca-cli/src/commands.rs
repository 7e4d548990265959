//! Subcommand implementations
//!
//! Each returns `Ok(true)` on success, `Ok(false)` when it ran but found a
//! problem worth a non-zero exit.

use anyhow::{Context, Result};
use clap::ArgMatches;
use sfca_artifact::{Artifact, ArtifactKind, ContentHash, Table};
use sfca_pipeline::{derive_from_paths, ArtifactSet, ConsistencyChecker, PipelineConfig};
use sfca_store::{
    to_csv_string, ArtifactReader, ArtifactStore, FsArtifactStore, LoadError, SessionSnapshot,
};
use std::fmt::Write as _;
use std::path::PathBuf;

fn load_config(args: &ArgMatches) -> Result<PipelineConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = args.get_one::<PathBuf>("out") {
        config = config.with_artifacts_dir(dir);
    }
    Ok(config)
}

fn open_store(config: &PipelineConfig) -> Result<FsArtifactStore> {
    let dir = &config.paths.artifacts_dir;
    FsArtifactStore::open(dir).with_context(|| format!("opening artifact store {}", dir.display()))
}

pub(crate) fn derive(args: &ArgMatches) -> Result<bool> {
    let mut config = load_config(args)?;
    if let Some(raw) = args.get_one::<PathBuf>("raw") {
        config = config.with_raw(raw);
    }
    if let Some(forecast) = args.get_one::<PathBuf>("forecast") {
        config = config.with_forecast(forecast);
    }

    let report = derive_from_paths(&config).context("derivation failed")?;
    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if let Some(source) = report.time_source {
            println!("time source: {source}");
        }
        for published in &report.published {
            println!(
                "{:<32} {:>8} rows  {}",
                published.name,
                published.rows,
                published.hash.short()
            );
        }
        println!("raw rows dropped: {}", report.rows_dropped());
    }
    Ok(true)
}

fn view_line<K: ArtifactKind>(result: &Result<Artifact<K>, LoadError>) -> (String, bool) {
    match result {
        Ok(a) => (format!("{:<32} ok ({} rows)", K::NAME, a.len()), true),
        Err(LoadError::NotFound(_)) => (format!("{:<32} not published", K::NAME), true),
        Err(e) => (format!("{:<32} {e}", K::NAME), false),
    }
}

/// Render the check report; the flag is false if anything failed
pub(crate) fn check_report(snapshot: &SessionSnapshot) -> (String, bool) {
    let lines = [
        view_line(&snapshot.citywide),
        view_line(&snapshot.neighborhood_category),
        view_line(&snapshot.hourly),
        view_line(&snapshot.forecast),
    ];
    let mut out = String::new();
    let mut ok = true;
    for (line, line_ok) in lines {
        ok &= line_ok;
        let _ = writeln!(out, "{line}");
    }
    match ConsistencyChecker::new().check(&ArtifactSet::from_snapshot(snapshot)) {
        Ok(()) => {
            let _ = writeln!(out, "{:<32} ok", "consistency");
        }
        Err(e) => {
            ok = false;
            let _ = writeln!(out, "{:<32} {e}", "consistency");
        }
    }
    (out, ok)
}

pub(crate) fn check(args: &ArgMatches) -> Result<bool> {
    let config = load_config(args)?;
    let store = open_store(&config)?;
    let snapshot = SessionSnapshot::load(&ArtifactReader::new(&store), config.display);
    let (report, ok) = check_report(&snapshot);
    print!("{report}");
    Ok(ok)
}

/// Render schema, hash and the first `limit` rows of `name`
pub(crate) fn inspect_report<S: ArtifactStore>(store: &S, name: &str, limit: usize) -> Result<String> {
    let table = store
        .get(name)
        .with_context(|| format!("reading artifact '{name}'"))?;
    let head = Table::from_rows(
        table.columns(),
        table.rows().iter().take(limit).cloned().collect(),
    )?;

    let mut out = String::new();
    writeln!(out, "name:    {name}")?;
    writeln!(out, "columns: {}", table.column_names().join(", "))?;
    writeln!(out, "rows:    {}", table.len())?;
    writeln!(out, "hash:    {}", ContentHash::of_table(&table))?;
    writeln!(out)?;
    out.push_str(&to_csv_string(&head)?);
    if table.len() > limit {
        writeln!(out, "... {} more rows", table.len() - limit)?;
    }
    Ok(out)
}

pub(crate) fn inspect(args: &ArgMatches) -> Result<bool> {
    let config = load_config(args)?;
    let store = open_store(&config)?;
    let name = args
        .get_one::<String>("name")
        .context("artifact name is required")?;
    let limit = args.get_one::<usize>("limit").copied().unwrap_or(10);
    print!("{}", inspect_report(&store, name, limit)?);
    Ok(true)
}
