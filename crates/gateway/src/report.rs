//! CSV and JSON run reports

use crate::metrics::RunSummary;
use crate::runner::PolicyRunner;
use semcache_core::{Error, Result, CSV_HEADER};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Quote a field when it holds a comma, quote or line break
pub fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Write one runner's events followed by the hits/misses/evictions trailer
pub fn write_csv<W: Write>(mut out: W, runner: &PolicyRunner) -> std::io::Result<()> {
    writeln!(out, "{}", CSV_HEADER.join(","))?;

    for event in runner.events() {
        let ts = event.timestamp.timestamp_micros() as f64 / 1_000_000.0;
        writeln!(
            out,
            "{:.6},{},{},{:.3},{:.3},{:.3},{},{}",
            ts,
            csv_field(&event.prompt),
            u8::from(event.hit),
            event.lookup_ms,
            event.model_ms,
            event.e2e_ms,
            csv_field(event.path.as_str()),
            csv_field(runner.name()),
        )?;
    }

    writeln!(out)?;
    writeln!(out, "hits,{}", runner.hit_count())?;
    writeln!(out, "misses,{}", runner.miss_count())?;
    writeln!(out, "evictions,{}", runner.evictions())?;
    out.flush()
}

/// `results_<policy>.csv` inside `dir`
pub fn policy_csv_path(dir: &Path, runner: &PolicyRunner) -> PathBuf {
    dir.join(format!("results_{}.csv", runner.name()))
}

pub fn write_policy_csv(dir: &Path, runner: &PolicyRunner) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| Error::file_system(dir, "create", e))?;

    let path = policy_csv_path(dir, runner);
    let file = File::create(&path).map_err(|e| Error::file_system(&path, "create", e))?;
    write_csv(BufWriter::new(file), runner).map_err(|e| Error::file_system(&path, "write", e))?;

    info!(policy = %runner.name(), path = %path.display(), rows = runner.events().len(), "wrote report");
    Ok(path)
}

pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::file_system(parent, "create", e))?;
    }
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json).map_err(|e| Error::file_system(path, "write", e))?;
    info!(path = %path.display(), "wrote run summary");
    Ok(())
}
