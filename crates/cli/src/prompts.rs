//! Prompt streams: loading, synthesizing and building repeated traces

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use semcache_core::{Error, Result, DEFAULT_NUMBER_OF_PROMPTS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// One entry of a trace file. Entries without a prompt are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// Load up to `limit` prompts (0 = all) from a JSON trace file.
///
/// When the file does not exist a synthetic stream with exact repeats is
/// returned instead so a run can proceed without a dataset.
pub fn load_prompts(path: &Path, limit: usize) -> Result<Vec<String>> {
    if !path.exists() {
        let count = if limit == 0 {
            DEFAULT_NUMBER_OF_PROMPTS
        } else {
            limit
        };
        warn!(path = %path.display(), count, "prompt file not found, using synthetic prompts");
        return Ok(synthetic_prompts(count));
    }

    let mut prompts = read_trace(path)?;
    if limit > 0 {
        prompts.truncate(limit);
    }
    info!(path = %path.display(), count = prompts.len(), "loaded prompts");
    Ok(prompts)
}

/// Every `prompt` field of a trace file, in order
pub fn read_trace(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path).map_err(|e| Error::file_system(path, "read", e))?;
    let text = String::from_utf8_lossy(&bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&*text);

    let entries: Vec<TraceEntry> = serde_json::from_str(text).map_err(|e| {
        Error::configuration(format!("invalid prompt file '{}': {e}", path.display()))
    })?;
    Ok(entries.into_iter().filter_map(|entry| entry.prompt).collect())
}

/// Deterministic stream over seven names. Generated prompts 9, 14, 19, ...
/// (zero-based) are each followed by an exact repeat of the prompt generated
/// six steps earlier.
pub fn synthetic_prompts(count: usize) -> Vec<String> {
    let prompt = |i: usize| format!("what did NAME_{} do to his sister", i % 7);

    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        out.push(prompt(i));
        if i % 5 == 4 && i >= 6 {
            out.push(prompt(i - 6));
        }
        if out.len() >= count {
            break;
        }
    }
    out.truncate(count);
    out
}

/// Shape of a repeated-prompt trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceSpec {
    pub n_unique: usize,
    pub repeats: usize,
    pub total: usize,
    pub seed: Option<u64>,
}

/// Take the first `n_unique` prompts, repeat each `repeats` times, shuffle,
/// and keep `total` of them.
pub fn build_trace(prompts: &[String], spec: &TraceSpec) -> Result<Vec<String>> {
    if prompts.len() < spec.n_unique {
        return Err(Error::Trace {
            message: format!(
                "only {} prompts found, but {} unique prompts were requested",
                prompts.len(),
                spec.n_unique
            ),
        });
    }

    let mut trace: Vec<String> = prompts[..spec.n_unique]
        .iter()
        .flat_map(|prompt| std::iter::repeat(prompt.clone()).take(spec.repeats))
        .collect();

    let mut rng = match spec.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    trace.shuffle(&mut rng);
    trace.truncate(spec.total);
    Ok(trace)
}

pub fn write_trace(path: &Path, prompts: &[String]) -> Result<()> {
    let entries: Vec<TraceEntry> = prompts
        .iter()
        .map(|prompt| TraceEntry {
            prompt: Some(prompt.clone()),
        })
        .collect();
    let json = serde_json::to_string_pretty(&entries)?;
    std::fs::write(path, json).map_err(|e| Error::file_system(path, "write", e))?;
    Ok(())
}
