use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use futures::stream::{FuturesUnordered, StreamExt};
use std::io::Write;
use std::path::Path;
use tokio::process::Command;

use super::checks::{check_series, Mismatch};
use super::dump::ReferenceDump;
use super::export::ReferenceInput;
use crate::regatta::Regatta;
use crate::scoring::Series;

pub const BOATS_FILE: &str = "boats.yaml";
pub const SERIES_FILE: &str = "series.yaml";
pub const DUMP_FILE: &str = "dumper.yaml";

/// External scorer invoked once per series, from inside that series' directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ReferenceCommand {
    fn default() -> Self {
        Self {
            program: "perl".to_string(),
            args: Vec::new(),
        }
    }
}

/// How one series fared against the reference scorer.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesOutcome {
    Passed,
    Mismatched(Vec<Mismatch>),
    /// Reference exited unsuccessfully (status is None when killed by a signal)
    ProcessFailed { status: Option<i32>, stderr: String },
    /// Reference succeeded but its dump is missing or unreadable
    MalformedOutput { message: String },
    /// Inputs could not be written or the reference could not be started
    SetupFailed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesCheck {
    pub series: String,
    pub outcome: SeriesOutcome,
}

impl SeriesCheck {
    pub fn passed(&self) -> bool {
        self.outcome == SeriesOutcome::Passed
    }
}

/// Write `contents` to `path` atomically.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;
    Ok(())
}

/// Recreate `dir` and fill it with the reference scorer's input files.
fn prepare_series_dir(dir: &Path, input: &ReferenceInput) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to clear {}", dir.display()))?;
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    write_atomic(&dir.join(BOATS_FILE), &input.boats_yaml()?)?;
    write_atomic(&dir.join(SERIES_FILE), &input.series_yaml()?)?;
    Ok(())
}

/// Run the reference scorer for one series and compare its dump with the
/// engine's standings. Failures are reported in the outcome, never raised.
pub async fn check_series_with_reference(
    regatta: &Regatta,
    series: &Series,
    base_dir: &Path,
    command: &ReferenceCommand,
) -> SeriesCheck {
    let outcome = run_reference(regatta, series, base_dir, command).await;
    SeriesCheck {
        series: series.name().to_string(),
        outcome,
    }
}

async fn run_reference(
    regatta: &Regatta,
    series: &Series,
    base_dir: &Path,
    command: &ReferenceCommand,
) -> SeriesOutcome {
    let dir = base_dir.join(series.name());
    let input = ReferenceInput::from_series(regatta, series);
    if let Err(e) = prepare_series_dir(&dir, &input) {
        return SeriesOutcome::SetupFailed {
            message: format!("{:#}", e),
        };
    }

    tracing::debug!(
        series = series.name(),
        program = %command.program,
        dir = %dir.display(),
        "Running reference scorer"
    );

    let output = match Command::new(&command.program)
        .args(&command.args)
        .current_dir(&dir)
        .output()
        .await
    {
        Ok(output) => output,
        Err(e) => {
            return SeriesOutcome::SetupFailed {
                message: format!("Failed to run {}: {}", command.program, e),
            }
        }
    };

    if !output.status.success() {
        return SeriesOutcome::ProcessFailed {
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
    }

    let dump_path = dir.join(DUMP_FILE);
    let content = match tokio::fs::read_to_string(&dump_path).await {
        Ok(content) => content,
        Err(e) => {
            return SeriesOutcome::MalformedOutput {
                message: format!("Failed to read {}: {}", dump_path.display(), e),
            }
        }
    };
    let dump = match ReferenceDump::parse(&content) {
        Ok(dump) => dump,
        Err(e) => {
            return SeriesOutcome::MalformedOutput {
                message: format!("{:#}", e),
            }
        }
    };

    let mismatches = check_series(series, &dump);
    tracing::debug!(
        series = series.name(),
        mismatches = mismatches.len(),
        "Compared reference dump"
    );
    if mismatches.is_empty() {
        SeriesOutcome::Passed
    } else {
        SeriesOutcome::Mismatched(mismatches)
    }
}

/// Check every series concurrently. Results come back in configuration order.
pub async fn run_all(
    regatta: &Regatta,
    base_dir: &Path,
    command: &ReferenceCommand,
) -> Vec<SeriesCheck> {
    let mut futures = FuturesUnordered::new();
    for (index, series) in regatta.series().iter().enumerate() {
        futures.push(async move {
            let check = check_series_with_reference(regatta, series, base_dir, command).await;
            (index, check)
        });
    }

    let mut checks = Vec::with_capacity(regatta.series().len());
    while let Some((index, check)) = futures.next().await {
        if check.passed() {
            tracing::info!(series = %check.series, "Series passed");
        } else {
            tracing::warn!(series = %check.series, "Series failed");
        }
        checks.push((index, check));
    }

    checks.sort_by_key(|(index, _)| *index);
    checks.into_iter().map(|(_, check)| check).collect()
}
