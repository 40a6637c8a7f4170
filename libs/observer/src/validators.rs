//! Output validators.
//!
//! A validator decides whether the output currently on disk satisfies the
//! scenario. The observer only schedules when `validate` runs; it never
//! interprets the output itself. Validators must tolerate being called
//! several times per wait cycle.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ValidatorError;

/// Caller-supplied predicate over the agent's observable output.
pub trait OutputValidator {
    fn validate(&mut self) -> Result<bool, ValidatorError>;
}

/// Plain closures work as validators in tests and simple scenarios.
impl<F> OutputValidator for F
where
    F: FnMut() -> bool,
{
    fn validate(&mut self) -> Result<bool, ValidatorError> {
        Ok(self())
    }
}

/// Accepts when the output directory holds exactly one regular file with
/// the expected contents.
pub struct SingleFileOutputValidator {
    dir: PathBuf,
    expected: String,
}

impl SingleFileOutputValidator {
    pub fn new(dir: impl Into<PathBuf>, expected: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            expected: expected.into(),
        }
    }
}

impl OutputValidator for SingleFileOutputValidator {
    fn validate(&mut self) -> Result<bool, ValidatorError> {
        let files = regular_files(&self.dir)?;
        if files.len() != 1 {
            debug!(count = files.len(), "expected exactly one output file");
            return Ok(false);
        }
        let contents = fs::read_to_string(&files[0])?;
        Ok(contents == self.expected)
    }
}

/// Accepts while the output directory contains no regular files.
pub struct NoOutputValidator {
    dir: PathBuf,
}

impl NoOutputValidator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl OutputValidator for NoOutputValidator {
    fn validate(&mut self) -> Result<bool, ValidatorError> {
        Ok(regular_files(&self.dir)?.is_empty())
    }
}

/// Regular files directly under `dir`, sorted for stable iteration.
fn regular_files(dir: &Path) -> Result<Vec<PathBuf>, ValidatorError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
