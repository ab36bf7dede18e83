//! Guards the checked in rules file against falling behind the schema

use crate::errors::{AppError, Result};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DriftError {
    #[error("{} does not exist, run `rulegen generate` to create it", .path.display())]
    Missing { path: PathBuf },

    #[error("{} is out of date (first difference on line {line}), run `rulegen generate` and commit the result", .path.display())]
    OutOfDate { path: PathBuf, line: usize },
}

/// Compare the rules file at `path` byte for byte with the freshly compiled
/// rules
pub fn check(path: &Path, compiled: &str) -> Result<()> {
    let stored = match fs::read(path) {
        Ok(stored) => stored,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(DriftError::Missing {
                path: path.to_path_buf(),
            }
            .into())
        }
        Err(source) => {
            return Err(AppError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    match first_difference(compiled.as_bytes(), &stored) {
        None => Ok(()),
        Some(line) => Err(DriftError::OutOfDate {
            path: path.to_path_buf(),
            line,
        }
        .into()),
    }
}

/// 1-based line number of the first line that differs, `None` if the inputs
/// are identical
fn first_difference(expected: &[u8], actual: &[u8]) -> Option<usize> {
    if expected == actual {
        return None;
    }

    let mut expected = expected.split(|b| *b == b'\n');
    let mut actual = actual.split(|b| *b == b'\n');
    let mut line = 1;
    loop {
        match (expected.next(), actual.next()) {
            (Some(e), Some(a)) if e == a => line += 1,
            _ => return Some(line),
        }
    }
}
