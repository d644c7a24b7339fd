//! Maintenance of an already cracked library
//!
//! Both operations recompute each source's split in memory to learn which
//! output files it owns; nothing is read from a side index.

use crate::discovery::{discover, DiscoveryOptions};
use crate::error::{IoError, Result};
use crate::parallel::FailedFile;
use crate::reader::read_source;
use crate::writer::{DirectoryWriter, OutputWriter};
use objcrack_core::{ObjSplitter, SplitOptions};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Outputs a source should have produced but that are not on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingOutputs {
    pub source: PathBuf,
    pub outputs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    pub checked: usize,
    pub missing: Vec<MissingOutputs>,
    /// Sources that could not be read or split
    pub broken: Vec<FailedFile>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty() && self.broken.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanReport {
    /// Cracked outputs removed (or, for a dry run, that would be removed)
    pub removed: Vec<PathBuf>,
    /// Sources that could not be read or split; their outputs are unknown
    pub broken: Vec<FailedFile>,
}

/// Output paths the split of `source` maps to
fn planned_outputs(source: &Path, split: &SplitOptions) -> Result<Vec<PathBuf>> {
    let document = read_source(source)?;
    let objects = ObjSplitter::new(split.clone())
        .split(&document)
        .map_err(|e| IoError::Split {
            path: source.to_path_buf(),
            source: e,
        })?;
    let writer = DirectoryWriter::beside_source();
    objects
        .iter()
        .map(|object| writer.output_path(source, object))
        .collect()
}

fn plan_all(paths: &[PathBuf], split: &SplitOptions) -> Vec<(PathBuf, Result<Vec<PathBuf>>)> {
    paths
        .par_iter()
        .map(|path| (path.clone(), planned_outputs(path, split)))
        .collect()
}

/// Check that every discovered source has all of its cracked outputs
pub fn verify<P: AsRef<Path>>(root: P, discovery: &DiscoveryOptions, split: &SplitOptions) -> Result<VerifyReport> {
    let sources = discover(root, discovery)?;
    let mut report = VerifyReport {
        checked: sources.len(),
        ..Default::default()
    };

    for (source, planned) in plan_all(&sources, split) {
        match planned {
            Ok(outputs) => {
                let missing: Vec<PathBuf> = outputs.into_iter().filter(|path| !path.is_file()).collect();
                if !missing.is_empty() {
                    tracing::warn!(source = %source.display(), missing = missing.len(), "missing cracked outputs");
                    report.missing.push(MissingOutputs {
                        source,
                        outputs: missing,
                    });
                }
            }
            Err(e) => {
                tracing::warn!("{}", e);
                report.broken.push(FailedFile {
                    path: source,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

/// Remove the cracked outputs of every discovered source
///
/// A file is only removed when it is the output of another source and is not
/// itself a source whose split produces anything but itself. Folders marked as
/// manually fixed are never touched, whatever `discovery.include_fixed` says.
pub fn clean<P: AsRef<Path>>(
    root: P,
    discovery: &DiscoveryOptions,
    split: &SplitOptions,
    dry_run: bool,
) -> Result<CleanReport> {
    let discovery = discovery.clone().with_include_fixed(false);
    let sources = discover(root, &discovery)?;
    let mut report = CleanReport::default();

    let mut protected = BTreeSet::new();
    let mut candidates = BTreeSet::new();
    for (source, planned) in plan_all(&sources, split) {
        match planned {
            Ok(outputs) => {
                let only_itself = outputs.len() == 1 && outputs[0] == source;
                if !only_itself {
                    protected.insert(source.clone());
                }
                candidates.extend(outputs.into_iter().filter(|path| *path != source));
            }
            Err(e) => {
                protected.insert(source.clone());
                report.broken.push(FailedFile {
                    path: source,
                    error: e.to_string(),
                });
            }
        }
    }

    for path in candidates.difference(&protected) {
        if !path.is_file() {
            continue;
        }
        if dry_run {
            tracing::info!("Would remove: {}", path.display());
        } else {
            fs::remove_file(path).map_err(|e| IoError::write(path, e))?;
            tracing::info!("Removing: {}", path.display());
        }
        report.removed.push(path.clone());
    }

    Ok(report)
}
