//! File operations for objcrack
//!
//! This crate reads multi-object OBJ files, splits them with `objcrack-core`
//! and writes one `<group>.obj` per object. It also discovers OBJ files under a
//! library root, cracks them on a bounded worker pool, and checks or cleans up
//! previously cracked libraries.

pub mod reader;
pub mod writer;
pub mod discovery;
pub mod parallel;
pub mod library;
pub mod error;

pub use error::*;
pub use reader::{read_source, is_obj_path};
pub use writer::{DirectoryWriter, OutputWriter, WriteOutcome};
pub use discovery::{discover, DiscoveryOptions};
pub use parallel::{run_batch, BatchConfig, BatchReport, CancellationToken, FailedFile, WorkerPool};
pub use library::{clean, verify, CleanReport, VerifyReport};

use objcrack_core::{ObjSplitter, SplitOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for cracking one file
#[derive(Debug, Clone, Default)]
pub struct CrackOptions {
    pub split: SplitOptions,
    /// Directory for outputs (None = beside the source file)
    pub output_dir: Option<PathBuf>,
    /// Split and validate, but write nothing
    pub dry_run: bool,
}

impl CrackOptions {
    /// Set split options
    pub fn with_split_options(mut self, split: SplitOptions) -> Self {
        self.split = split;
        self
    }

    /// Write outputs into `dir`
    pub fn with_output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Enable or disable dry runs
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The writer these options describe
    pub fn writer(&self) -> DirectoryWriter {
        match &self.output_dir {
            Some(dir) => DirectoryWriter::into_dir(dir),
            None => DirectoryWriter::beside_source(),
        }
    }
}

/// What cracking one file produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrackSummary {
    pub source: PathBuf,
    pub objects: usize,
    pub vertices: usize,
    /// Files written (or, for a dry run, that would be written)
    pub written: Vec<PathBuf>,
    /// Outputs identical to the source that were left alone
    pub unchanged: Vec<PathBuf>,
}

/// Read, split and write one OBJ file
pub fn crack_file<P: AsRef<Path>>(path: P, options: &CrackOptions) -> Result<CrackSummary> {
    crack_file_with(path.as_ref(), options, &options.writer())
}

/// Read, split and write one OBJ file through a custom writer
pub fn crack_file_with(path: &Path, options: &CrackOptions, writer: &dyn OutputWriter) -> Result<CrackSummary> {
    let document = read_source(path)?;
    let objects = ObjSplitter::new(options.split.clone())
        .split(&document)
        .map_err(|source| IoError::Split {
            path: path.to_path_buf(),
            source,
        })?;

    let outcome = if options.dry_run {
        let planned = objects
            .iter()
            .map(|object| writer.output_path(path, object))
            .collect::<Result<Vec<_>>>()?;
        WriteOutcome {
            written: planned,
            unchanged: Vec::new(),
        }
    } else {
        writer.write_objects(path, &objects)?
    };

    tracing::debug!(
        source = %path.display(),
        objects = objects.len(),
        written = outcome.written.len(),
        "cracked file"
    );

    Ok(CrackSummary {
        source: path.to_path_buf(),
        objects: objects.len(),
        vertices: objects.total_vertex_count(),
        written: outcome.written,
        unchanged: outcome.unchanged,
    })
}
