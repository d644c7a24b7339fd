//! objcrack: split multi-object OBJ exports into one OBJ per object

mod logging;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use objcrack_core::{GroupNamePolicy, SplitOptions};
use objcrack_io::{
    clean, crack_file, discover, run_batch, verify, BatchConfig, CancellationToken, CrackOptions,
    DiscoveryOptions,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "objcrack",
    about = "Split multi-object OBJ files into one OBJ per object",
    long_about = "Split multi-object OBJ files into one OBJ per object.\n\
                  \n\
                  Objects are found through `# o <name>` / `# object <name>` comments\n\
                  written by the exporter. Each object is written as `<group>.obj`\n\
                  with face indices renumbered to its own vertices.",
    version
)]
struct Cli {
    /// Show more detail (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct SplitArgs {
    /// Name objects after their first `g` line instead of the last
    #[arg(long)]
    first_group: bool,

    /// Do not reject face indices outside their object
    #[arg(long)]
    no_validate: bool,
}

impl SplitArgs {
    fn options(&self) -> SplitOptions {
        let policy = if self.first_group {
            GroupNamePolicy::First
        } else {
            GroupNamePolicy::Last
        };
        SplitOptions::default()
            .with_group_name_policy(policy)
            .with_index_validation(!self.no_validate)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crack individual OBJ files
    Crack {
        /// OBJ files to split
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write outputs here instead of beside each source
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Split and validate without writing
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        split: SplitArgs,
    },

    /// Crack every OBJ under a library root in parallel
    Batch {
        /// Library root directory
        root: PathBuf,

        /// Worker threads (default: available cores minus --reserve)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Cores to leave free when sizing the pool automatically
        #[arg(long, default_value_t = 1)]
        reserve: usize,

        /// Stop starting new files after the first failure
        #[arg(long)]
        fail_fast: bool,

        /// Also crack folders marked as manually fixed (*.bad)
        #[arg(long)]
        include_fixed: bool,

        /// Split and validate without writing
        #[arg(long)]
        dry_run: bool,

        /// Write a JSON report of the batch
        #[arg(long)]
        report: Option<PathBuf>,

        #[command(flatten)]
        split: SplitArgs,
    },

    /// Check that every OBJ under a root has its cracked outputs
    Verify {
        /// Library root directory
        root: PathBuf,

        /// Also check folders marked as manually fixed (*.bad)
        #[arg(long)]
        include_fixed: bool,

        #[command(flatten)]
        split: SplitArgs,
    },

    /// Remove cracked outputs under a root, keeping the sources
    Clean {
        /// Library root directory
        root: PathBuf,

        /// List what would be removed without removing it
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        split: SplitArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_tracing(logging::level_filter(cli.verbose, cli.quiet));

    match cli.command {
        Command::Crack {
            files,
            out_dir,
            dry_run,
            split,
        } => {
            let mut options = CrackOptions::default()
                .with_split_options(split.options())
                .with_dry_run(dry_run);
            if let Some(dir) = out_dir {
                options = options.with_output_dir(dir);
            }
            crack_command(&files, &options)
        }
        Command::Batch {
            root,
            jobs,
            reserve,
            fail_fast,
            include_fixed,
            dry_run,
            report,
            split,
        } => {
            let discovery = DiscoveryOptions::default().with_include_fixed(include_fixed);
            let options = CrackOptions::default()
                .with_split_options(split.options())
                .with_dry_run(dry_run);
            let mut config = BatchConfig::default()
                .with_reserve_threads(reserve)
                .with_fail_fast(fail_fast);
            if let Some(jobs) = jobs {
                config = config.with_threads(jobs);
            }
            batch_command(root, &discovery, &options, &config, report)
        }
        Command::Verify {
            root,
            include_fixed,
            split,
        } => {
            let discovery = DiscoveryOptions::default().with_include_fixed(include_fixed);
            let report = verify(&root, &discovery, &split.options())?;
            for missing in &report.missing {
                println!("{}", missing.source.display());
                for output in &missing.outputs {
                    println!("  missing {}", output.display());
                }
            }
            for broken in &report.broken {
                eprintln!("{}", broken.error);
            }
            println!(
                "Checked {} files: {} incomplete, {} broken",
                report.checked,
                report.missing.len(),
                report.broken.len()
            );
            if !report.is_ok() {
                bail!("library at {} is not fully cracked", root.display());
            }
            Ok(())
        }
        Command::Clean {
            root,
            dry_run,
            split,
        } => {
            let report = clean(&root, &DiscoveryOptions::default(), &split.options(), dry_run)?;
            for broken in &report.broken {
                eprintln!("{}", broken.error);
            }
            let verb = if dry_run { "Would remove" } else { "Removed" };
            println!("{} {} cracked files", verb, report.removed.len());
            Ok(())
        }
    }
}

fn crack_command(files: &[PathBuf], options: &CrackOptions) -> Result<()> {
    let mut failures = 0;
    for file in files {
        match crack_file(file, options) {
            Ok(summary) => {
                for path in &summary.written {
                    println!("{}", path.display());
                }
                for path in &summary.unchanged {
                    println!("{} (unchanged)", path.display());
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} files failed", failures, files.len());
    }
    Ok(())
}

fn batch_command(
    root: PathBuf,
    discovery: &DiscoveryOptions,
    options: &CrackOptions,
    config: &BatchConfig,
    report_path: Option<PathBuf>,
) -> Result<()> {
    let files = discover(&root, discovery)
        .with_context(|| format!("Failed to scan {}", root.display()))?;
    if files.is_empty() {
        bail!("No OBJ files found under {}", root.display());
    }
    tracing::info!("Found {} OBJ files under {}", files.len(), root.display());

    let report = run_batch(&files, options, config, &CancellationToken::new())?;

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    println!(
        "Cracked {} of {} files ({} failed, {} skipped)",
        report.succeeded.len(),
        report.total(),
        report.failed.len(),
        report.skipped.len()
    );

    if !report.is_success() {
        bail!("batch finished with failures");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_split_args_mapping() {
        let cli = Cli::parse_from(["objcrack", "crack", "a.obj", "--first-group", "--no-validate"]);
        match cli.command {
            Command::Crack { split, files, .. } => {
                assert_eq!(files, vec![PathBuf::from("a.obj")]);
                let options = split.options();
                assert_eq!(options.group_name_policy, GroupNamePolicy::First);
                assert!(!options.validate_indices);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_batch_defaults() {
        let cli = Cli::parse_from(["objcrack", "-vv", "batch", "lib"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Batch { reserve, jobs, fail_fast, .. } => {
                assert_eq!(reserve, 1);
                assert_eq!(jobs, None);
                assert!(!fail_fast);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
