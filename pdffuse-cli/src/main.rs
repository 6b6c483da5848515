//! pdffuse - Queue, reorder and fuse PDF documents into a single file.
//!
//! The binary is an input adapter: it turns command-line arguments into
//! session events and renders what comes back.

mod cli;

use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, QueueEdit};
use pdffuse::config::{Config, OverwriteMode};
use pdffuse::error::{PdfFuseError, Result};
use pdffuse::io::FileDelivery;
use pdffuse::output::{
    OutputFormatter, display_intake, display_merge_report, display_plan, display_queue,
};
use pdffuse::session::MergeSession;
use pdffuse::source::SourceFile;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Install the diagnostics subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<()> {
    cli.validate()?;

    let inputs = cli.get_all_inputs().await?;
    tracing::debug!(count = inputs.len(), "collected input paths");

    let mut config = cli.to_config()?;
    let formatter = OutputFormatter::from_config(&config);

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdffuse::NAME, pdffuse::VERSION));
    }

    let files = open_sources(&inputs).await?;

    if !config.dry_run {
        config.overwrite_mode =
            handle_output_overwrite(&config, &formatter, &mut std::io::stdin().lock())?;
    }

    let delivery = FileDelivery::from_config(&config);
    let mut session = MergeSession::new(config.clone(), delivery);

    let intake = session.on_files_added(files);
    display_intake(&formatter, &intake);
    apply_edits(&mut session, &cli.edits, &formatter)?;

    if formatter.should_print() {
        display_queue(&formatter, &session.snapshot());
    }

    if config.dry_run {
        let plan = session.plan().await?;
        if cli.json {
            print_json(&plan)?;
        } else {
            display_plan(&formatter, &plan);
            formatter.success("Dry run completed successfully");
        }
        return Ok(());
    }

    if !session.can_merge() {
        return Err(PdfFuseError::NotEnoughDocuments {
            required: config.min_documents,
            queued: session.snapshot().len(),
        });
    }

    formatter.info("Merging documents...");

    let report = session
        .on_merge_requested()
        .await?
        .ok_or_else(|| PdfFuseError::other("Merge request was not accepted"))?;

    if cli.json {
        print_json(&report)?;
    } else {
        display_merge_report(&formatter, &report);
    }

    Ok(())
}

/// Open every input path. Missing paths fail here, before anything is
/// queued.
async fn open_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(SourceFile::from_path(path).await?);
    }
    Ok(files)
}

/// Replay `--edit` operations against the session queue.
fn apply_edits(
    session: &mut MergeSession<FileDelivery>,
    edits: &[QueueEdit],
    formatter: &OutputFormatter,
) -> Result<()> {
    for edit in edits {
        match *edit {
            QueueEdit::Move { from, to } => {
                session.on_reorder(from - 1, Some(to - 1))?;
            }
            QueueEdit::Remove { position } => {
                let removed = session.on_remove(position - 1)?;
                formatter.debug(&format!("Removed {}", removed.name()));
            }
        }
        formatter.debug(&format!("Applied {edit}"));
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|err| PdfFuseError::other(format!("Failed to encode JSON: {err}")))?;
    println!("{json}");
    Ok(())
}

/// Decide how an existing output file is treated.
///
/// Returns the overwrite mode delivery should run with: a confirmed prompt
/// becomes [`OverwriteMode::Force`]. The answer to the prompt is read from
/// `input`.
fn handle_output_overwrite(
    config: &Config,
    formatter: &OutputFormatter,
    input: &mut impl BufRead,
) -> Result<OverwriteMode> {
    if !config.output.exists() {
        return Ok(config.overwrite_mode);
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(OverwriteMode::Force),
        OverwriteMode::NoClobber => Err(PdfFuseError::output_exists(config.output.clone())),
        OverwriteMode::Prompt => {
            if formatter.is_quiet() {
                return Err(PdfFuseError::output_exists(config.output.clone()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                config.output.display()
            ));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            input
                .read_line(&mut response)
                .map_err(|err| PdfFuseError::other(format!("Failed to read input: {err}")))?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(OverwriteMode::Force)
            } else {
                Err(PdfFuseError::Cancelled)
            }
        }
    }
}
