//! CLI argument parsing for pdffuse.
//!
//! This module defines the command-line interface structure using `clap`.
//! Queue edits given with `--edit` are parsed into [`QueueEdit`] values and
//! replayed against the session in the order they were given.

use clap::Parser;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use pdffuse::config::{
    CompressionLevel, Config, DEFAULT_MIN_DOCUMENTS, DEFAULT_OUTPUT_NAME, Metadata, OverwriteMode,
};
use pdffuse::error::{PdfFuseError, Result};

/// Queue, reorder and fuse PDF documents into a single file.
///
/// Files are queued in the order given. Non-PDF files are ignored. The
/// queue can be rearranged with `--edit` before the merge runs.
#[derive(Parser, Debug)]
#[command(name = "pdffuse")]
#[command(version)]
#[command(about = "Queue, reorder and fuse PDF documents into a single file", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input files to queue (in order)
    ///
    /// Glob patterns are expanded; matches of one pattern are queued
    /// alphabetically.
    ///
    /// Examples:
    ///   pdffuse cover.pdf body.pdf -o report.pdf
    ///   pdffuse 'scans/*.pdf'
    #[arg(value_name = "FILE")]
    pub files: Vec<String>,

    /// Read additional input paths from a file (one path per line)
    ///
    /// Lines starting with '#' are comments. Paths from the list are
    /// queued after the positional files.
    #[arg(long, value_name = "FILE")]
    pub input_list: Option<PathBuf>,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT_NAME)]
    pub output: PathBuf,

    /// Edit the queue before merging (repeatable, applied in order)
    ///
    /// Positions are 1-based, as printed by --dry-run.
    ///   move:FROM:TO   move the document at FROM to TO
    ///   remove:POS     drop the document at POS
    #[arg(short, long = "edit", value_name = "OP")]
    pub edits: Vec<QueueEdit>,

    /// Dry run - show the merge plan without creating output
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - show per-document page ranges and timings
    #[arg(short, long)]
    pub verbose: bool,

    /// Force overwrite of existing output file without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print the merge report (or plan) as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Compression level for output PDF
    ///
    /// - none: No compression
    /// - standard: Compress content streams (default)
    /// - maximum: Also drop unreachable objects and renumber
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(env = "PDFFUSE_COMPRESSION")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Set title metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Set author metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Set subject metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Set keywords metadata for output PDF (comma-separated)
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    /// Minimum number of queued documents required to merge
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MIN_DOCUMENTS)]
    #[arg(env = "PDFFUSE_MIN_DOCUMENTS")]
    pub min_documents: usize,
}

/// A queue edit with 1-based positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueEdit {
    /// Move the document at `from` to `to`.
    Move {
        /// Current position.
        from: usize,
        /// Target position.
        to: usize,
    },
    /// Remove the document at `position`.
    Remove {
        /// Position to remove.
        position: usize,
    },
}

impl FromStr for QueueEdit {
    type Err = PdfFuseError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();

        match parts.as_slice() {
            ["move", from, to] => Ok(Self::Move {
                from: parse_position(from)?,
                to: parse_position(to)?,
            }),
            ["remove", position] => Ok(Self::Remove {
                position: parse_position(position)?,
            }),
            _ => Err(PdfFuseError::invalid_config(format!(
                "Invalid edit '{s}'. Expected move:FROM:TO or remove:POS"
            ))),
        }
    }
}

impl fmt::Display for QueueEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move { from, to } => write!(f, "move:{from}:{to}"),
            Self::Remove { position } => write!(f, "remove:{position}"),
        }
    }
}

fn parse_position(value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(position) if position >= 1 => Ok(position),
        _ => Err(PdfFuseError::invalid_config(format!(
            "Invalid position '{value}'. Positions start at 1"
        ))),
    }
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is invalid or the
    /// resulting configuration fails validation.
    pub fn to_config(&self) -> Result<Config> {
        let compression = CompressionLevel::from_str(&self.compression)?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let metadata = Metadata::new(
            self.title.clone(),
            self.author.clone(),
            self.subject.clone(),
            self.keywords.clone(),
        );

        let config = Config {
            output: self.output.clone(),
            min_documents: self.min_documents,
            dry_run: self.dry_run,
            verbose: self.verbose,
            quiet: self.quiet || self.json,
            overwrite_mode,
            compression,
            metadata,
        };

        config.validate().map_err(|e| {
            PdfFuseError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }

    /// Validate CLI arguments before processing.
    ///
    /// # Errors
    ///
    /// Returns an error if no inputs were given or the merge gate is zero.
    pub fn validate(&self) -> Result<()> {
        if self.files.is_empty() && self.input_list.is_none() {
            return Err(PdfFuseError::invalid_config("No input files specified"));
        }

        if self.min_documents == 0 {
            return Err(PdfFuseError::invalid_config(
                "Minimum document count must be at least 1",
            ));
        }

        if !["none", "standard", "maximum"].contains(&self.compression.as_str()) {
            return Err(PdfFuseError::invalid_config(format!(
                "Invalid compression level: {}",
                self.compression
            )));
        }

        Ok(())
    }

    /// Get all input paths: expanded positional patterns, then the
    /// entries of `--input-list`.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is invalid, the input list cannot be
    /// read, or nothing is left to queue.
    pub async fn get_all_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut all_inputs = pdffuse::utils::collect_paths_for_patterns(&self.files)?;

        if let Some(ref input_list_path) = self.input_list {
            all_inputs.extend(read_input_list(input_list_path).await?);
        }

        if all_inputs.is_empty() {
            return Err(PdfFuseError::NoFilesToMerge);
        }

        Ok(all_inputs)
    }
}

/// Read input paths from a file, one per line.
///
/// Empty lines and lines starting with '#' are skipped.
async fn read_input_list(path: &Path) -> Result<Vec<PathBuf>> {
    use tokio::fs::File;
    use tokio::io::{AsyncBufReadExt, BufReader};

    let read_error = |source| PdfFuseError::FailedToReadInputList {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).await.map_err(read_error)?;
    let mut lines = BufReader::new(file).lines();
    let mut paths = Vec::new();
    let mut line_number = 0;

    while let Some(line) = lines.next_line().await.map_err(read_error)? {
        line_number += 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.contains('\0') {
            return Err(PdfFuseError::InvalidInputList {
                path: path.to_path_buf(),
                line_number,
                details: "Path contains a NUL byte".to_string(),
            });
        }

        paths.push(PathBuf::from(line));
    }

    Ok(paths)
}
