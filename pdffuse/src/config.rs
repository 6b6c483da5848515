//! Configuration module for pdffuse.
//!
//! This module holds the validated, normalized configuration that drives a
//! merge session. It handles:
//! - Validation of option combinations
//! - Application of defaults
//! - Output naming for the delivery collaborator

use anyhow::{Result, bail};
use serde::Serialize;

use crate::PdfFuseError;
use std::{path::PathBuf, str::FromStr};

/// File name used when no output is configured.
pub const DEFAULT_OUTPUT_NAME: &str = "merged-document.pdf";

/// Minimum queue length before a merge may be requested.
pub const DEFAULT_MIN_DOCUMENTS: usize = 2;

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// No compression - preserves exact quality and structure.
    None,
    /// Balanced compression - good trade-off between size and processing time.
    #[default]
    Standard,
    /// Maximum compression - smallest file size, longer processing time.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PdfFuseError;

    /// Parse compression level from string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string doesn't match a valid compression level.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PdfFuseError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// PDF metadata to set on the output document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }

    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let to_string_opt = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: to_string_opt(title),
            author: to_string_opt(author),
            subject: to_string_opt(subject),
            keywords: to_string_opt(keywords),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Complete configuration for a merge session.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path the merged document is delivered to.
    pub output: PathBuf,

    /// Minimum number of queued documents before a merge is allowed.
    pub min_documents: usize,

    /// Dry run mode - plan the merge without creating output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Metadata to set on output document.
    pub metadata: Metadata,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT_NAME),
            min_documents: DEFAULT_MIN_DOCUMENTS,
            dry_run: false,
            verbose: false,
            quiet: false,
            overwrite_mode: OverwriteMode::default(),
            compression: CompressionLevel::default(),
            metadata: Metadata::default(),
        }
    }
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The merge gate is zero
    /// - Verbose and quiet modes are both enabled
    /// - The output path has no file name
    pub fn validate(&self) -> Result<()> {
        if self.min_documents == 0 {
            bail!("Minimum document count must be at least 1");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if self.output.file_name().is_none() {
            bail!(
                "Output path must name a file: {}",
                self.output.display()
            );
        }

        Ok(())
    }

    /// File name handed to the delivery collaborator.
    pub fn output_name(&self) -> String {
        self.output
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_OUTPUT_NAME.to_string())
    }

    /// Directory the merged document is delivered into.
    pub fn output_dir(&self) -> PathBuf {
        match self.output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}
