//! Core data types shared across confdiff components
//!
//! ## Overview
//!
//! The types in this module represent:
//! - **Inputs**: `ConfigSource` - a configuration file and its version label
//! - **Load results**: `LoadOutcome`, `LoadFailure` - what the loader produced
//! - **Options**: `ReportOptions`, `OutputFormat` - how a report is written
//! - **Progress**: `ProgressCallback`, `ProgressInfo` - loader progress hooks
//!
//! ## Examples
//!
//! ```rust
//! use confdiff::types::{ConfigSource, ReportOptions};
//!
//! let sources = vec![
//!     ConfigSource::new("conf/0.90/hbase-default.xml", "0.90"),
//!     ConfigSource::new("conf/0.92/hbase-default.xml", "0.92"),
//! ];
//!
//! let options = ReportOptions {
//!     quiet: true,
//!     ..Default::default()
//! };
//! ```

use crate::configuration::Configuration;
use crate::error::ConfDiffError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// A configuration file together with the version label it represents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSource {
    /// Path of the XML configuration file
    pub path: PathBuf,
    /// Version label attached to every property read from the file
    pub version: String,
}

impl ConfigSource {
    pub fn new(path: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path.display(), self.version)
    }
}

/// A configuration file that could not be loaded
#[derive(Debug)]
pub struct LoadFailure {
    pub source: ConfigSource,
    pub error: ConfDiffError,
}

/// Result of loading several configuration files
///
/// Failed files are left out of `configurations`, which keeps the input
/// order of the files that did load.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Loaded configurations in input order
    pub configurations: Vec<Configuration>,
    /// Files that were dropped
    pub failures: Vec<LoadFailure>,
}

impl LoadOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Options controlling the informational text around rendered events
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Only write rendered events, no banners, headings or summaries
    pub quiet: bool,
    /// Prefix for every informational line
    pub prefix: String,
    /// Write per-version summaries after each group of events
    pub show_summary: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            quiet: false,
            prefix: String::new(),
            show_summary: true,
        }
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Template-rendered text with headings and summaries
    #[default]
    Text,
    /// The whole report as one JSON document
    Json,
    /// One JSON object per event, no informational text
    JsonLines,
}

/// Progress callback for loading many configuration files
pub type ProgressCallback = Arc<dyn Fn(ProgressInfo) + Send + Sync>;

/// Information passed to progress callbacks
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Source that just finished loading
    pub current_item: String,
    /// Sources processed so far
    pub processed: usize,
    /// Total sources to process
    pub total: usize,
}

impl ProgressInfo {
    /// Get progress as a percentage (0-100)
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            100.0
        } else {
            (self.processed as f32 / self.total as f32) * 100.0
        }
    }
}
