//! # confdiff - Cross-version configuration comparison
//!
//! Compares several versions of a Hadoop/HBase-style XML configuration and
//! reports, per key, what was added, removed, renamed or changed.
//!
//! ## Overview
//!
//! Given configuration snapshots in chronological order, confdiff:
//! - Reports keys added or removed between consecutive versions
//! - Detects renamed keys by matching descriptions across versions
//! - Reports every key whose value or description differs across versions,
//!   listing each distinct variant
//! - Optionally derives human-readable values for sizes and durations from a
//!   type/unit lookup table
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use confdiff::{diff, ConfigSource, LoaderBuilder, ReportOptions, ReportWriter, TemplateRenderer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = LoaderBuilder::new().build();
//! let outcome = loader.load_all(&[
//!     ConfigSource::new("0.90/hbase-default.xml", "0.90"),
//!     ConfigSource::new("0.92/hbase-default.xml", "0.92"),
//! ]);
//!
//! let report = diff(&outcome.configurations);
//!
//! let renderer = TemplateRenderer::default();
//! let writer = ReportWriter::new(&renderer, ReportOptions::default());
//! writer.write(&report, &mut std::io::stdout())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## How differences are found
//!
//! The diff runs in two passes. The first compares each non-empty version
//! with the previous non-empty one using set differences over their keys.
//! A new key whose description matches a property of the previous version
//! is reported as a rename. The second pass walks a merged index of all
//! distinct `(key, value, description)` variants and reports each key that
//! has more than one.
//!
//! The rename detection is a heuristic: two unrelated keys sharing a
//! description produce a false rename, and a rename that also edits the
//! description is reported as an add plus a remove.
//!
//! ## Module Organization
//!
//! - [`property`]: Property records, ordering and value formatting
//! - [`configuration`]: Per-version and merged property containers
//! - [`diff`]: The two-pass comparison
//! - [`lookup`]: Type/unit lookup tables
//! - [`loader`]: XML configuration loading
//! - [`render`]: Renderers and the report writer
//! - [`types`]: Common types and options
//! - [`error`]: Error types and handling

pub mod configuration;
pub mod diff;
pub mod error;
pub mod loader;
pub mod lookup;
pub mod property;
pub mod render;
pub mod types;

mod utils;

pub use configuration::{Configuration, MergedConfiguration};
pub use diff::{diff, DiffAction, DiffEvent, DiffReport, KeyDivergence, VersionTransition};
pub use error::{ConfDiffError, Result};
pub use loader::{Loader, LoaderBuilder};
pub use lookup::{LookupEntry, LookupTable};
pub use property::Property;
pub use render::{JsonRenderer, Renderer, ReportWriter, TemplateRenderer};
pub use types::*;
