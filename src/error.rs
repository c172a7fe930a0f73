//! Error types for the confdiff library
//!
//! This module defines all error types that can occur while loading,
//! enriching, comparing and rendering configurations. The comparison itself
//! cannot fail; every variant here originates in one of the collaborators
//! around it (loader, lookup table, template renderer, CLI).

use std::path::PathBuf;
use thiserror::Error;

/// Type alias for Results in the confdiff library
pub type Result<T> = std::result::Result<T, ConfDiffError>;

/// Main error type for all confdiff operations
#[derive(Debug, Error)]
pub enum ConfDiffError {
    /// I/O errors while reading configurations, lookups or templates
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors during JSON serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration document is not well-formed XML
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The configuration document has the wrong top-level element
    #[error("Bad configuration file {path:?}: top-level element is <{root}>, not <configuration>")]
    InvalidDocument {
        /// Path of the rejected document
        path: PathBuf,
        /// Name of the root element that was found
        root: String,
    },

    /// An `<xi:include>` in a configuration document could not be resolved
    #[error("Cannot include {path:?}: {reason}")]
    Include {
        /// Path of the included document
        path: PathBuf,
        /// Why the include failed
        reason: String,
    },

    /// A property could not be constructed
    #[error("Invalid property: {0}")]
    InvalidProperty(String),

    /// A render template could not be compiled
    #[error("Template error: {0}")]
    Template(String),

    /// The lookup table could not be read
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// Command line arguments were inconsistent
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// None of the given configuration files could be loaded
    #[error("No configuration could be loaded")]
    NoConfigurations,

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConfDiffError {
    /// Create an invalid property error with a custom message
    pub fn invalid_property(msg: impl Into<String>) -> Self {
        ConfDiffError::InvalidProperty(msg.into())
    }

    /// Create an include error for the given document
    pub fn include(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ConfDiffError::Include {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a template error with a custom message
    pub fn template(msg: impl Into<String>) -> Self {
        ConfDiffError::Template(msg.into())
    }

    /// Create a lookup error with a custom message
    pub fn lookup(msg: impl Into<String>) -> Self {
        ConfDiffError::Lookup(msg.into())
    }

    /// Create an internal error with a custom message
    pub fn internal(msg: impl Into<String>) -> Self {
        ConfDiffError::Internal(msg.into())
    }

    /// Check if this error aborts the load of a single configuration file
    ///
    /// Such a version is dropped from the list handed to the diff engine,
    /// while the remaining versions are still compared.
    pub fn is_fatal_to_file(&self) -> bool {
        matches!(
            self,
            ConfDiffError::Io(_)
                | ConfDiffError::Xml(_)
                | ConfDiffError::InvalidDocument { .. }
                | ConfDiffError::Include { .. }
        )
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            ConfDiffError::InvalidDocument { path, .. } => {
                format!(
                    "{:?} is not a Hadoop-style configuration file. \
                     Expected a <configuration> root element with <property> children.",
                    path
                )
            }
            ConfDiffError::InvalidArguments(msg) => {
                format!("{}. Arguments must be given as <file> <version> pairs.", msg)
            }
            _ => self.to_string(),
        }
    }
}
