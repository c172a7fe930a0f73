//! Loading Hadoop-style XML configuration files
//!
//! Configuration files follow the layout used by Hadoop and HBase:
//!
//! ```xml
//! <configuration>
//!   <property>
//!     <name>hbase.hregion.max.filesize</name>
//!     <value>268435456</value>
//!     <description>
//!       Maximum HStoreFile size.
//!     </description>
//!     <final>true</final>
//!   </property>
//! </configuration>
//! ```
//!
//! Every property read from a file is tagged with the version label of its
//! [`ConfigSource`], enriched from the optional lookup table, and flagged to
//! ignore descriptions when requested, before it enters the diff engine.
//!
//! ## Error handling
//!
//! - A document that is not well-formed, or whose root element is not
//!   `<configuration>`, fails the whole file.
//! - A property without a `<name>` is skipped with a warning.
//! - A child element other than `<property>` is warned about and still read.
//! - `<xi:include href="..."/>` elements are expanded in place, relative to
//!   the including file. An include that cannot be read fails the file
//!   unless the element carries an `<xi:fallback>`.
//! - Comments inside `<name>`, `<value>` or `<description>` are skipped; the
//!   surrounding text is joined.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use confdiff::{ConfigSource, LoaderBuilder, LookupTable};
//! use std::path::Path;
//!
//! # fn main() -> confdiff::Result<()> {
//! let loader = LoaderBuilder::new()
//!     .lookup(LookupTable::load(Path::new("types.properties"))?)
//!     .ignore_description(true)
//!     .build();
//!
//! let outcome = loader.load_all(&[
//!     ConfigSource::new("0.90/hbase-default.xml", "0.90"),
//!     ConfigSource::new("0.92/hbase-default.xml", "0.92"),
//! ]);
//! println!("Loaded {} versions", outcome.configurations.len());
//! # Ok(())
//! # }
//! ```

use crate::configuration::Configuration;
use crate::error::{ConfDiffError, Result};
use crate::lookup::LookupTable;
use crate::property::Property;
use crate::types::{ConfigSource, LoadFailure, LoadOutcome, ProgressCallback, ProgressInfo};
use crate::utils::normalize_description;
use rayon::prelude::*;
use roxmltree::{Document, Node, ParsingOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, info, instrument, warn};

const ROOT_ELEMENT: &str = "configuration";
const PROPERTY_ELEMENT: &str = "property";
const XINCLUDE_NS: &str = "http://www.w3.org/2001/XInclude";

/// Reads versioned configuration files
pub struct Loader {
    lookup: Option<LookupTable>,
    ignore_description: bool,
    parallel: bool,
    progress: Option<ProgressCallback>,
}

impl Loader {
    /// Load one configuration file
    ///
    /// # Errors
    ///
    /// - [`ConfDiffError::Io`] if the file cannot be read
    /// - [`ConfDiffError::Xml`] if the file is not well-formed XML
    /// - [`ConfDiffError::InvalidDocument`] if the root element is not `<configuration>`
    /// - [`ConfDiffError::Include`] if an `<xi:include>` cannot be resolved
    #[instrument(skip(self), fields(path = %source.path.display(), version = %source.version))]
    pub fn load(&self, source: &ConfigSource) -> Result<Configuration> {
        let text = fs::read_to_string(&source.path)?;
        let config = self.parse_document(&text, &source.path, &source.version)?;
        info!("Loaded {} properties", config.len());
        Ok(config)
    }

    /// Load a configuration from an in-memory XML document
    pub fn load_str(&self, xml: &str, version: &str) -> Result<Configuration> {
        self.parse_document(xml, Path::new("<memory>"), version)
    }

    /// Load several configuration files, preserving their order
    ///
    /// Files are read in parallel unless disabled on the builder. A file that
    /// fails to load is logged, recorded in [`LoadOutcome::failures`] and left
    /// out of the returned configurations.
    pub fn load_all(&self, sources: &[ConfigSource]) -> LoadOutcome {
        let processed = AtomicUsize::new(0);
        let load_one = |source: &ConfigSource| {
            let result = self.load(source);
            if let Some(progress) = &self.progress {
                progress(ProgressInfo {
                    current_item: source.to_string(),
                    processed: processed.fetch_add(1, Ordering::Relaxed) + 1,
                    total: sources.len(),
                });
            }
            result
        };

        let results: Vec<Result<Configuration>> = if self.parallel {
            sources.par_iter().map(load_one).collect()
        } else {
            sources.iter().map(load_one).collect()
        };

        let mut outcome = LoadOutcome::default();
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(config) => outcome.configurations.push(config),
                Err(e) => {
                    error!("Failed to load {}: {}", source, e);
                    outcome.failures.push(LoadFailure {
                        source: source.clone(),
                        error: e,
                    });
                }
            }
        }
        outcome
    }

    fn parse_document(&self, text: &str, path: &Path, version: &str) -> Result<Configuration> {
        let mut config = Configuration::new(version);
        let mut chain = vec![include_key(path)];
        self.read_document(text, path, version, &mut config, &mut chain)?;
        Ok(config)
    }

    /// Read one document into `config`
    ///
    /// `chain` holds the documents currently being read, outermost first. An
    /// included document may be a whole `<configuration>` or a single
    /// `<property>`.
    fn read_document(
        &self,
        text: &str,
        path: &Path,
        version: &str,
        config: &mut Configuration,
        chain: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(text, options)?;

        let root = doc.root_element();
        match root.tag_name().name() {
            ROOT_ELEMENT => self.read_children(root, path, version, config, chain),
            PROPERTY_ELEMENT if chain.len() > 1 => self.add_property(root, path, version, config),
            other => Err(ConfDiffError::InvalidDocument {
                path: path.to_path_buf(),
                root: other.to_string(),
            }),
        }
    }

    fn read_children(
        &self,
        parent: Node<'_, '_>,
        path: &Path,
        version: &str,
        config: &mut Configuration,
        chain: &mut Vec<PathBuf>,
    ) -> Result<()> {
        for node in parent.children().filter(Node::is_element) {
            if is_xinclude(node, "include") {
                self.include(node, path, version, config, chain)?;
                continue;
            }
            if node.tag_name().name() != PROPERTY_ELEMENT {
                warn!(
                    "Bad configuration file {:?}: element <{}> is not <property>",
                    path,
                    node.tag_name().name()
                );
            }
            self.add_property(node, path, version, config)?;
        }
        Ok(())
    }

    fn add_property(
        &self,
        node: Node<'_, '_>,
        path: &Path,
        version: &str,
        config: &mut Configuration,
    ) -> Result<()> {
        if let Some(property) = self.read_property(node, version)? {
            if !config.add_property(property) {
                debug!("Duplicate property entry in {:?}", path);
            }
        }
        Ok(())
    }

    /// Expand an `<xi:include href="..."/>` element
    ///
    /// `href` is resolved against the directory of the including document.
    /// When the target cannot be read, the children of an `<xi:fallback>`
    /// are read instead; without a fallback the whole file fails.
    fn include(
        &self,
        node: Node<'_, '_>,
        path: &Path,
        version: &str,
        config: &mut Configuration,
        chain: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let Some(href) = node.attribute("href") else {
            return Err(ConfDiffError::include(path, "<xi:include> without an href attribute"));
        };
        let target = path.parent().unwrap_or_else(|| Path::new("")).join(href);

        match self.read_included(&target, version, chain) {
            Ok(included) => {
                debug!("Included {} properties from {:?}", included.len(), target);
                config.extend(included.iter().cloned());
                Ok(())
            }
            Err(e) => match node.children().find(|n| is_xinclude(*n, "fallback")) {
                Some(fallback) => {
                    warn!("Cannot include {:?}, using fallback: {}", target, e);
                    self.read_children(fallback, path, version, config, chain)
                }
                None => Err(e),
            },
        }
    }

    fn read_included(
        &self,
        target: &Path,
        version: &str,
        chain: &mut Vec<PathBuf>,
    ) -> Result<Configuration> {
        let key = include_key(target);
        if chain.contains(&key) {
            return Err(ConfDiffError::include(target, "recursive include"));
        }
        let text = fs::read_to_string(target)
            .map_err(|e| ConfDiffError::include(target, e.to_string()))?;

        let mut included = Configuration::new(version);
        chain.push(key);
        let result = self.read_document(&text, target, version, &mut included, chain);
        chain.pop();
        result.map(|()| included)
    }

    fn read_property(&self, node: Node<'_, '_>, version: &str) -> Result<Option<Property>> {
        let mut name = None;
        let mut value = None;
        let mut description = None;
        let mut is_final = false;

        for field in node.children().filter(Node::is_element) {
            match field.tag_name().name() {
                "name" => name = text_of(field).map(|t| t.trim().to_string()),
                "value" => value = text_of(field),
                "description" => description = text_of(field).map(|t| normalize_description(&t)),
                "final" => is_final = text_of(field).is_some_and(|t| t.trim() == "true"),
                _ => {}
            }
        }

        let Some(name) = name.filter(|n| !n.is_empty()) else {
            warn!("Skipping property without a name in version {}", version);
            return Ok(None);
        };

        let property = Property::new(name, value, description, version)?
            .with_final(is_final)
            .ignoring_description(self.ignore_description);
        let property = match &self.lookup {
            Some(lookup) => lookup.enrich(property),
            None => property,
        };
        Ok(Some(property))
    }
}

/// Text content of an element with comments skipped, `None` if it has no text
fn text_of(field: Node<'_, '_>) -> Option<String> {
    let mut texts = field
        .children()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .peekable();
    texts.peek()?;
    Some(texts.collect())
}

fn is_xinclude(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(XINCLUDE_NS)
        && node.tag_name().name() == name
}

/// Identity of a document on the include chain
fn include_key(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Builder for creating [`Loader`] instances
pub struct LoaderBuilder {
    lookup: Option<LookupTable>,
    ignore_description: bool,
    parallel: bool,
    progress: Option<ProgressCallback>,
}

impl LoaderBuilder {
    /// Create a new builder with default settings
    ///
    /// By default there is no lookup table, descriptions take part in
    /// comparisons and files are loaded in parallel.
    pub fn new() -> Self {
        Self {
            lookup: None,
            ignore_description: false,
            parallel: true,
            progress: None,
        }
    }

    /// Enrich every loaded property from a lookup table
    pub fn lookup(mut self, lookup: LookupTable) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Treat description edits as non-differences
    pub fn ignore_description(mut self, ignore: bool) -> Self {
        self.ignore_description = ignore;
        self
    }

    /// Load multiple files in parallel
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Receive a callback after each file loaded by [`Loader::load_all`]
    pub fn progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn build(self) -> Loader {
        Loader {
            lookup: self.lookup,
            ignore_description: self.ignore_description,
            parallel: self.parallel,
            progress: self.progress,
        }
    }
}

impl Default for LoaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
