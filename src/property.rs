//! Configuration property records
//!
//! A [`Property`] is one configuration entry as it was read from one version
//! of a configuration. Properties are ordered and compared over
//! `(key, value, description)` only, so the same entry read from two versions
//! compares equal even though its `source` differs. This is what lets the
//! merged index collapse unchanged entries into a single variant.
//!
//! ## Absent fields
//!
//! An unset value or description is `None` and is never confused with an
//! empty string. When displayed, absent fields are shown as [`NULL`].
//!
//! ## Examples
//!
//! ```rust
//! use confdiff::Property;
//!
//! # fn main() -> confdiff::Result<()> {
//! let p = Property::new(
//!     "hbase.hregion.max.filesize",
//!     Some("268435456".to_string()),
//!     Some("Maximum region size.".to_string()),
//!     "0.90",
//! )?
//! .with_type_unit(Some("long".to_string()), Some("bytes".to_string()));
//!
//! assert_eq!(p.formatted_value(), Some("256.00 MB"));
//! assert_eq!(p.value(), Some("268435456"));
//! # Ok(())
//! # }
//! ```

use crate::error::{ConfDiffError, Result};
use crate::utils::{format_bytes, format_millis, format_signed};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use tracing::warn;

/// Text shown in place of an absent value or description
pub const NULL: &str = "NULL";

/// Declared numeric types that support value formatting
const NUMERIC_TYPES: &[&str] = &["int", "long"];

/// One configuration entry in one version
#[derive(Debug, Clone, Serialize)]
pub struct Property {
    key: String,
    value: Option<String>,
    description: Option<String>,
    source: String,
    #[serde(rename = "type")]
    property_type: Option<String>,
    unit: Option<String>,
    formatted_value: Option<String>,
    #[serde(rename = "final")]
    is_final: bool,
    #[serde(skip)]
    ignore_description: bool,
}

impl Property {
    /// Create a property read from the version labelled `source`
    ///
    /// # Errors
    ///
    /// Returns [`ConfDiffError::InvalidProperty`] if `key` is empty.
    pub fn new(
        key: impl Into<String>,
        value: Option<String>,
        description: Option<String>,
        source: impl Into<String>,
    ) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfDiffError::invalid_property("property key must not be empty"));
        }

        Ok(Self {
            key,
            value,
            description,
            source: source.into(),
            property_type: None,
            unit: None,
            formatted_value: None,
            is_final: false,
            ignore_description: false,
        })
    }

    /// Attach a declared type and unit, deriving the formatted value
    ///
    /// When the type is `int` or `long` and the unit is `bytes` or
    /// `milliseconds`, the raw value is parsed and a human-readable form is
    /// stored in [`formatted_value`](Self::formatted_value). A value that does
    /// not parse only produces a warning. The raw value is never changed.
    pub fn with_type_unit(mut self, property_type: Option<String>, unit: Option<String>) -> Self {
        self.property_type = property_type;
        self.unit = unit;
        self.formatted_value = self.derive_formatted_value();
        self
    }

    /// Exclude (or include) the description from equality and ordering
    ///
    /// Two properties that both ignore their description compare equal on
    /// equal key and value. A property that ignores its description sorts
    /// before one with the same key and value that does not, and is never
    /// equal to it.
    pub fn ignoring_description(mut self, ignore: bool) -> Self {
        self.ignore_description = ignore;
        self
    }

    /// Mark the property as final (not overridable)
    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    /// Description as seen by the ordering; `None` when it is ignored
    fn compared_description(&self) -> Option<Option<&str>> {
        (!self.ignore_description).then(|| self.description())
    }

    fn derive_formatted_value(&self) -> Option<String> {
        let ty = self.property_type.as_deref()?;
        let unit = self.unit.as_deref()?;
        if !NUMERIC_TYPES.iter().any(|t| t.eq_ignore_ascii_case(ty)) {
            return None;
        }
        let format: fn(u64) -> String = match unit.to_ascii_lowercase().as_str() {
            "bytes" => format_bytes,
            "milliseconds" => format_millis,
            _ => return None,
        };

        let raw = self.value.as_deref().unwrap_or(NULL);
        match raw.trim().parse::<i64>() {
            Ok(number) => Some(format_signed(number, format)),
            Err(e) => {
                warn!(
                    "Cannot format value '{}' of {} ({}|{}) in {}: {}",
                    raw, self.key, ty, unit, self.source, e
                );
                None
            }
        }
    }

    /// The configuration key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The raw value, if set
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The normalized description, if set
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Version label of the configuration this property was read from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Declared type from the lookup table
    pub fn property_type(&self) -> Option<&str> {
        self.property_type.as_deref()
    }

    /// Declared unit from the lookup table
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Human-readable rendition of a numeric value with a known unit
    pub fn formatted_value(&self) -> Option<&str> {
        self.formatted_value.as_deref()
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn ignores_description(&self) -> bool {
        self.ignore_description
    }
}

impl Ord for Property {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.value.cmp(&other.value))
            .then_with(|| self.compared_description().cmp(&other.compared_description()))
    }
}

impl PartialOrd for Property {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Property {}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Property{{key='{}', value='{}', description='{}', source='{}'}}",
            self.key,
            self.value().unwrap_or(NULL),
            self.description().unwrap_or(NULL),
            self.source
        )
    }
}
