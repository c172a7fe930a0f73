//! Type and unit lookup table
//!
//! An optional `.properties`-style file declares, per configuration key,
//! the value type and unit:
//!
//! ```text
//! # <key>=<type>|<unit>
//! hbase.hregion.max.filesize=long|bytes
//! zookeeper.session.timeout=int|milliseconds
//! hbase.regionserver.handler.count=int
//! hbase.rootdir=|
//! ```
//!
//! An empty part before or after the pipe means "no type" or "no unit".
//! Entries for keys that never appear in a configuration are ignored.

use crate::error::{ConfDiffError, Result};
use crate::property::Property;
use std::collections::HashMap;
use std::fs;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;
use tracing::{debug, instrument, warn};

/// Declared type and unit for one key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupEntry {
    /// Value type, e.g. `int` or `long`
    pub property_type: Option<String>,
    /// Value unit, e.g. `bytes` or `milliseconds`
    pub unit: Option<String>,
}

/// Mapping from configuration key to its declared type and unit
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    entries: HashMap<String, LookupEntry>,
}

impl LookupTable {
    /// Read a lookup table from a file
    #[instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| ConfDiffError::lookup(format!("cannot read {:?}: {}", path, e)))?;
        let table = Self::parse(&text);
        debug!("Loaded {} lookup entries", table.len());
        Ok(table)
    }

    /// Parse lookup entries from `.properties`-style text
    ///
    /// The key ends at the first unescaped `=`, `:` or whitespace, as in Java
    /// properties files. Blank lines and lines starting with `#` or `!` are
    /// skipped, a trailing backslash continues the entry on the next line, and
    /// backslash escapes are resolved. Later entries override earlier ones.
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();

        for line in logical_lines(text) {
            let (key, value) = split_entry(&line);
            if key.is_empty() {
                continue;
            }

            let mut parts = value.splitn(2, '|');
            let property_type = parts.next().map(str::trim).filter(|s| !s.is_empty());
            let unit = parts.next().map(str::trim).filter(|s| !s.is_empty());

            entries.insert(
                key,
                LookupEntry {
                    property_type: property_type.map(String::from),
                    unit: unit.map(String::from),
                },
            );
        }

        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&LookupEntry> {
        self.entries.get(key)
    }

    /// Return `property` with its declared type and unit applied
    ///
    /// Properties without an entry are returned unchanged.
    pub fn enrich(&self, property: Property) -> Property {
        match self.entries.get(property.key()) {
            Some(entry) => property.with_type_unit(entry.property_type.clone(), entry.unit.clone()),
            None => property,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Join continuation lines, dropping comments and blank lines
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending = String::new();
    let mut continued = false;

    for raw in text.lines() {
        let line = raw.trim_start();
        if !continued && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
            continue;
        }
        pending.push_str(line);
        continued = pending.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1;
        if continued {
            pending.pop();
        } else {
            lines.push(std::mem::take(&mut pending));
        }
    }
    if !pending.is_empty() {
        lines.push(pending);
    }
    lines
}

/// Split one logical line into its unescaped key and value
fn split_entry(line: &str) -> (String, String) {
    let mut chars = line.chars().peekable();
    let mut key = String::new();
    let mut space_separated = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => push_escaped(&mut key, &mut chars),
            '=' | ':' => break,
            c if c.is_whitespace() => {
                space_separated = true;
                break;
            }
            c => key.push(c),
        }
    }

    skip_whitespace(&mut chars);
    if space_separated && matches!(chars.peek(), Some('=' | ':')) {
        chars.next();
        skip_whitespace(&mut chars);
    }

    let mut value = String::new();
    while let Some(c) = chars.next() {
        match c {
            '\\' => push_escaped(&mut value, &mut chars),
            c => value.push(c),
        }
    }
    (key, value)
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

fn push_escaped(out: &mut String, chars: &mut Peekable<Chars<'_>>) {
    match chars.next() {
        Some('t') => out.push('\t'),
        Some('n') => out.push('\n'),
        Some('r') => out.push('\r'),
        Some('f') => out.push('\u{c}'),
        Some('u') => {
            let hex: String = chars.by_ref().take(4).collect();
            match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                Some(c) => out.push(c),
                None => {
                    warn!("Malformed \\u escape in lookup file: \\u{}", hex);
                    out.push_str(&hex);
                }
            }
        }
        Some(c) => out.push(c),
        None => {}
    }
}
