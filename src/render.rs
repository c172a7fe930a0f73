//! Rendering diff reports as text
//!
//! Turning a [`DiffEvent`] into text is a pluggable strategy behind the
//! [`Renderer`] trait. Two renderers ship with the crate:
//!
//! - [`TemplateRenderer`]: a mustache-style template, by default producing
//!   `Added: Property{key='…', value='…', description='…', source='…'}`
//! - [`JsonRenderer`]: one JSON object per line
//!
//! Any `Fn(&DiffEvent) -> String` is a renderer as well, which keeps tests
//! free of template details.
//!
//! [`ReportWriter`] walks a whole [`DiffReport`], writing banners, headings
//! and summaries around the rendered events.
//!
//! ## Templates
//!
//! Templates understand a small mustache subset:
//!
//! - `{{action}}`: the event action (`Added`, `Renamed`, ...)
//! - `{{#property}}…{{/property}}`: the property the event is about
//! - `{{#property2}}…{{/property2}}`: the previous property of a rename,
//!   skipped when there is none; `{{^property2}}…{{/property2}}` renders
//!   only when there is none
//! - inside a property section: `{{key}}`, `{{value}}`, `{{description}}`,
//!   `{{source}}`, `{{type}}`, `{{unit}}`, `{{formattedValue}}`, `{{final}}`
//!
//! Unknown names render as empty text.

use crate::diff::{DiffEvent, DiffReport, VersionTransition};
use crate::error::{ConfDiffError, Result};
use crate::property::{Property, NULL};
use crate::types::ReportOptions;
use regex::Regex;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;
use tracing::warn;

/// Template used when no custom template is given
pub const DEFAULT_TEMPLATE: &str = concat!(
    "{{action}}: ",
    "{{#property}}",
    "Property{key='{{key}}', value='{{value}}', description='{{description}}', source='{{source}}'}",
    "{{/property}}",
    "{{#property2}}",
    "\n\n   from: Property{key='{{key}}', value='{{value}}', description='{{description}}', source='{{source}}'}",
    "{{/property2}}\n",
);

const BANNER: &str = "=========================================================";
const SEPARATOR: &str = "---------------------------------------------------------";

/// Formats a single diff event
pub trait Renderer {
    fn render(&self, event: &DiffEvent) -> String;
}

impl<F> Renderer for F
where
    F: Fn(&DiffEvent) -> String,
{
    fn render(&self, event: &DiffEvent) -> String {
        self(event)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    Var(String),
    Section {
        name: String,
        inverted: bool,
        body: Vec<Segment>,
    },
}

/// Renders events through a compiled mustache-style template
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    segments: Vec<Segment>,
}

impl TemplateRenderer {
    /// Compile a template
    ///
    /// # Errors
    ///
    /// Returns [`ConfDiffError::Template`] if sections are not properly nested.
    pub fn new(template: &str) -> Result<Self> {
        static TAG: OnceLock<Regex> = OnceLock::new();
        let tag = TAG.get_or_init(|| {
            Regex::new(r"\{\{\s*([#/^]?)\s*([A-Za-z0-9_.]+)\s*\}\}").expect("static regex")
        });

        let mut segments = Vec::new();
        let mut open: Vec<(String, bool, Vec<Segment>)> = Vec::new();
        let mut last = 0;

        for caps in tag.captures_iter(template) {
            let Some(whole) = caps.get(0) else { continue };
            let sigil = &caps[1];
            let name = caps[2].to_string();

            if whole.start() > last {
                innermost(&mut segments, &mut open)
                    .push(Segment::Text(template[last..whole.start()].to_string()));
            }
            last = whole.end();

            match sigil {
                "#" | "^" => open.push((name, sigil == "^", Vec::new())),
                "/" => {
                    let Some((opened, inverted, body)) = open.pop() else {
                        return Err(ConfDiffError::template(format!(
                            "closing tag {{{{/{}}}}} without an open section",
                            name
                        )));
                    };
                    if opened != name {
                        return Err(ConfDiffError::template(format!(
                            "section {{{{#{}}}}} closed by {{{{/{}}}}}",
                            opened, name
                        )));
                    }
                    innermost(&mut segments, &mut open).push(Segment::Section {
                        name,
                        inverted,
                        body,
                    });
                }
                _ => innermost(&mut segments, &mut open).push(Segment::Var(name)),
            }
        }

        if let Some((opened, _, _)) = open.pop() {
            return Err(ConfDiffError::template(format!(
                "section {{{{#{}}}}} is never closed",
                opened
            )));
        }

        if last < template.len() {
            segments.push(Segment::Text(template[last..].to_string()));
        }
        Ok(Self { segments })
    }

    /// Compile a template read from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let template = fs::read_to_string(path)?;
        Self::new(&template)
    }

    fn render_segments(
        &self,
        segments: &[Segment],
        event: &DiffEvent,
        scope: Option<&Property>,
        out: &mut String,
    ) {
        for segment in segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Var(name) => out.push_str(&resolve(name, event, scope)),
                Segment::Section {
                    name,
                    inverted,
                    body,
                } => {
                    let section_scope = match name.as_str() {
                        "property" => Some(&event.property),
                        "property2" => event.previous.as_ref(),
                        _ => None,
                    };
                    match (section_scope, inverted) {
                        (Some(property), false) => {
                            self.render_segments(body, event, Some(property), out)
                        }
                        (None, true) => self.render_segments(body, event, scope, out),
                        _ => {}
                    }
                }
            }
        }
    }
}

/// Segment list new segments go to: the innermost open section, or the top level
fn innermost<'a>(
    top: &'a mut Vec<Segment>,
    open: &'a mut [(String, bool, Vec<Segment>)],
) -> &'a mut Vec<Segment> {
    match open.last_mut() {
        Some((_, _, body)) => body,
        None => top,
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE).expect("default template is well-formed")
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, event: &DiffEvent) -> String {
        let mut out = String::new();
        self.render_segments(&self.segments, event, None, &mut out);
        out
    }
}

fn resolve(name: &str, event: &DiffEvent, scope: Option<&Property>) -> String {
    if name == "action" {
        return event.action.to_string();
    }
    let Some(p) = scope else {
        return String::new();
    };
    match name {
        "key" => p.key().to_string(),
        "value" => p.value().unwrap_or(NULL).to_string(),
        "description" => p.description().unwrap_or(NULL).to_string(),
        "source" => p.source().to_string(),
        "type" => p.property_type().unwrap_or_default().to_string(),
        "unit" => p.unit().unwrap_or_default().to_string(),
        "formattedValue" | "formatted_value" => p.formatted_value().unwrap_or_default().to_string(),
        "final" => p.is_final().to_string(),
        _ => String::new(),
    }
}

/// Renders each event as a single line of JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, event: &DiffEvent) -> String {
        match serde_json::to_string(event) {
            Ok(line) => line + "\n",
            Err(e) => {
                warn!("Cannot serialize {} event for {}: {}", event.action, event.property.key(), e);
                String::new()
            }
        }
    }
}

/// Writes a complete report with headings and summaries
pub struct ReportWriter<'a> {
    renderer: &'a dyn Renderer,
    options: ReportOptions,
}

impl<'a> ReportWriter<'a> {
    pub fn new(renderer: &'a dyn Renderer, options: ReportOptions) -> Self {
        Self { renderer, options }
    }

    /// Write `report` to `out`
    ///
    /// Rendered events are always written; banners, headings and summaries
    /// only when not quiet.
    pub fn write(&self, report: &DiffReport, out: &mut dyn Write) -> Result<()> {
        self.info(out, BANNER)?;
        self.info(out, "Start")?;
        self.info(out, BANNER)?;
        self.info(out, "Checking differences across versions...\n")?;

        for transition in &report.transitions {
            self.write_transition(transition, out)?;
        }

        self.info(out, SEPARATOR)?;
        self.info(out, "Checking differences per property...\n")?;
        for divergence in &report.divergences {
            self.info(out, &format!("Difference found for property {}", divergence.key))?;
            for event in &divergence.events {
                out.write_all(self.renderer.render(event).as_bytes())?;
            }
            writeln!(out)?;
        }

        self.info(out, &format!("Total: {} differences.", report.difference_count()))?;
        self.info(out, BANNER)?;
        out.flush()?;
        Ok(())
    }

    fn write_transition(&self, transition: &VersionTransition, out: &mut dyn Write) -> Result<()> {
        let version = &transition.to_version;

        if !transition.added.is_empty() {
            self.info(out, &format!("Added or Renamed Keys in {}:", version))?;
            for event in &transition.added {
                out.write_all(self.renderer.render(event).as_bytes())?;
            }
            if self.options.show_summary {
                self.info(
                    out,
                    &format!(
                        "Summary for {}: {} added and {} renamed properties.",
                        version,
                        transition.added_count(),
                        transition.renamed_count()
                    ),
                )?;
                self.info(out, &format!("Missing type info: {}", transition.missing_type.len()))?;
                if !transition.missing_type.is_empty() {
                    let keys: Vec<&str> = transition.missing_type.iter().map(String::as_str).collect();
                    self.info(out, &format!("[{}]", keys.join(", ")))?;
                }
            }
            writeln!(out)?;
        }

        if !transition.removed.is_empty() {
            self.info(out, &format!("Removed Keys in {}:", version))?;
            for event in &transition.removed {
                out.write_all(self.renderer.render(event).as_bytes())?;
            }
            if self.options.show_summary {
                self.info(
                    out,
                    &format!(
                        "Summary for {}: {} removed properties.",
                        version,
                        transition.removed_count()
                    ),
                )?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    fn info(&self, out: &mut dyn Write, line: &str) -> Result<()> {
        if !self.options.quiet {
            writeln!(out, "{}{}", self.options.prefix, line)?;
        }
        Ok(())
    }
}
