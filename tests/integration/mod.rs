//! Integration tests for confdiff
//!
//! Writes versioned configuration files to disk, loads them through the
//! loader and checks the rendered report.

use ::confdiff::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test harness holding a directory of versioned configuration files
pub struct ConfigHarness {
    pub dir: TempDir,
    pub sources: Vec<ConfigSource>,
}

impl ConfigHarness {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            sources: Vec::new(),
        }
    }

    /// Write a configuration document for `version`
    pub fn add_version(&mut self, version: &str, body: &str) -> anyhow::Result<()> {
        let path = self.dir.path().join(format!("hbase-default-{}.xml", version));
        fs::write(&path, body)?;
        self.sources.push(ConfigSource::new(path, version));
        Ok(())
    }

    pub fn write_file(&self, name: &str, body: &str) -> anyhow::Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, body)?;
        Ok(path)
    }
}

fn property_xml(name: &str, value: &str, description: &str) -> String {
    format!(
        "  <property>\n    <name>{}</name>\n    <value>{}</value>\n    <description>{}</description>\n  </property>\n",
        name, value, description
    )
}

fn document(properties: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n<?xml-stylesheet type=\"text/xsl\" href=\"configuration.xsl\"?>\n<configuration>\n{}</configuration>\n",
        properties.concat()
    )
}

fn hbase_releases(harness: &mut ConfigHarness) -> anyhow::Result<()> {
    harness.add_version(
        "0.20",
        &document(&[
            property_xml("hbase.client.pause", "1000", "General client pause value."),
            property_xml(
                "hbase.regionserver.lease.period",
                "60000",
                "HRegion server lease period in milliseconds.",
            ),
            property_xml("hbase.hregion.max.filesize", "268435456", "Maximum HStoreFile size."),
        ]),
    )?;
    harness.add_version(
        "0.90",
        &document(&[
            property_xml("hbase.client.pause", "1000", "General client pause value."),
            property_xml(
                "hbase.regionserver.lease.period",
                "60000",
                "HRegion server lease period in milliseconds.",
            ),
            property_xml("hbase.hregion.max.filesize", "268435456", "Maximum HStoreFile size."),
            property_xml("hbase.rest.port", "8080", "The port for the HBase REST server."),
        ]),
    )?;
    harness.add_version(
        "0.92",
        &document(&[
            property_xml("hbase.client.pause", "100", "General client pause value."),
            property_xml(
                "hbase.client.scanner.timeout.period",
                "60000",
                "HRegion server lease period in milliseconds.",
            ),
            property_xml("hbase.hregion.max.filesize", "1073741824", "Maximum HStoreFile size."),
        ]),
    )?;
    Ok(())
}

fn render_text(report: &DiffReport, renderer: &dyn Renderer, options: ReportOptions) -> String {
    let mut out = Vec::new();
    ReportWriter::new(renderer, options).write(report, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_release_history() -> anyhow::Result<()> {
    let mut harness = ConfigHarness::new();
    hbase_releases(&mut harness)?;

    let outcome = LoaderBuilder::new().build().load_all(&harness.sources);
    assert!(outcome.is_complete());
    let report = diff(&outcome.configurations);

    assert_eq!(report.transitions.len(), 2);

    let first = &report.transitions[0];
    assert_eq!(first.to_version, "0.90");
    assert_eq!(first.added_count(), 1);
    assert_eq!(first.removed_count(), 0);

    let second = &report.transitions[1];
    assert_eq!(second.to_version, "0.92");
    assert_eq!(second.renamed_count(), 1);
    let renamed = &second.added[0];
    assert_eq!(renamed.property.key(), "hbase.client.scanner.timeout.period");
    assert_eq!(
        renamed.previous.as_ref().map(Property::key),
        Some("hbase.regionserver.lease.period")
    );
    let removed: Vec<&str> = second.removed.iter().map(|e| e.property.key()).collect();
    assert_eq!(removed, vec!["hbase.rest.port"]);

    let divergent: Vec<&str> = report.divergences.iter().map(|d| d.key.as_str()).collect();
    assert_eq!(divergent, vec!["hbase.client.pause", "hbase.hregion.max.filesize"]);
    Ok(())
}

#[test]
fn test_default_text_report() -> anyhow::Result<()> {
    let mut harness = ConfigHarness::new();
    hbase_releases(&mut harness)?;

    let outcome = LoaderBuilder::new().build().load_all(&harness.sources);
    let report = diff(&outcome.configurations);
    let text = render_text(&report, &TemplateRenderer::default(), ReportOptions::default());

    assert!(text.contains("Added or Renamed Keys in 0.90:\n"));
    assert!(text.contains(
        "Added: Property{key='hbase.rest.port', value='8080', \
         description='The port for the HBase REST server.', source='0.90'}\n"
    ));
    assert!(text.contains("Summary for 0.92: 0 added and 1 renamed properties.\n"));
    assert!(text.contains("Removed Keys in 0.92:\n"));
    assert!(text.contains("Summary for 0.92: 1 removed properties.\n"));
    assert!(text.contains("Difference found for property hbase.client.pause\n"));
    assert!(text.contains(
        "Baseline: Property{key='hbase.client.pause', value='100', \
         description='General client pause value.', source='0.92'}\n"
    ));
    assert!(text.ends_with("Total: 2 differences.\n=========================================================\n"));
    Ok(())
}

#[test]
fn test_lookup_and_custom_template_from_files() -> anyhow::Result<()> {
    let mut harness = ConfigHarness::new();
    hbase_releases(&mut harness)?;
    let lookup_path = harness.write_file(
        "types.properties",
        "hbase.hregion.max.filesize=long|bytes\nhbase.client.pause=long|milliseconds\n",
    )?;
    let template_path = harness.write_file(
        "short.mustache",
        "{{action}} {{#property}}{{key}}@{{source}}={{formattedValue}}{{/property}}\n",
    )?;

    let loader = LoaderBuilder::new()
        .lookup(LookupTable::load(&lookup_path)?)
        .build();
    let outcome = loader.load_all(&harness.sources);
    let report = diff(&outcome.configurations);

    let renderer = TemplateRenderer::from_file(&template_path)?;
    let text = render_text(
        &report,
        &renderer,
        ReportOptions {
            quiet: true,
            ..Default::default()
        },
    );
    let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
    assert_eq!(
        lines,
        vec![
            "Added hbase.rest.port@0.90=",
            "Renamed hbase.client.scanner.timeout.period@0.92=",
            "Removed hbase.rest.port@0.90=",
            "Baseline hbase.client.pause@0.92=100ms",
            "Changed hbase.client.pause@0.20=1s",
            "Baseline hbase.hregion.max.filesize@0.92=1.00 GB",
            "Changed hbase.hregion.max.filesize@0.20=256.00 MB",
        ]
    );
    Ok(())
}

#[test]
fn test_broken_version_is_dropped() -> anyhow::Result<()> {
    let mut harness = ConfigHarness::new();
    harness.add_version("1.0", &document(&[property_xml("a", "1", "first")]))?;
    harness.add_version("1.1", "<properties><entry key=\"a\">1</entry></properties>")?;
    harness.add_version("1.2", &document(&[property_xml("a", "2", "first")]))?;

    let outcome = LoaderBuilder::new().build().load_all(&harness.sources);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].source.version, "1.1");
    assert!(matches!(
        outcome.failures[0].error,
        ConfDiffError::InvalidDocument { .. }
    ));

    let report = diff(&outcome.configurations);
    assert_eq!(report.transitions.len(), 1);
    assert_eq!(report.transitions[0].from_version, "1.0");
    assert_eq!(report.transitions[0].to_version, "1.2");
    assert_eq!(report.difference_count(), 1);
    Ok(())
}

#[test]
fn test_sequential_and_parallel_loading_agree() -> anyhow::Result<()> {
    let mut harness = ConfigHarness::new();
    for i in 0..8 {
        let props: Vec<String> = (0..=i)
            .map(|k| property_xml(&format!("key.{}", k), &format!("{}", k * i), "d"))
            .collect();
        harness.add_version(&format!("v{}", i), &document(&props))?;
    }

    let parallel = LoaderBuilder::new().parallel(true).build().load_all(&harness.sources);
    let sequential = LoaderBuilder::new().parallel(false).build().load_all(&harness.sources);

    let a = serde_json::to_string(&diff(&parallel.configurations))?;
    let b = serde_json::to_string(&diff(&sequential.configurations))?;
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn test_json_report_shape() -> anyhow::Result<()> {
    let mut harness = ConfigHarness::new();
    hbase_releases(&mut harness)?;
    let outcome = LoaderBuilder::new().build().load_all(&harness.sources);
    let report = diff(&outcome.configurations);

    let value = serde_json::to_value(&report)?;
    assert_eq!(value["versions_compared"], 3);
    assert_eq!(value["transitions"][1]["added"][0]["action"], "Renamed");
    assert_eq!(
        value["transitions"][1]["added"][0]["previous"]["key"],
        "hbase.regionserver.lease.period"
    );
    assert_eq!(value["divergences"][0]["key"], "hbase.client.pause");
    Ok(())
}
