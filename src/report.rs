//! Output formatting for mappcheck results.
//!
//! Supports four output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration
//! - Host: editor diagnostics (LSP-shaped) keyed by file path
//!
//! Advisory findings are merged with structural diagnostics here and only
//! here; the analysis report keeps them separate. Project-level and advisory
//! diagnostics are attributed to the checked path.

use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::advisory::CategorizedFindings;
use crate::analysis::{AnalysisReport, Diagnostic, DiagnosticCategory, FileReport, Severity};
use crate::runner::advisory_diagnostics;
use crate::sink::{to_host, HostDiagnostic};

/// Output formats accepted by `--format`.
pub const FORMATS: &[&str] = &["pretty", "json", "sarif", "host"];

// =============================================================================
// JSON Format
// =============================================================================

#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub version: &'static str,
    pub path: &'a str,
    pub passed: bool,
    pub files_scanned: usize,
    pub files_analyzed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub files: &'a [FileReport],
    pub project: &'a [Diagnostic],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<JsonAdvisory<'a>>,
}

#[derive(Serialize)]
pub struct JsonAdvisory<'a> {
    pub findings: &'a CategorizedFindings,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn to_json(path: &str, report: &AnalysisReport) -> anyhow::Result<String> {
    let json = JsonReport {
        version: env!("CARGO_PKG_VERSION"),
        path,
        passed: !report.has_errors(),
        files_scanned: report.scanned,
        files_analyzed: report.files.len(),
        errors: report.count(Severity::Error),
        warnings: report.count(Severity::Warning),
        infos: report.count(Severity::Info),
        files: &report.files,
        project: &report.project,
        advisory: report.advisory.as_ref().map(|findings| JsonAdvisory {
            findings,
            diagnostics: advisory_diagnostics(findings),
        }),
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Write results in JSON format.
pub fn write_json(path: &str, report: &AnalysisReport) -> anyhow::Result<()> {
    println!("{}", to_json(path, report)?);
    Ok(())
}

// =============================================================================
// Host Format
// =============================================================================

/// Project-level diagnostics followed by any advisory ones.
fn path_diagnostics(report: &AnalysisReport) -> Vec<Diagnostic> {
    let mut diagnostics = report.project.clone();
    if let Some(findings) = &report.advisory {
        diagnostics.extend(advisory_diagnostics(findings));
    }
    diagnostics
}

/// Host diagnostics per file. Project and advisory diagnostics are filed
/// under `path`.
pub fn to_host_json(path: &str, report: &AnalysisReport) -> anyhow::Result<String> {
    let mut by_file: BTreeMap<&str, Vec<HostDiagnostic>> = BTreeMap::new();
    for file in &report.files {
        by_file
            .entry(file.path.as_str())
            .or_default()
            .extend(file.diagnostics.iter().map(to_host));
    }
    let at_path = path_diagnostics(report);
    if !at_path.is_empty() {
        by_file
            .entry(path)
            .or_default()
            .extend(at_path.iter().map(to_host));
    }
    Ok(serde_json::to_string_pretty(&by_file)?)
}

pub fn write_host(path: &str, report: &AnalysisReport) -> anyhow::Result<()> {
    println!("{}", to_host_json(path, report)?);
    Ok(())
}

// =============================================================================
// SARIF Format
// =============================================================================

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const TOOL_NAME: &str = "mappcheck";

#[derive(Serialize)]
struct SarifReport {
    version: String,
    #[serde(rename = "$schema")]
    schema: String,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
struct SarifDriver {
    name: String,
    version: String,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
struct SarifRule {
    id: String,
    #[serde(rename = "shortDescription")]
    short_description: SarifMessage,
    #[serde(rename = "defaultConfiguration")]
    default_config: SarifRuleConfig,
}

#[derive(Serialize)]
struct SarifRuleConfig {
    level: String,
}

#[derive(Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifact,
    region: SarifRegion,
}

#[derive(Serialize)]
struct SarifArtifact {
    uri: String,
}

#[derive(Serialize)]
struct SarifRegion {
    #[serde(rename = "startLine")]
    start_line: usize,
    #[serde(rename = "startColumn")]
    start_column: usize,
}

fn default_level(category: DiagnosticCategory) -> Severity {
    match category {
        DiagnosticCategory::MissingInitialization
        | DiagnosticCategory::InvalidInitialization
        | DiagnosticCategory::MethodArity => Severity::Error,
        DiagnosticCategory::ErrorHandling
        | DiagnosticCategory::MissingRequiredMethod
        | DiagnosticCategory::AdvisoryCritical => Severity::Warning,
        DiagnosticCategory::InitializationOrder | DiagnosticCategory::AdvisoryMissing => {
            Severity::Info
        }
    }
}

fn map_severity_to_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

fn sarif_result(uri: &str, d: &Diagnostic) -> SarifResult {
    SarifResult {
        rule_id: d.category.as_str().to_string(),
        level: map_severity_to_level(d.severity).to_string(),
        message: SarifMessage {
            text: d.message.clone(),
        },
        locations: vec![SarifLocation {
            physical_location: SarifPhysicalLocation {
                artifact_location: SarifArtifact {
                    uri: uri.replace('\\', "/"),
                },
                region: SarifRegion {
                    start_line: d.position.line + 1,
                    start_column: d.position.column + 1,
                },
            },
        }],
    }
}

pub fn to_sarif(path: &str, report: &AnalysisReport) -> anyhow::Result<String> {
    let rules = DiagnosticCategory::ALL
        .iter()
        .map(|c| SarifRule {
            id: c.as_str().to_string(),
            short_description: SarifMessage {
                text: c.description().to_string(),
            },
            default_config: SarifRuleConfig {
                level: map_severity_to_level(default_level(*c)).to_string(),
            },
        })
        .collect();

    let mut results: Vec<SarifResult> = report
        .files
        .iter()
        .flat_map(|f| f.diagnostics.iter().map(move |d| sarif_result(&f.path, d)))
        .collect();
    results.extend(path_diagnostics(report).iter().map(|d| sarif_result(path, d)));

    let sarif = SarifReport {
        version: SARIF_VERSION.to_string(),
        schema: SARIF_SCHEMA.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    rules,
                },
            },
            results,
        }],
    };

    Ok(serde_json::to_string_pretty(&sarif)?)
}

/// Write results in SARIF format.
pub fn write_sarif(path: &str, report: &AnalysisReport) -> anyhow::Result<()> {
    println!("{}", to_sarif(path, report)?);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(path: &str, config_path: Option<&str>, report: &AnalysisReport) {
    println!();
    print!("  ");
    print!("{}", "mappcheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    if let Some(config_path) = config_path {
        print!("  {}", "Config:   ".dimmed());
        println!("{}", config_path);
    }
    println!(
        "  {}{} scanned, {} using the SDK",
        "Files:    ".dimmed(),
        report.scanned,
        report.files.len()
    );
    println!();

    if !report.project.is_empty() {
        println!("  {}", "Project".blue().bold());
        println!();
        for d in &report.project {
            write_diagnostic(d);
        }
        println!();
    }

    for file in report.files.iter().filter(|f| !f.diagnostics.is_empty()) {
        write_file(file);
        println!();
    }

    if let Some(findings) = &report.advisory {
        write_advisory(findings);
        println!();
    }

    write_final_status(report);
    println!();
}

fn write_file(file: &FileReport) {
    print!("  {}", file.path.blue().bold());
    print!("  {}", format!("[{}]", file.technology).dimmed());
    if file.mode == crate::analysis::ScanMode::Degraded {
        print!(" {}", "(pattern scan)".yellow());
    }
    println!();
    println!();

    for d in &file.diagnostics {
        write_diagnostic(d);
    }
}

fn write_diagnostic(d: &Diagnostic) {
    write_severity_tag(d.severity);
    print!("   ");
    print!("{:<24}", d.category.as_str().dimmed());
    println!("{}", d.position.to_string().dimmed());
    println!("            {}", d.message);
    if let Some(suggestion) = &d.suggestion {
        for line in suggestion.lines() {
            println!("            {}", line.dimmed());
        }
    }
    println!();
}

fn write_severity_tag(severity: Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
        Severity::Info => print!("    {} ", "INFO ".blue()),
    }
}

fn write_advisory(findings: &CategorizedFindings) {
    println!("  {}", "Advisory analysis:".bold());
    for (title, entries) in [
        ("Critical issues", &findings.critical_issues),
        ("Missing implementations", &findings.missing_implementations),
        ("Improvements", &findings.improvements),
        ("Security concerns", &findings.security_concerns),
    ] {
        println!();
        println!("    {}", title.underline());
        for entry in entries {
            println!("      - {}", entry);
        }
    }
}

fn write_final_status(report: &AnalysisReport) {
    let errors = report.count(Severity::Error);
    let warnings = report.count(Severity::Warning);
    let infos = report.count(Severity::Info);

    print!(
        "  {}",
        format!("{} errors, {} warnings, {} info", errors, warnings, infos).dimmed()
    );
    print!("  ");
    if report.has_errors() {
        print!("{}", "FAILED".red());
    } else {
        print!("{}", "PASSED".green());
    }
    println!();
}
