//! mappcheck - Mapp SDK integration compliance checker.
//!
//! mappcheck verifies that a mobile application integrates the Mapp SDK the
//! way the SDK documents it: the initializer is called with every required
//! parameter, SDK methods receive the documented number of arguments, and
//! SDK calls are wrapped in error handling.
//!
//! # Architecture
//!
//! - `rules`: per-technology SDK documentation as static rule data
//! - `scan`: syntax-tree extraction of SDK call sites, with a regex fallback
//! - `analysis`: compliance checks producing positioned diagnostics
//! - `advisory`: optional language-model review and its response parser
//! - `sink`: conversion to editor (LSP-shaped) diagnostics
//! - `runner`: file discovery and run orchestration
//! - `config`, `report`, `cli`, `logging`: the command-line shell
//!
//! # Adding a Technology
//!
//! Add a variant to [`rules::Technology`], a rule module under
//! `src/rules/`, and a frontend mapping in [`scan::Dialect`].

pub mod advisory;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod logging;
pub mod report;
pub mod rules;
pub mod runner;
pub mod scan;
pub mod sink;

pub use advisory::{advise, AdvisoryCollaborator, CategorizedFindings, NarrativeResponseParser};
pub use analysis::{AnalysisReport, ComplianceAnalyzer, Diagnostic, DiagnosticCategory, Severity};
pub use config::Config;
pub use rules::{classify, lookup, Technology, TechnologyRuleSet};
pub use runner::{FsStore, Runner, SourceStore};
pub use scan::{ScanOutcome, SourceScanner, SyntaxTree};
pub use sink::{to_host, HostDiagnostic, HostSeverity};
