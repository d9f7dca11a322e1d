//! Core types for analysis results.

use serde::{Deserialize, Serialize};

use crate::advisory::CategorizedFindings;
use crate::rules::Technology;
use crate::scan::Position;

/// Severity levels for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Stable category codes for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCategory {
    MissingInitialization,
    InvalidInitialization,
    InitializationOrder,
    MethodArity,
    ErrorHandling,
    MissingRequiredMethod,
    // Findings reported by the advisory collaborator
    AdvisoryCritical,
    AdvisoryMissing,
}

impl DiagnosticCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCategory::MissingInitialization => "missing_initialization",
            DiagnosticCategory::InvalidInitialization => "invalid_initialization",
            DiagnosticCategory::InitializationOrder => "initialization_order",
            DiagnosticCategory::MethodArity => "method_arity",
            DiagnosticCategory::ErrorHandling => "error_handling",
            DiagnosticCategory::MissingRequiredMethod => "missing_required_method",
            DiagnosticCategory::AdvisoryCritical => "advisory_critical",
            DiagnosticCategory::AdvisoryMissing => "advisory_missing",
        }
    }

    /// Every category, in reporting order.
    pub const ALL: [DiagnosticCategory; 8] = [
        DiagnosticCategory::MissingInitialization,
        DiagnosticCategory::InvalidInitialization,
        DiagnosticCategory::InitializationOrder,
        DiagnosticCategory::MethodArity,
        DiagnosticCategory::ErrorHandling,
        DiagnosticCategory::MissingRequiredMethod,
        DiagnosticCategory::AdvisoryCritical,
        DiagnosticCategory::AdvisoryMissing,
    ];

    /// One-line description used by SARIF rule metadata.
    pub fn description(&self) -> &'static str {
        match self {
            DiagnosticCategory::MissingInitialization => "SDK initializer call not found",
            DiagnosticCategory::InvalidInitialization => {
                "SDK initializer called without all required parameters"
            }
            DiagnosticCategory::InitializationOrder => {
                "SDK method used in a file without an initializer call"
            }
            DiagnosticCategory::MethodArity => "SDK method called with too few arguments",
            DiagnosticCategory::ErrorHandling => "SDK call not wrapped in a try/catch block",
            DiagnosticCategory::MissingRequiredMethod => "Required SDK method not found",
            DiagnosticCategory::AdvisoryCritical => "Critical issue reported by advisory analysis",
            DiagnosticCategory::AdvisoryMissing => {
                "Missing implementation reported by advisory analysis"
            }
        }
    }
}

impl std::fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single positioned finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(flatten)]
    pub position: Position,
    pub category: DiagnosticCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        category: DiagnosticCategory,
        position: Position,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            position,
            category,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// How a file was scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    Structured,
    Degraded,
}

impl std::fmt::Display for ScanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanMode::Structured => write!(f, "structured"),
            ScanMode::Degraded => write!(f, "degraded"),
        }
    }
}

/// Result of analyzing one file's text.
#[derive(Debug, Clone)]
pub struct SourceAnalysis {
    pub mode: ScanMode,
    /// The file calls the initializer, valid or not.
    pub initialized: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Diagnostics for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: String,
    pub technology: Technology,
    pub mode: ScanMode,
    pub initialized: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

/// Results of one run over a project.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    pub files: Vec<FileReport>,
    /// Findings about the project as a whole, such as a missing initializer.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub project: Vec<Diagnostic>,
    /// Number of files read, including non-candidates.
    pub scanned: usize,
    /// Advisory findings, when an advisory collaborator was attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<CategorizedFindings>,
}

impl AnalysisReport {
    pub fn new() -> Self {
        Self::default()
    }

    fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.project
            .iter()
            .chain(self.files.iter().flat_map(|f| &f.diagnostics))
    }

    /// Check if there are any error-severity diagnostics.
    pub fn has_errors(&self) -> bool {
        self.diagnostics().any(|d| d.severity == Severity::Error)
    }

    /// Total number of diagnostics across the project and its files.
    pub fn diagnostic_count(&self) -> usize {
        self.diagnostics().count()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics().filter(|d| d.severity == severity).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_round_trip() {
        for s in [Severity::Error, Severity::Warning, Severity::Info] {
            assert_eq!(s.to_string().parse::<Severity>().unwrap(), s);
        }
        assert!("hint".parse::<Severity>().is_err());
    }

    #[test]
    fn test_category_ids_match_serde() {
        for c in DiagnosticCategory::ALL {
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.as_str()));
        }
    }

    #[test]
    fn test_diagnostic_serializes_flat_position() {
        let d = Diagnostic::new(
            Severity::Error,
            DiagnosticCategory::MethodArity,
            Position::new(4, 2),
            "Method setAlias requires 1 parameters",
        );
        let value = serde_json::to_value(&d).unwrap();
        assert_eq!(value["line"], 4);
        assert_eq!(value["column"], 2);
        assert_eq!(value["severity"], "error");
        assert_eq!(value["category"], "method_arity");
        assert!(value.get("suggestion").is_none());
    }
}
