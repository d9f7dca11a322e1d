//! Conversion of diagnostics into the host editor's representation.
//!
//! The shape follows the Language Server Protocol `Diagnostic`: a zero-based
//! range, a numeric severity, a code and a source tag.

use serde::{Serialize, Serializer};

use crate::analysis::{Diagnostic, Severity};
use crate::scan::Position;

/// Source tag attached to every host diagnostic.
pub const SOURCE: &str = "mappcheck";

/// Host severity enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSeverity {
    Error = 1,
    Warning = 2,
    Information = 3,
}

impl HostSeverity {
    /// Map a severity label; anything other than error/warning is informational.
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "error" => HostSeverity::Error,
            "warning" => HostSeverity::Warning,
            _ => HostSeverity::Information,
        }
    }
}

impl From<Severity> for HostSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => HostSeverity::Error,
            Severity::Warning => HostSeverity::Warning,
            Severity::Info => HostSeverity::Information,
        }
    }
}

impl Serialize for HostSeverity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HostPosition {
    pub line: usize,
    pub character: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HostRange {
    pub start: HostPosition,
    pub end: HostPosition,
}

impl HostRange {
    /// One character wide, anchored at `position`.
    pub fn at(position: Position) -> Self {
        Self {
            start: HostPosition {
                line: position.line,
                character: position.column,
            },
            end: HostPosition {
                line: position.line,
                character: position.column + 1,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostDiagnostic {
    pub range: HostRange,
    pub message: String,
    pub severity: HostSeverity,
    pub code: &'static str,
    pub source: &'static str,
}

pub fn to_host(diagnostic: &Diagnostic) -> HostDiagnostic {
    HostDiagnostic {
        range: HostRange::at(diagnostic.position),
        message: diagnostic.message.clone(),
        severity: diagnostic.severity.into(),
        code: diagnostic.category.as_str(),
        source: SOURCE,
    }
}
