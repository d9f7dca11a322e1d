//! Segment free-form advisory text into categorized findings.
//!
//! The advisory collaborator is asked to answer under four headings
//! (`Critical Issues:`, `Missing Implementations:`, `Improvements Needed:`,
//! `Security Concerns:`) with `-` bullets, and to tag required methods as
//! `[FOUND]` / `[MISSING]`. Nothing guarantees it does. Parsing is a pure,
//! total function of the text: unrecognized content is dropped and every
//! category that ends up empty receives a fixed sentinel entry.
//!
//! Blank lines split the text into blocks. A block belongs to the section
//! named by its first non-bullet heading line; outside any section only
//! `[MISSING]` lines are kept.

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::rules::TechnologyRuleSet;

pub const NO_CRITICAL_ISSUES: &str = "No critical issues found";
pub const ALL_METHODS_IMPLEMENTED: &str = "All required methods implemented";
pub const NO_IMPROVEMENTS: &str = "No improvements needed";
pub const NO_SECURITY_CONCERNS: &str = "No security concerns identified";
pub const PARSING_ERROR: &str = "Analysis parsing error";

const MISSING_MARKER: &str = "[MISSING]";

/// Whether `entry` is one of the fixed placeholder entries.
pub fn is_sentinel(entry: &str) -> bool {
    matches!(
        entry,
        NO_CRITICAL_ISSUES
            | ALL_METHODS_IMPLEMENTED
            | NO_IMPROVEMENTS
            | NO_SECURITY_CONCERNS
            | PARSING_ERROR
    )
}

/// Advisory findings in four fixed categories. None is empty once produced
/// by [`NarrativeResponseParser::parse`] or [`CategorizedFindings::critical`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedFindings {
    pub critical_issues: Vec<String>,
    pub missing_implementations: Vec<String>,
    pub improvements: Vec<String>,
    pub security_concerns: Vec<String>,
}

impl CategorizedFindings {
    /// Findings holding a single critical entry, other categories defaulted.
    pub fn critical(message: impl Into<String>) -> Self {
        let mut findings = Self {
            critical_issues: vec![message.into()],
            ..Default::default()
        };
        findings.fill_defaults();
        findings
    }

    fn fill_defaults(&mut self) {
        for (list, sentinel) in [
            (&mut self.critical_issues, NO_CRITICAL_ISSUES),
            (&mut self.missing_implementations, ALL_METHODS_IMPLEMENTED),
            (&mut self.improvements, NO_IMPROVEMENTS),
            (&mut self.security_concerns, NO_SECURITY_CONCERNS),
        ] {
            if list.is_empty() {
                list.push(sentinel.to_string());
            }
        }
    }

    fn list_mut(&mut self, section: Section) -> &mut Vec<String> {
        match section {
            Section::Critical => &mut self.critical_issues,
            Section::Missing => &mut self.missing_implementations,
            Section::Improvements => &mut self.improvements,
            Section::Security => &mut self.security_concerns,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Critical,
    Missing,
    Improvements,
    Security,
}

const HEADINGS: &[(&str, Section)] = &[
    ("critical issues:", Section::Critical),
    ("missing implementations:", Section::Missing),
    ("improvements needed:", Section::Improvements),
    ("security concerns:", Section::Security),
];

fn heading(line: &str) -> Option<Section> {
    let lower = line.to_lowercase();
    HEADINGS
        .iter()
        .find(|(h, _)| lower.contains(h))
        .map(|(_, s)| *s)
}

/// Strip a leading `-`, `* ` or `•` marker. Horizontal rules are not bullets.
fn bullet(line: &str) -> Option<&str> {
    let rest = if let Some(rest) = line.strip_prefix('-') {
        rest
    } else if let Some(rest) = line.strip_prefix("* ") {
        rest
    } else if let Some(rest) = line.strip_prefix('•') {
        rest
    } else {
        return None;
    };

    let rest = rest.trim();
    if rest.is_empty() || rest.chars().all(|c| c == '-') {
        return None;
    }
    Some(rest)
}

/// Split on blank (whitespace-only) lines.
fn blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.trim());
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Parser bound to one technology's facade-qualified initializer name.
#[derive(Debug, Clone)]
pub struct NarrativeResponseParser {
    initializer: String,
}

impl NarrativeResponseParser {
    pub fn new(initializer: impl Into<String>) -> Self {
        Self {
            initializer: initializer.into(),
        }
    }

    pub fn for_rules(rules: &TechnologyRuleSet) -> Self {
        Self::new(rules.qualified_initializer())
    }

    /// Entry added to critical issues when the initializer is reported missing.
    pub fn missing_initializer_entry(&self) -> String {
        format!("Missing SDK initialization: {}() not found", self.initializer)
    }

    /// Parse advisory text. Never panics; always four non-empty lists.
    pub fn parse(&self, text: &str) -> CategorizedFindings {
        match panic::catch_unwind(AssertUnwindSafe(|| self.segment(text))) {
            Ok(mut findings) => {
                findings.fill_defaults();
                findings
            }
            Err(_) => {
                warn!("advisory response could not be parsed");
                CategorizedFindings::critical(PARSING_ERROR)
            }
        }
    }

    fn segment(&self, text: &str) -> CategorizedFindings {
        let mut findings = CategorizedFindings::default();
        let synthesized = self.missing_initializer_entry();
        let mut initializer_missing = false;

        for block in blocks(text) {
            // One section per block, taken from its first heading line.
            let section = block
                .iter()
                .filter(|l| bullet(l).is_none())
                .find_map(|l| heading(l));

            for line in block {
                if bullet(line).is_none() && heading(line).is_some() {
                    continue;
                }

                let tagged_missing = line.contains(MISSING_MARKER);
                if tagged_missing && line.contains(&self.initializer) {
                    initializer_missing = true;
                }

                match (bullet(line), section) {
                    (Some(item), Some(s)) => findings.list_mut(s).push(item.to_string()),
                    (Some(item), None) if tagged_missing => {
                        findings.missing_implementations.push(item.to_string())
                    }
                    (None, _) if tagged_missing => {
                        findings.missing_implementations.push(line.to_string())
                    }
                    _ => {}
                }
            }
        }

        if initializer_missing {
            findings.critical_issues.push(synthesized);
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> NarrativeResponseParser {
        NarrativeResponseParser::new("MappSdk.engage")
    }

    #[test]
    fn test_sections_and_synthesized_entry() {
        let text = "Critical Issues:\n- Foo bar\n\nMissing Implementations:\n- [MISSING] MappSdk.engage() not found\n";
        let findings = parser().parse(text);
        assert_eq!(
            findings.critical_issues,
            vec![
                "Foo bar".to_string(),
                "Missing SDK initialization: MappSdk.engage() not found".to_string()
            ]
        );
        assert_eq!(
            findings.missing_implementations,
            vec!["[MISSING] MappSdk.engage() not found".to_string()]
        );
        assert_eq!(findings.improvements, vec![NO_IMPROVEMENTS.to_string()]);
        assert_eq!(findings.security_concerns, vec![NO_SECURITY_CONCERNS.to_string()]);
    }

    #[test]
    fn test_empty_and_garbage_input_get_sentinels() {
        for text in ["", "   \n\n", "lorem ipsum\n\n---\n* * *", "\u{0}\u{fffd}"] {
            let findings = parser().parse(text);
            assert_eq!(findings.critical_issues, vec![NO_CRITICAL_ISSUES.to_string()]);
            assert_eq!(
                findings.missing_implementations,
                vec![ALL_METHODS_IMPLEMENTED.to_string()]
            );
            assert_eq!(findings.improvements, vec![NO_IMPROVEMENTS.to_string()]);
            assert_eq!(findings.security_concerns, vec![NO_SECURITY_CONCERNS.to_string()]);
        }
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "**Critical Issues:**\r\n- a\r\n\r\nImprovements Needed:\r\n* b\r\n• c\r\n";
        let first = parser().parse(text);
        let second = parser().parse(text);
        assert_eq!(first, second);
        assert_eq!(first.critical_issues, vec!["a".to_string()]);
        assert_eq!(first.improvements, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_method_status_block_without_heading() {
        let text = "Method status:\n- [FOUND] MappSdk.isPushEnabled()\n- [MISSING] MappSdk.handledPushOpen()\n[MISSING] MappSdk.engage()";
        let findings = parser().parse(text);
        assert_eq!(
            findings.missing_implementations,
            vec![
                "[MISSING] MappSdk.handledPushOpen()".to_string(),
                "[MISSING] MappSdk.engage()".to_string(),
            ]
        );
        assert_eq!(
            findings.critical_issues,
            vec!["Missing SDK initialization: MappSdk.engage() not found".to_string()]
        );
    }

    #[test]
    fn test_found_methods_are_not_reported_missing() {
        let text = "- [FOUND] MappSdk.engage()\n- [FOUND] MappSdk.setAlias()";
        let findings = parser().parse(text);
        assert_eq!(
            findings.missing_implementations,
            vec![ALL_METHODS_IMPLEMENTED.to_string()]
        );
        assert_eq!(findings.critical_issues, vec![NO_CRITICAL_ISSUES.to_string()]);
    }

    #[test]
    fn test_heading_text_inside_bullet_stays_in_its_section() {
        let text = "Critical Issues:\n- Security concerns: API key hardcoded in main.dart\n- Foo";
        let findings = parser().parse(text);
        assert_eq!(
            findings.critical_issues,
            vec![
                "Security concerns: API key hardcoded in main.dart".to_string(),
                "Foo".to_string(),
            ]
        );
        assert_eq!(findings.security_concerns, vec![NO_SECURITY_CONCERNS.to_string()]);
    }

    #[test]
    fn test_block_keeps_its_first_heading() {
        let text = "Improvements Needed:\n- Cache the SDK instance\nSecurity Concerns:\n- Rotate keys";
        let findings = parser().parse(text);
        assert_eq!(
            findings.improvements,
            vec!["Cache the SDK instance".to_string(), "Rotate keys".to_string()]
        );
        assert_eq!(findings.security_concerns, vec![NO_SECURITY_CONCERNS.to_string()]);
    }

    #[test]
    fn test_synthesized_entry_added_once() {
        let text = "Missing Implementations:\n- [MISSING] MappSdk.engage()\n\nCritical Issues:\n- [MISSING] MappSdk.engage() call";
        let findings = parser().parse(text);
        let synthesized = findings
            .critical_issues
            .iter()
            .filter(|e| e.starts_with("Missing SDK initialization"))
            .count();
        assert_eq!(synthesized, 1);
        assert_eq!(findings.critical_issues.len(), 2);
    }

    #[test]
    fn test_bullets_outside_sections_are_ignored() {
        let text = "Summary:\n- looks fine\n\nSecurity Concerns:\n- API key committed to source";
        let findings = parser().parse(text);
        assert_eq!(findings.critical_issues, vec![NO_CRITICAL_ISSUES.to_string()]);
        assert_eq!(
            findings.security_concerns,
            vec!["API key committed to source".to_string()]
        );
    }

    #[test]
    fn test_critical_constructor_fills_other_categories() {
        let findings = CategorizedFindings::critical("Analysis failed: timeout");
        assert_eq!(findings.critical_issues, vec!["Analysis failed: timeout".to_string()]);
        assert!(is_sentinel(&findings.missing_implementations[0]));
        assert!(is_sentinel(&findings.improvements[0]));
        assert!(is_sentinel(&findings.security_concerns[0]));
    }
}
