//! Compliance analysis over one file's scan outcome.
//!
//! # Checks
//!
//! With a syntax tree:
//!
//! - **Initialization**: the initializer call must supply every required
//!   parameter, either positionally (by count) or as keys of a single
//!   object literal. A file with neither an initializer nor any facade call
//!   gets one `missing_initialization` error at the origin.
//! - **Arity**: a facade call to a documented method with fewer arguments
//!   than the method's parameter list is an error.
//! - **Error handling**: a facade call with no protected scope among its
//!   ancestors is a warning.
//!
//! Without a tree, the found-method set from the pattern scan is diffed
//! against the rule set's required methods.

mod types;

use std::collections::BTreeSet;

use crate::rules::TechnologyRuleSet;
use crate::scan::{CallKind, CallSite, Position, ScanOutcome, SourceScanner, SyntaxTree};

pub use types::{
    AnalysisReport, Diagnostic, DiagnosticCategory, FileReport, ScanMode, Severity,
    SourceAnalysis,
};

/// Stateless checker for one technology's rule set.
pub struct ComplianceAnalyzer {
    rules: &'static TechnologyRuleSet,
}

impl ComplianceAnalyzer {
    pub fn new(rules: &'static TechnologyRuleSet) -> Self {
        Self { rules }
    }

    /// Whether an initializer call supplies all required parameters.
    pub fn check_initialization(&self, call: &CallSite) -> bool {
        let required = self.rules.initialization.required_parameters();

        if let Some(keys) = call.object_literal_keys() {
            return required.iter().all(|name| keys.iter().any(|k| k == name));
        }

        call.arguments.len() >= required.len()
    }

    /// Analyze a scan outcome. Diagnostics come back in file order.
    pub fn analyze(&self, scanner: &SourceScanner, outcome: &ScanOutcome) -> Vec<Diagnostic> {
        let mut diagnostics = match outcome {
            ScanOutcome::Structured(tree) => self.analyze_tree(scanner, tree),
            ScanOutcome::Degraded(found) => self.analyze_degraded(found),
        };
        diagnostics.sort_by_key(|d| d.position);
        diagnostics
    }

    /// Scan and analyze `source` in one step.
    pub fn analyze_source(&self, file_name: &str, source: &str) -> SourceAnalysis {
        let scanner = SourceScanner::for_file(file_name, self.rules);
        let outcome = scanner.scan(source);
        let mode = match outcome {
            ScanOutcome::Structured(_) => ScanMode::Structured,
            ScanOutcome::Degraded(_) => ScanMode::Degraded,
        };
        SourceAnalysis {
            mode,
            initialized: self.initializes(&scanner, &outcome),
            diagnostics: self.analyze(&scanner, &outcome),
        }
    }

    /// Whether the scanned file calls the initializer at all, valid or not.
    pub fn initializes(&self, scanner: &SourceScanner, outcome: &ScanOutcome) -> bool {
        match outcome {
            ScanOutcome::Structured(tree) => scanner.find_initializer_call(tree).is_some(),
            ScanOutcome::Degraded(found) => found.contains(self.rules.initialization.method),
        }
    }

    fn analyze_tree(&self, scanner: &SourceScanner, tree: &SyntaxTree) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let facade_calls = scanner.find_facade_calls(tree);
        let init = &self.rules.initialization;

        match scanner.find_initializer_call(tree) {
            Some(call) => {
                if !self.check_initialization(call) {
                    diagnostics.push(
                        Diagnostic::new(
                            Severity::Error,
                            DiagnosticCategory::InvalidInitialization,
                            call.position,
                            format!(
                                "Invalid SDK initialization: {}() requires {}",
                                self.rules.qualified_initializer(),
                                init.required_parameters().join(", ")
                            ),
                        )
                        .with_suggestion(init.example),
                    );
                }
            }
            None if facade_calls.is_empty() => {
                diagnostics.push(self.missing_initialization());
            }
            None => {
                let dependent = facade_calls.iter().find(|c| match &c.kind {
                    CallKind::FacadeMethod { method } => self
                        .rules
                        .method(method)
                        .is_some_and(|m| m.requires_initialization),
                    _ => false,
                });
                if let Some(call) = dependent {
                    diagnostics.push(
                        Diagnostic::new(
                            Severity::Info,
                            DiagnosticCategory::InitializationOrder,
                            call.position,
                            format!(
                                "{}() requires an initialized SDK but {}() was not found in this file",
                                call.callee,
                                self.rules.qualified_initializer()
                            ),
                        )
                        .with_suggestion(init.example),
                    );
                }
            }
        }

        for call in facade_calls {
            let CallKind::FacadeMethod { method } = &call.kind else {
                continue;
            };

            if method != init.method {
                if let Some(spec) = self.rules.method(method) {
                    if call.arguments.len() < spec.arity() {
                        diagnostics.push(
                            Diagnostic::new(
                                Severity::Error,
                                DiagnosticCategory::MethodArity,
                                call.position,
                                format!("Method {} requires {} parameters", method, spec.arity()),
                            )
                            .with_suggestion(spec.example),
                        );
                    }
                }
            }

            if !tree.is_protected(call.scope) {
                diagnostics.push(
                    Diagnostic::new(
                        Severity::Warning,
                        DiagnosticCategory::ErrorHandling,
                        call.position,
                        format!("{}() call should be wrapped in a try-catch block", call.callee),
                    )
                    .with_suggestion(self.rules.error_handling.example),
                );
            }
        }

        diagnostics
    }

    fn analyze_degraded(&self, found: &BTreeSet<String>) -> Vec<Diagnostic> {
        self.rules
            .required_methods
            .iter()
            .filter(|name| !found.contains(**name))
            .map(|name| {
                let diagnostic = Diagnostic::new(
                    Severity::Warning,
                    DiagnosticCategory::MissingRequiredMethod,
                    Position::ORIGIN,
                    format!("Missing required Mapp SDK method: {}", name),
                );
                match self.rules.method(name) {
                    Some(spec) => diagnostic.with_suggestion(spec.example),
                    None => diagnostic,
                }
            })
            .collect()
    }

    fn missing_initialization(&self) -> Diagnostic {
        Diagnostic::new(
            Severity::Error,
            DiagnosticCategory::MissingInitialization,
            Position::ORIGIN,
            format!(
                "Missing SDK initialization: {}() not found",
                self.rules.qualified_initializer()
            ),
        )
        .with_suggestion(self.rules.initialization.example)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{lookup, Technology};
    use crate::scan::Argument;

    fn flutter() -> ComplianceAnalyzer {
        ComplianceAnalyzer::new(lookup(Technology::Flutter))
    }

    fn engage_call(arguments: Vec<Argument>) -> CallSite {
        CallSite::new("engage".to_string(), arguments, Position::ORIGIN, 0)
    }

    fn analyze_dart(source: &str) -> Vec<Diagnostic> {
        let analysis = flutter().analyze_source("lib/main.dart", source);
        assert_eq!(analysis.mode, ScanMode::Structured, "expected a structural parse");
        analysis.diagnostics
    }

    #[test]
    fn test_positional_initialization_by_count() {
        let analyzer = flutter();
        for n in 5..=10 {
            let call = engage_call(vec![Argument::Positional; n]);
            assert!(analyzer.check_initialization(&call), "{} args", n);
        }
        let short = engage_call(vec![Argument::Positional; 4]);
        assert!(!analyzer.check_initialization(&short));
    }

    #[test]
    fn test_object_literal_initialization_requires_every_key() {
        let analyzer = flutter();
        let all = ["sdkKey", "googleProjectId", "server", "appId", "tenantId"];

        let full = engage_call(vec![Argument::ObjectLiteral(
            all.iter().map(|s| s.to_string()).chain(["extra".to_string()]).collect(),
        )]);
        assert!(analyzer.check_initialization(&full));

        for skip in 0..all.len() {
            let keys = all
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, s)| s.to_string())
                .collect();
            let call = engage_call(vec![Argument::ObjectLiteral(keys)]);
            assert!(!analyzer.check_initialization(&call), "missing {}", all[skip]);
        }

        let wrong_case = engage_call(vec![Argument::ObjectLiteral(
            ["SDKKEY", "googleProjectId", "server", "appId", "tenantId"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )]);
        assert!(!analyzer.check_initialization(&wrong_case));
    }

    #[test]
    fn test_valid_positional_engage_source() {
        let diagnostics =
            analyze_dart(r#"try { engage("k", "p", "L3", "a", "t"); } catch (e) {}"#);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    }

    #[test]
    fn test_object_literal_engage_source_is_invalid() {
        let diagnostics = analyze_dart(r#"engage({sdkKey: "k"});"#);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].category, DiagnosticCategory::InvalidInitialization);
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert!(diagnostics[0].suggestion.is_some());
    }

    #[test]
    fn test_missing_arguments_yield_one_arity_error() {
        let diagnostics = analyze_dart("try { MappSdk.setAlias(); } catch (e) {}");
        let errors: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Method setAlias requires 1 parameters");
        assert_eq!(errors[0].suggestion.as_deref(), Some("MappSdk.setAlias(\"your_alias\");"));
    }

    #[test]
    fn test_unknown_members_are_not_arity_checked() {
        let diagnostics = analyze_dart("try { engage(1,2,3,4,5); MappSdk.somethingNew(); } catch (e) {}");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    }

    #[test]
    fn test_unprotected_call_warns_once() {
        let source = "void init() { engage(1,2,3,4,5); MappSdk.isReady(); }";
        let diagnostics = analyze_dart(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].category, DiagnosticCategory::ErrorHandling);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert!(diagnostics[0].message.contains("try-catch"));
        assert_eq!(diagnostics[0].position, Position::new(0, 33));

        let wrapped = "void init() { engage(1,2,3,4,5); try { MappSdk.isReady(); } catch (e) {} }";
        assert!(analyze_dart(wrapped).is_empty());
    }

    #[test]
    fn test_missing_initialization_at_origin() {
        let diagnostics = analyze_dart("void main() { print('hello'); }");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].category, DiagnosticCategory::MissingInitialization);
        assert_eq!(diagnostics[0].position, Position::ORIGIN);
        assert_eq!(
            diagnostics[0].message,
            "Missing SDK initialization: MappSdk.engage() not found"
        );
    }

    #[test]
    fn test_facade_calls_without_initializer_are_informational() {
        let diagnostics = analyze_dart("try { MappSdk.isPushEnabled(); } catch (e) {}");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].category, DiagnosticCategory::InitializationOrder);
        assert_eq!(diagnostics[0].severity, Severity::Info);
    }

    #[test]
    fn test_degraded_path_reports_missing_required_methods() {
        let analyzer = flutter();
        let SourceAnalysis {
            mode,
            initialized,
            diagnostics,
        } = analyzer.analyze_source(
            "lib/main.dart",
            "MappSdk.engage(a, b, c, d, e); MappSdk.isPushEnabled( {",
        );
        assert_eq!(mode, ScanMode::Degraded);
        assert!(initialized);
        let missing: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            missing,
            vec![
                "Missing required Mapp SDK method: setPushEnabled",
                "Missing required Mapp SDK method: handledPushOpen",
            ]
        );
        assert!(diagnostics
            .iter()
            .all(|d| d.position == Position::ORIGIN && d.severity == Severity::Warning));
    }

    #[test]
    fn test_diagnostics_are_in_file_order() {
        let source = "void a() {\n  MappSdk.logOut();\n}\nvoid b() {\n  engage(1);\n}\n";
        let diagnostics = analyze_dart(source);
        let lines: Vec<_> = diagnostics.iter().map(|d| d.position.line).collect();
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
        assert_eq!(diagnostics.len(), 3);
    }
}
