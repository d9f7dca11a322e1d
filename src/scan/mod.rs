//! Source scanning: locate SDK call sites in one file.
//!
//! The scanner first tries a structural parse through the frontend for the
//! file's dialect:
//!
//! - tree-sitter grammars for JavaScript, TypeScript, TSX, Java and Swift
//! - a lexical bracket-structure frontend for Dart and Kotlin
//! - none for Objective-C
//!
//! When no tree is produced (malformed input, no frontend, or the
//! `tree-sitter` feature disabled) the scanner degrades to the rule set's
//! per-method regular expressions, which yield only the set of methods seen.

mod fallback;
mod lexical;
mod tree;
#[cfg(feature = "tree-sitter")]
mod treesitter;

use std::collections::BTreeSet;
use std::path::Path;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::rules::{Technology, TechnologyRuleSet};

pub use lexical::{Flavor, LexError, LexicalFrontend};
pub use tree::{Argument, CallKind, CallSite, Position, Scope, ScopeId, ScopeKind, SyntaxTree};

/// A structural parser for one dialect.
///
/// Returns `None` on malformed input; never panics on user text.
pub trait Frontend: Send + Sync {
    /// Frontend identifier used in logs (e.g. "dart", "tsx").
    fn name(&self) -> &'static str;

    /// Parse source into scopes and unclassified call sites.
    fn parse(&self, source: &str) -> Option<SyntaxTree>;
}

/// Concrete source language of a file, finer-grained than [`Technology`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    JavaScript,
    TypeScript,
    Tsx,
    Java,
    Swift,
    Dart,
    Kotlin,
    ObjectiveC,
}

impl Dialect {
    /// Pick the dialect from the file extension, or from the technology when
    /// the extension says nothing.
    pub fn detect(file_name: &str, technology: Technology) -> Dialect {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("js") | Some("jsx") | Some("mjs") => Dialect::JavaScript,
            Some("ts") => Dialect::TypeScript,
            Some("tsx") => Dialect::Tsx,
            Some("java") => Dialect::Java,
            Some("swift") => Dialect::Swift,
            Some("dart") => Dialect::Dart,
            Some("kt") | Some("kts") => Dialect::Kotlin,
            Some("m") | Some("h") => Dialect::ObjectiveC,
            _ => Dialect::for_technology(technology),
        }
    }

    pub fn for_technology(technology: Technology) -> Dialect {
        match technology {
            Technology::Flutter => Dialect::Dart,
            Technology::ReactNative => Dialect::Tsx,
            Technology::AndroidKotlin => Dialect::Kotlin,
            Technology::AndroidJava => Dialect::Java,
            Technology::IosObjc => Dialect::ObjectiveC,
            Technology::IosSwift => Dialect::Swift,
        }
    }
}

static DART_FRONTEND: OnceCell<LexicalFrontend> = OnceCell::new();
static KOTLIN_FRONTEND: OnceCell<LexicalFrontend> = OnceCell::new();

#[cfg(feature = "tree-sitter")]
static JAVASCRIPT_FRONTEND: OnceCell<treesitter::TreeSitterFrontend> = OnceCell::new();
#[cfg(feature = "tree-sitter")]
static TYPESCRIPT_FRONTEND: OnceCell<treesitter::TreeSitterFrontend> = OnceCell::new();
#[cfg(feature = "tree-sitter")]
static TSX_FRONTEND: OnceCell<treesitter::TreeSitterFrontend> = OnceCell::new();
#[cfg(feature = "tree-sitter")]
static JAVA_FRONTEND: OnceCell<treesitter::TreeSitterFrontend> = OnceCell::new();
#[cfg(feature = "tree-sitter")]
static SWIFT_FRONTEND: OnceCell<treesitter::TreeSitterFrontend> = OnceCell::new();

/// Get the structural frontend for a dialect, if one is available.
pub fn frontend_for(dialect: Dialect) -> Option<&'static dyn Frontend> {
    match dialect {
        Dialect::Dart => Some(DART_FRONTEND.get_or_init(|| LexicalFrontend::new(Flavor::Dart))),
        Dialect::Kotlin => {
            Some(KOTLIN_FRONTEND.get_or_init(|| LexicalFrontend::new(Flavor::Kotlin)))
        }
        Dialect::ObjectiveC => None,
        #[cfg(feature = "tree-sitter")]
        Dialect::JavaScript => Some(JAVASCRIPT_FRONTEND.get_or_init(|| {
            treesitter::TreeSitterFrontend::new(treesitter::javascript())
        })),
        #[cfg(feature = "tree-sitter")]
        Dialect::TypeScript => Some(TYPESCRIPT_FRONTEND.get_or_init(|| {
            treesitter::TreeSitterFrontend::new(treesitter::typescript())
        })),
        #[cfg(feature = "tree-sitter")]
        Dialect::Tsx => Some(
            TSX_FRONTEND.get_or_init(|| treesitter::TreeSitterFrontend::new(treesitter::tsx())),
        ),
        #[cfg(feature = "tree-sitter")]
        Dialect::Java => Some(
            JAVA_FRONTEND.get_or_init(|| treesitter::TreeSitterFrontend::new(treesitter::java())),
        ),
        #[cfg(feature = "tree-sitter")]
        Dialect::Swift => Some(
            SWIFT_FRONTEND
                .get_or_init(|| treesitter::TreeSitterFrontend::new(treesitter::swift())),
        ),
        #[cfg(not(feature = "tree-sitter"))]
        Dialect::JavaScript | Dialect::TypeScript | Dialect::Tsx | Dialect::Java | Dialect::Swift => {
            None
        }
    }
}

/// Result of scanning one file.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    Structured(SyntaxTree),
    /// Methods matched by the pattern table; no positions.
    Degraded(BTreeSet<String>),
}

/// Scanner bound to one rule set and dialect.
pub struct SourceScanner {
    rules: &'static TechnologyRuleSet,
    dialect: Dialect,
}

impl SourceScanner {
    pub fn new(rules: &'static TechnologyRuleSet, dialect: Dialect) -> Self {
        Self { rules, dialect }
    }

    /// Scanner for a file name under the given rule set.
    pub fn for_file(file_name: &str, rules: &'static TechnologyRuleSet) -> Self {
        Self::new(rules, Dialect::detect(file_name, rules.technology))
    }

    pub fn rules(&self) -> &'static TechnologyRuleSet {
        self.rules
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Parse `source` into a classified syntax tree.
    ///
    /// `None` means the text could not be parsed structurally.
    pub fn parse(&self, source: &str) -> Option<SyntaxTree> {
        let frontend = frontend_for(self.dialect)?;
        let mut tree = frontend.parse(source)?;
        tree.classify(self.rules);
        Some(tree)
    }

    /// Every call whose receiver is the SDK facade, in file order.
    pub fn find_facade_calls<'t>(&self, tree: &'t SyntaxTree) -> Vec<&'t CallSite> {
        tree.calls()
            .iter()
            .filter(|c| matches!(c.kind, CallKind::FacadeMethod { .. }))
            .collect()
    }

    /// The first bare initializer call, or failing that the first
    /// facade-qualified one (`MappSdk.engage(...)`).
    pub fn find_initializer_call<'t>(&self, tree: &'t SyntaxTree) -> Option<&'t CallSite> {
        let init = self.rules.initialization.method;
        tree.calls()
            .iter()
            .find(|c| c.kind == CallKind::Initializer)
            .or_else(|| {
                tree.calls().iter().find(|c| {
                    matches!(&c.kind, CallKind::FacadeMethod { method } if method == init)
                })
            })
    }

    /// Run the rule set's pattern table over raw text.
    pub fn scan_fallback(&self, source: &str) -> BTreeSet<String> {
        fallback::found_methods(self.rules.technology, source)
    }

    /// Structural scan with pattern fallback.
    pub fn scan(&self, source: &str) -> ScanOutcome {
        match self.parse(source) {
            Some(tree) => ScanOutcome::Structured(tree),
            None => {
                debug!(
                    technology = %self.rules.technology,
                    dialect = ?self.dialect,
                    "no syntax tree, falling back to pattern scan"
                );
                ScanOutcome::Degraded(self.scan_fallback(source))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::lookup;

    fn flutter() -> SourceScanner {
        SourceScanner::for_file("lib/main.dart", lookup(Technology::Flutter))
    }

    #[test]
    fn test_dialect_detection() {
        assert_eq!(Dialect::detect("a.tsx", Technology::ReactNative), Dialect::Tsx);
        assert_eq!(Dialect::detect("a.ts", Technology::ReactNative), Dialect::TypeScript);
        assert_eq!(Dialect::detect("a.jsx", Technology::ReactNative), Dialect::JavaScript);
        assert_eq!(Dialect::detect("a.kt", Technology::AndroidKotlin), Dialect::Kotlin);
        assert_eq!(Dialect::detect("a.m", Technology::IosObjc), Dialect::ObjectiveC);
        assert_eq!(Dialect::detect("notes.txt", Technology::Flutter), Dialect::Dart);
    }

    #[test]
    fn test_find_facade_calls_any_member() {
        let scanner = flutter();
        let tree = scanner
            .parse("MappSdk.isReady(); print('x'); MappSdk.unknownThing(1);")
            .unwrap();
        let calls: Vec<_> = scanner
            .find_facade_calls(&tree)
            .into_iter()
            .map(|c| c.callee.as_str())
            .collect();
        assert_eq!(calls, vec!["MappSdk.isReady", "MappSdk.unknownThing"]);
    }

    #[test]
    fn test_find_initializer_prefers_first_bare_call() {
        let scanner = flutter();
        let tree = scanner
            .parse("MappSdk.engage(1); engage(1, 2); engage(3);")
            .unwrap();
        let init = scanner.find_initializer_call(&tree).unwrap();
        assert_eq!(init.callee, "engage");
        assert_eq!(init.arguments.len(), 2);
    }

    #[test]
    fn test_find_initializer_accepts_qualified_call() {
        let scanner = flutter();
        let tree = scanner.parse("await MappSdk.engage(a, b, c, d, e);").unwrap();
        let init = scanner.find_initializer_call(&tree).unwrap();
        assert_eq!(init.callee, "MappSdk.engage");

        let none = scanner.parse("MappSdk.isReady();").unwrap();
        assert!(scanner.find_initializer_call(&none).is_none());
    }

    #[test]
    fn test_objc_always_degrades() {
        let scanner = SourceScanner::for_file("AppDelegate.m", lookup(Technology::IosObjc));
        assert!(scanner.parse("[MappSdk engageWithConfig:config];").is_none());
        match scanner.scan("[MappSdk engageWithConfig:config];") {
            ScanOutcome::Degraded(found) => assert!(found.contains("engage")),
            ScanOutcome::Structured(_) => panic!("expected degraded scan"),
        }
    }

    #[test]
    fn test_unparseable_source_degrades() {
        let scanner = flutter();
        let source = "void main() { MappSdk.isPushEnabled(; ";
        assert!(scanner.parse(source).is_none());
        match scanner.scan(source) {
            ScanOutcome::Degraded(found) => {
                assert!(found.contains("isPushEnabled"));
                assert!(!found.contains("engage"));
            }
            ScanOutcome::Structured(_) => panic!("expected degraded scan"),
        }
    }
}
