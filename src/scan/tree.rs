//! Arena syntax tree produced by the structural frontends.
//!
//! The tree keeps only what the compliance checks need: the lexical scopes
//! that can enclose a call (with parent links) and the call sites in file
//! order. Frontends build it bottom-up; once built it is never mutated
//! except to classify calls against a rule set.

use std::fmt;

use serde::Serialize;

use crate::rules::TechnologyRuleSet;

/// Source position, 0-indexed line and column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Start of the file.
    pub const ORIGIN: Position = Position { line: 0, column: 0 };

    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Human-facing output is 1-indexed.
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Index of a scope in [`SyntaxTree::scopes`].
pub type ScopeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The whole file. Always scope 0.
    File,
    /// Any other brace-delimited region.
    Block,
    /// A try/catch (or do/catch, @try/@catch) region.
    Protected,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
}

/// One argument of a call, as far as the checks care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Positional,
    /// Labelled argument (`with: config`, `server: SERVER.L3`).
    Named(String),
    /// Object/map literal with the listed property keys.
    ObjectLiteral(Vec<String>),
}

/// What a call is, relative to the SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallKind {
    /// Bare call to the initializer identifier, e.g. `engage(...)`.
    Initializer,
    /// Call through the SDK facade, e.g. `MappSdk.setAlias(...)`.
    FacadeMethod { method: String },
    Unrecognized,
}

/// A located invocation.
#[derive(Debug, Clone)]
pub struct CallSite {
    /// Callee text with whitespace removed, e.g. `MappSdk.shared.engage`.
    pub callee: String,
    pub kind: CallKind,
    pub arguments: Vec<Argument>,
    pub position: Position,
    pub scope: ScopeId,
}

impl CallSite {
    pub fn new(callee: String, arguments: Vec<Argument>, position: Position, scope: ScopeId) -> Self {
        Self {
            callee,
            kind: CallKind::Unrecognized,
            arguments,
            position,
            scope,
        }
    }

    /// Receiver part of the callee (`MappSdk` in `MappSdk.isReady`).
    pub fn receiver(&self) -> Option<&str> {
        self.callee.rsplit_once('.').map(|(recv, _)| recv)
    }

    /// Member part of the callee (the whole callee for a bare call).
    pub fn member(&self) -> &str {
        self.callee
            .rsplit_once('.')
            .map(|(_, member)| member)
            .unwrap_or(&self.callee)
    }

    /// The argument is a single object literal, e.g. `engage({ sdkKey: k })`.
    pub fn object_literal_keys(&self) -> Option<&[String]> {
        match self.arguments.as_slice() {
            [Argument::ObjectLiteral(keys)] => Some(keys),
            _ => None,
        }
    }

    fn classify(&self, rules: &TechnologyRuleSet) -> CallKind {
        match self.receiver() {
            None if self.callee == rules.initialization.method => CallKind::Initializer,
            Some(recv) if recv == rules.facade => CallKind::FacadeMethod {
                method: self.member().to_string(),
            },
            _ => CallKind::Unrecognized,
        }
    }
}

/// Scopes and call sites of one parsed file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    scopes: Vec<Scope>,
    calls: Vec<CallSite>,
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxTree {
    /// Create a tree holding only the file scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                kind: ScopeKind::File,
                parent: None,
            }],
            calls: Vec::new(),
        }
    }

    pub const FILE_SCOPE: ScopeId = 0;

    /// Add a scope nested in `parent`.
    pub fn add_scope(&mut self, kind: ScopeKind, parent: ScopeId) -> ScopeId {
        self.scopes.push(Scope {
            kind,
            parent: Some(parent),
        });
        self.scopes.len() - 1
    }

    pub fn push_call(&mut self, call: CallSite) {
        self.calls.push(call);
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Call sites in file order.
    pub fn calls(&self) -> &[CallSite] {
        &self.calls
    }

    /// Whether `scope` or any of its ancestors is a protected block.
    pub fn is_protected(&self, scope: ScopeId) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            match self.scopes.get(id) {
                Some(s) if s.kind == ScopeKind::Protected => return true,
                Some(s) => current = s.parent,
                None => return false,
            }
        }
        false
    }

    /// Tag every call with its [`CallKind`] under `rules`.
    pub fn classify(&mut self, rules: &TechnologyRuleSet) {
        for call in &mut self.calls {
            call.kind = call.classify(rules);
        }
    }

    /// Restore file order after a frontend emitted calls out of order.
    pub(crate) fn sort_calls(&mut self) {
        self.calls.sort_by_key(|c| c.position);
    }
}
