//! Tree-sitter frontend for JavaScript, TypeScript, Java and Swift.
//!
//! Each language is configured with a query that captures a call node
//! (`@call`) and its argument list (`@args`), plus the node kinds that count
//! as protected and plain block scopes. A tree containing ERROR or MISSING
//! nodes is rejected so that callers fall back to pattern scanning.

use std::collections::HashMap;

use once_cell::sync::OnceCell;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};
use tracing::debug;

use super::tree::{Argument, CallSite, Position, ScopeId, ScopeKind, SyntaxTree};
use super::Frontend;

const JS_CALL_QUERY: &str = r#"
(call_expression
  arguments: (arguments) @args
) @call
"#;

const JAVA_CALL_QUERY: &str = r#"
(method_invocation
  arguments: (argument_list) @args
) @call
"#;

// Trailing closures without a parenthesized list are not captured.
const SWIFT_CALL_QUERY: &str = r#"
(call_expression
  (call_suffix
    (value_arguments) @args
  )
) @call
"#;

/// Configuration for one tree-sitter language.
#[derive(Clone)]
pub struct Config {
    pub language: Language,
    pub language_name: &'static str,
    /// Query capturing `@call` and `@args`.
    pub call_query: &'static str,
    pub protected_kinds: &'static [&'static str],
    pub block_kinds: &'static [&'static str],
    /// How to read one argument node.
    pub argument_style: ArgumentStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentStyle {
    /// JS/TS: `object` arguments expose their keys.
    ObjectLiterals,
    /// Java: every argument is positional.
    Positional,
    /// Swift: `value_argument` with an optional label.
    Labelled,
}

pub fn javascript() -> Config {
    Config {
        language: tree_sitter_javascript::LANGUAGE.into(),
        language_name: "javascript",
        call_query: JS_CALL_QUERY,
        protected_kinds: &["try_statement"],
        block_kinds: &["statement_block", "class_body", "arrow_function"],
        argument_style: ArgumentStyle::ObjectLiterals,
    }
}

pub fn typescript() -> Config {
    Config {
        language: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        language_name: "typescript",
        ..javascript()
    }
}

pub fn tsx() -> Config {
    Config {
        language: tree_sitter_typescript::LANGUAGE_TSX.into(),
        language_name: "tsx",
        ..javascript()
    }
}

pub fn java() -> Config {
    Config {
        language: tree_sitter_java::LANGUAGE.into(),
        language_name: "java",
        call_query: JAVA_CALL_QUERY,
        protected_kinds: &["try_statement", "try_with_resources_statement"],
        block_kinds: &["block", "class_body", "lambda_expression"],
        argument_style: ArgumentStyle::Positional,
    }
}

pub fn swift() -> Config {
    Config {
        language: tree_sitter_swift::LANGUAGE.into(),
        language_name: "swift",
        call_query: SWIFT_CALL_QUERY,
        protected_kinds: &["do_statement"],
        block_kinds: &["function_body", "class_body", "lambda_literal"],
        argument_style: ArgumentStyle::Labelled,
    }
}

/// Tree-sitter based frontend.
pub struct TreeSitterFrontend {
    config: Config,
    query: OnceCell<Query>,
}

impl TreeSitterFrontend {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            query: OnceCell::new(),
        }
    }

    /// Call query, compiled on first use.
    fn query(&self) -> anyhow::Result<&Query> {
        let query = self
            .query
            .get_or_try_init(|| Query::new(&self.config.language, self.config.call_query))?;
        Ok(query)
    }

    fn parse_tree(&self, source: &str) -> anyhow::Result<tree_sitter::Tree> {
        let mut parser = Parser::new();
        parser.set_language(&self.config.language)?;
        parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse source"))
    }

    fn lower(&self, root: Node, source: &str) -> anyhow::Result<SyntaxTree> {
        let query = self.query()?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, root, source.as_bytes());

        let mut tree = SyntaxTree::new();
        // tree-sitter node id -> arena scope
        let mut scope_ids: HashMap<usize, ScopeId> = HashMap::new();

        while let Some(m) = matches.next() {
            let mut call_node = None;
            let mut args_node = None;

            for capture in m.captures {
                match query.capture_names()[capture.index as usize] {
                    "call" => call_node = Some(capture.node),
                    "args" => args_node = Some(capture.node),
                    _ => {}
                }
            }

            let (Some(call), Some(args)) = (call_node, args_node) else {
                continue;
            };

            let callee = callee_text(source, call, args);
            if callee.is_empty() {
                continue;
            }

            let scope = self.enclosing_scope(call, &mut tree, &mut scope_ids);
            let start = call.start_position();
            tree.push_call(CallSite::new(
                callee,
                self.arguments(args, source),
                Position::new(start.row, start.column),
                scope,
            ));
        }

        tree.sort_calls();
        Ok(tree)
    }

    /// Map the chain of scope-forming ancestors of `node` into the arena,
    /// creating scopes the first time they are seen.
    fn enclosing_scope(
        &self,
        node: Node,
        tree: &mut SyntaxTree,
        scope_ids: &mut HashMap<usize, ScopeId>,
    ) -> ScopeId {
        let mut chain = Vec::new();
        let mut current = node.parent();
        while let Some(n) = current {
            let kind = if self.config.protected_kinds.contains(&n.kind()) {
                Some(ScopeKind::Protected)
            } else if self.config.block_kinds.contains(&n.kind()) {
                Some(ScopeKind::Block)
            } else {
                None
            };
            if let Some(kind) = kind {
                chain.push((n.id(), kind));
            }
            current = n.parent();
        }

        let mut parent = SyntaxTree::FILE_SCOPE;
        for (id, kind) in chain.into_iter().rev() {
            parent = *scope_ids
                .entry(id)
                .or_insert_with(|| tree.add_scope(kind, parent));
        }
        parent
    }

    fn arguments(&self, args: Node, source: &str) -> Vec<Argument> {
        let mut cursor = args.walk();
        args.named_children(&mut cursor)
            .filter(|n| !n.kind().contains("comment"))
            .map(|n| match self.config.argument_style {
                ArgumentStyle::ObjectLiterals if n.kind() == "object" => {
                    Argument::ObjectLiteral(object_keys(n, source))
                }
                ArgumentStyle::Labelled => swift_argument(n, source),
                _ => Argument::Positional,
            })
            .collect()
    }
}

/// Callee text: everything between the call's start and its argument list,
/// without whitespace or optional-chaining marks.
fn callee_text(source: &str, call: Node, args: Node) -> String {
    source
        .get(call.start_byte()..args.start_byte())
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '?' && *c != '!')
        .collect()
}

fn node_text<'s>(node: Node, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

fn object_keys(object: Node, source: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut cursor = object.walk();
    for child in object.named_children(&mut cursor) {
        match child.kind() {
            "pair" => {
                if let Some(key) = child.child_by_field_name("key") {
                    let text = node_text(key, source);
                    keys.push(text.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string());
                }
            }
            "shorthand_property_identifier" => keys.push(node_text(child, source).to_string()),
            "method_definition" => {
                if let Some(name) = child.child_by_field_name("name") {
                    keys.push(node_text(name, source).to_string());
                }
            }
            _ => {}
        }
    }
    keys
}

fn swift_argument(arg: Node, source: &str) -> Argument {
    let mut cursor = arg.walk();
    let label = arg
        .named_children(&mut cursor)
        .find(|c| c.kind() == "value_argument_label");
    match label {
        Some(label) => Argument::Named(node_text(label, source).to_string()),
        None => Argument::Positional,
    }
}

impl Frontend for TreeSitterFrontend {
    fn name(&self) -> &'static str {
        self.config.language_name
    }

    fn parse(&self, source: &str) -> Option<SyntaxTree> {
        let parsed = match self.parse_tree(source) {
            Ok(t) => t,
            Err(e) => {
                debug!(frontend = self.name(), error = %e, "tree-sitter parse failed");
                return None;
            }
        };

        let root = parsed.root_node();
        if root.has_error() {
            debug!(frontend = self.name(), "syntax errors in source");
            return None;
        }

        match self.lower(root, source) {
            Ok(tree) => Some(tree),
            Err(e) => {
                debug!(frontend = self.name(), error = %e, "call query failed");
                None
            }
        }
    }
}
