//! Lexical frontend for Dart and Kotlin.
//!
//! No tree-sitter grammar for either dialect is compatible with the
//! tree-sitter version used here, so these files are analyzed from their
//! token stream instead: strings and comments are skipped, brackets are
//! matched, and every `{` opens a scope. A scope is protected when it is the
//! body of `try`, `catch (...)`, `finally`, or Dart's `on Type`. Calls are
//! identifier chains immediately followed by `(`.
//!
//! Malformed input (unterminated strings or comments, unbalanced brackets)
//! yields no tree so the caller can fall back to pattern scanning.

use thiserror::Error;
use tracing::debug;

use super::tree::{Argument, CallSite, Position, ScopeId, ScopeKind, SyntaxTree};
use super::Frontend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Dart,
    Kotlin,
}

#[derive(Debug, Error)]
pub enum LexError {
    #[error("unterminated string starting at {0}")]
    UnterminatedString(Position),
    #[error("unterminated comment starting at {0}")]
    UnterminatedComment(Position),
    #[error("unbalanced bracket at {0}")]
    Unbalanced(Position),
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Str(String),
    Punct(char),
    Number,
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    pos: Position,
}

impl Token {
    fn is_punct(&self, c: char) -> bool {
        self.tok == Tok::Punct(c)
    }

    fn ident(&self) -> Option<&str> {
        match &self.tok {
            Tok::Ident(s) => Some(s),
            _ => None,
        }
    }

    fn is_ident(&self, word: &str) -> bool {
        self.ident() == Some(word)
    }
}

/// Identifiers that look like calls when followed by `(` but are not.
const CONTROL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "when", "return", "throw", "await", "assert", "on",
    "try", "do", "else", "sync", "async", "super", "this", "is", "as", "in",
];

/// Identifiers that may directly precede a call expression.
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return", "await", "throw", "yield", "new", "const", "else", "in", "is", "as", "case", "do",
    "try", "async", "sync",
];

/// Identifiers that introduce a declaration in Kotlin.
const KOTLIN_DECLARATION_KEYWORDS: &[&str] = &["fun", "class", "interface", "object", "constructor"];

struct Lexer {
    chars: Vec<char>,
    idx: usize,
    line: usize,
    column: usize,
    flavor: Flavor,
}

impl Lexer {
    fn new(source: &str, flavor: Flavor) -> Self {
        Self {
            chars: source.chars().collect(),
            idx: 0,
            line: 0,
            column: 0,
            flavor,
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.idx + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = *self.chars.get(self.idx)?;
        self.idx += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn pos(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek(0) {
            let pos = self.pos();

            if c.is_whitespace() {
                self.bump();
                continue;
            }

            if c == '/' && self.peek(1) == Some('/') {
                while let Some(c) = self.peek(0) {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
                continue;
            }

            if c == '/' && self.peek(1) == Some('*') {
                self.skip_block_comment(pos)?;
                continue;
            }

            if c == '"' || c == '\'' {
                let text = self.string(pos, false)?;
                tokens.push(Token {
                    tok: Tok::Str(text),
                    pos,
                });
                continue;
            }

            if self.flavor == Flavor::Dart
                && c == 'r'
                && matches!(self.peek(1), Some('"') | Some('\''))
            {
                self.bump();
                let text = self.string(pos, true)?;
                tokens.push(Token {
                    tok: Tok::Str(text),
                    pos,
                });
                continue;
            }

            if self.flavor == Flavor::Kotlin && c == '`' {
                self.bump();
                let mut name = String::new();
                loop {
                    match self.bump() {
                        Some('`') => break,
                        Some('\n') | None => return Err(LexError::UnterminatedString(pos)),
                        Some(c) => name.push(c),
                    }
                }
                tokens.push(Token {
                    tok: Tok::Ident(name),
                    pos,
                });
                continue;
            }

            if c.is_alphabetic() || c == '_' || c == '$' {
                let mut name = String::new();
                while let Some(c) = self.peek(0) {
                    if c.is_alphanumeric() || c == '_' || c == '$' {
                        name.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    tok: Tok::Ident(name),
                    pos,
                });
                continue;
            }

            if c.is_ascii_digit() {
                while let Some(c) = self.peek(0) {
                    if c.is_alphanumeric() || c == '_' {
                        self.bump();
                    } else if c == '.' && self.peek(1).is_some_and(|n| n.is_ascii_digit()) {
                        self.bump();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    tok: Tok::Number,
                    pos,
                });
                continue;
            }

            self.bump();
            tokens.push(Token {
                tok: Tok::Punct(c),
                pos,
            });
        }

        Ok(tokens)
    }

    /// Skip a `/* */` comment. Both dialects allow nesting.
    fn skip_block_comment(&mut self, start: Position) -> Result<(), LexError> {
        let mut depth = 0usize;
        loop {
            match (self.peek(0), self.peek(1)) {
                (Some('/'), Some('*')) => {
                    self.bump();
                    self.bump();
                    depth += 1;
                }
                (Some('*'), Some('/')) => {
                    self.bump();
                    self.bump();
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                (Some(_), _) => {
                    self.bump();
                }
                (None, _) => return Err(LexError::UnterminatedComment(start)),
            }
        }
    }

    /// Read a string literal whose opening quote is the next char.
    /// Returns the literal text with interpolations removed.
    fn string(&mut self, start: Position, raw: bool) -> Result<String, LexError> {
        let quote = self
            .bump()
            .ok_or(LexError::UnterminatedString(start))?;
        let triple = self.peek(0) == Some(quote) && self.peek(1) == Some(quote);
        if triple {
            self.bump();
            self.bump();
        }
        // Kotlin triple-quoted strings are raw apart from templates.
        let escapes = !raw && !(triple && self.flavor == Flavor::Kotlin);

        let mut text = String::new();
        loop {
            let c = self.bump().ok_or(LexError::UnterminatedString(start))?;

            if escapes && c == '\\' {
                if let Some(next) = self.bump() {
                    text.push(next);
                }
                continue;
            }

            if c == quote {
                if !triple {
                    return Ok(text);
                }
                if self.peek(0) == Some(quote) && self.peek(1) == Some(quote) {
                    self.bump();
                    self.bump();
                    return Ok(text);
                }
                text.push(c);
                continue;
            }

            if c == '\n' && !triple {
                return Err(LexError::UnterminatedString(start));
            }

            if !raw && c == '$' && self.peek(0) == Some('{') {
                self.bump();
                self.skip_interpolation(start)?;
                continue;
            }

            text.push(c);
        }
    }

    /// Skip the body of `${ ... }` up to and including the closing brace.
    fn skip_interpolation(&mut self, start: Position) -> Result<(), LexError> {
        let mut depth = 1usize;
        while let Some(c) = self.peek(0) {
            match c {
                '"' | '\'' => {
                    let pos = self.pos();
                    self.string(pos, false)?;
                    continue;
                }
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.bump();
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.bump();
        }
        Err(LexError::UnterminatedString(start))
    }
}

/// Pair every opening bracket with its closing bracket, both directions.
fn match_brackets(tokens: &[Token]) -> Result<Vec<Option<usize>>, LexError> {
    let mut matching = vec![None; tokens.len()];
    let mut stack: Vec<(char, usize)> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        let Tok::Punct(c) = token.tok else {
            continue;
        };
        match c {
            '(' | '[' | '{' => stack.push((c, i)),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match stack.pop() {
                    Some((open, j)) if open == expected => {
                        matching[i] = Some(j);
                        matching[j] = Some(i);
                    }
                    _ => return Err(LexError::Unbalanced(token.pos)),
                }
            }
            _ => {}
        }
    }

    if let Some((_, j)) = stack.pop() {
        return Err(LexError::Unbalanced(tokens[j].pos));
    }
    Ok(matching)
}

struct Builder<'a> {
    tokens: &'a [Token],
    matching: Vec<Option<usize>>,
    flavor: Flavor,
}

impl<'a> Builder<'a> {
    fn build(&self) -> SyntaxTree {
        let mut tree = SyntaxTree::new();
        let mut stack: Vec<ScopeId> = vec![SyntaxTree::FILE_SCOPE];

        for (i, token) in self.tokens.iter().enumerate() {
            let current = stack.last().copied().unwrap_or(SyntaxTree::FILE_SCOPE);
            match token.tok {
                Tok::Punct('{') => {
                    let kind = if self.opens_protected(i) {
                        ScopeKind::Protected
                    } else {
                        ScopeKind::Block
                    };
                    stack.push(tree.add_scope(kind, current));
                }
                Tok::Punct('}') => {
                    if stack.len() > 1 {
                        stack.pop();
                    }
                }
                Tok::Punct('(') => {
                    if let Some(call) = self.call_at(i, current) {
                        tree.push_call(call);
                    }
                }
                _ => {}
            }
        }

        tree
    }

    fn opens_protected(&self, brace: usize) -> bool {
        let Some(prev) = brace.checked_sub(1).map(|p| &self.tokens[p]) else {
            return false;
        };

        if prev.is_ident("try") || prev.is_ident("finally") {
            return true;
        }

        if prev.is_punct(')') {
            if let Some(open) = self.matching[brace - 1] {
                return open > 0 && self.tokens[open - 1].is_ident("catch");
            }
        }

        // Dart: `on FormatException {`
        self.flavor == Flavor::Dart
            && prev.ident().is_some()
            && brace >= 2
            && self.tokens[brace - 2].is_ident("on")
    }

    /// Build the call whose argument list opens at `paren`, if it is one.
    fn call_at(&self, paren: usize, scope: ScopeId) -> Option<CallSite> {
        let member_idx = paren.checked_sub(1)?;
        let member = self.tokens[member_idx].ident()?;
        if CONTROL_KEYWORDS.contains(&member) {
            return None;
        }

        let mut parts = vec![member.to_string()];
        let mut start = member_idx;
        let mut on_expression = false;
        while start > 0 && self.tokens[start - 1].is_punct('.') {
            let mut dot = start - 1;
            // `a?.b` and Dart's `a!.b`
            if dot > 0 && (self.tokens[dot - 1].is_punct('?') || self.tokens[dot - 1].is_punct('!')) {
                dot -= 1;
            }
            match dot.checked_sub(1).and_then(|p| self.tokens[p].ident()) {
                Some(name) => {
                    parts.push(name.to_string());
                    start = dot - 1;
                }
                None => {
                    on_expression = true;
                    break;
                }
            }
        }

        let close = self.matching[paren]?;
        if !on_expression && self.is_declaration(start, parts.len(), close) {
            return None;
        }

        parts.reverse();
        let mut callee = parts.join(".");
        if on_expression {
            callee = format!("<expr>.{}", callee);
        }

        Some(CallSite::new(
            callee,
            self.arguments(paren, close),
            self.tokens[start].pos,
            scope,
        ))
    }

    fn is_declaration(&self, start: usize, chain_len: usize, close: usize) -> bool {
        let Some(prev) = start.checked_sub(1).map(|p| &self.tokens[p]) else {
            return false;
        };

        match self.flavor {
            Flavor::Kotlin => prev
                .ident()
                .is_some_and(|w| KOTLIN_DECLARATION_KEYWORDS.contains(&w)),
            Flavor::Dart => {
                if chain_len != 1 {
                    return false;
                }
                if let Some(word) = prev.ident() {
                    return !EXPRESSION_KEYWORDS.contains(&word);
                }
                // `Future<void> name(...) {`
                prev.is_punct('>') && self.opens_body(close + 1)
            }
        }
    }

    fn opens_body(&self, idx: usize) -> bool {
        match self.tokens.get(idx) {
            Some(t) if t.is_punct('{') => true,
            Some(t) if t.is_ident("async") || t.is_ident("sync") => true,
            Some(t) if t.is_punct('=') => self.tokens.get(idx + 1).is_some_and(|n| n.is_punct('>')),
            _ => false,
        }
    }

    /// Split the tokens strictly between `open` and `close` on top-level
    /// commas. Empty segments (trailing commas) are dropped.
    fn segments(&self, open: usize, close: usize) -> Vec<(usize, usize)> {
        let mut segments = Vec::new();
        let mut seg_start = open + 1;
        let mut k = open + 1;

        while k < close {
            match self.tokens[k].tok {
                Tok::Punct('(') | Tok::Punct('[') | Tok::Punct('{') => {
                    k = self.matching[k].map_or(k + 1, |m| m + 1);
                    continue;
                }
                Tok::Punct(',') => {
                    if k > seg_start {
                        segments.push((seg_start, k));
                    }
                    seg_start = k + 1;
                }
                _ => {}
            }
            k += 1;
        }
        if close > seg_start {
            segments.push((seg_start, close));
        }
        segments
    }

    fn arguments(&self, open: usize, close: usize) -> Vec<Argument> {
        self.segments(open, close)
            .into_iter()
            .map(|(from, to)| self.argument(from, to))
            .collect()
    }

    fn argument(&self, from: usize, to: usize) -> Argument {
        let first = &self.tokens[from];
        let second = self.tokens.get(from + 1).filter(|_| from + 1 < to);

        if let (Some(label), Some(sep)) = (first.ident(), second) {
            match self.flavor {
                Flavor::Dart if sep.is_punct(':') => return Argument::Named(label.to_string()),
                Flavor::Kotlin
                    if sep.is_punct('=')
                        && !self.tokens.get(from + 2).is_some_and(|t| t.is_punct('=')) =>
                {
                    return Argument::Named(label.to_string())
                }
                _ => {}
            }
        }

        if self.flavor == Flavor::Dart && first.is_punct('{') && self.matching[from] == Some(to - 1) {
            return Argument::ObjectLiteral(self.literal_keys(from, to - 1));
        }

        Argument::Positional
    }

    fn literal_keys(&self, open: usize, close: usize) -> Vec<String> {
        self.segments(open, close)
            .into_iter()
            .filter(|&(from, to)| from + 1 < to && self.tokens[from + 1].is_punct(':'))
            .filter_map(|(from, _)| match &self.tokens[from].tok {
                Tok::Ident(name) | Tok::Str(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Token-level frontend for one flavor.
pub struct LexicalFrontend {
    flavor: Flavor,
}

impl LexicalFrontend {
    pub fn new(flavor: Flavor) -> Self {
        Self { flavor }
    }

    fn try_parse(&self, source: &str) -> Result<SyntaxTree, LexError> {
        let tokens = Lexer::new(source, self.flavor).tokenize()?;
        let matching = match_brackets(&tokens)?;
        let builder = Builder {
            tokens: &tokens,
            matching,
            flavor: self.flavor,
        };
        Ok(builder.build())
    }
}

impl Frontend for LexicalFrontend {
    fn name(&self) -> &'static str {
        match self.flavor {
            Flavor::Dart => "dart",
            Flavor::Kotlin => "kotlin",
        }
    }

    fn parse(&self, source: &str) -> Option<SyntaxTree> {
        match self.try_parse(source) {
            Ok(tree) => Some(tree),
            Err(e) => {
                debug!(frontend = self.name(), error = %e, "lexical parse failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dart(source: &str) -> SyntaxTree {
        LexicalFrontend::new(Flavor::Dart).parse(source).unwrap()
    }

    fn kotlin(source: &str) -> SyntaxTree {
        LexicalFrontend::new(Flavor::Kotlin).parse(source).unwrap()
    }

    fn callees(tree: &SyntaxTree) -> Vec<&str> {
        tree.calls().iter().map(|c| c.callee.as_str()).collect()
    }

    #[test]
    fn test_dart_positional_engage() {
        let tree = dart(r#"void main() { engage("k", "p", "L3", "a", "t"); }"#);
        assert_eq!(callees(&tree), vec!["engage"]);
        let call = &tree.calls()[0];
        assert_eq!(call.arguments.len(), 5);
        assert!(call.arguments.iter().all(|a| *a == Argument::Positional));
        assert_eq!(call.position, Position::new(0, 14));
    }

    #[test]
    fn test_dart_object_literal_keys() {
        let tree = dart(r#"engage({sdkKey: "k", 'server': "L3", ...rest});"#);
        let call = &tree.calls()[0];
        assert_eq!(
            call.object_literal_keys(),
            Some(&["sdkKey".to_string(), "server".to_string()][..])
        );
    }

    #[test]
    fn test_dart_named_arguments() {
        let tree = dart("MappSdk.logOut(pushEnabled: true);");
        assert_eq!(
            tree.calls()[0].arguments,
            vec![Argument::Named("pushEnabled".to_string())]
        );
    }

    #[test]
    fn test_dart_try_catch_scopes() {
        let source = r#"
Future<void> init() async {
  try {
    await MappSdk.engage("k", "", SERVER.L3, "a", "t");
  } catch (e) {
    MappSdk.isReady();
  }
  MappSdk.setPushEnabled(true);
}
"#;
        let tree = dart(source);
        assert_eq!(
            callees(&tree),
            vec!["MappSdk.engage", "MappSdk.isReady", "MappSdk.setPushEnabled"]
        );
        assert!(tree.is_protected(tree.calls()[0].scope));
        assert!(tree.is_protected(tree.calls()[1].scope));
        assert!(!tree.is_protected(tree.calls()[2].scope));
    }

    #[test]
    fn test_dart_on_clause_is_protected() {
        let tree = dart("try { a(); } on PlatformException { MappSdk.isReady(); }");
        let ready = &tree.calls()[1];
        assert!(tree.is_protected(ready.scope));
    }

    #[test]
    fn test_dart_declarations_are_not_calls() {
        let source = r#"
class Sdk {
  void engage(String key) {}
  Future<bool> isReady() async => true;
  Future<void> start() {
    return engage("x");
  }
}
"#;
        let tree = dart(source);
        assert_eq!(callees(&tree), vec!["engage"]);
        assert_eq!(tree.calls()[0].position.line, 5);
    }

    #[test]
    fn test_dart_strings_and_comments_are_skipped() {
        let source = r#"
// MappSdk.isReady()
/* MappSdk.isReady() /* nested */ */
final s = "MappSdk.isReady() ${user.name()}";
final t = '''MappSdk.getAlias()''';
final u = r'\d+(';
MappSdk.getAlias();
"#;
        let tree = dart(source);
        assert_eq!(callees(&tree), vec!["MappSdk.getAlias"]);
    }

    #[test]
    fn test_dart_cascade_is_not_facade() {
        let tree = dart("builder..engage(a, b);");
        assert_eq!(callees(&tree), vec!["<expr>.engage"]);
    }

    #[test]
    fn test_malformed_sources_do_not_parse() {
        let frontend = LexicalFrontend::new(Flavor::Dart);
        assert!(frontend.parse("void main() { engage(").is_none());
        assert!(frontend.parse("final s = \"unterminated;\n").is_none());
        assert!(frontend.parse("/* open comment").is_none());
        assert!(frontend.parse("a(]").is_none());
    }

    #[test]
    fn test_kotlin_engage_in_try() {
        let source = r#"
class MainApplication : Application() {
    override fun onCreate() {
        super.onCreate()
        try {
            MappSdk.engage(applicationContext, config)
        } catch (exception: Exception) {
            Log.e("MappSDK", "Failed: ${exception.message}")
        }
        MappSdk?.setPushEnabled(enabled = true)
    }
}
"#;
        let tree = kotlin(source);
        assert_eq!(
            callees(&tree),
            vec![
                "Application",
                "super.onCreate",
                "MappSdk.engage",
                "Log.e",
                "MappSdk.setPushEnabled"
            ]
        );
        let engage = &tree.calls()[2];
        assert_eq!(engage.arguments.len(), 2);
        assert!(tree.is_protected(engage.scope));

        let push = &tree.calls()[4];
        assert_eq!(push.arguments, vec![Argument::Named("enabled".to_string())]);
        assert!(!tree.is_protected(push.scope));
    }

    #[test]
    fn test_kotlin_fun_declaration_is_not_call() {
        let tree = kotlin("fun engage(a: Int, b: Int) { check(a == b) }");
        assert_eq!(callees(&tree), vec!["check"]);
        assert_eq!(tree.calls()[0].arguments, vec![Argument::Positional]);
    }
}
