//! Table-driven parser.
//!
//! The driver runs the LALR(1) automaton over the scanned tokens, with
//! comments and lexical errors filtered out, and builds the parse tree while
//! it reduces. A missing action is a syntax error: the parser reports it and
//! resynchronises (see [`recovery`]) instead of stopping, so every input
//! yields a [`ParseTree`], possibly without a root.

mod recovery;

use std::fmt;
use std::sync::Arc;

use text_size::{TextRange, TextSize};

use crate::grammar::{Grammar, ReduceAction, TerminalId, TerminalKind};
use crate::lalr::{Action, Automaton, StateId};
use crate::lexer::Token;
use crate::syntax::{Element, NodeData, NodeId, ParseTree};

/// Shifts that must succeed after a recovery before another syntax error is
/// reported.
const QUIET_SHIFTS: usize = 3;

/// Tokens the recovery may skip at one error.
const SKIP_WINDOW: usize = 3;

/// Expected terminals listed in one message.
const MAX_EXPECTED: usize = 8;

/// Limits for one parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Resynchronisations allowed before the parser gives up.
    pub max_recovery_attempts: usize,
    /// Diagnostics kept; a final note reports how many were dropped.
    pub max_diagnostics: usize,
    /// Tokens a resynchronisation candidate must shift without error.
    pub recovery_lookahead: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_recovery_attempts: 64,
            max_diagnostics: 100,
            recovery_lookahead: 3,
        }
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// A syntax or lexical error.
    Error,
    /// A note that does not make the parse fail.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

/// A problem found while scanning or parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line.
    pub line: u32,
    /// 1-based column, in characters.
    pub column: u32,
    /// Byte range the diagnostic points at.
    pub range: TextRange,
    /// Severity.
    pub severity: Severity,
    /// Message text.
    pub message: String,
}

impl Diagnostic {
    fn at_token(token: &Token, severity: Severity, message: String) -> Self {
        Self {
            line: token.line,
            column: token.column,
            range: token.range,
            severity,
            message,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.message, self.line, self.column)
    }
}

/// Parses `source` with a grammar and its automaton.
#[must_use]
pub fn parse(
    grammar: &Arc<Grammar>,
    automaton: &Automaton,
    source: &str,
    config: &ParserConfig,
) -> ParseTree {
    let tokens = crate::lexer::Scanner::new(grammar).scan(source);
    let stream: Vec<usize> = (0..tokens.len())
        .filter(|&index| !tokens[index].is_non_grammar() && !tokens[index].is_error())
        .collect();
    let terminals: Vec<TerminalId> = stream.iter().map(|&index| tokens[index].terminal).collect();

    let mut driver = Driver {
        grammar,
        automaton,
        config,
        tokens: &tokens,
        stream: &stream,
        terminals: &terminals,
        end: TextSize::of(source),
        nodes: Vec::new(),
        diagnostics: Vec::new(),
    };
    let root = driver.run();
    let Driver {
        nodes,
        mut diagnostics,
        ..
    } = driver;

    for token in tokens.iter().filter(|token| token.is_error()) {
        let message = match token.error {
            Some(error) => format!("{error}: `{}`", token.text.escape_debug()),
            None => format!("unexpected `{}`", token.text.escape_debug()),
        };
        diagnostics.push(Diagnostic::at_token(token, Severity::Error, message));
    }
    diagnostics.sort_by_key(|d| (d.range.start(), d.range.end()));
    if diagnostics.len() > config.max_diagnostics {
        let dropped = diagnostics.len() - config.max_diagnostics;
        diagnostics.truncate(config.max_diagnostics);
        let anchor = diagnostics.last().map_or(
            (1, 1, TextRange::empty(TextSize::from(0))),
            |last| (last.line, last.column, last.range),
        );
        diagnostics.push(Diagnostic {
            line: anchor.0,
            column: anchor.1,
            range: anchor.2,
            severity: Severity::Warning,
            message: format!("{dropped} more diagnostics not shown"),
        });
    }

    ParseTree::new(
        Arc::clone(grammar),
        Arc::from(source),
        tokens,
        nodes,
        root,
        diagnostics,
    )
}

struct Driver<'a> {
    grammar: &'a Grammar,
    automaton: &'a Automaton,
    config: &'a ParserConfig,
    tokens: &'a [Token],
    /// Indices into `tokens` of the tokens the automaton sees.
    stream: &'a [usize],
    terminals: &'a [TerminalId],
    end: TextSize,
    nodes: Vec<NodeData>,
    diagnostics: Vec<Diagnostic>,
}

impl Driver<'_> {
    fn terminal_at(&self, position: usize) -> TerminalId {
        self.terminals
            .get(position)
            .copied()
            .unwrap_or(TerminalId::EOF)
    }

    fn offset_at(&self, position: usize) -> TextSize {
        self.stream
            .get(position)
            .map_or(self.end, |&index| self.tokens[index].range.start())
    }

    fn run(&mut self) -> Option<NodeId> {
        let grammar = self.grammar;
        let mut states = vec![StateId::START];
        let mut values: Vec<Option<Element>> = vec![None];
        let mut position = 0;
        let mut attempts = 0;
        let mut since_recovery = QUIET_SHIFTS;

        loop {
            let terminal = self.terminal_at(position);
            let state = *states.last()?;
            match self.automaton.action(state, terminal) {
                Some(Action::Shift(next)) => {
                    states.push(next);
                    values.push(Some(Element::Token(self.stream[position])));
                    position += 1;
                    since_recovery += 1;
                }
                Some(Action::Reduce(production)) => {
                    let production = grammar.production(production);
                    let arity = production.rhs().len();
                    states.truncate(states.len() - arity);
                    let children = values.split_off(values.len() - arity);
                    let value = self.reduce(production.action(), children, position);
                    let Some(next) = self.automaton.goto(*states.last()?, production.lhs()) else {
                        tracing::error!(
                            nonterminal = grammar.nonterminal(production.lhs()).name(),
                            "missing goto entry"
                        );
                        return None;
                    };
                    states.push(next);
                    values.push(value);
                }
                Some(Action::Accept) => {
                    return match values.pop().flatten() {
                        Some(Element::Node(id)) => Some(id),
                        _ => None,
                    };
                }
                None => {
                    if since_recovery >= QUIET_SHIFTS {
                        self.report_unexpected(position, state);
                    }
                    attempts += 1;
                    if attempts > self.config.max_recovery_attempts {
                        tracing::trace!(attempts, "recovery limit reached");
                        self.give_up(position);
                        return None;
                    }
                    match recovery::find(
                        self.grammar,
                        self.automaton,
                        &states,
                        self.terminals,
                        position,
                        SKIP_WINDOW,
                        self.config.recovery_lookahead,
                    ) {
                        Some(found) => {
                            tracing::trace!(skip = found.skip, pop = found.pop, "resynchronised");
                            states.truncate(states.len() - found.pop);
                            values.truncate(values.len() - found.pop);
                            position += found.skip;
                            since_recovery = 0;
                        }
                        None if position >= self.terminals.len() => {
                            tracing::trace!("no recovery at end of input");
                            return None;
                        }
                        None => {
                            position = (position + SKIP_WINDOW + 1).min(self.terminals.len());
                            tracing::trace!(position, "discarded tokens");
                        }
                    }
                }
            }
        }
    }

    fn reduce(
        &mut self,
        action: ReduceAction,
        mut children: Vec<Option<Element>>,
        position: usize,
    ) -> Option<Element> {
        match action {
            ReduceAction::Node(kind)
            | ReduceAction::ListEmpty(kind)
            | ReduceAction::ListStart(kind) => {
                if matches!(action, ReduceAction::ListStart(_)) {
                    children.truncate(1);
                }
                let range = self
                    .covering_range(&children)
                    .unwrap_or_else(|| TextRange::empty(self.offset_at(position)));
                let id = NodeId(u32::try_from(self.nodes.len()).ok()?);
                self.nodes.push(NodeData {
                    kind,
                    children,
                    range,
                });
                Some(Element::Node(id))
            }
            ReduceAction::Unwrap => children.into_iter().next().flatten(),
            ReduceAction::Null | ReduceAction::Accept => None,
            ReduceAction::ListAppend { skip_separator } => {
                let mut rest = children.split_off(1.min(children.len()));
                let list = children.into_iter().next().flatten();
                if skip_separator && rest.len() == 2 {
                    rest.remove(0);
                }
                if let Some(Element::Node(id)) = list {
                    if let Some(extra) = self.covering_range(&rest) {
                        let node = &mut self.nodes[id.0 as usize];
                        node.range = if node.range.is_empty() {
                            extra
                        } else {
                            node.range.cover(extra)
                        };
                    }
                    self.nodes[id.0 as usize].children.extend(rest);
                }
                list
            }
        }
    }

    fn covering_range(&self, children: &[Option<Element>]) -> Option<TextRange> {
        children
            .iter()
            .flatten()
            .map(|element| match *element {
                Element::Node(id) => self.nodes[id.0 as usize].range,
                Element::Token(index) => self.tokens[index].range,
            })
            .filter(|range| !range.is_empty())
            .reduce(TextRange::cover)
    }

    /// The token an error is reported at. Errors at the end of input, or on a
    /// token that starts a later line, point at the previous token instead.
    fn anchor(&self, position: usize) -> Option<&Token> {
        let current = self.stream.get(position).map(|&index| &self.tokens[index]);
        let previous = position
            .checked_sub(1)
            .and_then(|p| self.stream.get(p))
            .map(|&index| &self.tokens[index]);
        match (current, previous) {
            (None, previous) => previous,
            (Some(current), Some(previous)) if current.line > previous.line => Some(previous),
            (current, _) => current,
        }
    }

    fn report_unexpected(&mut self, position: usize, state: StateId) {
        let found = match self.stream.get(position) {
            Some(&index) => self.describe_token(&self.tokens[index]),
            None => "end of input".to_string(),
        };
        let mut expected: Vec<String> = self
            .automaton
            .expected(state)
            .map(|terminal| self.describe_terminal(terminal))
            .collect();
        expected.sort();
        expected.dedup();
        let more = expected.len() > MAX_EXPECTED;
        expected.truncate(MAX_EXPECTED);
        let mut message = format!("unexpected {found}, expected one of: {}", expected.join(", "));
        if more {
            message.push_str(", ...");
        }
        let diagnostic = match self.anchor(position) {
            Some(token) => Diagnostic::at_token(token, Severity::Error, message),
            None => Diagnostic {
                line: 1,
                column: 1,
                range: TextRange::empty(self.end),
                severity: Severity::Error,
                message,
            },
        };
        self.diagnostics.push(diagnostic);
    }

    fn give_up(&mut self, position: usize) {
        let message = "too many syntax errors; parsing stopped".to_string();
        let diagnostic = match self.anchor(position) {
            Some(token) => Diagnostic::at_token(token, Severity::Error, message),
            None => Diagnostic {
                line: 1,
                column: 1,
                range: TextRange::empty(self.end),
                severity: Severity::Error,
                message,
            },
        };
        self.diagnostics.push(diagnostic);
    }

    fn describe_terminal(&self, terminal: TerminalId) -> String {
        let definition = self.grammar.terminal(terminal);
        match definition.kind() {
            TerminalKind::Eof => "end of input".to_string(),
            TerminalKind::Symbol => format!("'{}'", definition.name()),
            _ => definition.name().to_string(),
        }
    }

    fn describe_token(&self, token: &Token) -> String {
        let definition = self.grammar.terminal(token.terminal);
        match definition.kind() {
            TerminalKind::Identifier | TerminalKind::Number | TerminalKind::StringLiteral => {
                format!("{} `{}`", definition.name(), token.text.escape_debug())
            }
            _ => self.describe_terminal(token.terminal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{kw, nt, sym, GrammarBuilder};
    use crate::seq;

    fn assignments() -> (Arc<Grammar>, Automaton) {
        let mut g = GrammarBuilder::new("assignments");
        g.case_sensitive(false);
        g.identifier("Identifier");
        g.number("Number");
        g.line_comment("Comment");
        g.punctuation(";");
        g.rule(
            "assignment",
            seq![kw("let"), nt("Identifier"), sym("="), nt("Number"), sym(";")],
        );
        g.rule("program", nt("assignment").star());
        g.root("program");
        let grammar = Arc::new(g.build().unwrap());
        let automaton = Automaton::build(&grammar).unwrap();
        (grammar, automaton)
    }

    #[test]
    fn builds_nodes_and_skips_comments() {
        let (grammar, automaton) = assignments();
        let tree = parse(
            &grammar,
            &automaton,
            "let a = 1; # one\nLET b = 2;",
            &ParserConfig::default(),
        );
        assert!(tree.ok(), "{:?}", tree.diagnostics());
        let root = tree.root().unwrap();
        assert_eq!(root.name(), "program");
        let statements: Vec<_> = root.child_nodes().collect();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1].text(), "LET b = 2;");
        assert_eq!(statements[0].child_token(1).unwrap().text(), "a");
        assert!(tree.tokens().iter().any(Token::is_non_grammar));
    }

    #[test]
    fn empty_input_yields_empty_list() {
        let (grammar, automaton) = assignments();
        let tree = parse(&grammar, &automaton, "", &ParserConfig::default());
        assert!(tree.ok());
        let root = tree.root().unwrap();
        assert_eq!(root.child_count(), 0);
        assert!(root.range().is_empty());
    }

    #[test]
    fn recovers_and_reports_once() {
        let (grammar, automaton) = assignments();
        let tree = parse(
            &grammar,
            &automaton,
            "let a = ;\nlet b = 2;",
            &ParserConfig::default(),
        );
        assert!(!tree.ok());
        assert_eq!(tree.diagnostics().len(), 1);
        let diagnostic = &tree.diagnostics()[0];
        assert_eq!((diagnostic.line, diagnostic.column), (1, 9));
        assert!(
            diagnostic.message.starts_with("unexpected ';', expected one of: Number"),
            "{}",
            diagnostic.message
        );
        assert!(tree.root().is_some());
    }

    #[test]
    fn error_at_end_points_at_last_token() {
        let (grammar, automaton) = assignments();
        let tree = parse(&grammar, &automaton, "let a =\n\n", &ParserConfig::default());
        let diagnostic = &tree.diagnostics()[0];
        assert_eq!((diagnostic.line, diagnostic.column), (1, 7));
        assert!(diagnostic.message.starts_with("unexpected end of input"));
    }

    #[test]
    fn lexical_errors_become_diagnostics() {
        let (grammar, automaton) = assignments();
        let tree = parse(&grammar, &automaton, "let a = 1; $$", &ParserConfig::default());
        assert_eq!(tree.error_tokens().count(), 1);
        assert_eq!(tree.diagnostics().len(), 1);
        assert_eq!(tree.diagnostics()[0].message, "unexpected character: `$$`");
        assert!(tree.root().is_some());
    }

    #[test]
    fn diagnostics_are_capped() {
        let (grammar, automaton) = assignments();
        let config = ParserConfig {
            max_diagnostics: 2,
            ..ParserConfig::default()
        };
        let tree = parse(&grammar, &automaton, "$ a\n$ b\n$ c\n$ d", &config);
        let diagnostics = tree.diagnostics();
        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics[2].severity, Severity::Warning);
        assert!(diagnostics[2].message.starts_with("3 more diagnostics"));
    }

    #[test]
    fn recovery_limit_stops_the_parse() {
        let (grammar, automaton) = assignments();
        let config = ParserConfig {
            max_recovery_attempts: 0,
            ..ParserConfig::default()
        };
        let tree = parse(&grammar, &automaton, "let let let", &config);
        assert!(tree.root().is_none());
        assert!(tree
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("parsing stopped")));
    }
}
