//! Grammar model: terminals, non-terminals, productions and the builder that
//! declares them.
//!
//! A grammar is declared by name-based [`Rule`] expressions through a
//! [`GrammarBuilder`]. Building validates the declarations, interns every
//! keyword and operator exactly once, and lowers the EBNF-style rules to the
//! plain productions the automaton builder consumes.
//!
//! ```
//! use fgl_syntax::grammar::{kw, nt, sym, GrammarBuilder};
//! use fgl_syntax::seq;
//!
//! let mut g = GrammarBuilder::new("calls");
//! g.identifier("Identifier");
//! g.brace_pair("(", ")");
//! g.rule("call", seq![kw("call"), nt("Identifier"), sym("("), sym(")")]);
//! g.root("call");
//! let grammar = g.build().unwrap();
//! assert!(grammar.keyword("call").is_some());
//! ```

pub mod informix;
mod lower;
mod rule;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;

use crate::lexer::RawKind;

pub use rule::{empty, kw, kws, nt, sym, Rule};

static NEXT_GRAMMAR_ID: AtomicU64 = AtomicU64::new(1);

/// Index of a terminal in [`Grammar::terminals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerminalId(pub(crate) u16);

impl TerminalId {
    /// End of input.
    pub const EOF: TerminalId = TerminalId(0);
    /// Unmatched input.
    pub const ERROR: TerminalId = TerminalId(1);

    /// Returns the table index of this terminal.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// Index of a non-terminal in [`Grammar::nonterminals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonTerminalId(pub(crate) u16);

impl NonTerminalId {
    /// The augmented start symbol.
    pub const ACCEPT: NonTerminalId = NonTerminalId(0);

    /// Returns the table index of this non-terminal.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// Index of a production in [`Grammar::productions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductionId(pub(crate) u32);

impl ProductionId {
    /// Returns the table index of this production.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Tag of an interior parse tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeKind(pub(crate) u16);

impl NodeKind {
    /// Returns the index of this kind in the grammar's node kind table.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// A grammar symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// A terminal.
    Terminal(TerminalId),
    /// A non-terminal.
    NonTerminal(NonTerminalId),
}

/// How a terminal is matched by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalKind {
    /// End of input.
    Eof,
    /// Unmatched or malformed input.
    Error,
    /// Unicode identifier scan.
    Identifier,
    /// Integer, fractional, exponent and hex literals.
    Number,
    /// The quoted string forms.
    StringLiteral,
    /// `#` line comment.
    Comment,
    /// Reserved word.
    Keyword,
    /// Operator or punctuation literal.
    Symbol,
}

impl TerminalKind {
    /// Human-readable name of the kind.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            TerminalKind::Eof => "end of input",
            TerminalKind::Error => "error",
            TerminalKind::Identifier => "identifier",
            TerminalKind::Number => "number",
            TerminalKind::StringLiteral => "string literal",
            TerminalKind::Comment => "comment",
            TerminalKind::Keyword => "keyword",
            TerminalKind::Symbol => "symbol",
        }
    }
}

/// Scanner-level category of a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    /// Ordinary content.
    Content,
    /// Layout tokens.
    Outline,
    /// Comments, skipped by the parser.
    Comment,
    /// Compiler directives.
    Directive,
    /// Unmatched input.
    Error,
}

/// Editor highlight class of a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Highlight {
    /// Reserved word.
    Keyword,
    /// Identifier.
    Identifier,
    /// String literal.
    String,
    /// Numeric literal.
    Number,
    /// Operator.
    Operator,
    /// Brace or punctuation.
    Delimiter,
    /// Comment.
    Comment,
    /// Anything else.
    Text,
}

/// A terminal symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    name: SmolStr,
    text: Option<SmolStr>,
    kind: TerminalKind,
    category: TokenCategory,
    highlight: Highlight,
    brace: Option<TerminalId>,
}

impl Terminal {
    fn new(name: SmolStr, kind: TerminalKind) -> Self {
        let (category, highlight) = match kind {
            TerminalKind::Eof => (TokenCategory::Content, Highlight::Text),
            TerminalKind::Error => (TokenCategory::Error, Highlight::Text),
            TerminalKind::Identifier => (TokenCategory::Content, Highlight::Identifier),
            TerminalKind::Number => (TokenCategory::Content, Highlight::Number),
            TerminalKind::StringLiteral => (TokenCategory::Content, Highlight::String),
            TerminalKind::Comment => (TokenCategory::Comment, Highlight::Comment),
            TerminalKind::Keyword => (TokenCategory::Content, Highlight::Keyword),
            TerminalKind::Symbol => (TokenCategory::Content, Highlight::Operator),
        };
        Self {
            name,
            text: None,
            kind,
            category,
            highlight,
            brace: None,
        }
    }

    /// Terminal name. Keywords are named by their upper-cased text and
    /// symbols by their text.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Literal text for keywords and symbols.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Matching strategy.
    #[must_use]
    pub fn kind(&self) -> TerminalKind {
        self.kind
    }

    /// Scanner category.
    #[must_use]
    pub fn category(&self) -> TokenCategory {
        self.category
    }

    /// Editor highlight class.
    #[must_use]
    pub fn highlight(&self) -> Highlight {
        self.highlight
    }

    /// The other half of a brace pair.
    #[must_use]
    pub fn brace(&self) -> Option<TerminalId> {
        self.brace
    }

    /// Returns `true` for reserved words, which never lex as identifiers.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.kind == TerminalKind::Keyword
    }
}

/// A non-terminal symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonTerminal {
    name: SmolStr,
    transient: bool,
    synthetic: bool,
}

impl NonTerminal {
    /// Declared name, or the rendered rule for helper non-terminals.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transient rules do not produce a node of their own when they derive a
    /// single symbol.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.transient
    }

    /// Helper non-terminals created while lowering optional, repeated and
    /// grouped sub-rules.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }
}

/// What the parser builds when it reduces a production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReduceAction {
    /// The start production; reducing it accepts the input.
    Accept,
    /// A node of the given kind holding every right-hand side value.
    Node(NodeKind),
    /// Pass the single right-hand side value through.
    Unwrap,
    /// An absent optional element.
    Null,
    /// An empty list node.
    ListEmpty(NodeKind),
    /// A list node holding its first item.
    ListStart(NodeKind),
    /// Append the trailing values to the list on the left.
    ListAppend {
        /// Drop the punctuation separator instead of appending it.
        skip_separator: bool,
    },
}

/// A plain production `lhs -> rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    lhs: NonTerminalId,
    rhs: Vec<Symbol>,
    action: ReduceAction,
}

impl Production {
    /// Left-hand side.
    #[must_use]
    pub fn lhs(&self) -> NonTerminalId {
        self.lhs
    }

    /// Right-hand side symbols.
    #[must_use]
    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }

    /// Tree-building action.
    #[must_use]
    pub fn action(&self) -> ReduceAction {
        self.action
    }
}

/// A built, immutable grammar.
#[derive(Debug)]
pub struct Grammar {
    id: u64,
    name: SmolStr,
    case_sensitive: bool,
    terminals: Vec<Terminal>,
    terminal_names: FxHashMap<SmolStr, TerminalId>,
    keywords: FxHashMap<SmolStr, TerminalId>,
    symbols: FxHashMap<SmolStr, TerminalId>,
    nonterminals: Vec<NonTerminal>,
    nonterminal_names: FxHashMap<SmolStr, NonTerminalId>,
    productions: Vec<Production>,
    node_kinds: IndexSet<SmolStr>,
    rules: IndexMap<SmolStr, RuleDecl>,
    root: NonTerminalId,
    brace_pairs: Vec<(TerminalId, TerminalId)>,
}

impl Grammar {
    /// Process-unique identity of this grammar instance.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Grammar name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether keywords match case-sensitively.
    #[must_use]
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// The declared root rule.
    #[must_use]
    pub fn root(&self) -> NonTerminalId {
        self.root
    }

    /// All terminals, indexed by [`TerminalId`].
    #[must_use]
    pub fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    /// Returns a terminal.
    #[must_use]
    pub fn terminal(&self, id: TerminalId) -> &Terminal {
        &self.terminals[id.index()]
    }

    /// Looks up a terminal by name (`Identifier`, `END`, `(`...).
    #[must_use]
    pub fn terminal_by_name(&self, name: &str) -> Option<TerminalId> {
        self.terminal_names.get(name).copied()
    }

    /// Returns the first terminal of the given kind.
    #[must_use]
    pub fn terminal_of_kind(&self, kind: TerminalKind) -> Option<TerminalId> {
        self.terminals
            .iter()
            .position(|t| t.kind == kind)
            .and_then(|index| u16::try_from(index).ok())
            .map(TerminalId)
    }

    /// Looks up a reserved word, honouring the grammar's case sensitivity.
    #[must_use]
    pub fn keyword(&self, text: &str) -> Option<TerminalId> {
        if self.case_sensitive {
            self.keywords.get(text).copied()
        } else {
            self.keywords.get(text.to_lowercase().as_str()).copied()
        }
    }

    /// Looks up an operator or punctuation terminal by its text.
    #[must_use]
    pub fn symbol(&self, text: &str) -> Option<TerminalId> {
        self.symbols.get(text).copied()
    }

    /// Terminals the parser skips but the scanner still emits.
    pub fn non_grammar_terminals(&self) -> impl Iterator<Item = TerminalId> + '_ {
        self.terminals
            .iter()
            .enumerate()
            .filter(|(_, t)| t.category == TokenCategory::Comment)
            .filter_map(|(index, _)| u16::try_from(index).ok().map(TerminalId))
    }

    /// Declared `(open, close)` brace pairs.
    #[must_use]
    pub fn brace_pairs(&self) -> &[(TerminalId, TerminalId)] {
        &self.brace_pairs
    }

    /// All non-terminals, indexed by [`NonTerminalId`].
    #[must_use]
    pub fn nonterminals(&self) -> &[NonTerminal] {
        &self.nonterminals
    }

    /// Returns a non-terminal.
    #[must_use]
    pub fn nonterminal(&self, id: NonTerminalId) -> &NonTerminal {
        &self.nonterminals[id.index()]
    }

    /// Looks up a non-terminal by name.
    #[must_use]
    pub fn nonterminal_by_name(&self, name: &str) -> Option<NonTerminalId> {
        self.nonterminal_names.get(name).copied()
    }

    /// All productions, indexed by [`ProductionId`]. Production 0 is
    /// `$accept -> root`.
    #[must_use]
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// Returns a production.
    #[must_use]
    pub fn production(&self, id: ProductionId) -> &Production {
        &self.productions[id.index()]
    }

    /// Declared rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &Rule)> + '_ {
        self.rules
            .iter()
            .map(|(name, decl)| (name.as_str(), &decl.rule))
    }

    /// Returns a declared rule.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name).map(|decl| &decl.rule)
    }

    /// Looks up a node kind by name.
    #[must_use]
    pub fn node_kind(&self, name: &str) -> Option<NodeKind> {
        self.node_kinds
            .get_index_of(name)
            .and_then(|index| u16::try_from(index).ok())
            .map(NodeKind)
    }

    /// Name of a node kind.
    #[must_use]
    pub fn node_kind_name(&self, kind: NodeKind) -> &str {
        self.node_kinds
            .get_index(kind.index())
            .map_or("", SmolStr::as_str)
    }

    /// Name of a terminal or non-terminal.
    #[must_use]
    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        match symbol {
            Symbol::Terminal(id) => self.terminal(id).name(),
            Symbol::NonTerminal(id) => self.nonterminal(id).name(),
        }
    }

    /// Renders a production as `lhs -> a b c`.
    #[must_use]
    pub fn display_production(&self, id: ProductionId) -> String {
        let production = self.production(id);
        let mut out = format!("{} ->", self.nonterminal(production.lhs).name());
        for symbol in &production.rhs {
            out.push(' ');
            out.push_str(self.symbol_name(*symbol));
        }
        out
    }
}

/// Errors in a grammar declaration. These are defects in the grammar, never
/// in the text being parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// A rule references a name that is neither a rule nor a named terminal.
    #[error("rule `{rule}` references undefined symbol `{name}`")]
    UndefinedSymbol {
        /// Referencing rule.
        rule: SmolStr,
        /// Unknown name.
        name: SmolStr,
    },
    /// A rule name is declared twice.
    #[error("rule `{0}` is declared more than once")]
    DuplicateRule(SmolStr),
    /// No root rule was set.
    #[error("grammar `{0}` has no root rule")]
    MissingRoot(SmolStr),
    /// A declared rule cannot be reached from the root.
    #[error("rule `{0}` is not reachable from the root")]
    Unreachable(SmolStr),
    /// A rule cannot derive any finite terminal string.
    #[error("rule `{0}` cannot derive any terminal string")]
    Unproductive(SmolStr),
    /// One name is declared as two different kinds of symbol.
    #[error("`{name}` is declared both as {first} and as {second}")]
    ConflictingTerminal {
        /// The clashing name.
        name: SmolStr,
        /// The first declaration.
        first: &'static str,
        /// The second declaration.
        second: &'static str,
    },
    /// A keyword that the identifier scan could never produce.
    #[error("keyword `{0}` is not a single word")]
    InvalidKeyword(SmolStr),
    /// A symbol the scanner has no operator for.
    #[error("symbol `{0}` is not an operator the scanner recognizes")]
    UnknownSymbol(SmolStr),
    /// Conflicts found while building with the strict conflict policy.
    #[error("grammar has {count} parsing conflicts, first: {first}")]
    Conflicts {
        /// Number of conflicts.
        count: usize,
        /// Description of the first conflict.
        first: String,
    },
    /// The grammar or its automaton outgrew a table index width.
    #[error("grammar needs more than {limit} {what}")]
    TooLarge {
        /// What overflowed, such as terminals, non-terminals or states.
        what: &'static str,
        /// Maximum supported count.
        limit: usize,
    },
}

#[derive(Debug, Clone)]
struct RuleDecl {
    rule: Rule,
    transient: bool,
}

/// Declares a grammar.
#[derive(Debug)]
pub struct GrammarBuilder {
    name: SmolStr,
    case_sensitive: bool,
    terminals: Vec<Terminal>,
    terminal_names: FxHashMap<SmolStr, TerminalId>,
    keywords: FxHashMap<SmolStr, TerminalId>,
    symbols: FxHashMap<SmolStr, TerminalId>,
    brace_pairs: Vec<(TerminalId, TerminalId)>,
    rules: IndexMap<SmolStr, RuleDecl>,
    root: Option<SmolStr>,
    errors: Vec<GrammarError>,
}

impl GrammarBuilder {
    /// Starts an empty, case-sensitive grammar.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let mut builder = Self {
            name: SmolStr::new(name),
            case_sensitive: true,
            terminals: Vec::new(),
            terminal_names: FxHashMap::default(),
            keywords: FxHashMap::default(),
            symbols: FxHashMap::default(),
            brace_pairs: Vec::new(),
            rules: IndexMap::new(),
            root: None,
            errors: Vec::new(),
        };
        builder.add_terminal(Terminal::new(SmolStr::new_inline("$eof"), TerminalKind::Eof));
        builder.add_terminal(Terminal::new(
            SmolStr::new_inline("$error"),
            TerminalKind::Error,
        ));
        builder
    }

    /// Sets keyword case sensitivity. Must be called before any keyword is
    /// registered.
    pub fn case_sensitive(&mut self, case_sensitive: bool) -> &mut Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Declares the identifier terminal.
    pub fn identifier(&mut self, name: &str) -> &mut Self {
        self.named_terminal(name, TerminalKind::Identifier)
    }

    /// Declares the numeric literal terminal.
    pub fn number(&mut self, name: &str) -> &mut Self {
        self.named_terminal(name, TerminalKind::Number)
    }

    /// Declares the string literal terminal.
    pub fn string_literal(&mut self, name: &str) -> &mut Self {
        self.named_terminal(name, TerminalKind::StringLiteral)
    }

    /// Declares the line comment terminal. Comments are non-grammar
    /// terminals: scanned and kept, never shifted.
    pub fn line_comment(&mut self, name: &str) -> &mut Self {
        self.named_terminal(name, TerminalKind::Comment)
    }

    /// Declares a pair of matching braces.
    pub fn brace_pair(&mut self, open: &str, close: &str) -> &mut Self {
        let (Some(open_id), Some(close_id)) = (self.intern_symbol(open), self.intern_symbol(close))
        else {
            return self;
        };
        for id in [open_id, close_id] {
            self.terminals[id.index()].highlight = Highlight::Delimiter;
        }
        self.terminals[open_id.index()].brace = Some(close_id);
        self.terminals[close_id.index()].brace = Some(open_id);
        self.brace_pairs.push((open_id, close_id));
        self
    }

    /// Declares a punctuation symbol. Punctuation separators are left out of
    /// list nodes.
    pub fn punctuation(&mut self, text: &str) -> &mut Self {
        if let Some(id) = self.intern_symbol(text) {
            self.terminals[id.index()].highlight = Highlight::Delimiter;
        }
        self
    }

    /// Registers a reserved word. Keywords used in rules are registered
    /// automatically; one text always maps to one terminal.
    pub fn keyword(&mut self, text: &str) -> Option<TerminalId> {
        if text.is_empty()
            || text.starts_with(|c: char| c.is_ascii_digit())
            || !text.chars().all(|c| c.is_alphanumeric() || c == '_')
        {
            self.errors
                .push(GrammarError::InvalidKeyword(SmolStr::new(text)));
            return None;
        }
        let key = self.keyword_key(text);
        if let Some(&id) = self.keywords.get(&key) {
            return Some(id);
        }
        let mut terminal = Terminal::new(SmolStr::new(text.to_uppercase()), TerminalKind::Keyword);
        terminal.text = Some(SmolStr::new(text));
        let id = self.add_terminal(terminal)?;
        self.keywords.insert(key, id);
        Some(id)
    }

    /// Declares a rule that always produces a node named after it.
    pub fn rule(&mut self, name: &str, rule: Rule) -> &mut Self {
        self.declare(name, rule, false)
    }

    /// Declares a rule whose single-symbol alternatives are passed through
    /// without a node of their own.
    pub fn transient(&mut self, name: &str, rule: Rule) -> &mut Self {
        self.declare(name, rule, true)
    }

    /// Sets the root rule.
    pub fn root(&mut self, name: &str) -> &mut Self {
        self.root = Some(SmolStr::new(name));
        self
    }

    /// Validates and lowers the declarations.
    ///
    /// # Errors
    ///
    /// Returns the first declaration defect found.
    pub fn build(mut self) -> Result<Grammar, GrammarError> {
        let Some(root) = self.root.clone() else {
            return Err(GrammarError::MissingRoot(self.name));
        };
        if let Some(error) = self.errors.first() {
            return Err(error.clone());
        }

        let rules: Vec<(SmolStr, RuleDecl)> = self
            .rules
            .iter()
            .map(|(name, decl)| (name.clone(), decl.clone()))
            .collect();
        for (name, decl) in &rules {
            if self.terminal_names.contains_key(name) {
                return Err(GrammarError::ConflictingTerminal {
                    name: name.clone(),
                    first: self.terminals[self.terminal_names[name].index()]
                        .kind
                        .describe(),
                    second: "rule",
                });
            }
            self.intern_rule_terminals(&decl.rule);
        }
        if let Some(error) = self.errors.first() {
            return Err(error.clone());
        }

        let lowered = lower::lower(&self, &root)?;
        let grammar = Grammar {
            id: NEXT_GRAMMAR_ID.fetch_add(1, Ordering::Relaxed),
            name: self.name,
            case_sensitive: self.case_sensitive,
            terminals: self.terminals,
            terminal_names: self.terminal_names,
            keywords: self.keywords,
            symbols: self.symbols,
            nonterminals: lowered.nonterminals,
            nonterminal_names: lowered.nonterminal_names,
            productions: lowered.productions,
            node_kinds: lowered.node_kinds,
            rules: self.rules,
            root: lowered.root,
            brace_pairs: self.brace_pairs,
        };
        tracing::debug!(
            grammar = %grammar.name,
            terminals = grammar.terminals.len(),
            nonterminals = grammar.nonterminals.len(),
            productions = grammar.productions.len(),
            "grammar built"
        );
        Ok(grammar)
    }

    fn declare(&mut self, name: &str, rule: Rule, transient: bool) -> &mut Self {
        let name = SmolStr::new(name);
        if self.rules.contains_key(&name) {
            self.errors.push(GrammarError::DuplicateRule(name));
        } else {
            self.rules.insert(name, RuleDecl { rule, transient });
        }
        self
    }

    fn named_terminal(&mut self, name: &str, kind: TerminalKind) -> &mut Self {
        if let Some(existing) = self.terminals.iter().find(|t| t.kind == kind) {
            if existing.name != name {
                self.errors.push(GrammarError::ConflictingTerminal {
                    name: SmolStr::new(name),
                    first: existing.kind.describe(),
                    second: kind.describe(),
                });
            }
            return self;
        }
        self.add_terminal(Terminal::new(SmolStr::new(name), kind));
        self
    }

    fn intern_symbol(&mut self, text: &str) -> Option<TerminalId> {
        if let Some(&id) = self.symbols.get(text) {
            return Some(id);
        }
        if RawKind::operator(text).is_none() {
            self.errors
                .push(GrammarError::UnknownSymbol(SmolStr::new(text)));
            return None;
        }
        let mut terminal = Terminal::new(SmolStr::new(text), TerminalKind::Symbol);
        terminal.text = Some(SmolStr::new(text));
        let id = self.add_terminal(terminal)?;
        self.symbols.insert(SmolStr::new(text), id);
        Some(id)
    }

    fn intern_rule_terminals(&mut self, rule: &Rule) {
        let mut literals = Vec::new();
        rule.walk(&mut |r| {
            if matches!(r, Rule::Keyword(_) | Rule::Symbol(_)) {
                literals.push(r.clone());
            }
        });
        for literal in literals {
            match literal {
                Rule::Keyword(text) => {
                    self.keyword(&text);
                }
                Rule::Symbol(text) => {
                    self.intern_symbol(&text);
                }
                _ => {}
            }
        }
    }

    fn add_terminal(&mut self, terminal: Terminal) -> Option<TerminalId> {
        if let Some(&existing) = self.terminal_names.get(&terminal.name) {
            let first = self.terminals[existing.index()].kind;
            self.errors.push(GrammarError::ConflictingTerminal {
                name: terminal.name,
                first: first.describe(),
                second: terminal.kind.describe(),
            });
            return None;
        }
        let Ok(index) = u16::try_from(self.terminals.len()) else {
            if !matches!(self.errors.last(), Some(GrammarError::TooLarge { .. })) {
                self.errors.push(GrammarError::TooLarge {
                    what: "terminals",
                    limit: usize::from(u16::MAX),
                });
            }
            return None;
        };
        let id = TerminalId(index);
        self.terminal_names.insert(terminal.name.clone(), id);
        self.terminals.push(terminal);
        Some(id)
    }

    fn keyword_key(&self, text: &str) -> SmolStr {
        if self.case_sensitive {
            SmolStr::new(text)
        } else {
            SmolStr::new(text.to_lowercase())
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, decl) in &self.rules {
            let marker = if decl.transient { "~" } else { "" };
            writeln!(f, "{marker}{name} ::= {}", decl.rule)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{alt, seq};

    fn tiny() -> GrammarBuilder {
        let mut g = GrammarBuilder::new("tiny");
        g.case_sensitive(false);
        g.identifier("Identifier");
        g.brace_pair("(", ")");
        g.punctuation(",");
        g
    }

    #[test]
    fn keywords_are_interned_once_per_text() {
        let mut g = tiny();
        g.rule(
            "block",
            seq![kw("begin"), nt("Identifier").star(), kw("END")],
        );
        g.rule("other", seq![kw("End"), nt("block")]);
        g.rule("unit", alt![nt("block"), nt("other")]);
        g.root("unit");
        let grammar = g.build().unwrap();
        let end = grammar.keyword("end").unwrap();
        assert_eq!(grammar.keyword("END"), Some(end));
        assert_eq!(grammar.terminal(end).name(), "END");
        assert_eq!(
            grammar
                .terminals()
                .iter()
                .filter(|t| t.name() == "END")
                .count(),
            1
        );
        assert!(grammar.terminal(end).is_reserved());
        assert_eq!(grammar.terminal(end).highlight(), Highlight::Keyword);
    }

    #[test]
    fn case_sensitive_keywords_do_not_fold() {
        let mut g = GrammarBuilder::new("strict");
        g.identifier("Identifier");
        g.rule("unit", seq![kw("begin"), nt("Identifier")]);
        g.root("unit");
        let grammar = g.build().unwrap();
        assert!(grammar.keyword("begin").is_some());
        assert!(grammar.keyword("BEGIN").is_none());
    }

    #[test]
    fn braces_know_their_partner() {
        let mut g = tiny();
        g.rule("unit", seq![sym("("), nt("Identifier"), sym(")")]);
        g.root("unit");
        let grammar = g.build().unwrap();
        let open = grammar.symbol("(").unwrap();
        let close = grammar.symbol(")").unwrap();
        assert_eq!(grammar.terminal(open).brace(), Some(close));
        assert_eq!(grammar.terminal(close).brace(), Some(open));
        assert_eq!(grammar.brace_pairs(), &[(open, close)]);
        assert_eq!(grammar.terminal(open).highlight(), Highlight::Delimiter);
    }

    #[test]
    fn undefined_reference_is_reported() {
        let mut g = tiny();
        g.rule("unit", seq![kw("begin"), nt("missing")]);
        g.root("unit");
        assert_eq!(
            g.build().unwrap_err(),
            GrammarError::UndefinedSymbol {
                rule: "unit".into(),
                name: "missing".into()
            }
        );
    }

    #[test]
    fn duplicate_rule_is_reported() {
        let mut g = tiny();
        g.rule("unit", kw("a"));
        g.rule("unit", kw("b"));
        g.root("unit");
        assert_eq!(
            g.build().unwrap_err(),
            GrammarError::DuplicateRule("unit".into())
        );
    }

    #[test]
    fn missing_root_is_reported() {
        let mut g = tiny();
        g.rule("unit", kw("a"));
        assert_eq!(
            g.build().unwrap_err(),
            GrammarError::MissingRoot("tiny".into())
        );
    }

    #[test]
    fn unreachable_rule_is_reported() {
        let mut g = tiny();
        g.rule("unit", kw("a"));
        g.rule("orphan", kw("b"));
        g.root("unit");
        assert_eq!(
            g.build().unwrap_err(),
            GrammarError::Unreachable("orphan".into())
        );
    }

    #[test]
    fn unproductive_rule_is_reported() {
        let mut g = tiny();
        g.rule("unit", seq![kw("a"), nt("loop")]);
        g.rule("loop", seq![kw("b"), nt("loop")]);
        g.root("unit");
        assert_eq!(
            g.build().unwrap_err(),
            GrammarError::Unproductive("unit".into())
        );
    }

    #[test]
    fn invalid_keyword_and_symbol_are_reported() {
        let mut g = tiny();
        g.rule("unit", kw("two words"));
        g.root("unit");
        assert_eq!(
            g.build().unwrap_err(),
            GrammarError::InvalidKeyword("two words".into())
        );

        let mut g = tiny();
        g.rule("unit", sym("$$"));
        g.root("unit");
        assert_eq!(
            g.build().unwrap_err(),
            GrammarError::UnknownSymbol("$$".into())
        );
    }

    #[test]
    fn rule_named_like_a_terminal_is_rejected() {
        let mut g = tiny();
        g.rule("Identifier", kw("a"));
        g.root("Identifier");
        assert!(matches!(
            g.build().unwrap_err(),
            GrammarError::ConflictingTerminal { .. }
        ));
    }

    #[test]
    fn comments_are_non_grammar_terminals() {
        let mut g = tiny();
        g.line_comment("Comment");
        g.rule("unit", kw("a"));
        g.root("unit");
        let grammar = g.build().unwrap();
        let comment = grammar.terminal_by_name("Comment").unwrap();
        assert_eq!(grammar.non_grammar_terminals().collect::<Vec<_>>(), vec![comment]);
        assert_eq!(grammar.terminal(comment).category(), TokenCategory::Comment);
    }

    #[test]
    fn too_many_terminals_is_a_build_error() {
        let mut g = tiny();
        for index in 0..=usize::from(u16::MAX) {
            g.keyword(&format!("k{index}"));
        }
        g.rule("unit", kw("k0"));
        g.root("unit");
        assert!(matches!(
            g.build().unwrap_err(),
            GrammarError::TooLarge {
                what: "terminals",
                ..
            }
        ));
    }

    #[test]
    fn grammar_ids_are_unique() {
        let build = || {
            let mut g = tiny();
            g.rule("unit", kw("a"));
            g.root("unit");
            g.build().unwrap()
        };
        assert_ne!(build().id(), build().id());
    }
}
