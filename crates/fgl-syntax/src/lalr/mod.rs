//! LALR(1) automaton.
//!
//! [`Automaton::build`] turns the productions of a [`Grammar`] into action
//! and goto tables. Conflicts never abort the build under the default
//! [`ConflictPolicy::PreferShift`]: a shift beats a reduction, and between two
//! reductions the production declared first wins. Every resolution is kept in
//! [`Automaton::conflicts`] for auditing.
//!
//! Building the Informix grammar takes long enough that parsers should share
//! one automaton per grammar; [`Automaton::for_grammar`] shares them while
//! any caller still holds one.

mod build;
mod sets;

use std::fmt;
use std::sync::{Arc, Weak};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::grammar::{Grammar, GrammarError, NonTerminalId, ProductionId, TerminalId};

/// Index of a parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub(crate) u32);

impl StateId {
    /// The initial state.
    pub const START: StateId = StateId(0);

    /// Returns the table index of this state.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A parse action. A missing table entry is a syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Consume the lookahead and enter the state.
    Shift(StateId),
    /// Reduce by the production.
    Reduce(ProductionId),
    /// The input is complete.
    Accept,
}

/// An LR(0) item: a production with a position in its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    /// The production.
    pub production: ProductionId,
    /// Number of right-hand side symbols before the position.
    pub dot: u16,
}

/// Kind of a resolved conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// A shift and a reduction on the same lookahead.
    ShiftReduce,
    /// Two reductions on the same lookahead.
    ReduceReduce,
}

/// A table conflict and how it was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// State holding both actions.
    pub state: StateId,
    /// Lookahead terminal.
    pub lookahead: TerminalId,
    /// Shift/reduce or reduce/reduce.
    pub kind: ConflictKind,
    /// The action kept in the table.
    pub kept: Action,
    /// The reduction that lost.
    pub dropped: ProductionId,
}

impl Conflict {
    /// Renders the conflict with grammar names.
    #[must_use]
    pub fn describe(&self, grammar: &Grammar) -> String {
        let kind = match self.kind {
            ConflictKind::ShiftReduce => "shift/reduce",
            ConflictKind::ReduceReduce => "reduce/reduce",
        };
        let kept = match self.kept {
            Action::Shift(state) => format!("shift to {state}"),
            Action::Reduce(production) => {
                format!("reduce {}", grammar.display_production(production))
            }
            Action::Accept => "accept".to_string(),
        };
        format!(
            "state {}: {kind} conflict on {}: kept {kept}, dropped reduce {}",
            self.state,
            grammar.terminal(self.lookahead).name(),
            grammar.display_production(self.dropped)
        )
    }
}

/// What to do with table conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Resolve by preferring shifts, then earlier productions; record each.
    #[default]
    PreferShift,
    /// Fail the build on any conflict.
    Strict,
}

/// Action and goto tables for one grammar.
#[derive(Debug)]
pub struct Automaton {
    grammar_id: u64,
    actions: Vec<Box<[(TerminalId, Action)]>>,
    gotos: Vec<Box<[(NonTerminalId, StateId)]>>,
    kernels: Vec<Box<[Item]>>,
    conflicts: Vec<Conflict>,
}

static AUTOMATA: Lazy<Mutex<FxHashMap<u64, Weak<Automaton>>>> =
    Lazy::new(|| Mutex::new(FxHashMap::default()));

impl Automaton {
    /// Builds the automaton, resolving conflicts by [`ConflictPolicy::PreferShift`].
    ///
    /// # Errors
    ///
    /// Fails if the grammar needs more states than the table index allows.
    pub fn build(grammar: &Grammar) -> Result<Self, GrammarError> {
        Self::build_with(grammar, ConflictPolicy::default())
    }

    /// Builds the automaton under `policy`.
    ///
    /// # Errors
    ///
    /// Fails on table overflow, or on any conflict under [`ConflictPolicy::Strict`].
    pub fn build_with(grammar: &Grammar, policy: ConflictPolicy) -> Result<Self, GrammarError> {
        let tables = build::build(grammar)?;
        if policy == ConflictPolicy::Strict {
            if let Some(first) = tables.conflicts.first() {
                return Err(GrammarError::Conflicts {
                    count: tables.conflicts.len(),
                    first: first.describe(grammar),
                });
            }
        }
        tracing::debug!(
            grammar = grammar.name(),
            states = tables.actions.len(),
            productions = grammar.productions().len(),
            conflicts = tables.conflicts.len(),
            "built parser tables"
        );
        Ok(Self {
            grammar_id: grammar.id(),
            actions: tables.actions,
            gotos: tables.gotos,
            kernels: tables.kernels,
            conflicts: tables.conflicts,
        })
    }

    /// Returns the shared automaton for `grammar`, building it if no caller
    /// holds one.
    ///
    /// The cache keeps weak references only, so tables are freed with the
    /// last `Arc` and dead entries are dropped on the next miss.
    ///
    /// # Errors
    ///
    /// Propagates build failures; failed builds are not cached.
    pub fn for_grammar(grammar: &Grammar) -> Result<Arc<Self>, GrammarError> {
        let mut cache = AUTOMATA.lock();
        if let Some(automaton) = cache.get(&grammar.id()).and_then(Weak::upgrade) {
            tracing::debug!(grammar = grammar.name(), "parser tables cache hit");
            return Ok(automaton);
        }
        tracing::debug!(grammar = grammar.name(), "parser tables cache miss");
        cache.retain(|_, automaton| automaton.strong_count() > 0);
        let automaton = Arc::new(Self::build(grammar)?);
        cache.insert(grammar.id(), Arc::downgrade(&automaton));
        Ok(automaton)
    }

    /// Id of the grammar the tables were built from.
    #[must_use]
    pub fn grammar_id(&self) -> u64 {
        self.grammar_id
    }

    /// Number of states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.actions.len()
    }

    /// The action for `terminal` in `state`; `None` is a syntax error.
    #[must_use]
    pub fn action(&self, state: StateId, terminal: TerminalId) -> Option<Action> {
        let row = &self.actions[state.index()];
        row.binary_search_by_key(&terminal, |&(t, _)| t)
            .ok()
            .map(|position| row[position].1)
    }

    /// The state entered after reducing to `nonterminal` in `state`.
    #[must_use]
    pub fn goto(&self, state: StateId, nonterminal: NonTerminalId) -> Option<StateId> {
        let row = &self.gotos[state.index()];
        row.binary_search_by_key(&nonterminal, |&(n, _)| n)
            .ok()
            .map(|position| row[position].1)
    }

    /// Terminals with an action in `state`, in terminal order.
    pub fn expected(&self, state: StateId) -> impl Iterator<Item = TerminalId> + '_ {
        self.actions[state.index()].iter().map(|&(t, _)| t)
    }

    /// Kernel items of `state`.
    #[must_use]
    pub fn kernel(&self, state: StateId) -> &[Item] {
        &self.kernels[state.index()]
    }

    /// Every conflict resolved while building, in state order.
    #[must_use]
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Renders the kernel of `state` as `lhs -> a . b` lines.
    #[must_use]
    pub fn describe_state(&self, grammar: &Grammar, state: StateId) -> String {
        let mut out = String::new();
        for item in self.kernel(state) {
            let production = grammar.production(item.production);
            out.push_str(grammar.nonterminal(production.lhs()).name());
            out.push_str(" ->");
            for (index, symbol) in production.rhs().iter().enumerate() {
                if index == usize::from(item.dot) {
                    out.push_str(" .");
                }
                out.push(' ');
                out.push_str(grammar.symbol_name(*symbol));
            }
            if usize::from(item.dot) == production.rhs().len() {
                out.push_str(" .");
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{kw, nt, GrammarBuilder};
    use crate::{alt, seq};

    fn call() -> Grammar {
        let mut g = GrammarBuilder::new("call");
        g.identifier("Identifier");
        g.rule("call", seq![kw("call"), nt("Identifier")]);
        g.root("call");
        g.build().unwrap()
    }

    fn if_else() -> Grammar {
        let mut g = GrammarBuilder::new("if-else");
        g.identifier("Identifier");
        g.rule(
            "stmt",
            alt![
                seq![
                    kw("if"),
                    nt("Identifier"),
                    nt("stmt"),
                    seq![kw("else"), nt("stmt")].opt()
                ],
                nt("Identifier"),
            ],
        );
        g.root("stmt");
        g.build().unwrap()
    }

    #[test]
    fn dangling_else_resolves_to_shift() {
        let grammar = if_else();
        let automaton = Automaton::build(&grammar).unwrap();
        let else_kw = grammar.keyword("else").unwrap();
        let conflicts = automaton.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::ShiftReduce);
        assert_eq!(conflicts[0].lookahead, else_kw);
        assert!(matches!(conflicts[0].kept, Action::Shift(_)));
        assert!(matches!(
            automaton.action(conflicts[0].state, else_kw),
            Some(Action::Shift(_))
        ));
        assert!(conflicts[0].describe(&grammar).contains("shift/reduce conflict on ELSE"));
    }

    #[test]
    fn reduce_reduce_keeps_earlier_production() {
        let mut g = GrammarBuilder::new("rr");
        g.identifier("Identifier");
        g.rule("first", nt("Identifier"));
        g.rule("second", nt("Identifier"));
        g.rule("start", alt![nt("first"), nt("second")]);
        g.root("start");
        let grammar = g.build().unwrap();
        let automaton = Automaton::build(&grammar).unwrap();

        let conflicts = automaton.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::ReduceReduce);
        let Action::Reduce(kept) = conflicts[0].kept else {
            panic!("expected a kept reduction");
        };
        assert!(kept < conflicts[0].dropped);
        assert_eq!(
            grammar.nonterminal(grammar.production(kept).lhs()).name(),
            "first"
        );
    }

    #[test]
    fn accept_over_reduce_is_recorded() {
        let mut g = GrammarBuilder::new("trailing");
        g.rule("unit", alt![seq![nt("unit"), nt("tail")], kw("a")]);
        g.rule("tail", kw("b").opt());
        g.root("unit");
        let grammar = g.build().unwrap();
        let automaton = Automaton::build(&grammar).unwrap();

        let accepted: Vec<_> = automaton
            .conflicts()
            .iter()
            .filter(|conflict| conflict.kept == Action::Accept)
            .collect();
        assert_eq!(accepted.len(), 1);
        let conflict = accepted[0];
        assert_eq!(conflict.kind, ConflictKind::ReduceReduce);
        assert_eq!(conflict.lookahead, TerminalId::EOF);
        assert_eq!(
            automaton.action(conflict.state, TerminalId::EOF),
            Some(Action::Accept)
        );
        assert!(conflict.describe(&grammar).contains("kept accept"));
        assert!(matches!(
            Automaton::build_with(&grammar, ConflictPolicy::Strict),
            Err(GrammarError::Conflicts { .. })
        ));
    }

    #[test]
    fn strict_policy_rejects_conflicts() {
        let grammar = if_else();
        let error = Automaton::build_with(&grammar, ConflictPolicy::Strict).unwrap_err();
        assert!(matches!(error, GrammarError::Conflicts { count: 1, .. }));
    }

    #[test]
    fn conflict_free_grammar_accepts() {
        let mut g = GrammarBuilder::new("list");
        g.identifier("Identifier");
        g.punctuation(",");
        g.rule("names", nt("Identifier").plus_sep(crate::grammar::sym(",")));
        g.root("names");
        let grammar = g.build().unwrap();
        let automaton = Automaton::build_with(&grammar, ConflictPolicy::Strict).unwrap();
        assert!(automaton.conflicts().is_empty());

        let identifier = grammar.terminal_by_name("Identifier").unwrap();
        let Some(Action::Shift(after)) = automaton.action(StateId::START, identifier) else {
            panic!("expected a shift on Identifier");
        };
        assert!(automaton.action(StateId::START, TerminalId::EOF).is_none());
        assert!(automaton
            .describe_state(&grammar, after)
            .contains("-> Identifier ."));
    }

    #[test]
    fn shared_tables_are_cached_per_grammar() {
        let grammar = call();
        let first = Automaton::for_grammar(&grammar).unwrap();
        let second = Automaton::for_grammar(&grammar).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.grammar_id(), grammar.id());

        let other = if_else();
        let third = Automaton::for_grammar(&other).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn cache_does_not_keep_dropped_tables() {
        let grammar = call();
        let tables = Automaton::for_grammar(&grammar).unwrap();
        let weak = Arc::downgrade(&tables);
        drop(tables);
        assert!(weak.upgrade().is_none());

        let other = if_else();
        let _kept = Automaton::for_grammar(&other).unwrap();
        assert!(!AUTOMATA.lock().contains_key(&grammar.id()));

        let rebuilt = Automaton::for_grammar(&grammar).unwrap();
        assert_eq!(rebuilt.grammar_id(), grammar.id());
    }
}
