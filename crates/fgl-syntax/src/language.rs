//! A grammar paired with its parser tables.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::grammar::{self, Grammar, GrammarError};
use crate::lalr::Automaton;
use crate::lexer::Scanner;
use crate::parser::{self, ParserConfig};
use crate::syntax::ParseTree;

static INFORMIX: Lazy<Result<Language, GrammarError>> = Lazy::new(|| {
    let grammar = grammar::informix::grammar()?;
    Language::new(grammar)
});

/// A built grammar and the automaton that parses it.
#[derive(Debug, Clone)]
pub struct Language {
    grammar: Arc<Grammar>,
    automaton: Arc<Automaton>,
}

impl Language {
    /// Builds (or reuses) the tables for `grammar`.
    ///
    /// # Errors
    ///
    /// Fails if the automaton cannot be built.
    pub fn new(grammar: Grammar) -> Result<Self, GrammarError> {
        let automaton = Automaton::for_grammar(&grammar)?;
        Ok(Self {
            grammar: Arc::new(grammar),
            automaton,
        })
    }

    /// The shared Informix 4GL language, built on first use.
    ///
    /// # Panics
    ///
    /// Panics if the built-in grammar fails to build, which is a defect in
    /// this crate rather than in any input.
    #[must_use]
    pub fn informix() -> &'static Language {
        Self::try_informix().expect("the built-in Informix 4GL grammar must build")
    }

    /// The shared Informix 4GL language, or the error that stopped it from
    /// building.
    ///
    /// # Errors
    ///
    /// Returns the grammar build error.
    pub fn try_informix() -> Result<&'static Language, &'static GrammarError> {
        INFORMIX.as_ref()
    }

    /// The grammar.
    #[must_use]
    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    /// The parser tables.
    #[must_use]
    pub fn automaton(&self) -> &Arc<Automaton> {
        &self.automaton
    }

    /// A scanner for the grammar's terminals.
    #[must_use]
    pub fn scanner(&self) -> Scanner<'_> {
        Scanner::new(&self.grammar)
    }

    /// Parses `source` with default limits.
    #[must_use]
    pub fn parse(&self, source: &str) -> ParseTree {
        self.parse_with(source, &ParserConfig::default())
    }

    /// Parses `source` with the given limits.
    #[must_use]
    pub fn parse_with(&self, source: &str, config: &ParserConfig) -> ParseTree {
        parser::parse(&self.grammar, &self.automaton, source, config)
    }
}
