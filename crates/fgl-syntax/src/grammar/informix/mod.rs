//! The Informix 4GL grammar.
//!
//! Productions are split by area:
//!
//! - [`program`]: module layout, `MAIN`, functions, reports, globals
//! - [`types`]: `DEFINE` declarations and data types
//! - [`statements`]: procedural statements and control flow
//! - [`expressions`]: 4GL expressions, built with explicit precedence levels
//! - [`sql`]: embedded SQL statements and search conditions
//! - [`screen`]: forms, windows, menus and interactive statements
//! - [`report`]: report-writer output statements and format sections
//!
//! Nonterminal names follow the grammar's historical naming (`compilation_unit`,
//! `mainBlock`, `functionDefinition`, ...) because tree consumers match on them.

mod expressions;
mod program;
mod report;
mod screen;
mod sql;
mod statements;
mod types;

use super::{Grammar, GrammarBuilder, GrammarError};

/// Name of the identifier terminal.
pub const IDENTIFIER: &str = "Identifier";
/// Name of the numeric literal terminal.
pub const NUMBER: &str = "Number";
/// Name of the string literal terminal.
pub const STRING_LITERAL: &str = "StringLiteral";
/// Name of the comment terminal.
pub const COMMENT: &str = "Comment";

/// Builds the Informix 4GL grammar.
///
/// # Errors
///
/// Returns a [`GrammarError`] if the declarations are inconsistent. The
/// built-in grammar is expected to always build; an error here is a defect in
/// this module.
pub fn grammar() -> Result<Grammar, GrammarError> {
    let mut g = GrammarBuilder::new("informix-4gl");
    g.case_sensitive(false);

    g.identifier(IDENTIFIER);
    g.number(NUMBER);
    g.string_literal(STRING_LITERAL);
    g.line_comment(COMMENT);

    g.brace_pair("(", ")");
    g.brace_pair("{", "}");
    g.brace_pair("[", "]");
    g.punctuation(",");
    g.punctuation(";");
    g.punctuation(".");

    program::declare(&mut g);
    types::declare(&mut g);
    statements::declare(&mut g);
    expressions::declare(&mut g);
    sql::declare(&mut g);
    screen::declare(&mut g);
    report::declare(&mut g);

    g.root("compilation_unit");
    g.build()
}
