//! `fgl-syntax` - Grammar engine, scanner and parser for Informix 4GL.
//!
//! The crate is organised bottom-up:
//!
//! - **Grammar**: declarative rules over named terminals, lowered to plain
//!   productions; [`grammar::informix`] declares the 4GL language
//! - **Automaton**: LALR(1) tables with recorded conflict resolutions
//! - **Lexer**: a whole-document scan for the parser and a resumable
//!   line-by-line scan for editors
//! - **Parser**: table-driven, with panic-mode recovery that always returns a
//!   tree
//! - **Syntax**: the parse tree, generic walks and typed accessors
//!
//! # Example
//!
//! ```
//! let tree = fgl_syntax::parse("MAIN\n  DISPLAY \"hi\"\nEND MAIN\n");
//! assert!(tree.diagnostics().is_empty());
//!
//! let root = tree.root().unwrap();
//! let main = root.child_named("mainBlock").unwrap();
//! assert_eq!(main.first_token().unwrap().text(), "MAIN");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod grammar;
pub mod lalr;
mod language;
pub mod lexer;
pub mod parser;
pub mod syntax;

pub use language::Language;
pub use lexer::{LineState, ScannedLine, Scanner, Token};
pub use parser::{Diagnostic, ParserConfig, Severity};
pub use syntax::{NodeRef, ParseTree, TokenRef};

/// Parses Informix 4GL source with default limits.
#[must_use]
pub fn parse(source: &str) -> ParseTree {
    Language::informix().parse(source)
}

/// Scans a whole Informix 4GL document.
#[must_use]
pub fn scan(source: &str) -> Vec<Token> {
    Language::informix().scanner().scan(source)
}

/// Scans one line of an Informix 4GL document, resuming in `state`.
#[must_use]
pub fn scan_line(line: &str, state: LineState) -> ScannedLine {
    Language::informix().scanner().scan_line(line, state)
}
