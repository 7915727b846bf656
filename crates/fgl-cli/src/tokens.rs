//! `fgl tokens`: dump the scanner output of a file.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use fgl_syntax::{LineState, Token};

pub fn run(file: &Path, lines: bool) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let output = if lines { by_lines(&text) } else { bulk(&text) };
    print!("{output}");
    Ok(())
}

fn bulk(text: &str) -> String {
    let mut out = String::new();
    for token in fgl_syntax::scan(text) {
        push_token(&mut out, token.line, &token);
    }
    out
}

fn by_lines(text: &str) -> String {
    let mut out = String::new();
    let mut state = LineState::NEUTRAL;
    for (index, line) in text.lines().enumerate() {
        let scanned = fgl_syntax::scan_line(line, state);
        let number = u32::try_from(index + 1).unwrap_or(u32::MAX);
        let _ = writeln!(out, "line {number}: state {} -> {}", state.0, scanned.state.0);
        for token in &scanned.tokens {
            push_token(&mut out, number, token);
        }
        state = scanned.state;
    }
    out
}

fn push_token(out: &mut String, line: u32, token: &Token) {
    let grammar = fgl_syntax::Language::informix().grammar();
    let name = grammar.terminal(token.terminal).name();
    let _ = write!(
        out,
        "  {line}:{} {name} {:?} {:?}",
        token.column, token.highlight, token.text
    );
    if token.incomplete {
        out.push_str(" incomplete");
    }
    if let Some(error) = token.error {
        let _ = write!(out, " error: {error}");
    }
    out.push('\n');
}
