//! Shared helpers for parser snapshot tests.
#![allow(dead_code, unused_imports)]

pub use fgl_syntax::{parse, Language, ParseTree};
use fgl_syntax::syntax::{ElementRef, NodeRef};

/// Formats a parse result for snapshot testing.
pub fn snapshot_parse(source: &str) -> String {
    let tree = parse(source);

    let mut output = String::new();
    match tree.root() {
        Some(root) => format_node(root, &mut output, 0),
        None => output.push_str("<no tree>\n"),
    }

    if !tree.diagnostics().is_empty() {
        output.push_str("\n---\nErrors:\n");
        for diagnostic in tree.diagnostics() {
            output.push_str(&format!("  - {diagnostic}\n"));
        }
    }

    output
}

fn format_node(node: NodeRef<'_>, out: &mut String, depth: usize) {
    let indent = "  ".repeat(depth);
    out.push_str(&format!("{}{}@{:?}\n", indent, node.name(), node.range()));

    for child in node.children() {
        match child {
            Some(ElementRef::Node(child)) => format_node(child, out, depth + 1),
            Some(ElementRef::Token(token)) => {
                out.push_str(&format!(
                    "{}{}@{:?} {:?}\n",
                    "  ".repeat(depth + 1),
                    token.terminal_name(),
                    token.range(),
                    token.text()
                ));
            }
            None => out.push_str(&format!("{}<none>\n", "  ".repeat(depth + 1))),
        }
    }
}

/// Asserts that `source` parses without diagnostics.
pub fn assert_parses(source: &str) {
    let tree = parse(source);
    assert!(tree.root().is_some(), "no tree for:\n{source}");
    assert!(
        tree.diagnostics().is_empty(),
        "unexpected diagnostics for:\n{source}\n{:#?}",
        tree.diagnostics()
    );
}

/// Lines of the error diagnostics of `source`.
pub fn error_lines(source: &str) -> Vec<u32> {
    parse(source)
        .diagnostics()
        .iter()
        .map(|diagnostic| diagnostic.line)
        .collect()
}
