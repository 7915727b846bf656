mod common;
use common::*;

use fgl_syntax::syntax::walk::find_descendant;
use fgl_syntax::{ParserConfig, Severity};

fn has_rule(tree: &ParseTree, name: &str) -> bool {
    tree.root()
        .and_then(|root| find_descendant(root, |candidate| candidate == name))
        .is_some()
}

#[test]
fn missing_expression_is_reported_on_its_own_line() {
    let source = "MAIN\n  LET x = \nEND MAIN\n";
    let tree = parse(source);
    assert!(tree.root().is_some());
    assert!(!tree.ok());
    assert_eq!(error_lines(source), [2]);

    let diagnostic = &tree.diagnostics()[0];
    assert_eq!(diagnostic.severity, Severity::Error);
    assert!(diagnostic.message.starts_with("unexpected "), "{diagnostic}");
    assert!(has_rule(&tree, "mainBlock"));
}

#[test]
fn recovery_keeps_later_definitions() {
    let source = "\
MAIN
  LET x = f(
  DISPLAY 1
END MAIN
FUNCTION g()
  RETURN 1
END FUNCTION
";
    let tree = parse(source);
    assert_eq!(error_lines(source), [2]);
    assert!(has_rule(&tree, "mainBlock"));
    assert!(has_rule(&tree, "displayStatement"));
    assert!(has_rule(&tree, "functionDefinition"));
}

#[test]
fn one_error_per_broken_block() {
    let source = "\
MAIN
  LET x = 1 +
END MAIN
FUNCTION g()
  RETURN ) 1
END FUNCTION
";
    let tree = parse(source);
    assert!(tree.root().is_some());
    assert_eq!(error_lines(source), [2, 5]);
    assert!(has_rule(&tree, "functionDefinition"));
}

#[test]
fn statements_after_an_error_are_parsed() {
    let source = "\
MAIN
  DEFINE x INTEGER
  LET x = = 1
  DISPLAY x
END MAIN
";
    let tree = parse(source);
    assert_eq!(error_lines(source), [3]);
    assert!(has_rule(&tree, "displayStatement"));
}

#[test]
fn reserved_word_cannot_be_declared() {
    let source = "define end integer\n";
    let tree = parse(source);
    assert_eq!(error_lines(source), [1]);
    assert!(tree.diagnostics()[0].message.contains("Identifier"));
}

#[test]
fn lexical_errors_do_not_stop_parsing() {
    let source = "MAIN\n  DISPLAY $ 1\nEND MAIN\n";
    let tree = parse(source);
    assert!(tree.root().is_some());
    assert_eq!(tree.error_tokens().count(), 1);
    assert_eq!(error_lines(source), [2]);
    assert!(has_rule(&tree, "displayStatement"));
}

#[test]
fn always_returns_a_result() {
    for source in [
        "",
        "   \n\n",
        "$$ %% MAIN",
        "END END END",
        "FUNCTION f(\nEND FUNCTION\n",
        "\"unterminated",
        "((((((((((",
        "MAIN\n",
        "END MAIN\nMAIN\n",
    ] {
        let tree = parse(source);
        assert_eq!(tree.source(), source);
        for diagnostic in tree.diagnostics() {
            assert!(diagnostic.line >= 1 && diagnostic.column >= 1, "{diagnostic}");
            assert!(usize::from(diagnostic.range.end()) <= source.len());
        }
    }
}

#[test]
fn empty_input_has_no_diagnostics() {
    for source in ["", "   \n\n", "# only a comment\n"] {
        let tree = parse(source);
        assert!(tree.ok(), "{source:?}: {:?}", tree.diagnostics());
    }
}

#[test]
fn parsing_is_deterministic() {
    let source = "MAIN\n  LET x = \n  CALL f(1,\nEND MAIN\nREPORT r()\nEND REPORT\n";
    let first = snapshot_parse(source);
    for _ in 0..3 {
        assert_eq!(snapshot_parse(source), first);
    }
}

#[test]
fn recovery_attempts_are_capped() {
    let source = "MAIN\n".to_string() + &") ".repeat(200) + "\nEND MAIN\n";
    let config = ParserConfig {
        max_recovery_attempts: 5,
        ..ParserConfig::default()
    };
    let tree = Language::informix().parse_with(&source, &config);
    assert!(tree.root().is_none());
    assert!(tree
        .diagnostics()
        .iter()
        .any(|diagnostic| diagnostic.message.contains("parsing stopped")));
}

#[test]
fn diagnostics_are_sorted_by_position() {
    let tree = parse("MAIN\n  LET = 1\n  DISPLAY $\n  LET x = \nEND MAIN\n");
    let starts: Vec<_> = tree
        .diagnostics()
        .iter()
        .map(|diagnostic| diagnostic.range.start())
        .collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
    assert!(starts.len() >= 2);
}
