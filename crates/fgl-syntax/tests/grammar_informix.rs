use fgl_syntax::grammar::{TerminalKind, TokenCategory};
use fgl_syntax::lalr::{Action, ConflictKind};
use fgl_syntax::Language;

#[test]
fn builds_with_known_conflicts() {
    let language = Language::informix();
    let grammar = language.grammar();
    let automaton = language.automaton();

    assert_eq!(grammar.name(), "informix-4gl");
    assert!(!grammar.is_case_sensitive());
    assert_eq!(grammar.nonterminal(grammar.root()).name(), "compilation_unit");
    assert_eq!(automaton.grammar_id(), grammar.id());

    let conflicts = automaton.conflicts();
    assert_eq!(conflicts.len(), 27);
    for conflict in conflicts {
        assert_eq!(conflict.kind, ConflictKind::ShiftReduce);
        assert!(matches!(conflict.kept, Action::Shift(_)));
        assert!(conflict
            .describe(grammar)
            .contains("shift/reduce conflict on"));
    }
}

#[test]
fn keywords_are_reserved_and_case_insensitive() {
    let grammar = Language::informix().grammar();
    for text in ["main", "MAIN", "Main", "end", "define", "status"] {
        let terminal = grammar.keyword(text).unwrap_or_else(|| panic!("{text}"));
        let definition = grammar.terminal(terminal);
        assert_eq!(definition.kind(), TerminalKind::Keyword);
        assert_eq!(definition.name(), text.to_uppercase());
    }
    assert!(grammar.keyword("customer").is_none());
    assert!(grammar.terminal(grammar.keyword("function").unwrap()).is_reserved());
}

#[test]
fn terminal_library_is_complete() {
    let grammar = Language::informix().grammar();
    for kind in [
        TerminalKind::Identifier,
        TerminalKind::Number,
        TerminalKind::StringLiteral,
        TerminalKind::Comment,
    ] {
        assert!(grammar.terminal_of_kind(kind).is_some(), "{kind:?}");
    }
    let comment = grammar.terminal_of_kind(TerminalKind::Comment).unwrap();
    assert_eq!(grammar.terminal(comment).category(), TokenCategory::Comment);
    assert_eq!(
        grammar.non_grammar_terminals().collect::<Vec<_>>(),
        [comment]
    );

    let open = grammar.symbol("(").unwrap();
    let close = grammar.symbol(")").unwrap();
    assert!(grammar.brace_pairs().contains(&(open, close)));
    assert_eq!(grammar.terminal(open).brace(), Some(close));
}

#[test]
fn rules_are_named_and_lowered() {
    let grammar = Language::informix().grammar();
    for name in [
        "compilation_unit",
        "mainBlock",
        "functionDefinition",
        "reportDefinition",
        "globalDeclaration",
        "typeDeclaration",
        "ifStatement",
        "expression",
    ] {
        assert!(grammar.rule(name).is_some(), "{name}");
        assert!(grammar.nonterminal_by_name(name).is_some(), "{name}");
    }
    let function = grammar.nonterminal_by_name("functionIdentifier").unwrap();
    assert!(grammar.nonterminal(function).is_transient());
    assert!(grammar
        .nonterminals()
        .iter()
        .any(|nonterminal| nonterminal.is_synthetic()));
}

#[test]
fn start_state_expects_top_level_keywords() {
    let language = Language::informix();
    let grammar = language.grammar();
    let automaton = language.automaton();
    let expected: Vec<&str> = automaton
        .expected(fgl_syntax::lalr::StateId::START)
        .map(|terminal| grammar.terminal(terminal).name())
        .collect();
    for name in ["MAIN", "FUNCTION", "REPORT", "GLOBALS", "DATABASE", "DEFINE"] {
        assert!(expected.contains(&name), "{name} not in {expected:?}");
    }
    assert!(automaton.state_count() > 1000);
}
