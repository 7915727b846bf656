//! Completion candidates from declaration facts.

use fgl_syntax::ParseTree;
use smol_str::SmolStr;
use text_size::TextSize;

use crate::enclosing::enclosing_declaration_name;
use crate::facts::Facts;

/// Names to offer at `offset` in `tree`: the locals of the enclosing
/// function, report or main block, then the global variables.
///
/// The token before the word being typed decides the context. There are no
/// candidates at the very start of the document, and globals are left out
/// right after `FUNCTION`, where a new name is being declared. When `tree`
/// has no root the enclosing declaration is looked up in `last_good`.
#[must_use]
pub fn completion_candidates(
    tree: &ParseTree,
    last_good: Option<&ParseTree>,
    facts: &Facts,
    offset: TextSize,
) -> Vec<SmolStr> {
    let Some(previous) = preceding_token(tree, offset) else {
        return Vec::new();
    };
    let token = tree.token(previous);

    let scope_tree = if tree.root().is_some() {
        Some(tree)
    } else {
        last_good.filter(|last_good| last_good.root().is_some())
    };
    let scope = scope_tree
        .and_then(|scope_tree| enclosing_declaration_name(scope_tree, token.range().start()));

    let mut candidates: Vec<SmolStr> = Vec::new();
    if let Some(scope) = &scope {
        candidates.extend(facts.locals(scope).iter().cloned());
    }
    let after_function = tree.grammar().keyword("function") == Some(token.token().terminal);
    if !after_function {
        for global in facts.globals() {
            if !candidates.iter().any(|known| known.eq_ignore_ascii_case(global)) {
                candidates.push(global.clone());
            }
        }
    }
    candidates
}

/// Index of the last grammar token that ends before the word at `offset`.
fn preceding_token(tree: &ParseTree, offset: TextSize) -> Option<usize> {
    let tokens = tree.tokens();
    let mut index = tree.token_at_offset(offset)?;
    // A token touching the caret is the word being typed.
    if tokens[index].range.end() >= offset {
        index = index.checked_sub(1)?;
    }
    (0..=index)
        .rev()
        .find(|&candidate| !tokens[candidate].is_non_grammar() && !tokens[candidate].is_error())
}
