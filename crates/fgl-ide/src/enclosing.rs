//! Name of the declaration that encloses a position.

use fgl_syntax::syntax::ast::{AstNode, FunctionDefinition, MainBlock, ReportDefinition};
use fgl_syntax::syntax::walk::find_enclosing_rule;
use fgl_syntax::ParseTree;
use smol_str::SmolStr;
use text_size::TextSize;

use crate::facts::MAIN_SCOPE;

fn is_declaration(name: &str) -> bool {
    name == MainBlock::RULE || name == FunctionDefinition::RULE || name == ReportDefinition::RULE
}

/// Name of the function, report or main block around `offset`: the declared
/// name for functions and reports, [`MAIN_SCOPE`] for the main block.
///
/// Pass a token's start offset to ask about that token. The offset may come
/// from a newer version of the text than `tree`; the answer is then a best
/// guess from the older tree.
#[must_use]
pub fn enclosing_declaration_name(tree: &ParseTree, offset: TextSize) -> Option<SmolStr> {
    let node = find_enclosing_rule(tree, offset, is_declaration)?;
    if MainBlock::cast(node).is_some() {
        return Some(SmolStr::new_inline(MAIN_SCOPE));
    }
    let name = match FunctionDefinition::cast(node) {
        Some(function) => function.name(),
        None => ReportDefinition::cast(node).and_then(ReportDefinition::name),
    };
    name.map(SmolStr::new)
}
