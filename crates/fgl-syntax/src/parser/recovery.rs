//! Panic-mode resynchronisation.
//!
//! After a syntax error the parser looks for the smallest repair made of two
//! moves: discard some lookahead tokens, then pop some states off the stack.
//! Candidates are tried with fewer skipped tokens first and, for each skip,
//! fewer popped states first. A candidate is accepted when a dry run of the
//! automaton from it shifts the required number of tokens, or accepts the
//! input, without hitting another error. No tokens are ever inserted.

use crate::grammar::{Grammar, TerminalId};
use crate::lalr::{Action, Automaton, StateId};

/// A repair: tokens to skip and states to pop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Recovery {
    pub(super) skip: usize,
    pub(super) pop: usize,
}

pub(super) fn find(
    grammar: &Grammar,
    automaton: &Automaton,
    states: &[StateId],
    terminals: &[TerminalId],
    position: usize,
    window: usize,
    lookahead: usize,
) -> Option<Recovery> {
    for skip in 0..=window {
        if position + skip > terminals.len() {
            break;
        }
        for pop in 0..states.len() {
            let stack = &states[..states.len() - pop];
            if survives(grammar, automaton, stack, terminals, position + skip, lookahead) {
                return Some(Recovery { skip, pop });
            }
        }
    }
    None
}

/// Runs the automaton without building anything.
fn survives(
    grammar: &Grammar,
    automaton: &Automaton,
    stack: &[StateId],
    terminals: &[TerminalId],
    mut position: usize,
    need: usize,
) -> bool {
    let mut stack = stack.to_vec();
    let mut shifts = 0;
    loop {
        let Some(&state) = stack.last() else {
            return false;
        };
        let terminal = terminals.get(position).copied().unwrap_or(TerminalId::EOF);
        match automaton.action(state, terminal) {
            None => return false,
            Some(Action::Accept) => return true,
            Some(Action::Shift(next)) => {
                stack.push(next);
                position += 1;
                shifts += 1;
                if shifts >= need {
                    return true;
                }
            }
            Some(Action::Reduce(production)) => {
                let production = grammar.production(production);
                let arity = production.rhs().len();
                if arity >= stack.len() {
                    return false;
                }
                stack.truncate(stack.len() - arity);
                let Some(next) = stack
                    .last()
                    .and_then(|&top| automaton.goto(top, production.lhs()))
                else {
                    return false;
                };
                stack.push(next);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{kw, nt, sym, GrammarBuilder};
    use crate::seq;

    #[test]
    fn prefers_fewest_skipped_tokens() {
        let mut g = GrammarBuilder::new("calls");
        g.identifier("Identifier");
        g.brace_pair("(", ")");
        g.rule("call", seq![kw("call"), nt("Identifier"), sym("("), sym(")")]);
        g.rule("calls", nt("call").star());
        g.root("calls");
        let grammar = g.build().unwrap();
        let automaton = Automaton::build(&grammar).unwrap();
        let id = |name: &str| grammar.terminal_by_name(name).unwrap();

        // `call f ( call g ( )` : the second CALL cannot follow `(`.
        let terminals = [
            id("CALL"),
            id("Identifier"),
            id("("),
            id("CALL"),
            id("Identifier"),
            id("("),
            id(")"),
        ];
        let mut stack = vec![StateId::START];
        let mut position = 0;
        while let Some(action) = automaton.action(*stack.last().unwrap(), terminals[position]) {
            match action {
                Action::Shift(next) => {
                    stack.push(next);
                    position += 1;
                }
                Action::Reduce(production) => {
                    let production = grammar.production(production);
                    stack.truncate(stack.len() - production.rhs().len());
                    let next = automaton.goto(*stack.last().unwrap(), production.lhs()).unwrap();
                    stack.push(next);
                }
                Action::Accept => unreachable!(),
            }
        }
        assert_eq!(position, 3);
        let found = find(&grammar, &automaton, &stack, &terminals, position, 3, 3).unwrap();
        assert_eq!(found, Recovery { skip: 0, pop: 3 });
    }

    #[test]
    fn gives_up_when_nothing_fits() {
        let mut g = GrammarBuilder::new("single");
        g.identifier("Identifier");
        g.rule("start", seq![kw("begin"), nt("Identifier")]);
        g.root("start");
        let grammar = g.build().unwrap();
        let automaton = Automaton::build(&grammar).unwrap();
        let identifier = grammar.terminal_by_name("Identifier").unwrap();
        let terminals = [identifier; 6];
        assert_eq!(
            find(&grammar, &automaton, &[StateId::START], &terminals, 0, 3, 3),
            None
        );
    }
}
