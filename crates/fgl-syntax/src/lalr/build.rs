//! LALR(1) construction.
//!
//! 1. Nullable and FIRST sets of every non-terminal.
//! 2. The LR(0) collection: kernels closed over productions, one state per
//!    distinct kernel, explored breadth first.
//! 3. Lookaheads: each state's kernel lookaheads are closed into LR(1) items
//!    and propagated to the kernels of its successors until nothing changes.
//! 4. Tables, resolving conflicts: shift beats reduce, and between two
//!    reductions the earlier production wins.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};

use super::sets::TerminalSet;
use super::{Action, Conflict, ConflictKind, Item, StateId};
use crate::grammar::{Grammar, GrammarError, NonTerminalId, ProductionId, Symbol, TerminalId};

pub(super) struct Tables {
    pub(super) actions: Vec<Box<[(TerminalId, Action)]>>,
    pub(super) gotos: Vec<Box<[(NonTerminalId, StateId)]>>,
    pub(super) kernels: Vec<Box<[Item]>>,
    pub(super) conflicts: Vec<Conflict>,
}

struct Analysis<'g> {
    grammar: &'g Grammar,
    terminal_count: usize,
    by_lhs: Vec<Vec<ProductionId>>,
    nullable: Vec<bool>,
    first: Vec<TerminalSet>,
    /// FIRST of `rhs[dot..]` and whether that suffix is nullable, per
    /// production and dot position.
    suffixes: Vec<Vec<(TerminalSet, bool)>>,
}

pub(super) fn build(grammar: &Grammar) -> Result<Tables, GrammarError> {
    let analysis = Analysis::new(grammar);
    let (kernels, transitions) = analysis.lr0_states()?;
    let lookaheads = analysis.lookaheads(&kernels, &transitions);

    let mut actions = Vec::with_capacity(kernels.len());
    let mut gotos = Vec::with_capacity(kernels.len());
    let mut conflicts = Vec::new();
    for (index, kernel) in kernels.iter().enumerate() {
        let state = StateId(index as u32);
        let items = analysis.closure1(kernel, &lookaheads[index]);
        actions.push(analysis.action_row(
            state,
            &items,
            &transitions[index],
            &mut conflicts,
        ));
        gotos.push(
            transitions[index]
                .iter()
                .filter_map(|&(symbol, target)| match symbol {
                    Symbol::NonTerminal(id) => Some((id, target)),
                    Symbol::Terminal(_) => None,
                })
                .collect(),
        );
    }

    Ok(Tables {
        actions,
        gotos,
        kernels: kernels.into_iter().map(Vec::into_boxed_slice).collect(),
        conflicts,
    })
}

impl<'g> Analysis<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        let terminal_count = grammar.terminals().len();
        let nonterminal_count = grammar.nonterminals().len();
        let mut by_lhs = vec![Vec::new(); nonterminal_count];
        for (index, production) in grammar.productions().iter().enumerate() {
            by_lhs[production.lhs().index()].push(ProductionId(index as u32));
        }

        let mut nullable = vec![false; nonterminal_count];
        let mut first = vec![TerminalSet::new(terminal_count); nonterminal_count];
        let mut changed = true;
        while changed {
            changed = false;
            for production in grammar.productions() {
                let lhs = production.lhs().index();
                let mut derived = TerminalSet::new(terminal_count);
                let mut all_nullable = true;
                for symbol in production.rhs() {
                    match *symbol {
                        Symbol::Terminal(terminal) => {
                            derived.insert(terminal);
                            all_nullable = false;
                        }
                        Symbol::NonTerminal(id) => {
                            derived.union_with(&first[id.index()]);
                            all_nullable = nullable[id.index()];
                        }
                    }
                    if !all_nullable {
                        break;
                    }
                }
                changed |= first[lhs].union_with(&derived);
                if all_nullable && !nullable[lhs] {
                    nullable[lhs] = true;
                    changed = true;
                }
            }
        }

        let mut analysis = Self {
            grammar,
            terminal_count,
            by_lhs,
            nullable,
            first,
            suffixes: Vec::new(),
        };
        analysis.suffixes = grammar
            .productions()
            .iter()
            .map(|production| {
                (0..=production.rhs().len())
                    .map(|dot| analysis.first_of(&production.rhs()[dot..]))
                    .collect()
            })
            .collect();
        analysis
    }

    fn first_of(&self, symbols: &[Symbol]) -> (TerminalSet, bool) {
        let mut set = TerminalSet::new(self.terminal_count);
        for symbol in symbols {
            match *symbol {
                Symbol::Terminal(terminal) => {
                    set.insert(terminal);
                    return (set, false);
                }
                Symbol::NonTerminal(id) => {
                    set.union_with(&self.first[id.index()]);
                    if !self.nullable[id.index()] {
                        return (set, false);
                    }
                }
            }
        }
        (set, true)
    }

    fn next_symbol(&self, item: Item) -> Option<Symbol> {
        self.grammar
            .production(item.production)
            .rhs()
            .get(usize::from(item.dot))
            .copied()
    }

    fn closure0(&self, kernel: &[Item]) -> Vec<Item> {
        let mut items = kernel.to_vec();
        let mut seen: FxHashSet<Item> = kernel.iter().copied().collect();
        let mut index = 0;
        while index < items.len() {
            if let Some(Symbol::NonTerminal(id)) = self.next_symbol(items[index]) {
                for &production in &self.by_lhs[id.index()] {
                    let item = Item { production, dot: 0 };
                    if seen.insert(item) {
                        items.push(item);
                    }
                }
            }
            index += 1;
        }
        items
    }

    #[allow(clippy::type_complexity)]
    fn lr0_states(&self) -> Result<(Vec<Vec<Item>>, Vec<Vec<(Symbol, StateId)>>), GrammarError> {
        let start = vec![Item {
            production: ProductionId(0),
            dot: 0,
        }];
        let mut kernels = vec![start.clone()];
        let mut index: FxHashMap<Vec<Item>, StateId> = FxHashMap::default();
        index.insert(start, StateId(0));
        let mut transitions = Vec::new();

        let mut current = 0;
        while current < kernels.len() {
            let mut by_symbol: BTreeMap<Symbol, Vec<Item>> = BTreeMap::new();
            for item in self.closure0(&kernels[current]) {
                if let Some(symbol) = self.next_symbol(item) {
                    by_symbol.entry(symbol).or_default().push(Item {
                        production: item.production,
                        dot: item.dot + 1,
                    });
                }
            }
            let mut row = Vec::with_capacity(by_symbol.len());
            for (symbol, mut kernel) in by_symbol {
                kernel.sort_unstable();
                kernel.dedup();
                let target = match index.get(&kernel) {
                    Some(&target) => target,
                    None => {
                        let target = StateId(u32::try_from(kernels.len()).map_err(|_| {
                            GrammarError::TooLarge {
                                what: "parser states",
                                limit: u32::MAX as usize,
                            }
                        })?);
                        index.insert(kernel.clone(), target);
                        kernels.push(kernel);
                        target
                    }
                };
                row.push((symbol, target));
            }
            transitions.push(row);
            current += 1;
        }
        Ok((kernels, transitions))
    }

    fn goto(transitions: &[(Symbol, StateId)], symbol: Symbol) -> Option<StateId> {
        transitions
            .binary_search_by_key(&symbol, |&(s, _)| s)
            .ok()
            .map(|position| transitions[position].1)
    }

    /// Closes kernel items with their lookaheads into LR(1) items.
    fn closure1(&self, kernel: &[Item], lookaheads: &[TerminalSet]) -> BTreeMap<Item, TerminalSet> {
        let mut items: BTreeMap<Item, TerminalSet> = kernel
            .iter()
            .copied()
            .zip(lookaheads.iter().cloned())
            .collect();
        let mut stack: Vec<Item> = kernel.to_vec();
        while let Some(item) = stack.pop() {
            let Some(Symbol::NonTerminal(id)) = self.next_symbol(item) else {
                continue;
            };
            let (first, nullable) =
                &self.suffixes[item.production.index()][usize::from(item.dot) + 1];
            let mut spread = first.clone();
            if *nullable {
                if let Some(own) = items.get(&item) {
                    spread.union_with(own);
                }
            }
            for &production in &self.by_lhs[id.index()] {
                let derived = Item { production, dot: 0 };
                match items.get_mut(&derived) {
                    Some(existing) => {
                        if existing.union_with(&spread) {
                            stack.push(derived);
                        }
                    }
                    None => {
                        items.insert(derived, spread.clone());
                        stack.push(derived);
                    }
                }
            }
        }
        items
    }

    fn lookaheads(
        &self,
        kernels: &[Vec<Item>],
        transitions: &[Vec<(Symbol, StateId)>],
    ) -> Vec<Vec<TerminalSet>> {
        let mut lookaheads: Vec<Vec<TerminalSet>> = kernels
            .iter()
            .map(|kernel| vec![TerminalSet::new(self.terminal_count); kernel.len()])
            .collect();
        lookaheads[0][0].insert(TerminalId::EOF);

        let mut pending = vec![false; kernels.len()];
        let mut work = vec![0usize];
        pending[0] = true;
        while let Some(state) = work.pop() {
            pending[state] = false;
            let items = self.closure1(&kernels[state], &lookaheads[state]);
            for (item, set) in &items {
                let Some(symbol) = self.next_symbol(*item) else {
                    continue;
                };
                let Some(target) = Self::goto(&transitions[state], symbol) else {
                    continue;
                };
                let target = target.index();
                let advanced = Item {
                    production: item.production,
                    dot: item.dot + 1,
                };
                let Ok(position) = kernels[target].binary_search(&advanced) else {
                    continue;
                };
                if lookaheads[target][position].union_with(set) && !pending[target] {
                    pending[target] = true;
                    work.push(target);
                }
            }
        }
        lookaheads
    }

    fn action_row(
        &self,
        state: StateId,
        items: &BTreeMap<Item, TerminalSet>,
        transitions: &[(Symbol, StateId)],
        conflicts: &mut Vec<Conflict>,
    ) -> Box<[(TerminalId, Action)]> {
        let mut row: BTreeMap<TerminalId, Action> = BTreeMap::new();
        for (item, lookahead) in items {
            match self.next_symbol(*item) {
                Some(Symbol::Terminal(terminal)) => {
                    let Some(target) = Self::goto(transitions, Symbol::Terminal(terminal)) else {
                        continue;
                    };
                    let shift = Action::Shift(target);
                    if let Some(Action::Reduce(previous)) = row.insert(terminal, shift) {
                        conflicts.push(self.conflict(
                            state,
                            terminal,
                            ConflictKind::ShiftReduce,
                            shift,
                            previous,
                        ));
                    }
                }
                Some(Symbol::NonTerminal(_)) => {}
                None => {
                    for terminal in lookahead.iter() {
                        if item.production.index() == 0 {
                            if let Some(Action::Reduce(previous)) =
                                row.insert(terminal, Action::Accept)
                            {
                                conflicts.push(self.conflict(
                                    state,
                                    terminal,
                                    ConflictKind::ReduceReduce,
                                    Action::Accept,
                                    previous,
                                ));
                            }
                            continue;
                        }
                        let reduce = Action::Reduce(item.production);
                        match row.get(&terminal).copied() {
                            None => {
                                row.insert(terminal, reduce);
                            }
                            Some(shift @ Action::Shift(_)) => conflicts.push(self.conflict(
                                state,
                                terminal,
                                ConflictKind::ShiftReduce,
                                shift,
                                item.production,
                            )),
                            Some(Action::Reduce(previous)) if previous != item.production => {
                                let (kept, dropped) = if previous < item.production {
                                    (previous, item.production)
                                } else {
                                    (item.production, previous)
                                };
                                row.insert(terminal, Action::Reduce(kept));
                                conflicts.push(self.conflict(
                                    state,
                                    terminal,
                                    ConflictKind::ReduceReduce,
                                    Action::Reduce(kept),
                                    dropped,
                                ));
                            }
                            Some(Action::Accept) => conflicts.push(self.conflict(
                                state,
                                terminal,
                                ConflictKind::ReduceReduce,
                                Action::Accept,
                                item.production,
                            )),
                            Some(Action::Reduce(_)) => {}
                        }
                    }
                }
            }
        }
        row.into_iter().collect()
    }

    fn conflict(
        &self,
        state: StateId,
        lookahead: TerminalId,
        kind: ConflictKind,
        kept: Action,
        dropped: ProductionId,
    ) -> Conflict {
        tracing::debug!(
            state = state.0,
            lookahead = self.grammar.terminal(lookahead).name(),
            ?kind,
            dropped = %self.grammar.display_production(dropped),
            "conflict resolved"
        );
        Conflict {
            state,
            lookahead,
            kind,
            kept,
            dropped,
        }
    }
}
