//! Lowering of EBNF-style rules to plain productions.
//!
//! Every named rule becomes a non-terminal with one production per top-level
//! alternative. Optional, repeated and grouped sub-rules become helper
//! non-terminals named after their rendering, so identical sub-rules share a
//! helper. Each production carries the [`ReduceAction`] that keeps the parse
//! tree shaped like the declared rule: absent optionals leave a `None`
//! placeholder, lists collapse into one node, and groups are inlined.

use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::{
    GrammarBuilder, GrammarError, Highlight, NodeKind, NonTerminal, NonTerminalId, Production,
    ReduceAction, Rule, Symbol, TerminalKind,
};

pub(super) struct Lowered {
    pub(super) nonterminals: Vec<NonTerminal>,
    pub(super) nonterminal_names: FxHashMap<SmolStr, NonTerminalId>,
    pub(super) productions: Vec<Production>,
    pub(super) node_kinds: IndexSet<SmolStr>,
    pub(super) root: NonTerminalId,
}

pub(super) fn lower(builder: &GrammarBuilder, root: &str) -> Result<Lowered, GrammarError> {
    let mut lowering = Lowering {
        builder,
        nonterminals: vec![NonTerminal {
            name: SmolStr::new_inline("$accept"),
            transient: false,
            synthetic: true,
        }],
        nonterminal_names: FxHashMap::default(),
        synthetics: FxHashMap::default(),
        productions: Vec::new(),
        node_kinds: IndexSet::new(),
        rule: SmolStr::new_inline("$accept"),
    };

    for (name, decl) in &builder.rules {
        let id = lowering.push_nonterminal(name.clone(), decl.transient, false)?;
        lowering.nonterminal_names.insert(name.clone(), id);
        lowering.node_kinds.insert(name.clone());
    }
    let Some(&root_id) = lowering.nonterminal_names.get(root) else {
        return Err(GrammarError::UndefinedSymbol {
            rule: lowering.rule,
            name: SmolStr::new(root),
        });
    };
    for (name, decl) in &builder.rules {
        lowering.rule = name.clone();
        lowering.check_references(&decl.rule)?;
    }

    lowering.productions.push(Production {
        lhs: NonTerminalId::ACCEPT,
        rhs: vec![Symbol::NonTerminal(root_id)],
        action: ReduceAction::Accept,
    });
    for (name, decl) in &builder.rules {
        lowering.rule = name.clone();
        let lhs = lowering.nonterminal_names[name];
        lowering.lower_named(lhs, &decl.rule, decl.transient)?;
    }

    lowering.check_size()?;
    lowering.check_productive()?;
    lowering.check_reachable()?;

    Ok(Lowered {
        nonterminals: lowering.nonterminals,
        nonterminal_names: lowering.nonterminal_names,
        productions: lowering.productions,
        node_kinds: lowering.node_kinds,
        root: root_id,
    })
}

struct Lowering<'b> {
    builder: &'b GrammarBuilder,
    nonterminals: Vec<NonTerminal>,
    nonterminal_names: FxHashMap<SmolStr, NonTerminalId>,
    synthetics: FxHashMap<SmolStr, NonTerminalId>,
    productions: Vec<Production>,
    node_kinds: IndexSet<SmolStr>,
    /// Named rule being lowered, for error reports.
    rule: SmolStr,
}

impl Lowering<'_> {
    fn push_nonterminal(
        &mut self,
        name: SmolStr,
        transient: bool,
        synthetic: bool,
    ) -> Result<NonTerminalId, GrammarError> {
        let index =
            u16::try_from(self.nonterminals.len()).map_err(|_| GrammarError::TooLarge {
                what: "non-terminals",
                limit: usize::from(u16::MAX),
            })?;
        self.nonterminals.push(NonTerminal {
            name,
            transient,
            synthetic,
        });
        Ok(NonTerminalId(index))
    }

    fn node_kind(&mut self, name: &str) -> Result<NodeKind, GrammarError> {
        let (index, _) = self.node_kinds.insert_full(SmolStr::new(name));
        u16::try_from(index)
            .map(NodeKind)
            .map_err(|_| GrammarError::TooLarge {
                what: "node kinds",
                limit: usize::from(u16::MAX),
            })
    }

    fn push(&mut self, lhs: NonTerminalId, rhs: Vec<Symbol>, action: ReduceAction) {
        self.productions.push(Production { lhs, rhs, action });
    }

    fn check_size(&self) -> Result<(), GrammarError> {
        if u32::try_from(self.productions.len()).is_err() {
            return Err(GrammarError::TooLarge {
                what: "productions",
                limit: u32::MAX as usize,
            });
        }
        Ok(())
    }

    fn check_references(&self, rule: &Rule) -> Result<(), GrammarError> {
        let mut missing = None;
        rule.walk(&mut |r| {
            if let Rule::Ref(name) = r {
                if missing.is_none()
                    && !self.nonterminal_names.contains_key(name)
                    && self.named_terminal(name).is_none()
                {
                    missing = Some(name.clone());
                }
            }
        });
        match missing {
            Some(name) => Err(GrammarError::UndefinedSymbol {
                rule: self.rule.clone(),
                name,
            }),
            None => Ok(()),
        }
    }

    fn named_terminal(&self, name: &str) -> Option<Symbol> {
        let id = *self.builder.terminal_names.get(name)?;
        match self.builder.terminals[id.index()].kind {
            TerminalKind::Identifier
            | TerminalKind::Number
            | TerminalKind::StringLiteral
            | TerminalKind::Comment => Some(Symbol::Terminal(id)),
            _ => None,
        }
    }

    fn undefined(&self, name: &str) -> GrammarError {
        GrammarError::UndefinedSymbol {
            rule: self.rule.clone(),
            name: SmolStr::new(name),
        }
    }

    fn resolve(&mut self, rule: &Rule) -> Result<Symbol, GrammarError> {
        match rule {
            Rule::Keyword(text) => {
                let key = self.builder.keyword_key(text);
                self.builder
                    .keywords
                    .get(&key)
                    .map(|&id| Symbol::Terminal(id))
                    .ok_or_else(|| self.undefined(text))
            }
            Rule::Symbol(text) => self
                .builder
                .symbols
                .get(text)
                .map(|&id| Symbol::Terminal(id))
                .ok_or_else(|| self.undefined(text)),
            Rule::Ref(name) => {
                if let Some(&id) = self.nonterminal_names.get(name) {
                    Ok(Symbol::NonTerminal(id))
                } else {
                    self.named_terminal(name)
                        .ok_or_else(|| self.undefined(name))
                }
            }
            _ => self.synthetic(rule).map(Symbol::NonTerminal),
        }
    }

    /// Flattens nested sequences into one right-hand side.
    fn flatten(&mut self, rule: &Rule) -> Result<Vec<Symbol>, GrammarError> {
        let mut out = Vec::new();
        self.flatten_into(rule, &mut out)?;
        Ok(out)
    }

    fn flatten_into(&mut self, rule: &Rule, out: &mut Vec<Symbol>) -> Result<(), GrammarError> {
        match rule {
            Rule::Empty => {}
            Rule::Seq(items) => {
                for item in items {
                    self.flatten_into(item, out)?;
                }
            }
            _ => out.push(self.resolve(rule)?),
        }
        Ok(())
    }

    fn lower_named(
        &mut self,
        lhs: NonTerminalId,
        rule: &Rule,
        transient: bool,
    ) -> Result<(), GrammarError> {
        let name = self.nonterminals[lhs.index()].name.clone();
        if rule.is_list() {
            let kind = self.node_kind(&name)?;
            return self.lower_list(lhs, rule, kind);
        }
        let alternatives = match rule {
            Rule::Alt(items) => items.as_slice(),
            _ => std::slice::from_ref(rule),
        };
        for alternative in alternatives {
            let rhs = self.flatten(alternative)?;
            let action = if transient {
                self.group_action(&rhs, &name)?
            } else {
                ReduceAction::Node(self.node_kind(&name)?)
            };
            self.push(lhs, rhs, action);
        }
        Ok(())
    }

    /// Action for a production of a group: pass a single symbol through,
    /// leave nothing for an empty one, otherwise build a node.
    fn group_action(
        &mut self,
        rhs: &[Symbol],
        name: &str,
    ) -> Result<ReduceAction, GrammarError> {
        Ok(match rhs.len() {
            0 => ReduceAction::Null,
            1 => ReduceAction::Unwrap,
            _ => ReduceAction::Node(self.node_kind(name)?),
        })
    }

    fn lower_list(
        &mut self,
        lhs: NonTerminalId,
        rule: &Rule,
        kind: NodeKind,
    ) -> Result<(), GrammarError> {
        let (Rule::Star { item, separator } | Rule::Plus { item, separator }) = rule else {
            return Ok(());
        };
        let item_symbol = self.resolve(item)?;
        if matches!(rule, Rule::Plus { .. }) {
            self.push(lhs, vec![item_symbol], ReduceAction::ListStart(kind));
            match separator {
                None => self.push(
                    lhs,
                    vec![Symbol::NonTerminal(lhs), item_symbol],
                    ReduceAction::ListAppend {
                        skip_separator: false,
                    },
                ),
                Some(separator) => {
                    let separator_symbol = self.resolve(separator)?;
                    let skip_separator = self.is_punctuation(separator);
                    self.push(
                        lhs,
                        vec![Symbol::NonTerminal(lhs), separator_symbol, item_symbol],
                        ReduceAction::ListAppend { skip_separator },
                    );
                }
            }
        } else {
            self.push(lhs, Vec::new(), ReduceAction::ListEmpty(kind));
            match separator {
                None => self.push(
                    lhs,
                    vec![Symbol::NonTerminal(lhs), item_symbol],
                    ReduceAction::ListAppend {
                        skip_separator: false,
                    },
                ),
                Some(separator) => {
                    let non_empty = Rule::Plus {
                        item: item.clone(),
                        separator: Some(separator.clone()),
                    };
                    let inner = self.resolve(&non_empty)?;
                    self.push(lhs, vec![inner], ReduceAction::Unwrap);
                }
            }
        }
        Ok(())
    }

    fn is_punctuation(&self, separator: &Rule) -> bool {
        let Rule::Symbol(text) = separator else {
            return false;
        };
        self.builder.symbols.get(text).is_some_and(|id| {
            let terminal = &self.builder.terminals[id.index()];
            terminal.highlight == Highlight::Delimiter && terminal.brace.is_none()
        })
    }

    fn synthetic(&mut self, rule: &Rule) -> Result<NonTerminalId, GrammarError> {
        let key = SmolStr::new(rule.to_string());
        if let Some(&id) = self.synthetics.get(&key) {
            return Ok(id);
        }
        let id = self.push_nonterminal(key.clone(), false, true)?;
        self.synthetics.insert(key.clone(), id);
        self.nonterminal_names.entry(key.clone()).or_insert(id);

        match rule {
            Rule::Opt(inner) => {
                let rhs = self.flatten(inner)?;
                let action = if rhs.len() == 1 {
                    ReduceAction::Unwrap
                } else {
                    ReduceAction::Node(self.node_kind(&inner.to_string())?)
                };
                self.push(id, rhs, action);
                self.push(id, Vec::new(), ReduceAction::Null);
            }
            Rule::Alt(items) => {
                for item in items {
                    let rhs = self.flatten(item)?;
                    let action = self.group_action(&rhs, &item.to_string())?;
                    self.push(id, rhs, action);
                }
            }
            Rule::Star { .. } | Rule::Plus { .. } => {
                let kind = self.node_kind(&key)?;
                self.lower_list(id, rule, kind)?;
            }
            _ => {
                let rhs = self.flatten(rule)?;
                let action = if rhs.len() == 1 {
                    ReduceAction::Unwrap
                } else {
                    ReduceAction::Node(self.node_kind(&key)?)
                };
                self.push(id, rhs, action);
            }
        }
        Ok(id)
    }

    fn check_productive(&self) -> Result<(), GrammarError> {
        let mut productive = vec![false; self.nonterminals.len()];
        let mut changed = true;
        while changed {
            changed = false;
            for production in &self.productions {
                if productive[production.lhs.index()] {
                    continue;
                }
                let derives = production.rhs.iter().all(|symbol| match symbol {
                    Symbol::Terminal(_) => true,
                    Symbol::NonTerminal(id) => productive[id.index()],
                });
                if derives {
                    productive[production.lhs.index()] = true;
                    changed = true;
                }
            }
        }
        match productive.iter().skip(1).position(|p| !p) {
            Some(index) => Err(GrammarError::Unproductive(
                self.nonterminals[index + 1].name.clone(),
            )),
            None => Ok(()),
        }
    }

    fn check_reachable(&self) -> Result<(), GrammarError> {
        let mut by_lhs: Vec<Vec<&Production>> = vec![Vec::new(); self.nonterminals.len()];
        for production in &self.productions {
            by_lhs[production.lhs.index()].push(production);
        }
        let mut reached = vec![false; self.nonterminals.len()];
        reached[NonTerminalId::ACCEPT.index()] = true;
        let mut stack = vec![NonTerminalId::ACCEPT];
        while let Some(id) = stack.pop() {
            for production in &by_lhs[id.index()] {
                for symbol in &production.rhs {
                    if let Symbol::NonTerminal(next) = symbol {
                        if !reached[next.index()] {
                            reached[next.index()] = true;
                            stack.push(*next);
                        }
                    }
                }
            }
        }
        match reached.iter().position(|r| !r) {
            Some(index) => Err(GrammarError::Unreachable(
                self.nonterminals[index].name.clone(),
            )),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::{kw, nt, sym, Grammar, GrammarBuilder, ReduceAction, Symbol};
    use crate::{alt, seq};

    fn build(declare: impl FnOnce(&mut GrammarBuilder)) -> Grammar {
        let mut g = GrammarBuilder::new("test");
        g.case_sensitive(false);
        g.identifier("Identifier");
        g.number("Number");
        g.brace_pair("(", ")");
        g.punctuation(",");
        declare(&mut g);
        g.build().unwrap()
    }

    fn productions_of(grammar: &Grammar, name: &str) -> Vec<String> {
        let id = grammar.nonterminal_by_name(name).unwrap();
        grammar
            .productions()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.lhs() == id)
            .map(|(index, _)| {
                grammar.display_production(crate::grammar::ProductionId(index as u32))
            })
            .collect()
    }

    #[test]
    fn start_production_comes_first() {
        let grammar = build(|g| {
            g.rule("unit", kw("a"));
            g.root("unit");
        });
        assert_eq!(
            grammar.display_production(crate::grammar::ProductionId(0)),
            "$accept -> unit"
        );
        assert_eq!(grammar.productions()[0].action(), ReduceAction::Accept);
    }

    #[test]
    fn optional_becomes_nullable_helper() {
        let grammar = build(|g| {
            g.rule(
                "ret",
                seq![kw("return"), seq![kw("to"), nt("Identifier")].opt()],
            );
            g.root("ret");
        });
        assert_eq!(
            productions_of(&grammar, "ret"),
            vec!["ret -> RETURN (TO Identifier)?"]
        );
        let helper = productions_of(&grammar, "(TO Identifier)?");
        assert_eq!(
            helper,
            vec!["(TO Identifier)? -> TO Identifier", "(TO Identifier)? ->"]
        );
        let helper_id = grammar.nonterminal_by_name("(TO Identifier)?").unwrap();
        assert!(grammar.nonterminal(helper_id).is_synthetic());
    }

    #[test]
    fn separated_list_drops_punctuation() {
        let grammar = build(|g| {
            g.rule("names", nt("Identifier").plus_sep(sym(",")));
            g.rule("terms", nt("Identifier").plus_sep(kw("or")));
            g.rule("unit", seq![nt("names"), sym("("), nt("terms"), sym(")")]);
            g.root("unit");
        });
        assert_eq!(
            productions_of(&grammar, "names"),
            vec!["names -> Identifier", "names -> names , Identifier"]
        );
        let actions: Vec<_> = grammar
            .productions()
            .iter()
            .filter_map(|p| match p.action() {
                ReduceAction::ListAppend { skip_separator } => Some(skip_separator),
                _ => None,
            })
            .collect();
        assert_eq!(actions, vec![true, false]);
    }

    #[test]
    fn transient_single_symbols_unwrap() {
        let grammar = build(|g| {
            g.transient(
                "operand",
                alt![
                    nt("Identifier"),
                    nt("Number"),
                    seq![sym("("), nt("operand"), sym(")")]
                ],
            );
            g.root("operand");
        });
        let actions: Vec<_> = grammar.productions()[1..].iter().map(|p| p.action()).collect();
        let node = grammar.node_kind("operand").unwrap();
        assert_eq!(
            actions,
            vec![ReduceAction::Unwrap, ReduceAction::Unwrap, ReduceAction::Node(node)]
        );
    }

    #[test]
    fn identical_helpers_are_shared() {
        let grammar = build(|g| {
            g.rule("a", seq![kw("x"), nt("Identifier").star()]);
            g.rule("b", seq![kw("y"), nt("Identifier").star()]);
            g.rule("unit", alt![nt("a"), nt("b")]);
            g.root("unit");
        });
        let helpers = grammar
            .nonterminals()
            .iter()
            .filter(|n| n.name() == "Identifier*")
            .count();
        assert_eq!(helpers, 1);
        let star = grammar.nonterminal_by_name("Identifier*").unwrap();
        let uses = grammar
            .productions()
            .iter()
            .filter(|p| p.rhs().contains(&Symbol::NonTerminal(star)))
            .count();
        // `a`, `b` and the list's own append production.
        assert_eq!(uses, 3);
    }
}
