//! Rule expressions: the right-hand sides of grammar productions.
//!
//! Rules reference other symbols by name, so cyclic grammars are declared
//! without forward placeholders. Names are resolved when the grammar is built.

use std::fmt;

use smol_str::SmolStr;

/// A production rule expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Matches nothing.
    Empty,
    /// A reserved word, matched case-insensitively in case-insensitive grammars.
    Keyword(SmolStr),
    /// An operator or punctuation literal.
    Symbol(SmolStr),
    /// A named non-terminal or named terminal (`Identifier`, `Number`, ...).
    Ref(SmolStr),
    /// Items in order.
    Seq(Vec<Rule>),
    /// Ordered alternatives.
    Alt(Vec<Rule>),
    /// Zero or one occurrence.
    Opt(Box<Rule>),
    /// Zero or more occurrences, optionally separated.
    Star {
        /// The repeated item.
        item: Box<Rule>,
        /// Separator between items, never trailing.
        separator: Option<Box<Rule>>,
    },
    /// One or more occurrences, optionally separated.
    Plus {
        /// The repeated item.
        item: Box<Rule>,
        /// Separator between items, never trailing.
        separator: Option<Box<Rule>>,
    },
}

/// A keyword terminal.
#[must_use]
pub fn kw(text: &str) -> Rule {
    Rule::Keyword(SmolStr::new(text))
}

/// A sequence of keywords written as one space-separated string, e.g.
/// `kws("end function")`.
#[must_use]
pub fn kws(text: &str) -> Rule {
    Rule::Seq(text.split_whitespace().map(kw).collect())
}

/// An operator or punctuation terminal.
#[must_use]
pub fn sym(text: &str) -> Rule {
    Rule::Symbol(SmolStr::new(text))
}

/// A reference to a named symbol.
#[must_use]
pub fn nt(name: &str) -> Rule {
    Rule::Ref(SmolStr::new(name))
}

/// The empty rule.
#[must_use]
pub fn empty() -> Rule {
    Rule::Empty
}

/// Builds a [`Rule::Seq`] from a list of rules.
#[macro_export]
macro_rules! seq {
    ($($item:expr),* $(,)?) => {
        $crate::grammar::Rule::Seq(vec![$($item),*])
    };
}

/// Builds a [`Rule::Alt`] from a list of rules.
#[macro_export]
macro_rules! alt {
    ($($item:expr),* $(,)?) => {
        $crate::grammar::Rule::Alt(vec![$($item),*])
    };
}

impl Rule {
    /// Zero or one occurrence of `self`.
    #[must_use]
    pub fn opt(self) -> Rule {
        Rule::Opt(Box::new(self))
    }

    /// Zero or more occurrences of `self`.
    #[must_use]
    pub fn star(self) -> Rule {
        Rule::Star {
            item: Box::new(self),
            separator: None,
        }
    }

    /// One or more occurrences of `self`.
    #[must_use]
    pub fn plus(self) -> Rule {
        Rule::Plus {
            item: Box::new(self),
            separator: None,
        }
    }

    /// One or more occurrences of `self` separated by `separator`.
    #[must_use]
    pub fn plus_sep(self, separator: Rule) -> Rule {
        Rule::Plus {
            item: Box::new(self),
            separator: Some(Box::new(separator)),
        }
    }

    /// Zero or more occurrences of `self` separated by `separator`.
    #[must_use]
    pub fn star_sep(self, separator: Rule) -> Rule {
        Rule::Star {
            item: Box::new(self),
            separator: Some(Box::new(separator)),
        }
    }

    pub(crate) fn is_list(&self) -> bool {
        matches!(self, Rule::Star { .. } | Rule::Plus { .. })
    }

    /// Visits this rule and every nested rule, parents first.
    pub(crate) fn walk(&self, f: &mut impl FnMut(&Rule)) {
        f(self);
        match self {
            Rule::Seq(items) | Rule::Alt(items) => {
                for item in items {
                    item.walk(f);
                }
            }
            Rule::Opt(inner) => inner.walk(f),
            Rule::Star { item, separator } | Rule::Plus { item, separator } => {
                item.walk(f);
                if let Some(separator) = separator {
                    separator.walk(f);
                }
            }
            Rule::Empty | Rule::Keyword(_) | Rule::Symbol(_) | Rule::Ref(_) => {}
        }
    }

    /// Formats the rule as an operand of a postfix operator or sequence.
    fn fmt_atom(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let needs_parens = match self {
            Rule::Seq(items) => items.len() > 1,
            Rule::Star { separator, .. } | Rule::Plus { separator, .. } => separator.is_some(),
            _ => false,
        };
        if needs_parens {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

/// EBNF-like rendering. It is also the name of the helper non-terminals the
/// grammar lowering creates, so equal rules share one helper.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Empty => f.write_str("ε"),
            Rule::Keyword(text) => f.write_str(&text.to_uppercase()),
            Rule::Symbol(text) | Rule::Ref(text) => f.write_str(text),
            Rule::Seq(items) => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    item.fmt_atom(f)?;
                }
                Ok(())
            }
            Rule::Alt(items) => {
                f.write_str("(")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Rule::Opt(inner) => {
                inner.fmt_atom(f)?;
                f.write_str("?")
            }
            Rule::Star {
                item,
                separator: None,
            } => {
                item.fmt_atom(f)?;
                f.write_str("*")
            }
            Rule::Plus {
                item,
                separator: None,
            } => {
                item.fmt_atom(f)?;
                f.write_str("+")
            }
            Rule::Star {
                item,
                separator: Some(separator),
            } => {
                f.write_str("(")?;
                item.fmt_atom(f)?;
                write!(f, " ({separator} ")?;
                item.fmt_atom(f)?;
                f.write_str(")*)?")
            }
            Rule::Plus {
                item,
                separator: Some(separator),
            } => {
                item.fmt_atom(f)?;
                write!(f, " ({separator} ")?;
                item.fmt_atom(f)?;
                f.write_str(")*")
            }
        }
    }
}
