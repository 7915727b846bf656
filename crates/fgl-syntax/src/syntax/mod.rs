//! Parse tree produced by the parser.
//!
//! Interior nodes live in an arena owned by [`ParseTree`] and refer to their
//! children by [`Element`]. Child lists follow the right-hand side of the
//! rule that built the node: an optional part that did not match is kept as
//! a `None` child, so a given index always means the same thing.
//!
//! [`NodeRef`] and [`TokenRef`] are cheap borrowed views used for navigation.

pub mod ast;
pub mod walk;

use std::fmt;
use std::sync::Arc;

use text_size::{TextRange, TextSize};

use crate::grammar::{Grammar, NodeKind};
use crate::lexer::Token;
use crate::parser::{Diagnostic, Severity};

/// Index of an interior node in its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A child of an interior node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    /// An interior node.
    Node(NodeId),
    /// A leaf, by index into [`ParseTree::tokens`].
    Token(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) children: Vec<Option<Element>>,
    pub(crate) range: TextRange,
}

/// The result of one parse.
#[derive(Debug, Clone)]
pub struct ParseTree {
    grammar: Arc<Grammar>,
    source: Arc<str>,
    tokens: Vec<Token>,
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
    node_parents: Vec<Option<NodeId>>,
    token_parents: Vec<Option<NodeId>>,
    diagnostics: Vec<Diagnostic>,
}

impl ParseTree {
    pub(crate) fn new(
        grammar: Arc<Grammar>,
        source: Arc<str>,
        tokens: Vec<Token>,
        nodes: Vec<NodeData>,
        root: Option<NodeId>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        let mut node_parents = vec![None; nodes.len()];
        let mut token_parents = vec![None; tokens.len()];
        let mut stack: Vec<NodeId> = root.into_iter().collect();
        while let Some(parent) = stack.pop() {
            for child in nodes[parent.index()].children.iter().flatten() {
                match *child {
                    Element::Node(id) => {
                        node_parents[id.index()] = Some(parent);
                        stack.push(id);
                    }
                    Element::Token(index) => token_parents[index] = Some(parent),
                }
            }
        }
        Self {
            grammar,
            source,
            tokens,
            nodes,
            root,
            node_parents,
            token_parents,
            diagnostics,
        }
    }

    /// Grammar the tree was parsed with.
    #[must_use]
    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    /// The parsed text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Every scanned token, including comments and lexical errors.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Borrowed view of the token at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn token(&self, index: usize) -> TokenRef<'_> {
        assert!(index < self.tokens.len(), "token index out of bounds");
        TokenRef { tree: self, index }
    }

    /// The root node; `None` when recovery gave up.
    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.root.map(|id| self.node(id))
    }

    /// Borrowed view of a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    /// Lexical and syntax diagnostics, sorted by location.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns `true` if the parse produced a root and no errors.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.root.is_some()
            && self
                .diagnostics
                .iter()
                .all(|d| d.severity != Severity::Error)
    }

    /// Tokens for unmatched or malformed input.
    pub fn error_tokens(&self) -> impl Iterator<Item = TokenRef<'_>> + '_ {
        (0..self.tokens.len())
            .filter(|&index| self.tokens[index].is_error())
            .map(|index| TokenRef { tree: self, index })
    }

    /// Index of the last token starting at or before `offset`.
    #[must_use]
    pub fn token_at_offset(&self, offset: TextSize) -> Option<usize> {
        self.tokens
            .partition_point(|token| token.range.start() <= offset)
            .checked_sub(1)
    }

    /// Finds the brace that pairs with the brace token at `index`, skipping
    /// nested pairs of the same kind.
    #[must_use]
    pub fn matching_brace(&self, index: usize) -> Option<usize> {
        let terminal = self.tokens.get(index)?.terminal;
        let pairs = self.grammar.brace_pairs();
        if let Some(&(open, close)) = pairs.iter().find(|(open, _)| *open == terminal) {
            let mut depth = 0usize;
            for (offset, token) in self.tokens[index + 1..].iter().enumerate() {
                if token.terminal == open {
                    depth += 1;
                } else if token.terminal == close {
                    if depth == 0 {
                        return Some(index + 1 + offset);
                    }
                    depth -= 1;
                }
            }
            return None;
        }
        let &(open, close) = pairs.iter().find(|(_, close)| *close == terminal)?;
        let mut depth = 0usize;
        for position in (0..index).rev() {
            let token = &self.tokens[position];
            if token.terminal == close {
                depth += 1;
            } else if token.terminal == open {
                if depth == 0 {
                    return Some(position);
                }
                depth -= 1;
            }
        }
        None
    }
}

/// A borrowed interior node.
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t ParseTree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    /// Arena id of the node.
    #[must_use]
    pub fn id(self) -> NodeId {
        self.id
    }

    /// The tree owning the node.
    #[must_use]
    pub fn tree(self) -> &'t ParseTree {
        self.tree
    }

    fn data(self) -> &'t NodeData {
        &self.tree.nodes[self.id.index()]
    }

    /// Node kind.
    #[must_use]
    pub fn kind(self) -> NodeKind {
        self.data().kind
    }

    /// Name of the rule that built the node.
    #[must_use]
    pub fn name(self) -> &'t str {
        self.tree.grammar.node_kind_name(self.kind())
    }

    /// Returns `true` if the node was built by the rule `name`.
    #[must_use]
    pub fn is(self, name: &str) -> bool {
        self.name() == name
    }

    /// Byte range covered by the node's tokens.
    #[must_use]
    pub fn range(self) -> TextRange {
        self.data().range
    }

    /// Source text covered by the node.
    #[must_use]
    pub fn text(self) -> &'t str {
        &self.tree.source[self.range()]
    }

    /// Number of child slots, including empty ones.
    #[must_use]
    pub fn child_count(self) -> usize {
        self.data().children.len()
    }

    /// Child slots in rule order; `None` marks an absent optional part.
    pub fn children(self) -> impl Iterator<Item = Option<ElementRef<'t>>> + 't {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |child| child.map(|element| ElementRef::new(tree, element)))
    }

    /// The child in slot `index`, if present.
    #[must_use]
    pub fn child(self, index: usize) -> Option<ElementRef<'t>> {
        let element = (*self.data().children.get(index)?)?;
        Some(ElementRef::new(self.tree, element))
    }

    /// The child node in slot `index`, if that slot holds a node.
    #[must_use]
    pub fn child_node(self, index: usize) -> Option<NodeRef<'t>> {
        self.child(index)?.as_node()
    }

    /// The child token in slot `index`, if that slot holds a token.
    #[must_use]
    pub fn child_token(self, index: usize) -> Option<TokenRef<'t>> {
        self.child(index)?.as_token()
    }

    /// Present child nodes in order.
    pub fn child_nodes(self) -> impl Iterator<Item = NodeRef<'t>> + 't {
        self.children().flatten().filter_map(ElementRef::as_node)
    }

    /// First child node built by rule `name`.
    #[must_use]
    pub fn child_named(self, name: &str) -> Option<NodeRef<'t>> {
        self.child_nodes().find(|node| node.is(name))
    }

    /// The enclosing node.
    #[must_use]
    pub fn parent(self) -> Option<NodeRef<'t>> {
        self.tree.node_parents[self.id.index()].map(|id| self.tree.node(id))
    }

    /// Enclosing nodes, innermost first, excluding `self`.
    pub fn ancestors(self) -> impl Iterator<Item = NodeRef<'t>> + 't {
        std::iter::successors(self.parent(), |node| node.parent())
    }

    /// Nodes below `self` in pre-order, excluding `self`.
    pub fn descendants(self) -> impl Iterator<Item = NodeRef<'t>> + 't {
        let mut stack: Vec<NodeRef<'t>> = self.child_nodes().collect();
        stack.reverse();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            let start = stack.len();
            stack.extend(node.child_nodes());
            stack[start..].reverse();
            Some(node)
        })
    }

    /// Leaf tokens below `self`, in source order.
    pub fn tokens(self) -> impl Iterator<Item = TokenRef<'t>> + 't {
        let tree = self.tree;
        let mut stack: Vec<Element> = self
            .data()
            .children
            .iter()
            .rev()
            .flatten()
            .copied()
            .collect();
        std::iter::from_fn(move || loop {
            match stack.pop()? {
                Element::Token(index) => return Some(TokenRef { tree, index }),
                Element::Node(id) => {
                    let children = &tree.nodes[id.index()].children;
                    stack.extend(children.iter().rev().flatten().copied());
                }
            }
        })
    }

    /// First leaf token below `self`.
    #[must_use]
    pub fn first_token(self) -> Option<TokenRef<'t>> {
        self.tokens().next()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.name(), self.range())
    }
}

/// A borrowed leaf.
#[derive(Clone, Copy)]
pub struct TokenRef<'t> {
    tree: &'t ParseTree,
    index: usize,
}

impl<'t> TokenRef<'t> {
    /// Index into [`ParseTree::tokens`].
    #[must_use]
    pub fn index(self) -> usize {
        self.index
    }

    /// The scanned token.
    #[must_use]
    pub fn token(self) -> &'t Token {
        &self.tree.tokens[self.index]
    }

    /// Raw text.
    #[must_use]
    pub fn text(self) -> &'t str {
        &self.token().text
    }

    /// Byte range.
    #[must_use]
    pub fn range(self) -> TextRange {
        self.token().range
    }

    /// Name of the matched terminal.
    #[must_use]
    pub fn terminal_name(self) -> &'t str {
        self.tree.grammar.terminal(self.token().terminal).name()
    }

    /// The node that consumed this token; `None` for comments, lexical
    /// errors and tokens discarded by recovery.
    #[must_use]
    pub fn parent(self) -> Option<NodeRef<'t>> {
        self.tree.token_parents[self.index].map(|id| self.tree.node(id))
    }
}

impl PartialEq for TokenRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for TokenRef<'_> {}

impl fmt::Debug for TokenRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}@{:?}", self.terminal_name(), self.text(), self.range())
    }
}

/// A borrowed child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRef<'t> {
    /// An interior node.
    Node(NodeRef<'t>),
    /// A leaf token.
    Token(TokenRef<'t>),
}

impl<'t> ElementRef<'t> {
    fn new(tree: &'t ParseTree, element: Element) -> Self {
        match element {
            Element::Node(id) => ElementRef::Node(tree.node(id)),
            Element::Token(index) => ElementRef::Token(TokenRef { tree, index }),
        }
    }

    /// The node, if this is one.
    #[must_use]
    pub fn as_node(self) -> Option<NodeRef<'t>> {
        match self {
            ElementRef::Node(node) => Some(node),
            ElementRef::Token(_) => None,
        }
    }

    /// The token, if this is one.
    #[must_use]
    pub fn as_token(self) -> Option<TokenRef<'t>> {
        match self {
            ElementRef::Token(token) => Some(token),
            ElementRef::Node(_) => None,
        }
    }

    /// Byte range.
    #[must_use]
    pub fn range(self) -> TextRange {
        match self {
            ElementRef::Node(node) => node.range(),
            ElementRef::Token(token) => token.range(),
        }
    }
}

impl ParseTree {
    /// Renders the tree one node per line, indented by depth. Absent optional
    /// children print as `<none>`.
    #[must_use]
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root() {
            dump(root, 0, &mut out);
        }
        out
    }
}

fn dump(node: NodeRef<'_>, depth: usize, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(node.name());
    out.push('\n');
    for child in node.children() {
        match child {
            None => {
                out.push_str(&"  ".repeat(depth + 1));
                out.push_str("<none>\n");
            }
            Some(ElementRef::Node(child)) => dump(child, depth + 1, out),
            Some(ElementRef::Token(token)) => {
                out.push_str(&"  ".repeat(depth + 1));
                out.push_str(&format!("{} {:?}\n", token.terminal_name(), token.text()));
            }
        }
    }
}
