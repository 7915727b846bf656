//! Generic tree walks: search by rule name, enclosing rule lookup and
//! name-keyed dispatch.

use rustc_hash::FxHashMap;
use text_size::TextSize;

use super::{NodeRef, ParseTree};

/// First node below `node`, in pre-order, whose rule name satisfies
/// `predicate`. `node` itself is not considered.
pub fn find_descendant<'t>(
    node: NodeRef<'t>,
    predicate: impl Fn(&str) -> bool,
) -> Option<NodeRef<'t>> {
    node.descendants().find(|candidate| predicate(candidate.name()))
}

/// Innermost node whose rule name satisfies `predicate` and whose range
/// contains `offset`.
///
/// The walk starts at the root and only descends into children that contain
/// the offset; a child ending exactly at `offset` still counts, so a position
/// just after the last token of a rule is inside it.
pub fn find_enclosing_rule<'t>(
    tree: &'t ParseTree,
    offset: TextSize,
    predicate: impl Fn(&str) -> bool,
) -> Option<NodeRef<'t>> {
    let mut current = tree.root()?;
    let mut found = None;
    loop {
        if predicate(current.name()) {
            found = Some(current);
        }
        let next = current
            .child_nodes()
            .filter(|child| !child.range().is_empty() && child.range().contains_inclusive(offset))
            .last();
        match next {
            Some(child) => current = child,
            None => return found,
        }
    }
}

type Handler<'h, C> = Box<dyn Fn(&mut C, NodeRef<'_>) + 'h>;

/// Calls a handler for every node whose rule name has one registered.
///
/// The walk is pre-order and does not descend into a node that was handled,
/// so a handler owns its whole subtree.
///
/// ```
/// use fgl_syntax::syntax::walk::Dispatch;
///
/// let tree = fgl_syntax::parse("FUNCTION f()\nEND FUNCTION\nREPORT r()\nEND REPORT\n");
/// let mut names = Vec::new();
/// Dispatch::new()
///     .on("functionDefinition", |names: &mut Vec<String>, node| names.push(node.name().to_string()))
///     .on("reportDefinition", |names: &mut Vec<String>, node| names.push(node.name().to_string()))
///     .run(tree.root().unwrap(), &mut names);
/// assert_eq!(names, ["functionDefinition", "reportDefinition"]);
/// ```
pub struct Dispatch<'h, C> {
    handlers: FxHashMap<&'h str, Handler<'h, C>>,
}

impl<C> Default for Dispatch<'_, C> {
    fn default() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }
}

impl<'h, C> Dispatch<'h, C> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for nodes of rule `name`, replacing any previous one.
    #[must_use]
    pub fn on(mut self, name: &'h str, handler: impl Fn(&mut C, NodeRef<'_>) + 'h) -> Self {
        self.handlers.insert(name, Box::new(handler));
        self
    }

    /// Walks `node` and its descendants; returns the number of handled nodes.
    pub fn run(&self, node: NodeRef<'_>, context: &mut C) -> usize {
        let mut handled = 0;
        let mut stack = vec![node];
        while let Some(node) = stack.pop() {
            if let Some(handler) = self.handlers.get(node.name()) {
                handler(context, node);
                handled += 1;
                continue;
            }
            let start = stack.len();
            stack.extend(node.child_nodes());
            stack[start..].reverse();
        }
        handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "\
MAIN
  DEFINE x INTEGER
  IF x THEN
    LET x = 1
  END IF
END MAIN
FUNCTION f(a)
  RETURN a
END FUNCTION
";

    #[test]
    fn finds_descendants_by_name() {
        let tree = crate::parse(SOURCE);
        let root = tree.root().unwrap();
        let statement = find_descendant(root, |name| name.ends_with("Statement")).unwrap();
        assert_eq!(statement.name(), "ifStatement");
        assert!(find_descendant(root, |name| name == "whileStatement").is_none());
        assert!(find_descendant(statement, |name| name == "ifStatement").is_none());
    }

    #[test]
    fn finds_the_innermost_enclosing_rule() {
        let tree = crate::parse(SOURCE);
        let offset = TextSize::from(SOURCE.find("LET").unwrap() as u32);
        let node = find_enclosing_rule(&tree, offset, |name| name.ends_with("Statement")).unwrap();
        assert_eq!(node.name(), "assignmentStatement");
        let block = find_enclosing_rule(&tree, offset, |name| {
            name == "mainBlock" || name == "functionDefinition"
        })
        .unwrap();
        assert_eq!(block.name(), "mainBlock");

        let offset = TextSize::from(SOURCE.find("RETURN").unwrap() as u32);
        let block = find_enclosing_rule(&tree, offset, |name| {
            name == "mainBlock" || name == "functionDefinition"
        })
        .unwrap();
        assert_eq!(block.name(), "functionDefinition");
    }

    #[test]
    fn dispatch_does_not_descend_into_handled_nodes() {
        let tree = crate::parse(SOURCE);
        let mut seen = Vec::new();
        let handled = Dispatch::new()
            .on("mainBlock", |seen: &mut Vec<&'static str>, _| seen.push("main"))
            .on("ifStatement", |seen: &mut Vec<&'static str>, _| seen.push("if"))
            .on("returnStatement", |seen: &mut Vec<&'static str>, _| seen.push("return"))
            .run(tree.root().unwrap(), &mut seen);
        assert_eq!(handled, 2);
        assert_eq!(seen, ["main", "return"]);
    }
}
