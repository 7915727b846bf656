//! Typed views over the Informix 4GL parse tree.
//!
//! Each wrapper checks the rule name once in [`AstNode::cast`] and then reads
//! children by their position in the rule, which is stable because absent
//! optional parts stay in the tree as empty slots.

use super::{NodeRef, TokenRef};

/// A typed wrapper around a node of one rule.
pub trait AstNode<'t>: Sized {
    /// Rule name the wrapper accepts.
    const RULE: &'static str;

    /// Wraps `node` if it was built by [`Self::RULE`].
    fn cast(node: NodeRef<'t>) -> Option<Self>;

    /// The wrapped node.
    fn syntax(&self) -> NodeRef<'t>;
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident = $rule:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name<'t>(NodeRef<'t>);

        impl<'t> AstNode<'t> for $name<'t> {
            const RULE: &'static str = $rule;

            fn cast(node: NodeRef<'t>) -> Option<Self> {
                node.is($rule).then_some(Self(node))
            }

            fn syntax(&self) -> NodeRef<'t> {
                self.0
            }
        }
    };
}

ast_node!(
    /// A whole source file.
    CompilationUnit = "compilation_unit"
);
ast_node!(
    /// `GLOBALS "file"` or `GLOBALS ... END GLOBALS`.
    GlobalDeclaration = "globalDeclaration"
);
ast_node!(
    /// `MAIN ... END MAIN`.
    MainBlock = "mainBlock"
);
ast_node!(
    /// `FUNCTION name(params) ... END FUNCTION`.
    FunctionDefinition = "functionDefinition"
);
ast_node!(
    /// `REPORT name(params) ... END REPORT`.
    ReportDefinition = "reportDefinition"
);
ast_node!(
    /// A `(a, b)` parameter list; empty when the parentheses are omitted.
    ParameterList = "parameterList"
);
ast_node!(
    /// The run of `DEFINE` statements at the top of a block.
    TypeDeclarations = "typeDeclarations"
);
ast_node!(
    /// One `DEFINE` statement.
    TypeDeclaration = "typeDeclaration"
);
ast_node!(
    /// `IF cond THEN ... [ELSE ...] END IF`.
    IfStatement = "ifStatement"
);

fn child<'t, N: AstNode<'t>>(node: NodeRef<'t>, index: usize) -> Option<N> {
    node.child_node(index).and_then(N::cast)
}

/// Text of a name token. Identifiers give their decoded value; reserved words
/// usable as names give their source text.
#[must_use]
pub fn name_text(token: TokenRef<'_>) -> &str {
    token
        .token()
        .value
        .as_text()
        .unwrap_or_else(|| token.text())
}

/// The name token of a `constantIdentifier` node, or the token itself.
fn name_token(element: super::ElementRef<'_>) -> Option<TokenRef<'_>> {
    match element {
        super::ElementRef::Token(token) => Some(token),
        super::ElementRef::Node(node) if node.is("constantIdentifier") => node.child_token(0),
        super::ElementRef::Node(_) => None,
    }
}

impl<'t> CompilationUnit<'t> {
    /// The `GLOBALS` section.
    #[must_use]
    pub fn global_declaration(self) -> Option<GlobalDeclaration<'t>> {
        child(self.0, 2)
    }

    /// Module-level `DEFINE` statements.
    #[must_use]
    pub fn type_declarations(self) -> Option<TypeDeclarations<'t>> {
        child(self.0, 4)
    }

    /// The `MAIN` block.
    #[must_use]
    pub fn main_block(self) -> Option<MainBlock<'t>> {
        child(self.0, 5)
    }

    /// Function definitions, in source order.
    pub fn functions(self) -> impl Iterator<Item = FunctionDefinition<'t>> + 't {
        self.0
            .child_node(6)
            .into_iter()
            .flat_map(NodeRef::child_nodes)
            .filter_map(FunctionDefinition::cast)
    }

    /// Report definitions, in source order.
    pub fn reports(self) -> impl Iterator<Item = ReportDefinition<'t>> + 't {
        self.0
            .child_node(6)
            .into_iter()
            .flat_map(NodeRef::child_nodes)
            .filter_map(ReportDefinition::cast)
    }
}

impl<'t> GlobalDeclaration<'t> {
    /// The file named by `GLOBALS "file"`.
    #[must_use]
    pub fn include_file(self) -> Option<TokenRef<'t>> {
        self.0.child_token(1)
    }

    /// Declarations of the inline form.
    #[must_use]
    pub fn type_declarations(self) -> Option<TypeDeclarations<'t>> {
        child(self.0, 1)
    }
}

impl<'t> MainBlock<'t> {
    /// Local `DEFINE` statements.
    #[must_use]
    pub fn type_declarations(self) -> Option<TypeDeclarations<'t>> {
        child(self.0, 1)
    }

    /// The `mainStatements` list.
    #[must_use]
    pub fn statements(self) -> Option<NodeRef<'t>> {
        self.0.child_node(2)
    }
}

impl<'t> FunctionDefinition<'t> {
    /// The name token.
    #[must_use]
    pub fn name_token(self) -> Option<TokenRef<'t>> {
        name_token(self.0.child(1)?)
    }

    /// The declared name.
    #[must_use]
    pub fn name(self) -> Option<&'t str> {
        self.name_token().map(name_text)
    }

    /// The parameter list.
    #[must_use]
    pub fn parameter_list(self) -> Option<ParameterList<'t>> {
        child(self.0, 2)
    }

    /// Local `DEFINE` statements.
    #[must_use]
    pub fn type_declarations(self) -> Option<TypeDeclarations<'t>> {
        child(self.0, 3)
    }

    /// The statement body.
    #[must_use]
    pub fn body(self) -> Option<NodeRef<'t>> {
        self.0.child_node(4)
    }
}

impl<'t> ReportDefinition<'t> {
    /// The name token.
    #[must_use]
    pub fn name_token(self) -> Option<TokenRef<'t>> {
        self.0.child_token(1)
    }

    /// The declared name.
    #[must_use]
    pub fn name(self) -> Option<&'t str> {
        self.name_token().map(name_text)
    }

    /// The parameter list.
    #[must_use]
    pub fn parameter_list(self) -> Option<ParameterList<'t>> {
        child(self.0, 2)
    }

    /// Local `DEFINE` statements.
    #[must_use]
    pub fn type_declarations(self) -> Option<TypeDeclarations<'t>> {
        child(self.0, 3)
    }
}

impl<'t> ParameterList<'t> {
    /// Parameter name tokens.
    pub fn parameters(self) -> impl Iterator<Item = TokenRef<'t>> + 't {
        self.0
            .child_node(1)
            .into_iter()
            .flat_map(NodeRef::children)
            .flatten()
            .filter_map(super::ElementRef::as_token)
    }
}

impl<'t> TypeDeclarations<'t> {
    /// The `DEFINE` statements.
    pub fn declarations(self) -> impl Iterator<Item = TypeDeclaration<'t>> + 't {
        self.0.child_nodes().filter_map(TypeDeclaration::cast)
    }

    /// Every name declared by the `DEFINE` statements. Record members are not
    /// included.
    pub fn declared_names(self) -> impl Iterator<Item = TokenRef<'t>> + 't {
        self.declarations().flat_map(TypeDeclaration::declared_names)
    }
}

impl<'t> TypeDeclaration<'t> {
    /// Names declared by this statement, in order.
    pub fn declared_names(self) -> impl Iterator<Item = TokenRef<'t>> + 't {
        self.0
            .child_node(1)
            .into_iter()
            .flat_map(NodeRef::child_nodes)
            .filter(|declaration| declaration.is("variableDeclaration"))
            .filter_map(|declaration| declaration.child_node(0))
            .flat_map(NodeRef::children)
            .flatten()
            .filter_map(name_token)
    }
}

impl<'t> IfStatement<'t> {
    /// The condition.
    #[must_use]
    pub fn condition(self) -> Option<NodeRef<'t>> {
        self.0.child_node(1)
    }

    /// Statements after `THEN`.
    #[must_use]
    pub fn then_block(self) -> Option<NodeRef<'t>> {
        self.0.child_node(3)
    }

    /// The `ELSE` clause.
    #[must_use]
    pub fn else_clause(self) -> Option<NodeRef<'t>> {
        self.0.child_node(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<'t>(tokens: impl Iterator<Item = TokenRef<'t>>) -> Vec<&'t str> {
        tokens.map(name_text).collect()
    }

    #[test]
    fn reads_program_structure() {
        let tree = crate::parse(
            "GLOBALS\n  DEFINE a, b INTEGER\nEND GLOBALS\n\
             MAIN\n  DEFINE m CHAR(10)\nEND MAIN\n\
             FUNCTION f(p1, p2)\n  DEFINE v INTEGER, w RECORD x INTEGER END RECORD\n  RETURN p1\nEND FUNCTION\n\
             REPORT r(q)\nEND REPORT\n",
        );
        assert!(tree.ok(), "{:?}", tree.diagnostics());
        let unit = CompilationUnit::cast(tree.root().unwrap()).unwrap();

        let globals = unit.global_declaration().unwrap();
        assert!(globals.include_file().is_none());
        assert_eq!(names(globals.type_declarations().unwrap().declared_names()), ["a", "b"]);

        let main = unit.main_block().unwrap();
        assert_eq!(names(main.type_declarations().unwrap().declared_names()), ["m"]);

        let function = unit.functions().next().unwrap();
        assert_eq!(function.name(), Some("f"));
        assert_eq!(names(function.parameter_list().unwrap().parameters()), ["p1", "p2"]);
        assert_eq!(names(function.type_declarations().unwrap().declared_names()), ["v", "w"]);
        assert!(function.body().is_some());

        let report = unit.reports().next().unwrap();
        assert_eq!(report.name(), Some("r"));
        assert_eq!(names(report.parameter_list().unwrap().parameters()), ["q"]);
    }

    #[test]
    fn globals_file_form() {
        let tree = crate::parse("GLOBALS \"defs.4gl\"\nMAIN\nEND MAIN\n");
        let unit = CompilationUnit::cast(tree.root().unwrap()).unwrap();
        let globals = unit.global_declaration().unwrap();
        assert_eq!(globals.include_file().unwrap().text(), "\"defs.4gl\"");
        assert!(globals.type_declarations().is_none());
    }

    #[test]
    fn absent_else_keeps_its_slot() {
        let tree = crate::parse("MAIN\n  IF 1 THEN\n    DISPLAY 1\n  END IF\nEND MAIN\n");
        let node = super::super::walk::find_descendant(tree.root().unwrap(), |n| n == "ifStatement")
            .unwrap();
        let statement = IfStatement::cast(node).unwrap();
        assert!(statement.else_clause().is_none());
        assert_eq!(node.child_count(), 7);
        assert!(node.child(4).is_none());

        let tree = crate::parse("MAIN\n  IF 1 THEN\n  ELSE\n    DISPLAY 2\n  END IF\nEND MAIN\n");
        let node = super::super::walk::find_descendant(tree.root().unwrap(), |n| n == "ifStatement")
            .unwrap();
        let statement = IfStatement::cast(node).unwrap();
        assert!(statement.then_block().is_none());
        assert_eq!(statement.else_clause().unwrap().name(), "elseClause");
    }

    #[test]
    fn reserved_word_function_names() {
        let tree = crate::parse("FUNCTION status()\nEND FUNCTION\n");
        let unit = CompilationUnit::cast(tree.root().unwrap()).unwrap();
        assert_eq!(unit.functions().next().unwrap().name(), Some("status"));
    }
}
