//! Declaration facts extracted from a parse tree: global variable names and
//! the names visible inside each function, report and the main block.
//!
//! The extraction is shallow. Names are flat lists without types, record
//! members are not listed and blocks inside a function do not open scopes.

use fgl_syntax::syntax::ast::{
    self, AstNode, FunctionDefinition, GlobalDeclaration, MainBlock, ParameterList,
    ReportDefinition, TypeDeclarations,
};
use fgl_syntax::syntax::walk::Dispatch;
use fgl_syntax::{NodeRef, ParseTree, TokenRef};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// Scope name used for the locals of the `MAIN` block.
pub const MAIN_SCOPE: &str = "main";

/// Names declared by one successfully parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facts {
    globals: Vec<SmolStr>,
    scopes: FxHashMap<SmolStr, Scope>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Scope {
    name: SmolStr,
    locals: Vec<SmolStr>,
}

impl Facts {
    /// Walks the top-level declarations of `tree` once. A tree without a root
    /// gives no facts.
    #[must_use]
    pub fn extract(tree: &ParseTree) -> Self {
        let mut facts = Facts::default();
        let Some(root) = tree.root() else {
            return facts;
        };
        let handled = Dispatch::new()
            .on(GlobalDeclaration::RULE, |facts: &mut Facts, node| {
                facts.add_globals(node);
            })
            .on(MainBlock::RULE, |facts: &mut Facts, node| {
                if let Some(block) = MainBlock::cast(node) {
                    facts.add_declarations(MAIN_SCOPE, block.type_declarations());
                }
            })
            .on(FunctionDefinition::RULE, |facts: &mut Facts, node| {
                let Some(function) = FunctionDefinition::cast(node) else {
                    return;
                };
                if let Some(name) = function.name() {
                    facts.add_parameters(name, function.parameter_list());
                    facts.add_declarations(name, function.type_declarations());
                }
            })
            .on(ReportDefinition::RULE, |facts: &mut Facts, node| {
                let Some(report) = ReportDefinition::cast(node) else {
                    return;
                };
                if let Some(name) = report.name() {
                    facts.add_parameters(name, report.parameter_list());
                    facts.add_declarations(name, report.type_declarations());
                }
            })
            .run(root, &mut facts);
        tracing::debug!(
            handled,
            globals = facts.globals.len(),
            scopes = facts.scopes.len(),
            "extracted declaration facts"
        );
        facts
    }

    /// Global variable names, in declaration order.
    #[must_use]
    pub fn globals(&self) -> &[SmolStr] {
        &self.globals
    }

    /// Parameters and `DEFINE`d names of the function or report `name`, or of
    /// the main block for [`MAIN_SCOPE`]. The lookup ignores case.
    #[must_use]
    pub fn locals(&self, name: &str) -> &[SmolStr] {
        self.scopes
            .get(&scope_key(name))
            .map_or(&[], |scope| scope.locals.as_slice())
    }

    /// Declared names of every scope, sorted case-insensitively.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        let mut scopes: Vec<(&SmolStr, &str)> = self
            .scopes
            .iter()
            .map(|(key, scope)| (key, scope.name.as_str()))
            .collect();
        scopes.sort_unstable();
        scopes.into_iter().map(|(_, name)| name).collect()
    }

    /// Returns `true` if nothing was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.globals.is_empty() && self.scopes.is_empty()
    }

    fn add_globals(&mut self, node: NodeRef<'_>) {
        // `GLOBALS "file"` names declarations that live elsewhere.
        let Some(declarations) = GlobalDeclaration::cast(node).and_then(|g| g.type_declarations())
        else {
            return;
        };
        push_unique(&mut self.globals, declarations.declared_names());
    }

    fn scope(&mut self, name: &str) -> &mut Vec<SmolStr> {
        &mut self
            .scopes
            .entry(scope_key(name))
            .or_insert_with(|| Scope {
                name: SmolStr::new(name),
                locals: Vec::new(),
            })
            .locals
    }

    fn add_parameters(&mut self, name: &str, parameters: Option<ParameterList<'_>>) {
        let locals = self.scope(name);
        if let Some(parameters) = parameters {
            push_unique(locals, parameters.parameters());
        }
    }

    fn add_declarations(&mut self, name: &str, declarations: Option<TypeDeclarations<'_>>) {
        let locals = self.scope(name);
        if let Some(declarations) = declarations {
            push_unique(locals, declarations.declared_names());
        }
    }
}

fn scope_key(name: &str) -> SmolStr {
    SmolStr::new(name.to_lowercase())
}

fn push_unique<'t>(names: &mut Vec<SmolStr>, tokens: impl Iterator<Item = TokenRef<'t>>) {
    for token in tokens {
        let name = ast::name_text(token);
        if !names.iter().any(|known| known.eq_ignore_ascii_case(name)) {
            names.push(SmolStr::new(name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: &str = "\
GLOBALS
  DEFINE g_count INTEGER,
         g_name CHAR(20)
END GLOBALS

MAIN
  DEFINE m_total DECIMAL(10,2)
  CALL Summarise(1)
END MAIN

FUNCTION Summarise(p_level)
  DEFINE p_level SMALLINT
  DEFINE l_row RECORD
    id INTEGER,
    label CHAR(10)
  END RECORD
  RETURN p_level
END FUNCTION

REPORT listing(r_line)
  DEFINE r_line CHAR(80)
  FORMAT
    ON EVERY ROW
      PRINT r_line
END REPORT
";

    #[test]
    fn collects_globals_and_locals() {
        let tree = fgl_syntax::parse(PROGRAM);
        assert!(tree.ok(), "{:?}", tree.diagnostics());
        let facts = Facts::extract(&tree);

        assert_eq!(facts.globals(), ["g_count", "g_name"]);
        assert_eq!(facts.locals(MAIN_SCOPE), ["m_total"]);
        assert_eq!(facts.locals("summarise"), ["p_level", "l_row"]);
        assert_eq!(facts.locals("SUMMARISE"), facts.locals("Summarise"));
        assert_eq!(facts.locals("listing"), ["r_line"]);
        assert!(facts.locals("missing").is_empty());
        assert_eq!(facts.scopes(), ["listing", "main", "Summarise"]);
    }

    #[test]
    fn globals_file_form_declares_nothing() {
        let tree = fgl_syntax::parse("GLOBALS \"globals.4gl\"\nMAIN\nEND MAIN\n");
        let facts = Facts::extract(&tree);
        assert!(facts.globals().is_empty());
        assert!(facts.locals(MAIN_SCOPE).is_empty());
        assert_eq!(facts.scopes(), ["main"]);
    }

    #[test]
    fn tree_without_root_gives_no_facts() {
        let tree = fgl_syntax::Language::informix().parse_with(
            "MAIN\n) ) ) ) ) ) ) )\nEND MAIN\n",
            &fgl_syntax::ParserConfig {
                max_recovery_attempts: 0,
                ..fgl_syntax::ParserConfig::default()
            },
        );
        assert!(tree.root().is_none());
        assert!(Facts::extract(&tree).is_empty());
    }
}
