//! One open document: the parse of its latest text, the last parse that
//! produced a tree, and the facts of that tree.

use std::sync::Arc;

use fgl_syntax::{Language, ParseTree, ParserConfig};
use parking_lot::Mutex;
use smol_str::SmolStr;
use text_size::TextSize;

use crate::completion::completion_candidates;
use crate::facts::Facts;

#[derive(Debug, Default)]
struct State {
    current: Option<Arc<ParseTree>>,
    last_good: Option<Arc<ParseTree>>,
    facts: Arc<Facts>,
}

/// Parse cache for one document.
///
/// Parsing the same text twice returns the cached tree. A parse that yields a
/// tree becomes the last good tree and replaces the facts; a parse without a
/// tree leaves both alone, so facts may describe an older text than the
/// current diagnostics.
///
/// All methods lock the document, so one `Document` may be shared between an
/// edit handler and request handlers.
#[derive(Debug, Default)]
pub struct Document {
    config: ParserConfig,
    state: Mutex<State>,
}

impl Document {
    /// Creates a document with default parser limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document with the given parser limits.
    #[must_use]
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            state: Mutex::default(),
        }
    }

    /// Parses `text`, or returns the cached tree if `text` is unchanged.
    pub fn parse(&self, text: &str) -> Arc<ParseTree> {
        let mut state = self.state.lock();
        if let Some(current) = &state.current {
            if current.source() == text {
                tracing::debug!("parse cache hit");
                return Arc::clone(current);
            }
        }
        tracing::debug!(len = text.len(), "parse cache miss");
        let tree = Arc::new(Language::informix().parse_with(text, &self.config));
        if tree.root().is_some() {
            state.facts = Arc::new(Facts::extract(&tree));
            state.last_good = Some(Arc::clone(&tree));
        }
        state.current = Some(Arc::clone(&tree));
        tree
    }

    /// The tree of the most recent parse.
    #[must_use]
    pub fn current(&self) -> Option<Arc<ParseTree>> {
        self.state.lock().current.clone()
    }

    /// The most recent tree with a root.
    #[must_use]
    pub fn last_good(&self) -> Option<Arc<ParseTree>> {
        self.state.lock().last_good.clone()
    }

    /// Facts of the last good tree.
    #[must_use]
    pub fn facts(&self) -> Arc<Facts> {
        Arc::clone(&self.state.lock().facts)
    }

    /// Global variable names of the last good tree.
    #[must_use]
    pub fn global_variable_names(&self) -> Vec<SmolStr> {
        self.state.lock().facts.globals().to_vec()
    }

    /// Parameters and locals of function or report `name` in the last good
    /// tree; `"main"` names the main block.
    #[must_use]
    pub fn function_local_names(&self, name: &str) -> Vec<SmolStr> {
        self.state.lock().facts.locals(name).to_vec()
    }

    /// Completion candidates at `offset` in the current text.
    #[must_use]
    pub fn completion_candidates(&self, offset: TextSize) -> Vec<SmolStr> {
        let state = self.state.lock();
        let Some(current) = &state.current else {
            return Vec::new();
        };
        completion_candidates(current, state.last_good.as_deref(), &state.facts, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "\
GLOBALS
  DEFINE g_total INTEGER
END GLOBALS
FUNCTION add(p_value)
  LET g_total = g_total + p_value
END FUNCTION
";

    fn stopping_config() -> ParserConfig {
        ParserConfig {
            max_recovery_attempts: 0,
            ..ParserConfig::default()
        }
    }

    #[test]
    fn empty_before_any_parse() {
        let document = Document::new();
        assert!(document.current().is_none());
        assert!(document.last_good().is_none());
        assert!(document.global_variable_names().is_empty());
        assert!(document.function_local_names("add").is_empty());
        assert!(document.completion_candidates(TextSize::from(0)).is_empty());
    }

    #[test]
    fn identical_text_reuses_the_tree() {
        let document = Document::new();
        let first = document.parse(GOOD);
        let second = document.parse(&GOOD.to_string());
        assert!(Arc::ptr_eq(&first, &second));

        let third = document.parse("MAIN\nEND MAIN\n");
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn facts_follow_the_last_good_tree() {
        let document = Document::with_config(stopping_config());
        document.parse(GOOD);
        assert_eq!(document.global_variable_names(), ["g_total"]);
        assert_eq!(document.function_local_names("ADD"), ["p_value"]);

        let broken = document.parse("GLOBALS\n  DEFINE ) )\n");
        assert!(broken.root().is_none());
        assert!(!broken.diagnostics().is_empty());
        assert!(Arc::ptr_eq(&document.current().unwrap(), &broken));
        assert_eq!(document.last_good().unwrap().source(), GOOD);
        assert_eq!(document.global_variable_names(), ["g_total"]);

        document.parse("MAIN\n  DEFINE m INTEGER\nEND MAIN\n");
        assert!(document.global_variable_names().is_empty());
        assert_eq!(document.function_local_names("main"), ["m"]);
        assert!(document.function_local_names("add").is_empty());
    }

    #[test]
    fn completes_from_the_current_text() {
        let document = Document::new();
        let text = format!("{GOOD}FUNCTION other(p_x)\n  LET p_x = \nEND FUNCTION\n");
        let tree = document.parse(&text);
        assert!(tree.root().is_some());
        let offset = TextSize::of(text.as_str()) - TextSize::of("\nEND FUNCTION\n");
        assert_eq!(
            document.completion_candidates(offset),
            ["p_x", "g_total"]
        );
    }

    #[test]
    fn shared_between_threads() {
        let document = Arc::new(Document::new());
        let handles: Vec<_> = (0..4)
            .map(|index| {
                let document = Arc::clone(&document);
                std::thread::spawn(move || {
                    let text = format!("MAIN\n  DEFINE v{index} INTEGER\nEND MAIN\n");
                    document.parse(&text).ok()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(document.function_local_names("main").len(), 1);
    }
}
