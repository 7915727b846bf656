//! `fgl-ide` - Editor-facing analysis for Informix 4GL.
//!
//! Built on `fgl-syntax`:
//!
//! - **Document**: a per-document parse cache that keeps the last tree with
//!   a root and the declaration facts of that tree
//! - **Facts**: global variable names and the locals of each function,
//!   report and the main block
//! - **Line states**: incremental re-tokenization for highlighting
//! - **Completion**: candidate names at a position
//! - **Configuration**: `fgl.toml` parser limits and file association

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod completion;
pub mod config;
mod document;
mod enclosing;
pub mod facts;
pub mod line_states;

use std::path::Path;

pub use completion::completion_candidates;
pub use config::{AnalysisConfig, ConfigError, FilesConfig};
pub use document::Document;
pub use enclosing::enclosing_declaration_name;
pub use facts::{Facts, MAIN_SCOPE};
pub use line_states::{LineStates, Retokenized};

/// Returns `true` if `path` is an Informix 4GL source file under `files`.
#[must_use]
pub fn is_source_file(path: &Path, files: &FilesConfig) -> bool {
    files.matches(path)
}
