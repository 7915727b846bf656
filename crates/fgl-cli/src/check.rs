//! `fgl check`: parse files and print their diagnostics.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use fgl_ide::{AnalysisConfig, FilesConfig};
use fgl_syntax::{Language, Severity};

/// Summary of one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
}

pub fn run(config: Option<&Path>, paths: &[String]) -> anyhow::Result<CheckSummary> {
    let config = match config {
        Some(path) => AnalysisConfig::from_path(path)?,
        None => AnalysisConfig::load(&std::env::current_dir()?),
    };
    if let Some(path) = &config.config_path {
        tracing::debug!(config = %path.display(), "using configuration");
    }

    let (files, problems) = collect_files(paths, &config.files);
    let mut summary = CheckSummary::default();
    for problem in &problems {
        summary.errors += 1;
        println!("{problem}");
    }

    let language = Language::informix();
    for file in files {
        let text = match std::fs::read_to_string(&file) {
            Ok(text) => text,
            Err(err) => {
                summary.errors += 1;
                println!("{}: error: failed to read: {err}", file.display());
                continue;
            }
        };
        let tree = language.parse_with(&text, &config.parser);
        summary.files += 1;
        for diagnostic in tree.diagnostics() {
            match diagnostic.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
            }
            println!(
                "{}:{}:{}: {}: {}",
                file.display(),
                diagnostic.line,
                diagnostic.column,
                diagnostic.severity,
                diagnostic.message
            );
        }
    }
    println!(
        "{} file(s) checked, {} error(s), {} warning(s)",
        summary.files, summary.errors, summary.warnings
    );
    Ok(summary)
}

/// Expands `paths` into source files. Entries that cannot be expanded are
/// returned as `entry: error: message` lines and do not stop the others.
fn collect_files(paths: &[String], files: &FilesConfig) -> (BTreeSet<PathBuf>, Vec<String>) {
    let mut found = BTreeSet::new();
    let mut problems = Vec::new();
    for entry in paths {
        let path = Path::new(entry);
        if path.is_file() {
            found.insert(path.to_path_buf());
            continue;
        }
        let pattern = if path.is_dir() {
            format!("{}/**/*", glob::Pattern::escape(entry))
        } else {
            entry.clone()
        };
        let candidates = match glob::glob(&pattern) {
            Ok(candidates) => candidates,
            Err(err) => {
                problems.push(format!("{entry}: error: invalid pattern: {err}"));
                continue;
            }
        };
        let mut matched = false;
        for candidate in candidates {
            match candidate {
                Ok(candidate) => {
                    if candidate.is_file() && fgl_ide::is_source_file(&candidate, files) {
                        found.insert(candidate);
                        matched = true;
                    }
                }
                Err(err) => {
                    problems.push(format!("{}: error: {}", err.path().display(), err.error()));
                }
            }
        }
        if !matched {
            tracing::warn!("no source files match {entry}");
        }
    }
    (found, problems)
}
