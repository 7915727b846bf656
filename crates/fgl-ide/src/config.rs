//! Analysis configuration loaded from `fgl.toml`.

use std::path::{Path, PathBuf};

use fgl_syntax::ParserConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// File names searched for in a project root, in order.
pub const CONFIG_FILES: &[&str] = &["fgl.toml", ".fgl.toml"];

/// Errors from the strict configuration loader.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid configuration.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
}

/// Project configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Config file the values came from, if any.
    pub config_path: Option<PathBuf>,
    /// Parser limits.
    pub parser: ParserConfig,
    /// Source file association.
    pub files: FilesConfig,
}

/// Which files are Informix 4GL sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesConfig {
    /// Extensions without the leading dot, compared case-insensitively.
    pub extensions: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["4gl".to_string()],
        }
    }
}

impl FilesConfig {
    /// Returns `true` if `path` has one of the configured extensions.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|extension| extension.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }
}

impl AnalysisConfig {
    /// Loads the configuration of a project root.
    ///
    /// A missing file gives the defaults. An unreadable or invalid file is
    /// logged and also gives the defaults.
    pub fn load(root: &Path) -> Self {
        let Some(path) = find_config_file(root) else {
            return Self::default();
        };
        match Self::from_path(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!("{err}; using default configuration");
                Self {
                    config_path: Some(path),
                    ..Self::default()
                }
            }
        }
    }

    /// Reads one configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_contents(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parses configuration text. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns the TOML error for malformed text or mistyped values.
    pub fn from_contents(contents: &str) -> Result<Self, toml::de::Error> {
        let parsed: ConfigFile = toml::from_str(contents)?;
        let defaults = ParserConfig::default();
        let parser = ParserConfig {
            max_recovery_attempts: parsed
                .parser
                .max_recovery_attempts
                .unwrap_or(defaults.max_recovery_attempts),
            max_diagnostics: parsed
                .parser
                .max_diagnostics
                .unwrap_or(defaults.max_diagnostics),
            recovery_lookahead: parsed
                .parser
                .recovery_lookahead
                .unwrap_or(defaults.recovery_lookahead)
                .max(1),
        };
        let files = match parsed.files.extensions {
            Some(extensions) => FilesConfig { extensions },
            None => FilesConfig::default(),
        };
        Ok(Self {
            config_path: None,
            parser,
            files,
        })
    }
}

/// Finds the first of [`CONFIG_FILES`] present in `root`.
#[must_use]
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    parser: ParserSection,
    #[serde(default)]
    files: FilesSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParserSection {
    max_recovery_attempts: Option<usize>,
    max_diagnostics: Option<usize>,
    recovery_lookahead: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FilesSection {
    extensions: Option<Vec<String>>,
}
