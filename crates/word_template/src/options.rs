//! Template loading and substitution options

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happens when a placeholder's key path does not resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Substitute empty text and log a warning
    #[default]
    Blank,
    /// Fail the save before anything is written
    Fail,
}

/// Options for a template document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateOptions {
    /// Archive entry holding the document body; discovered from the package
    /// relationships when unset
    pub main_part: Option<String>,
    /// Match key path segments ignoring ASCII case
    pub case_insensitive: bool,
    /// Handling of key paths that resolve to nothing
    pub unresolved: UnresolvedPolicy,
    /// XML-escape substituted values
    pub escape_values: bool,
    /// Directory for working copies; the system temp directory when unset
    pub temp_dir: Option<PathBuf>,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            main_part: None,
            case_insensitive: true,
            unresolved: UnresolvedPolicy::Blank,
            escape_values: true,
            temp_dir: None,
        }
    }
}

impl TemplateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed main part name
    pub fn with_main_part(mut self, name: impl Into<String>) -> Self {
        self.main_part = Some(name.into());
        self
    }

    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    pub fn with_unresolved(mut self, policy: UnresolvedPolicy) -> Self {
        self.unresolved = policy;
        self
    }

    pub fn with_escape_values(mut self, escape: bool) -> Self {
        self.escape_values = escape;
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }
}
