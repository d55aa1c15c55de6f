//! Application-level settings: where the specification lives and how
//! response mismatches are reported by default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::loader::default_spec_path;
use crate::types::ResponseOptions;

/// Environment variable naming the specification source.
pub const OAS_FILE_ENV: &str = "OAS_FILE";

/// Validation middleware settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Specification source: a file path or an http(s) URL.
    pub oas_file: String,
    /// Defaults for response guards that don't override them.
    pub response: ResponseOptions,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::for_root(Path::new("."))
    }
}

impl GuardConfig {
    /// Settings with the specification at `<root>/schemas/oas.json`.
    pub fn for_root(root: &Path) -> Self {
        Self {
            oas_file: default_spec_path(root).display().to_string(),
            response: ResponseOptions::default(),
        }
    }

    /// Settings read from the process environment.
    ///
    /// `OAS_FILE` overrides the specification source (relative paths are
    /// joined to `root`); `OAS_RESPONSE_EMIT_ERROR`, `OAS_RESPONSE_EMIT_WARNING`
    /// and `OAS_RESPONSE_EMIT_LOG` override the response defaults.
    pub fn from_env(root: &Path) -> Self {
        Self::from_lookup(root, |key| std::env::var(key).ok())
    }

    fn from_lookup(root: &Path, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::for_root(root);

        if let Some(source) = lookup(OAS_FILE_ENV).filter(|s| !s.is_empty()) {
            config.oas_file = if crate::loader::is_url(&source) || Path::new(&source).is_absolute()
            {
                source
            } else {
                root.join(source).display().to_string()
            };
        }

        let flag = |key: &str, current: bool| {
            lookup(key)
                .and_then(|v| parse_flag(&v))
                .unwrap_or(current)
        };
        config.response = ResponseOptions {
            emit_error: flag("OAS_RESPONSE_EMIT_ERROR", config.response.emit_error),
            emit_warning: flag("OAS_RESPONSE_EMIT_WARNING", config.response.emit_warning),
            emit_log: flag("OAS_RESPONSE_EMIT_LOG", config.response.emit_log),
        };

        config
    }

    /// Override the specification source.
    pub fn oas_file(mut self, source: impl Into<PathBuf>) -> Self {
        self.oas_file = source.into().display().to_string();
        self
    }

    /// Override the response defaults.
    pub fn response(mut self, options: ResponseOptions) -> Self {
        self.response = options;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
