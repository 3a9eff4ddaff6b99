//! Render settings.
//!
//! Controls how a [`Configuration`](crate::Configuration) is rendered when the
//! caller does not pick the formatter in code, e.g. when settings come from a
//! deployment file.
//!
//! ```toml
//! formatter = "ini"
//! stamp = false
//! default_section = "uwsgi"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};
use crate::formatter::FormatterKind;
use crate::section::DEFAULT_SECTION;

/// How to render a configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RenderSettings {
    /// Output formatter.
    #[serde(default)]
    pub formatter: FormatterKind,

    /// Prepend a generator stamp comment to INI output.
    #[serde(default = "default_true")]
    pub stamp: bool,

    /// Section emitted by the arguments formatter.
    #[serde(default = "default_section")]
    pub default_section: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            formatter: FormatterKind::default(),
            stamp: true,
            default_section: default_section(),
        }
    }
}

impl RenderSettings {
    /// Parses settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads settings from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigurationError::io(path, e))?;
        Self::from_toml_str(&text)
    }
}

fn default_true() -> bool {
    true
}

fn default_section() -> String {
    DEFAULT_SECTION.to_string()
}
