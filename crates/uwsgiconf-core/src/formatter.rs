//! Output formatters.
//!
//! Formatters are pure functions from the resolved options of a configuration
//! to an output surface. They never touch the model.

use serde::{Deserialize, Serialize};

/// One resolved option, tagged with its section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOption {
    /// Section the option belongs to.
    pub section: String,
    /// Option key.
    pub key: String,
    /// Option value with placeholders expanded.
    pub value: String,
}

/// Renders resolved options into an output surface.
pub trait Formatter {
    /// Output produced by the formatter.
    type Output;

    /// Formats options given in section then render order.
    fn format(&self, options: &[RenderedOption]) -> Self::Output;
}

/// Available formatters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FormatterKind {
    /// INI document.
    #[default]
    Ini,
    /// Command line arguments.
    Args,
}

/// Output of a formatter selected at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// INI document text.
    Ini(String),
    /// Argument vector.
    Args(Vec<String>),
}

/// INI document formatter.
///
/// A `[section]` header (preceded by a blank line) opens each run of options
/// of one section; values are stripped of surrounding whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct IniFormatter;

impl Formatter for IniFormatter {
    type Output = String;

    fn format(&self, options: &[RenderedOption]) -> String {
        let mut out = String::new();
        let mut current: Option<&str> = None;
        for option in options {
            if current != Some(option.section.as_str()) {
                out.push_str(&format!("\n[{}]\n", option.section));
                current = Some(option.section.as_str());
            }
            out.push_str(&format!("{} = {}\n", option.key, option.value.trim()));
        }
        out
    }
}

/// Command line arguments formatter.
///
/// Only options of the section named `section` are emitted. `true` values
/// collapse into a bare `--key`; two-character `%X` config variables are
/// skipped since the command line cannot expand them.
#[derive(Debug, Clone)]
pub struct ArgsFormatter {
    section: String,
}

impl ArgsFormatter {
    /// Creates a formatter for the given section name.
    #[must_use]
    pub fn new(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
        }
    }
}

impl Formatter for ArgsFormatter {
    type Output = Vec<String>;

    fn format(&self, options: &[RenderedOption]) -> Vec<String> {
        let mut args = Vec::new();
        for option in options.iter().filter(|o| o.section == self.section) {
            let value = option.value.trim();
            if value == "true" {
                args.push(format!("--{}", option.key));
            } else if value.starts_with('%') && value.chars().count() == 2 {
                continue;
            } else {
                args.push(format!("--{}", option.key));
                args.push(value.to_string());
            }
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(section: &str, key: &str, value: &str) -> RenderedOption {
        RenderedOption {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_ini_sections_and_stripping() {
        let options = vec![
            option("uwsgi", "master", "true"),
            option("uwsgi", "env", " A=1 "),
            option("extra", "workers", "2"),
        ];
        assert_eq!(
            IniFormatter.format(&options),
            "\n[uwsgi]\nmaster = true\nenv = A=1\n\n[extra]\nworkers = 2\n"
        );
    }

    #[test]
    fn test_ini_empty() {
        assert_eq!(IniFormatter.format(&[]), "");
    }

    #[test]
    fn test_args() {
        let options = vec![
            option("uwsgi", "master", "true"),
            option("uwsgi", "workers", "%k"),
            option("uwsgi", "socket", ":3031"),
            option("extra", "socket", ":3032"),
        ];
        assert_eq!(
            ArgsFormatter::new("uwsgi").format(&options),
            vec!["--master", "--socket", ":3031"]
        );
    }

    #[test]
    fn test_args_keeps_longer_percent_values() {
        let options = vec![option("uwsgi", "logformat", "%(uri)")];
        assert_eq!(
            ArgsFormatter::new("uwsgi").format(&options),
            vec!["--logformat", "%(uri)"]
        );
    }

    #[test]
    fn test_formatter_kind_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            kind: FormatterKind,
        }

        let wrapper: Wrapper = toml::from_str("kind = \"args\"").unwrap();
        assert_eq!(wrapper.kind, FormatterKind::Args);
    }
}
