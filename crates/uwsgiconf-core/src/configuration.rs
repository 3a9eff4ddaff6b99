//! Top-level configuration.
//!
//! A [`Configuration`] is an ordered list of sections plus the name of the
//! default one. It validates cross-section rules and drives the formatters.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use crate::error::{ConfigurationError, Result};
use crate::formatter::{
    ArgsFormatter, Formatter, FormatterKind, IniFormatter, Rendered, RenderedOption,
};
use crate::section::{IncludeTarget, Section, DEFAULT_SECTION};
use crate::settings::RenderSettings;

/// An ordered collection of sections rendered as one document.
///
/// # Example
///
/// ```
/// use uwsgiconf_core::{Configuration, Section};
///
/// let mut section = Section::default();
/// section.set("master", true);
///
/// let ini = Configuration::new(vec![section]).format_ini(false).unwrap();
/// assert_eq!(ini, "\n[uwsgi]\nmaster = true\n");
/// ```
#[derive(Debug, Clone)]
pub struct Configuration {
    sections: Vec<Section>,
    default_section: String,
    alias: Option<String>,
    autoinclude: bool,
}

impl Configuration {
    /// Creates a configuration from sections.
    #[must_use]
    pub fn new(sections: Vec<Section>) -> Self {
        Self {
            sections,
            default_section: DEFAULT_SECTION.to_string(),
            alias: None,
            autoinclude: false,
        }
    }

    /// Names the section emitted by the arguments formatter.
    #[must_use]
    pub fn with_default_section(mut self, name: impl Into<String>) -> Self {
        self.default_section = name.into();
        self
    }

    /// Sets the file stem used by [`Configuration::to_file`].
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Makes the first section include all the others.
    #[must_use]
    pub fn with_autoinclude(mut self, autoinclude: bool) -> Self {
        self.autoinclude = autoinclude;
        self
    }

    /// Sections in render order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Looks up a section by name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name() == name)
    }

    /// Name of the default section.
    pub fn default_section(&self) -> &str {
        &self.default_section
    }

    /// File stem: the alias, or the first section name.
    pub fn alias(&self) -> &str {
        self.alias
            .as_deref()
            .or_else(|| self.sections.first().map(Section::name))
            .unwrap_or(DEFAULT_SECTION)
    }

    /// Checks that there is at least one section and names are unique.
    pub fn validate(&self) -> Result<()> {
        if self.sections.is_empty() {
            return Err(ConfigurationError::NoSections);
        }
        let mut seen = HashSet::new();
        for section in &self.sections {
            if !seen.insert(section.name()) {
                return Err(ConfigurationError::duplicate_section(section.name()));
            }
        }
        Ok(())
    }

    /// Resolves every option of every section, in render order.
    pub fn rendered_options(&self) -> Result<Vec<RenderedOption>> {
        self.validate()?;
        let mut rendered = Vec::new();
        for (index, section) in self.sections.iter().enumerate() {
            let options = if index == 0 && self.autoinclude && self.sections.len() > 1 {
                let mut head = section.clone();
                for other in &self.sections[1..] {
                    head.include(IncludeTarget::from(other));
                }
                head.options()?
            } else {
                section.options()?
            };
            rendered.extend(options.into_iter().map(|(key, value)| RenderedOption {
                section: section.name().to_string(),
                key,
                value,
            }));
        }
        Ok(rendered)
    }

    /// Renders an INI document, optionally prefixed with a generator stamp.
    pub fn format_ini(&self, stamp: bool) -> Result<String> {
        let options = self.rendered_options()?;
        let body = IniFormatter.format(&options);
        debug!(sections = self.sections.len(), options = options.len(), "rendered ini");
        if stamp {
            Ok(format!("{}\n{body}", stamp_comment()))
        } else {
            Ok(body)
        }
    }

    /// Renders the default section as command line arguments.
    pub fn format_args(&self) -> Result<Vec<String>> {
        let options = self.rendered_options()?;
        Ok(ArgsFormatter::new(self.default_section.as_str()).format(&options))
    }

    /// Renders with the given formatter.
    pub fn format(&self, formatter: FormatterKind, stamp: bool) -> Result<Rendered> {
        match formatter {
            FormatterKind::Ini => self.format_ini(stamp).map(Rendered::Ini),
            FormatterKind::Args => self.format_args().map(Rendered::Args),
        }
    }

    /// Renders according to settings.
    pub fn render(&self, settings: &RenderSettings) -> Result<Rendered> {
        match settings.formatter {
            FormatterKind::Ini => self.format_ini(settings.stamp).map(Rendered::Ini),
            FormatterKind::Args => {
                let options = self.rendered_options()?;
                Ok(Rendered::Args(
                    ArgsFormatter::new(settings.default_section.as_str()).format(&options),
                ))
            }
        }
    }

    /// Writes the stamped INI document.
    ///
    /// A directory path gets `<alias>.ini` appended. Returns the written path.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let mut path = path.as_ref().to_path_buf();
        if path.is_dir() {
            path.push(format!("{}.ini", self.alias()));
        }
        let text = self.format_ini(true)?;
        fs::write(&path, text).map_err(|e| ConfigurationError::io(&path, e))?;
        debug!(path = %path.display(), "configuration written");
        Ok(path)
    }

    /// Prints the stamped INI document to stdout and returns it.
    pub fn print_ini(&self) -> Result<String> {
        let text = self.format_ini(true)?;
        println!("{text}");
        Ok(text)
    }
}

fn stamp_comment() -> String {
    format!(
        "; Generated by uwsgiconf {} on {}",
        env!("CARGO_PKG_VERSION"),
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(name: &str, key: &str, value: &str) -> Section {
        let mut section = Section::new(name);
        section.set(key, value);
        section
    }

    #[test]
    fn test_no_sections() {
        let result = Configuration::new(Vec::new()).format_ini(false);
        assert!(matches!(result, Err(ConfigurationError::NoSections)));
    }

    #[test]
    fn test_duplicate_sections() {
        let config = Configuration::new(vec![
            section("uwsgi", "a", "1"),
            section("uwsgi", "b", "2"),
        ]);
        let err = config.format_ini(false).unwrap_err();
        assert!(err.to_string().contains("duplicate section name: uwsgi"));
    }

    #[test]
    fn test_ini_multiple_sections() {
        let config = Configuration::new(vec![
            section("uwsgi", "master", "true"),
            section("extra", "workers", "2"),
        ]);
        assert_eq!(
            config.format_ini(false).unwrap(),
            "\n[uwsgi]\nmaster = true\n\n[extra]\nworkers = 2\n"
        );
    }

    #[test]
    fn test_stamp() {
        let config = Configuration::new(vec![section("uwsgi", "master", "true")]);
        let ini = config.format_ini(true).unwrap();
        assert!(ini.starts_with("; Generated by uwsgiconf "));
        assert!(ini.ends_with("\n\n[uwsgi]\nmaster = true\n"));
    }

    #[test]
    fn test_args_default_section_only() {
        let config = Configuration::new(vec![
            section("uwsgi", "socket", ":3031"),
            section("extra", "socket", ":3032"),
        ]);
        assert_eq!(config.format_args().unwrap(), vec!["--socket", ":3031"]);
    }

    #[test]
    fn test_args_other_default_section() {
        let config = Configuration::new(vec![
            section("uwsgi", "socket", ":3031"),
            section("extra", "socket", ":3032"),
        ])
        .with_default_section("extra");
        assert_eq!(config.format_args().unwrap(), vec!["--socket", ":3032"]);
    }

    #[test]
    fn test_autoinclude() {
        let config = Configuration::new(vec![
            section("uwsgi", "master", "true"),
            section("extra", "workers", "2"),
        ])
        .with_autoinclude(true);
        let ini = config.format_ini(false).unwrap();
        assert!(ini.contains("[uwsgi]\nmaster = true\nini = :extra\n"));
    }

    #[test]
    fn test_render_with_settings() {
        let config = Configuration::new(vec![section("uwsgi", "master", "true")]);
        let settings = RenderSettings {
            formatter: FormatterKind::Args,
            ..Default::default()
        };
        assert_eq!(
            config.render(&settings).unwrap(),
            Rendered::Args(vec!["--master".to_string()])
        );
    }

    #[test]
    fn test_to_file_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            Configuration::new(vec![section("uwsgi", "master", "true")]).with_alias("shop");
        let path = config.to_file(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("shop.ini"));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("master = true"));
    }

    #[test]
    fn test_alias_defaults_to_first_section() {
        let config = Configuration::new(vec![section("app", "a", "1")]);
        assert_eq!(config.alias(), "app");
    }

    #[test]
    fn test_section_lookup() {
        let config = Configuration::new(vec![section("app", "a", "1")]);
        assert!(config.section("app").is_some());
        assert!(config.section("nope").is_none());
    }
}
