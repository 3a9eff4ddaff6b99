//! Configuration sections.
//!
//! A [`Section`] owns one option store plus the bookkeeping that cross-option
//! invariants need: the plugin set, the placeholder environment, the shared
//! socket registry and the registry of named values (alarms, caches, ...).
//! Option groups are thin façades that write through [`Section::set`] and
//! friends; see the `uwsgiconf-options` crate.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::configuration::Configuration;
use crate::error::{ConfigurationError, Result};
use crate::placeholder;
use crate::store::OptionStore;
use crate::value::{IntoValue, ParamValue, Value};

/// Default section name understood by the server.
pub const DEFAULT_SECTION: &str = "uwsgi";

const PLUGIN_KEY: &str = "plugin";

/// How a value is written into the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions<'a> {
    /// Append to a list instead of replacing.
    pub multi: bool,
    /// Plugin required by the option.
    pub plugin: Option<&'a str>,
}

impl<'a> SetOptions<'a> {
    /// Options for a multi-valued write.
    #[must_use]
    pub fn multi() -> Self {
        Self {
            multi: true,
            plugin: None,
        }
    }

    /// Adds a plugin requirement.
    #[must_use]
    pub fn with_plugin(mut self, plugin: &'a str) -> Self {
        self.plugin = Some(plugin);
        self
    }
}

/// Target of an include or fallback directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeTarget {
    /// Another section of the same configuration file.
    Section(String),
    /// A configuration file path.
    File(String),
}

impl IncludeTarget {
    fn render(&self) -> String {
        match self {
            Self::Section(name) => format!(":{name}"),
            Self::File(path) => path.clone(),
        }
    }
}

impl From<&Section> for IncludeTarget {
    fn from(section: &Section) -> Self {
        Self::Section(section.name.clone())
    }
}

impl From<&str> for IncludeTarget {
    fn from(path: &str) -> Self {
        Self::File(path.to_string())
    }
}

/// Basic section parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionParams {
    /// Fail on unknown options and unresolved placeholders.
    pub strict_config: Option<bool>,
}

/// Explicit plugin loading parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginsParams {
    /// Plugins to load.
    pub plugins: Vec<String>,
    /// Directories to search for plugins.
    pub search_dirs: Vec<String>,
    /// Load plugins automatically when an unknown option is met.
    pub autoload: Option<bool>,
    /// Fail to start when a plugin cannot be loaded.
    pub required: Option<bool>,
}

/// A named unit of configuration.
///
/// # Example
///
/// ```
/// use uwsgiconf_core::Section;
///
/// let mut section = Section::default();
/// section.set("master", true).add("env", "LANG=C");
/// let options = section.options().unwrap();
/// assert_eq!(options[0], ("master".to_string(), "true".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct Section {
    name: String,
    store: OptionStore,
    plugins: IndexSet<String>,
    embedded_plugins: IndexSet<String>,
    env: IndexMap<String, String>,
    strict_config: bool,
    runtime_dir: Option<String>,
    project_name: Option<String>,
    shared_sockets: Vec<String>,
    socket_count: usize,
    registered: IndexSet<(String, String)>,
}

impl Default for Section {
    fn default() -> Self {
        Self::new(DEFAULT_SECTION)
    }
}

impl Section {
    /// Creates an empty section.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store: OptionStore::new(),
            plugins: IndexSet::new(),
            embedded_plugins: IndexSet::new(),
            env: IndexMap::new(),
            strict_config: false,
            runtime_dir: None,
            project_name: None,
            shared_sockets: Vec::new(),
            socket_count: 0,
            registered: IndexSet::new(),
        }
    }

    /// Declares plugins compiled into the server binary; they are never loaded
    /// explicitly.
    #[must_use]
    pub fn with_embedded_plugins<I, S>(mut self, plugins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.embedded_plugins
            .extend(plugins.into_iter().map(Into::into));
        self
    }

    /// Section name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether unresolved placeholders are errors.
    pub fn strict_config(&self) -> bool {
        self.strict_config
    }

    /// Read access to the option store.
    pub fn store(&self) -> &OptionStore {
        &self.store
    }

    /// Plugins required so far, in first-use order.
    pub fn plugins(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(String::as_str)
    }

    /// Sets the directory behind the `{runtime_dir}` placeholder.
    pub fn set_runtime_dir(&mut self, dir: impl Into<String>) -> &mut Self {
        self.runtime_dir = Some(dir.into());
        self
    }

    /// Sets the name behind the `{project_name}` placeholder.
    pub fn set_project_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.project_name = Some(name.into());
        self
    }

    /// Writes a single-valued option. `None` is a no-op.
    pub fn set(&mut self, key: &str, value: impl IntoValue) -> &mut Self {
        self.set_with(key, value, SetOptions::default())
    }

    /// Appends to a multi-valued option. `None` is a no-op.
    pub fn add(&mut self, key: &str, value: impl IntoValue) -> &mut Self {
        self.set_with(key, value, SetOptions::multi())
    }

    /// Writes an option with explicit store options.
    pub fn set_with(
        &mut self,
        key: &str,
        value: impl IntoValue,
        options: SetOptions<'_>,
    ) -> &mut Self {
        let Some(value) = value.into_value() else {
            return self;
        };
        if let Some(plugin) = options.plugin {
            self.require_plugin(plugin);
        }
        self.store.set(key, value, options.multi);
        if options.plugin.is_some() {
            self.store.place_after(key, PLUGIN_KEY);
        }
        self
    }

    /// Removes an option.
    pub fn remove(&mut self, key: &str) -> &mut Self {
        self.store.remove(key);
        self
    }

    /// Stores a parametrized value under its own option key.
    pub fn set_param(&mut self, value: &ParamValue, multi: bool) -> &mut Self {
        self.set_param_as(value.opt_key(), value, multi)
    }

    /// Stores a parametrized value under `key`, then merges its auxiliary
    /// options so they follow it in render order.
    pub fn set_param_as(&mut self, key: &str, value: &ParamValue, multi: bool) -> &mut Self {
        if let Some(plugin) = value.required_plugin() {
            self.require_plugin(plugin);
        }
        self.store.set(key, Value::Text(value.to_string()), multi);
        self.contribute(value);
        if value.required_plugin().is_some() {
            // Reverse order keeps the primary key ahead of its aux options.
            for option in value.aux().iter().rev() {
                self.store.place_after(&option.key, PLUGIN_KEY);
            }
            self.store.place_after(key, PLUGIN_KEY);
        }
        self
    }

    /// Merges the auxiliary options of a value into this section.
    pub fn contribute(&mut self, value: &ParamValue) -> &mut Self {
        for option in value.aux() {
            self.store.set(&option.key, option.value.clone(), option.multi);
        }
        self
    }

    /// Ensures a plugin load directive precedes the options that need it.
    pub fn require_plugin(&mut self, plugin: &str) -> &mut Self {
        if self.embedded_plugins.contains(plugin) || self.plugins.contains(plugin) {
            return self;
        }
        debug!(section = %self.name, plugin, "plugin required");
        self.plugins.insert(plugin.to_string());
        self.store.set(PLUGIN_KEY, Value::from(plugin), true);
        self
    }

    /// Sets basic section parameters.
    pub fn set_basic_params(&mut self, params: SectionParams) -> &mut Self {
        if let Some(strict) = params.strict_config {
            self.strict_config = strict;
        }
        self.set("strict", params.strict_config)
    }

    /// Loads plugins explicitly.
    pub fn set_plugins_params(&mut self, params: PluginsParams) -> &mut Self {
        let key = if params.required == Some(true) {
            "need-plugin"
        } else {
            PLUGIN_KEY
        };
        for plugin in params.plugins {
            if self.embedded_plugins.contains(&plugin) {
                continue;
            }
            if key == PLUGIN_KEY && self.plugins.contains(&plugin) {
                continue;
            }
            self.store.set(key, Value::from(plugin.as_str()), true);
            self.plugins.insert(plugin);
        }
        for dir in params.search_dirs {
            self.add("plugin-dir", dir);
        }
        self.set("autoload", params.autoload)
    }

    /// Records a process environment variable (`env = NAME=VALUE`).
    ///
    /// The value also becomes available as a `{NAME}` placeholder. With
    /// `update_local` the current process environment is updated too.
    pub fn env(&mut self, name: &str, value: &str, update_local: bool) -> &mut Self {
        if update_local {
            std::env::set_var(name, value);
        }
        self.env.insert(name.to_string(), value.to_string());
        self.add("env", format!("{name}={value}"))
    }

    /// Unsets a process environment variable (`unenv`).
    pub fn unset_env(&mut self, name: &str) -> &mut Self {
        self.env.shift_remove(name);
        self.add("unenv", name)
    }

    /// Includes another section or file.
    pub fn include(&mut self, target: impl Into<IncludeTarget>) -> &mut Self {
        let target = target.into().render();
        self.add("ini", target)
    }

    /// Configuration to load when this one fails.
    pub fn set_fallback(&mut self, target: impl Into<IncludeTarget>) -> &mut Self {
        let target = target.into().render();
        self.set("fallback-config", target)
    }

    /// Prints a line at startup.
    pub fn print_out(&mut self, text: impl IntoValue) -> &mut Self {
        self.add("print", text)
    }

    /// Lists loaded plugins at startup.
    pub fn print_plugins(&mut self) -> &mut Self {
        self.set("plugins-list", true)
    }

    /// Expands `{name}` placeholders from this section's environment.
    ///
    /// Returns `Ok(None)` for `None` input.
    pub fn replace_placeholders(&self, value: Option<&str>) -> Result<Option<String>> {
        value.map(|value| self.expand(value)).transpose()
    }

    fn expand(&self, value: &str) -> Result<String> {
        let project_runtime_dir = match (&self.runtime_dir, &self.project_name) {
            (Some(dir), Some(project)) => Some(format!("{dir}/{project}")),
            _ => None,
        };
        placeholder::expand(value, self.strict_config, |name| match name {
            "runtime_dir" if self.runtime_dir.is_some() => self.runtime_dir.as_deref(),
            "project_name" if self.project_name.is_some() => self.project_name.as_deref(),
            "project_runtime_dir" if project_runtime_dir.is_some() => {
                project_runtime_dir.as_deref()
            }
            _ => self.env.get(name).map(String::as_str),
        })
        .map_err(|unresolved| ConfigurationError::unresolved_placeholder(unresolved.0, &self.name))
    }

    /// Yields `(key, value)` pairs in render order with placeholders expanded.
    pub fn options(&self) -> Result<Vec<(String, String)>> {
        self.store
            .iter()
            .map(|(key, value)| Ok((key.to_string(), self.expand(value)?)))
            .collect()
    }

    /// Index of a registered shared socket.
    pub fn shared_socket_index(&self, shared: &str) -> Option<usize> {
        self.shared_sockets.iter().position(|known| known == shared)
    }

    /// Registers a shared socket, returning its stable index.
    ///
    /// Registering the same socket again returns the existing index and
    /// stores nothing.
    pub fn register_shared_socket(&mut self, shared: &str) -> usize {
        if let Some(index) = self.shared_socket_index(shared) {
            return index;
        }
        let index = self.shared_sockets.len();
        debug!(section = %self.name, shared, index, "shared socket registered");
        self.shared_sockets.push(shared.to_string());
        self.store.set("shared-socket", Value::from(shared), true);
        index
    }

    /// Reserves the next position in the socket list.
    pub fn next_socket_index(&mut self) -> usize {
        let index = self.socket_count;
        self.socket_count += 1;
        index
    }

    /// Marks a named value of `kind` as registered; returns false if it
    /// already was.
    pub fn mark_registered(&mut self, kind: &str, name: &str) -> bool {
        self.registered
            .insert((kind.to_string(), name.to_string()))
    }

    /// Returns a copy of this section under a new name.
    #[must_use]
    pub fn derive_from(&self, name: impl Into<String>) -> Self {
        let mut derived = self.clone();
        derived.name = name.into();
        derived
    }

    /// Wraps this section into a single-section configuration.
    #[must_use]
    pub fn as_configuration(self) -> Configuration {
        Configuration::new(vec![self])
    }
}
