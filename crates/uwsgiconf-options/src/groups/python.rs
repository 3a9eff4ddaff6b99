//! Python plugin.
//!
//! Every option of this group requires a python plugin. The plugin chosen
//! with `set_basic_params` (`python3` unless told otherwise) is reused by the
//! other setters.

use uwsgiconf_core::{IntoValue, Section, SetOptions};

const DEFAULT_PLUGIN: &str = "python3";

/// How the WSGI environ is handled between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WsgiEnvStrategy {
    /// Reuses one environ, clearing it after each request.
    Cheat,
    /// Creates a new environ per request.
    Holy,
}

impl WsgiEnvStrategy {
    const fn name(self) -> &'static str {
        match self {
            Self::Cheat => "cheat",
            Self::Holy => "holy",
        }
    }
}

/// Basic python parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PythonParams {
    /// Plugin name, e.g. `python` or `python311`.
    pub plugin: Option<String>,
    /// Virtualenv or python home.
    pub python_home: Option<String>,
    /// Enables threads.
    pub enable_threads: Option<bool>,
    /// Entries added to `sys.path`.
    pub search_path: Vec<String>,
    /// Value of `sys.executable`.
    pub python_binary: Option<String>,
    /// Socket path of the tracebacker.
    pub tracebacker_path: Option<String>,
    /// Reloads `os.environ` on each request.
    pub os_env_reload: Option<bool>,
    /// Optimization level.
    pub optimization_level: Option<u8>,
}

/// WSGI entrypoint parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WsgiParams {
    /// Module holding the app.
    pub module: Option<String>,
    /// Callable name.
    pub callable_name: Option<String>,
    /// Environ strategy.
    pub env_strategy: Option<WsgiEnvStrategy>,
}

/// Python option group.
#[derive(Debug)]
pub struct Python<'a> {
    section: &'a mut Section,
}

impl<'a> Python<'a> {
    pub(crate) fn new(section: &'a mut Section) -> Self {
        Self { section }
    }

    fn plugin(&self) -> String {
        self.section
            .plugins()
            .find(|plugin| plugin.starts_with("python"))
            .unwrap_or(DEFAULT_PLUGIN)
            .to_string()
    }

    fn set(self, key: &str, value: impl IntoValue, multi: bool) -> Self {
        let plugin = self.plugin();
        let options = SetOptions {
            multi,
            plugin: Some(&plugin),
        };
        self.section.set_with(key, value, options);
        self
    }

    /// Sets basic python parameters. A given `plugin` is loaded right away
    /// and used by later setters.
    pub fn set_basic_params(self, params: PythonParams) -> &'a mut Section {
        if let Some(plugin) = &params.plugin {
            self.section.require_plugin(plugin);
        }
        let mut group = self
            .set("home", params.python_home, false)
            .set("enable-threads", params.enable_threads, false);
        for path in params.search_path {
            group = group.set("pythonpath", path, true);
        }
        group
            .set("py-program-name", params.python_binary, false)
            .set("py-tracebacker", params.tracebacker_path, false)
            .set("reload-os-env", params.os_env_reload, false)
            .set("optimize", params.optimization_level, false)
            .section
    }

    /// Sets `sys.argv`.
    pub fn set_app_args<'s>(self, args: impl IntoIterator<Item = &'s str>) -> &'a mut Section {
        let args = args.into_iter().collect::<Vec<_>>().join(" ");
        let args = (!args.is_empty()).then_some(args);
        self.set("pyargv", args, false).section
    }

    /// Sets the WSGI entrypoint.
    pub fn set_wsgi_params(self, params: WsgiParams) -> &'a mut Section {
        self.set("module", params.module, false)
            .set("callable", params.callable_name, false)
            .set(
                "wsgi-env-behaviour",
                params.env_strategy.map(WsgiEnvStrategy::name),
                false,
            )
            .section
    }

    /// Evaluates python code as the WSGI entrypoint.
    pub fn eval_wsgi_entrypoint(self, code: &str) -> &'a mut Section {
        self.set("eval", code, false).section
    }

    /// Imports a module in each worker, or once in the master when `shared`.
    pub fn import_module(self, module: &str, shared: bool) -> &'a mut Section {
        let key = if shared { "shared-pyimport" } else { "pyimport" };
        self.set(key, module, true).section
    }

    /// Runs a python script and exits.
    pub fn run_module(self, script: &str) -> &'a mut Section {
        self.set("pyrun", script, false).section
    }
}
