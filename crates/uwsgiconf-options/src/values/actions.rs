//! Hook actions.
//!
//! Actions run at a [`HookPhase`] of the server lifecycle and render as
//! `name:args`, e.g. `hook-asap = mkdir:/run/app`.

use std::fmt;

use uwsgiconf_core::ParamValue;

/// Lifecycle phase a hook runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    /// As soon as possible.
    Asap,
    /// Before jailing.
    PreJail,
    /// Inside the jail, before privileges drop.
    InJail,
    /// After jailing.
    PostJail,
    /// As root, before privileges drop.
    AsRoot,
    /// After privileges drop.
    AsUser,
    /// When the master starts.
    MasterStart,
    /// Before the app loads.
    PreAppLoad,
    /// After the app loads.
    PostAppLoad,
    /// As the unprivileged user on exit.
    AsUserAtExit,
}

impl HookPhase {
    const fn name(self) -> &'static str {
        match self {
            Self::Asap => "asap",
            Self::PreJail => "pre-jail",
            Self::InJail => "in-jail",
            Self::PostJail => "post-jail",
            Self::AsRoot => "as-root",
            Self::AsUser => "as-user",
            Self::MasterStart => "master-start",
            Self::PreAppLoad => "pre-app",
            Self::PostAppLoad => "post-app",
            Self::AsUserAtExit => "as-user-atexit",
        }
    }

    /// Option key for hooks in this phase.
    pub fn key(self) -> String {
        format!("hook-{}", self.name())
    }
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A hook action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    value: ParamValue,
}

impl Action {
    fn new(name: &str) -> Self {
        Self {
            value: ParamValue::new("hook", name),
        }
    }

    fn map(mut self, f: impl FnOnce(ParamValue) -> ParamValue) -> Self {
        self.value = f(self.value);
        self
    }

    /// The action value.
    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    /// Marks the action as provided by a plugin.
    #[must_use]
    pub fn with_plugin(self, plugin: &str) -> Self {
        self.map(|v| v.plugin(plugin))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

/// Runs a shell command.
#[must_use]
pub fn exec(command: &str) -> Action {
    Action::new("exec").map(|v| v.arg(command))
}

/// Calls a function in the server address space.
#[must_use]
pub fn call(function: &str) -> Action {
    Action::new("call").map(|v| v.arg(function))
}

/// Mounts a filesystem.
#[must_use]
pub fn mount(fs: &str, source: &str, target: &str, flags: Option<&str>) -> Action {
    Action::new("mount").map(|v| v.arg(fs).arg(source).arg(target).arg(flags))
}

/// Removes a file.
#[must_use]
pub fn unlink(path: &str) -> Action {
    Action::new("unlink").map(|v| v.arg(path))
}

/// Creates a directory.
#[must_use]
pub fn mkdir(path: &str) -> Action {
    Action::new("mkdir").map(|v| v.arg(path))
}

/// Changes the working directory.
#[must_use]
pub fn chdir(path: &str) -> Action {
    Action::new("cd").map(|v| v.arg(path))
}

/// Prints a message.
#[must_use]
pub fn print(text: &str) -> Action {
    Action::new("print").map(|v| v.arg(text))
}

/// Writes a string into a file.
#[must_use]
pub fn write(path: &str, content: &str) -> Action {
    Action::new("write").map(|v| v.arg(path).arg(content))
}
