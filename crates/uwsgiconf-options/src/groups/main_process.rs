//! Main process basics.

use uwsgiconf_core::{Section, SetOptions};

use crate::actions::{Action, HookPhase};

/// Basic process parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MainProcessParams {
    /// Files whose modification triggers a graceful reload.
    pub touch_reload: Vec<String>,
    /// Process scheduling priority.
    pub priority: Option<i32>,
    /// Removes sockets and pidfiles on exit.
    pub vacuum: Option<bool>,
    /// Server binary path used on reload.
    pub binary_path: Option<String>,
    /// Keeps stdin attached instead of remapping it to /dev/null.
    pub honour_stdin: Option<bool>,
}

/// Process ownership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerParams {
    /// User name or id.
    pub uid: Option<String>,
    /// Group name or id.
    pub gid: Option<String>,
    /// Supplementary groups.
    pub add_gids: Vec<String>,
    /// Drops privileges as soon as possible.
    pub set_asap: bool,
}

/// Process titles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingParams {
    /// Gives processes meaningful names.
    pub autonaming: Option<bool>,
    /// Prefix for process names.
    pub prefix: Option<String>,
    /// Suffix for process names.
    pub suffix: Option<String>,
    /// Process name.
    pub name: Option<String>,
}

/// Exit behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnExitParams {
    /// Skips exit hooks.
    pub skip_hooks: Option<bool>,
    /// Skips plugin teardown.
    pub skip_teardown: Option<bool>,
}

/// Main process option group.
#[derive(Debug)]
pub struct MainProcess<'a> {
    section: &'a mut Section,
}

impl<'a> MainProcess<'a> {
    pub(crate) fn new(section: &'a mut Section) -> Self {
        Self { section }
    }

    /// Sets basic process parameters.
    pub fn set_basic_params(self, params: MainProcessParams) -> &'a mut Section {
        for path in params.touch_reload {
            self.section.add("touch-reload", path);
        }
        self.section
            .set("prio", params.priority)
            .set("vacuum", params.vacuum)
            .set("binary-path", params.binary_path)
            .set("honour-stdin", params.honour_stdin)
    }

    /// Sets the user and groups the process runs as.
    pub fn set_owner_params(self, params: OwnerParams) -> &'a mut Section {
        let (uid_key, gid_key) = if params.set_asap {
            ("immediate-uid", "immediate-gid")
        } else {
            ("uid", "gid")
        };
        self.section.set(uid_key, params.uid).set(gid_key, params.gid);
        for gid in params.add_gids {
            self.section.add("add-gid", gid);
        }
        self.section
    }

    /// Sets process titles.
    pub fn set_naming_params(self, params: NamingParams) -> &'a mut Section {
        self.section
            .set("auto-procname", params.autonaming)
            .set("procname-prefix-spaced", params.prefix)
            .set("procname-append", params.suffix)
            .set("procname", params.name)
    }

    /// Writes the master pid into a file.
    ///
    /// `before_priv_drop` writes it as root; `safe` writes through a
    /// temporary file.
    pub fn set_pid_file(self, path: &str, before_priv_drop: bool, safe: bool) -> &'a mut Section {
        let key = match (safe, before_priv_drop) {
            (false, true) => "pidfile",
            (false, false) => "pidfile2",
            (true, true) => "safe-pidfile",
            (true, false) => "safe-pidfile2",
        };
        self.section.set(key, path)
    }

    /// Detaches from the terminal, logging into `log_into`.
    pub fn daemonize(self, log_into: &str, after_app_loading: bool) -> &'a mut Section {
        let key = if after_app_loading { "daemonize2" } else { "daemonize" };
        self.section.set(key, log_into)
    }

    /// Changes the working directory before or after loading apps.
    pub fn change_dir(self, to: &str, after_app_loading: bool) -> &'a mut Section {
        let key = if after_app_loading { "chdir2" } else { "chdir" };
        self.section.set(key, to)
    }

    /// Runs an action at a lifecycle phase.
    pub fn set_hook(self, phase: HookPhase, action: &Action) -> &'a mut Section {
        self.section
            .set_with(&phase.key(), action.to_string(), hook_options(action))
    }

    /// Runs an action when a file is touched.
    pub fn set_hook_touch(self, path: &str, action: &Action) -> &'a mut Section {
        self.section
            .set_with("hook-touch", format!("{path} {action}"), hook_options(action))
    }

    /// Sets exit behaviour.
    pub fn set_on_exit_params(self, params: OnExitParams) -> &'a mut Section {
        self.section
            .set("skip-atexit", params.skip_hooks)
            .set("skip-atexit-teardown", params.skip_teardown)
    }
}

fn hook_options(action: &Action) -> SetOptions<'_> {
    SetOptions {
        multi: true,
        plugin: action.value().required_plugin(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions;
    use crate::groups::test_util::{options, pair};
    use crate::SectionGroups;

    #[test]
    fn test_basic_params() {
        let mut section = Section::default();
        section.main_process().set_basic_params(MainProcessParams {
            touch_reload: vec!["/a".into(), "/b".into()],
            vacuum: Some(true),
            ..MainProcessParams::default()
        });
        assert_eq!(
            options(&section),
            vec![pair("touch-reload", "/a"), pair("touch-reload", "/b"), pair("vacuum", "true")]
        );
    }

    #[test]
    fn test_owner_asap() {
        let mut section = Section::default();
        section.main_process().set_owner_params(OwnerParams {
            uid: Some("www".into()),
            set_asap: true,
            ..OwnerParams::default()
        });
        assert_eq!(options(&section), vec![pair("immediate-uid", "www")]);
    }

    #[test]
    fn test_pid_file_variants() {
        let mut section = Section::default();
        section
            .main_process()
            .set_pid_file("/run/a.pid", false, true)
            .main_process()
            .change_dir("/srv", true);
        assert_eq!(
            options(&section),
            vec![pair("safe-pidfile2", "/run/a.pid"), pair("chdir2", "/srv")]
        );
    }

    #[test]
    fn test_hooks() {
        let mut section = Section::default();
        section
            .main_process()
            .set_hook(HookPhase::Asap, &actions::mkdir("/run/app"))
            .main_process()
            .set_hook(HookPhase::Asap, &actions::exec("echo hi"))
            .main_process()
            .set_hook_touch("/tmp/reload", &actions::print("touched"));
        assert_eq!(
            options(&section),
            vec![
                pair("hook-asap", "mkdir:/run/app"),
                pair("hook-asap", "exec:echo hi"),
                pair("hook-touch", "/tmp/reload print:touched"),
            ]
        );
    }

    #[test]
    fn test_plugin_hook_actions() {
        let mut section = Section::default();
        let action = actions::call("uwsgi_reload_apps").with_plugin("python3");
        section
            .main_process()
            .set_hook(HookPhase::Asap, &action)
            .main_process()
            .set_hook_touch("/tmp/reload", &action);
        assert_eq!(
            options(&section),
            vec![
                pair("plugin", "python3"),
                pair("hook-asap", "call:uwsgi_reload_apps"),
                pair("hook-touch", "/tmp/reload call:uwsgi_reload_apps"),
            ]
        );
    }

    #[test]
    fn test_none_is_noop() {
        let mut section = Section::default();
        section
            .main_process()
            .set_naming_params(NamingParams::default())
            .main_process()
            .set_on_exit_params(OnExitParams::default());
        assert!(section.store().is_empty());
    }
}
