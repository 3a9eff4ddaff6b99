//! Application mounting.

use uwsgiconf_core::Section;

/// Basic application parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationsParams {
    /// Exits when no app could be loaded.
    pub exit_if_none: Option<bool>,
    /// Maximum apps per worker.
    pub max_per_worker: Option<u32>,
    /// Loads all apps into one interpreter.
    pub single_interpreter: Option<bool>,
    /// Does not fall back to the default app.
    pub no_default: Option<bool>,
    /// Strips the mountpoint from `SCRIPT_NAME`.
    pub manage_script_name: Option<bool>,
}

/// Applications option group.
#[derive(Debug)]
pub struct Applications<'a> {
    section: &'a mut Section,
}

impl<'a> Applications<'a> {
    pub(crate) fn new(section: &'a mut Section) -> Self {
        Self { section }
    }

    /// Sets basic application parameters.
    pub fn set_basic_params(self, params: ApplicationsParams) -> &'a mut Section {
        self.section
            .set("need-app", params.exit_if_none)
            .set("max-apps", params.max_per_worker)
            .set("single-interpreter", params.single_interpreter)
            .set("no-default-app", params.no_default)
            .set("manage-script-name", params.manage_script_name)
    }

    /// Mounts an app under a URL prefix; `in_worker` loads it after fork.
    pub fn mount(self, mountpoint: &str, app: &str, in_worker: bool) -> &'a mut Section {
        let key = if in_worker { "worker-mount" } else { "mount" };
        self.section.add(key, format!("{mountpoint}={app}"))
    }

    /// Loads apps in each worker instead of the master.
    ///
    /// With `affect_master` the master is reloaded too (`lazy`), otherwise
    /// only workers are (`lazy-apps`).
    pub fn switch_into_lazy_mode(self, affect_master: bool) -> &'a mut Section {
        let key = if affect_master { "lazy" } else { "lazy-apps" };
        self.section.set(key, true)
    }
}
