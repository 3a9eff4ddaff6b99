//! Emperor mode: one process supervising many vassal instances.

use uwsgiconf_core::Section;

/// Emperor parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmperorParams {
    /// Vassal config directories, globs or monitor URIs.
    pub vassals_home: Vec<String>,
    /// Emperor process name.
    pub name: Option<String>,
    /// Seconds between scans.
    pub scan_interval: Option<u32>,
    /// Emperor pidfile.
    pub pid_file: Option<String>,
    /// Starts the emperor before anything else.
    pub spawn_asap: Option<bool>,
    /// Stats server address.
    pub stats_address: Option<String>,
    /// Socket triggering vassal events.
    pub trigger_socket: Option<String>,
    /// Does not follow symlinks when checking vassal mtimes.
    pub links_no_follow: Option<bool>,
}

/// Emperor command socket parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmperorCommandParams {
    /// Command socket path.
    pub command_socket: Option<String>,
    /// Vassals wait for a command before starting.
    pub wait_for_command: Option<bool>,
    /// Vassals exempt from `wait_for_command`.
    pub wait_for_command_exclude: Vec<String>,
}

/// Vassal binary wrapper parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VassalsWrapperParams {
    /// Binary used to run vassals.
    pub wrapper: Option<String>,
    /// Binaries tried before `wrapper`.
    pub overrides: Vec<String>,
    /// Binaries tried when `wrapper` fails.
    pub fallbacks: Vec<String>,
}

/// Tyrant mode parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TyrantParams {
    /// Runs vassals as the owner of their config file.
    pub enable: Option<bool>,
    /// Does not follow symlinks when checking ownership.
    pub links_no_follow: Option<bool>,
    /// Applies supplementary groups of the owner.
    pub use_initgroups: Option<bool>,
}

/// Broodlord mode parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroodlordParams {
    /// Maximum zerg instances.
    pub zerg_count: Option<u32>,
    /// Seconds of overload before a vassal asks for reinforcements.
    pub vassal_overload_sos_interval: Option<u32>,
    /// Listen queue items that trigger reinforcements.
    pub vassal_queue_items_sos: Option<u32>,
}

/// Empire option group.
#[derive(Debug)]
pub struct Empire<'a> {
    section: &'a mut Section,
}

impl<'a> Empire<'a> {
    pub(crate) fn new(section: &'a mut Section) -> Self {
        Self { section }
    }

    /// Sets emperor parameters.
    pub fn set_emperor_params(self, params: EmperorParams) -> &'a mut Section {
        for home in params.vassals_home {
            self.section.add("emperor", home);
        }
        self.section
            .set("emperor-procname", params.name)
            .set("emperor-freq", params.scan_interval)
            .set("emperor-pidfile", params.pid_file)
            .set("early-emperor", params.spawn_asap)
            .set("emperor-stats", params.stats_address)
            .set("emperor-trigger-socket", params.trigger_socket)
            .set("emperor-nofollow", params.links_no_follow)
    }

    /// Sets command socket parameters.
    pub fn set_emperor_command_params(self, params: EmperorCommandParams) -> &'a mut Section {
        self.section
            .set("emperor-command-socket", params.command_socket)
            .set("emperor-wait-for-command", params.wait_for_command);
        for vassal in params.wait_for_command_exclude {
            self.section.add("emperor-wait-for-command-ignore", vassal);
        }
        self.section
    }

    /// Sets the binary used to run vassals.
    pub fn set_vassals_wrapper_params(self, params: VassalsWrapperParams) -> &'a mut Section {
        self.section.set("emperor-wrapper", params.wrapper);
        for binary in params.overrides {
            self.section.add("emperor-wrapper-override", binary);
        }
        for binary in params.fallbacks {
            self.section.add("emperor-wrapper-fallback", binary);
        }
        self.section
    }

    /// Sets tyrant mode parameters.
    pub fn set_mode_tyrant_params(self, params: TyrantParams) -> &'a mut Section {
        self.section
            .set("emperor-tyrant", params.enable)
            .set("emperor-tyrant-nofollow", params.links_no_follow)
            .set("emperor-tyrant-initgroups", params.use_initgroups)
    }

    /// Sets broodlord mode parameters.
    pub fn set_mode_broodlord_params(self, params: BroodlordParams) -> &'a mut Section {
        self.section
            .set("emperor-broodlord", params.zerg_count)
            .set("vassal-sos", params.vassal_overload_sos_interval)
            .set("vassal-sos-backlog", params.vassal_queue_items_sos)
    }
}
