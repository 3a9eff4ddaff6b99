//! Master process, attached daemons and cron tasks.

use uwsgiconf_core::{KeyValues, Section};

/// Master process parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterParams {
    /// Enables the master process.
    pub enable: Option<bool>,
    /// Master FIFO paths for runtime commands.
    pub fifo_files: Vec<String>,
    /// Exits workers when the master dies.
    pub no_orphans: Option<bool>,
    /// Keeps the master running as root.
    pub as_root: Option<bool>,
}

/// Parameters of a daemon managed by the master.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachParams {
    /// Respawn attempts before giving up.
    pub broken_counter: Option<u32>,
    /// Pidfile of a self-daemonizing process.
    pub pid_file: Option<String>,
    /// Stops the server when the daemon dies.
    pub control: Option<bool>,
    /// The daemon daemonizes itself.
    pub daemonize: Option<bool>,
    /// Files whose modification restarts the daemon.
    pub touch_reload: Vec<String>,
    /// Signal used to stop the daemon.
    pub signal_stop: Option<u8>,
    /// Signal used to reload the daemon.
    pub signal_reload: Option<u8>,
    /// Keeps stdin attached.
    pub honour_stdin: Option<bool>,
    /// User to run as.
    pub uid: Option<String>,
    /// Group to run as.
    pub gid: Option<String>,
    /// Runs in a new pid namespace.
    pub new_pid_ns: Option<bool>,
    /// Working directory.
    pub change_dir: Option<String>,
}

/// Cron schedule. Negative values mean "every N".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CronParams {
    /// Minute.
    pub minute: Option<i32>,
    /// Hour.
    pub hour: Option<i32>,
    /// Day of month.
    pub day: Option<i32>,
    /// Month.
    pub month: Option<i32>,
    /// Day of week.
    pub weekday: Option<i32>,
    /// Skips a run while the previous one is still active.
    pub unique: Option<bool>,
    /// Seconds before a stuck task is killed.
    pub harakiri: Option<u32>,
    /// Runs only on the lord of a legion.
    pub legion: Option<String>,
}

/// Master process option group.
#[derive(Debug)]
pub struct MasterProcess<'a> {
    section: &'a mut Section,
}

impl<'a> MasterProcess<'a> {
    pub(crate) fn new(section: &'a mut Section) -> Self {
        Self { section }
    }

    /// Sets master process parameters.
    pub fn set_basic_params(self, params: MasterParams) -> &'a mut Section {
        self.section.set("master", params.enable);
        for fifo in params.fifo_files {
            self.section.add("master-fifo", fifo);
        }
        self.section
            .set("no-orphans", params.no_orphans)
            .set("master-as-root", params.as_root)
    }

    /// Runs a command managed by the master (`attach-daemon2`).
    pub fn attach_process(self, command: &str, params: AttachParams) -> &'a mut Section {
        let mut payload = KeyValues::new()
            .push("cmd", command)
            .push("freq", params.broken_counter)
            .push("pidfile", params.pid_file)
            .push("control", params.control)
            .push("daemonize", params.daemonize);
        for path in &params.touch_reload {
            payload = payload.push("touch", path);
        }
        let payload = payload
            .push("stopsignal", params.signal_stop)
            .push("reloadsignal", params.signal_reload)
            .push("stdin", params.honour_stdin)
            .push("uid", params.uid)
            .push("gid", params.gid)
            .push("ns_pid", params.new_pid_ns)
            .push("chdir", params.change_dir);
        self.section.add("attach-daemon2", payload)
    }

    /// Schedules a command (`cron2`).
    pub fn add_cron_task(self, command: &str, params: CronParams) -> &'a mut Section {
        let schedule = KeyValues::new()
            .push("minute", params.minute)
            .push("hour", params.hour)
            .push("day", params.day)
            .push("month", params.month)
            .push("week", params.weekday)
            .push("unique", params.unique)
            .push("harakiri", params.harakiri)
            .push("legion", params.legion);
        let task = if schedule.is_empty() {
            command.to_string()
        } else {
            format!("{schedule} {command}")
        };
        self.section.add("cron2", task)
    }
}
