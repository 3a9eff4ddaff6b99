//! Workers, threads and mules.

use uwsgiconf_core::Section;

use crate::util::join;

/// Basic worker parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkersParams {
    /// Number of worker processes.
    pub count: Option<u32>,
    /// Files whose modification triggers a chain reload.
    pub touch_chain_reload: Vec<String>,
    /// Zerg server to attach to.
    pub zerg_server: Option<String>,
    /// Address space limit in megabytes.
    pub limit_addr_space: Option<u32>,
    /// CPU cores per worker.
    pub cpu_affinity: Option<u32>,
}

/// Thread parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadParams {
    /// Enables the GIL and thread support in language plugins.
    pub enable: Option<bool>,
    /// Threads per worker.
    pub count: Option<u32>,
    /// Thread stack size in kilobytes.
    pub stack_size: Option<u32>,
    /// Does not wait for threads on shutdown.
    pub no_wait: Option<bool>,
}

/// A named group of mules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Farm {
    /// Farm name.
    pub name: String,
    /// Mule ids (1-based).
    pub mules: Vec<u32>,
}

/// Mule parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MulesParams {
    /// Number of generic mules.
    pub count: Option<u32>,
    /// Scripts, one dedicated mule each.
    pub scripts: Vec<String>,
    /// Files whose modification reloads mules.
    pub touch_reload: Vec<String>,
    /// Seconds before a stuck mule is killed.
    pub harakiri: Option<u32>,
    /// Mule farms.
    pub farms: Vec<Farm>,
}

/// Worker recycling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadParams {
    /// Minimum seconds a worker lives before it may be reloaded.
    pub min_lifetime: Option<u32>,
    /// Seconds after which a worker is reloaded.
    pub max_lifetime: Option<u32>,
    /// Requests after which a worker is reloaded.
    pub max_requests: Option<u32>,
    /// Per-worker delta added to `max_requests`.
    pub max_requests_delta: Option<u32>,
    /// Address space in megabytes that triggers a reload.
    pub max_addr_space: Option<u32>,
    /// Resident memory in megabytes that triggers a reload.
    pub max_rss: Option<u32>,
    /// Unique set size in megabytes that triggers a reload.
    pub max_uss: Option<u32>,
    /// Proportional set size in megabytes that triggers a reload.
    pub max_pss: Option<u32>,
}

/// Stuck request handling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarakiriParams {
    /// Seconds before a stuck worker is killed.
    pub timeout: Option<u32>,
    /// Logs extra details when a worker is killed.
    pub verbose: Option<bool>,
    /// Disables harakiri during after-request hooks.
    pub disable_for_arh: Option<bool>,
}

/// Workers option group.
#[derive(Debug)]
pub struct Workers<'a> {
    section: &'a mut Section,
}

impl<'a> Workers<'a> {
    pub(crate) fn new(section: &'a mut Section) -> Self {
        Self { section }
    }

    /// Sets basic worker parameters.
    pub fn set_basic_params(self, params: WorkersParams) -> &'a mut Section {
        self.section.set("workers", params.count);
        for path in params.touch_chain_reload {
            self.section.add("touch-chain-reload", path);
        }
        self.section
            .set("zerg-server", params.zerg_server)
            .set("limit-as", params.limit_addr_space)
            .set("cpu-affinity", params.cpu_affinity)
    }

    /// Sets the worker count, defaulting to one per CPU core.
    pub fn set_count_auto(self, count: Option<u32>) -> &'a mut Section {
        match count {
            Some(count) => self.section.set("workers", count),
            None => self.section.set("workers", "%k"),
        }
    }

    /// Sets thread parameters.
    pub fn set_thread_params(self, params: ThreadParams) -> &'a mut Section {
        self.section
            .set("enable-threads", params.enable)
            .set("threads", params.count)
            .set("threads-stacksize", params.stack_size)
            .set("no-threads-wait", params.no_wait)
    }

    /// Sets mule parameters.
    pub fn set_mules_params(self, params: MulesParams) -> &'a mut Section {
        self.section.set("mules", params.count);
        for script in params.scripts {
            self.section.add("mule", script);
        }
        for path in params.touch_reload {
            self.section.add("touch-mules-reload", path);
        }
        self.section.set("mule-harakiri", params.harakiri);
        for farm in params.farms {
            self.section
                .add("farm", format!("{}:{}", farm.name, join(&farm.mules, ",")));
        }
        self.section
    }

    /// Sets worker recycling parameters.
    pub fn set_reload_params(self, params: ReloadParams) -> &'a mut Section {
        self.section
            .set("min-worker-lifetime", params.min_lifetime)
            .set("max-worker-lifetime", params.max_lifetime)
            .set("max-requests", params.max_requests)
            .set("max-requests-delta", params.max_requests_delta)
            .set("reload-on-as", params.max_addr_space)
            .set("reload-on-rss", params.max_rss)
            .set("reload-on-uss", params.max_uss)
            .set("reload-on-pss", params.max_pss)
    }

    /// Sets stuck request handling.
    pub fn set_harakiri_params(self, params: HarakiriParams) -> &'a mut Section {
        self.section
            .set("harakiri", params.timeout)
            .set("harakiri-verbose", params.verbose)
            .set("harakiri-no-arh", params.disable_for_arh)
    }
}
