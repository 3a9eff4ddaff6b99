//! Locking.

use uwsgiconf_core::Section;

/// Lock parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocksParams {
    /// Number of user locks.
    pub count: Option<u32>,
    /// Serializes `accept()` across workers.
    pub thunder_lock: Option<bool>,
    /// Lock engine (`ipcsem`, ...).
    pub lock_engine: Option<String>,
}

/// SysV IPC semaphore parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpcSemParams {
    /// Path used to derive the semaphore key.
    pub ftok: Option<String>,
    /// Keeps semaphores after exit.
    pub persistent: Option<bool>,
}

/// Locks option group.
#[derive(Debug)]
pub struct Locks<'a> {
    section: &'a mut Section,
}

impl<'a> Locks<'a> {
    pub(crate) fn new(section: &'a mut Section) -> Self {
        Self { section }
    }

    /// Sets lock parameters.
    pub fn set_basic_params(self, params: LocksParams) -> &'a mut Section {
        self.section
            .set("locks", params.count)
            .set("thunder-lock", params.thunder_lock)
            .set("lock-engine", params.lock_engine)
    }

    /// Sets IPC semaphore parameters.
    pub fn set_ipcsem_params(self, params: IpcSemParams) -> &'a mut Section {
        self.section
            .set("ftok", params.ftok)
            .set("persistent-ipcsem", params.persistent)
    }

    /// Locks a file during startup.
    ///
    /// `after_setup` takes the lock after privileges drop; `wait` blocks
    /// instead of failing when the lock is held.
    pub fn lock_file(self, path: &str, after_setup: bool, wait: bool) -> &'a mut Section {
        let key = match (wait, after_setup) {
            (false, false) => "flock",
            (false, true) => "flock2",
            (true, false) => "flock-wait",
            (true, true) => "flock-wait2",
        };
        self.section.set(key, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::test_util::{options, pair};
    use crate::SectionGroups;

    #[test]
    fn test_locks() {
        let mut section = Section::default();
        section
            .locks()
            .set_basic_params(LocksParams {
                thunder_lock: Some(true),
                ..LocksParams::default()
            })
            .locks()
            .lock_file("/tmp/app.lock", true, true);
        assert_eq!(
            options(&section),
            vec![pair("thunder-lock", "true"), pair("flock-wait2", "/tmp/app.lock")]
        );
    }
}
