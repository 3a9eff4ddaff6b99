//! Alarms and their triggers.

use uwsgiconf_core::Section;

use crate::alarms::Alarm;

/// Alarm subsystem parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlarmsParams {
    /// Maximum alarm message size.
    pub msg_size: Option<u32>,
    /// Runs alarms in the master instead of a dedicated thread.
    pub cheap: Option<bool>,
    /// Seconds during which an identical alarm is not raised again.
    pub anti_loop_timeout: Option<u32>,
}

/// Declares an alarm unless the section already has it.
pub(crate) fn register(section: &mut Section, alarm: &Alarm) {
    if section.mark_registered("alarm", alarm.alias()) {
        section.set_param(alarm.value(), true);
    }
}

/// Alarms option group.
#[derive(Debug)]
pub struct Alarms<'a> {
    section: &'a mut Section,
}

impl<'a> Alarms<'a> {
    pub(crate) fn new(section: &'a mut Section) -> Self {
        Self { section }
    }

    /// Sets alarm subsystem parameters.
    pub fn set_basic_params(self, params: AlarmsParams) -> &'a mut Section {
        self.section
            .set("alarm-msg-size", params.msg_size)
            .set("alarm-cheap", params.cheap)
            .set("alarm-freq", params.anti_loop_timeout)
    }

    /// Declares an alarm. Declaring the same alias twice is a no-op.
    pub fn register_alarm(self, alarm: &Alarm) -> &'a mut Section {
        register(self.section, alarm);
        self.section
    }

    /// Raises an alarm on log lines matching a regex; `skip` instead exempts
    /// matching lines from it.
    pub fn alarm_on_log(self, alarm: &Alarm, matcher: &str, skip: bool) -> &'a mut Section {
        register(self.section, alarm);
        let key = if skip { "not-alarm-log" } else { "alarm-log" };
        self.section.add(key, format!("{} {matcher}", alarm.alias()))
    }

    /// Raises an alarm when a file descriptor becomes readable.
    pub fn alarm_on_fd_ready(
        self,
        alarm: &Alarm,
        fd: &str,
        message: &str,
        byte_count: Option<u32>,
    ) -> &'a mut Section {
        register(self.section, alarm);
        let fd = match byte_count {
            Some(count) => format!("{fd}:{count}"),
            None => fd.to_string(),
        };
        self.section
            .add("alarm-fd", format!("{} {fd} {message}", alarm.alias()))
    }

    /// Raises an alarm when the listen queue is full.
    pub fn alarm_on_queue_full(self, alarm: &Alarm) -> &'a mut Section {
        register(self.section, alarm);
        self.section.add("alarm-backlog", alarm.alias())
    }

    /// Raises an alarm when a worker segfaults.
    pub fn alarm_on_segfault(self, alarm: &Alarm) -> &'a mut Section {
        register(self.section, alarm);
        self.section.add("alarm-segfault", alarm.alias())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::test_util::{options, pair};
    use crate::{alarms, SectionGroups};

    #[test]
    fn test_triggers_share_declaration() {
        let mut section = Section::default();
        let alarm = alarms::curl("ops", "http://ops.local/hook");
        section
            .alarms()
            .alarm_on_log(&alarm, "HARAKIRI", false)
            .alarms()
            .alarm_on_queue_full(&alarm)
            .alarms()
            .alarm_on_fd_ready(&alarm, "/dev/event", "event", Some(8));
        assert_eq!(
            options(&section),
            vec![
                pair("plugin", "alarm_curl"),
                pair("alarm", "ops curl:http://ops.local/hook"),
                pair("alarm-log", "ops HARAKIRI"),
                pair("alarm-backlog", "ops"),
                pair("alarm-fd", "ops /dev/event:8 event"),
            ]
        );
    }

    #[test]
    fn test_register_twice() {
        let mut section = Section::default();
        let alarm = alarms::command("mail", "mail root");
        section
            .alarms()
            .register_alarm(&alarm)
            .alarms()
            .register_alarm(&alarm)
            .alarms()
            .alarm_on_segfault(&alarm);
        assert_eq!(
            options(&section),
            vec![pair("alarm", "mail cmd:mail root"), pair("alarm-segfault", "mail")]
        );
    }
}
