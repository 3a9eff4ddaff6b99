//! Alarms.
//!
//! An alarm is declared once as `alarm = <alias> <type>:<args>` and then
//! referenced by alias from triggers (`alarm-log`, `alarm-fd`, ...).

use uwsgiconf_core::ParamValue;

/// A named alarm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm {
    alias: String,
    value: ParamValue,
}

impl Alarm {
    fn new(kind: &str, alias: &str) -> Self {
        Self {
            alias: alias.to_string(),
            value: ParamValue::new("alarm", kind)
                .alias(Some(alias))
                .alias_separator(" "),
        }
    }

    fn map(mut self, f: impl FnOnce(ParamValue) -> ParamValue) -> Self {
        self.value = f(self.value);
        self
    }

    /// Alarm alias.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The stored declaration.
    pub fn value(&self) -> &ParamValue {
        &self.value
    }
}

/// Runs a shell command with the alarm message on stdin.
#[must_use]
pub fn command(alias: &str, command: &str) -> Alarm {
    Alarm::new("cmd", alias).map(|v| v.arg(command))
}

/// Raises a uWSGI signal.
#[must_use]
pub fn signal(alias: &str, signal: u8) -> Alarm {
    Alarm::new("signal", alias).map(|v| v.arg(signal))
}

/// Writes the alarm message into the log.
#[must_use]
pub fn log(alias: &str) -> Alarm {
    Alarm::new("log", alias)
}

/// Sends the message to a mule.
#[must_use]
pub fn mule(alias: &str, mule: u32) -> Alarm {
    Alarm::new("mule", alias).map(|v| v.arg(mule))
}

/// Sends the message to a URL with curl.
#[must_use]
pub fn curl(alias: &str, url: &str) -> Alarm {
    Alarm::new("curl", alias).map(|v| v.arg(url).plugin("alarm_curl"))
}

/// Sends the message over XMPP.
#[must_use]
pub fn xmpp(alias: &str, jid: &str, password: &str, recipients: &[&str]) -> Alarm {
    Alarm::new("jabber", alias).map(|v| {
        v.args_joiner(";")
            .arg(jid)
            .arg(password)
            .arg(recipients.join(","))
            .plugin("alarm_xmpp")
    })
}
