//! Metrics, stats server and pushers.

use uwsgiconf_core::{KeyValues, Section};

use crate::alarms::Alarm;
use crate::groups::alarms::register;
use crate::metrics::Metric;
use crate::pushers::Pusher;

/// Metrics subsystem parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsParams {
    /// Enables the metrics subsystem.
    pub enable: Option<bool>,
    /// Directory where metric values are written as files.
    pub store_dir: Option<String>,
    /// Restores values from `store_dir` on startup.
    pub restore: Option<bool>,
    /// Disables per-core metrics.
    pub no_cores: Option<bool>,
}

/// Alarm raised by a threshold check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThresholdAlarm {
    /// An alarm definition, registered on first use.
    Declared(Alarm),
    /// Alias of an alarm registered elsewhere.
    Alias(String),
}

impl ThresholdAlarm {
    fn alias(&self) -> &str {
        match self {
            Self::Declared(alarm) => alarm.alias(),
            Self::Alias(alias) => alias,
        }
    }
}

impl From<Alarm> for ThresholdAlarm {
    fn from(alarm: Alarm) -> Self {
        Self::Declared(alarm)
    }
}

impl From<&str> for ThresholdAlarm {
    fn from(alias: &str) -> Self {
        Self::Alias(alias.to_string())
    }
}

impl From<String> for ThresholdAlarm {
    fn from(alias: String) -> Self {
        Self::Alias(alias)
    }
}

/// A threshold check on a metric.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThresholdParams {
    /// Metric name.
    pub name: Option<String>,
    /// Threshold value.
    pub value: Option<String>,
    /// Alarm raised when the threshold is hit.
    pub alarm: Option<ThresholdAlarm>,
    /// Seconds between checks.
    pub check_interval: Option<u32>,
    /// Value the metric is reset to after the threshold is hit.
    pub reset_to: Option<i64>,
    /// Alarm message.
    pub alarm_message: Option<String>,
}

/// Stats server parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsParams {
    /// Stats server address.
    pub address: Option<String>,
    /// Serves stats over HTTP.
    pub enable_http: Option<bool>,
    /// Minifies the JSON output.
    pub minify: Option<bool>,
    /// Omits per-core stats.
    pub no_cores: Option<bool>,
    /// Omits metrics.
    pub no_metrics: Option<bool>,
    /// Default push interval for pushers, in seconds.
    pub push_interval: Option<u32>,
}

/// Monitoring option group.
#[derive(Debug)]
pub struct Monitoring<'a> {
    section: &'a mut Section,
}

impl<'a> Monitoring<'a> {
    pub(crate) fn new(section: &'a mut Section) -> Self {
        Self { section }
    }

    /// Registers a user metric.
    pub fn register_metric(self, metric: &Metric) -> &'a mut Section {
        self.section.add("metric", metric.payload())
    }

    /// Sets metrics subsystem parameters.
    pub fn set_metrics_params(self, params: MetricsParams) -> &'a mut Section {
        self.section
            .set("enable-metrics", params.enable)
            .set("metrics-dir", params.store_dir)
            .set("metrics-dir-restore", params.restore)
            .set("metrics-no-cores", params.no_cores)
    }

    /// Adds a threshold check (`metric-threshold`).
    pub fn set_metrics_threshold(self, params: ThresholdParams) -> &'a mut Section {
        if let Some(ThresholdAlarm::Declared(alarm)) = &params.alarm {
            register(self.section, alarm);
        }
        let alarm = params.alarm.as_ref().map(ThresholdAlarm::alias);
        let payload = KeyValues::new()
            .push("key", params.name)
            .push("value", params.value)
            .push("alarm", alarm)
            .push("rate", params.check_interval)
            .push("reset", params.reset_to)
            .push("msg", params.alarm_message);
        self.section.add("metric-threshold", payload)
    }

    /// Registers a stats pusher.
    pub fn register_stats_pusher(self, pusher: &Pusher) -> &'a mut Section {
        self.section.set_param(pusher.value(), true)
    }

    /// Sets stats server parameters.
    pub fn set_stats_params(self, params: StatsParams) -> &'a mut Section {
        self.section
            .set("stats", params.address)
            .set("stats-http", params.enable_http)
            .set("stats-minified", params.minify)
            .set("stats-no-cores", params.no_cores)
            .set("stats-no-metrics", params.no_metrics)
            .set("stats-pusher-default-freq", params.push_interval)
    }

    /// Enables the embedded SNMP server.
    pub fn enable_snmp(self, address: &str, community_string: &str) -> &'a mut Section {
        self.section
            .set("snmp", address)
            .set("snmp-community", community_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::test_util::{options, pair};
    use crate::metrics::{counter, Collector};
    use crate::pushers::{carbon, CarbonParams};
    use crate::{alarms, SectionGroups};

    #[test]
    fn test_threshold_payload() {
        let mut section = Section::default();
        section.monitoring().set_metrics_threshold(ThresholdParams {
            name: Some("foo".into()),
            value: Some("100".into()),
            check_interval: Some(2),
            alarm_message: Some("high".into()),
            ..ThresholdParams::default()
        });
        assert_eq!(
            options(&section),
            vec![pair("metric-threshold", "key=foo,value=100,rate=2,msg=high")]
        );
    }

    #[test]
    fn test_threshold_registers_alarm_once() {
        let mut section = Section::default();
        let alarm = alarms::log("warn");
        for value in ["10", "20"] {
            section.monitoring().set_metrics_threshold(ThresholdParams {
                name: Some("load".into()),
                value: Some(value.into()),
                alarm: Some(alarm.clone().into()),
                reset_to: Some(0),
                ..ThresholdParams::default()
            });
        }
        assert_eq!(
            options(&section),
            vec![
                pair("alarm", "warn log"),
                pair("metric-threshold", "key=load,value=10,alarm=warn,reset=0"),
                pair("metric-threshold", "key=load,value=20,alarm=warn,reset=0"),
            ]
        );
    }

    #[test]
    fn test_threshold_refers_to_alarm_alias() {
        let mut section = Section::default();
        section
            .alarms()
            .register_alarm(&alarms::log("warn"))
            .monitoring()
            .set_metrics_threshold(ThresholdParams {
                name: Some("load".into()),
                value: Some("10".into()),
                alarm: Some("warn".into()),
                ..ThresholdParams::default()
            });
        assert_eq!(
            options(&section),
            vec![
                pair("alarm", "warn log"),
                pair("metric-threshold", "key=load,value=10,alarm=warn"),
            ]
        );
    }

    #[test]
    fn test_metrics_and_pushers() {
        let mut section = Section::default();
        section
            .monitoring()
            .register_metric(&counter("hits").with_collector(Collector::Pointer))
            .monitoring()
            .register_stats_pusher(&carbon(
                "127.0.0.1:2003",
                CarbonParams {
                    frequency: Some(60),
                    ..CarbonParams::default()
                },
            ));
        assert_eq!(
            options(&section),
            vec![
                pair("metric", "name=hits,type=counter,collector=ptr"),
                pair("plugin", "carbon"),
                pair("carbon", "127.0.0.1:2003"),
                pair("carbon-freq", "60"),
            ]
        );
    }

    #[test]
    fn test_snmp() {
        let mut section = Section::default();
        section.monitoring().enable_snmp("127.0.0.1:2222", "public");
        assert_eq!(
            options(&section),
            vec![pair("snmp", "127.0.0.1:2222"), pair("snmp-community", "public")]
        );
    }
}
