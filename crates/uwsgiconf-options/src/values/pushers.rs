//! Stats pushers.
//!
//! Most pushers are stored under `stats-push`; `carbon` is a standalone option
//! carrying its tuning knobs as auxiliary options.

use uwsgiconf_core::{KeyValues, ParamValue};

/// A metrics sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pusher {
    value: ParamValue,
}

impl Pusher {
    fn stats_push(name: &str) -> ParamValue {
        ParamValue::new("stats-push", name).args_joiner(",")
    }

    /// The stored value.
    pub fn value(&self) -> &ParamValue {
        &self.value
    }
}

/// Pushes stats JSON into a file.
#[must_use]
pub fn file(path: &str, separator: Option<&str>, frequency: Option<u32>) -> Pusher {
    let payload = KeyValues::new()
        .push("path", path)
        .push("separator", separator)
        .push("freq", frequency);
    Pusher {
        value: Pusher::stats_push("file").arg(payload),
    }
}

/// Pushes metric values to a UDP socket.
#[must_use]
pub fn socket(address: &str, prefix: Option<&str>) -> Pusher {
    Pusher {
        value: Pusher::stats_push("socket").arg(address).arg(prefix),
    }
}

/// Pushes metrics to a statsd server.
#[must_use]
pub fn statsd(address: &str, prefix: Option<&str>, no_workers: Option<bool>) -> Pusher {
    Pusher {
        value: Pusher::stats_push("statsd")
            .arg(address)
            .arg(prefix)
            .plugin("stats_pusher_statsd")
            .set("statsd-no-workers", no_workers),
    }
}

/// Carbon (Graphite) pusher parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarbonParams {
    /// Push interval in seconds.
    pub frequency: Option<u32>,
    /// Metrics root node.
    pub root: Option<String>,
    /// Node id used instead of the hostname.
    pub node_id: Option<String>,
    /// Connection timeout in seconds.
    pub timeout: Option<u32>,
    /// Retries on failed pushes.
    pub retry_max: Option<u32>,
    /// Seconds between retries.
    pub retry_delay: Option<u32>,
}

/// Pushes metrics to a Carbon server.
#[must_use]
pub fn carbon(address: &str, params: CarbonParams) -> Pusher {
    Pusher {
        value: ParamValue::new("carbon", address)
            .plugin("carbon")
            .set("carbon-freq", params.frequency)
            .set("carbon-root", params.root)
            .set("carbon-id", params.node_id)
            .set("carbon-timeout", params.timeout)
            .set("carbon-max-retry", params.retry_max)
            .set("carbon-retry-delay", params.retry_delay),
    }
}
