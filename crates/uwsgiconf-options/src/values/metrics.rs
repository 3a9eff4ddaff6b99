//! Metrics and their collectors.
//!
//! A metric is registered as a single `metric = name=...,type=...` payload.

use uwsgiconf_core::{ConfigurationError, KeyValues, Result};

use crate::util::join;

/// How a metric value behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricType {
    /// Monotonically increasing value.
    Counter,
    /// Arbitrary value.
    Gauge,
    /// Absolute value, reset on every push.
    Absolute,
    /// Mirrors another metric.
    Alias {
        /// Metric this one points at.
        alias_for: String,
    },
}

impl MetricType {
    /// Alias of another metric. The target name is mandatory.
    pub fn alias(alias_for: Option<&str>) -> Result<Self> {
        let alias_for = alias_for
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ConfigurationError::missing_argument("alias_for"))?;
        Ok(Self::Alias {
            alias_for: alias_for.to_string(),
        })
    }

    const fn name(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
            Self::Absolute => "absolute",
            Self::Alias { .. } => "alias",
        }
    }
}

/// Where a metric value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collector {
    /// Reads a memory pointer maintained by the server.
    Pointer,
    /// Reads a number from a file.
    File {
        /// File to read.
        path: String,
        /// Line (0-based) holding the value.
        slot: Option<u32>,
    },
    /// Sums children metrics.
    Sum(Vec<String>),
    /// Averages children metrics.
    Average(Vec<String>),
    /// Accumulates the sum of children metrics.
    Accumulator(Vec<String>),
    /// Multiplies the sum of children metrics.
    Multiplier {
        /// Children metrics.
        children: Vec<String>,
        /// Multiplier.
        by: u32,
    },
    /// Calls a C function.
    Function(String),
}

impl Collector {
    fn push_into(&self, payload: KeyValues) -> KeyValues {
        match self {
            Self::Pointer => payload.push("collector", "ptr"),
            Self::File { path, slot } => payload
                .push("collector", "file")
                .push("arg1", path)
                .push("arg1n", *slot),
            Self::Sum(children) => payload
                .push("collector", "sum")
                .push("children", join(children, ";")),
            Self::Average(children) => payload
                .push("collector", "avg")
                .push("children", join(children, ";")),
            Self::Accumulator(children) => payload
                .push("collector", "accumulator")
                .push("children", join(children, ";")),
            Self::Multiplier { children, by } => payload
                .push("collector", "multiplier")
                .push("children", join(children, ";"))
                .push("arg1n", *by),
            Self::Function(name) => payload.push("collector", "func").push("arg1", name),
        }
    }
}

/// A user defined metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    name: String,
    kind: MetricType,
    oid: Option<String>,
    collector: Option<Collector>,
    initial_value: Option<i64>,
    collect_interval: Option<u32>,
    reset_after_push: Option<bool>,
}

impl Metric {
    /// Creates a metric.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: MetricType) -> Self {
        Self {
            name: name.into(),
            kind,
            oid: None,
            collector: None,
            initial_value: None,
            collect_interval: None,
            reset_after_push: None,
        }
    }

    /// Metric name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// SNMP object id.
    #[must_use]
    pub fn with_oid(mut self, oid: impl Into<String>) -> Self {
        self.oid = Some(oid.into());
        self
    }

    /// Value source.
    #[must_use]
    pub fn with_collector(mut self, collector: Collector) -> Self {
        self.collector = Some(collector);
        self
    }

    /// Value at startup.
    #[must_use]
    pub fn with_initial_value(mut self, value: i64) -> Self {
        self.initial_value = Some(value);
        self
    }

    /// Collection interval in seconds.
    #[must_use]
    pub fn with_collect_interval(mut self, seconds: u32) -> Self {
        self.collect_interval = Some(seconds);
        self
    }

    /// Resets the value after each push.
    #[must_use]
    pub fn with_reset_after_push(mut self, reset: bool) -> Self {
        self.reset_after_push = Some(reset);
        self
    }

    /// Renders the `metric` payload.
    pub fn payload(&self) -> KeyValues {
        let mut payload = KeyValues::new()
            .push("name", &self.name)
            .push("type", self.kind.name());
        if let MetricType::Alias { alias_for } = &self.kind {
            payload = payload.push("alias", alias_for);
        }
        payload = payload.push("oid", self.oid.as_deref());
        if let Some(collector) = &self.collector {
            payload = collector.push_into(payload);
        }
        payload
            .push("initial_value", self.initial_value)
            .push("freq", self.collect_interval)
            .push("reset_after_push", self.reset_after_push)
    }
}

/// A counter metric.
#[must_use]
pub fn counter(name: &str) -> Metric {
    Metric::new(name, MetricType::Counter)
}

/// A gauge metric.
#[must_use]
pub fn gauge(name: &str) -> Metric {
    Metric::new(name, MetricType::Gauge)
}

/// An absolute metric.
#[must_use]
pub fn absolute(name: &str) -> Metric {
    Metric::new(name, MetricType::Absolute)
}

/// An alias metric; fails without a target.
pub fn alias(name: &str, alias_for: Option<&str>) -> Result<Metric> {
    Ok(Metric::new(name, MetricType::alias(alias_for)?))
}
