//! Loggers.
//!
//! Loggers are stored under `logger` (or its request and per-worker variants,
//! see `Logging::add_logger`) and render as `[alias=]name[:args]`.

use uwsgiconf_core::ParamValue;

/// A log destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logger {
    value: ParamValue,
}

impl Logger {
    fn new(name: &str, alias: Option<&str>) -> Self {
        Self {
            value: ParamValue::new("logger", name).alias(alias),
        }
    }

    fn map(mut self, f: impl FnOnce(ParamValue) -> ParamValue) -> Self {
        self.value = f(self.value);
        self
    }

    /// Logger alias, used to attach encoders and routes.
    pub fn alias(&self) -> Option<&str> {
        self.value.alias_name()
    }

    /// The stored value.
    pub fn value(&self) -> &ParamValue {
        &self.value
    }
}

/// Logs into a file.
#[must_use]
pub fn file(path: &str, alias: Option<&str>) -> Logger {
    Logger::new("file", alias).map(|v| v.arg(path))
}

/// Logs into standard output/error.
#[must_use]
pub fn stdio(alias: Option<&str>) -> Logger {
    Logger::new("stdio", alias)
}

/// Logs into a UDP or unix datagram socket.
#[must_use]
pub fn socket(address: &str, alias: Option<&str>) -> Logger {
    Logger::new("socket", alias).map(|v| v.arg(address))
}

/// Logs into the local syslog.
#[must_use]
pub fn syslog(app_name: Option<&str>, facility: Option<&str>, alias: Option<&str>) -> Logger {
    Logger::new("syslog", alias).map(|v| v.args_joiner(",").arg(app_name).arg(facility))
}

/// Logs into a Redis pub/sub channel.
#[must_use]
pub fn redis(
    host: Option<&str>,
    command: Option<&str>,
    prefix: Option<&str>,
    alias: Option<&str>,
) -> Logger {
    Logger::new("redislog", alias).map(|v| {
        v.args_joiner(",")
            .arg(host)
            .arg(command)
            .arg(prefix)
            .plugin("redislog")
    })
}

/// Logs into a MongoDB collection.
#[must_use]
pub fn mongo(
    host: Option<&str>,
    collection: Option<&str>,
    node: Option<&str>,
    alias: Option<&str>,
) -> Logger {
    Logger::new("mongodblog", alias).map(|v| {
        v.args_joiner(",")
            .arg(host)
            .arg(collection)
            .arg(node)
            .plugin("mongodblog")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_logger() {
        assert_eq!(file("/tmp/u.log", Some("f")).value().to_string(), "f=file:/tmp/u.log");
        assert_eq!(file("/tmp/u.log", None).value().to_string(), "file:/tmp/u.log");
    }

    #[test]
    fn test_stdio_logger() {
        assert_eq!(stdio(None).value().to_string(), "stdio");
    }

    #[test]
    fn test_syslog_skips_trailing() {
        assert_eq!(syslog(Some("app"), None, None).value().to_string(), "syslog:app");
        assert_eq!(
            syslog(None, Some("local0"), None).value().to_string(),
            "syslog:,local0"
        );
    }

    #[test]
    fn test_redis_plugin() {
        let logger = redis(Some("127.0.0.1:6379"), None, None, Some("r"));
        assert_eq!(logger.value().required_plugin(), Some("redislog"));
        assert_eq!(logger.value().to_string(), "r=redislog:127.0.0.1:6379");
        assert_eq!(logger.alias(), Some("r"));
    }

    #[test]
    fn test_mongo_plugin() {
        let logger = mongo(None, Some("uwsgi.logs"), None, None);
        assert_eq!(logger.value().required_plugin(), Some("mongodblog"));
        assert_eq!(logger.value().to_string(), "mongodblog:,uwsgi.logs");
    }
}
