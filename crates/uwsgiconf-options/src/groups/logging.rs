//! Loggers, encoders and log filtering.

use uwsgiconf_core::Section;

use crate::encoders::Encoder;
use crate::loggers::Logger;

/// Date prefix for log lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDate {
    /// The server's default date format.
    Enabled,
    /// A `strftime` style format.
    Format(String),
}

/// Basic logging parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingParams {
    /// Disables request logging.
    pub no_requests: Option<bool>,
    /// Request log line template, see [`vars`].
    pub template: Option<String>,
    /// Adds memory usage to request lines.
    pub memory_report: Option<bool>,
    /// Prefix for every line.
    pub prefix: Option<String>,
    /// Prefixes lines with a date.
    pub prefix_date: Option<LogDate>,
    /// Formats `template` dates with `strftime`.
    ///
    /// When enabled, `%` in a `prefix_date` format is doubled so the server
    /// does not read it as a magic variable.
    pub apply_strftime: Option<bool>,
    /// Reports response times in microseconds.
    pub response_micros: Option<bool>,
    /// Logs the `X-Forwarded-For` address instead of the peer address.
    pub ip_x_forwarded_for: Option<bool>,
}

/// Log file handling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileParams {
    /// Reopens the file on reload.
    pub reopen_on_reload: Option<bool>,
    /// Truncates the file on startup.
    pub truncate_on_startup: Option<bool>,
    /// Rotates the file past this many bytes.
    pub max_size: Option<u64>,
    /// Name for the rotated file.
    pub rotation_fname: Option<String>,
    /// Files whose modification reopens the log.
    pub touch_reopen: Vec<String>,
    /// Files whose modification rotates the log.
    pub touch_rotate: Vec<String>,
    /// Log file owner.
    pub owner: Option<String>,
    /// Log file mode.
    pub mode: Option<String>,
}

/// Line filters by regex.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiltersParams {
    /// Only lines matching one of these are logged.
    pub include: Vec<String>,
    /// Lines matching one of these are dropped.
    pub exclude: Vec<String>,
    /// Ignores write errors on the log target.
    pub ignore_write_errors: Option<bool>,
    /// Ignores SIGPIPE on the log target.
    pub ignore_sigpipe: Option<bool>,
}

/// Request line filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestsFiltersParams {
    /// Logs requests slower than this many milliseconds.
    pub slower: Option<u32>,
    /// Logs responses bigger than this many bytes.
    pub bigger: Option<u64>,
    /// Logs 4xx responses.
    pub status_4xx: Option<bool>,
    /// Logs 5xx responses.
    pub status_5xx: Option<bool>,
    /// Logs responses without a body.
    pub no_body: Option<bool>,
    /// Logs sendfile requests.
    pub sendfile: Option<bool>,
    /// Logs requests with I/O errors.
    pub io_errors: Option<bool>,
}

/// Master logging parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterLoggingParams {
    /// Delegates logging to the master.
    pub enable: Option<bool>,
    /// Uses a dedicated logging thread.
    pub dedicate_thread: Option<bool>,
    /// Buffer size.
    pub buffer: Option<u32>,
    /// Uses stream sockets to collect logs.
    pub sock_stream: Option<bool>,
    /// Uses stream sockets for request logs only.
    pub sock_stream_requests_only: Option<bool>,
}

/// Log format variables for [`LoggingParams::template`].
pub mod vars {
    use uwsgiconf_core::TemplatedValue;

    /// Request URI.
    pub const REQUEST_URI: &str = "%(uri)";
    /// Request method.
    pub const REQUEST_METHOD: &str = "%(method)";
    /// Response status.
    pub const STATUS: &str = "%(status)";
    /// Client address.
    pub const REMOTE_ADDR: &str = "%(addr)";
    /// Response time in milliseconds.
    pub const RESPONSE_MSECS: &str = "%(msecs)";
    /// Response size in bytes.
    pub const RESPONSE_SIZE: &str = "%(size)";
    /// Request start as a unix timestamp.
    pub const TIME_UNIX: &str = "%(time)";
    /// Worker id.
    pub const WORKER_ID: &str = "%(wid)";

    /// Value of a metric.
    #[must_use]
    pub fn metric(name: &str) -> TemplatedValue {
        TemplatedValue::new("%(metric.{})", [name])
    }

    /// Value of a request variable.
    #[must_use]
    pub fn request_var(name: &str) -> TemplatedValue {
        TemplatedValue::new("%(var.{})", [name])
    }
}

/// Logging option group.
#[derive(Debug)]
pub struct Logging<'a> {
    section: &'a mut Section,
}

impl<'a> Logging<'a> {
    pub(crate) fn new(section: &'a mut Section) -> Self {
        Self { section }
    }

    /// Sets basic logging parameters.
    pub fn set_basic_params(self, params: LoggingParams) -> &'a mut Section {
        self.section
            .set("disable-logging", params.no_requests)
            .set("log-format", params.template)
            .set("memory-report", params.memory_report)
            .set("log-prefix", params.prefix);
        match params.prefix_date {
            Some(LogDate::Enabled) => {
                self.section.set("log-date", true);
            }
            Some(LogDate::Format(format)) => {
                let format = if params.apply_strftime == Some(true) {
                    format.replace('%', "%%")
                } else {
                    format
                };
                self.section.set("log-date", format);
            }
            None => {}
        }
        self.section
            .set("log-strftime", params.apply_strftime)
            .set("log-micros", params.response_micros)
            .set("log-x-forwarded-for", params.ip_x_forwarded_for)
    }

    /// Logs into a file or UDP address; `before_priv_drop` opens it as root.
    pub fn log_into(self, target: &str, before_priv_drop: bool) -> &'a mut Section {
        let key = if before_priv_drop { "logto" } else { "logto2" };
        self.section.set(key, target)
    }

    /// Sets log file handling.
    pub fn set_file_params(self, params: FileParams) -> &'a mut Section {
        self.section
            .set("log-reopen", params.reopen_on_reload)
            .set("log-truncate", params.truncate_on_startup)
            .set("log-maxsize", params.max_size)
            .set("log-backupname", params.rotation_fname);
        for path in params.touch_reopen {
            self.section.add("touch-logreopen", path);
        }
        for path in params.touch_rotate {
            self.section.add("touch-logrotate", path);
        }
        self.section
            .set("logfile-chown", params.owner)
            .set("logfile-chmod", params.mode)
    }

    /// Filters log lines by regex.
    pub fn set_filters(self, params: FiltersParams) -> &'a mut Section {
        for pattern in params.include {
            self.section.add("log-filter", pattern);
        }
        for pattern in params.exclude {
            self.section.add("log-drain", pattern);
        }
        self.section
            .set("ignore-write-errors", params.ignore_write_errors)
            .set("ignore-sigpipe", params.ignore_sigpipe)
    }

    /// Logs only selected requests.
    pub fn set_requests_filters(self, params: RequestsFiltersParams) -> &'a mut Section {
        self.section
            .set("log-slow", params.slower)
            .set("log-big", params.bigger)
            .set("log-4xx", params.status_4xx)
            .set("log-5xx", params.status_5xx)
            .set("log-zero", params.no_body)
            .set("log-sendfile", params.sendfile)
            .set("log-ioerror", params.io_errors)
    }

    /// Sets master logging parameters.
    pub fn set_master_logging_params(self, params: MasterLoggingParams) -> &'a mut Section {
        self.section
            .set("log-master", params.enable)
            .set("threaded-logger", params.dedicate_thread)
            .set("log-master-bufsize", params.buffer)
            .set("log-master-stream", params.sock_stream)
            .set("log-master-req-stream", params.sock_stream_requests_only)
    }

    /// Adds a logger for all lines, request lines only, or a single worker.
    pub fn add_logger(
        self,
        logger: &Logger,
        requests_only: bool,
        for_single_worker: bool,
    ) -> &'a mut Section {
        let key = match (for_single_worker, requests_only) {
            (false, false) => "logger",
            (false, true) => "req-logger",
            (true, false) => "worker-logger",
            (true, true) => "worker-logger-req",
        };
        self.section.set_param_as(key, logger.value(), true)
    }

    /// Routes lines matching a regex to a named logger.
    pub fn add_logger_route(
        self,
        logger_alias: &str,
        matcher: &str,
        requests_only: bool,
    ) -> &'a mut Section {
        let key = if requests_only { "log-req-route" } else { "log-route" };
        self.section.add(key, format!("{logger_alias} {matcher}"))
    }

    /// Adds encoders, optionally bound to a named logger.
    pub fn add_logger_encoder(
        self,
        encoders: impl IntoIterator<Item = Encoder>,
        logger: Option<&str>,
        requests_only: bool,
        for_single_worker: bool,
    ) -> &'a mut Section {
        let key = match (for_single_worker, requests_only) {
            (false, false) => "log-encoder",
            (false, true) => "log-req-encoder",
            (true, false) => "worker-log-encoder",
            (true, true) => "worker-log-req-encoder",
        };
        for encoder in encoders {
            self.section.set_param(&encoder.to_param(key, logger), true);
        }
        self.section
    }
}
