//! # uwsgiconf
//!
//! **Programmatic configuration builder for the uWSGI application server**
//!
//! uWSGI is configured with hundreds of flat, loosely typed options. This crate
//! builds them from typed values and renders them as an INI document or an
//! argument vector:
//!
//! - **Sections** hold ordered options, the plugin set and a placeholder
//!   environment
//! - **Option groups** (`networking`, `logging`, `routing`, ...) expose
//!   intent-revealing setters
//! - **Values** (sockets, loggers, routers, route rules, ...) know their
//!   option key, plugin and auxiliary options
//!
//! ## Quick Start
//!
//! ```rust
//! use uwsgiconf::prelude::*;
//!
//! # fn main() -> std::result::Result<(), ConfigurationError> {
//! let mut section = Section::default();
//! section
//!     .master_process()
//!     .set_basic_params(MasterParams { enable: Some(true), ..MasterParams::default() })
//!     .workers()
//!     .set_count_auto(None)
//!     .networking()
//!     .register_socket(sockets::http(":8000"))
//!     .logging()
//!     .add_logger(&loggers::file("/var/log/app.log", None), false, false);
//!
//! let ini = section.as_configuration().format_ini(false)?;
//! assert_eq!(
//!     ini,
//!     "\n[uwsgi]\nmaster = true\nworkers = %k\nhttp-socket = :8000\nlogger = file:/var/log/app.log\n"
//! );
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export the configuration model
pub use uwsgiconf_core as core;

// Re-export option groups and value catalogs
pub use uwsgiconf_options as options;

/// Prelude module for convenient imports.
///
/// ```rust
/// use uwsgiconf::prelude::*;
/// ```
pub mod prelude {
    pub use uwsgiconf_core::{
        Configuration, ConfigurationError, FormatterKind, IncludeTarget, ParamValue,
        PluginsParams, RenderSettings, Rendered, Result, Section, SectionParams,
    };

    // Group access and parameter records
    pub use uwsgiconf_options::groups::{
        alarms::AlarmsParams,
        applications::ApplicationsParams,
        caching::{CacheParams, CachingParams},
        empire::EmperorParams,
        locks::LocksParams,
        logging::{LogDate, LoggingParams},
        main_process::{MainProcessParams, OwnerParams},
        master_process::{AttachParams, CronParams, MasterParams},
        monitoring::{MetricsParams, StatsParams, ThresholdAlarm, ThresholdParams},
        networking::{NetworkingParams, SocketParams, UnixSocketParams},
        python::{PythonParams, WsgiParams},
        statics::{ExpirationCriterion, StaticsParams, TransferMode},
        workers::{ThreadParams, WorkersParams},
    };
    pub use uwsgiconf_options::{CertbotParams, Modifier, SectionGroups};

    // Value catalogs
    pub use uwsgiconf_options::{
        actions, alarms, encoders, loggers, metrics, pushers, routers, routes, sockets,
    };
}
