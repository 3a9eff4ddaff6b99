//! Configuration object model and rendering engine for uWSGI.
//!
//! The server is configured with hundreds of flat key/value options. This crate
//! models them as:
//!
//! - [`Section`] - a named, ordered [`OptionStore`] plus the plugin set,
//!   placeholder environment and shared socket registry
//! - [`ParamValue`] - complex values (loggers, sockets, pushers, ...) that
//!   know their option key, plugin and auxiliary options
//! - [`Configuration`] - ordered sections rendered through a [`Formatter`]
//!
//! Option group façades and typed value catalogs live in `uwsgiconf-options`.
//!
//! # Example
//!
//! ```
//! use uwsgiconf_core::{Configuration, ParamValue, Section};
//!
//! # fn main() -> Result<(), uwsgiconf_core::ConfigurationError> {
//! let mut section = Section::default();
//! section
//!     .set("master", true)
//!     .env("APP_ENV", "prod", false)
//!     .set("chdir", "/srv/{APP_ENV}")
//!     .set_param(&ParamValue::new("logger", "file").arg("/tmp/u.log"), true);
//!
//! let ini = Configuration::new(vec![section]).format_ini(false)?;
//! assert_eq!(
//!     ini,
//!     "\n[uwsgi]\nmaster = true\nenv = APP_ENV=prod\nchdir = /srv/prod\nlogger = file:/tmp/u.log\n"
//! );
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod configuration;
mod error;
mod formatter;
pub mod placeholder;
mod section;
mod settings;
mod store;
mod value;

pub use configuration::Configuration;
pub use error::{ConfigurationError, Result};
pub use formatter::{
    ArgsFormatter, Formatter, FormatterKind, IniFormatter, Rendered, RenderedOption,
};
pub use section::{
    IncludeTarget, PluginsParams, Section, SectionParams, SetOptions, DEFAULT_SECTION,
};
pub use settings::RenderSettings;
pub use store::{Entry, OptionStore};
pub use value::{AuxOption, IntoValue, KeyValues, ParamValue, TemplatedValue, Value};
