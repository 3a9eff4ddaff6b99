//! Log encoders.
//!
//! An encoder renders as `name[:logger] [args]`; the logger suffix is added
//! when the encoder is attached to a named logger.

use uwsgiconf_core::ParamValue;

/// A log line transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoder {
    name: &'static str,
    args: Option<String>,
}

impl Encoder {
    const fn new(name: &'static str, args: Option<String>) -> Self {
        Self { name, args }
    }

    /// Encoder name as the server knows it.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Builds the stored value, optionally bound to a logger alias.
    pub fn to_param(&self, opt_key: &str, logger: Option<&str>) -> ParamValue {
        let name = match logger {
            Some(logger) => format!("{}:{logger}", self.name),
            None => self.name.to_string(),
        };
        ParamValue::new(opt_key, name)
            .name_separator(" ")
            .arg(self.args.as_deref())
    }
}

/// Encodes lines as JSON using a template with `${msg}`, `${unix}` and
/// similar encoder variables.
///
/// The template goes through placeholder expansion at render time, so literal
/// JSON braces must be doubled: `{{"msg": "${msg}"}}`. `${...}` variables are
/// left for the server to fill in.
#[must_use]
pub fn json(template: Option<&str>) -> Encoder {
    Encoder::new("json", template.map(str::to_string))
}

/// Formats lines using a template.
#[must_use]
pub fn format(template: &str) -> Encoder {
    Encoder::new("format", Some(template.to_string()))
}

/// Prepends a value to each line.
#[must_use]
pub fn prefix(value: &str) -> Encoder {
    Encoder::new("prefix", Some(value.to_string()))
}

/// Appends a value to each line.
#[must_use]
pub fn suffix(value: &str) -> Encoder {
    Encoder::new("suffix", Some(value.to_string()))
}

/// Appends a newline to each line.
#[must_use]
pub fn newline() -> Encoder {
    Encoder::new("nl", None)
}

/// Gzips each line.
#[must_use]
pub fn gzip() -> Encoder {
    Encoder::new("gzip", None)
}

/// Compresses each line with zlib.
#[must_use]
pub fn compress() -> Encoder {
    Encoder::new("compress", None)
}
