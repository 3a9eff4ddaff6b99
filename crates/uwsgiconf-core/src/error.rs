//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the configuration engine.
pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Errors raised for user-detectable configuration misuse.
///
/// Every variant is a flavour of the same failure: the configuration being
/// built cannot be rendered as requested.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// A value has the wrong shape for the option it is given to.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// The option or argument with the invalid value.
        field: String,
        /// Explanation of why the value is invalid.
        reason: String,
    },

    /// A mandatory argument was not supplied.
    #[error("missing required argument: {field}")]
    MissingArgument {
        /// The missing argument name.
        field: String,
    },

    /// Two arguments that cannot be combined were both supplied.
    #[error("arguments {first} and {second} are mutually exclusive")]
    MutuallyExclusive {
        /// First conflicting argument.
        first: String,
        /// Second conflicting argument.
        second: String,
    },

    /// DSN string does not follow `scheme://address[?query]`.
    #[error("invalid DSN {dsn}: {reason}")]
    InvalidDsn {
        /// The offending DSN.
        dsn: String,
        /// Explanation of the parsing failure.
        reason: String,
    },

    /// DSN query names a parameter the socket type does not accept.
    #[error("unknown parameter {param} in DSN {dsn}")]
    UnknownDsnParam {
        /// The offending DSN.
        dsn: String,
        /// The unknown query parameter.
        param: String,
    },

    /// A `{placeholder}` could not be resolved in strict mode.
    #[error("unresolved placeholder {{{token}}} in section [{section}]")]
    UnresolvedPlaceholder {
        /// Placeholder name without braces.
        token: String,
        /// Section being rendered.
        section: String,
    },

    /// Two sections in one configuration share a name.
    #[error("duplicate section name: {name}")]
    DuplicateSection {
        /// The repeated section name.
        name: String,
    },

    /// A configuration holds no sections.
    #[error("configuration has no sections")]
    NoSections,

    /// Render settings could not be parsed.
    #[error("failed to parse render settings: {0}")]
    Settings(#[from] toml::de::Error),

    /// Failed to read or write a file.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl ConfigurationError {
    /// Create a new invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a new missing argument error.
    pub fn missing_argument(field: impl Into<String>) -> Self {
        Self::MissingArgument {
            field: field.into(),
        }
    }

    /// Create a new mutually exclusive arguments error.
    pub fn mutually_exclusive(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::MutuallyExclusive {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Create a new invalid DSN error.
    pub fn invalid_dsn(dsn: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDsn {
            dsn: dsn.into(),
            reason: reason.into(),
        }
    }

    /// Create a new unknown DSN parameter error.
    pub fn unknown_dsn_param(dsn: impl Into<String>, param: impl Into<String>) -> Self {
        Self::UnknownDsnParam {
            dsn: dsn.into(),
            param: param.into(),
        }
    }

    /// Create a new unresolved placeholder error.
    pub fn unresolved_placeholder(token: impl Into<String>, section: impl Into<String>) -> Self {
        Self::UnresolvedPlaceholder {
            token: token.into(),
            section: section.into(),
        }
    }

    /// Create a new duplicate section error.
    pub fn duplicate_section(name: impl Into<String>) -> Self {
        Self::DuplicateSection { name: name.into() }
    }

    /// Create a new I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
