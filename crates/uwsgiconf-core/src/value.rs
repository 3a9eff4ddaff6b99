//! Option values.
//!
//! Everything stored in a section eventually renders to a string. This module
//! provides the scalar [`Value`], the [`IntoValue`] conversion that lets setters
//! accept `Option<T>` and treat `None` as "leave untouched", and the
//! [`ParamValue`] used for complex values (loggers, sockets, pushers, ...).

use std::fmt;

use smallvec::SmallVec;

/// Maximum number of positional arguments stored inline.
const INLINE_ARGS: usize = 4;

/// A scalar option value.
///
/// Booleans are kept as [`Value::Flag`] so the store can apply the boolean
/// cast: `true` renders as the literal `true`, `false` removes the option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Any textual value (numbers are rendered on conversion).
    Text(String),
    /// A boolean switch.
    Flag(bool),
}

impl Value {
    /// Returns the textual form, or `None` for a disabled flag.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Flag(true) => Some("true".to_string()),
            Self::Flag(false) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

/// Conversion into an optional [`Value`].
///
/// `None` means "not given" and makes every setter a no-op, which lets group
/// methods pass optional arguments straight through.
pub trait IntoValue {
    /// Converts into a value, `None` when absent.
    fn into_value(self) -> Option<Value>;
}

impl IntoValue for Value {
    fn into_value(self) -> Option<Value> {
        Some(self)
    }
}

impl IntoValue for Option<Value> {
    fn into_value(self) -> Option<Value> {
        self
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Option<Value> {
        Some(Value::Flag(self))
    }
}

impl IntoValue for Option<bool> {
    fn into_value(self) -> Option<Value> {
        self.map(Value::Flag)
    }
}

macro_rules! text_values {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Text(value.to_string())
                }
            }

            impl IntoValue for $ty {
                fn into_value(self) -> Option<Value> {
                    Some(Value::from(self))
                }
            }

            impl IntoValue for Option<$ty> {
                fn into_value(self) -> Option<Value> {
                    self.map(Value::from)
                }
            }
        )*
    };
}

text_values!(String, &str, &String, char, u8, u16, u32, u64, usize, i32, i64);

impl From<TemplatedValue> for Value {
    fn from(value: TemplatedValue) -> Self {
        Self::Text(value.to_string())
    }
}

impl IntoValue for TemplatedValue {
    fn into_value(self) -> Option<Value> {
        Some(self.into())
    }
}

/// An auxiliary option carried by a [`ParamValue`].
///
/// When the value is stored in a section these are merged into the host
/// store right after the primary option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxOption {
    /// Option key.
    pub key: String,
    /// Option value.
    pub value: Value,
    /// Whether the key accumulates values.
    pub multi: bool,
}

/// A complex option value with a stable text form.
///
/// Renders as `[alias<sep>]name[:arg1<joiner>arg2...]`. Trailing absent
/// arguments are dropped while absent arguments in the middle render as empty
/// strings, so positional meaning is preserved.
///
/// # Example
///
/// ```
/// use uwsgiconf_core::ParamValue;
///
/// let logger = ParamValue::new("logger", "file")
///     .alias(Some("f"))
///     .arg("/tmp/u.log");
/// assert_eq!(logger.to_string(), "f=file:/tmp/u.log");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamValue {
    opt_key: String,
    name: String,
    alias: Option<String>,
    args: SmallVec<[Option<String>; INLINE_ARGS]>,
    name_separator: &'static str,
    alias_separator: &'static str,
    args_joiner: &'static str,
    plugin: Option<String>,
    aux: Vec<AuxOption>,
}

impl ParamValue {
    /// Creates a value stored under `opt_key` and identified by `name`.
    #[must_use]
    pub fn new(opt_key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            opt_key: opt_key.into(),
            name: name.into(),
            alias: None,
            args: SmallVec::new(),
            name_separator: ":",
            alias_separator: "=",
            args_joiner: " ",
            plugin: None,
            aux: Vec::new(),
        }
    }

    /// Sets the alias (e.g. a named logger). `None` keeps the value unnamed.
    #[must_use]
    pub fn alias<S: Into<String>>(mut self, alias: Option<S>) -> Self {
        self.alias = alias.map(Into::into).filter(|alias| !alias.is_empty());
        self
    }

    /// Appends a positional argument. Absent arguments keep their slot.
    #[must_use]
    pub fn arg(mut self, value: impl IntoValue) -> Self {
        self.args.push(value.into_value().and_then(|value| value.render()));
        self
    }

    /// Appends positional arguments in order.
    #[must_use]
    pub fn args<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: IntoValue,
    {
        for value in values {
            self = self.arg(value);
        }
        self
    }

    /// Appends a `key=value` argument; skipped entirely when absent.
    ///
    /// Flags render as `key=1`.
    #[must_use]
    pub fn keyed_arg(mut self, key: &str, value: impl IntoValue) -> Self {
        let rendered = match value.into_value() {
            Some(Value::Text(text)) => text,
            Some(Value::Flag(true)) => "1".to_string(),
            Some(Value::Flag(false)) | None => return self,
        };
        self.args.push(Some(format!("{key}={rendered}")));
        self
    }

    /// Overrides the separator between the name and its arguments.
    #[must_use]
    pub fn name_separator(mut self, separator: &'static str) -> Self {
        self.name_separator = separator;
        self
    }

    /// Overrides the separator between the alias and the name.
    #[must_use]
    pub fn alias_separator(mut self, separator: &'static str) -> Self {
        self.alias_separator = separator;
        self
    }

    /// Overrides the joiner placed between arguments.
    #[must_use]
    pub fn args_joiner(mut self, joiner: &'static str) -> Self {
        self.args_joiner = joiner;
        self
    }

    /// Declares the plugin this value requires.
    #[must_use]
    pub fn plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = Some(plugin.into());
        self
    }

    /// Replaces the option key the value is stored under.
    #[must_use]
    pub fn with_opt_key(mut self, opt_key: impl Into<String>) -> Self {
        self.opt_key = opt_key.into();
        self
    }

    /// Replaces the value name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Records an auxiliary single-valued option.
    ///
    /// `None` is a no-op; `false` drops an earlier value for the key.
    #[must_use]
    pub fn set(self, key: &str, value: impl IntoValue) -> Self {
        self.push_aux(key, value, false)
    }

    /// Records an auxiliary multi-valued option.
    #[must_use]
    pub fn add(self, key: &str, value: impl IntoValue) -> Self {
        self.push_aux(key, value, true)
    }

    fn push_aux(mut self, key: &str, value: impl IntoValue, multi: bool) -> Self {
        let Some(value) = value.into_value() else {
            return self;
        };
        if value == Value::Flag(false) {
            self.aux.retain(|option| option.key != key);
            return self;
        }
        if !multi {
            if let Some(existing) = self.aux.iter_mut().find(|option| option.key == key) {
                existing.value = value;
                return self;
            }
        }
        self.aux.push(AuxOption {
            key: key.to_string(),
            value,
            multi,
        });
        self
    }

    /// Option key this value is stored under.
    pub fn opt_key(&self) -> &str {
        &self.opt_key
    }

    /// Textual identifier of the value.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alias, when the value is named.
    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Plugin requirement, if any.
    pub fn required_plugin(&self) -> Option<&str> {
        self.plugin.as_deref()
    }

    /// Auxiliary options in insertion order.
    pub fn aux(&self) -> &[AuxOption] {
        &self.aux
    }

    /// Renders the positional arguments with the joiner.
    pub fn render_args(&self) -> String {
        let used = self
            .args
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |last| last + 1);
        self.args[..used]
            .iter()
            .map(|arg| arg.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(self.args_joiner)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(alias) = &self.alias {
            write!(f, "{alias}{}", self.alias_separator)?;
        }
        f.write_str(&self.name)?;
        let args = self.render_args();
        if !args.is_empty() {
            if !self.name.is_empty() {
                f.write_str(self.name_separator)?;
            }
            f.write_str(&args)?;
        }
        Ok(())
    }
}

/// Builder for `key=value` payloads joined by a separator.
///
/// Absent values and disabled flags are skipped; enabled flags render as `1`.
///
/// ```
/// use uwsgiconf_core::KeyValues;
///
/// let payload = KeyValues::new()
///     .push("key", "foo")
///     .push("value", None::<&str>)
///     .push("rate", 2u32);
/// assert_eq!(payload.to_string(), "key=foo,rate=2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValues {
    items: Vec<(String, String)>,
    separator: &'static str,
}

impl Default for KeyValues {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValues {
    /// Creates an empty comma separated payload.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            separator: ",",
        }
    }

    /// Overrides the separator between pairs.
    #[must_use]
    pub fn separator(mut self, separator: &'static str) -> Self {
        self.separator = separator;
        self
    }

    /// Adds a pair when the value is present.
    #[must_use]
    pub fn push(mut self, key: &str, value: impl IntoValue) -> Self {
        match value.into_value() {
            Some(Value::Text(text)) => self.items.push((key.to_string(), text)),
            Some(Value::Flag(true)) => self.items.push((key.to_string(), "1".to_string())),
            Some(Value::Flag(false)) | None => {}
        }
        self
    }

    /// Returns true if no pair was added.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for KeyValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .items
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        f.write_str(&rendered.join(self.separator))
    }
}

impl IntoValue for KeyValues {
    fn into_value(self) -> Option<Value> {
        (!self.is_empty()).then(|| Value::Text(self.to_string()))
    }
}

/// A small interpolated string such as the `%(metric.X)` log macro.
///
/// Each `{}` in the template is replaced by the next argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatedValue {
    template: &'static str,
    args: Vec<String>,
}

impl TemplatedValue {
    /// Creates a templated value.
    #[must_use]
    pub fn new<I, S>(template: &'static str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            template,
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for TemplatedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut args = self.args.iter();
        let mut rest = self.template;
        while let Some(pos) = rest.find("{}") {
            f.write_str(&rest[..pos])?;
            if let Some(arg) = args.next() {
                f.write_str(arg)?;
            }
            rest = &rest[pos + 2..];
        }
        f.write_str(rest)
    }
}
