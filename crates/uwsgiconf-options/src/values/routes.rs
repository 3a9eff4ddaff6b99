//! Internal routing rules.
//!
//! A rule pairs a [`Subject`] (what to match) with an [`RouteAction`] (what to
//! do) and renders as one `route*` option:
//!
//! ```
//! use uwsgiconf_options::routes::{actions, rule, subjects};
//!
//! let rule = rule(
//!     actions::redirect("https://${HTTP_HOST}${REQUEST_URI}", true),
//!     subjects::custom("${HTTPS}", true).eq("on"),
//! );
//! assert_eq!(rule.key(), "route-if-not");
//! assert_eq!(
//!     rule.value(),
//!     "equal:${HTTPS};on redirect-301:https://${HTTP_HOST}${REQUEST_URI}"
//! );
//! ```

use std::fmt;

use uwsgiconf_core::ParamValue;

/// Request processing stage a rule is evaluated in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RouteStage {
    /// Before the request reaches the app.
    #[default]
    Request,
    /// After response headers are generated.
    Response,
    /// After the request completes.
    Final,
    /// When the app returns an error.
    Error,
}

impl RouteStage {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Request => "",
            Self::Response => "response-",
            Self::Final => "final-",
            Self::Error => "error-",
        }
    }
}

/// What a rule matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    key: &'static str,
    pattern: Option<String>,
}

impl Subject {
    fn regex(key: &'static str, pattern: &str) -> Self {
        Self {
            key,
            pattern: Some(pattern.to_string()),
        }
    }
}

/// A rule action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteAction {
    value: ParamValue,
}

impl RouteAction {
    fn new(name: &str) -> Self {
        Self {
            value: ParamValue::new("route", name),
        }
    }

    fn map(mut self, f: impl FnOnce(ParamValue) -> ParamValue) -> Self {
        self.value = f(self.value);
        self
    }

    /// Marks the action as provided by a plugin.
    #[must_use]
    pub fn with_plugin(self, plugin: &str) -> Self {
        self.map(|v| v.plugin(plugin))
    }

    /// Plugin the action needs loaded.
    pub fn required_plugin(&self) -> Option<&str> {
        self.value.required_plugin()
    }
}

impl fmt::Display for RouteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

/// A routing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    action: RouteAction,
    subject: Subject,
    stage: RouteStage,
}

impl RouteRule {
    /// Moves the rule to another processing stage.
    #[must_use]
    pub fn stage(mut self, stage: RouteStage) -> Self {
        self.stage = stage;
        self
    }

    /// Option key the rule is stored under.
    pub fn key(&self) -> String {
        format!("{}{}", self.stage.prefix(), self.subject.key)
    }

    /// Plugin the rule's action needs loaded.
    pub fn required_plugin(&self) -> Option<&str> {
        self.action.required_plugin()
    }

    /// Rendered rule text.
    pub fn value(&self) -> String {
        match &self.subject.pattern {
            Some(pattern) => format!("{pattern} {}", self.action),
            None => self.action.to_string(),
        }
    }
}

/// Pairs an action with the subject that triggers it.
#[must_use]
pub fn rule(action: RouteAction, subject: Subject) -> RouteRule {
    RouteRule {
        action,
        subject,
        stage: RouteStage::default(),
    }
}

/// Rule subjects.
pub mod subjects {
    use super::Subject;

    /// Matches `PATH_INFO` against a regex.
    #[must_use]
    pub fn path_info(pattern: &str) -> Subject {
        Subject::regex("route", pattern)
    }

    /// Matches `REQUEST_URI` against a regex.
    #[must_use]
    pub fn request_uri(pattern: &str) -> Subject {
        Subject::regex("route-uri", pattern)
    }

    /// Matches `QUERY_STRING` against a regex.
    #[must_use]
    pub fn query_string(pattern: &str) -> Subject {
        Subject::regex("route-qs", pattern)
    }

    /// Matches `REMOTE_ADDR` against a regex.
    #[must_use]
    pub fn remote_addr(pattern: &str) -> Subject {
        Subject::regex("route-remote-addr", pattern)
    }

    /// Matches `HTTP_HOST` against a regex.
    #[must_use]
    pub fn host(pattern: &str) -> Subject {
        Subject::regex("route-host", pattern)
    }

    /// Matches `HTTP_USER_AGENT` against a regex.
    #[must_use]
    pub fn user_agent(pattern: &str) -> Subject {
        Subject::regex("route-user-agent", pattern)
    }

    /// Matches `HTTP_REFERER` against a regex.
    #[must_use]
    pub fn referer(pattern: &str) -> Subject {
        Subject::regex("route-referer", pattern)
    }

    /// Always matches.
    #[must_use]
    pub fn always() -> Subject {
        Subject {
            key: "route-run",
            pattern: None,
        }
    }

    /// A condition over an arbitrary request variable, e.g. `${HTTPS}`.
    #[must_use]
    pub fn custom(variable: &str, negate: bool) -> Custom {
        Custom {
            variable: variable.to_string(),
            negate,
        }
    }

    /// A custom condition awaiting its operator.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Custom {
        variable: String,
        negate: bool,
    }

    impl Custom {
        fn condition(self, operator: &str, operand: Option<&str>) -> Subject {
            let pattern = match operand {
                Some(operand) => format!("{operator}:{};{operand}", self.variable),
                None => format!("{operator}:{}", self.variable),
            };
            Subject {
                key: if self.negate { "route-if-not" } else { "route-if" },
                pattern: Some(pattern),
            }
        }

        /// The variable names an existing path.
        #[must_use]
        pub fn exists(self) -> Subject {
            self.condition("exists", None)
        }

        /// The variable names a regular file.
        #[must_use]
        pub fn is_file(self) -> Subject {
            self.condition("isfile", None)
        }

        /// The variable names a directory.
        #[must_use]
        pub fn is_dir(self) -> Subject {
            self.condition("isdir", None)
        }

        /// The variable is empty.
        #[must_use]
        pub fn empty(self) -> Subject {
            self.condition("empty", None)
        }

        /// The variable equals a value.
        #[must_use]
        pub fn eq(self, value: &str) -> Subject {
            self.condition("equal", Some(value))
        }

        /// The variable is greater than or equal to a value.
        #[must_use]
        pub fn ge(self, value: &str) -> Subject {
            self.condition("ishigherequal", Some(value))
        }

        /// The variable is greater than a value.
        #[must_use]
        pub fn gt(self, value: &str) -> Subject {
            self.condition("ishigher", Some(value))
        }

        /// The variable is lower than or equal to a value.
        #[must_use]
        pub fn le(self, value: &str) -> Subject {
            self.condition("islowerequal", Some(value))
        }

        /// The variable is lower than a value.
        #[must_use]
        pub fn lt(self, value: &str) -> Subject {
            self.condition("islower", Some(value))
        }

        /// The variable starts with a value.
        #[must_use]
        pub fn starts_with(self, value: &str) -> Subject {
            self.condition("startswith", Some(value))
        }

        /// The variable ends with a value.
        #[must_use]
        pub fn ends_with(self, value: &str) -> Subject {
            self.condition("endswith", Some(value))
        }

        /// The variable contains a value.
        #[must_use]
        pub fn contains(self, value: &str) -> Subject {
            self.condition("contains", Some(value))
        }

        /// The variable matches a regex.
        #[must_use]
        pub fn regex(self, pattern: &str) -> Subject {
            self.condition("regexp", Some(pattern))
        }
    }
}

/// Rule actions.
pub mod actions {
    use uwsgiconf_core::KeyValues;

    use super::RouteAction;
    use crate::modifier::Modifier;

    /// Redirects the client; `permanent` answers 301 instead of 302.
    #[must_use]
    pub fn redirect(url: &str, permanent: bool) -> RouteAction {
        let name = if permanent { "redirect-301" } else { "redirect" };
        RouteAction::new(name).map(|v| v.arg(url))
    }

    /// Rewrites `PATH_INFO`; `last` stops processing the rule chain.
    #[must_use]
    pub fn rewrite(path: &str, last: bool) -> RouteAction {
        let name = if last { "rewrite-last" } else { "rewrite" };
        RouteAction::new(name).map(|v| v.arg(path))
    }

    /// Sends raw data to the client, optionally followed by CRLF.
    #[must_use]
    pub fn send(data: &str, crnl: bool) -> RouteAction {
        let name = if crnl { "send-crnl" } else { "send" };
        RouteAction::new(name).map(|v| v.arg(data))
    }

    /// Serves a static file.
    #[must_use]
    pub fn serve_static(path: &str) -> RouteAction {
        RouteAction::new("static").map(|v| v.arg(path))
    }

    /// Jumps to a label.
    #[must_use]
    pub fn goto(label: &str) -> RouteAction {
        RouteAction::new("goto").map(|v| v.arg(label))
    }

    /// Logs a message.
    #[must_use]
    pub fn log(message: &str) -> RouteAction {
        RouteAction::new("log").map(|v| v.arg(message))
    }

    /// Adds a request variable.
    #[must_use]
    pub fn set_var(name: &str, value: &str) -> RouteAction {
        RouteAction::new("addvar").map(|v| v.arg(format!("{name}={value}")))
    }

    /// Adds a response header.
    #[must_use]
    pub fn add_header(name: &str, value: &str) -> RouteAction {
        RouteAction::new("addheader").map(|v| v.arg(format!("{name}: {value}")))
    }

    /// Removes a response header.
    #[must_use]
    pub fn remove_header(name: &str) -> RouteAction {
        RouteAction::new("delheader").map(|v| v.arg(name))
    }

    /// Answers with a status code.
    #[must_use]
    pub fn set_status(code: u16) -> RouteAction {
        RouteAction::new("return").map(|v| v.arg(code))
    }

    /// Stops routing and passes the request to the app.
    #[must_use]
    pub fn do_continue() -> RouteAction {
        RouteAction::new("continue")
    }

    /// Stops routing, optionally answering with a status and message.
    #[must_use]
    pub fn do_break(code: Option<u16>, message: Option<&str>) -> RouteAction {
        RouteAction::new("break").map(|v| v.arg(code).arg(message))
    }

    /// Serves the response stored in a cache under `key`.
    #[must_use]
    pub fn cache_serve(key: &str, cache_name: Option<&str>) -> RouteAction {
        let payload = KeyValues::new().push("key", key).push("name", cache_name);
        RouteAction::new("cache").map(|v| v.plugin("router_cache").arg(payload))
    }

    /// Forwards the request to a uwsgi server.
    #[must_use]
    pub fn to_uwsgi(address: &str, modifier: Option<Modifier>) -> RouteAction {
        RouteAction::new("uwsgi").map(|v| {
            v.args_joiner(",")
                .arg(address)
                .arg(modifier.map(|m| m.code()))
                .arg(modifier.and_then(|m| m.submod()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::Modifier;

    #[test]
    fn test_regex_subject() {
        let rule = rule(actions::rewrite("/index.php", true), subjects::path_info("^/$"));
        assert_eq!(rule.key(), "route");
        assert_eq!(rule.value(), "^/$ rewrite-last:/index.php");
    }

    #[test]
    fn test_always() {
        let rule = rule(actions::add_header("X-Frame", "deny"), subjects::always());
        assert_eq!(rule.key(), "route-run");
        assert_eq!(rule.value(), "addheader:X-Frame: deny");
    }

    #[test]
    fn test_stage_prefix() {
        let rule = rule(actions::log("done"), subjects::host("example"))
            .stage(RouteStage::Final);
        assert_eq!(rule.key(), "final-route-host");
    }

    #[test]
    fn test_unary_condition() {
        let rule = rule(
            actions::serve_static("${DOCUMENT_ROOT}${PATH_INFO}"),
            subjects::custom("${DOCUMENT_ROOT}${PATH_INFO}", false).is_file(),
        );
        assert_eq!(rule.key(), "route-if");
        assert_eq!(
            rule.value(),
            "isfile:${DOCUMENT_ROOT}${PATH_INFO} static:${DOCUMENT_ROOT}${PATH_INFO}"
        );
    }

    #[test]
    fn test_break_and_uwsgi() {
        assert_eq!(actions::do_break(Some(403), Some("Forbidden")).to_string(), "break:403 Forbidden");
        assert_eq!(actions::do_break(None, None).to_string(), "break");
        assert_eq!(
            actions::to_uwsgi("127.0.0.1:3031", Some(Modifier::PSGI)).to_string(),
            "uwsgi:127.0.0.1:3031,5"
        );
    }

    #[test]
    fn test_cache_action_needs_plugin() {
        let rule = rule(actions::cache_serve("${REQUEST_URI}", Some("pages")), subjects::always());
        assert_eq!(rule.value(), "cache:key=${REQUEST_URI},name=pages");
        assert_eq!(rule.required_plugin(), Some("router_cache"));
        assert_eq!(actions::goto("end").required_plugin(), None);
    }
}
