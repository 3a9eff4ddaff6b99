//! Routers and forwarders.
//!
//! A router is a value and an option bundle at once: its primary option binds
//! the router (`http = :80`) and its auxiliary options (`http-to`,
//! `http-processes`, ...) follow it in the host section once attached with
//! `Routing::use_router`.

use tracing::debug;
use uwsgiconf_core::{ParamValue, Section};

use crate::modifier::Modifier;
use crate::values::sockets::{resolve_address, SocketAddress};

/// Router flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterKind {
    /// HTTP proxy.
    Http,
    /// HTTPS proxy.
    Https,
    /// SSL termination proxy.
    Ssl,
    /// uwsgi protocol proxy.
    Fast,
    /// Raw TCP proxy.
    Raw,
    /// Pseudo-terminal server.
    ForkPty,
    /// Tun/tap device router.
    TunTap,
}

impl RouterKind {
    /// Option key binding the router.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::Ssl => "sslrouter",
            Self::Fast => "fastrouter",
            Self::Raw => "rawrouter",
            Self::ForkPty => "forkptyrouter",
            Self::TunTap => "tuntap-router",
        }
    }

    const fn prefix(self) -> &'static str {
        match self {
            Self::Http | Self::Https => "http",
            _ => self.key(),
        }
    }

    const fn plugin(self) -> &'static str {
        match self {
            Self::Http | Self::Https => "http",
            Self::TunTap => "tuntap",
            _ => self.key(),
        }
    }
}

/// Where a router sends matched requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Forwarder {
    /// A socket path pattern with `%s` standing for the matched key.
    Path(String),
    /// A function resolving the destination.
    Code {
        /// Script or module.
        script: String,
        /// Function name.
        function: String,
        /// Language modifier.
        modifier: Modifier,
    },
    /// Static list of backend addresses.
    Socket(Vec<String>),
    /// Backends announced through a subscription server.
    SubscriptionServer(String),
}

/// Forwards to sockets found by a path pattern.
#[must_use]
pub fn to_path(pattern: &str) -> Forwarder {
    Forwarder::Path(pattern.to_string())
}

/// Forwards to the address returned by a function.
#[must_use]
pub fn to_code(script: &str, function: &str, modifier: Option<Modifier>) -> Forwarder {
    Forwarder::Code {
        script: script.to_string(),
        function: function.to_string(),
        modifier: modifier.unwrap_or(Modifier::WSGI),
    }
}

/// Forwards to fixed backend addresses.
#[must_use]
pub fn to_socket(addresses: &[&str]) -> Forwarder {
    Forwarder::Socket(addresses.iter().map(|a| (*a).to_string()).collect())
}

/// Forwards to backends registered with a subscription server.
#[must_use]
pub fn to_subscription_server(address: &str) -> Forwarder {
    Forwarder::SubscriptionServer(address.to_string())
}

/// Basic router parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterParams {
    /// Number of router processes.
    pub workers: Option<u32>,
    /// Stats server address.
    pub stats_server: Option<String>,
    /// Silences the router.
    pub quiet: Option<bool>,
    /// Starts the router only when backends appear.
    pub cheap: Option<bool>,
}

/// Backend connection parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionsParams {
    /// Seconds before a stuck request is dropped.
    pub harakiri: Option<u32>,
    /// Backend socket timeout in seconds.
    pub timeout_socket: Option<u32>,
    /// Seconds before retrying a dead backend.
    pub retry_delay: Option<u32>,
    /// Retries per request.
    pub retry_max: Option<u32>,
}

/// A router ready to be attached to a section.
///
/// ```
/// use uwsgiconf_options::routers::{to_socket, Router, RouterParams};
/// use uwsgiconf_options::SectionGroups;
/// use uwsgiconf_core::Section;
///
/// let router = Router::http(":80")
///     .set_basic_params(RouterParams { workers: Some(2), ..RouterParams::default() })
///     .forward_to(to_socket(&["127.0.0.1:3031"]));
/// let mut section = Section::default();
/// section.routing().use_router(&router);
/// let options = section.options().unwrap();
/// assert_eq!(options[1], ("http".to_string(), ":80".to_string()));
/// assert_eq!(options[2], ("http-processes".to_string(), "2".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Router {
    kind: RouterKind,
    address: SocketAddress,
    value: ParamValue,
}

impl Router {
    fn new(kind: RouterKind, address: SocketAddress) -> Self {
        Self {
            kind,
            address,
            value: ParamValue::new(kind.key(), "")
                .name_separator(",")
                .args_joiner(",")
                .plugin(kind.plugin()),
        }
    }

    /// HTTP router.
    #[must_use]
    pub fn http(on: impl Into<SocketAddress>) -> Self {
        Self::new(RouterKind::Http, on.into())
    }

    /// HTTPS router.
    #[must_use]
    pub fn https(on: impl Into<SocketAddress>, cert: &str, key: &str) -> Self {
        let mut router = Self::new(RouterKind::Https, on.into());
        router.value = router.value.arg(cert).arg(key);
        router
    }

    /// SSL router.
    #[must_use]
    pub fn ssl(on: impl Into<SocketAddress>, cert: &str, key: &str) -> Self {
        let mut router = Self::new(RouterKind::Ssl, on.into());
        router.value = router.value.arg(cert).arg(key);
        router
    }

    /// uwsgi protocol router.
    #[must_use]
    pub fn fast(on: impl Into<SocketAddress>) -> Self {
        Self::new(RouterKind::Fast, on.into())
    }

    /// Raw router.
    #[must_use]
    pub fn raw(on: impl Into<SocketAddress>) -> Self {
        Self::new(RouterKind::Raw, on.into())
    }

    /// Pseudo-terminal router.
    #[must_use]
    pub fn forkpty(on: impl Into<SocketAddress>) -> Self {
        Self::new(RouterKind::ForkPty, on.into())
    }

    /// Tun/tap router for a device and its control socket.
    #[must_use]
    pub fn tuntap(device: &str, socket: &str) -> Self {
        let mut router = Self::new(RouterKind::TunTap, SocketAddress::from(device));
        router.value = router.value.name_separator(" ").arg(socket);
        router
    }

    /// Router flavour.
    pub fn kind(&self) -> RouterKind {
        self.kind
    }

    fn opt(kind: RouterKind, suffix: &str) -> String {
        format!("{}-{suffix}", kind.prefix())
    }

    /// Sets basic router parameters.
    #[must_use]
    pub fn set_basic_params(mut self, params: RouterParams) -> Self {
        let kind = self.kind;
        self.value = self
            .value
            .set(&Self::opt(kind, "processes"), params.workers)
            .set(&Self::opt(kind, "stats"), params.stats_server)
            .set(&Self::opt(kind, "quiet"), params.quiet)
            .set(&Self::opt(kind, "cheap"), params.cheap);
        self
    }

    /// Sets backend connection parameters.
    #[must_use]
    pub fn set_connections_params(mut self, params: ConnectionsParams) -> Self {
        let kind = self.kind;
        self.value = self
            .value
            .set(&Self::opt(kind, "harakiri"), params.harakiri)
            .set(&Self::opt(kind, "timeout"), params.timeout_socket)
            .set(&Self::opt(kind, "retry-delay"), params.retry_delay)
            .set(&Self::opt(kind, "max-retries"), params.retry_max);
        self
    }

    /// Declares where matched requests go.
    #[must_use]
    pub fn forward_to(mut self, forwarder: Forwarder) -> Self {
        let kind = self.kind;
        self.value = match forwarder {
            Forwarder::Path(pattern) => self.value.set(&Self::opt(kind, "use-pattern"), pattern),
            Forwarder::Code {
                script,
                function,
                modifier,
            } => self.value.set(
                &Self::opt(kind, "use-code-string"),
                format!("{}:{script}:{function}", modifier.code()),
            ),
            Forwarder::Socket(addresses) => {
                let key = Self::opt(kind, "to");
                addresses
                    .into_iter()
                    .fold(self.value, |value, address| value.add(&key, address))
            }
            Forwarder::SubscriptionServer(address) => {
                self.value.add(&Self::opt(kind, "subscription-server"), address)
            }
        };
        self
    }

    /// Stores the router and its options in `section`.
    pub(crate) fn attach(&self, section: &mut Section) {
        let address = resolve_address(&self.address, section);
        debug!(
            section = %section.name(),
            router = self.kind.key(),
            options = self.value.aux().len(),
            "router attached"
        );
        let value = self.value.clone().with_name(address);
        section.set_param(&value, true);
    }
}
