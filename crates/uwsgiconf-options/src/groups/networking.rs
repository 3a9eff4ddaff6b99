//! Sockets and TLS.

use uwsgiconf_core::{ConfigurationError, Result, Section};

use crate::sockets::{AnySocket, SocketList};
use crate::util::join;
use crate::values::sockets::resolve_address;

/// Basic networking parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkingParams {
    /// Listen queue size.
    pub queue_size: Option<u32>,
    /// Allows binding to non-local addresses.
    pub freebind: Option<bool>,
    /// Default socket timeout in seconds.
    pub timeout: Option<u32>,
}

/// Socket tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocketParams {
    /// Send timeout in seconds.
    pub send_timeout: Option<u32>,
    /// Enables TCP keep-alive.
    pub keep_alive: Option<bool>,
    /// Disables deferred accept.
    pub no_defer_accept: Option<bool>,
    /// Send buffer size.
    pub buffer_send: Option<u32>,
    /// Receive buffer size.
    pub buffer_receive: Option<u32>,
}

/// Unix socket parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnixSocketParams {
    /// Binds sockets in the abstract namespace.
    pub abstract_namespace: Option<bool>,
    /// Socket file permissions, e.g. `660`.
    pub permissions: Option<String>,
    /// Socket file owner as `user[:group]`.
    pub owner: Option<String>,
    /// Process umask.
    pub umask: Option<String>,
}

/// TLS parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SslParams {
    /// Logs TLS errors verbosely.
    pub verbose_errors: Option<bool>,
    /// Stores sessions in the default cache.
    pub sessions_cache: Option<bool>,
    /// Session timeout in seconds.
    pub sessions_timeout: Option<u32>,
    /// Session context name.
    pub session_context: Option<String>,
    /// Raw OpenSSL option numbers.
    pub raw_options: Vec<u32>,
    /// Directory for temporary TLS files.
    pub dir_tmp: Option<String>,
    /// Exposes the client certificate to apps.
    pub client_cert_var: Option<bool>,
}

/// A TLS certificate selected by server name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SniParams {
    /// Certificate file.
    pub cert: String,
    /// Key file.
    pub key: String,
    /// Cipher suite.
    pub ciphers: Option<String>,
    /// Client CA for certificate authentication.
    pub client_ca: Option<String>,
    /// Treats the name as a regex.
    pub wildcard: bool,
}

/// Networking option group.
#[derive(Debug)]
pub struct Networking<'a> {
    section: &'a mut Section,
}

impl<'a> Networking<'a> {
    pub(crate) fn new(section: &'a mut Section) -> Self {
        Self { section }
    }

    /// Sets basic networking parameters.
    pub fn set_basic_params(self, params: NetworkingParams) -> &'a mut Section {
        self.section
            .set("listen", params.queue_size)
            .set("freebind", params.freebind)
            .set("socket-timeout", params.timeout)
    }

    /// Sets socket tuning parameters.
    pub fn set_socket_params(self, params: SocketParams) -> &'a mut Section {
        self.section
            .set("socket-send-timeout", params.send_timeout)
            .set("so-keepalive", params.keep_alive)
            .set("no-defer-accept", params.no_defer_accept)
            .set("socket-sndbuf", params.buffer_send)
            .set("socket-rcvbuf", params.buffer_receive)
    }

    /// Sets unix socket parameters.
    ///
    /// Abstract sockets live outside the filesystem, so they cannot be given
    /// permissions or an owner.
    pub fn set_unix_socket_params(self, params: UnixSocketParams) -> Result<&'a mut Section> {
        if params.abstract_namespace == Some(true) {
            if params.permissions.is_some() {
                return Err(ConfigurationError::mutually_exclusive(
                    "abstract_namespace",
                    "permissions",
                ));
            }
            if params.owner.is_some() {
                return Err(ConfigurationError::mutually_exclusive(
                    "abstract_namespace",
                    "owner",
                ));
            }
        }
        Ok(self
            .section
            .set("abstract-socket", params.abstract_namespace)
            .set("chmod-socket", params.permissions)
            .set("chown-socket", params.owner)
            .set("umask", params.umask))
    }

    /// Registers one or more sockets.
    ///
    /// A socket bound to a shared socket registers it first (once) and refers
    /// to it as `=N`. Sockets with bound workers also emit `map-socket`.
    pub fn register_socket(self, sockets: impl Into<SocketList>) -> &'a mut Section {
        for socket in sockets.into().0 {
            match socket {
                AnySocket::Shared(shared) => {
                    self.section.register_shared_socket(shared.address());
                }
                AnySocket::Socket(socket) => {
                    let address = resolve_address(socket.address(), self.section);
                    let index = self.section.next_socket_index();
                    self.section.set_param(&socket.to_param(&address), true);
                    if !socket.bound_workers().is_empty() {
                        self.section.add(
                            "map-socket",
                            format!("{index}:{}", join(socket.bound_workers(), ",")),
                        );
                    }
                }
            }
        }
        self.section
    }

    /// Sets TLS parameters.
    pub fn set_ssl_params(self, params: SslParams) -> &'a mut Section {
        self.section
            .set("ssl-verbose", params.verbose_errors)
            .set("ssl-sessions-use-cache", params.sessions_cache)
            .set("ssl-sessions-timeout", params.sessions_timeout)
            .set("ssl-session-context", params.session_context);
        for option in params.raw_options {
            self.section.add("ssl-option", option);
        }
        self.section
            .set("ssl-tmp-dir", params.dir_tmp)
            .set("https-export-cert", params.client_cert_var)
    }

    /// Serves a certificate for a server name (SNI).
    pub fn set_sni_params(self, name: &str, params: SniParams) -> &'a mut Section {
        let key = if params.wildcard { "sni-regexp" } else { "sni" };
        let parts = [
            Some(params.cert),
            Some(params.key),
            params.ciphers,
            params.client_ca,
        ];
        let used = parts.iter().rposition(Option::is_some).map_or(0, |last| last + 1);
        let crypto = parts[..used]
            .iter()
            .map(|part| part.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(",");
        self.section.add(key, format!("{name} {crypto}"))
    }
}
