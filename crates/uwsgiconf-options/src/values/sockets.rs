//! Socket values.
//!
//! A socket renders as `address[,arg...]` under its kind's option key
//! (`socket`, `http-socket`, ...). Its address is either a raw authority or a
//! [`SharedSocket`]; a shared address is turned into its `=N` index when the
//! socket is registered in a section.

use std::sync::OnceLock;

use regex::Regex;
use uwsgiconf_core::{ConfigurationError, ParamValue, Result, Section};

use crate::modifier::Modifier;
use crate::util::running_as_root;

/// Socket flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketKind {
    /// Native uwsgi protocol socket (`socket`).
    Default,
    /// Plain HTTP.
    Http,
    /// HTTP with keep-alive support.
    Http11,
    /// HTTP over TLS.
    Https,
    /// Raw mode.
    Raw,
    /// SCGI.
    Scgi,
    /// UDP.
    Udp,
    /// Explicit uwsgi protocol.
    Uwsgi,
    /// uwsgi protocol over TLS.
    Suwsgi,
    /// ZeroMQ.
    Zeromq,
    /// FastCGI.
    Fastcgi,
}

impl SocketKind {
    /// Option key the socket is stored under.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Default => "socket",
            Self::Http => "http-socket",
            Self::Http11 => "http11-socket",
            Self::Https => "https-socket",
            Self::Raw => "raw-socket",
            Self::Scgi => "scgi-socket",
            Self::Udp => "udp",
            Self::Uwsgi => "uwsgi-socket",
            Self::Suwsgi => "suwsgi-socket",
            Self::Zeromq => "zeromq",
            Self::Fastcgi => "fastcgi-socket",
        }
    }

    fn from_scheme(scheme: &str) -> Option<Self> {
        Some(match scheme {
            "http" => Self::Http,
            "https" => Self::Https,
            "raw" => Self::Raw,
            "scgi" => Self::Scgi,
            "udp" => Self::Udp,
            "uwsgi" => Self::Uwsgi,
            "suwsgi" => Self::Suwsgi,
            "zeromq" => Self::Zeromq,
            "fastcgi" => Self::Fastcgi,
            _ => return None,
        })
    }

    const fn uses_tls(self) -> bool {
        matches!(self, Self::Https | Self::Suwsgi)
    }
}

/// A socket bound once and referenced by index from other sockets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SharedSocket {
    address: String,
}

impl SharedSocket {
    /// Creates a shared socket for an address.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    /// The bound address.
    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Where a socket listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketAddress {
    /// Raw authority or path (`:8000`, `/run/app.sock`).
    Raw(String),
    /// A shared socket, resolved to `=N` on registration.
    Shared(SharedSocket),
}

impl From<&str> for SocketAddress {
    fn from(address: &str) -> Self {
        Self::Raw(address.to_string())
    }
}

impl From<String> for SocketAddress {
    fn from(address: String) -> Self {
        Self::Raw(address)
    }
}

impl From<SharedSocket> for SocketAddress {
    fn from(shared: SharedSocket) -> Self {
        Self::Shared(shared)
    }
}

impl From<&SharedSocket> for SocketAddress {
    fn from(shared: &SharedSocket) -> Self {
        Self::Shared(shared.clone())
    }
}

/// A listening socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Socket {
    kind: SocketKind,
    address: SocketAddress,
    tls: [Option<String>; 4],
    bound_workers: Vec<u32>,
    modifier: Option<Modifier>,
    keepalive: Option<bool>,
}

impl Socket {
    /// Creates a socket of the given kind.
    #[must_use]
    pub fn new(kind: SocketKind, address: impl Into<SocketAddress>) -> Self {
        Self {
            kind,
            address: address.into(),
            tls: Default::default(),
            bound_workers: Vec::new(),
            modifier: None,
            keepalive: None,
        }
    }

    /// Socket flavour.
    pub fn kind(&self) -> SocketKind {
        self.kind
    }

    /// Listening address.
    pub fn address(&self) -> &SocketAddress {
        &self.address
    }

    /// Workers (1-based ids) accepting on this socket.
    pub fn bound_workers(&self) -> &[u32] {
        &self.bound_workers
    }

    /// Restricts the socket to the given workers.
    #[must_use]
    pub fn with_bound_workers(mut self, workers: impl IntoIterator<Item = u32>) -> Self {
        self.bound_workers = workers.into_iter().collect();
        self
    }

    /// Sets the default modifier for requests on this socket.
    #[must_use]
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = Some(modifier);
        self
    }

    /// Sets the TLS certificate (https, suwsgi).
    #[must_use]
    pub fn with_cert(mut self, cert: impl Into<String>) -> Self {
        self.tls[0] = Some(cert.into());
        self
    }

    /// Sets the TLS key (https, suwsgi).
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.tls[1] = Some(key.into());
        self
    }

    /// Sets the TLS cipher suite (https, suwsgi).
    #[must_use]
    pub fn with_ciphers(mut self, ciphers: impl Into<String>) -> Self {
        self.tls[2] = Some(ciphers.into());
        self
    }

    /// Sets the client CA for certificate authentication (https, suwsgi).
    #[must_use]
    pub fn with_client_ca(mut self, client_ca: impl Into<String>) -> Self {
        self.tls[3] = Some(client_ca.into());
        self
    }

    /// Enables HTTP keep-alive (http sockets).
    #[must_use]
    pub fn with_keepalive(mut self, keepalive: bool) -> Self {
        self.keepalive = Some(keepalive);
        self
    }

    /// Switches a plain HTTP socket to HTTP/1.1 mode.
    #[must_use]
    pub fn with_http11(mut self, http11: bool) -> Self {
        self.kind = match (self.kind, http11) {
            (SocketKind::Http, true) => SocketKind::Http11,
            (SocketKind::Http11, false) => SocketKind::Http,
            (kind, _) => kind,
        };
        self
    }

    /// Builds the stored value for an already resolved address text.
    pub fn to_param(&self, address: &str) -> ParamValue {
        let key = self.kind.key();
        let mut value = ParamValue::new(key, address)
            .name_separator(",")
            .args_joiner(",");
        if self.kind.uses_tls() {
            value = value.args(self.tls.iter().map(Option::as_deref));
        }
        if let Some(modifier) = self.modifier {
            value = value
                .set(&format!("{key}-modifier1"), u32::from(modifier.code()))
                .set(
                    &format!("{key}-modifier2"),
                    modifier.submod().map(u32::from),
                );
        }
        value.set("http-keepalive", self.keepalive)
    }

    fn apply_param(mut self, dsn: &str, name: &str, value: &str) -> Result<Self> {
        match name {
            "bound_workers" => {
                let workers = value
                    .split(',')
                    .map(|id| {
                        id.trim().parse::<u32>().map_err(|_| {
                            ConfigurationError::invalid_dsn(dsn, format!("bad worker id {id:?}"))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(self.with_bound_workers(workers))
            }
            "keepalive" if matches!(self.kind, SocketKind::Http | SocketKind::Http11) => {
                Ok(self.with_keepalive(parse_bool(dsn, value)?))
            }
            "http11" if matches!(self.kind, SocketKind::Http | SocketKind::Http11) => {
                Ok(self.with_http11(parse_bool(dsn, value)?))
            }
            "cert" | "key" | "ciphers" | "client_ca" if self.kind.uses_tls() => {
                let slot = match name {
                    "cert" => 0,
                    "key" => 1,
                    "ciphers" => 2,
                    _ => 3,
                };
                self.tls[slot] = Some(value.to_string());
                Ok(self)
            }
            _ => Err(ConfigurationError::unknown_dsn_param(dsn, name)),
        }
    }
}

/// Either kind of registrable socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnySocket {
    /// A regular socket.
    Socket(Socket),
    /// A shared socket declaration.
    Shared(SharedSocket),
}

impl From<Socket> for AnySocket {
    fn from(socket: Socket) -> Self {
        Self::Socket(socket)
    }
}

impl From<SharedSocket> for AnySocket {
    fn from(shared: SharedSocket) -> Self {
        Self::Shared(shared)
    }
}

impl From<&SharedSocket> for AnySocket {
    fn from(shared: &SharedSocket) -> Self {
        Self::Shared(shared.clone())
    }
}

/// One or many sockets to register.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocketList(pub Vec<AnySocket>);

impl From<AnySocket> for SocketList {
    fn from(socket: AnySocket) -> Self {
        Self(vec![socket])
    }
}

impl From<Socket> for SocketList {
    fn from(socket: Socket) -> Self {
        Self(vec![socket.into()])
    }
}

impl From<SharedSocket> for SocketList {
    fn from(shared: SharedSocket) -> Self {
        Self(vec![shared.into()])
    }
}

impl From<&SharedSocket> for SocketList {
    fn from(shared: &SharedSocket) -> Self {
        Self(vec![shared.into()])
    }
}

impl From<Vec<Socket>> for SocketList {
    fn from(sockets: Vec<Socket>) -> Self {
        sockets.into_iter().collect()
    }
}

impl From<Vec<AnySocket>> for SocketList {
    fn from(sockets: Vec<AnySocket>) -> Self {
        Self(sockets)
    }
}

impl<T: Into<AnySocket>> FromIterator<T> for SocketList {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Native uwsgi protocol socket.
#[must_use]
pub fn default(address: impl Into<SocketAddress>) -> Socket {
    Socket::new(SocketKind::Default, address)
}

/// Plain HTTP socket.
#[must_use]
pub fn http(address: impl Into<SocketAddress>) -> Socket {
    Socket::new(SocketKind::Http, address)
}

/// HTTPS socket with certificate and key.
#[must_use]
pub fn https(address: impl Into<SocketAddress>, cert: &str, key: &str) -> Socket {
    Socket::new(SocketKind::Https, address)
        .with_cert(cert)
        .with_key(key)
}

/// Raw mode socket.
#[must_use]
pub fn raw(address: impl Into<SocketAddress>) -> Socket {
    Socket::new(SocketKind::Raw, address)
}

/// SCGI socket.
#[must_use]
pub fn scgi(address: impl Into<SocketAddress>) -> Socket {
    Socket::new(SocketKind::Scgi, address)
}

/// Shared socket declaration.
#[must_use]
pub fn shared(address: impl Into<String>) -> SharedSocket {
    SharedSocket::new(address)
}

/// UDP socket.
#[must_use]
pub fn udp(address: impl Into<SocketAddress>) -> Socket {
    Socket::new(SocketKind::Udp, address)
}

/// Explicit uwsgi protocol socket.
#[must_use]
pub fn uwsgi(address: impl Into<SocketAddress>) -> Socket {
    Socket::new(SocketKind::Uwsgi, address)
}

/// uwsgi protocol over TLS.
#[must_use]
pub fn suwsgi(address: impl Into<SocketAddress>, cert: &str, key: &str) -> Socket {
    Socket::new(SocketKind::Suwsgi, address)
        .with_cert(cert)
        .with_key(key)
}

/// ZeroMQ socket.
#[must_use]
pub fn zeromq(address: impl Into<SocketAddress>) -> Socket {
    Socket::new(SocketKind::Zeromq, address)
}

/// FastCGI socket.
#[must_use]
pub fn fastcgi(address: impl Into<SocketAddress>) -> Socket {
    Socket::new(SocketKind::Fastcgi, address)
}

/// Renders an address for `section`, registering a shared socket on first use
/// and referencing it by its `=N` index.
pub(crate) fn resolve_address(address: &SocketAddress, section: &mut Section) -> String {
    match address {
        SocketAddress::Raw(address) => address.clone(),
        SocketAddress::Shared(shared) => {
            format!("={}", section.register_shared_socket(shared.address()))
        }
    }
}

fn dsn_regex() -> &'static Regex {
    static DSN: OnceLock<Regex> = OnceLock::new();
    DSN.get_or_init(|| {
        Regex::new(r"^(?P<scheme>[a-z0-9]+)://(?P<address>[^?]*)(?:\?(?P<query>.*))?$")
            .expect("valid regex")
    })
}

fn parse_bool(dsn: &str, value: &str) -> Result<bool> {
    match value {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigurationError::invalid_dsn(
            dsn,
            format!("expected a boolean, got {value:?}"),
        )),
    }
}

/// TCP port of an address, if it has one.
fn tcp_port(address: &str) -> Option<u16> {
    if address.starts_with('/') || address.starts_with('@') {
        return None;
    }
    address.rsplit_once(':')?.1.parse().ok()
}

/// Chooses how to bind `address`: TCP ports below 1024 go through a shared
/// socket when `allow_shared_sockets` says so, or, left unset, when the
/// current process is not root.
pub(crate) fn bind_address(address: &str, allow_shared_sockets: Option<bool>) -> SocketAddress {
    let privileged = tcp_port(address).is_some_and(|port| port < 1024);
    if privileged && allow_shared_sockets.unwrap_or_else(|| !running_as_root()) {
        SocketAddress::Shared(SharedSocket::new(address))
    } else {
        SocketAddress::Raw(address.to_string())
    }
}

/// Builds a socket from `scheme://address[?k=v&...]`.
///
/// Query parameters map onto the socket's options (`bound_workers`, `cert`,
/// `key`, `ciphers`, `client_ca`, `keepalive`, `http11`); TLS schemes
/// require `cert` and `key`. Privileged ports
/// may be bound through a shared socket, see `allow_shared_sockets`: left
/// unset, sharing is allowed when the current process is not root.
///
/// # Example
///
/// ```
/// use uwsgiconf_options::sockets::{from_dsn, AnySocket, SocketKind};
///
/// let socket = from_dsn("https://127.0.0.1:443?cert=/c&key=/k", Some(false)).unwrap();
/// let AnySocket::Socket(socket) = socket else { panic!("not a socket") };
/// assert_eq!(socket.kind(), SocketKind::Https);
/// ```
pub fn from_dsn(dsn: &str, allow_shared_sockets: Option<bool>) -> Result<AnySocket> {
    let captures = dsn_regex()
        .captures(dsn)
        .ok_or_else(|| ConfigurationError::invalid_dsn(dsn, "expected scheme://address"))?;
    let scheme = &captures["scheme"];
    let address = &captures["address"];
    if address.is_empty() {
        return Err(ConfigurationError::invalid_dsn(dsn, "missing address"));
    }

    if scheme == "shared" {
        if captures.name("query").is_some_and(|query| !query.as_str().is_empty()) {
            return Err(ConfigurationError::invalid_dsn(
                dsn,
                "shared sockets take no parameters",
            ));
        }
        return Ok(AnySocket::Shared(SharedSocket::new(address)));
    }

    let kind = SocketKind::from_scheme(scheme)
        .ok_or_else(|| ConfigurationError::invalid_dsn(dsn, format!("unknown scheme {scheme}")))?;

    let mut socket = Socket::new(kind, bind_address(address, allow_shared_sockets));
    if let Some(query) = captures.name("query") {
        for pair in query.as_str().split('&').filter(|pair| !pair.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = urlencoding::decode(value)
                .map_err(|e| ConfigurationError::invalid_dsn(dsn, e.to_string()))?;
            socket = socket.apply_param(dsn, name, &value)?;
        }
    }
    if kind.uses_tls() {
        for (slot, field) in ["cert", "key"].into_iter().enumerate() {
            if socket.tls[slot].is_none() {
                return Err(ConfigurationError::missing_argument(field));
            }
        }
    }
    Ok(AnySocket::Socket(socket))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn socket(any: AnySocket) -> Socket {
        match any {
            AnySocket::Socket(socket) => socket,
            AnySocket::Shared(shared) => panic!("unexpected shared socket {shared:?}"),
        }
    }

    #[test]
    fn test_plain_socket_param() {
        let param = http(":8000").to_param(":8000");
        assert_eq!(param.opt_key(), "http-socket");
        assert_eq!(param.to_string(), ":8000");
    }

    #[test]
    fn test_https_param() {
        let param = https(":443", "/c", "/k").to_param(":443");
        assert_eq!(param.to_string(), ":443,/c,/k");
    }

    #[test]
    fn test_https_client_ca_keeps_cipher_slot() {
        let param = https(":443", "/c", "/k")
            .with_client_ca("/ca")
            .to_param(":443");
        assert_eq!(param.to_string(), ":443,/c,/k,,/ca");
    }

    #[test]
    fn test_modifier_aux() {
        let param = default(":3031")
            .with_modifier(Modifier::PSGI)
            .to_param(":3031");
        let keys: Vec<_> = param.aux().iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["socket-modifier1"]);
    }

    #[test]
    fn test_http11_switch() {
        assert_eq!(http(":80").with_http11(true).kind(), SocketKind::Http11);
        assert_eq!(raw(":80").with_http11(true).kind(), SocketKind::Raw);
    }

    #[test]
    fn test_dsn_https() {
        let parsed = socket(from_dsn("https://127.0.0.1:443?cert=/c&key=/k", Some(false)).unwrap());
        assert_eq!(parsed.kind(), SocketKind::Https);
        assert_eq!(parsed.address(), &SocketAddress::Raw("127.0.0.1:443".to_string()));
        assert_eq!(parsed.to_param("127.0.0.1:443").to_string(), "127.0.0.1:443,/c,/k");
    }

    #[test]
    fn test_dsn_tls_requires_cert_and_key() {
        let err = from_dsn("https://:8443", Some(false)).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::MissingArgument { ref field } if field == "cert"
        ));
        let err = from_dsn("suwsgi://:3031?cert=/c", Some(false)).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::MissingArgument { ref field } if field == "key"
        ));
    }

    #[test]
    fn test_dsn_privileged_port_shared_when_allowed() {
        let parsed = socket(from_dsn("http://:80", Some(true)).unwrap());
        assert_eq!(parsed.address(), &SocketAddress::Shared(SharedSocket::new(":80")));
    }

    #[test]
    fn test_dsn_unprivileged_port_never_shared() {
        let parsed = socket(from_dsn("http://:8080", Some(true)).unwrap());
        assert_eq!(parsed.address(), &SocketAddress::Raw(":8080".to_string()));
    }

    #[test]
    fn test_dsn_default_sharing_follows_uid() {
        let parsed = socket(from_dsn("http://:80", None).unwrap());
        let shared = matches!(parsed.address(), SocketAddress::Shared(_));
        assert_eq!(shared, !running_as_root());
    }

    #[test]
    fn test_dsn_unix_socket() {
        let parsed = socket(from_dsn("uwsgi:///run/app.sock?bound_workers=1,2", None).unwrap());
        assert_eq!(parsed.kind(), SocketKind::Uwsgi);
        assert_eq!(parsed.address(), &SocketAddress::Raw("/run/app.sock".to_string()));
        assert_eq!(parsed.bound_workers(), &[1, 2]);
    }

    #[test]
    fn test_dsn_shared() {
        assert_eq!(
            from_dsn("shared://:443", None).unwrap(),
            AnySocket::Shared(SharedSocket::new(":443"))
        );
    }

    #[test]
    fn test_dsn_unknown_param() {
        let err = from_dsn("http://:8080?cert=/c", None).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::UnknownDsnParam { ref dsn, ref param }
                if dsn == "http://:8080?cert=/c" && param == "cert"
        ));
    }

    #[test]
    fn test_dsn_unknown_scheme() {
        assert!(matches!(
            from_dsn("gopher://:70", None),
            Err(ConfigurationError::InvalidDsn { .. })
        ));
    }

    #[test]
    fn test_dsn_malformed() {
        assert!(from_dsn("not a dsn", None).is_err());
        assert!(from_dsn("http://", None).is_err());
    }

    #[test]
    fn test_dsn_decodes_values() {
        let parsed = socket(from_dsn("https://:8443?cert=/etc/my%20cert.pem&key=/k", None).unwrap());
        assert_eq!(parsed.to_param(":8443").to_string(), ":8443,/etc/my cert.pem,/k");
    }

    #[test]
    fn test_resolve_address() {
        let mut section = Section::default();
        let address = SocketAddress::from(shared(":443"));
        assert_eq!(resolve_address(&SocketAddress::from(":80"), &mut section), ":80");
        assert_eq!(resolve_address(&address, &mut section), "=0");
        assert_eq!(resolve_address(&address, &mut section), "=0");
        assert_eq!(section.store().get("shared-socket").map(|e| e.values().count()), Some(1));
    }

    #[test]
    fn test_socket_list() {
        let list: SocketList = vec![http(":80"), http(":81")].into_iter().collect();
        assert_eq!(list.0.len(), 2);
        let single = SocketList::from(shared(":443"));
        assert_eq!(single.0.len(), 1);
    }
}
