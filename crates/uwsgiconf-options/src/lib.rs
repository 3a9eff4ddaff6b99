//! Typed option groups and value catalogs for uWSGI configurations.
//!
//! Groups are borrowed façades over a [`Section`], reached through the
//! [`SectionGroups`] extension trait. Every setter returns the section so calls
//! chain across groups:
//!
//! ```
//! use uwsgiconf_core::Section;
//! use uwsgiconf_options::groups::workers::ThreadParams;
//! use uwsgiconf_options::{sockets, SectionGroups};
//!
//! let mut section = Section::default();
//! section
//!     .workers()
//!     .set_count_auto(None)
//!     .workers()
//!     .set_thread_params(ThreadParams { enable: Some(true), ..ThreadParams::default() })
//!     .networking()
//!     .register_socket(sockets::http(":8000"));
//!
//! let options = section.options().unwrap();
//! assert_eq!(options[0], ("workers".to_string(), "%k".to_string()));
//! assert_eq!(options[2], ("http-socket".to_string(), ":8000".to_string()));
//! ```
//!
//! Value catalogs ([`sockets`], [`loggers`], [`encoders`], [`pushers`],
//! [`metrics`], [`alarms`], [`actions`], [`routes`], [`routers`]) build the
//! complex values the groups store.

#![warn(missing_docs)]

use std::path::PathBuf;

use tracing::warn;
use uwsgiconf_core::{Result, Section};

pub mod groups;
mod modifier;
mod util;
mod values;

pub use groups::{
    Alarms, Applications, Caching, Empire, Locks, Logging, MainProcess, MasterProcess,
    Monitoring, Networking, Python, Routing, Statics, Subscriptions, Workers,
};
pub use modifier::Modifier;
pub use values::{
    actions, alarms, encoders, loggers, metrics, pushers, routers, routes, sockets,
};

/// Certbot helper parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertbotParams {
    /// Address of the HTTPS socket.
    pub address: String,
    /// Bind through a shared socket; unset means "when not running as root".
    pub allow_shared_sockets: Option<bool>,
    /// Also redirect plain HTTP requests to HTTPS.
    pub http_redirect: bool,
    /// Directory holding one certificate directory per domain.
    pub certs_dir: PathBuf,
}

impl Default for CertbotParams {
    fn default() -> Self {
        Self {
            address: ":443".to_string(),
            allow_shared_sockets: None,
            http_redirect: false,
            certs_dir: PathBuf::from("/etc/letsencrypt/live"),
        }
    }
}

/// Option group accessors for [`Section`].
pub trait SectionGroups {
    /// Process-wide basics: ownership, naming, hooks.
    fn main_process(&mut self) -> MainProcess<'_>;
    /// Master process, daemons and cron.
    fn master_process(&mut self) -> MasterProcess<'_>;
    /// Workers, threads and mules.
    fn workers(&mut self) -> Workers<'_>;
    /// Locking.
    fn locks(&mut self) -> Locks<'_>;
    /// Sockets and TLS.
    fn networking(&mut self) -> Networking<'_>;
    /// Routers, routes and headers.
    fn routing(&mut self) -> Routing<'_>;
    /// Loggers, encoders and log filters.
    fn logging(&mut self) -> Logging<'_>;
    /// Metrics, stats and pushers.
    fn monitoring(&mut self) -> Monitoring<'_>;
    /// Static file serving.
    fn statics(&mut self) -> Statics<'_>;
    /// Caches.
    fn caching(&mut self) -> Caching<'_>;
    /// Application mounting.
    fn applications(&mut self) -> Applications<'_>;
    /// Python plugin.
    fn python(&mut self) -> Python<'_>;
    /// Emperor mode.
    fn empire(&mut self) -> Empire<'_>;
    /// Alarms and their triggers.
    fn alarms(&mut self) -> Alarms<'_>;
    /// Subscription system.
    fn subscriptions(&mut self) -> Subscriptions<'_>;

    /// Registers sockets parsed from DSNs (see [`sockets::from_dsn`]).
    fn bootstrap(&mut self, dsns: &[&str], allow_shared_sockets: Option<bool>)
        -> Result<&mut Section>;

    /// Serves Certbot's webroot challenge and, when certificates for `domain`
    /// exist, an HTTPS socket using them.
    fn configure_certbot_https(
        &mut self,
        domain: &str,
        webroot: &str,
        params: CertbotParams,
    ) -> &mut Section;

    /// Redirects plain HTTP requests to HTTPS.
    fn configure_https_redirect(&mut self) -> &mut Section;
}

impl SectionGroups for Section {
    fn main_process(&mut self) -> MainProcess<'_> {
        MainProcess::new(self)
    }

    fn master_process(&mut self) -> MasterProcess<'_> {
        MasterProcess::new(self)
    }

    fn workers(&mut self) -> Workers<'_> {
        Workers::new(self)
    }

    fn locks(&mut self) -> Locks<'_> {
        Locks::new(self)
    }

    fn networking(&mut self) -> Networking<'_> {
        Networking::new(self)
    }

    fn routing(&mut self) -> Routing<'_> {
        Routing::new(self)
    }

    fn logging(&mut self) -> Logging<'_> {
        Logging::new(self)
    }

    fn monitoring(&mut self) -> Monitoring<'_> {
        Monitoring::new(self)
    }

    fn statics(&mut self) -> Statics<'_> {
        Statics::new(self)
    }

    fn caching(&mut self) -> Caching<'_> {
        Caching::new(self)
    }

    fn applications(&mut self) -> Applications<'_> {
        Applications::new(self)
    }

    fn python(&mut self) -> Python<'_> {
        Python::new(self)
    }

    fn empire(&mut self) -> Empire<'_> {
        Empire::new(self)
    }

    fn alarms(&mut self) -> Alarms<'_> {
        Alarms::new(self)
    }

    fn subscriptions(&mut self) -> Subscriptions<'_> {
        Subscriptions::new(self)
    }

    fn bootstrap(
        &mut self,
        dsns: &[&str],
        allow_shared_sockets: Option<bool>,
    ) -> Result<&mut Section> {
        let sockets = dsns
            .iter()
            .map(|dsn| sockets::from_dsn(dsn, allow_shared_sockets))
            .collect::<Result<sockets::SocketList>>()?;
        Ok(self.networking().register_socket(sockets))
    }

    fn configure_certbot_https(
        &mut self,
        domain: &str,
        webroot: &str,
        params: CertbotParams,
    ) -> &mut Section {
        self.statics()
            .register_static_map("/.well-known/", webroot, true, None);

        let live = params.certs_dir.join(domain);
        let cert = live.join("fullchain.pem");
        let key = live.join("privkey.pem");
        if !(cert.is_file() && key.is_file()) {
            warn!(
                domain,
                path = %live.display(),
                "certificates not found, https socket not registered"
            );
            return self;
        }

        let address = sockets::bind_address(&params.address, params.allow_shared_sockets);
        let socket = sockets::https(address, &cert.to_string_lossy(), &key.to_string_lossy());
        self.networking().register_socket(socket);

        if params.http_redirect {
            self.configure_https_redirect();
        }
        self
    }

    fn configure_https_redirect(&mut self) -> &mut Section {
        self.routing().register_route(routes::rule(
            routes::actions::redirect("https://${HTTP_HOST}${REQUEST_URI}", true),
            routes::subjects::custom("${HTTPS}", true).eq("on"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn test_bootstrap() {
        let mut section = Section::default();
        section
            .bootstrap(&["http://:8080", "uwsgi:///run/app.sock"], Some(false))
            .unwrap();
        assert_eq!(
            section.options().unwrap(),
            vec![pair("http-socket", ":8080"), pair("uwsgi-socket", "/run/app.sock")]
        );
    }

    #[test]
    fn test_bootstrap_rejects_bad_dsn() {
        let mut section = Section::default();
        assert!(section.bootstrap(&["http://:8080?nope=1"], None).is_err());
        assert!(section.store().is_empty());
    }

    #[test]
    fn test_https_redirect() {
        let mut section = Section::default();
        section.configure_https_redirect();
        assert_eq!(
            section.options().unwrap(),
            vec![pair(
                "route-if-not",
                "equal:${HTTPS};on redirect-301:https://${HTTP_HOST}${REQUEST_URI}"
            )]
        );
    }

    #[test]
    fn test_certbot_without_certificates() {
        let dir = tempfile::tempdir().unwrap();
        let mut section = Section::default();
        section.configure_certbot_https(
            "example.com",
            "/srv/certbot",
            CertbotParams {
                certs_dir: dir.path().to_path_buf(),
                ..CertbotParams::default()
            },
        );
        assert_eq!(
            section.options().unwrap(),
            vec![pair("static-map2", "/.well-known/=/srv/certbot")]
        );
    }

    #[test]
    fn test_certbot_with_certificates() {
        let dir = tempfile::tempdir().unwrap();
        let live = dir.path().join("example.com");
        std::fs::create_dir_all(&live).unwrap();
        std::fs::write(live.join("fullchain.pem"), "cert").unwrap();
        std::fs::write(live.join("privkey.pem"), "key").unwrap();

        let mut section = Section::default();
        section.configure_certbot_https(
            "example.com",
            "/srv/certbot",
            CertbotParams {
                allow_shared_sockets: Some(true),
                http_redirect: true,
                certs_dir: dir.path().to_path_buf(),
                ..CertbotParams::default()
            },
        );

        let options = section.options().unwrap();
        let cert = live.join("fullchain.pem");
        let key = live.join("privkey.pem");
        assert_eq!(options[1], pair("shared-socket", ":443"));
        assert_eq!(
            options[2],
            pair(
                "https-socket",
                &format!("=0,{},{}", cert.display(), key.display())
            )
        );
        assert_eq!(options[3].0, "route-if-not");
    }
}
