//! Routers, internal routing rules and response headers.

use uwsgiconf_core::{ConfigurationError, Result, Section, SetOptions};

use crate::routers::Router;
use crate::routes::RouteRule;

/// Routing option group.
#[derive(Debug)]
pub struct Routing<'a> {
    section: &'a mut Section,
}

impl<'a> Routing<'a> {
    pub(crate) fn new(section: &'a mut Section) -> Self {
        Self { section }
    }

    /// Registers a routing rule, loading the plugin its action needs.
    pub fn register_route(self, rule: RouteRule) -> &'a mut Section {
        add_rule(self.section, &rule)
    }

    /// Registers routing rules in order.
    pub fn register_routes(self, rules: impl IntoIterator<Item = RouteRule>) -> &'a mut Section {
        for rule in rules {
            add_rule(self.section, &rule);
        }
        self.section
    }

    /// Attaches a router, contributing its options to the section.
    pub fn use_router(self, router: &Router) -> &'a mut Section {
        router.attach(self.section);
        self.section
    }

    /// Serves a file for an error status (403, 404 or 500).
    pub fn set_error_page(self, status: u16, path: &str) -> Result<&'a mut Section> {
        if !matches!(status, 403 | 404 | 500) {
            return Err(ConfigurationError::invalid_value(
                "status",
                format!("no error page option for status {status}"),
            ));
        }
        Ok(self.section.add(&format!("error-page-{status}"), path))
    }

    /// Declares a label that `goto` actions jump to.
    pub fn add_label(self, label: &str) -> &'a mut Section {
        self.section.add("route-label", label)
    }

    /// Adds a response header.
    pub fn header_add(self, name: &str, value: &str) -> &'a mut Section {
        self.section.add("add-header", format!("{name}: {value}"))
    }

    /// Removes a response header.
    pub fn header_remove(self, name: &str) -> &'a mut Section {
        self.section.add("del-header", name)
    }

    /// Stores a response header in a request variable; `pull` also removes the
    /// header from the response.
    pub fn header_collect(self, name: &str, target_var: &str, pull: bool) -> &'a mut Section {
        let key = if pull { "pull-header" } else { "collect-header" };
        self.section.add(key, format!("{name} {target_var}"))
    }
}

fn add_rule<'s>(section: &'s mut Section, rule: &RouteRule) -> &'s mut Section {
    let options = SetOptions {
        multi: true,
        plugin: rule.required_plugin(),
    };
    section.set_with(&rule.key(), rule.value(), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::test_util::{options, pair};
    use crate::routers::{to_socket, ConnectionsParams};
    use crate::routes::{actions, rule, subjects};
    use crate::{sockets, SectionGroups};

    #[test]
    fn test_register_routes_in_order() {
        let mut section = Section::default();
        section
            .routing()
            .add_label("start")
            .routing()
            .register_routes([
                rule(actions::log("hit"), subjects::always()),
                rule(actions::goto("start"), subjects::path_info("^/loop$")),
            ]);
        assert_eq!(
            options(&section),
            vec![
                pair("route-label", "start"),
                pair("route-run", "log:hit"),
                pair("route", "^/loop$ goto:start"),
            ]
        );
    }

    #[test]
    fn test_route_action_loads_its_plugin() {
        let mut section = Section::default();
        section
            .routing()
            .register_route(rule(actions::log("hit"), subjects::always()))
            .routing()
            .register_route(rule(actions::cache_serve("${REQUEST_URI}", None), subjects::always()));
        assert_eq!(
            options(&section),
            vec![
                pair("plugin", "router_cache"),
                pair("route-run", "log:hit"),
                pair("route-run", "cache:key=${REQUEST_URI}"),
            ]
        );
    }

    #[test]
    fn test_router_with_shared_socket_from_networking() {
        let mut section = Section::default();
        let shared = sockets::shared(":80");
        section
            .networking()
            .register_socket(&shared)
            .routing()
            .use_router(
                &Router::http(&shared)
                    .set_connections_params(ConnectionsParams {
                        retry_max: Some(3),
                        ..ConnectionsParams::default()
                    })
                    .forward_to(to_socket(&["/run/app.sock"])),
            );
        assert_eq!(
            options(&section),
            vec![
                pair("shared-socket", ":80"),
                pair("plugin", "http"),
                pair("http", "=0"),
                pair("http-max-retries", "3"),
                pair("http-to", "/run/app.sock"),
            ]
        );
    }

    #[test]
    fn test_error_page() {
        let mut section = Section::default();
        section.routing().set_error_page(404, "/srv/404.html").unwrap();
        assert_eq!(options(&section), vec![pair("error-page-404", "/srv/404.html")]);
        assert!(matches!(
            section.routing().set_error_page(418, "/srv/teapot.html"),
            Err(ConfigurationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_headers() {
        let mut section = Section::default();
        section
            .routing()
            .header_add("X-Frame-Options", "DENY")
            .routing()
            .header_remove("Server")
            .routing()
            .header_collect("X-Sendfile", "SENDFILE", true);
        assert_eq!(
            options(&section),
            vec![
                pair("add-header", "X-Frame-Options: DENY"),
                pair("del-header", "Server"),
                pair("pull-header", "X-Sendfile SENDFILE"),
            ]
        );
    }
}
