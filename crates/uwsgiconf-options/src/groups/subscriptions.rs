//! Subscription system: instances announcing themselves to routers.

use uwsgiconf_core::{KeyValues, Section};

use crate::Modifier;

/// Subscription server parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerParams {
    /// Socket notified about subscription changes.
    pub client_notify_address: Option<String>,
    /// Path segments used as the key.
    pub mountpoints_depth: Option<u8>,
    /// Requires subscribers to be emperor vassals.
    pub require_vassal: Option<bool>,
    /// Seconds a node may miss announcements before removal.
    pub tolerance: Option<u32>,
    /// Seconds an inactive node is kept.
    pub tolerance_inactive: Option<u32>,
    /// Splits keys on dots when looking up.
    pub key_dot_split: Option<bool>,
}

/// Subscription client parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientParams {
    /// Starts without subscribing.
    pub start_unsubscribed: Option<bool>,
    /// Unsubscribes on shutdown.
    pub clear_on_exit: Option<bool>,
    /// Unsubscribes on graceful reload.
    pub unsubscribe_on_reload: Option<bool>,
    /// Seconds between announcements.
    pub announce_interval: Option<u32>,
}

/// A single subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscribeParams {
    /// Address announced to the server; the first socket when absent.
    pub address: Option<String>,
    /// Load balancing weight.
    pub balancing_weight: Option<u32>,
    /// Modifier used by the router for this node.
    pub modifier: Option<Modifier>,
}

/// Subscriptions option group.
#[derive(Debug)]
pub struct Subscriptions<'a> {
    section: &'a mut Section,
}

impl<'a> Subscriptions<'a> {
    pub(crate) fn new(section: &'a mut Section) -> Self {
        Self { section }
    }

    /// Sets subscription server parameters.
    pub fn set_server_params(self, params: ServerParams) -> &'a mut Section {
        self.section
            .set("subscription-notify-socket", params.client_notify_address)
            .set("subscription-mountpoint", params.mountpoints_depth)
            .set("subscription-vassal-required", params.require_vassal)
            .set("subscription-tolerance", params.tolerance)
            .set("subscription-tolerance-inactive", params.tolerance_inactive)
            .set("subscription-dotsplit", params.key_dot_split)
    }

    /// Sets subscription client parameters.
    pub fn set_client_params(self, params: ClientParams) -> &'a mut Section {
        self.section
            .set("start-unsubscribed", params.start_unsubscribed)
            .set("subscription-clear-on-shutdown", params.clear_on_exit)
            .set("unsubscribe-on-graceful-reload", params.unsubscribe_on_reload)
            .set("subscribe-freq", params.announce_interval)
    }

    /// Subscribes to a server under a key (`subscribe2`).
    pub fn subscribe(self, server: &str, key: &str, params: SubscribeParams) -> &'a mut Section {
        let payload = KeyValues::new()
            .push("server", server)
            .push("key", key)
            .push("addr", params.address)
            .push("weight", params.balancing_weight)
            .push("modifier1", params.modifier.map(|m| m.code()))
            .push("modifier2", params.modifier.and_then(|m| m.submod()));
        self.section.add("subscribe2", payload)
    }
}
