//! Typed value catalogs.

pub mod actions;
pub mod alarms;
pub mod encoders;
pub mod loggers;
pub mod metrics;
pub mod pushers;
pub mod routers;
pub mod routes;
pub mod sockets;
