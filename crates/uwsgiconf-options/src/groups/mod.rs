//! Option group façades.
//!
//! Each group borrows a [`Section`](uwsgiconf_core::Section) mutably and
//! exposes setters that translate typed parameters into option writes. Absent
//! parameters (`None`, empty lists) leave the section untouched, and every
//! setter hands the section back for chaining.

pub mod alarms;
pub mod applications;
pub mod caching;
pub mod empire;
pub mod locks;
pub mod logging;
pub mod main_process;
pub mod master_process;
pub mod monitoring;
pub mod networking;
pub mod python;
pub mod routing;
pub mod statics;
pub mod subscriptions;
pub mod workers;

pub use alarms::Alarms;
pub use applications::Applications;
pub use caching::Caching;
pub use empire::Empire;
pub use locks::Locks;
pub use logging::Logging;
pub use main_process::MainProcess;
pub use master_process::MasterProcess;
pub use monitoring::Monitoring;
pub use networking::Networking;
pub use python::Python;
pub use routing::Routing;
pub use statics::Statics;
pub use subscriptions::Subscriptions;
pub use workers::Workers;
