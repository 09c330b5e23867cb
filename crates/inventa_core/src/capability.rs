//! One-shot capability detection.
//!
//! Runs once at the start of a report and is threaded read-only into every
//! adapter call; adapters consult it instead of re-detecting. Absence of
//! the management interface is a normal operating mode, not an error.

use crate::mgmt::ManagementInterface;
use tracing::info;

/// Which optional data sources are available this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub management_interface_available: bool,
}

impl Capabilities {
    /// Probe the management interface exactly once. Never fails and never
    /// retries within a run.
    pub fn detect(iface: &dyn ManagementInterface) -> Self {
        let management_interface_available = match iface.initialize() {
            Ok(()) => {
                info!("management interface available");
                true
            }
            Err(e) => {
                info!("running without management interface: {}", e);
                false
            }
        };
        Self {
            management_interface_available,
        }
    }
}
