//! Host snapshot - the platform-independent facts gathered once per run.
//!
//! Adapters consume this instead of touching the live host, which keeps
//! them drivable from tests with a fabricated snapshot.

use serde::{Deserialize, Serialize};
use std::fs;
use sysinfo::{Networks, System};
use tracing::debug;

/// One network interface and its link speed in Mbps (0 when unreported).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetLink {
    pub name: String,
    pub speed_mbps: u64,
}

/// Memory totals, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl MemorySnapshot {
    pub fn available_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            self.available_bytes as f64 * 100.0 / self.total_bytes as f64
        }
    }
}

/// Everything the always-available adapters need, gathered in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub hostname: String,
    pub user: String,
    pub os_name: String,
    pub os_version: String,
    pub kernel_version: String,
    pub architecture: String,
    pub cpu_brand: String,
    pub physical_cores: usize,
    pub logical_threads: usize,
    pub cpu_frequency_mhz: f64,
    pub memory: MemorySnapshot,
    pub links: Vec<NetLink>,
}

impl HostSnapshot {
    /// Gather from the live host.
    pub fn gather() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        let cpu_brand = sys
            .cpus()
            .first()
            .map(|c| c.brand().trim().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let cpu_frequency_mhz = sys.cpus().first().map(|c| c.frequency()).unwrap_or(0) as f64;

        let networks = Networks::new_with_refreshed_list();
        let mut links: Vec<NetLink> = Vec::new();
        for (name, _data) in &networks {
            links.push(NetLink {
                name: name.clone(),
                speed_mbps: link_speed_mbps(name),
            });
        }
        // Network maps enumerate in hash order; keep the report stable.
        links.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
            user: current_user(),
            os_name: System::name().unwrap_or_else(|| "unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "unknown".to_string()),
            kernel_version: System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
            architecture: std::env::consts::ARCH.to_string(),
            cpu_brand,
            physical_cores: sys
                .physical_core_count()
                .unwrap_or_else(num_cpus::get_physical),
            logical_threads: sys.cpus().len(),
            cpu_frequency_mhz,
            memory: MemorySnapshot {
                total_bytes: sys.total_memory(),
                available_bytes: sys.available_memory(),
            },
            links,
        }
    }
}

/// Resolve the invoking user from the current UID, falling back to the
/// environment.
fn current_user() -> String {
    if let Ok(Some(user)) = nix::unistd::User::from_uid(nix::unistd::getuid()) {
        return user.name;
    }
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Link speed as exposed by the kernel; absent or unreported reads as 0.
fn link_speed_mbps(interface: &str) -> u64 {
    let path = format!("/sys/class/net/{}/speed", interface);
    match fs::read_to_string(&path) {
        Ok(contents) => contents.trim().parse::<i64>().ok().filter(|s| *s > 0).unwrap_or(0) as u64,
        Err(e) => {
            debug!("no link speed for {}: {}", interface, e);
            0
        }
    }
}
