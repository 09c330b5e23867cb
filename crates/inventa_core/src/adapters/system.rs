//! System identity facts. Always available, no platform dependency.

use crate::facts::FactSet;
use crate::snapshot::HostSnapshot;

pub fn collect(snapshot: &HostSnapshot) -> FactSet {
    let mut set = FactSet::new();
    set.push_text("Hostname", &snapshot.hostname);
    set.push_text("User", &snapshot.user);
    set.push_text(
        "Operating system",
        format!("{} {}", snapshot.os_name, snapshot.os_version),
    );
    set.push_text("Kernel", &snapshot.kernel_version);
    set.push_text("Architecture", &snapshot.architecture);
    set
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::snapshot::{MemorySnapshot, NetLink};

    pub(crate) fn sample_snapshot() -> HostSnapshot {
        HostSnapshot {
            hostname: "atlas".into(),
            user: "ops".into(),
            os_name: "Arch Linux".into(),
            os_version: "rolling".into(),
            kernel_version: "6.8.2-arch1-1".into(),
            architecture: "x86_64".into(),
            cpu_brand: "AMD Ryzen 7 5800X 8-Core Processor".into(),
            physical_cores: 8,
            logical_threads: 16,
            cpu_frequency_mhz: 3800.0,
            memory: MemorySnapshot {
                total_bytes: 32 * 1024 * 1024 * 1024,
                available_bytes: 20 * 1024 * 1024 * 1024,
            },
            links: vec![NetLink {
                name: "enp5s0".into(),
                speed_mbps: 1000,
            }],
        }
    }

    #[test]
    fn test_collect_system_identity() {
        let body = collect(&sample_snapshot()).render();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], "Hostname: atlas");
        assert_eq!(lines[1], "User: ops");
        assert_eq!(lines[2], "Operating system: Arch Linux rolling");
        assert_eq!(lines[3], "Kernel: 6.8.2-arch1-1");
        assert_eq!(lines[4], "Architecture: x86_64");
    }
}
