//! Memory facts, enriched with physical-module details when the management
//! interface is present.

use crate::capability::Capabilities;
use crate::facts::{FactSet, Unit, NOT_AVAILABLE};
use crate::mgmt::{ManagementInterface, MemoryModuleRecord};
use crate::snapshot::HostSnapshot;
use crate::units::bytes_to_gib;
use std::collections::BTreeSet;
use tracing::warn;

/// SMBIOS memory-type codes with a known label; anything else renders as
/// the raw numeric code.
const MEMORY_TYPE_LABELS: &[(u16, &str)] = &[(20, "DDR"), (21, "DDR2"), (24, "DDR3"), (26, "DDR4")];

pub fn collect(
    snapshot: &HostSnapshot,
    caps: Capabilities,
    iface: &dyn ManagementInterface,
) -> FactSet {
    let memory = &snapshot.memory;
    let mut set = FactSet::new();
    set.push_quantity("Total installed", bytes_to_gib(memory.total_bytes), Unit::Gib);
    set.push_quantity("Available", bytes_to_gib(memory.available_bytes), Unit::Gib);
    set.push_quantity("Available percentage", memory.available_percent(), Unit::Percent);

    if caps.management_interface_available {
        match iface.memory_modules() {
            Ok(modules) if !modules.is_empty() => enrich(&mut set, &modules),
            Ok(_) => {}
            // Enrichment is optional; the base facts stand on their own.
            Err(e) => warn!("memory module enrichment failed: {}", e),
        }
    }
    set
}

/// Distinct module types, speeds and manufacturers are de-duplicated into
/// ordered sets and rendered comma-joined; capacities are listed per module.
fn enrich(set: &mut FactSet, modules: &[MemoryModuleRecord]) {
    let types: BTreeSet<String> = modules
        .iter()
        .map(|m| memory_type_label(m.memory_type))
        .collect();
    let speeds: BTreeSet<u32> = modules.iter().filter_map(|m| m.speed_mhz).collect();
    let manufacturers: BTreeSet<String> = modules
        .iter()
        .filter_map(|m| m.manufacturer.as_deref())
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect();
    let capacities: Vec<String> = modules
        .iter()
        .map(|m| match m.capacity_bytes {
            Some(bytes) => format!("{:.2} GiB", bytes_to_gib(bytes)),
            None => NOT_AVAILABLE.to_string(),
        })
        .collect();

    set.push_text("Module types", join(types.into_iter()));
    if !speeds.is_empty() {
        set.push_text(
            "Module speeds",
            join(speeds.into_iter().map(|s| format!("{} MHz", s))),
        );
    }
    if !manufacturers.is_empty() {
        set.push_text("Module manufacturers", join(manufacturers.into_iter()));
    }
    set.push_text("Module capacities", capacities.join(", "));
}

fn join(values: impl Iterator<Item = String>) -> String {
    values.collect::<Vec<_>>().join(", ")
}

pub(crate) fn memory_type_label(code: u16) -> String {
    MEMORY_TYPE_LABELS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::system::tests::sample_snapshot;
    use crate::mgmt::{
        DiskDriveRecord, FirmwareRecord, MgmtError, PartitionRecord, VideoControllerRecord,
    };
    use crate::units::BYTES_PER_GIB;

    struct FakeInterface {
        modules: Result<Vec<MemoryModuleRecord>, MgmtError>,
    }

    impl ManagementInterface for FakeInterface {
        fn initialize(&self) -> Result<(), MgmtError> {
            Ok(())
        }
        fn memory_modules(&self) -> Result<Vec<MemoryModuleRecord>, MgmtError> {
            match &self.modules {
                Ok(m) => Ok(m.clone()),
                Err(_) => Err(MgmtError::Unavailable("boom".into())),
            }
        }
        fn disk_drives(&self) -> Result<Vec<DiskDriveRecord>, MgmtError> {
            Ok(vec![])
        }
        fn partitions(&self) -> Result<Vec<PartitionRecord>, MgmtError> {
            Ok(vec![])
        }
        fn video_controllers(&self) -> Result<Vec<VideoControllerRecord>, MgmtError> {
            Ok(vec![])
        }
        fn firmware_records(&self) -> Result<Vec<FirmwareRecord>, MgmtError> {
            Ok(vec![])
        }
    }

    fn module(memory_type: u16, speed: u32, manufacturer: &str, gib: u64) -> MemoryModuleRecord {
        MemoryModuleRecord {
            memory_type,
            speed_mhz: Some(speed),
            manufacturer: Some(manufacturer.to_string()),
            capacity_bytes: Some(gib * BYTES_PER_GIB),
        }
    }

    #[test]
    fn test_base_facts_without_capability() {
        let caps = Capabilities {
            management_interface_available: false,
        };
        let iface = FakeInterface {
            modules: Ok(vec![module(26, 3200, "Kingston", 8)]),
        };
        let body = collect(&sample_snapshot(), caps, &iface).render();
        assert!(body.contains("Total installed: 32.00 GiB"));
        assert!(body.contains("Available: 20.00 GiB"));
        assert!(body.contains("Available percentage: 62.5%"));
        assert!(!body.contains("Module types"));
    }

    #[test]
    fn test_enrichment_deduplicates_into_sets() {
        let caps = Capabilities {
            management_interface_available: true,
        };
        let iface = FakeInterface {
            modules: Ok(vec![
                module(26, 3200, "Kingston", 8),
                module(26, 3200, "Kingston", 8),
                module(26, 2667, "Corsair", 16),
            ]),
        };
        let body = collect(&sample_snapshot(), caps, &iface).render();
        assert!(body.contains("Module types: DDR4"));
        assert!(body.contains("Module speeds: 2667 MHz, 3200 MHz"));
        assert!(body.contains("Module manufacturers: Corsair, Kingston"));
        // Capacities are per module, not de-duplicated.
        assert!(body.contains("Module capacities: 8.00 GiB, 8.00 GiB, 16.00 GiB"));
    }

    #[test]
    fn test_enrichment_failure_keeps_base_facts() {
        let caps = Capabilities {
            management_interface_available: true,
        };
        let iface = FakeInterface {
            modules: Err(MgmtError::Unavailable("boom".into())),
        };
        let body = collect(&sample_snapshot(), caps, &iface).render();
        assert!(body.contains("Total installed: 32.00 GiB"));
        assert!(!body.contains("Module"));
    }

    #[test]
    fn test_memory_type_label_table() {
        assert_eq!(memory_type_label(20), "DDR");
        assert_eq!(memory_type_label(21), "DDR2");
        assert_eq!(memory_type_label(24), "DDR3");
        assert_eq!(memory_type_label(26), "DDR4");
        // Unmapped codes render as their raw numeric value.
        assert_eq!(memory_type_label(34), "34");
        assert_eq!(memory_type_label(0), "0");
    }
}
