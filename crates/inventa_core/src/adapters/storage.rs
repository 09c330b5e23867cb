//! Storage facts: physical drives with nested partitions and filesystem
//! usage.

use crate::capability::Capabilities;
use crate::facts::{FactSet, FactValue, Unit, NOT_AVAILABLE};
use crate::mgmt::{DiskDriveRecord, ManagementInterface, PartitionRecord};
use crate::units::bytes_to_gib;
use crate::usage::{UsageOutcome, UsageProbe};
use tracing::warn;

pub const STORAGE_NOT_SUPPORTED: &str = "disk detection not supported on this platform";
pub const STORAGE_ERROR: &str = "error obtaining disk data";

pub fn collect(
    caps: Capabilities,
    iface: &dyn ManagementInterface,
    usage: &dyn UsageProbe,
) -> Vec<FactSet> {
    if !caps.management_interface_available {
        return vec![FactSet::marker(STORAGE_NOT_SUPPORTED)];
    }

    let drives = match iface.disk_drives() {
        Ok(drives) => drives,
        Err(e) => {
            warn!("disk enumeration failed: {}", e);
            return vec![FactSet::marker(STORAGE_ERROR)];
        }
    };

    // A failed partition enumeration leaves every drive listed without
    // children rather than dropping the drives themselves.
    let partitions = iface.partitions().unwrap_or_else(|e| {
        warn!("partition enumeration failed: {}", e);
        Vec::new()
    });

    drives
        .iter()
        .map(|drive| describe_drive(drive, &partitions, usage))
        .collect()
}

fn describe_drive(
    drive: &DiskDriveRecord,
    partitions: &[PartitionRecord],
    usage: &dyn UsageProbe,
) -> FactSet {
    let mut set = FactSet::new();
    set.push_text("Disk", &drive.model);
    set.push(
        1,
        "Manufacturer",
        FactValue::Text(
            drive
                .manufacturer
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        ),
    );
    match drive.size_bytes {
        Some(bytes) => set.push(
            1,
            "Capacity",
            FactValue::Quantity {
                value: bytes_to_gib(bytes),
                unit: Unit::Gib,
            },
        ),
        None => set.push(1, "Capacity", FactValue::Text(NOT_AVAILABLE.to_string())),
    }
    set.push(1, "Interface type", FactValue::Text(drive.interface_type.clone()));

    // Only partitions whose drive index matches belong to this drive.
    for part in partitions.iter().filter(|p| p.drive_index == drive.index) {
        match &part.mount_point {
            Some(mount_point) => {
                set.push(
                    1,
                    "Partition",
                    FactValue::Text(format!("{} (mounted at {})", part.device, mount_point)),
                );
                // A failed usage query keeps the partition listed with the
                // usage lines omitted.
                if let UsageOutcome::Available(facts) = usage.query(mount_point) {
                    set.push(
                        2,
                        "Total",
                        FactValue::Quantity {
                            value: bytes_to_gib(facts.total_bytes),
                            unit: Unit::Gib,
                        },
                    );
                    set.push(
                        2,
                        "Used",
                        FactValue::Quantity {
                            value: bytes_to_gib(facts.used_bytes),
                            unit: Unit::Gib,
                        },
                    );
                    set.push(
                        2,
                        "Free",
                        FactValue::Quantity {
                            value: bytes_to_gib(facts.free_bytes),
                            unit: Unit::Gib,
                        },
                    );
                }
            }
            None => set.push(1, "Partition", FactValue::Text(part.device.clone())),
        }
    }
    set
}
