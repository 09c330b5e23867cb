//! GPU facts from the management interface's video-controller records.

use crate::capability::Capabilities;
use crate::facts::{FactSet, FactValue, Unit, NOT_AVAILABLE};
use crate::mgmt::{ManagementInterface, VideoControllerRecord};
use crate::units::bytes_to_mib;
use tracing::warn;

pub const GPU_NOT_SUPPORTED: &str = "GPU detection not supported on this platform";
pub const GPU_ERROR: &str = "error obtaining GPU data";

/// Vendor token that marks a controller as integrated graphics.
const INTEGRATED_VENDOR_TOKEN: &str = "intel";

pub fn collect(caps: Capabilities, iface: &dyn ManagementInterface) -> Vec<FactSet> {
    if !caps.management_interface_available {
        return vec![FactSet::marker(GPU_NOT_SUPPORTED)];
    }

    match iface.video_controllers() {
        Ok(controllers) => controllers.iter().map(describe_controller).collect(),
        Err(e) => {
            warn!("video controller enumeration failed: {}", e);
            vec![FactSet::marker(GPU_ERROR)]
        }
    }
}

fn describe_controller(ctrl: &VideoControllerRecord) -> FactSet {
    let mut set = FactSet::new();
    let name = ctrl.name.trim();
    set.push_text("GPU", name);
    set.push(
        1,
        "Dedicated memory",
        FactValue::Quantity {
            value: bytes_to_mib(ctrl.vram_bytes.unwrap_or(0)),
            unit: Unit::Mib,
        },
    );
    set.push(
        1,
        "Driver",
        FactValue::Text(
            ctrl.driver_version
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
    );
    set.push(1, "Type", FactValue::Text(classify(name).to_string()));
    set
}

pub(crate) fn classify(name: &str) -> &'static str {
    if name.to_lowercase().contains(INTEGRATED_VENDOR_TOKEN) {
        "integrated"
    } else {
        "dedicated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mgmt::{
        DiskDriveRecord, FirmwareRecord, MemoryModuleRecord, MgmtError, PartitionRecord,
    };
    use crate::units::BYTES_PER_MIB;

    struct FakeInterface {
        controllers: Option<Vec<VideoControllerRecord>>,
    }

    impl ManagementInterface for FakeInterface {
        fn initialize(&self) -> Result<(), MgmtError> {
            Ok(())
        }
        fn memory_modules(&self) -> Result<Vec<MemoryModuleRecord>, MgmtError> {
            Ok(vec![])
        }
        fn disk_drives(&self) -> Result<Vec<DiskDriveRecord>, MgmtError> {
            Ok(vec![])
        }
        fn partitions(&self) -> Result<Vec<PartitionRecord>, MgmtError> {
            Ok(vec![])
        }
        fn video_controllers(&self) -> Result<Vec<VideoControllerRecord>, MgmtError> {
            match &self.controllers {
                Some(c) => Ok(c.clone()),
                None => Err(MgmtError::Unavailable("boom".into())),
            }
        }
        fn firmware_records(&self) -> Result<Vec<FirmwareRecord>, MgmtError> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_classify_by_vendor_token() {
        assert_eq!(classify("Intel Graphics (8086:46a6)"), "integrated");
        assert_eq!(classify("INTEL UHD 620"), "integrated");
        assert_eq!(classify("NVIDIA GPU (10de:2484)"), "dedicated");
        assert_eq!(classify("AMD/ATI GPU (1002:73bf)"), "dedicated");
    }

    #[test]
    fn test_marker_when_capability_absent() {
        let caps = Capabilities {
            management_interface_available: false,
        };
        let iface = FakeInterface { controllers: Some(vec![]) };
        let sets = collect(caps, &iface);
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].render(), GPU_NOT_SUPPORTED);
    }

    #[test]
    fn test_controller_rendering() {
        let caps = Capabilities {
            management_interface_available: true,
        };
        let iface = FakeInterface {
            controllers: Some(vec![VideoControllerRecord {
                name: "  NVIDIA GPU (10de:2484)  ".into(),
                vram_bytes: Some(8192 * BYTES_PER_MIB),
                driver_version: Some("535.54.03".into()),
            }]),
        };
        let body = collect(caps, &iface)[0].render();
        assert!(body.contains("GPU: NVIDIA GPU (10de:2484)"));
        assert!(body.contains("  Dedicated memory: 8192 MiB"));
        assert!(body.contains("  Driver: 535.54.03"));
        assert!(body.contains("  Type: dedicated"));
    }

    #[test]
    fn test_unreported_memory_and_driver() {
        let caps = Capabilities {
            management_interface_available: true,
        };
        let iface = FakeInterface {
            controllers: Some(vec![VideoControllerRecord {
                name: "Intel Graphics (8086:46a6)".into(),
                vram_bytes: None,
                driver_version: None,
            }]),
        };
        let body = collect(caps, &iface)[0].render();
        assert!(body.contains("Dedicated memory: 0 MiB"));
        assert!(body.contains("Driver: not available"));
        assert!(body.contains("Type: integrated"));
    }

    #[test]
    fn test_error_marker_when_enumeration_fails() {
        let caps = Capabilities {
            management_interface_available: true,
        };
        let iface = FakeInterface { controllers: None };
        let sets = collect(caps, &iface);
        assert_eq!(sets[0].render(), GPU_ERROR);
    }
}
