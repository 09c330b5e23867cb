//! Management-instrumentation interface.
//!
//! The platform service the adapters query for physical-memory-module,
//! disk-drive/partition, video-controller and firmware records. It is an
//! explicitly owned, injected dependency so adapters stay testable with a
//! substitutable fake; its total absence and any per-call failure are
//! first-class, non-fatal outcomes.
//!
//! The production implementation is sysfs-backed: raw SMBIOS structures
//! under /sys/firmware/dmi/entries, block devices under /sys/block, DRM
//! devices under /sys/class/drm and DMI identity under /sys/class/dmi/id.
//! The sysfs root is relocatable for tests.

use crate::units::BYTES_PER_MIB;
use crate::usage::parse_mounts;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Error from a management-interface query. Adapters convert these to
/// marker fields; they never cross the adapter boundary.
#[derive(Debug, Error)]
pub enum MgmtError {
    #[error("management interface unavailable: {0}")]
    Unavailable(String),
    #[error("query failed: {0}")]
    Query(#[from] std::io::Error),
}

/// One installed physical memory module.
///
/// `memory_type` is the raw SMBIOS type-17 code; the memory adapter maps it
/// through its fixed label table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryModuleRecord {
    pub memory_type: u16,
    pub speed_mhz: Option<u32>,
    pub manufacturer: Option<String>,
    pub capacity_bytes: Option<u64>,
}

/// One physical disk drive. `index` is the key partitions refer back to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskDriveRecord {
    pub index: usize,
    pub model: String,
    pub manufacturer: Option<String>,
    pub size_bytes: Option<u64>,
    pub interface_type: String,
}

/// One partition, associated to its drive by index, not by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionRecord {
    pub drive_index: usize,
    pub device: String,
    pub mount_point: Option<String>,
}

/// One video controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoControllerRecord {
    pub name: String,
    pub vram_bytes: Option<u64>,
    pub driver_version: Option<String>,
}

/// One firmware (BIOS/UEFI) record. `release_date` is normalized to an
/// 8-digit `YYYYMMDD` code; display formatting is the adapter's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmwareRecord {
    pub manufacturer: String,
    pub version: String,
    pub description: String,
    pub release_date: Option<String>,
}

/// The instrumentation handle threaded into every adapter call.
pub trait ManagementInterface {
    /// One-time availability check, performed by the capability probe.
    fn initialize(&self) -> Result<(), MgmtError>;

    fn memory_modules(&self) -> Result<Vec<MemoryModuleRecord>, MgmtError>;
    fn disk_drives(&self) -> Result<Vec<DiskDriveRecord>, MgmtError>;
    fn partitions(&self) -> Result<Vec<PartitionRecord>, MgmtError>;
    fn video_controllers(&self) -> Result<Vec<VideoControllerRecord>, MgmtError>;
    fn firmware_records(&self) -> Result<Vec<FirmwareRecord>, MgmtError>;
}

/// Linux sysfs/SMBIOS implementation.
pub struct SysfsInterface {
    root: PathBuf,
}

impl SysfsInterface {
    pub fn new() -> Self {
        Self::with_root("/")
    }

    /// Interface rooted at an alternate tree (tests use a fixture root).
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn dmi_id_dir(&self) -> PathBuf {
        self.root.join("sys/class/dmi/id")
    }

    fn mount_table(&self) -> HashMap<String, String> {
        let path = self.root.join("proc/self/mounts");
        let contents = fs::read_to_string(path).unwrap_or_default();
        parse_mounts(&contents)
            .into_iter()
            .map(|m| (m.device, m.mount_point))
            .collect()
    }

    fn block_device_names(&self) -> Result<Vec<String>, MgmtError> {
        let mut names: Vec<String> = fs::read_dir(self.root.join("sys/block"))?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| !is_virtual_block_device(name))
            .collect();
        names.sort();
        Ok(names)
    }
}

impl Default for SysfsInterface {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagementInterface for SysfsInterface {
    fn initialize(&self) -> Result<(), MgmtError> {
        let dir = self.dmi_id_dir();
        match fs::read_dir(&dir) {
            Ok(_) => Ok(()),
            Err(e) => Err(MgmtError::Unavailable(format!(
                "{} not readable: {}",
                dir.display(),
                e
            ))),
        }
    }

    fn memory_modules(&self) -> Result<Vec<MemoryModuleRecord>, MgmtError> {
        let entries_dir = self.root.join("sys/firmware/dmi/entries");
        let mut instances: Vec<(u32, PathBuf)> = fs::read_dir(&entries_dir)?
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().to_string();
                let instance = name.strip_prefix("17-")?.parse().ok()?;
                Some((instance, e.path()))
            })
            .collect();
        instances.sort_by_key(|(n, _)| *n);

        let mut modules = Vec::new();
        for (instance, path) in instances {
            // One unreadable or malformed entry must not drop its siblings.
            match fs::read(path.join("raw")).ok().as_deref().and_then(parse_memory_device) {
                Some(module) => modules.push(module),
                None => debug!("skipping SMBIOS memory device entry {}", instance),
            }
        }
        Ok(modules)
    }

    fn disk_drives(&self) -> Result<Vec<DiskDriveRecord>, MgmtError> {
        let mut drives = Vec::new();
        for (index, name) in self.block_device_names()?.iter().enumerate() {
            let block_dir = self.root.join("sys/block").join(name);
            let model = read_trimmed(block_dir.join("device/model")).unwrap_or_else(|| name.clone());
            let manufacturer =
                read_trimmed(block_dir.join("device/vendor")).filter(|v| !v.is_empty());
            let size_bytes = read_u64(block_dir.join("size")).map(|sectors| sectors * 512);
            let interface_type = fs::read_link(&block_dir)
                .map(|target| classify_transport(&target.to_string_lossy()))
                .unwrap_or("unknown")
                .to_string();
            drives.push(DiskDriveRecord {
                index,
                model,
                manufacturer,
                size_bytes,
                interface_type,
            });
        }
        Ok(drives)
    }

    fn partitions(&self) -> Result<Vec<PartitionRecord>, MgmtError> {
        let mounts = self.mount_table();
        let mut partitions = Vec::new();
        for (drive_index, name) in self.block_device_names()?.iter().enumerate() {
            let block_dir = self.root.join("sys/block").join(name);
            // An unlistable drive keeps its siblings' partitions intact.
            let Ok(entries) = fs::read_dir(&block_dir) else {
                debug!("cannot list partitions of {}", name);
                continue;
            };
            let mut children: Vec<String> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .filter(|child| {
                    child.starts_with(name.as_str())
                        && block_dir.join(child).join("partition").exists()
                })
                .collect();
            children.sort();
            for child in children {
                let device = format!("/dev/{}", child);
                let mount_point = mounts.get(&device).cloned();
                partitions.push(PartitionRecord {
                    drive_index,
                    device,
                    mount_point,
                });
            }
        }
        Ok(partitions)
    }

    fn video_controllers(&self) -> Result<Vec<VideoControllerRecord>, MgmtError> {
        let drm_dir = self.root.join("sys/class/drm");
        let mut cards: Vec<String> = fs::read_dir(&drm_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| is_card_name(name))
            .collect();
        cards.sort();

        let mut controllers = Vec::new();
        for card in cards {
            let device_dir = drm_dir.join(&card).join("device");
            let vendor = read_hex_u32(device_dir.join("vendor"));
            let device_id = read_hex_u32(device_dir.join("device"));
            let name = controller_name(vendor, device_id);
            let vram_bytes = read_u64(device_dir.join("mem_info_vram_total"));
            let driver_version = read_uevent_driver(&device_dir.join("uevent"))
                .and_then(|driver| read_trimmed(self.root.join("sys/module").join(driver).join("version")));
            controllers.push(VideoControllerRecord {
                name,
                vram_bytes,
                driver_version,
            });
        }
        Ok(controllers)
    }

    fn firmware_records(&self) -> Result<Vec<FirmwareRecord>, MgmtError> {
        let id = self.dmi_id_dir();
        // The directory itself must be readable; individual attributes may
        // be absent and degrade field by field.
        fs::read_dir(&id)?;

        let manufacturer = read_trimmed(id.join("bios_vendor")).unwrap_or_default();
        let version = read_trimmed(id.join("bios_version")).unwrap_or_default();
        let release_date =
            read_trimmed(id.join("bios_date")).and_then(|d| normalize_release_date(&d));
        let description = [
            read_trimmed(id.join("sys_vendor")),
            read_trimmed(id.join("product_name")),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

        Ok(vec![FirmwareRecord {
            manufacturer,
            version,
            description,
            release_date,
        }])
    }
}

/// Loop, ram and mapper devices are not physical drives.
fn is_virtual_block_device(name: &str) -> bool {
    const VIRTUAL_PREFIXES: &[&str] = &["loop", "ram", "zram", "dm-", "md", "fd", "sr"];
    VIRTUAL_PREFIXES.iter().any(|p| name.starts_with(p))
}

fn is_card_name(name: &str) -> bool {
    name.strip_prefix("card")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Classify a drive's transport from its resolved sysfs device path.
fn classify_transport(device_path: &str) -> &'static str {
    const TRANSPORTS: &[(&str, &str)] = &[
        ("/nvme", "NVMe"),
        ("/ata", "ATA"),
        ("/usb", "USB"),
        ("/virtio", "VirtIO"),
        ("/mmc", "MMC"),
        ("/host", "SCSI"),
    ];
    for (token, label) in TRANSPORTS {
        if device_path.contains(token) {
            return label;
        }
    }
    "unknown"
}

fn controller_name(vendor: Option<u32>, device_id: Option<u32>) -> String {
    let family = match vendor {
        Some(0x8086) => "Intel Graphics",
        Some(0x10de) => "NVIDIA GPU",
        Some(0x1002) => "AMD/ATI GPU",
        Some(0x15ad) => "VMware SVGA",
        Some(0x1af4) => "VirtIO GPU",
        _ => "Unknown GPU",
    };
    format!(
        "{} ({:04x}:{:04x})",
        family,
        vendor.unwrap_or(0),
        device_id.unwrap_or(0)
    )
}

/// Parse one raw SMBIOS type-17 (Memory Device) structure.
///
/// Returns None for empty slots and records too short to carry the fields
/// we need (size word at 0x0C, type at 0x12, speed at 0x15, manufacturer
/// string index at 0x17).
fn parse_memory_device(raw: &[u8]) -> Option<MemoryModuleRecord> {
    if raw.len() < 0x18 || raw[0] != 17 {
        return None;
    }
    let length = raw[1] as usize;
    if length < 0x18 || raw.len() < length {
        return None;
    }

    let size_word = u16::from_le_bytes([raw[0x0C], raw[0x0D]]);
    if size_word == 0 {
        // Slot present but no module installed.
        return None;
    }
    let capacity_bytes = match size_word {
        0xFFFF => None,
        0x7FFF => {
            // Extended size, MiB dword at 0x1C.
            if length >= 0x20 {
                let mib =
                    u32::from_le_bytes([raw[0x1C], raw[0x1D], raw[0x1E], raw[0x1F]]) as u64;
                Some(mib * BYTES_PER_MIB)
            } else {
                None
            }
        }
        w if w & 0x8000 != 0 => Some(((w & 0x7FFF) as u64) * 1024),
        w => Some((w as u64) * BYTES_PER_MIB),
    };

    let speed = u16::from_le_bytes([raw[0x15], raw[0x16]]);
    Some(MemoryModuleRecord {
        memory_type: raw[0x12] as u16,
        speed_mhz: (speed != 0).then_some(speed as u32),
        manufacturer: smbios_string(raw, length, raw[0x17]),
        capacity_bytes,
    })
}

/// Fetch a 1-based string from the unformatted area following an SMBIOS
/// structure. Index 0 means "no string".
fn smbios_string(raw: &[u8], offset: usize, index: u8) -> Option<String> {
    if index == 0 {
        return None;
    }
    let area = raw.get(offset..)?;
    area.split(|b| *b == 0)
        .nth(index as usize - 1)
        .map(|s| String::from_utf8_lossy(s).trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Normalize a firmware release date to the 8-digit `YYYYMMDD` code.
///
/// Accepts the sysfs `MM/DD/YYYY` form and already-numeric codes.
fn normalize_release_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.len() >= 8 && raw.bytes().take(8).all(|b| b.is_ascii_digit()) {
        return Some(raw[..8].to_string());
    }
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() == 3 && parts[2].len() == 4 {
        let all_numeric = parts.iter().all(|p| p.bytes().all(|b| b.is_ascii_digit()));
        if all_numeric {
            return Some(format!("{}{:0>2}{:0>2}", parts[2], parts[0], parts[1]));
        }
    }
    None
}

fn read_trimmed(path: impl AsRef<Path>) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn read_u64(path: impl AsRef<Path>) -> Option<u64> {
    read_trimmed(path).and_then(|s| s.parse().ok())
}

fn read_hex_u32(path: impl AsRef<Path>) -> Option<u32> {
    read_trimmed(path)
        .and_then(|s| u32::from_str_radix(s.trim_start_matches("0x"), 16).ok())
}

fn read_uevent_driver(path: &Path) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    contents
        .lines()
        .find_map(|line| line.strip_prefix("DRIVER="))
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}
