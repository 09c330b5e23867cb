//! Filesystem-usage queries.
//!
//! The outcome of a usage query is an explicit three-way result rather than
//! an error: permission failures are expected for unmounted or restricted
//! volumes and must be distinguishable from other failures, since the
//! diagnostic rules silently skip the former.

use nix::errno::Errno;
use nix::sys::statvfs::statvfs;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Total/used/free figures for one mounted filesystem, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageFacts {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
}

impl UsageFacts {
    pub fn free_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            self.free_bytes as f64 * 100.0 / self.total_bytes as f64
        }
    }
}

/// Result of querying one mount point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageOutcome {
    Available(UsageFacts),
    /// Expected for restricted volumes; skipped silently downstream.
    PermissionDenied,
    /// Any other failure; reported as an omission, never a crash.
    Failed,
}

/// One real (device-backed) mounted filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedPartition {
    pub device: String,
    pub mount_point: String,
}

/// The filesystem-usage collaborator injected into the storage adapter and
/// the diagnostic evaluator.
pub trait UsageProbe {
    /// Enumerate device-backed mounted filesystems, in mount-table order.
    fn mounted(&self) -> Vec<MountedPartition>;

    fn query(&self, mount_point: &str) -> UsageOutcome;
}

/// A mounted partition paired with its usage query result; the diagnostic
/// rules iterate these in enumeration order.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionCheck {
    pub device: String,
    pub mount_point: String,
    pub outcome: UsageOutcome,
}

/// Query every mounted partition once.
pub fn check_mounted(probe: &dyn UsageProbe) -> Vec<PartitionCheck> {
    probe
        .mounted()
        .into_iter()
        .map(|m| {
            let outcome = probe.query(&m.mount_point);
            PartitionCheck {
                device: m.device,
                mount_point: m.mount_point,
                outcome,
            }
        })
        .collect()
}

/// Production probe: mount table from /proc/self/mounts, figures from
/// statvfs(2).
pub struct StatvfsProbe {
    mounts_path: PathBuf,
}

impl StatvfsProbe {
    pub fn new() -> Self {
        Self {
            mounts_path: PathBuf::from("/proc/self/mounts"),
        }
    }
}

impl Default for StatvfsProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageProbe for StatvfsProbe {
    fn mounted(&self) -> Vec<MountedPartition> {
        let contents = fs::read_to_string(&self.mounts_path).unwrap_or_default();
        parse_mounts(&contents)
    }

    fn query(&self, mount_point: &str) -> UsageOutcome {
        match statvfs(mount_point) {
            Ok(stat) => {
                let frag = stat.fragment_size() as u64;
                let total_bytes = stat.blocks() as u64 * frag;
                let free_bytes = stat.blocks_available() as u64 * frag;
                let used_bytes = total_bytes.saturating_sub(stat.blocks_free() as u64 * frag);
                UsageOutcome::Available(UsageFacts {
                    total_bytes,
                    used_bytes,
                    free_bytes,
                })
            }
            Err(Errno::EACCES) => UsageOutcome::PermissionDenied,
            Err(e) => {
                debug!("statvfs({}) failed: {}", mount_point, e);
                UsageOutcome::Failed
            }
        }
    }
}

/// Parse a /proc/self/mounts table, keeping device-backed filesystems only.
/// Octal escapes in mount points (e.g. `\040` for a space) are decoded.
pub(crate) fn parse_mounts(contents: &str) -> Vec<MountedPartition> {
    contents
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let device = fields.next()?;
            let mount_point = fields.next()?;
            if !device.starts_with("/dev/") {
                return None;
            }
            Some(MountedPartition {
                device: device.to_string(),
                mount_point: unescape_mount_field(mount_point),
            })
        })
        .collect()
}

fn unescape_mount_field(field: &str) -> String {
    // Resolve escapes at the byte level and decode once at the end, so
    // multi-byte UTF-8 sequences in mount paths pass through intact.
    let mut out = Vec::with_capacity(field.len());
    let mut bytes = field.bytes().peekable();
    while let Some(b) = bytes.next() {
        if b == b'\\' {
            let digits: Vec<u8> = bytes.clone().take(3).collect();
            if digits.len() == 3 && digits.iter().all(|d| (b'0'..=b'7').contains(d)) {
                let value = (digits[0] - b'0') * 64 + (digits[1] - b'0') * 8 + (digits[2] - b'0');
                out.push(value);
                bytes.nth(2);
                continue;
            }
        }
        out.push(b);
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_MOUNTS: &str = "\
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
/dev/nvme0n1p2 / ext4 rw,relatime 0 0
tmpfs /tmp tmpfs rw,nosuid,nodev 0 0
/dev/nvme0n1p1 /boot/efi vfat rw,relatime 0 0
/dev/sdb1 /mnt/usb\\040drive ext4 rw 0 0
";

    #[test]
    fn test_parse_mounts_keeps_device_backed_only() {
        let mounts = parse_mounts(SAMPLE_MOUNTS);
        assert_eq!(mounts.len(), 3);
        assert_eq!(mounts[0].device, "/dev/nvme0n1p2");
        assert_eq!(mounts[0].mount_point, "/");
        assert_eq!(mounts[1].mount_point, "/boot/efi");
    }

    #[test]
    fn test_parse_mounts_unescapes_spaces() {
        let mounts = parse_mounts(SAMPLE_MOUNTS);
        assert_eq!(mounts[2].mount_point, "/mnt/usb drive");
    }

    #[test]
    fn test_unescape_keeps_multibyte_utf8_intact() {
        // Volume labels may carry literal non-ASCII UTF-8; only
        // whitespace and backslashes are octal-escaped.
        assert_eq!(unescape_mount_field("/mnt/música"), "/mnt/música");
        assert_eq!(
            unescape_mount_field("/mnt/mi\\040música"),
            "/mnt/mi música"
        );
    }

    #[test]
    fn test_free_percent() {
        let facts = UsageFacts {
            total_bytes: 1000,
            used_bytes: 900,
            free_bytes: 100,
        };
        assert!((facts.free_percent() - 10.0).abs() < f64::EPSILON);

        let empty = UsageFacts {
            total_bytes: 0,
            used_bytes: 0,
            free_bytes: 0,
        };
        assert_eq!(empty.free_percent(), 0.0);
    }

    #[test]
    fn test_statvfs_probe_on_root() {
        // The root filesystem is always statable in the test environment.
        let probe = StatvfsProbe::new();
        match probe.query("/") {
            UsageOutcome::Available(facts) => {
                assert!(facts.total_bytes > 0);
                assert!(facts.free_bytes <= facts.total_bytes);
            }
            other => panic!("unexpected outcome for /: {:?}", other),
        }
    }

    #[test]
    fn test_statvfs_probe_missing_path_fails() {
        let probe = StatvfsProbe::new();
        assert_eq!(
            probe.query("/definitely/not/a/mount/point"),
            UsageOutcome::Failed
        );
    }
}
