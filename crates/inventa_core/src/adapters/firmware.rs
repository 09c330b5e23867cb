//! Firmware (BIOS/UEFI) facts.

use crate::capability::Capabilities;
use crate::facts::{FactSet, NOT_AVAILABLE};
use crate::mgmt::ManagementInterface;
use tracing::warn;

pub const FIRMWARE_NOT_SUPPORTED: &str = "firmware information not supported on this platform";
pub const FIRMWARE_ERROR: &str = "error obtaining firmware data";

pub fn collect(caps: Capabilities, iface: &dyn ManagementInterface) -> FactSet {
    if !caps.management_interface_available {
        return FactSet::marker(FIRMWARE_NOT_SUPPORTED);
    }

    let records = match iface.firmware_records() {
        Ok(records) => records,
        Err(e) => {
            warn!("firmware query failed: {}", e);
            return FactSet::marker(FIRMWARE_ERROR);
        }
    };

    let mut set = FactSet::new();
    for record in &records {
        set.push_text("Firmware vendor", non_empty(&record.manufacturer));
        set.push_text("Firmware version", non_empty(&record.version));
        set.push_text(
            "Release date",
            format_release_date(record.release_date.as_deref()),
        );
        set.push_text("Description", non_empty(&record.description));
    }
    set
}

fn non_empty(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Turn the 8-digit `YYYYMMDD` release code into day/month/year display
/// form; anything else renders as "not available".
pub(crate) fn format_release_date(code: Option<&str>) -> String {
    match code {
        Some(c) if c.len() >= 8 && c.bytes().take(8).all(|b| b.is_ascii_digit()) => {
            format!("{}/{}/{}", &c[6..8], &c[4..6], &c[0..4])
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}
