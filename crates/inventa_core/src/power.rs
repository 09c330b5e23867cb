//! Power-source facts.
//!
//! Only the diagnostic rules consume these: battery charge below threshold
//! is a warning, total absence of a battery is an informational notice.

use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Charge state of the first battery found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryReading {
    pub percent: f64,
}

/// Power-source collaborator. `None` means no battery is present at all.
pub trait PowerSource {
    fn battery(&self) -> Option<BatteryReading>;
}

/// Reads /sys/class/power_supply, looking for a supply of type Battery.
pub struct SysfsPower {
    supply_dir: PathBuf,
}

impl SysfsPower {
    pub fn new() -> Self {
        Self {
            supply_dir: PathBuf::from("/sys/class/power_supply"),
        }
    }

    /// Reader rooted at an alternate supply directory (tests).
    pub fn with_dir(supply_dir: impl Into<PathBuf>) -> Self {
        Self {
            supply_dir: supply_dir.into(),
        }
    }
}

impl Default for SysfsPower {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerSource for SysfsPower {
    fn battery(&self) -> Option<BatteryReading> {
        let entries = fs::read_dir(&self.supply_dir).ok()?;
        let mut names: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
        names.sort();

        for supply in names {
            let kind = fs::read_to_string(supply.join("type")).unwrap_or_default();
            if kind.trim() != "Battery" {
                continue;
            }
            match fs::read_to_string(supply.join("capacity"))
                .ok()
                .and_then(|c| c.trim().parse::<f64>().ok())
            {
                Some(percent) => return Some(BatteryReading { percent }),
                None => debug!("battery {} has no readable capacity", supply.display()),
            }
        }
        None
    }
}
