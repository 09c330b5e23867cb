//! Diagnostic rules - fixed threshold checks over the gathered facts.
//!
//! Each rule is evaluated independently; result order is memory first, then
//! partitions in enumeration order, then the power source. Partitions whose
//! usage query failed (permission or otherwise) are skipped, never alerted.

use crate::power::BatteryReading;
use crate::snapshot::MemorySnapshot;
use crate::units::bytes_to_gib;
use crate::usage::{PartitionCheck, UsageOutcome};

pub const LOW_MEMORY_PERCENT: f64 = 20.0;
pub const LOW_DISK_FREE_GIB: f64 = 10.0;
pub const LOW_DISK_FREE_PERCENT: f64 = 10.0;
pub const LOW_BATTERY_PERCENT: f64 = 20.0;

/// Rendered body when no rule fires.
pub const NO_ALERTS: &str = "no critical alerts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    /// Informational, not a threshold breach.
    Notice,
}

/// One rendered diagnostic line.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertLine {
    pub text: String,
    pub severity: Severity,
}

impl AlertLine {
    fn warning(text: String) -> Self {
        Self {
            text,
            severity: Severity::Warning,
        }
    }

    fn notice(text: String) -> Self {
        Self {
            text,
            severity: Severity::Notice,
        }
    }
}

pub fn evaluate(
    memory: &MemorySnapshot,
    partitions: &[PartitionCheck],
    battery: Option<&BatteryReading>,
) -> Vec<AlertLine> {
    let mut alerts = Vec::new();

    // Rule 1: available memory below threshold, strict comparison.
    if memory.available_percent() < LOW_MEMORY_PERCENT {
        alerts.push(AlertLine::warning(format!(
            "warning: available memory low: {:.2} GiB (under {}%)",
            bytes_to_gib(memory.available_bytes),
            LOW_MEMORY_PERCENT
        )));
    }

    // Rule 2: one alert per qualifying partition, enumeration order.
    for check in partitions {
        let UsageOutcome::Available(facts) = check.outcome else {
            continue;
        };
        let free_gib = bytes_to_gib(facts.free_bytes);
        let free_percent = facts.free_percent();
        if free_gib < LOW_DISK_FREE_GIB || free_percent < LOW_DISK_FREE_PERCENT {
            alerts.push(AlertLine::warning(format!(
                "warning: low free space on {}: {:.2} GiB free ({:.2}%)",
                check.device, free_gib, free_percent
            )));
        }
    }

    // Rule 3: at most one line about the power source.
    match battery {
        Some(reading) if reading.percent < LOW_BATTERY_PERCENT => {
            alerts.push(AlertLine::warning(format!(
                "warning: battery low: {}%",
                reading.percent
            )));
        }
        Some(_) => {}
        None => alerts.push(AlertLine::notice(
            "no battery detected (not a laptop, or no sensor present)".to_string(),
        )),
    }

    alerts
}

/// Render the alert lines into a section body.
pub fn render(alerts: &[AlertLine]) -> String {
    if alerts.is_empty() {
        NO_ALERTS.to_string()
    } else {
        alerts
            .iter()
            .map(|a| a.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
