//! Inventa Control - CLI front end for the inventory engine.
//!
//! Wires the production collaborators into the collection engine, shows
//! progress while the run lasts and hands the finished report to the sink.

pub mod sink;

use anyhow::{Context, Result};
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use inventa_core::adapters::network::IwStatusCommand;
use inventa_core::{
    generate_report, Collaborators, HostSnapshot, StatvfsProbe, SysfsInterface, SysfsPower,
};
use std::path::PathBuf;
use std::time::Duration;

/// Collect the inventory, write the artifact, return its path.
pub fn run() -> Result<PathBuf> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message("collecting system inventory...");

    let snapshot = HostSnapshot::gather();
    let mgmt = SysfsInterface::new();
    let usage = StatvfsProbe::new();
    let wifi = IwStatusCommand::default();
    let power = SysfsPower::new();
    let collab = Collaborators {
        mgmt: &mgmt,
        usage: &usage,
        wifi: &wifi,
        power: &power,
    };

    let report = generate_report(&snapshot, &collab, Local::now());

    spinner.set_message("writing report...");
    let path = sink::write_report(&report, &snapshot.hostname)
        .context("cannot write the report file")?;
    spinner.finish_and_clear();
    Ok(path)
}
