//! Machine inventory collection engine.
//!
//! Gathers heterogeneous, platform-dependent facts from independent source
//! adapters, tolerates partial or total unavailability of any one source,
//! normalizes everything into a uniform section model and evaluates fixed
//! diagnostic rules over the gathered facts. A failed source degrades the
//! report; it never fails the run.

pub mod adapters;
pub mod capability;
pub mod diagnostics;
pub mod facts;
pub mod mgmt;
pub mod power;
pub mod report;
pub mod snapshot;
pub mod units;
pub mod usage;

pub use capability::Capabilities;
pub use mgmt::{ManagementInterface, SysfsInterface};
pub use power::{PowerSource, SysfsPower};
pub use report::{Report, ReportSection};
pub use snapshot::HostSnapshot;
pub use usage::{StatvfsProbe, UsageProbe};

use adapters::network::WifiStatusSource;
use chrono::{DateTime, Local};
use tracing::info;

/// The injected collaborators the engine queries. Production code passes
/// the sysfs-backed implementations; tests substitute fakes.
pub struct Collaborators<'a> {
    pub mgmt: &'a dyn ManagementInterface,
    pub usage: &'a dyn UsageProbe,
    pub wifi: &'a dyn WifiStatusSource,
    pub power: &'a dyn PowerSource,
}

/// Run the whole pipeline: probe capabilities once, run every source
/// adapter independently, evaluate the diagnostic rules, assemble the
/// report in the fixed section order.
pub fn generate_report(
    snapshot: &HostSnapshot,
    collab: &Collaborators<'_>,
    generated_at: DateTime<Local>,
) -> Report {
    let caps = Capabilities::detect(collab.mgmt);
    info!("collecting inventory for {}", snapshot.hostname);

    let system = adapters::system::collect(snapshot);
    let cpu = adapters::cpu::collect(snapshot);
    let memory = adapters::memory::collect(snapshot, caps, collab.mgmt);
    let disks = adapters::storage::collect(caps, collab.mgmt, collab.usage);
    let gpu = adapters::gpu::collect(caps, collab.mgmt);

    let checks = usage::check_mounted(collab.usage);
    let battery = collab.power.battery();
    let alerts = diagnostics::evaluate(&snapshot.memory, &checks, battery.as_ref());

    let network = adapters::network::collect(caps, &snapshot.links, collab.wifi);
    let firmware = adapters::firmware::collect(caps, collab.mgmt);

    Report::assemble(
        vec![
            ReportSection::from_fact_set("SYSTEM", &system),
            ReportSection::from_fact_set("CPU", &cpu),
            ReportSection::from_fact_set("RAM", &memory),
            ReportSection::from_fact_sets("DISKS", &disks),
            ReportSection::from_fact_sets("GPU", &gpu),
            ReportSection::new("DIAGNOSTICS", diagnostics::render(&alerts)),
            ReportSection::from_fact_sets("NETWORK", &network),
            ReportSection::from_fact_set("FIRMWARE", &firmware),
        ],
        generated_at,
    )
}
