//! CPU facts. Always available, no platform dependency.

use crate::facts::{FactSet, Unit};
use crate::snapshot::HostSnapshot;

pub fn collect(snapshot: &HostSnapshot) -> FactSet {
    let mut set = FactSet::new();
    set.push_text("Model", &snapshot.cpu_brand);
    set.push_count("Physical cores", snapshot.physical_cores as u64);
    set.push_count("Logical threads", snapshot.logical_threads as u64);
    set.push_quantity("Current frequency", snapshot.cpu_frequency_mhz, Unit::Mhz);
    set
}
