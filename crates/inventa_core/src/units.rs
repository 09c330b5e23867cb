//! Unit conversions for report figures.
//!
//! Every capacity or size passes through here before it enters a fact set:
//! capacities in gibibytes, GPU memory in mebibytes, link speed in Mbps,
//! frequency in MHz. A single field never mixes units across sources.

pub const BYTES_PER_GIB: u64 = 1024 * 1024 * 1024;
pub const BYTES_PER_MIB: u64 = 1024 * 1024;

/// Convert a byte count to gibibytes.
pub fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GIB as f64
}

/// Convert a byte count to mebibytes.
pub fn bytes_to_mib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MIB as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bytes_to_gib() {
        assert_relative_eq!(bytes_to_gib(BYTES_PER_GIB), 1.0);
        assert_relative_eq!(bytes_to_gib(BYTES_PER_GIB / 2), 0.5);
        assert_relative_eq!(bytes_to_gib(0), 0.0);
    }

    #[test]
    fn test_bytes_to_mib() {
        assert_relative_eq!(bytes_to_mib(512 * BYTES_PER_MIB), 512.0);
    }
}
