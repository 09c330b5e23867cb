//! Normalized fact model shared by all source adapters.
//!
//! A `FactSet` is an ordered collection of named, typed facts for one
//! hardware/software domain. A field that could not be determined is simply
//! absent, or carries one of the explicit marker strings below; absence is a
//! valid state, not an error.

use serde::{Deserialize, Serialize};

/// Marker for a single field whose value was not reported by the platform.
pub const NOT_AVAILABLE: &str = "not available";

/// Measurement unit carried by a quantity fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// Gibibytes, rendered with two decimals.
    Gib,
    /// Mebibytes, rendered rounded to the nearest integer.
    Mib,
    /// Megahertz, rendered with two decimals.
    Mhz,
    /// Megabits per second, rendered integral.
    Mbps,
    /// Percentage, rendered with one decimal.
    Percent,
}

/// A single typed fact value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FactValue {
    Text(String),
    Count(u64),
    Quantity { value: f64, unit: Unit },
}

impl FactValue {
    fn render(&self) -> String {
        match self {
            FactValue::Text(s) => s.clone(),
            FactValue::Count(n) => n.to_string(),
            FactValue::Quantity { value, unit } => match unit {
                Unit::Gib => format!("{:.2} GiB", value),
                Unit::Mib => format!("{} MiB", value.round() as u64),
                Unit::Mhz => format!("{:.2} MHz", value),
                Unit::Mbps => format!("{} Mbps", value.round() as u64),
                Unit::Percent => format!("{:.1}%", value),
            },
        }
    }
}

/// One labelled field inside a fact set.
///
/// An empty label renders as a bare line (used for marker fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub label: String,
    pub value: FactValue,
    pub indent: u8,
}

/// Ordered, per-domain collection of named facts.
///
/// Produced by exactly one source adapter and never mutated after return.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactSet {
    facts: Vec<Fact>,
}

impl FactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fact set holding a single bare marker line.
    pub fn marker(text: impl Into<String>) -> Self {
        let mut set = Self::new();
        set.push(0, "", FactValue::Text(text.into()));
        set
    }

    pub fn push(&mut self, indent: u8, label: impl Into<String>, value: FactValue) {
        self.facts.push(Fact {
            label: label.into(),
            value,
            indent,
        });
    }

    pub fn push_text(&mut self, label: impl Into<String>, text: impl Into<String>) {
        self.push(0, label, FactValue::Text(text.into()));
    }

    pub fn push_count(&mut self, label: impl Into<String>, n: u64) {
        self.push(0, label, FactValue::Count(n));
    }

    pub fn push_quantity(&mut self, label: impl Into<String>, value: f64, unit: Unit) {
        self.push(0, label, FactValue::Quantity { value, unit });
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// Render as one line per fact, nested fields indented two spaces per
    /// level, marker lines bare.
    pub fn render(&self) -> String {
        let lines: Vec<String> = self
            .facts
            .iter()
            .map(|f| {
                let pad = "  ".repeat(f.indent as usize);
                if f.label.is_empty() {
                    format!("{}{}", pad, f.value.render())
                } else {
                    format!("{}{}: {}", pad, f.label, f.value.render())
                }
            })
            .collect();
        lines.join("\n")
    }
}

/// Render an ordered sequence of fact sets into one body.
pub fn render_all(sets: &[FactSet]) -> String {
    let rendered: Vec<String> = sets
        .iter()
        .filter(|s| !s.is_empty())
        .map(FactSet::render)
        .collect();
    rendered.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_rendering() {
        let mut set = FactSet::new();
        set.push_quantity("Capacity", 465.7612, Unit::Gib);
        set.push_quantity("Frequency", 3600.0, Unit::Mhz);
        set.push_quantity("Memory", 4095.6, Unit::Mib);
        set.push_quantity("Speed", 1000.0, Unit::Mbps);
        set.push_quantity("Available", 39.54, Unit::Percent);

        let body = set.render();
        assert!(body.contains("Capacity: 465.76 GiB"));
        assert!(body.contains("Frequency: 3600.00 MHz"));
        assert!(body.contains("Memory: 4096 MiB"));
        assert!(body.contains("Speed: 1000 Mbps"));
        assert!(body.contains("Available: 39.5%"));
    }

    #[test]
    fn test_marker_renders_bare() {
        let set = FactSet::marker("disk detection not supported on this platform");
        assert_eq!(set.render(), "disk detection not supported on this platform");
    }

    #[test]
    fn test_indented_fields() {
        let mut set = FactSet::new();
        set.push_text("Disk", "Samsung SSD 970");
        set.push(1, "Manufacturer", FactValue::Text("Samsung".into()));
        set.push(2, "Free", FactValue::Quantity { value: 12.5, unit: Unit::Gib });

        let body = set.render();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], "Disk: Samsung SSD 970");
        assert_eq!(lines[1], "  Manufacturer: Samsung");
        assert_eq!(lines[2], "    Free: 12.50 GiB");
    }

    #[test]
    fn test_render_all_skips_empty_sets() {
        let mut a = FactSet::new();
        a.push_text("Name", "first");
        let b = FactSet::new();
        let mut c = FactSet::new();
        c.push_text("Name", "second");

        let body = render_all(&[a, b, c]);
        assert_eq!(body, "Name: first\nName: second");
    }
}
