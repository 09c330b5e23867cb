//! Report assembly - titled sections concatenated in a fixed order.
//!
//! Assembly cannot fail: by the time a fact set reaches the assembler, a
//! failed adapter has already been normalized to a degraded set. Rendering
//! is deterministic given identical sections and a fixed clock reading.

use crate::facts::{render_all, FactSet};
use chrono::{DateTime, Local};

pub const REPORT_BANNER: &str = "=== HARDWARE INVENTORY REPORT ===";

/// One titled block of rendered text.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub title: String,
    pub body: String,
}

impl ReportSection {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn from_fact_set(title: impl Into<String>, set: &FactSet) -> Self {
        Self::new(title, set.render())
    }

    pub fn from_fact_sets(title: impl Into<String>, sets: &[FactSet]) -> Self {
        Self::new(title, render_all(sets))
    }
}

/// The finished document: ordered sections plus the generation instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    sections: Vec<ReportSection>,
    generated_at: DateTime<Local>,
}

impl Report {
    pub fn assemble(sections: Vec<ReportSection>, generated_at: DateTime<Local>) -> Self {
        Self {
            sections,
            generated_at,
        }
    }

    pub fn sections(&self) -> &[ReportSection] {
        &self.sections
    }

    pub fn generated_at(&self) -> DateTime<Local> {
        self.generated_at
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(REPORT_BANNER);
        out.push_str("\n\n");
        for section in &self.sections {
            out.push_str(&format!("=== {} ===\n", section.title));
            out.push_str(section.body.trim());
            out.push_str("\n\n");
        }
        out.push_str(&format!(
            "Report generated at {}\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_clock() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 3, 14, 30, 0).unwrap()
    }

    #[test]
    fn test_render_frames_sections_in_order() {
        let report = Report::assemble(
            vec![
                ReportSection::new("SYSTEM", "Hostname: atlas"),
                ReportSection::new("CPU", "Model: test\n"),
            ],
            fixed_clock(),
        );
        let text = report.render();
        assert!(text.starts_with("=== HARDWARE INVENTORY REPORT ===\n\n"));

        let system_at = text.find("=== SYSTEM ===").unwrap();
        let cpu_at = text.find("=== CPU ===").unwrap();
        assert!(system_at < cpu_at);

        // Bodies are trimmed before framing.
        assert!(text.contains("=== CPU ===\nModel: test\n\n"));
        assert!(text.ends_with("Report generated at 2024-05-03 14:30:00\n"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let sections = vec![
            ReportSection::new("SYSTEM", "Hostname: atlas"),
            ReportSection::new("DIAGNOSTICS", "no critical alerts"),
        ];
        let a = Report::assemble(sections.clone(), fixed_clock()).render();
        let b = Report::assemble(sections, fixed_clock()).render();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_fact_sets_joins_bodies() {
        let mut one = FactSet::new();
        one.push_text("Disk", "first");
        let mut two = FactSet::new();
        two.push_text("Disk", "second");
        let section = ReportSection::from_fact_sets("DISKS", &[one, two]);
        assert_eq!(section.body, "Disk: first\nDisk: second");
    }
}
