//! Daily report section layout.

use chrono::NaiveDate;

/// Headings every daily report must contain, in order.
pub const REQUIRED_SECTIONS: [&str; 7] = [
    "## What I Did Today",
    "## Problems / Blockers",
    "## Root Cause",
    "## Attempts & Fixes",
    "## Key Learnings",
    "## Metrics",
    "## Next Steps (Tomorrow)",
];

/// Return `text` unchanged if every required section is present; otherwise
/// wrap it in a placeholder report that keeps the raw output at the end.
#[must_use]
pub fn ensure_minimum_sections(text: &str, date: NaiveDate) -> String {
    if REQUIRED_SECTIONS.iter().all(|s| text.contains(s)) {
        return text.to_string();
    }

    let mut out = format!("# Daily Report - {}\n\n", date.format("%Y-%m-%d"));
    for section in REQUIRED_SECTIONS {
        let placeholder = if section == "## Next Steps (Tomorrow)" {
            "- [ ] N/A"
        } else {
            "- N/A"
        };
        out.push_str(&format!("{section}\n{placeholder}\n\n"));
    }
    out.push_str("---\n\n### Raw Model Output\n");
    out.push_str(text);
    out.push('\n');
    out
}

/// A markdown report split into `## ` sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSections {
    /// Text of the first `# ` heading, if any.
    pub title: Option<String>,
    sections: Vec<(String, Vec<String>)>,
}

impl ReportSections {
    /// Parse `markdown`, collecting the list items under each `## ` heading.
    ///
    /// Headings are stored without the `## ` marker. List items are `-`, `*`
    /// or `+` lines, stored without the marker. A `### ` heading ends the
    /// current section, so appended raw output is not attributed to it.
    #[must_use]
    pub fn parse(markdown: &str) -> Self {
        let mut title = None;
        let mut sections: Vec<(String, Vec<String>)> = Vec::new();
        let mut open = false;

        for line in markdown.lines() {
            let trimmed = line.trim();
            if let Some(heading) = trimmed.strip_prefix("## ") {
                sections.push((heading.trim().to_string(), Vec::new()));
                open = true;
            } else if trimmed.starts_with("### ") || trimmed == "---" {
                open = false;
            } else if let Some(heading) = trimmed.strip_prefix("# ") {
                if title.is_none() {
                    title = Some(heading.trim().to_string());
                }
            } else if open {
                let item = ["- ", "* ", "+ "]
                    .iter()
                    .find_map(|marker| trimmed.strip_prefix(marker));
                if let (Some(item), Some((_, items))) = (item, sections.last_mut()) {
                    let item = item.trim();
                    if !item.is_empty() {
                        items.push(item.to_string());
                    }
                }
            }
        }

        Self { title, sections }
    }

    /// Items under `heading` (given with or without `## `), or an empty slice.
    #[must_use]
    pub fn items(&self, heading: &str) -> &[String] {
        let heading = heading.strip_prefix("## ").unwrap_or(heading);
        self.sections
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(heading))
            .map(|(_, items)| items.as_slice())
            .unwrap_or_default()
    }

    /// Section headings in document order.
    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 17).unwrap()
    }

    fn complete_report() -> String {
        let mut text = String::from("# Daily Report - 2026-02-17\n\n");
        for section in REQUIRED_SECTIONS {
            text.push_str(&format!("{section}\n- x\n"));
        }
        text
    }

    #[test]
    fn test_complete_report_unchanged() {
        let text = complete_report();
        assert_eq!(ensure_minimum_sections(&text, date()), text);
    }

    #[test]
    fn test_fallback_wraps_raw_output() {
        let out = ensure_minimum_sections("hello", date());

        assert!(out.starts_with("# Daily Report - 2026-02-17\n"));
        assert!(out.contains("## What I Did Today\n- N/A"));
        assert!(out.contains("## Next Steps (Tomorrow)\n- [ ] N/A"));
        assert!(out.contains("### Raw Model Output\nhello"));
    }

    #[test]
    fn test_fallback_when_one_section_missing() {
        let text = complete_report().replace("## Root Cause", "## Cause");
        let out = ensure_minimum_sections(&text, date());
        assert!(out.contains("Raw Model Output"));
    }

    #[test]
    fn test_parse_sections() {
        let parsed = ReportSections::parse(
            "# Daily Report - 2026-02-17\n\n## What I Did Today\n- fixed UART\n* wrote docs\n\nprose line\n## Metrics\n- latency: 3ms\n",
        );

        assert_eq!(parsed.title.as_deref(), Some("Daily Report - 2026-02-17"));
        assert_eq!(parsed.items("## What I Did Today"), ["fixed UART", "wrote docs"]);
        assert_eq!(parsed.items("metrics"), ["latency: 3ms"]);
        assert!(parsed.items("Root Cause").is_empty());
        assert_eq!(
            parsed.headings().collect::<Vec<_>>(),
            vec!["What I Did Today", "Metrics"]
        );
    }

    #[test]
    fn test_parse_ignores_raw_output_block() {
        let wrapped = ensure_minimum_sections("- stray bullet", date());
        let parsed = ReportSections::parse(&wrapped);
        assert_eq!(parsed.items("Next Steps (Tomorrow)"), ["[ ] N/A"]);
        assert!(parsed.headings().all(|h| h != "Raw Model Output"));
    }
}
