//! Weekly summaries aggregated from daily reports.
//!
//! The summary is built locally: each daily report in the ISO week is split
//! into sections, and the sections are merged into the weekly headings.

use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::report::ReportSections;
use crate::workspace::{ensure_dir, Workspace};

/// An ISO 8601 week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct IsoWeek {
    year: i32,
    week: u32,
}

impl IsoWeek {
    /// Validate a year/week pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDate`] if the week does not exist in that
    /// ISO year (week 53 only exists in some years).
    pub fn new(year: i32, week: u32) -> Result<Self> {
        NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
            .map(|_| Self { year, week })
            .ok_or_else(|| Error::InvalidDate(format!("{year}-W{week:02} is not an ISO week")))
    }

    /// The ISO week containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// ISO year.
    #[must_use]
    pub fn year(self) -> i32 {
        self.year
    }

    /// Week number, 1..=53.
    #[must_use]
    pub fn week(self) -> u32 {
        self.week
    }

    /// Monday and Sunday of the week.
    #[must_use]
    pub fn range(self) -> (NaiveDate, NaiveDate) {
        let monday = NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)
            .unwrap_or(NaiveDate::MIN);
        let sunday = NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Sun)
            .unwrap_or(NaiveDate::MIN);
        (monday, sunday)
    }
}

impl fmt::Display for IsoWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// One row of the weekly metrics table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricRow {
    /// Day the metric was reported.
    pub date: NaiveDate,
    /// Metric name.
    pub metric: String,
    /// Reported value.
    pub value: String,
}

/// A week's worth of daily reports, merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklySummary {
    /// The week summarized.
    pub week: IsoWeek,
    /// Number of daily reports read.
    pub reports: usize,
    /// From "What I Did Today".
    pub highlights: Vec<String>,
    /// From "Attempts & Fixes".
    pub progress: Vec<String>,
    /// From "Problems / Blockers" and "Root Cause".
    pub risks: Vec<String>,
    /// From "Key Learnings".
    pub learnings: Vec<String>,
    /// From "Next Steps (Tomorrow)".
    pub next_steps: Vec<String>,
    /// From "Metrics".
    pub metrics: Vec<MetricRow>,
}

impl WeeklySummary {
    /// Read and merge the daily reports of `week`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoReports`] when the week has no daily reports, or
    /// an I/O error if a report cannot be read.
    pub fn collect(workspace: &Workspace, week: IsoWeek) -> Result<Self> {
        let (monday, sunday) = week.range();
        let daily = workspace.daily_reports_between(monday, sunday)?;
        if daily.is_empty() {
            return Err(Error::NoReports {
                week: week.to_string(),
            });
        }

        let mut summary = Self {
            week,
            reports: daily.len(),
            highlights: Vec::new(),
            progress: Vec::new(),
            risks: Vec::new(),
            learnings: Vec::new(),
            next_steps: Vec::new(),
            metrics: Vec::new(),
        };

        for (date, path) in &daily {
            let text = std::fs::read_to_string(path)?;
            let sections = ReportSections::parse(&text);
            debug!(%date, sections = sections.headings().count(), "Merging daily report");

            push_items(&mut summary.highlights, sections.items("What I Did Today"));
            push_items(&mut summary.progress, sections.items("Attempts & Fixes"));
            push_items(&mut summary.risks, sections.items("Problems / Blockers"));
            push_items(&mut summary.risks, sections.items("Root Cause"));
            push_items(&mut summary.learnings, sections.items("Key Learnings"));
            push_items(&mut summary.next_steps, sections.items("Next Steps (Tomorrow)"));

            for item in sections.items("Metrics") {
                let Some(item) = clean_item(item) else {
                    continue;
                };
                let row = parse_metric(*date, item);
                if !summary.metrics.contains(&row) {
                    summary.metrics.push(row);
                }
            }
        }

        Ok(summary)
    }

    /// Render the summary as markdown.
    #[must_use]
    pub fn render(&self) -> String {
        let (monday, sunday) = self.week.range();
        let mut out = format!(
            "# Weekly Summary - {}\n\n_{} to {}_\n\nReports included: {}\n\n",
            self.week,
            monday.format("%Y-%m-%d"),
            sunday.format("%Y-%m-%d"),
            self.reports
        );

        for (heading, items) in [
            ("Highlights", &self.highlights),
            ("Progress", &self.progress),
            ("Risks", &self.risks),
            ("Learnings", &self.learnings),
            ("Next Steps", &self.next_steps),
        ] {
            out.push_str(&format!("## {heading}\n"));
            render_list(&mut out, items);
            out.push('\n');
        }

        out.push_str("## Metrics\n");
        if self.metrics.is_empty() {
            out.push_str("- N/A\n");
        } else {
            out.push_str("| Date | Metric | Value |\n|------|--------|-------|\n");
            for row in &self.metrics {
                out.push_str(&format!(
                    "| {} | {} | {} |\n",
                    row.date.format("%Y-%m-%d"),
                    escape_cell(&row.metric),
                    escape_cell(&row.value)
                ));
            }
        }
        out
    }
}

/// Collect, render and write the summary for `week`.
///
/// Returns the path written, which defaults to the workspace weekly path.
///
/// # Errors
///
/// See [`WeeklySummary::collect`]; also fails if the file cannot be written.
pub fn write_weekly_summary(
    workspace: &Workspace,
    week: IsoWeek,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    let summary = WeeklySummary::collect(workspace, week)?;
    let output =
        output.unwrap_or_else(|| workspace.weekly_summary_path(week.year(), week.week()));

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    std::fs::write(&output, summary.render())?;

    if summary.metrics.is_empty() {
        warn!("No metrics reported during {week}");
    }
    info!(
        "Wrote weekly summary {} from {} reports",
        output.display(),
        summary.reports
    );
    Ok(output)
}

/// Strip a task checkbox and drop `N/A` placeholders.
fn clean_item(item: &str) -> Option<&str> {
    let item = item.trim();
    let item = ["[ ]", "[x]", "[X]"]
        .iter()
        .find_map(|box_| item.strip_prefix(box_))
        .map_or(item, str::trim_start);
    (!item.is_empty() && !item.eq_ignore_ascii_case("N/A")).then_some(item)
}

fn push_items(target: &mut Vec<String>, items: &[String]) {
    for item in items.iter().filter_map(|i| clean_item(i)) {
        if !target.iter().any(|existing| existing == item) {
            target.push(item.to_string());
        }
    }
}

/// Split `name: value` or `name = value`; anything else is a bare metric.
fn parse_metric(date: NaiveDate, item: &str) -> MetricRow {
    let split = item
        .split_once(':')
        .or_else(|| item.split_once('='))
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, _)| !name.is_empty());

    let (metric, value) = split.unwrap_or((item, "-"));
    MetricRow {
        date,
        metric: metric.to_string(),
        value: if value.is_empty() { "-" } else { value }.to_string(),
    }
}

fn render_list(out: &mut String, items: &[String]) {
    if items.is_empty() {
        out.push_str("- N/A\n");
    }
    for item in items {
        out.push_str(&format!("- {item}\n"));
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn write_report(ws: &Workspace, date: &str, body: &str) {
        std::fs::create_dir_all(ws.daily_dir()).unwrap();
        std::fs::write(
            ws.daily_report_path(day(date)),
            format!("# Daily Report - {date}\n\n{body}"),
        )
        .unwrap();
    }

    #[test]
    fn test_iso_week_validation() {
        assert!(IsoWeek::new(2026, 1).is_ok());
        assert!(IsoWeek::new(2026, 0).is_err());
        assert!(IsoWeek::new(2026, 54).is_err());
        // 2020 has 53 ISO weeks, 2021 does not.
        assert!(IsoWeek::new(2020, 53).is_ok());
        assert!(IsoWeek::new(2021, 53).is_err());
    }

    #[test]
    fn test_iso_week_range_and_display() {
        let week = IsoWeek::new(2026, 8).unwrap();
        assert_eq!(week.range(), (day("2026-02-16"), day("2026-02-22")));
        assert_eq!(week.to_string(), "2026-W08");
    }

    #[test]
    fn test_iso_week_containing_year_boundary() {
        let week = IsoWeek::containing(day("2027-01-01"));
        assert_eq!((week.year(), week.week()), (2026, 53));
    }

    #[test]
    fn test_clean_item() {
        assert_eq!(clean_item("[ ] write docs"), Some("write docs"));
        assert_eq!(clean_item("[x] done"), Some("done"));
        assert_eq!(clean_item("[ ] N/A"), None);
        assert_eq!(clean_item("n/a"), None);
        assert_eq!(clean_item("   "), None);
    }

    #[test]
    fn test_parse_metric() {
        let d = day("2026-02-17");
        let row = parse_metric(d, "tests passed: 42");
        assert_eq!((row.metric.as_str(), row.value.as_str()), ("tests passed", "42"));

        let row = parse_metric(d, "latency = 3ms");
        assert_eq!((row.metric.as_str(), row.value.as_str()), ("latency", "3ms"));

        let row = parse_metric(d, "shipped release");
        assert_eq!((row.metric.as_str(), row.value.as_str()), ("shipped release", "-"));
    }

    #[test]
    fn test_collect_merges_sections() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        write_report(
            &ws,
            "2026-02-16",
            "## What I Did Today\n- fixed uart\n\n## Problems / Blockers\n- flaky CI\n\n\
             ## Root Cause\n- N/A\n\n## Metrics\n- build time: 4m\n\n\
             ## Next Steps (Tomorrow)\n- [ ] add retries\n",
        );
        write_report(
            &ws,
            "2026-02-18",
            "## What I Did Today\n- fixed uart\n- themed buttons\n\n## Key Learnings\n- read the datasheet\n\n\
             ## Attempts & Fixes\n- bumped timeout\n\n## Metrics\n- build time: 3m\n\n---\n\n### Raw Model Output\n- noise\n",
        );
        // Outside the week.
        write_report(&ws, "2026-02-23", "## What I Did Today\n- later\n");

        let summary = WeeklySummary::collect(&ws, IsoWeek::new(2026, 8).unwrap()).unwrap();
        assert_eq!(summary.reports, 2);
        assert_eq!(summary.highlights, vec!["fixed uart", "themed buttons"]);
        assert_eq!(summary.progress, vec!["bumped timeout"]);
        assert_eq!(summary.risks, vec!["flaky CI"]);
        assert_eq!(summary.learnings, vec!["read the datasheet"]);
        assert_eq!(summary.next_steps, vec!["add retries"]);
        assert_eq!(summary.metrics.len(), 2);
        assert_eq!(summary.metrics[1].date, day("2026-02-18"));
        assert_eq!(summary.metrics[1].value, "3m");
    }

    #[test]
    fn test_collect_empty_week() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        let err = WeeklySummary::collect(&ws, IsoWeek::new(2026, 8).unwrap()).unwrap_err();
        assert!(matches!(err, Error::NoReports { week } if week == "2026-W08"));
    }

    #[test]
    fn test_render() {
        let summary = WeeklySummary {
            week: IsoWeek::new(2026, 8).unwrap(),
            reports: 1,
            highlights: vec!["fixed uart".to_string()],
            progress: Vec::new(),
            risks: Vec::new(),
            learnings: Vec::new(),
            next_steps: Vec::new(),
            metrics: vec![MetricRow {
                date: day("2026-02-17"),
                metric: "a|b".to_string(),
                value: "1".to_string(),
            }],
        };

        let text = summary.render();
        assert!(text.starts_with("# Weekly Summary - 2026-W08\n\n_2026-02-16 to 2026-02-22_\n"));
        assert!(text.contains("Reports included: 1"));
        assert!(text.contains("## Highlights\n- fixed uart\n"));
        assert!(text.contains("## Progress\n- N/A\n"));
        assert!(text.contains("| Date | Metric | Value |"));
        assert!(text.contains("| 2026-02-17 | a\\|b | 1 |"));
    }

    #[test]
    fn test_render_without_metrics() {
        let summary = WeeklySummary {
            week: IsoWeek::new(2026, 8).unwrap(),
            reports: 1,
            highlights: Vec::new(),
            progress: Vec::new(),
            risks: Vec::new(),
            learnings: Vec::new(),
            next_steps: Vec::new(),
            metrics: Vec::new(),
        };
        assert!(summary.render().ends_with("## Metrics\n- N/A\n"));
    }

    #[test]
    fn test_write_weekly_summary_default_path() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        write_report(&ws, "2026-02-17", "## What I Did Today\n- x\n");

        let path = write_weekly_summary(&ws, IsoWeek::new(2026, 8).unwrap(), None).unwrap();
        assert_eq!(path, ws.weekly_summary_path(2026, 8));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("## Highlights\n- x\n"));
    }
}
