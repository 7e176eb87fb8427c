//! Prompt construction for daily report generation.

use chrono::NaiveDate;

use crate::note::SourceType;

/// Instructions sent as the system message unless overridden in config.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a rigorous technical writing assistant.
Turn rough notes into ONE structured daily report in Markdown.

Output requirements:
1) Use this exact section order:
   - ## What I Did Today
   - ## Problems / Blockers
   - ## Root Cause
   - ## Attempts & Fixes
   - ## Key Learnings
   - ## Metrics
   - ## Next Steps (Tomorrow)
2) Keep it concise and factual.
3) If information is missing, write \"N/A\" for that bullet.
4) Keep language in the same language as input notes when possible.
5) Return only final answer. Do not include reasoning or thinking process.
";

/// Build the user message wrapping the raw notes.
#[must_use]
pub fn build_user_prompt(
    raw_notes: &str,
    source_type: SourceType,
    source_id: &str,
    date: NaiveDate,
) -> String {
    let date = date.format("%Y-%m-%d");
    format!(
        "Date: {date}
Source: {source_type}:{source_id}

Raw notes:
{raw_notes}

Please generate a structured daily report in Markdown.
Add a title line at top: '# Daily Report - {date}'.
Use the required section order exactly.
Use bullet lists in each section.
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::REQUIRED_SECTIONS;

    #[test]
    fn test_build_user_prompt() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 17).unwrap();
        let prompt = build_user_prompt("raw", SourceType::Issue, "12", date);

        assert!(prompt.starts_with("Date: 2026-02-17\n"));
        assert!(prompt.contains("Source: issue:12"));
        assert!(prompt.contains("Raw notes:\nraw\n"));
        assert!(prompt.contains("'# Daily Report - 2026-02-17'"));
    }

    #[test]
    fn test_system_prompt_lists_every_section() {
        for section in REQUIRED_SECTIONS {
            assert!(DEFAULT_SYSTEM_PROMPT.contains(section), "{section}");
        }
    }
}
