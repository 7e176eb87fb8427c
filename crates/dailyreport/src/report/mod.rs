//! Daily report prompting and post-processing.
//!
//! - [`prompt`]: the system prompt and the user message wrapping raw notes.
//! - [`sections`]: the required section layout, its fallback skeleton and a
//!   small section parser used by the weekly summary.
//! - [`think`]: removal of reasoning output from model answers.

pub mod prompt;
pub mod sections;
pub mod think;

pub use prompt::{build_user_prompt, DEFAULT_SYSTEM_PROMPT};
pub use sections::{ensure_minimum_sections, ReportSections, REQUIRED_SECTIONS};
pub use think::{ThinkFilter, ThinkPattern};
