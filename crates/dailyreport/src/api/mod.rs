//! Client for OpenAI-compatible (or templated custom) completion APIs.
//!
//! The request side is driven by configuration: either the default chat
//! payload or a JSON template with `{{model}}`, `{{system_prompt}}` and
//! `{{user_prompt}}` placeholders. The response side tries a list of dotted
//! paths until one resolves, flattens the value to text and strips any
//! reasoning output.

mod client;
mod normalize;
mod path;
mod payload;

pub use client::{ApiRequest, ClientSettings, CompletionClient, HttpTransport, Transport};
pub use normalize::normalize_to_text;
pub use path::{candidate_paths, extract_by_path, extract_first_available, FALLBACK_PATHS};
pub use payload::{build_default_payload, replace_placeholders, Sampling};

#[cfg(test)]
pub(crate) use client::tests::{settings as test_settings, FakeTransport};
