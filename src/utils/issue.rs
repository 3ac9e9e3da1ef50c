//! Links that open a pre-filled "new issue" form on the bug tracker.

use chrono::{DateTime, Local};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped by JavaScript's `encodeURIComponent`, which is what
/// GitHub/GitLab issue forms expect in query values.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[must_use]
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

pub struct IssueDraft<'a> {
    /// Shown in brackets before the title, usually the error type.
    pub label: &'a str,
    pub title: &'a str,
    pub version: &'a str,
    pub stack: &'a str,
}

impl IssueDraft<'_> {
    /// `<bugs_url>/new?title=..&body=..&labels=bug`
    #[must_use]
    pub fn url(&self, bugs_url: &str, now: DateTime<Local>) -> String {
        let title = format!("[{}] {}", self.label, self.title);
        let body = format!(
            "Error encountered on {}\nApp version: v{}\n\nFull Stack: {}",
            now.format("%Y-%m-%d %H:%M:%S %:z"),
            self.version,
            self.stack
        );
        format!(
            "{}/new?title={}&body={}&labels=bug",
            bugs_url.trim_end_matches('/'),
            encode_component(&title),
            encode_component(&body)
        )
    }
}
