//! Slack legacy message attachments.
//!
//! See <https://api.slack.com/reference/messaging/attachments>.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    /// `good`, `warning`, `danger` or a hex color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_icon: Option<String>,
    /// Unix timestamp in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mrkdwn_in: Vec<String>,
}

impl Attachment {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Overlays every field set in `overrides` (`Some` or non-empty) onto `self`.
    #[must_use]
    pub fn merged(self, overrides: Attachment) -> Self {
        fn list<T>(base: Vec<T>, over: Vec<T>) -> Vec<T> {
            if over.is_empty() { base } else { over }
        }

        Self {
            fallback: overrides.fallback.or(self.fallback),
            color: overrides.color.or(self.color),
            pretext: overrides.pretext.or(self.pretext),
            author_name: overrides.author_name.or(self.author_name),
            author_link: overrides.author_link.or(self.author_link),
            author_icon: overrides.author_icon.or(self.author_icon),
            title: overrides.title.or(self.title),
            title_link: overrides.title_link.or(self.title_link),
            text: overrides.text.or(self.text),
            fields: list(self.fields, overrides.fields),
            image_url: overrides.image_url.or(self.image_url),
            thumb_url: overrides.thumb_url.or(self.thumb_url),
            footer: overrides.footer.or(self.footer),
            footer_icon: overrides.footer_icon.or(self.footer_icon),
            ts: overrides.ts.or(self.ts),
            actions: list(self.actions, overrides.actions),
            callback_id: overrides.callback_id.or(self.callback_id),
            mrkdwn_in: list(self.mrkdwn_in, overrides.mrkdwn_in),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    #[serde(default)]
    pub short: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// `primary` or `danger`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Action {
    pub fn button(text: impl Into<String>, url: impl Into<String>, style: Option<&str>) -> Self {
        Self {
            kind: "button".to_string(),
            text: text.into(),
            url: Some(url.into()),
            style: style.filter(|s| !s.is_empty()).map(str::to_string),
            name: None,
            value: None,
        }
    }
}

/// One attachment or several, for [`super::SlackMessage::attachment`].
pub struct Attachments(pub Vec<Attachment>);

impl From<Attachment> for Attachments {
    fn from(attachment: Attachment) -> Self {
        Self(vec![attachment])
    }
}

impl From<Vec<Attachment>> for Attachments {
    fn from(attachments: Vec<Attachment>) -> Self {
        Self(attachments)
    }
}

/// One action or several, for [`super::SlackMessage::action`].
pub struct Actions(pub Vec<Action>);

impl From<Action> for Actions {
    fn from(action: Action) -> Self {
        Self(vec![action])
    }
}

impl From<Vec<Action>> for Actions {
    fn from(actions: Vec<Action>) -> Self {
        Self(actions)
    }
}
