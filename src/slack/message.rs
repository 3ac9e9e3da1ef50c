use async_trait::async_trait;
use chrono::Local;
use serde_json::{Map, Value, json};

use super::notifier::{Slack, SlackMarkup, SlackPostOptions};
use super::types::{Action, Actions, Attachment, Attachments, Field};
use crate::builder::{
    ErrorOptions, ErrorReport, MessageBuilder, SendOptions, StatValue, StatsOptions, stat_entries,
};
use crate::errors::NotifyError;
use crate::format::Markup;
use crate::utils::issue::IssueDraft;

const STATS_COLOR: &str = "#439FE0";

/// A Slack message under construction. Created with [`Slack::message`].
pub struct SlackMessage<'a> {
    slack: &'a Slack,
    text: Option<String>,
    channel: Option<String>,
    attachments: Vec<Attachment>,
    actions: Vec<Action>,
    extra_props: Map<String, Value>,
}

impl<'a> SlackMessage<'a> {
    pub(crate) fn new(slack: &'a Slack) -> Self {
        Self {
            slack,
            text: None,
            channel: None,
            attachments: Vec::new(),
            actions: Vec::new(),
            extra_props: Map::new(),
        }
    }

    #[must_use]
    pub fn attachment(mut self, attachments: impl Into<Attachments>) -> Self {
        self.attachments.extend(attachments.into().0);
        self
    }

    #[must_use]
    pub fn action(mut self, actions: impl Into<Actions>) -> Self {
        self.actions.extend(actions.into().0);
        self
    }

    /// Posts under `name` instead of the configured username.
    #[must_use]
    pub fn username(mut self, name: impl Into<String>) -> Self {
        self.extra_props.insert("username".into(), json!(name.into()));
        self
    }

    /// Like [`MessageBuilder::stats`], with `overrides` laid over the
    /// generated attachment (for example a custom `color` or `footer`).
    #[must_use]
    pub fn stats_with<I, K, V>(
        self,
        title: &str,
        entries: I,
        options: StatsOptions,
        overrides: Attachment,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<StatValue>,
    {
        let fields = stat_entries(entries, options)
            .into_iter()
            .map(|entry| Field {
                title: entry.title,
                value: entry.value,
                short: entry.short,
            })
            .collect();

        let attachment = Attachment {
            color: Some(STATS_COLOR.to_string()),
            fallback: Some(title.to_string()),
            fields,
            ..Attachment::titled(title)
        };
        self.attachment(attachment.merged(overrides))
    }

    /// Splits the builder into the text and transport options `send` would use.
    #[must_use]
    pub fn into_post(mut self, options: SendOptions) -> (Option<String>, SlackPostOptions) {
        if !self.actions.is_empty() {
            self.attachments.push(Attachment {
                title: Some(String::new()),
                actions: std::mem::take(&mut self.actions),
                ..Attachment::default()
            });
        }

        let mut extra_props = self.extra_props;
        extra_props.extend(options.extra_props);

        (
            self.text,
            SlackPostOptions {
                channel: self.channel,
                attachments: self.attachments,
                extra_props,
                default_attachment: options.default_attachment,
            },
        )
    }
}

#[async_trait]
impl<'a> MessageBuilder for SlackMessage<'a> {
    fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Attachments carry their own colors; the message has none.
    fn color(self, _color: impl Into<String>) -> Self {
        self
    }

    /// Slack messages have no title.
    fn title(self, _title: impl Into<String>) -> Self {
        self
    }

    /// Sets the notification fallback text of the first attachment, if any.
    fn summary(mut self, summary: impl Into<String>) -> Self {
        if let Some(first) = self.attachments.first_mut() {
            first.fallback = Some(summary.into());
        }
        self
    }

    fn button(
        mut self,
        label: impl Into<String>,
        url: impl Into<String>,
        style: Option<&str>,
    ) -> Self {
        self.actions.push(Action::button(label, url, style));
        self
    }

    fn icon(mut self, link_or_emoji: &str) -> Self {
        let key = if link_or_emoji.starts_with(':') {
            "icon_emoji"
        } else {
            "icon_url"
        };
        self.extra_props.insert(key.into(), json!(link_or_emoji));
        self
    }

    fn stats<I, K, V>(self, title: &str, entries: I, options: StatsOptions) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<StatValue>,
    {
        self.stats_with(title, entries, options, Attachment::default())
    }

    fn error(self, error: impl Into<ErrorReport>, options: ErrorOptions) -> Self {
        let report = error.into();
        let slack = self.slack;
        let pretext = SlackMarkup::escape_text(&format!(
            "{}: {}",
            SlackMarkup::format("Error", None),
            report.message
        ));

        let mut attachment = Attachment {
            fallback: Some(pretext.clone()),
            pretext: Some(pretext),
            text: Some(SlackMarkup::escape_text(&report.stack)),
            color: Some("danger".to_string()),
            ..Attachment::default()
        };

        let app = slack.runtime().app_info();
        if let Some(bugs_url) = &app.bugs_url {
            let draft = IssueDraft {
                label: options.label_for(&report),
                title: options.title_for(&report),
                version: &app.version,
                stack: &report.stack,
            };
            attachment.actions.push(Action::button(
                "Create an issue for this error?",
                draft.url(bugs_url, Local::now()),
                Some("danger"),
            ));
        }

        self.attachment(attachment)
    }

    async fn send(self, options: SendOptions) -> Result<(), NotifyError> {
        let slack = self.slack;
        let (text, post) = self.into_post(options);
        slack.post_message(text.as_deref(), post).await
    }
}
