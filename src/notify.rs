//! Provider selection at runtime.
//!
//! [`Notifier::from_config`] builds the provider named by
//! [`NotifyConfig::provider`]; [`Message`] forwards the shared
//! [`MessageBuilder`] operations to the provider's own builder.

use async_trait::async_trait;

use crate::builder::{ErrorOptions, ErrorReport, MessageBuilder, SendOptions, StatValue, StatsOptions};
use crate::core::app_info::AppInfo;
use crate::core::config::{NotifyConfig, ProviderKind};
use crate::errors::NotifyError;
use crate::format::{FormatOptions, Markup};
use crate::slack::{Slack, SlackMarkup, SlackMessage};
use crate::teams::{Teams, TeamsMarkup, TeamsMessage};

pub enum Notifier {
    Slack(Slack),
    Teams(Teams),
}

impl Notifier {
    #[must_use]
    pub fn from_config(config: &NotifyConfig) -> Self {
        match config.provider {
            ProviderKind::Slack => Notifier::Slack(Slack::new(config)),
            ProviderKind::Teams => Notifier::Teams(Teams::new(config)),
        }
    }

    #[must_use]
    pub fn with_app_info(self, app: AppInfo) -> Self {
        match self {
            Notifier::Slack(slack) => Notifier::Slack(slack.with_app_info(app)),
            Notifier::Teams(teams) => Notifier::Teams(teams.with_app_info(app)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ProviderKind {
        match self {
            Notifier::Slack(_) => ProviderKind::Slack,
            Notifier::Teams(_) => ProviderKind::Teams,
        }
    }

    #[must_use]
    pub fn message(&self) -> Message<'_> {
        match self {
            Notifier::Slack(slack) => Message::Slack(slack.message()),
            Notifier::Teams(teams) => Message::Teams(teams.message()),
        }
    }

    /// [`Markup::format`] in this provider's dialect.
    #[must_use]
    pub fn format(&self, text: &str, options: Option<FormatOptions>) -> String {
        match self {
            Notifier::Slack(_) => SlackMarkup::format(text, options),
            Notifier::Teams(_) => TeamsMarkup::format(text, options),
        }
    }

    #[must_use]
    pub fn format_url(&self, url: &str, text: &str) -> String {
        match self {
            Notifier::Slack(_) => SlackMarkup::format_url(url, text),
            Notifier::Teams(_) => TeamsMarkup::format_url(url, text),
        }
    }
}

pub enum Message<'a> {
    Slack(SlackMessage<'a>),
    Teams(TeamsMessage<'a>),
}

macro_rules! forward {
    ($self:ident, $inner:ident => $call:expr) => {
        match $self {
            Message::Slack($inner) => Message::Slack($call),
            Message::Teams($inner) => Message::Teams($call),
        }
    };
}

#[async_trait]
impl<'a> MessageBuilder for Message<'a> {
    fn text(self, text: impl Into<String>) -> Self {
        forward!(self, m => m.text(text))
    }

    fn channel(self, channel: impl Into<String>) -> Self {
        forward!(self, m => m.channel(channel))
    }

    fn color(self, color: impl Into<String>) -> Self {
        forward!(self, m => m.color(color))
    }

    fn title(self, title: impl Into<String>) -> Self {
        forward!(self, m => m.title(title))
    }

    fn summary(self, summary: impl Into<String>) -> Self {
        forward!(self, m => m.summary(summary))
    }

    fn button(self, label: impl Into<String>, url: impl Into<String>, style: Option<&str>) -> Self {
        forward!(self, m => m.button(label, url, style))
    }

    fn icon(self, link_or_emoji: &str) -> Self {
        forward!(self, m => m.icon(link_or_emoji))
    }

    fn stats<I, K, V>(self, title: &str, entries: I, options: StatsOptions) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<StatValue>,
    {
        forward!(self, m => m.stats(title, entries, options))
    }

    fn error(self, error: impl Into<ErrorReport>, options: ErrorOptions) -> Self {
        forward!(self, m => m.error(error, options))
    }

    async fn send(self, options: SendOptions) -> Result<(), NotifyError> {
        match self {
            Message::Slack(m) => m.send(options).await,
            Message::Teams(m) => m.send(options).await,
        }
    }
}
