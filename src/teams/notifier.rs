use std::sync::Arc;

use chrono::Local;
use serde_json::{Map, Value};

use super::message::TeamsMessage;
use super::types::{Fact, MessageCard, Section};
use crate::core::app_info::AppInfo;
use crate::core::config::{NotifyConfig, TeamsConfig};
use crate::core::context::Runtime;
use crate::errors::NotifyError;
use crate::format::{Delimiters, Markup};

pub const DEFAULT_CHANNEL: &str = "default";
pub const DEFAULT_THEME_COLOR: &str = "439FE0";
const LABEL: &str = "Teams";

/// Teams markdown dialect.
pub struct TeamsMarkup;

impl Markup for TeamsMarkup {
    const DELIMITERS: Delimiters = Delimiters {
        code: "`",
        bold: "**",
        italics: "*",
        strikethrough: "~~",
    };

    fn format_url(url: &str, text: &str) -> String {
        format!("[{text}]({url})")
    }
}

impl TeamsMarkup {
    /// Keeps line breaks and indentation of preformatted text such as stack
    /// traces, which Teams markdown would otherwise collapse.
    #[must_use]
    pub fn escape_text(text: &str) -> String {
        text.replace('\n', "\n\n").replace(' ', "&nbsp;")
    }
}

#[derive(Debug, Clone)]
pub struct TeamsPostOptions {
    /// `<channel>[.<webhookName>]`; overrides the default channel.
    pub channel: Option<String>,
    /// Merged over the card; wins on key collision.
    pub extra_props: Map<String, Value>,
    pub default_section: bool,
}

impl Default for TeamsPostOptions {
    fn default() -> Self {
        Self {
            channel: None,
            extra_props: Map::new(),
            default_section: true,
        }
    }
}

/// Posts `MessageCard`s to Teams incoming webhooks registered per channel.
pub struct Teams {
    config: TeamsConfig,
    runtime: Runtime,
}

impl Teams {
    #[must_use]
    pub fn new(config: &NotifyConfig) -> Self {
        Self {
            config: config.teams.clone(),
            runtime: Runtime::new(config),
        }
    }

    #[must_use]
    pub fn with_app_info(mut self, app: AppInfo) -> Self {
        self.runtime.set_app_info(app);
        self
    }

    #[must_use]
    pub fn with_log_condition(mut self, condition: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.runtime.set_log_condition(Arc::new(condition));
        self
    }

    /// Registers `webhook_url` for `channel`, or for the default channel.
    pub fn set_webhook(&mut self, webhook_url: impl Into<String>, channel: Option<&str>) {
        self.config.set_webhook(webhook_url, channel);
    }

    pub fn set_default_channel(&mut self, channel: impl Into<String>) {
        self.config.default_channel = Some(channel.into());
    }

    #[must_use]
    pub fn default_channel(&self) -> &str {
        self.config.default_channel()
    }

    #[must_use]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    #[must_use]
    pub fn message(&self) -> TeamsMessage<'_> {
        TeamsMessage::new(self)
    }

    /// The "App Info" section describing where the message came from.
    #[must_use]
    pub fn default_section(&self) -> Section {
        let context = self.runtime.context();
        Section {
            activity_title: Some("App Info:".to_string()),
            activity_subtitle: Some(format!(
                "{} | {}",
                context.footer(),
                Local::now().format("%Y-%m-%d %H:%M:%S")
            )),
            facts: vec![
                Fact {
                    name: "Hostname".to_string(),
                    value: context.hostname.clone(),
                },
                Fact {
                    name: "Environment".to_string(),
                    value: context.environment.clone(),
                },
            ],
            ..Section::default()
        }
    }

    /// Builds the JSON body for `card` without sending it. The card itself is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the card cannot be serialized.
    pub fn build_payload(
        &self,
        card: &MessageCard,
        options: &TeamsPostOptions,
    ) -> Result<Value, NotifyError> {
        let mut card = card.clone();
        if options.default_section {
            card.sections.push(self.default_section());
        }

        let mut payload = serde_json::to_value(card)?;
        if let Some(object) = payload.as_object_mut() {
            for (key, value) in &options.extra_props {
                object.insert(key.clone(), value.clone());
            }
        }
        Ok(payload)
    }

    /// # Errors
    ///
    /// Returns [`NotifyError::NoWebhook`] when no webhook is registered for the
    /// resolved channel. Delivery problems are logged, not returned.
    pub async fn post_message(
        &self,
        card: &MessageCard,
        options: TeamsPostOptions,
    ) -> Result<(), NotifyError> {
        let payload = self.build_payload(card, &options)?;

        if self.runtime.suppress(LABEL, &payload) {
            return Ok(());
        }

        let channel = options
            .channel
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.default_channel());
        let webhook = self
            .config
            .webhook_url(channel)
            .ok_or_else(|| NotifyError::NoWebhook(channel.to_string()))?;

        self.runtime.client.post_json(LABEL, webhook, &payload).await;
        Ok(())
    }
}
