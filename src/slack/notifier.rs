use std::sync::Arc;

use chrono::Utc;
use secrecy::ExposeSecret;
use serde_json::{Map, Value, json};
use tracing::warn;

use super::message::SlackMessage;
use super::types::{Attachment, Field};
use crate::core::app_info::AppInfo;
use crate::core::config::{NotifyConfig, SlackConfig};
use crate::core::context::Runtime;
use crate::errors::NotifyError;
use crate::format::{Delimiters, Markup};

pub const DEFAULT_CHANNEL: &str = "#general";
pub const DEFAULT_USERNAME: &str = "slackbot";
const LABEL: &str = "Slack";

/// Slack `mrkdwn` dialect.
pub struct SlackMarkup;

impl Markup for SlackMarkup {
    const DELIMITERS: Delimiters = Delimiters {
        code: "`",
        bold: "*",
        italics: "_",
        strikethrough: "~",
    };

    fn format_url(url: &str, text: &str) -> String {
        format!("<{url}|{text}>")
    }
}

impl SlackMarkup {
    /// Escapes the three characters Slack treats as control sequences.
    #[must_use]
    pub fn escape_text(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }
}

/// Everything [`Slack::post_message`] needs besides the text.
#[derive(Debug, Clone)]
pub struct SlackPostOptions {
    /// Overrides the configured channel.
    pub channel: Option<String>,
    pub attachments: Vec<Attachment>,
    /// Merged over the generated payload; wins on key collision.
    pub extra_props: Map<String, Value>,
    pub default_attachment: bool,
}

impl Default for SlackPostOptions {
    fn default() -> Self {
        Self {
            channel: None,
            attachments: Vec::new(),
            extra_props: Map::new(),
            default_attachment: true,
        }
    }
}

/// Posts messages to Slack through an incoming webhook, or through
/// `chat.postMessage` with a bot token when no webhook is configured.
pub struct Slack {
    config: SlackConfig,
    runtime: Runtime,
}

impl Slack {
    #[must_use]
    pub fn new(config: &NotifyConfig) -> Self {
        Self {
            config: config.slack.clone(),
            runtime: Runtime::new(config),
        }
    }

    #[must_use]
    pub fn with_app_info(mut self, app: AppInfo) -> Self {
        self.runtime.set_app_info(app);
        self
    }

    /// Replaces the predicate that decides whether messages are only logged.
    #[must_use]
    pub fn with_log_condition(mut self, condition: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.runtime.set_log_condition(Arc::new(condition));
        self
    }

    pub fn set_webhook(&mut self, webhook_url: impl Into<String>) {
        self.config.set_webhook(webhook_url);
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.config.set_token(token);
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.config.username = Some(username.into());
    }

    #[must_use]
    pub fn username(&self) -> &str {
        self.config.username.as_deref().unwrap_or(DEFAULT_USERNAME)
    }

    #[must_use]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    #[must_use]
    pub fn message(&self) -> SlackMessage<'_> {
        SlackMessage::new(self)
    }

    /// The "App Info" attachment describing where the message came from.
    #[must_use]
    pub fn default_attachment(&self) -> Attachment {
        let context = self.runtime.context();
        Attachment {
            title: Some("App Info:".to_string()),
            fields: vec![
                Field {
                    title: "Hostname".to_string(),
                    value: context.hostname.clone(),
                    short: true,
                },
                Field {
                    title: "Environment".to_string(),
                    value: context.environment.clone(),
                    short: true,
                },
            ],
            footer: Some(context.footer()),
            ts: Some(Utc::now().timestamp()),
            ..Attachment::default()
        }
    }

    /// Builds the JSON body for `text` without sending it.
    ///
    /// # Errors
    ///
    /// Returns an error if an attachment cannot be serialized.
    pub fn build_payload(
        &self,
        text: Option<&str>,
        options: &SlackPostOptions,
    ) -> Result<Value, NotifyError> {
        let mut attachments = options.attachments.clone();
        if options.default_attachment {
            attachments.push(self.default_attachment());
        }

        let channel = options
            .channel
            .as_deref()
            .or(self.config.channel.as_deref())
            .unwrap_or(DEFAULT_CHANNEL);

        let mut payload = Map::new();
        if let Some(text) = text {
            payload.insert("text".into(), json!(text));
        }
        payload.insert("channel".into(), json!(channel));
        payload.insert("username".into(), json!(self.username()));
        payload.insert("attachments".into(), serde_json::to_value(attachments)?);
        for (key, value) in &options.extra_props {
            payload.insert(key.clone(), value.clone());
        }
        Ok(Value::Object(payload))
    }

    /// Sends `text` with `options`. Delivery problems are logged; the result
    /// is always `Ok` unless the payload cannot be built.
    ///
    /// # Errors
    ///
    /// Returns an error if an attachment cannot be serialized.
    pub async fn post_message(
        &self,
        text: Option<&str>,
        options: SlackPostOptions,
    ) -> Result<(), NotifyError> {
        let payload = self.build_payload(text, &options)?;

        if self.runtime.suppress(LABEL, &payload) {
            return Ok(());
        }

        if let Some(webhook) = &self.config.webhook {
            self.runtime.client.post_json(LABEL, webhook, &payload).await;
            return Ok(());
        }

        let Some(token) = &self.config.token else {
            warn!(payload = %payload, "No Slack webhook or token configured, dropping message");
            return Ok(());
        };

        let mut fields = form_fields(&payload);
        fields.push(("token".to_string(), token.expose_secret().clone()));
        self.runtime
            .client
            .post_form(LABEL, &self.config.api_url, &fields, &payload)
            .await;
        Ok(())
    }
}

/// Web API form encoding: strings as-is, everything else as JSON text.
fn form_fields(payload: &Value) -> Vec<(String, String)> {
    let Some(object) = payload.as_object() else {
        return Vec::new();
    };
    object
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}
