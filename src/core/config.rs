use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::str::FromStr;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use crate::errors::NotifyError;

pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const SLACK_API_URL: &str = "https://slack.com/api/chat.postMessage";
/// Webhook name used when a Teams channel is given without `.<webhook>`.
pub const DEFAULT_WEBHOOK_NAME: &str = "default";

/// Which chat provider the [`crate::Notifier`] factory should build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Slack,
    #[serde(alias = "msteams")]
    Teams,
}

impl FromStr for ProviderKind {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "slack" => Ok(Self::Slack),
            "teams" | "msteams" => Ok(Self::Teams),
            other => Err(NotifyError::Config(format!("unknown provider: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub provider: ProviderKind,
    /// Deployment environment name, shown in the runtime context.
    /// Messages are logged instead of sent while this is `test`.
    pub environment: String,
    pub timeout_secs: u64,
    pub slack: SlackConfig,
    pub teams: TeamsConfig,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            slack: SlackConfig::default(),
            teams: TeamsConfig::default(),
        }
    }
}

impl NotifyConfig {
    /// # Errors
    ///
    /// Returns an error if a variable holds an unparsable value or a webhook URL is invalid.
    pub fn from_env() -> Result<Self, NotifyError> {
        let mut config = Self::default();

        if let Ok(provider) = env::var("NOTIFY_PROVIDER") {
            config.provider = provider.parse()?;
        }
        if let Ok(environment) = env::var("APP_ENV") {
            config.environment = environment;
        }
        if let Ok(timeout) = env::var("NOTIFY_TIMEOUT_SECS") {
            config.timeout_secs = timeout
                .parse()
                .map_err(|e| NotifyError::Config(format!("NOTIFY_TIMEOUT_SECS: {e}")))?;
        }

        config.slack.webhook = env::var("SLACK_WEBHOOK_URL").ok();
        config.slack.token = env::var("SLACK_TOKEN").ok().map(SecretString::new);
        config.slack.channel = env::var("SLACK_CHANNEL").ok();
        config.slack.username = env::var("SLACK_USERNAME").ok();
        if let Ok(api_url) = env::var("SLACK_API_URL") {
            config.slack.api_url = api_url;
        }

        config.teams.default_channel = env::var("TEAMS_CHANNEL").ok();
        if let Ok(webhook) = env::var("TEAMS_WEBHOOK_URL") {
            config.teams.set_webhook(webhook, None);
        }

        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML for this shape or a webhook URL is invalid.
    pub fn from_toml_str(document: &str) -> Result<Self, NotifyError> {
        let config: Self = toml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NotifyError> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path)
            .map_err(|e| NotifyError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&document)
    }

    /// Checks that every configured webhook and API endpoint is an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Config`] naming the first invalid entry.
    pub fn validate(&self) -> Result<(), NotifyError> {
        if let Some(webhook) = &self.slack.webhook {
            check_url("slack.webhook", webhook)?;
        }
        check_url("slack.api_url", &self.slack.api_url)?;

        for (channel, hooks) in &self.teams.channels {
            for (name, webhook) in hooks {
                check_url(&format!("teams.{channel}.{name}"), webhook)?;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn is_test(&self) -> bool {
        self.environment.eq_ignore_ascii_case("test")
    }
}

fn check_url(key: &str, value: &str) -> Result<(), NotifyError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| NotifyError::Config(format!("{key}: {e}")))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Incoming webhook URL. Takes priority over `token`.
    pub webhook: Option<String>,
    /// Legacy bot token used against `api_url` when no webhook is set.
    pub token: Option<SecretString>,
    pub channel: Option<String>,
    pub username: Option<String>,
    pub api_url: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            webhook: None,
            token: None,
            channel: None,
            username: None,
            api_url: SLACK_API_URL.to_string(),
        }
    }
}

impl SlackConfig {
    pub fn set_webhook(&mut self, webhook_url: impl Into<String>) {
        self.webhook = Some(webhook_url.into());
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(SecretString::new(token.into()));
    }
}

/// Teams webhooks keyed by channel, then by webhook name.
///
/// ```toml
/// [teams]
/// default_channel = "alerts"
///
/// [teams.channels.alerts]
/// default = "https://example.webhook.office.com/webhookb2/..."
/// oncall = "https://example.webhook.office.com/webhookb2/..."
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TeamsConfig {
    pub default_channel: Option<String>,
    pub channels: HashMap<String, HashMap<String, String>>,
}

impl TeamsConfig {
    /// Registers a webhook for `channel` (`<channel>[.<webhookName>]`),
    /// or for the configured default channel when `channel` is `None`.
    pub fn set_webhook(&mut self, webhook_url: impl Into<String>, channel: Option<&str>) {
        let channel = channel
            .map(str::to_string)
            .unwrap_or_else(|| self.default_channel().to_string());
        let (name, hook) = split_channel(&channel);
        self.channels
            .entry(name.to_string())
            .or_default()
            .insert(hook.to_string(), webhook_url.into());
    }

    #[must_use]
    pub fn default_channel(&self) -> &str {
        self.default_channel
            .as_deref()
            .unwrap_or(crate::teams::DEFAULT_CHANNEL)
    }

    #[must_use]
    pub fn webhook_url(&self, channel: &str) -> Option<&str> {
        if channel.is_empty() {
            return None;
        }
        let (name, hook) = split_channel(channel);
        self.channels
            .get(name)
            .and_then(|hooks| hooks.get(hook))
            .map(String::as_str)
    }
}

fn split_channel(channel: &str) -> (&str, &str) {
    channel
        .split_once('.')
        .unwrap_or((channel, DEFAULT_WEBHOOK_NAME))
}
