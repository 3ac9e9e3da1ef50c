//! Send one notification from the command line.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde_json::Value;
use tracing::info;

use chat_notify::{
    AppInfo, MessageBuilder, Notifier, NotifyConfig, ProviderKind, SendOptions, StatValue,
    StatsOptions,
};

/// Post a message to the configured Slack or Teams webhook
#[derive(Parser, Debug)]
#[command(name = "notify", version)]
#[command(long_about = "
Post a message to the configured Slack or Teams webhook.

Configuration comes from --config (TOML) or from the environment
(NOTIFY_PROVIDER, SLACK_WEBHOOK_URL, SLACK_TOKEN, TEAMS_WEBHOOK_URL, ...).

EXAMPLES:
    notify --text 'Deploy done' --stat duration=12 --stat ok=true
    notify --provider teams --summary 'Nightly' --button 'Logs=https://logs.example.com'
")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the configured provider (slack, teams)
    #[arg(short, long)]
    provider: Option<ProviderKind>,

    /// Target channel; for Teams `<channel>[.<webhookName>]`
    #[arg(long)]
    channel: Option<String>,

    #[arg(short, long)]
    text: Option<String>,

    #[arg(long)]
    summary: Option<String>,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    color: Option<String>,

    /// `key=value`; the value is read as JSON when it parses
    #[arg(long = "stat", value_name = "KEY=VALUE", value_parser = parse_stat)]
    stats: Vec<(String, StatValue)>,

    /// `label=url`
    #[arg(long = "button", value_name = "LABEL=URL", value_parser = parse_pair)]
    buttons: Vec<(String, String)>,

    /// Skip the "App Info" block
    #[arg(long)]
    no_context: bool,
}

fn parse_pair(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got {raw:?}"))?;
    Ok((key.trim().to_string(), value.to_string()))
}

fn parse_stat(raw: &str) -> Result<(String, StatValue)> {
    let (key, value) = parse_pair(raw)?;
    let value = serde_json::from_str::<Value>(&value).unwrap_or(Value::String(value));
    Ok((key, StatValue::from(value)))
}

#[tokio::main]
async fn main() -> Result<()> {
    chat_notify::setup_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => NotifyConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => NotifyConfig::from_env().context("reading configuration from environment")?,
    };
    if let Some(provider) = cli.provider {
        config.provider = provider;
    }

    let notifier = Notifier::from_config(&config).with_app_info(AppInfo::detect());
    info!(provider = ?notifier.kind(), "Sending notification");

    let mut message = notifier.message();
    if let Some(channel) = cli.channel {
        message = message.channel(channel);
    }
    if let Some(text) = cli.text {
        message = message.text(text);
    }
    if let Some(title) = cli.title {
        message = message.title(title);
    }
    if let Some(color) = cli.color {
        message = message.color(color);
    }
    if !cli.stats.is_empty() {
        message = message.stats("Stats:", cli.stats, StatsOptions::default());
    }
    for (label, url) in cli.buttons {
        message = message.button(label, url, None);
    }
    // Slack applies the summary to the first attachment, so set it last.
    if let Some(summary) = cli.summary {
        message = message.summary(summary);
    }

    let options = if cli.no_context {
        SendOptions::without_context()
    } else {
        SendOptions::default()
    };
    message.send(options).await?;
    Ok(())
}
