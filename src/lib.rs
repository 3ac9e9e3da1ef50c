/// Chat Notify - builder-style notifications for Slack and Microsoft Teams webhooks.
///
/// One [`MessageBuilder`] interface covers both providers: compose text, stats,
/// buttons and error reports, then `send` the message. Every message gets an
/// "App Info" block (host, environment, app version) unless asked not to.
///
/// # Delivery
///
/// - Slack posts go to the incoming webhook when one is set, otherwise to
///   `chat.postMessage` with a bot token
/// - Teams posts go to the webhook registered for the resolved channel
/// - Transport failures are logged and swallowed; only configuration and
///   content problems surface as [`NotifyError`]
/// - While the log condition holds (by default in the `test` environment)
///   payloads are logged instead of posted
///
/// # Example
///
/// ```no_run
/// use chat_notify::{MessageBuilder, NotifyConfig, Notifier, SendOptions, StatsOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), chat_notify::NotifyError> {
///     chat_notify::setup_logging();
///
///     let config = NotifyConfig::from_env()?;
///     let notifier = Notifier::from_config(&config);
///
///     notifier
///         .message()
///         .text("Deploy done")
///         .stats("Info", [("duration", 12)], StatsOptions::default())
///         .send(SendOptions::default())
///         .await
/// }
/// ```
pub mod builder;
pub mod clients;
pub mod core;
pub mod errors;
pub mod format;
pub mod notify;
pub mod slack;
pub mod teams;
pub mod utils;

pub use builder::{ErrorOptions, ErrorReport, MessageBuilder, SendOptions, StatValue, StatsOptions};
pub use core::app_info::AppInfo;
pub use core::config::{NotifyConfig, ProviderKind};
pub use errors::NotifyError;
pub use format::{FormatOptions, Markup};
pub use notify::{Message, Notifier};
pub use slack::Slack;
pub use teams::Teams;

/// Configure structured logging with JSON format.
///
/// The level comes from `RUST_LOG` and defaults to `info`. Calling it again
/// after a subscriber is installed is a no-op.
///
/// # Example
///
/// ```
/// chat_notify::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
