//! Slack provider: `mrkdwn` markup, legacy attachments and webhook/token delivery.

pub mod message;
pub mod notifier;
pub mod types;

pub use message::SlackMessage;
pub use notifier::{DEFAULT_CHANNEL, DEFAULT_USERNAME, Slack, SlackMarkup, SlackPostOptions};
pub use types::{Action, Attachment, Field};
