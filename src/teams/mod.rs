//! Microsoft Teams provider: markdown markup, `MessageCard` sections and
//! per-channel incoming webhooks.

pub mod message;
pub mod notifier;
pub mod types;

pub use message::TeamsMessage;
pub use notifier::{DEFAULT_CHANNEL, DEFAULT_THEME_COLOR, Teams, TeamsMarkup, TeamsPostOptions};
pub use types::{Action, Fact, Image, MessageCard, Section, Target};
