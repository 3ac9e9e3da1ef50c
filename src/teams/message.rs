use async_trait::async_trait;
use chrono::Local;

use super::notifier::{DEFAULT_THEME_COLOR, Teams, TeamsMarkup, TeamsPostOptions};
use super::types::{Action, Actions, Fact, MessageCard, Section, Sections};
use crate::builder::{
    ErrorOptions, ErrorReport, MessageBuilder, SendOptions, StatValue, StatsOptions, stat_entries,
};
use crate::errors::NotifyError;
use crate::format::Markup;
use crate::utils::issue::IssueDraft;

const ERROR_COLOR: &str = "F00";
const ISSUE_BUTTON: &str = "Create an issue for this error?";

/// A Teams `MessageCard` under construction. Created with [`Teams::message`].
pub struct TeamsMessage<'a> {
    teams: &'a Teams,
    channel: Option<String>,
    summary: Option<String>,
    theme_color: String,
    title: Option<String>,
    text: Option<String>,
    sections: Vec<Section>,
    actions: Vec<Action>,
}

impl<'a> TeamsMessage<'a> {
    pub(crate) fn new(teams: &'a Teams) -> Self {
        Self {
            teams,
            channel: None,
            summary: None,
            theme_color: DEFAULT_THEME_COLOR.to_string(),
            title: None,
            text: None,
            sections: Vec::new(),
            actions: Vec::new(),
        }
    }

    #[must_use]
    pub fn section(mut self, sections: impl Into<Sections>) -> Self {
        self.sections.extend(sections.into().0);
        self
    }

    /// Same as [`TeamsMessage::section`].
    #[must_use]
    pub fn attachment(self, sections: impl Into<Sections>) -> Self {
        self.section(sections)
    }

    #[must_use]
    pub fn action(mut self, actions: impl Into<Actions>) -> Self {
        self.actions.extend(actions.into().0);
        self
    }

    /// Renders the error as its own section instead of taking over the
    /// card's title, text and color like [`MessageBuilder::error`] does.
    #[must_use]
    pub fn error_section(self, error: impl Into<ErrorReport>, options: ErrorOptions) -> Self {
        let report = error.into();
        let mut section = Section {
            start_group: Some(true),
            activity_title: Some(format!(
                "{}: {}",
                TeamsMarkup::format("Error", None),
                report.message
            )),
            activity_text: Some(TeamsMarkup::escape_text(&report.stack)),
            ..Section::default()
        };
        if let Some(action) = self.issue_action(&report, &options) {
            section.potential_action.push(action);
        }
        self.section(section)
    }

    fn issue_action(&self, report: &ErrorReport, options: &ErrorOptions) -> Option<Action> {
        let app = self.teams.runtime().app_info();
        let bugs_url = app.bugs_url.as_deref()?;
        let draft = IssueDraft {
            label: options.label_for(report),
            title: options.title_for(report),
            version: &app.version,
            stack: &report.stack,
        };
        Some(Action::open_uri(ISSUE_BUTTON, draft.url(bugs_url, Local::now())))
    }

    /// Validates the message and splits it into the card and transport options `send` would use.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::MissingContent`] when neither summary nor text is set.
    pub fn into_post(self, options: SendOptions) -> Result<(MessageCard, TeamsPostOptions), NotifyError> {
        let has_summary = self.summary.as_deref().is_some_and(|s| !s.is_empty());
        let has_text = self.text.as_deref().is_some_and(|t| !t.is_empty());
        if !has_summary && !has_text {
            return Err(NotifyError::MissingContent);
        }

        let card = MessageCard {
            summary: self.summary,
            theme_color: self.theme_color,
            title: self.title,
            text: self.text,
            sections: self.sections,
            potential_action: self.actions,
            ..MessageCard::default()
        };
        let post = TeamsPostOptions {
            channel: self.channel,
            extra_props: options.extra_props,
            default_section: options.default_attachment,
        };
        Ok((card, post))
    }
}

#[async_trait]
impl<'a> MessageBuilder for TeamsMessage<'a> {
    fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    fn color(mut self, color: impl Into<String>) -> Self {
        self.theme_color = color.into().trim_start_matches('#').to_string();
        self
    }

    fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Teams buttons have no style; `_style` is ignored.
    fn button(
        self,
        label: impl Into<String>,
        url: impl Into<String>,
        _style: Option<&str>,
    ) -> Self {
        self.action(Action::open_uri(label, url))
    }

    /// MessageCards have no sender icon.
    fn icon(self, _link_or_emoji: &str) -> Self {
        self
    }

    fn stats<I, K, V>(self, title: &str, entries: I, options: StatsOptions) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<StatValue>,
    {
        let facts = stat_entries(entries, options)
            .into_iter()
            .map(|entry| Fact {
                name: entry.title,
                value: TeamsMarkup::escape_text(&entry.value),
            })
            .collect();

        self.section(Section {
            facts,
            ..Section::titled(title)
        })
    }

    fn error(self, error: impl Into<ErrorReport>, options: ErrorOptions) -> Self {
        let report = error.into();
        let action = self.issue_action(&report, &options);

        let mut message = self
            .color(ERROR_COLOR)
            .title(format!("Error: {}", report.message))
            .text(TeamsMarkup::escape_text(&report.stack));
        if let Some(action) = action {
            message = message.action(action);
        }
        message
    }

    async fn send(self, options: SendOptions) -> Result<(), NotifyError> {
        let teams = self.teams;
        let (card, post) = self.into_post(options)?;
        teams.post_message(&card, post).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app_info::AppInfo;
    use crate::core::config::NotifyConfig;
    use crate::format::FormatOptions;
    use serde_json::{Map, Value, json};

    fn teams() -> Teams {
        Teams::new(&NotifyConfig::default()).with_app_info(AppInfo::new("svc", "2.0.0"))
    }

    #[test]
    fn send_requires_summary_or_text() {
        let teams = teams();
        assert!(matches!(
            teams.message().title("only a title").into_post(SendOptions::default()),
            Err(NotifyError::MissingContent)
        ));
        assert!(matches!(
            teams.message().text("").summary("").into_post(SendOptions::default()),
            Err(NotifyError::MissingContent)
        ));
        assert!(teams.message().summary("s").into_post(SendOptions::default()).is_ok());
        assert!(teams.message().text("t").into_post(SendOptions::default()).is_ok());
    }

    #[tokio::test]
    async fn send_fails_fast_without_content() {
        let teams = teams();
        let result = teams.message().send(SendOptions::default()).await;
        assert!(matches!(result, Err(NotifyError::MissingContent)));
    }

    #[test]
    fn color_strips_hash() {
        let (card, _) = teams()
            .message()
            .summary("s")
            .color("#0F0")
            .into_post(SendOptions::default())
            .unwrap();
        assert_eq!(card.theme_color, "0F0");
    }

    #[test]
    fn build_report_card() {
        let teams = teams();
        let (card, post) = teams
            .message()
            .channel("test")
            .summary("test")
            .attachment(Section {
                activity_image: Some("img_url".to_string()),
                activity_title: Some(TeamsMarkup::format_url("url", "user")),
                text: Some(format!(
                    "Build {} on branch {}",
                    TeamsMarkup::format_url("build_url", "build"),
                    TeamsMarkup::format_url(
                        "branch_url",
                        &TeamsMarkup::format("branch", Some(FormatOptions::default().code()))
                    )
                )),
                ..Section::default()
            })
            .button("Test Report", "report_url", None)
            .button("Coverage Report", "report_url", Some("primary"))
            .into_post(SendOptions::without_context())
            .unwrap();

        assert_eq!(post.channel.as_deref(), Some("test"));
        assert!(!post.default_section);
        assert_eq!(
            card.sections[0].text.as_deref(),
            Some("Build [build](build_url) on branch [`branch`](branch_url)")
        );
        assert_eq!(
            serde_json::to_value(&card.potential_action).unwrap(),
            json!([
                {
                    "@type": "OpenUri",
                    "name": "Test Report",
                    "targets": [{ "os": "default", "uri": "report_url" }]
                },
                {
                    "@type": "OpenUri",
                    "name": "Coverage Report",
                    "targets": [{ "os": "default", "uri": "report_url" }]
                }
            ])
        );
    }

    #[test]
    fn stats_become_facts_in_order() {
        let (card, _) = teams()
            .message()
            .text("scheduled")
            .stats(
                "Mediums:",
                vec![("appPush", true), ("webPush", true)],
                StatsOptions::default(),
            )
            .stats(
                "Details:",
                vec![("title", "two words"), ("message", "line\nbreak")],
                StatsOptions::default(),
            )
            .into_post(SendOptions::without_context())
            .unwrap();

        assert_eq!(card.sections.len(), 2);
        assert_eq!(card.sections[0].title.as_deref(), Some("Mediums:"));
        assert_eq!(
            card.sections[0].facts,
            vec![
                Fact { name: "App Push".into(), value: "true".into() },
                Fact { name: "Web Push".into(), value: "true".into() },
            ]
        );
        assert_eq!(card.sections[1].facts[0].value, "two&nbsp;words");
        assert_eq!(card.sections[1].facts[1].value, "line\n\nbreak");
    }

    #[test]
    fn error_takes_over_card_without_bug_tracker() {
        let err = std::io::Error::other("test");
        let (card, _) = teams()
            .message()
            .error(&err, ErrorOptions::default())
            .into_post(SendOptions::without_context())
            .unwrap();

        assert_eq!(card.theme_color, ERROR_COLOR);
        assert_eq!(card.title.as_deref(), Some("Error: test"));
        assert_eq!(card.text.as_deref(), Some("Error:&nbsp;test"));
        assert!(card.potential_action.is_empty());
    }

    #[test]
    fn error_section_adds_grouped_section() {
        let teams = Teams::new(&NotifyConfig::default()).with_app_info(
            AppInfo::new("svc", "2.0.0").with_bugs_url("https://github.com/acme/svc/issues"),
        );
        let err = std::io::Error::other("boom");
        let (card, _) = teams
            .message()
            .summary("failure")
            .error_section(&err, ErrorOptions {
                label: Some("Worker".to_string()),
                title: None,
            })
            .into_post(SendOptions::without_context())
            .unwrap();

        let section = &card.sections[0];
        assert_eq!(section.start_group, Some(true));
        assert_eq!(section.activity_title.as_deref(), Some("**Error**: boom"));
        assert_eq!(section.potential_action.len(), 1);
        assert!(
            section.potential_action[0].targets[0]
                .uri
                .starts_with("https://github.com/acme/svc/issues/new?title=%5BWorker%5D%20boom&body=")
        );
        assert!(card.potential_action.is_empty());
    }

    #[test]
    fn empty_error_title_falls_back_to_message() {
        let teams = Teams::new(&NotifyConfig::default()).with_app_info(
            AppInfo::new("svc", "2.0.0").with_bugs_url("https://github.com/acme/svc/issues"),
        );
        let err = std::io::Error::other("boom");
        let (card, _) = teams
            .message()
            .error(&err, ErrorOptions {
                label: Some("Worker".to_string()),
                title: Some(String::new()),
            })
            .into_post(SendOptions::without_context())
            .unwrap();

        let uri = &card.potential_action[0].targets[0].uri;
        assert!(uri.contains("?title=%5BWorker%5D%20boom&body="), "{uri}");
    }

    #[test]
    fn extra_props_pass_through() {
        let mut extra = Map::new();
        extra.insert("correlationId".into(), Value::String("abc".into()));
        let (_, post) = teams()
            .message()
            .text("t")
            .into_post(SendOptions {
                extra_props: extra,
                ..SendOptions::default()
            })
            .unwrap();
        assert_eq!(post.extra_props["correlationId"], "abc");
    }
}
