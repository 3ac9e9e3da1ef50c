//! Office 365 connector `MessageCard` schema.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCard {
    #[serde(rename = "@type")]
    pub card_type: String,
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Hex color without the leading `#`.
    pub theme_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub potential_action: Vec<Action>,
}

impl Default for MessageCard {
    fn default() -> Self {
        Self {
            card_type: "MessageCard".to_string(),
            context: "https://schema.org/extensions".to_string(),
            summary: None,
            theme_color: super::DEFAULT_THEME_COLOR.to_string(),
            title: None,
            text: None,
            sections: Vec::new(),
            potential_action: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_group: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facts: Vec<Fact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub potential_action: Vec<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<bool>,
}

impl Section {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "@type")]
    pub action_type: String,
    pub name: String,
    pub targets: Vec<Target>,
}

impl Action {
    /// An `OpenUri` action opening `uri` on every platform.
    pub fn open_uri(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            action_type: "OpenUri".to_string(),
            name: name.into(),
            targets: vec![Target {
                os: "default".to_string(),
                uri: uri.into(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub os: String,
    pub uri: String,
}

/// One section or several, for [`super::TeamsMessage::section`].
pub struct Sections(pub Vec<Section>);

impl From<Section> for Sections {
    fn from(section: Section) -> Self {
        Self(vec![section])
    }
}

impl From<Vec<Section>> for Sections {
    fn from(sections: Vec<Section>) -> Self {
        Self(sections)
    }
}

/// One action or several, for [`super::TeamsMessage::action`].
pub struct Actions(pub Vec<Action>);

impl From<Action> for Actions {
    fn from(action: Action) -> Self {
        Self(vec![action])
    }
}

impl From<Vec<Action>> for Actions {
    fn from(actions: Vec<Action>) -> Self {
        Self(actions)
    }
}
