//! The provider-neutral message builder contract.
//!
//! Builders are consumed by value: every mutator takes `self` and returns it,
//! and [`MessageBuilder::send`] moves the builder, so a message cannot be
//! mutated or sent again once it has been handed to the transport.

use std::error::Error;
use std::fmt::Write as _;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::NotifyError;
use crate::utils::text::start_case;

/// Longest value and key (in characters) that still render side by side.
pub const SHORT_FIELD_LIMIT: usize = 30;

#[derive(Debug, Clone)]
pub struct SendOptions {
    /// Append the hostname/environment/app version context block.
    pub default_attachment: bool,
    /// Top-level payload properties; these win over everything else on key collision.
    pub extra_props: Map<String, Value>,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            default_attachment: true,
            extra_props: Map::new(),
        }
    }
}

impl SendOptions {
    #[must_use]
    pub fn without_context() -> Self {
        Self {
            default_attachment: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StatsOptions {
    pub ignore_undefined: bool,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            ignore_undefined: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ErrorOptions {
    /// Issue title prefix; defaults to the error type name.
    pub label: Option<String>,
    /// Issue title; defaults to the error message.
    pub title: Option<String>,
}

impl ErrorOptions {
    /// The issue label, falling back to the error type when unset or empty.
    #[must_use]
    pub fn label_for<'a>(&'a self, report: &'a ErrorReport) -> &'a str {
        non_empty(self.label.as_deref()).unwrap_or(&report.name)
    }

    /// The issue title, falling back to the error message when unset or empty.
    #[must_use]
    pub fn title_for<'a>(&'a self, report: &'a ErrorReport) -> &'a str {
        non_empty(self.title.as_deref()).unwrap_or(&report.message)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// A stat value: either absent (`Undefined`) or any JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    Undefined,
    Value(Value),
}

impl StatValue {
    /// Renders the value the way it is shown in a field: scalars as plain
    /// text, strings trimmed, arrays and objects as compact JSON.
    #[must_use]
    pub fn render(&self) -> String {
        let rendered = match self {
            StatValue::Undefined => "undefined".to_string(),
            StatValue::Value(Value::String(s)) => s.clone(),
            StatValue::Value(Value::Number(n)) => match n.as_f64() {
                Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
                    format!("{f:.0}")
                }
                _ => n.to_string(),
            },
            StatValue::Value(other) => other.to_string(),
        };
        rendered.trim().to_string()
    }
}

impl From<Value> for StatValue {
    fn from(value: Value) -> Self {
        StatValue::Value(value)
    }
}

impl From<&str> for StatValue {
    fn from(value: &str) -> Self {
        StatValue::Value(Value::String(value.to_string()))
    }
}

impl<T: Into<StatValue>> From<Option<T>> for StatValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(StatValue::Undefined, Into::into)
    }
}

macro_rules! stat_value_from {
    ($($t:ty),*) => {
        $(impl From<$t> for StatValue {
            fn from(value: $t) -> Self {
                StatValue::Value(Value::from(value))
            }
        })*
    };
}

stat_value_from!(String, bool, i32, i64, u32, u64, usize, f32, f64);

/// One rendered stat, ready to become a Slack field or a Teams fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatEntry {
    pub title: String,
    pub value: String,
    pub short: bool,
}

/// Renders `entries` in iteration order, skipping undefined values when
/// `options.ignore_undefined` is set.
pub fn stat_entries<I, K, V>(entries: I, options: StatsOptions) -> Vec<StatEntry>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<StatValue>,
{
    entries
        .into_iter()
        .filter_map(|(key, value)| {
            let value = value.into();
            if options.ignore_undefined && value == StatValue::Undefined {
                return None;
            }
            let key = key.as_ref().trim();
            let value = value.render();
            Some(StatEntry {
                title: start_case(key),
                short: value.chars().count() <= SHORT_FIELD_LIMIT
                    && key.chars().count() <= SHORT_FIELD_LIMIT,
                value,
            })
        })
        .collect()
}

/// An error flattened for display: type name, message and a stack made of
/// the error and its chain of sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub name: String,
    pub message: String,
    pub stack: String,
}

impl ErrorReport {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        message: impl Into<String>,
        stack: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: stack.into(),
        }
    }

    /// Uses anyhow's debug rendering (context chain, plus the backtrace when
    /// one was captured) as the stack.
    #[must_use]
    pub fn from_anyhow(error: &anyhow::Error) -> Self {
        Self::new("Error", error.to_string(), format!("{error:?}"))
    }
}

impl<E: Error + ?Sized> From<&E> for ErrorReport {
    fn from(error: &E) -> Self {
        let name = short_type_name(std::any::type_name::<E>());
        let message = error.to_string();
        let mut stack = format!("{name}: {message}");
        let mut source = error.source();
        while let Some(cause) = source {
            let _ = write!(stack, "\n    caused by: {cause}");
            source = cause.source();
        }
        Self {
            name,
            message,
            stack,
        }
    }
}

fn short_type_name(full: &str) -> String {
    if full.starts_with("dyn ") {
        return "Error".to_string();
    }
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// Operations every provider's builder supports. Provider-specific record
/// types (attachments, sections, actions) are added through inherent methods.
#[async_trait]
pub trait MessageBuilder: Sized + Send {
    #[must_use]
    fn text(self, text: impl Into<String>) -> Self;

    #[must_use]
    fn channel(self, channel: impl Into<String>) -> Self;

    #[must_use]
    fn color(self, color: impl Into<String>) -> Self;

    #[must_use]
    fn title(self, title: impl Into<String>) -> Self;

    #[must_use]
    fn summary(self, summary: impl Into<String>) -> Self;

    #[must_use]
    fn button(self, label: impl Into<String>, url: impl Into<String>, style: Option<&str>) -> Self;

    /// A value starting with `:` is an emoji code, anything else an image URL.
    #[must_use]
    fn icon(self, link_or_emoji: &str) -> Self;

    #[must_use]
    fn stats<I, K, V>(self, title: &str, entries: I, options: StatsOptions) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<StatValue>;

    #[must_use]
    fn error(self, error: impl Into<ErrorReport>, options: ErrorOptions) -> Self;

    /// Hands the message to the transport. Delivery failures are logged, not
    /// returned; only missing configuration or content is an error.
    async fn send(self, options: SendOptions) -> Result<(), NotifyError>;
}
