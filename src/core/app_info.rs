//! Metadata about the application sending notifications.
//!
//! The name and version end up in the runtime context attached to every
//! message, and the bug tracker URL powers the "create an issue" button on
//! error reports.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::errors::NotifyError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub bugs_url: Option<String>,
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            name: "Unknown".to_string(),
            version: "0.0.0".to_string(),
            bugs_url: None,
        }
    }
}

impl AppInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            bugs_url: None,
        }
    }

    #[must_use]
    pub fn with_bugs_url(mut self, bugs_url: impl Into<String>) -> Self {
        self.bugs_url = Some(bugs_url.into());
        self
    }

    /// Reads `Cargo.toml` from the current working directory.
    ///
    /// Falls back to [`AppInfo::default`] when the manifest is missing or unreadable.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_manifest("Cargo.toml")
    }

    #[must_use]
    pub fn from_manifest(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        std::fs::read_to_string(path)
            .map_err(|e| NotifyError::Config(format!("{}: {e}", path.display())))
            .and_then(|manifest| Self::from_manifest_str(&manifest))
            .unwrap_or_else(|e| {
                debug!(error = %e, "Falling back to default app info");
                Self::default()
            })
    }

    /// Parses the `[package]` table of a Cargo manifest.
    ///
    /// The bug tracker URL is taken from `package.metadata.notify.bugs-url`,
    /// or derived from `package.repository` as `<repository>/issues`.
    /// Workspace-inherited fields (`version.workspace = true`) are not resolved.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is not valid TOML.
    pub fn from_manifest_str(manifest: &str) -> Result<Self, NotifyError> {
        let manifest: toml::Table = toml::from_str(manifest)?;
        let defaults = Self::default();

        let Some(package) = manifest.get("package").and_then(toml::Value::as_table) else {
            return Ok(defaults);
        };

        let field = |key: &str| package.get(key).and_then(toml::Value::as_str);

        let bugs_url = package
            .get("metadata")
            .and_then(|m| m.get("notify"))
            .and_then(|n| n.get("bugs-url"))
            .and_then(toml::Value::as_str)
            .map(str::to_string)
            .or_else(|| {
                field("repository")
                    .map(|repo| format!("{}/issues", repo.trim_end_matches('/')))
            });

        Ok(Self {
            name: field("name").map_or(defaults.name, str::to_string),
            version: field("version").map_or(defaults.version, str::to_string),
            bugs_url,
        })
    }
}
