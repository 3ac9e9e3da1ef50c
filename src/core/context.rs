use std::env;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tracing::info;

use super::app_info::AppInfo;
use super::config::NotifyConfig;
use crate::clients::WebhookClient;

/// Host and process details appended to outgoing messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeContext {
    pub hostname: String,
    pub environment: String,
    pub app: AppInfo,
    /// Process-manager name and id, taken from the `name` and `pm_id`
    /// variables that pm2 exports to managed processes.
    pub process: Option<(String, String)>,
}

impl RuntimeContext {
    #[must_use]
    pub fn detect(environment: &str, app: AppInfo) -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string());

        let pm_name = env::var("name").ok();
        let pm_id = env::var("pm_id").ok();
        let process = (pm_name.is_some() || pm_id.is_some()).then(|| {
            (
                pm_name.unwrap_or_default(),
                pm_id.unwrap_or_else(|| "-1".to_string()),
            )
        });

        Self {
            hostname,
            environment: environment.to_string(),
            app,
            process,
        }
    }

    /// `<app> v<version>`, followed by `| <pm name> <pm id>` under a process manager.
    #[must_use]
    pub fn footer(&self) -> String {
        let mut footer = format!("{} v{}", self.app.name, self.app.version);
        if let Some((name, id)) = &self.process {
            footer.push_str(&format!(" | {name} {id}"));
        }
        footer
    }
}

pub type LogCondition = Arc<dyn Fn() -> bool + Send + Sync>;

/// State shared by every provider: HTTP client, app metadata, the lazily
/// detected runtime context and the predicate deciding whether messages are
/// logged instead of sent.
pub struct Runtime {
    pub(crate) client: WebhookClient,
    environment: String,
    app: Option<AppInfo>,
    log_condition: LogCondition,
    context: OnceLock<RuntimeContext>,
}

impl Runtime {
    #[must_use]
    pub fn new(config: &NotifyConfig) -> Self {
        let is_test = config.is_test();
        Self {
            client: WebhookClient::new(Duration::from_secs(config.timeout_secs)),
            environment: config.environment.clone(),
            app: None,
            log_condition: Arc::new(move || is_test),
            context: OnceLock::new(),
        }
    }

    pub fn set_app_info(&mut self, app: AppInfo) {
        self.app = Some(app);
        self.context = OnceLock::new();
    }

    pub fn set_log_condition(&mut self, condition: LogCondition) {
        self.log_condition = condition;
    }

    /// App metadata; read from `Cargo.toml` on first use unless set explicitly.
    pub fn app_info(&self) -> &AppInfo {
        &self.context().app
    }

    pub fn context(&self) -> &RuntimeContext {
        self.context.get_or_init(|| {
            let app = self.app.clone().unwrap_or_else(AppInfo::detect);
            RuntimeContext::detect(&self.environment, app)
        })
    }

    /// Logs `payload` and returns true when messages must not leave the process.
    pub(crate) fn suppress(&self, provider: &str, payload: &serde_json::Value) -> bool {
        if (self.log_condition)() {
            info!(label = provider, payload = %payload, "{provider} message");
            return true;
        }
        false
    }
}
