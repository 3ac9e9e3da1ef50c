//! HTTP delivery for chat notifications.
//!
//! Delivery is best effort: every failure is logged together with the
//! payload that could not be delivered and is never returned to the caller.

use std::time::Duration;

use reqwest::{Client, ClientBuilder, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::errors::NotifyError;

pub struct WebhookClient {
    http: Client,
}

impl WebhookClient {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: build_or_default(Client::builder().timeout(timeout)),
        }
    }

    /// POST `payload` as a JSON body.
    pub async fn post_json(&self, provider: &str, url: &str, payload: &Value) {
        let request = self.http.post(url).json(payload);
        self.deliver(provider, request, payload).await;
    }

    /// POST `fields` as `application/x-www-form-urlencoded`.
    /// `payload` is only used for logging.
    pub async fn post_form(
        &self,
        provider: &str,
        url: &str,
        fields: &[(String, String)],
        payload: &Value,
    ) {
        let request = self.http.post(url).form(fields);
        self.deliver(provider, request, payload).await;
    }

    async fn deliver(&self, provider: &str, request: RequestBuilder, payload: &Value) {
        match send_checked(request).await {
            Ok(()) => debug!(provider, "Notification delivered"),
            Err(e) => error!(
                provider,
                error = %e,
                payload = %payload,
                "Failed to deliver notification"
            ),
        }
    }
}

fn build_or_default(builder: ClientBuilder) -> Client {
    builder.build().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to build HTTP client, falling back to defaults without timeout");
        Client::new()
    })
}

/// Sends `request` and maps every delivery problem to an error: transport
/// failures, any status other than 200, and a truthy `error` field in a JSON body.
pub(crate) async fn send_checked(request: RequestBuilder) -> Result<(), NotifyError> {
    let resp = request.send().await?;
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    if status != StatusCode::OK {
        return Err(NotifyError::Status {
            status: status.as_u16(),
            body,
        });
    }

    // Webhooks usually answer with plain text ("ok" / "1"); only JSON bodies
    // can carry an API error.
    if let Ok(parsed) = serde_json::from_str::<Value>(&body)
        && let Some(api_error) = parsed.get("error")
        && is_truthy(api_error)
    {
        return Err(NotifyError::ApiError(match api_error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }));
    }

    Ok(())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn post_to(server: &MockServer) -> Result<(), NotifyError> {
        let request = Client::new()
            .post(format!("{}/hook", server.uri()))
            .json(&json!({ "text": "hi" }));
        send_checked(request).await
    }

    #[test]
    fn truthiness_follows_json_semantics() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("invalid_channel")));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!({})));
    }

    #[tokio::test]
    async fn plain_text_ok_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        assert!(post_to(&server).await.is_ok());
    }

    #[tokio::test]
    async fn api_error_field_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ok": false, "error": "invalid_channel" })),
            )
            .mount(&server)
            .await;

        match post_to(&server).await {
            Err(NotifyError::ApiError(msg)) => assert_eq!(msg, "invalid_channel"),
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn falsy_error_field_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "error": null })))
            .mount(&server)
            .await;

        assert!(post_to(&server).await.is_ok());
    }

    #[tokio::test]
    async fn non_200_status_is_reported_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no_service"))
            .mount(&server)
            .await;

        match post_to(&server).await {
            Err(NotifyError::Status { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "no_service");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_2xx_statuses_are_not_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        assert!(matches!(
            post_to(&server).await,
            Err(NotifyError::Status { status: 204, .. })
        ));
    }

    #[tokio::test]
    async fn connection_failure_is_http_error() {
        let request = Client::new().post("http://127.0.0.1:1/hook").json(&json!({}));
        assert!(matches!(
            send_checked(request).await,
            Err(NotifyError::HttpError(_))
        ));
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if let Ok(mut inner) = self.0.lock() {
                inner.extend_from_slice(buf);
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn broken_client_config_warns_and_falls_back() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        // An invalid header value only fails at build time.
        let client = tracing::subscriber::with_default(subscriber, || {
            build_or_default(Client::builder().user_agent("bad\nagent"))
        });

        let logs = String::from_utf8_lossy(&captured.0.lock().unwrap()).into_owned();
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("Failed to build HTTP client"), "{logs}");

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;
        let request = client.post(format!("{}/hook", server.uri())).json(&json!({}));
        assert!(send_checked(request).await.is_ok());
    }

    #[tokio::test]
    async fn post_json_swallows_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = WebhookClient::new(Duration::from_secs(5));
        client
            .post_json("Slack", &format!("{}/hook", server.uri()), &json!({ "text": "x" }))
            .await;
    }
}
