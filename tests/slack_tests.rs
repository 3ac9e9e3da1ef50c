use chat_notify::slack::{Action, Attachment};
use chat_notify::{
    AppInfo, ErrorOptions, MessageBuilder, NotifyConfig, SendOptions, Slack, StatValue,
    StatsOptions,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn app() -> AppInfo {
    AppInfo::new("billing", "1.4.0")
}

fn slack_with_webhook(server: &MockServer) -> Slack {
    let mut config = NotifyConfig::default();
    config.slack.set_webhook(format!("{}/hook", server.uri()));
    Slack::new(&config).with_app_info(app())
}

async fn single_json_body(server: &MockServer) -> Value {
    let requests: Vec<Request> = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1, "expected exactly one request");
    requests[0].body_json().expect("JSON body")
}

#[tokio::test]
async fn test_deploy_done_posts_text_and_stats() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let slack = slack_with_webhook(&server);
    slack
        .message()
        .text("Deploy done")
        .stats(
            "Info",
            vec![("duration", StatValue::from(12)), ("ok", StatValue::from(true))],
            StatsOptions::default(),
        )
        .send(SendOptions::default())
        .await
        .unwrap();

    let body = single_json_body(&server).await;
    assert_eq!(body["text"], "Deploy done");
    assert_eq!(body["channel"], "#general");
    assert_eq!(body["username"], "slackbot");

    let attachments = body["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 2, "stats plus the App Info block");
    assert_eq!(attachments[0]["title"], "Info");
    assert_eq!(
        attachments[0]["fields"],
        json!([
            { "title": "Duration", "value": "12", "short": true },
            { "title": "Ok", "value": "true", "short": true },
        ])
    );
    assert_eq!(attachments[1]["title"], "App Info:");
    assert_eq!(attachments[1]["fields"][1]["value"], "development");
    assert!(attachments[1]["footer"].as_str().unwrap().starts_with("billing v1.4.0"));
}

#[tokio::test]
async fn test_webhook_wins_over_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = NotifyConfig::default();
    config.slack.set_webhook(format!("{}/hook", server.uri()));
    config.slack.set_token("xoxb-unused");
    config.slack.api_url = format!("{}/api/chat.postMessage", server.uri());
    let slack = Slack::new(&config).with_app_info(app());

    slack
        .message()
        .text("hello")
        .send(SendOptions::without_context())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_token_posts_form_to_web_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .and(body_string_contains("token=xoxb-123"))
        .and(body_string_contains("text=hello"))
        .and(body_string_contains("channel=%23ops"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = NotifyConfig::default();
    config.slack.set_token("xoxb-123");
    config.slack.api_url = format!("{}/api/chat.postMessage", server.uri());
    let slack = Slack::new(&config).with_app_info(app());

    slack
        .message()
        .text("hello")
        .channel("#ops")
        .send(SendOptions::without_context())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_api_error_in_ok_response_is_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": false, "error": "invalid_channel" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = slack_with_webhook(&server)
        .message()
        .text("to nowhere")
        .send(SendOptions::default())
        .await;
    assert!(result.is_ok(), "delivery failures must not reach the caller");
}

#[tokio::test]
async fn test_server_error_is_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let result = slack_with_webhook(&server)
        .message()
        .text("hello")
        .send(SendOptions::default())
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_log_condition_suppresses_delivery() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let slack = slack_with_webhook(&server).with_log_condition(|| true);
    slack
        .message()
        .text("only logged")
        .send(SendOptions::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_test_environment_suppresses_delivery_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = NotifyConfig {
        environment: "test".to_string(),
        ..NotifyConfig::default()
    };
    config.slack.set_webhook(format!("{}/hook", server.uri()));
    let slack = Slack::new(&config).with_app_info(app());

    slack
        .message()
        .text("only logged")
        .send(SendOptions::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_missing_webhook_and_token_drops_message() {
    let slack = Slack::new(&NotifyConfig::default()).with_app_info(app());
    let result = slack
        .message()
        .text("nowhere to go")
        .send(SendOptions::default())
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_error_with_bug_tracker_adds_issue_button() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = NotifyConfig::default();
    config.slack.set_webhook(format!("{}/hook", server.uri()));
    let slack = Slack::new(&config)
        .with_app_info(app().with_bugs_url("https://github.com/acme/billing/issues"));

    let err = std::io::Error::other("boom");
    slack
        .message()
        .error(&err, ErrorOptions::default())
        .send(SendOptions::without_context())
        .await
        .unwrap();

    let body = single_json_body(&server).await;
    let attachment = &body["attachments"][0];
    assert_eq!(attachment["pretext"], "*Error*: boom");
    assert_eq!(attachment["color"], "danger");

    let actions = attachment["actions"].as_array().unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0]["type"], "button");
    assert_eq!(actions[0]["style"], "danger");
    let url = actions[0]["url"].as_str().unwrap();
    assert!(url.starts_with("https://github.com/acme/billing/issues/new?title="));
    assert!(url.contains("boom"));
    assert!(url.contains("Full%20Stack%3A%20Error%3A%20boom"));
    assert!(url.ends_with("&labels=bug"));
}

#[tokio::test]
async fn test_extra_props_and_custom_records_reach_the_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "username": "deploy-bot",
            "icon_emoji": ":rocket:",
            "unfurl_links": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let mut extra = serde_json::Map::new();
    extra.insert("unfurl_links".into(), json!(false));

    slack_with_webhook(&server)
        .message()
        .text("custom")
        .username("deploy-bot")
        .icon(":rocket:")
        .attachment(Attachment {
            color: Some("good".to_string()),
            ..Attachment::titled("Build #42")
        })
        .action(Action::button("Open", "https://ci.example.com/42", Some("primary")))
        .send(SendOptions {
            default_attachment: false,
            extra_props: extra,
        })
        .await
        .unwrap();

    let body = single_json_body(&server).await;
    let attachments = body["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 2);
    assert_eq!(attachments[0]["title"], "Build #42");
    assert_eq!(attachments[1]["actions"][0]["url"], "https://ci.example.com/42");
}
