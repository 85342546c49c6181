//! 端到端测试：输入 → 渲染 → 投递（本地 mock webhook / GitHub API）

use anyhow::anyhow;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use gh_notify::cli::{handle_notify, NotifyArgs};
use gh_notify::notification::{
    DryRunChannel, GithubProfileClient, MattermostChannel, MattermostConfig, ProfileClientConfig,
};
use gh_notify::{
    load_event, Actor, EventEnvelope, NotificationChannel, NotificationRenderer, NotifyError,
    ProfileDetails, ProfileLookup,
};
use httpmock::prelude::*;
use serde_json::json;
use std::io::Write;
use std::process::Command;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const PUSH_EVENT: &str = r#"{"forced":false,"compare":"cmp","ref":"refs/heads/main","commits":[{"id":"abcdef1234","url":"cu","message":"msg"}],"repository":{"full_name":"org/repo","html_url":"r"},"sender":{"login":"alice","html_url":"ua","avatar_url":"ia"}}"#;

fn watch_event(user_api_url: &str) -> EventEnvelope {
    let doc = json!({
        "action": "started",
        "repository": {"full_name": "org/repo", "html_url": "r", "stargazers_count": 42},
        "sender": {"login": "alice", "html_url": "ua", "avatar_url": "ia", "url": user_api_url}
    });
    EventEnvelope::parse(&doc.to_string()).unwrap()
}

struct FailingLookup;

impl ProfileLookup for FailingLookup {
    fn lookup(&self, _actor: &Actor) -> anyhow::Result<ProfileDetails> {
        Err(anyhow!("timed out"))
    }
}

/// 共享缓冲区，便于断言 dry-run 输出
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_webhook_receives_payload() {
    // Given: 返回 200 的 webhook
    let server = MockServer::start();
    let hook = server.mock(|when, then| {
        when.method(POST)
            .path("/hooks/abc")
            .header("content-type", "application/json")
            .json_body_partial(r#"{"username":"alice","icon_url":"ia"}"#);
        then.status(200).body("ok");
    });

    // When: 渲染并投递
    let env = load_event(Some(PUSH_EVENT)).unwrap();
    let notification = NotificationRenderer::new().render("push", &env);
    let channel = MattermostChannel::new(MattermostConfig {
        webhook_url: server.url("/hooks/abc"),
        ..Default::default()
    })
    .unwrap();
    let result = channel.send(&notification).unwrap();

    // Then
    hook.assert();
    assert_eq!(result.status, Some(200));
    assert_eq!(result.body, "ok");
    assert!(result.is_success());
}

#[test]
fn test_webhook_error_status_is_fatal() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/hooks/abc");
        then.status(500).body("boom");
    });

    let env = load_event(Some(PUSH_EVENT)).unwrap();
    let notification = NotificationRenderer::new().render("push", &env);
    let channel = MattermostChannel::new(MattermostConfig {
        webhook_url: server.url("/hooks/abc"),
        ..Default::default()
    })
    .unwrap();

    let err = channel.send(&notification).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<NotifyError>(),
        Some(NotifyError::Delivery(_))
    ));
}

#[test]
fn test_watch_enrichment_from_profile_api() {
    // Given: GitHub users API 返回资料
    let server = MockServer::start();
    let api = server.mock(|when, then| {
        when.method(GET)
            .path("/users/alice")
            .header("authorization", "Bearer t0ken");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"login":"alice","name":"Alice","company":null,"location":"Berlin","blog":""}"#);
    });

    let client = GithubProfileClient::new(ProfileClientConfig {
        token: Some("t0ken".into()),
        ..Default::default()
    })
    .unwrap();
    let renderer = NotificationRenderer::new().with_profile_lookup(Arc::new(client));

    // When
    let n = renderer.render("watch", &watch_event(&server.url("/users/alice")));

    // Then: 只输出非空字段
    api.assert();
    let body = &n.attachment.text;
    assert!(body.starts_with("[alice](ua) is stargazer number 42\n\n"));
    assert!(body.contains("\nName: Alice  "));
    assert!(body.contains("\nLocation: Berlin  "));
    assert!(!body.contains("Company"));
    assert!(!body.contains("Blog"));
    assert!(body.contains("![Github Stats]("));
}

#[test]
fn test_watch_enrichment_failure_degrades() {
    // Given: 资料查询失败
    let renderer = NotificationRenderer::new().with_profile_lookup(Arc::new(FailingLookup));

    // When
    let n = renderer.render("watch", &watch_event("api/alice"));

    // Then: 保留 star 行和徽章，不含任何资料行
    let body = &n.attachment.text;
    assert!(body.contains("[alice](ua) is stargazer number 42"));
    assert!(body.contains("![Github Stats]("));
    for label in ["Name:", "Company:", "Location:", "Email:", "Twitter:", "Blog:", "Bio:"] {
        assert!(!body.contains(label), "unexpected {}", label);
    }
}

#[test]
fn test_watch_profile_not_found_degrades() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/users/alice");
        then.status(404).body(r#"{"message":"Not Found"}"#);
    });

    let client = GithubProfileClient::new(ProfileClientConfig::default()).unwrap();
    let renderer = NotificationRenderer::new().with_profile_lookup(Arc::new(client));
    let n = renderer.render("watch", &watch_event(&server.url("/users/alice")));

    assert!(n.attachment.text.contains("stargazer number 42"));
    assert!(!n.attachment.text.contains("Name:"));
}

#[test]
fn test_dry_run_prints_payload() {
    let buf = SharedBuf::default();
    let channel = DryRunChannel::with_writer(Box::new(buf.clone()));

    let env = load_event(Some(PUSH_EVENT)).unwrap();
    let notification = NotificationRenderer::new().render("push", &env);
    let result = channel.send(&notification).unwrap();

    assert!(result.status.is_none());
    let printed = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&printed).unwrap();
    assert_eq!(value, notification.to_value().unwrap());
}

#[test]
fn test_notify_command_end_to_end() {
    // Given: base64（无补齐）事件 + mock webhook + 身份文档
    let server = MockServer::start();
    let hook = server.mock(|when, then| {
        when.method(POST)
            .path("/hooks/ci")
            .json_body_partial(r#"{"username":"ci-bot","text":"Push by [alice](ua) in [org/repo](r)"}"#);
        then.status(200).body("ok");
    });
    let dir = TempDir::new().unwrap();
    let identity_file = dir.path().join("id.json");

    let args = NotifyArgs {
        event_name: Some("push".into()),
        event_json: Some(STANDARD_NO_PAD.encode(PUSH_EVENT)),
        webhook_url: Some(server.url("/hooks/ci")),
        sender_username: Some("ci-bot".into()),
        identity: Some(STANDARD_NO_PAD.encode(r#"{"id":{"key":"k"}}"#)),
        identity_file: identity_file.clone(),
        no_enrich: Some("true".into()),
        config: Some(dir.path().join("config.json")),
        ..Default::default()
    };

    // When
    handle_notify(args).unwrap();

    // Then
    hook.assert();
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(identity_file).unwrap()).unwrap();
    assert_eq!(written, json!({"id": {"key": "k"}}));
}

#[test]
fn test_notify_command_webhook_from_config_file() {
    let server = MockServer::start();
    let hook = server.mock(|when, then| {
        when.method(POST).path("/hooks/file");
        then.status(201);
    });
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(
        &config,
        json!({"webhook_url": server.url("/hooks/file")}).to_string(),
    )
    .unwrap();

    let args = NotifyArgs {
        event_name: Some("fork".into()),
        event_json: Some(PUSH_EVENT.into()),
        webhook_url: Some(String::new()),
        identity_file: dir.path().join("id.json"),
        no_enrich: Some("true".into()),
        config: Some(config),
        ..Default::default()
    };

    handle_notify(args).unwrap();
    hook.assert();
}

#[test]
fn test_binary_accepts_empty_action_inputs() {
    // Given: Action 对未填写的 input 全部传空串
    let dir = TempDir::new().unwrap();
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_gh-notify"));
    cmd.arg("--dry-run")
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("GITHUB_EVENT_NAME", "push")
        .env("INPUT_EVENTJSON", PUSH_EVENT);
    for input in [
        "INPUT_WEBHOOKURL",
        "INPUT_SENDERUSERNAME",
        "INPUT_SENDERICONURL",
        "INPUT_ZITIID",
        "INPUT_PROFILETIMEOUT",
        "INPUT_DELIVERYTIMEOUT",
        "INPUT_NOENRICH",
        "GITHUB_TOKEN",
    ] {
        cmd.env(input, "");
    }

    // When
    let output = cmd.output().unwrap();

    // Then: 正常渲染，空的覆盖项不生效
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {}", stderr);
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["username"], "alice");
    assert_eq!(payload["icon_url"], "ia");
    assert!(!dir.path().join("id.json").exists());
}

#[test]
fn test_binary_rejects_invalid_timeout() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_gh-notify"))
        .arg("--dry-run")
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("GITHUB_EVENT_NAME", "push")
        .env("INPUT_EVENTJSON", PUSH_EVENT)
        .env("INPUT_DELIVERYTIMEOUT", "soon")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("INPUT_DELIVERYTIMEOUT"));
}
