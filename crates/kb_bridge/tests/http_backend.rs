use std::time::Duration;

use kb_bridge::{Backend, BridgeError, BridgeSettings, HttpBackend};
use kb_core::form::StartCrawlRequest;
use kb_core::model::UrlStatus;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer) -> HttpBackend {
    HttpBackend::new(&BridgeSettings {
        base_url: server.uri(),
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(2),
    })
    .expect("backend")
}

#[tokio::test]
async fn url_list_is_requested_without_content() {
    let server = MockServer::start().await;
    let version_id = Uuid::new_v4();
    let url_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/invoke/get_version_documentation_urls"))
        .and(body_json(json!({ "versionId": version_id, "includeContent": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": url_id,
            "technologyId": Uuid::nil(),
            "versionId": version_id,
            "url": "https://docs.rs/tokio",
            "status": "markdown_ready",
            "html": null,
            "isProcessed": null,
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let urls = backend(&server)
        .get_version_documentation_urls(version_id)
        .await
        .expect("urls");

    assert_eq!(urls.len(), 1);
    assert_eq!(urls[0].id, url_id);
    assert_eq!(urls[0].status, UrlStatus::MarkdownReady);
    assert!(!urls[0].is_processed);
}

#[tokio::test]
async fn start_crawling_sends_camel_case_arguments() {
    let server = MockServer::start().await;
    let request = StartCrawlRequest {
        technology_id: Uuid::new_v4(),
        version_id: Uuid::new_v4(),
        start_url: "https://docs.rs/tokio/".into(),
        prefix_path: "https://docs.rs/tokio/".into(),
        anti_paths: Some(vec!["/src/".into()]),
        anti_keywords: None,
        skip_processed_urls: Some(true),
    };
    Mock::given(method("POST"))
        .and(path("/invoke/start_crawling"))
        .and(body_json(json!({
            "technologyId": request.technology_id,
            "versionId": request.version_id,
            "startUrl": "https://docs.rs/tokio/",
            "prefixPath": "https://docs.rs/tokio/",
            "antiPaths": ["/src/"],
            "skipProcessedUrls": true,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("crawl-42")))
        .mount(&server)
        .await;

    let task_id = backend(&server).start_crawling(&request).await.expect("task id");
    assert_eq!(task_id, "crawl-42");
}

#[tokio::test]
async fn backend_error_text_is_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/invoke/cancel_task"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!("Task not found: t-1")))
        .mount(&server)
        .await;

    let err = backend(&server).cancel_task("t-1").await.unwrap_err();
    match &err {
        BridgeError::Backend { status, message } => {
            assert_eq!(*status, 400);
            assert_eq!(message, "Task not found: t-1");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(err.to_string(), "Task not found: t-1");
}

#[tokio::test]
async fn unit_commands_accept_null_and_empty_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/invoke/stop_all_crawling"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/invoke/cancel_task"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .mount(&server)
        .await;

    let backend = backend(&server);
    backend.stop_all_crawling().await.expect("stop");
    backend.cancel_task("t-2").await.expect("cancel");
}

#[tokio::test]
async fn missing_settings_fall_back_to_empty() {
    let server = MockServer::start().await;
    let version_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/invoke/get_version_crawling_settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .mount(&server)
        .await;

    let settings = backend(&server)
        .get_version_crawling_settings(version_id)
        .await
        .expect("settings");
    assert_eq!(settings.version_id, version_id);
    assert!(settings.anti_paths.is_empty());
}

#[tokio::test]
async fn undecodable_results_are_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/invoke/apply_url_filters"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"oops\":"))
        .mount(&server)
        .await;

    let err = backend(&server)
        .apply_url_filters(Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::Decode { .. }), "{err:?}");
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/invoke/get_tasks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&BridgeSettings {
        base_url: server.uri(),
        connect_timeout: Duration::from_secs(1),
        request_timeout: Duration::from_millis(100),
    })
    .unwrap();
    let err = backend.get_tasks().await.unwrap_err();
    assert!(matches!(err, BridgeError::Timeout { .. }), "{err:?}");
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = HttpBackend::new(&BridgeSettings {
        base_url: "not a url".into(),
        ..BridgeSettings::default()
    })
    .unwrap_err();
    assert!(matches!(err, BridgeError::InvalidBaseUrl { .. }));
}
