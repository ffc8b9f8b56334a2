use std::time::Duration;

use kb_bridge::{BridgeHandle, BridgeReply, BridgeSettings};
use kb_core::BackendEvent;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Handle = BridgeHandle<Result<usize, String>>;
type Reply = BridgeReply<Result<usize, String>>;

fn settings(server: &MockServer) -> BridgeSettings {
    BridgeSettings {
        base_url: server.uri(),
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(5),
    }
}

/// Collects `count` replies without blocking the test runtime.
///
/// The receiving side is not `Sync`, so the handle moves to the blocking
/// thread and comes back with the replies.
async fn collect(handle: Handle, count: usize) -> (Handle, Vec<Reply>) {
    tokio::task::spawn_blocking(move || {
        let mut replies = Vec::new();
        while replies.len() < count {
            match handle.recv_timeout(Duration::from_secs(5)) {
                Some(reply) => replies.push(reply),
                None => break,
            }
        }
        (handle, replies)
    })
    .await
    .unwrap()
}

async fn collect_until_closed(handle: Handle) -> Vec<Reply> {
    tokio::task::spawn_blocking(move || {
        let mut replies = Vec::new();
        while let Some(reply) = handle.recv_timeout(Duration::from_secs(5)) {
            let closed = matches!(reply, BridgeReply::EventStreamClosed(_));
            replies.push(reply);
            if closed {
                break;
            }
        }
        replies
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn jobs_reply_with_their_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/invoke/get_tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "t1", "taskType": "crawl", "status": "running", "progress": 10},
            {"id": "t2", "taskType": "crawl", "status": "queued"},
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/invoke/get_proxies"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "proxy table missing"})))
        .mount(&server)
        .await;

    let handle: Handle = BridgeHandle::new(&settings(&server)).unwrap();
    handle.run(|backend| async move {
        backend
            .get_tasks()
            .await
            .map(|tasks| tasks.len())
            .map_err(|err| err.to_string())
    });
    handle.run(|backend| async move {
        backend
            .get_proxies()
            .await
            .map(|proxies| proxies.len())
            .map_err(|err| err.to_string())
    });

    let (handle, replies) = collect(handle, 2).await;
    let mut results: Vec<Result<usize, String>> = replies
        .into_iter()
        .map(|reply| match reply {
            BridgeReply::Completed(result) => result,
            other => panic!("unexpected reply {other:?}"),
        })
        .collect();
    results.sort_by_key(|result| result.is_err());

    assert_eq!(results, vec![Ok(2), Err("proxy table missing".to_string())]);
    // The counter drops just after each reply is sent.
    for _ in 0..50 {
        if handle.pending() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(handle.pending(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn subscription_forwards_events_then_reports_close() {
    let server = MockServer::start().await;
    let body = [
        r#"{"event":"task:cancelled","payload":{"taskId":"t1"}}"#,
        r#"{"event":"task:cancelled","payload":{"taskId":"t2"}}"#,
    ]
    .join("\n");
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&server)
        .await;

    let handle: Handle = BridgeHandle::new(&settings(&server)).unwrap();
    handle.subscribe_events();
    let replies = collect_until_closed(handle).await;

    let events: Vec<BackendEvent> = replies
        .iter()
        .filter_map(|reply| match reply {
            BridgeReply::Events(events) => Some(events.clone()),
            _ => None,
        })
        .flatten()
        .collect();
    assert_eq!(
        events,
        vec![
            BackendEvent::TaskCancelled {
                task_id: "t1".into()
            },
            BackendEvent::TaskCancelled {
                task_id: "t2".into()
            },
        ]
    );
    assert_eq!(replies.last(), Some(&BridgeReply::EventStreamClosed(None)));
}
