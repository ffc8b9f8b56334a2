use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use kb_bridge::{BridgeReply, BridgeSettings, ChannelEventSink, EventSink, EventStream};
use kb_core::{BackendEvent, CrawlEvent};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct CollectingSink {
    batches: Arc<Mutex<Vec<Vec<BackendEvent>>>>,
}

impl EventSink for CollectingSink {
    fn deliver(&self, events: Vec<BackendEvent>) {
        self.batches.lock().unwrap().push(events);
    }
}

fn settings(server: &MockServer) -> BridgeSettings {
    BridgeSettings {
        base_url: server.uri(),
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(2),
    }
}

#[tokio::test]
async fn ndjson_body_becomes_events() {
    let server = MockServer::start().await;
    let url_id = Uuid::new_v4();
    let status_line = format!(
        r#"{{"event":"url:status:updated","payload":{{"urlId":"{url_id}","status":"crawled"}}}}"#
    );
    let body = [
        r#"{"event":"task:updated","payload":{"taskId":"t1","progress":40,"status":"running"}}"#,
        "not json",
        status_line.as_str(),
        r#"{"event":"crawl","payload":{"event":"urlDiscovered","data":{"url":"https://docs.rs/a"}}}"#,
    ]
    .join("\n");
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&server)
        .await;

    let stream = EventStream::new(&settings(&server)).unwrap();
    let sink = CollectingSink::default();
    stream
        .run(&sink, &CancellationToken::new())
        .await
        .expect("stream");

    let events: Vec<BackendEvent> = sink.batches.lock().unwrap().concat();
    assert_eq!(
        events,
        vec![
            BackendEvent::TaskUpdated {
                task_id: "t1".into(),
                progress: 40.0,
                status: "running".into(),
                stages: None,
            },
            BackendEvent::UrlStatusUpdated {
                url_id,
                status: "crawled".into(),
            },
            BackendEvent::Crawl(CrawlEvent::UrlDiscovered {
                task_id: None,
                url: "https://docs.rs/a".into(),
            }),
        ]
    );
}

#[tokio::test]
async fn refused_subscription_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let stream = EventStream::new(&settings(&server)).unwrap();
    let result = stream
        .run(&CollectingSink::default(), &CancellationToken::new())
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn cancelled_token_stops_before_connecting() {
    let server = MockServer::start().await;
    let stream = EventStream::new(&settings(&server)).unwrap();
    let token = CancellationToken::new();
    token.cancel();

    stream
        .run(&CollectingSink::default(), &token)
        .await
        .expect("cancelled run is not an error");
}

#[test]
fn channel_sink_dedupes_and_keeps_batch_order() {
    let (tx, rx) = mpsc::channel::<BridgeReply<()>>();
    let sink = ChannelEventSink::new(tx);
    let update = |progress: f32| BackendEvent::TaskUpdated {
        task_id: "t1".into(),
        progress,
        status: "running".into(),
        stages: None,
    };

    sink.deliver(vec![update(10.0), update(20.0)]);
    sink.deliver(vec![update(30.0)]);
    sink.flush();

    let replies: Vec<BridgeReply<()>> = rx.try_iter().collect();
    assert_eq!(
        replies,
        vec![
            BridgeReply::Events(vec![update(20.0)]),
            BridgeReply::Events(vec![update(30.0)]),
        ]
    );
}
