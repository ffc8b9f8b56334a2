use bytes::{Buf, BytesMut};
use futures_util::StreamExt;
use kb_core::BackendEvent;
use kb_logging::{kb_debug, kb_info, kb_warn};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::http::{parse_base_url, BridgeSettings};
use crate::BridgeError;

/// Receives decoded event batches from an [`EventStream`].
pub trait EventSink: Send + Sync {
    fn deliver(&self, events: Vec<BackendEvent>);
}

/// One line of the event stream: `{"event": "...", "payload": {...}}`.
#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    payload: serde_json::Value,
}

fn decode_line(line: &[u8]) -> Option<BackendEvent> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return None;
    }
    let envelope: Envelope = match serde_json::from_slice(line) {
        Ok(envelope) => envelope,
        Err(err) => {
            kb_warn!("skipping malformed event line: {}", err);
            return None;
        }
    };
    let name = envelope.event.clone();
    let tagged = serde_json::json!({ "event": envelope.event, "payload": envelope.payload });
    match serde_json::from_value(tagged) {
        Ok(event) => Some(event),
        Err(err) => {
            kb_debug!("ignoring event {}: {}", name, err);
            None
        }
    }
}

/// Splits newline-delimited JSON into events, carrying partial lines over.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: BytesMut,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes every complete line in `chunk`; an incomplete tail is kept.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<BackendEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line = self.buffer.split_to(newline);
            self.buffer.advance(1);
            events.extend(decode_line(&line));
        }
        events
    }

    /// Decodes whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Vec<BackendEvent> {
        let rest = self.buffer.split();
        decode_line(&rest).into_iter().collect()
    }
}

/// Long-lived subscription to `GET {base}/events`.
#[derive(Debug, Clone)]
pub struct EventStream {
    client: reqwest::Client,
    url: Url,
}

impl EventStream {
    /// The stream only has a connect timeout; it is expected to stay open.
    pub fn new(settings: &BridgeSettings) -> Result<Self, BridgeError> {
        let base = parse_base_url(&settings.base_url)?;
        let url = base.join("events").map_err(|err| BridgeError::InvalidBaseUrl {
            url: settings.base_url.clone(),
            reason: err.to_string(),
        })?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| BridgeError::Transport {
                command: "events".to_string(),
                message: err.to_string(),
            })?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Reads until the server closes the stream or `cancel` fires.
    pub async fn run(
        &self,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<(), BridgeError> {
        let request = self.client.get(self.url.clone()).send();
        let Some(response) = cancel.run_until_cancelled(request).await else {
            return Ok(());
        };
        let response = response.map_err(|err| BridgeError::from_reqwest("events", err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::Backend {
                status: status.as_u16(),
                message: format!("event stream refused: {status}"),
            });
        }
        kb_info!("subscribed to {}", self.url);

        let mut decoder = NdjsonDecoder::new();
        let mut stream = response.bytes_stream();
        loop {
            let Some(next) = cancel.run_until_cancelled(stream.next()).await else {
                kb_debug!("event stream cancelled");
                return Ok(());
            };
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk.map_err(|err| BridgeError::from_reqwest("events", err))?;
            let events = decoder.push(&chunk);
            if !events.is_empty() {
                sink.deliver(events);
            }
        }

        let rest = decoder.finish();
        if !rest.is_empty() {
            sink.deliver(rest);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_lines_wait_for_the_newline() {
        let mut decoder = NdjsonDecoder::new();
        let line = br#"{"event":"task:cancelled","payload":{"taskId":"t1"}}"#;
        assert!(decoder.push(&line[..10]).is_empty());
        let events = decoder.push(&[&line[10..], b"\n".as_slice()].concat());
        assert_eq!(
            events,
            vec![BackendEvent::TaskCancelled {
                task_id: "t1".into()
            }]
        );
    }

    #[test]
    fn malformed_and_unknown_lines_are_skipped() {
        let mut decoder = NdjsonDecoder::new();
        let input = b"not json\n{\"event\":\"mystery\",\"payload\":{}}\n\n{\"event\":\"task:cancelled\",\"payload\":{\"taskId\":\"t2\"}}";
        let events = decoder.push(input);
        assert!(events.is_empty());
        assert_eq!(
            decoder.finish(),
            vec![BackendEvent::TaskCancelled {
                task_id: "t2".into()
            }]
        );
    }
}
