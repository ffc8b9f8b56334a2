use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use kb_core::{dedupe_events, BackendEvent};
use kb_logging::{kb_debug, kb_error, kb_info};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::batch::process_in_background;
use crate::events::{EventSink, EventStream};
use crate::http::{BridgeSettings, HttpBackend};
use crate::{Backend, BridgeError};

pub type BoxFuture<R> = Pin<Box<dyn Future<Output = R> + Send + 'static>>;
type Job<R> = Box<dyn FnOnce(Arc<dyn Backend>) -> BoxFuture<R> + Send>;

/// What the worker thread sends back to the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeReply<R> {
    /// Result of a job submitted through [`BridgeHandle::run`].
    Completed(R),
    /// A deduplicated batch from the event stream.
    Events(Vec<BackendEvent>),
    EventStreamClosed(Option<String>),
}

enum BridgeCommand<R> {
    Run(Job<R>),
    Subscribe,
    Unsubscribe,
}

/// Forwards event batches to the reply channel after deduplicating them off-thread.
///
/// Each batch waits for the previous one so replies keep stream order.
pub struct ChannelEventSink<R> {
    tx: mpsc::Sender<BridgeReply<R>>,
    previous: Mutex<Option<JoinHandle<()>>>,
}

impl<R> ChannelEventSink<R> {
    pub fn new(tx: mpsc::Sender<BridgeReply<R>>) -> Self {
        Self {
            tx,
            previous: Mutex::new(None),
        }
    }
}

impl<R> ChannelEventSink<R> {
    /// Waits until every delivered batch has been forwarded.
    pub fn flush(&self) {
        let previous = self
            .previous
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(previous) = previous {
            let _ = previous.join();
        }
    }
}

impl<R: Send + 'static> EventSink for ChannelEventSink<R> {
    fn deliver(&self, events: Vec<BackendEvent>) {
        let tx = self.tx.clone();
        let mut previous = self.previous.lock().unwrap_or_else(PoisonError::into_inner);
        let before = previous.take();
        *previous = process_in_background(events, dedupe_events, move |deduped| {
            if let Some(before) = before {
                let _ = before.join();
            }
            if !deduped.is_empty() {
                let _ = tx.send(BridgeReply::Events(deduped));
            }
        });
    }
}

/// Worker thread that owns a tokio runtime and talks to the backend.
///
/// Submitted jobs run concurrently and are never cancelled once sent.
pub struct BridgeHandle<R> {
    cmd_tx: mpsc::Sender<BridgeCommand<R>>,
    reply_rx: mpsc::Receiver<BridgeReply<R>>,
    pending: Arc<AtomicUsize>,
}

impl<R: Send + 'static> BridgeHandle<R> {
    pub fn new(settings: &BridgeSettings) -> Result<Self, BridgeError> {
        let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(settings)?);
        let events = EventStream::new(settings)?;
        Self::with_backend(backend, Some(events))
    }

    /// Uses a caller-supplied backend; without `events` subscriptions close at once.
    pub fn with_backend(
        backend: Arc<dyn Backend>,
        events: Option<EventStream>,
    ) -> Result<Self, BridgeError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("kb-bridge-rt")
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (reply_tx, reply_rx) = mpsc::channel();
        let pending = Arc::new(AtomicUsize::new(0));

        let worker = Worker {
            runtime,
            backend,
            events,
            reply_tx,
            pending: Arc::clone(&pending),
            subscription: None,
        };
        thread::Builder::new()
            .name("kb-bridge".to_string())
            .spawn(move || worker.serve(cmd_rx))?;

        Ok(Self {
            cmd_tx,
            reply_rx,
            pending,
        })
    }

    /// Submits a job; its output arrives later as [`BridgeReply::Completed`].
    pub fn run<F, Fut>(&self, job: F)
    where
        F: FnOnce(Arc<dyn Backend>) -> Fut + Send + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let job: Job<R> = Box::new(move |backend| Box::pin(job(backend)) as BoxFuture<R>);
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.cmd_tx.send(BridgeCommand::Run(job)).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            kb_error!("bridge worker has stopped; job dropped");
        }
    }

    pub fn subscribe_events(&self) {
        let _ = self.cmd_tx.send(BridgeCommand::Subscribe);
    }

    pub fn unsubscribe_events(&self) {
        let _ = self.cmd_tx.send(BridgeCommand::Unsubscribe);
    }

    pub fn try_recv(&self) -> Option<BridgeReply<R>> {
        self.reply_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<BridgeReply<R>> {
        self.reply_rx.recv_timeout(timeout).ok()
    }

    /// Jobs whose reply has not been sent yet.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

struct Worker<R> {
    runtime: Runtime,
    backend: Arc<dyn Backend>,
    events: Option<EventStream>,
    reply_tx: mpsc::Sender<BridgeReply<R>>,
    pending: Arc<AtomicUsize>,
    subscription: Option<CancellationToken>,
}

impl<R: Send + 'static> Worker<R> {
    fn serve(mut self, cmd_rx: mpsc::Receiver<BridgeCommand<R>>) {
        while let Ok(command) = cmd_rx.recv() {
            match command {
                BridgeCommand::Run(job) => self.spawn_job(job),
                BridgeCommand::Subscribe => self.subscribe(),
                BridgeCommand::Unsubscribe => self.unsubscribe(),
            }
        }
        kb_debug!("bridge handle dropped, shutting down worker");
        self.unsubscribe();
        self.runtime.shutdown_timeout(Duration::from_secs(1));
    }

    fn spawn_job(&self, job: Job<R>) {
        let future = job(Arc::clone(&self.backend));
        let reply_tx = self.reply_tx.clone();
        let pending = Arc::clone(&self.pending);
        self.runtime.spawn(async move {
            let output = future.await;
            let _ = reply_tx.send(BridgeReply::Completed(output));
            pending.fetch_sub(1, Ordering::SeqCst);
        });
    }

    fn subscribe(&mut self) {
        if self
            .subscription
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
        {
            return;
        }
        let Some(stream) = self.events.clone() else {
            let _ = self.reply_tx.send(BridgeReply::EventStreamClosed(Some(
                "no event stream configured".to_string(),
            )));
            return;
        };

        let token = CancellationToken::new();
        self.subscription = Some(token.clone());
        let reply_tx = self.reply_tx.clone();
        self.runtime.spawn(async move {
            let sink = ChannelEventSink::new(reply_tx.clone());
            let reason = match stream.run(&sink, &token).await {
                Ok(()) if token.is_cancelled() => return,
                Ok(()) => None,
                Err(err) => Some(err.to_string()),
            };
            kb_info!("event stream closed: {:?}", reason);
            token.cancel();
            tokio::task::block_in_place(|| sink.flush());
            let _ = reply_tx.send(BridgeReply::EventStreamClosed(reason));
        });
    }

    fn unsubscribe(&mut self) {
        if let Some(token) = self.subscription.take() {
            token.cancel();
        }
    }
}
