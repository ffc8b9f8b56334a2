//! Off-thread processing of event and task batches.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use kb_logging::kb_warn;

const THREAD_NAME: &str = "kb-batch";

type Slot<T> = Arc<Mutex<Option<T>>>;
type Task = Box<dyn FnOnce() + Send>;

fn take<T>(slot: &Slot<T>) -> Option<T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}

/// Runs `process` over `items` on a fresh thread and hands the result to `callback`.
///
/// The thread owns the batch outright. When no thread can be spawned the work
/// runs synchronously on the caller's thread instead, and `None` is returned.
pub fn process_in_background<T, U, P, C>(
    items: Vec<T>,
    process: P,
    callback: C,
) -> Option<JoinHandle<()>>
where
    T: Send + 'static,
    P: FnOnce(Vec<T>) -> U + Send + 'static,
    C: FnOnce(U) + Send + 'static,
{
    run_batch(items, process, callback, |task| {
        thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(task)
    })
}

fn run_batch<T, U, P, C, S>(items: Vec<T>, process: P, callback: C, spawn: S) -> Option<JoinHandle<()>>
where
    T: Send + 'static,
    P: FnOnce(Vec<T>) -> U + Send + 'static,
    C: FnOnce(U) + Send + 'static,
    S: FnOnce(Task) -> io::Result<JoinHandle<()>>,
{
    let job: Slot<(Vec<T>, P, C)> = Arc::new(Mutex::new(Some((items, process, callback))));
    let for_thread = Arc::clone(&job);

    let spawned = spawn(Box::new(move || {
        if let Some((items, process, callback)) = take(&for_thread) {
            callback(process(items));
        }
    }));

    match spawned {
        Ok(handle) => Some(handle),
        Err(err) => {
            kb_warn!("batch thread unavailable, processing inline: {}", err);
            if let Some((items, process, callback)) = take(&job) {
                callback(process(items));
            }
            None
        }
    }
}
