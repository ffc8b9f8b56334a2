//! Knowledge-base bridge: remote commands, the event stream and background helpers.
mod backend;
pub mod batch;
mod error;
mod events;
mod handle;
mod http;
mod state_file;

pub use backend::Backend;
pub use batch::process_in_background;
pub use error::BridgeError;
pub use events::{EventSink, EventStream, NdjsonDecoder};
pub use handle::{BoxFuture, BridgeHandle, BridgeReply, ChannelEventSink};
pub use http::{BridgeSettings, HttpBackend};
pub use state_file::{PersistError, StateFile};
