use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid backend url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("request to {command} timed out")]
    Timeout { command: String },
    #[error("transport error calling {command}: {message}")]
    Transport { command: String, message: String },
    /// The backend answered with a non-success status; `message` is its own text.
    #[error("{message}")]
    Backend { status: u16, message: String },
    #[error("could not decode {command} response: {message}")]
    Decode { command: String, message: String },
    #[error("could not encode {command} arguments: {source}")]
    Encode {
        command: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("bridge worker unavailable: {0}")]
    Worker(#[from] io::Error),
}

impl BridgeError {
    pub(crate) fn from_reqwest(command: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return BridgeError::Timeout {
                command: command.to_string(),
            };
        }
        BridgeError::Transport {
            command: command.to_string(),
            message: err.to_string(),
        }
    }
}
