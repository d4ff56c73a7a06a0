//! Failure taxonomy for the console engine.
//!
//! Nothing here is fatal to the process: decode failures drop a single event,
//! gateway failures are reported to the operator, and transport failures are
//! absorbed by the reconnect loop.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while decoding an inbound stream event payload.
///
/// A decode failure is isolated to the offending event; the subscription and
/// the view model are left untouched.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The server sent an event name this console does not know about.
    #[error("unknown event type: {0}")]
    UnknownEvent(String),
    /// The payload did not match the expected shape for its event type.
    #[error("malformed `{event}` payload: {source}")]
    Payload {
        /// Name of the event whose payload failed to decode.
        event: &'static str,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// A `timeLeft` value was neither a number nor a decimal string.
    #[error("invalid timeLeft value: {0}")]
    TimeLeft(String),
}

impl DecodeError {
    pub(crate) fn payload(event: &'static str, source: serde_json::Error) -> Self {
        Self::Payload { event, source }
    }
}

/// Errors raised by outbound command gateway requests.
///
/// Gateway failures never mutate local state; the next inbound event is the
/// only thing that does.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never completed (connection refused, timeout, ...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("{action} rejected with status {status}")]
    Rejected {
        /// Human-readable name of the attempted operation.
        action: &'static str,
        /// HTTP status the server answered with.
        status: StatusCode,
    },
    /// A success response carried a body that could not be decoded.
    #[error("{action} returned an unreadable body: {source}")]
    Body {
        /// Human-readable name of the attempted operation.
        action: &'static str,
        /// Underlying decode error.
        source: reqwest::Error,
    },
}
