//! Wire-level shapes exchanged with the arena server.

/// Inbound stream event payloads and their decoder.
pub mod event;
/// Outbound request bodies for the command gateway.
pub mod requests;
