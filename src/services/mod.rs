/// Outbound REST gateway for operator actions.
pub mod gateway;
/// Server-Sent Events wire format parsing.
pub mod sse;
/// Event stream subscription and reconnect handling.
pub mod stream;
