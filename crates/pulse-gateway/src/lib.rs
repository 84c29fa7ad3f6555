//! # pulse-gateway
//!
//! WebSocket gateway exposing the real-time core over axum. Clients
//! authenticate with a bearer token in the upgrade request, then exchange
//! JSON events (`{"event": "...", "data": {...}}`) over the socket.

pub mod handlers;
pub mod protocol;
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;

pub use server::{create_app, create_gateway_state, run, GatewayState};
