//! # pulse-engine
//!
//! The real-time core: an in-process registry of live connections, derived
//! presence, channel routing, message fan-out, and ephemeral signal relay.
//!
//! ## Architecture
//!
//! - [`ConnectionRegistry`] - authoritative map between principals and their
//!   live connections (leaf component)
//! - [`PresenceTracker`] - turns registry transitions into durable presence
//!   writes and online/offline broadcasts
//! - [`ChannelRouter`] - binds connections to broadcast channels and answers
//!   the reverse lookup
//! - [`FanoutEngine`] - delivers durably-persisted messages to resolved
//!   connections with sender confirmation
//! - [`SignalRelay`] - routes typing indicators and read receipts through
//!   the same channel addressing, with no persistence
//! - [`RealtimeHub`] - composes the above behind the connection lifecycle
//!
//! Registry and router mutations are synchronous and never suspend; every
//! persistence call happens before or after touching the in-memory maps,
//! never in between.

pub mod connection;
pub mod fanout;
pub mod hub;
pub mod presence;
pub mod registry;
pub mod relay;
pub mod router;

#[cfg(test)]
pub(crate) mod test_support;

pub use connection::Connection;
pub use fanout::{DeliveryObserver, FanoutEngine, FanoutReport};
pub use hub::RealtimeHub;
pub use presence::PresenceTracker;
pub use registry::ConnectionRegistry;
pub use relay::{SignalRelay, TypingTarget};
pub use router::ChannelRouter;
