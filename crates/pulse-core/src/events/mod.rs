//! Server-to-client events

mod server_event;

pub use server_event::{ActivityCause, ServerEvent};
