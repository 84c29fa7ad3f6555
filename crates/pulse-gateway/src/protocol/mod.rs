//! Wire protocol
//!
//! Client-to-server events and gateway close codes. Server-to-client
//! events are `pulse_core::ServerEvent`, shared with the engine.

mod close_codes;
mod messages;

pub use close_codes::CloseCode;
pub use messages::{
    ClientEvent, MarkReadPayload, RoomMessagePayload, RoomPayload, SendDirectMessagePayload,
    TypingPayload,
};
