//! Domain entities

mod message;
mod principal;

pub use message::{MessageRecord, MessageTarget, NewMessage, MAX_CONTENT_LENGTH};
pub use principal::{Principal, SenderSummary};
