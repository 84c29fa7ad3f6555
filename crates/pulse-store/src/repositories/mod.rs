//! Repository implementations

mod error;
mod message;
mod principal;
mod room;

pub use message::PgMessageRepository;
pub use principal::PgPrincipalRepository;
pub use room::PgRoomRepository;
