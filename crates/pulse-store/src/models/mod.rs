//! Database models with SQLx `FromRow` derives

mod message;
mod principal;

pub use message::MessageModel;
pub use principal::PrincipalModel;
