//! Ports to external collaborators

mod repositories;

pub use repositories::{MessageRepository, PrincipalRepository, RepoResult, RoomRepository};
