//! Principal entity - an authenticated user identity

use crate::ids::PrincipalId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated user identity
///
/// Immutable once created, referenced by id everywhere else. The real-time
/// core only ever writes the two presence fields (`is_online`, `last_seen`);
/// everything else is owned by the account service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Unique identifier
    pub id: PrincipalId,
    /// Unique handle (login name)
    pub handle: String,
    /// Human-readable display name
    pub display_name: String,
    /// Derived presence flag (true iff at least one live connection)
    pub is_online: bool,
    /// Last time the principal went offline (None if never connected)
    pub last_seen: Option<DateTime<Utc>>,
}

impl Principal {
    /// Create a new principal with presence defaults
    #[must_use]
    pub fn new(id: PrincipalId, handle: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            handle: handle.into(),
            display_name: display_name.into(),
            is_online: false,
            last_seen: None,
        }
    }

    /// The compact identity shape attached to outbound events
    #[must_use]
    pub fn summary(&self) -> SenderSummary {
        SenderSummary {
            id: self.id,
            handle: self.handle.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// Compact principal identity embedded in delivered events
///
/// Clients render messages and typing indicators from this alone, without a
/// follow-up profile fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderSummary {
    /// Principal id
    pub id: PrincipalId,
    /// Unique handle
    pub handle: String,
    /// Display name
    pub display_name: String,
}
