//! WebSocket close codes

use serde::{Deserialize, Serialize};

/// Gateway-specific WebSocket close codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Unknown error occurred
    UnknownError = 4000,
    /// Unrecognized event name
    UnknownEvent = 4001,
    /// Invalid payload encoding (JSON decode error)
    DecodeError = 4002,
    /// Invalid or expired token at handshake
    AuthenticationFailed = 4004,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            4000 => Some(Self::UnknownError),
            4001 => Some(Self::UnknownEvent),
            4002 => Some(Self::DecodeError),
            4004 => Some(Self::AuthenticationFailed),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Check if the client should attempt to reconnect after this close code
    #[must_use]
    pub const fn should_reconnect(self) -> bool {
        !matches!(self, Self::AuthenticationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for code in [
            CloseCode::UnknownError,
            CloseCode::UnknownEvent,
            CloseCode::DecodeError,
            CloseCode::AuthenticationFailed,
        ] {
            assert_eq!(CloseCode::from_u16(code.as_u16()), Some(code));
        }
        assert_eq!(CloseCode::from_u16(1000), None);
    }

    #[test]
    fn test_auth_failure_is_terminal() {
        assert!(!CloseCode::AuthenticationFailed.should_reconnect());
        assert!(CloseCode::UnknownError.should_reconnect());
    }
}
