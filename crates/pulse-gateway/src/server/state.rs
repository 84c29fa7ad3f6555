//! Gateway state
//!
//! Shared dependencies for the gateway server.

use std::sync::Arc;

use pulse_common::{AppConfig, JwtVerifier};
use pulse_core::{MessageRepository, PrincipalRepository, RoomRepository};
use pulse_engine::RealtimeHub;

/// Gateway application state
#[derive(Clone)]
pub struct GatewayState {
    /// The composed real-time core
    hub: Arc<RealtimeHub>,
    /// Principal lookups (sender summaries, presence reads)
    principals: Arc<dyn PrincipalRepository>,
    /// Room membership authorization
    rooms: Arc<dyn RoomRepository>,
    /// Durable message store
    messages: Arc<dyn MessageRepository>,
    /// Bearer-token verifier
    verifier: Arc<JwtVerifier>,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl GatewayState {
    /// Create a new gateway state
    pub fn new(
        hub: Arc<RealtimeHub>,
        principals: Arc<dyn PrincipalRepository>,
        rooms: Arc<dyn RoomRepository>,
        messages: Arc<dyn MessageRepository>,
        verifier: Arc<JwtVerifier>,
        config: AppConfig,
    ) -> Self {
        Self {
            hub,
            principals,
            rooms,
            messages,
            verifier,
            config: Arc::new(config),
        }
    }

    /// Get the real-time hub
    pub fn hub(&self) -> &RealtimeHub {
        &self.hub
    }

    /// Get the principal repository
    pub fn principals(&self) -> &Arc<dyn PrincipalRepository> {
        &self.principals
    }

    /// Get the room repository
    pub fn rooms(&self) -> &Arc<dyn RoomRepository> {
        &self.rooms
    }

    /// Get the message repository
    pub fn messages(&self) -> &Arc<dyn MessageRepository> {
        &self.messages
    }

    /// Get the token verifier
    pub fn verifier(&self) -> &JwtVerifier {
        &self.verifier
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("hub", &self.hub)
            .finish()
    }
}
