//! In-memory fakes and helpers for handler tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use pulse_common::JwtVerifier;
use pulse_core::{
    DomainError, MessageId, MessageRecord, MessageRepository, NewMessage, Principal, PrincipalId,
    PrincipalRepository, RepoResult, RoomId, RoomRepository, ServerEvent,
};
use pulse_engine::{Connection, RealtimeHub};

use crate::server::GatewayState;

pub fn drain(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn names(events: &[ServerEvent]) -> Vec<&'static str> {
    events.iter().map(ServerEvent::name).collect()
}

#[derive(Default)]
pub struct FakePrincipalRepository {
    principals: Mutex<HashMap<PrincipalId, Principal>>,
}

impl FakePrincipalRepository {
    pub fn insert(&self, principal: Principal) {
        self.principals
            .lock()
            .unwrap()
            .insert(principal.id, principal);
    }
}

#[async_trait]
impl PrincipalRepository for FakePrincipalRepository {
    async fn find_by_id(&self, id: PrincipalId) -> RepoResult<Option<Principal>> {
        Ok(self.principals.lock().unwrap().get(&id).cloned())
    }

    async fn set_presence(
        &self,
        id: PrincipalId,
        online: bool,
        last_seen: DateTime<Utc>,
    ) -> RepoResult<()> {
        if let Some(p) = self.principals.lock().unwrap().get_mut(&id) {
            p.is_online = online;
            p.last_seen = Some(last_seen);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeRoomRepository {
    members: Mutex<HashMap<RoomId, Vec<PrincipalId>>>,
}

impl FakeRoomRepository {
    pub fn add_member(&self, room_id: RoomId, principal_id: PrincipalId) {
        self.members
            .lock()
            .unwrap()
            .entry(room_id)
            .or_default()
            .push(principal_id);
    }
}

#[async_trait]
impl RoomRepository for FakeRoomRepository {
    async fn is_member(&self, room_id: RoomId, principal_id: PrincipalId) -> RepoResult<bool> {
        Ok(self
            .members
            .lock()
            .unwrap()
            .get(&room_id)
            .is_some_and(|m| m.contains(&principal_id)))
    }

    async fn member_ids(&self, room_id: RoomId) -> RepoResult<Vec<PrincipalId>> {
        Ok(self
            .members
            .lock()
            .unwrap()
            .get(&room_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeMessageRepository {
    messages: Mutex<HashMap<MessageId, MessageRecord>>,
    principals: Mutex<HashMap<PrincipalId, Principal>>,
    fail_writes: AtomicBool,
}

impl FakeMessageRepository {
    pub fn register_sender(&self, principal: Principal) {
        self.principals
            .lock()
            .unwrap()
            .insert(principal.id, principal);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn insert_record(&self, record: MessageRecord) {
        self.messages
            .lock()
            .unwrap()
            .insert(record.id, record);
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageRepository for FakeMessageRepository {
    async fn create(&self, message: &NewMessage) -> RepoResult<MessageRecord> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("injected failure".to_string()));
        }

        let sender = self
            .principals
            .lock()
            .unwrap()
            .get(&message.sender_id)
            .map(Principal::summary)
            .ok_or(DomainError::PrincipalNotFound(message.sender_id))?;

        let record = MessageRecord {
            id: MessageId::generate(),
            sender,
            target: message.target,
            content: message.content.clone(),
            created_at: Utc::now(),
            is_read: false,
        };
        self.messages
            .lock()
            .unwrap()
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: MessageId) -> RepoResult<Option<MessageRecord>> {
        Ok(self.messages.lock().unwrap().get(&id).cloned())
    }

    async fn mark_read(&self, id: MessageId, reader_id: PrincipalId) -> RepoResult<bool> {
        let mut messages = self.messages.lock().unwrap();
        let Some(record) = messages.get_mut(&id) else {
            return Ok(false);
        };
        if record.target.receiver_id() != Some(reader_id) || record.is_read {
            return Ok(false);
        }
        record.is_read = true;
        Ok(true)
    }
}

/// Everything a handler test needs, wired through real hub plumbing
pub struct TestGateway {
    pub state: GatewayState,
    pub principals: Arc<FakePrincipalRepository>,
    pub rooms: Arc<FakeRoomRepository>,
    pub messages: Arc<FakeMessageRepository>,
}

pub fn test_gateway() -> TestGateway {
    let principals = Arc::new(FakePrincipalRepository::default());
    let rooms = Arc::new(FakeRoomRepository::default());
    let messages = Arc::new(FakeMessageRepository::default());

    let hub = Arc::new(RealtimeHub::new(principals.clone(), rooms.clone()));

    let config = pulse_common::AppConfig {
        app: pulse_common::AppSettings {
            name: "pulse-test".to_string(),
            env: pulse_common::Environment::Development,
        },
        server: pulse_common::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: pulse_common::DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        jwt: pulse_common::JwtConfig {
            secret: "test-secret".to_string(),
        },
        cors: pulse_common::CorsConfig {
            allowed_origins: Vec::new(),
        },
    };

    let state = GatewayState::new(
        hub,
        principals.clone(),
        rooms.clone(),
        messages.clone(),
        Arc::new(JwtVerifier::new("test-secret")),
        config,
    );

    TestGateway {
        state,
        principals,
        rooms,
        messages,
    }
}

/// Connect a principal with a known identity, returning the connection and
/// its receive side
pub async fn join(
    gateway: &TestGateway,
    handle: &str,
) -> (Arc<Connection>, PrincipalId, mpsc::Receiver<ServerEvent>) {
    let principal = Principal::new(PrincipalId::generate(), handle, handle);
    let principal_id = principal.id;
    gateway.principals.insert(principal.clone());
    gateway.messages.register_sender(principal);

    let (tx, mut rx) = mpsc::channel(64);
    let conn = gateway.state.hub().connect(principal_id, tx).await.unwrap();
    drain(&mut rx);
    (conn, principal_id, rx)
}
