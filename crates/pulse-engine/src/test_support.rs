//! In-memory fakes and helpers shared by the engine's unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use pulse_core::{
    DomainError, MessageId, MessageRecord, MessageRepository, NewMessage, Principal, PrincipalId,
    PrincipalRepository, RepoResult, RoomId, RoomRepository, SenderSummary, ServerEvent,
};

use crate::connection::Connection;
use crate::registry::ConnectionRegistry;

/// Register a fresh connection for a principal, keeping the receive side
pub fn connected(
    registry: &ConnectionRegistry,
    principal_id: PrincipalId,
) -> (Arc<Connection>, mpsc::Receiver<ServerEvent>) {
    let (tx, rx) = mpsc::channel(32);
    let conn = Connection::new(principal_id, tx);
    registry.register(conn.clone()).unwrap();
    (conn, rx)
}

/// Drain all queued events from a connection's receive side
pub fn drain(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn summary_for(id: PrincipalId) -> SenderSummary {
    SenderSummary {
        id,
        handle: format!("user-{id}"),
        display_name: format!("User {id}"),
    }
}

/// In-memory principal store recording presence writes
#[derive(Default)]
pub struct MemoryPrincipalRepository {
    principals: Mutex<HashMap<PrincipalId, Principal>>,
    presence_writes: Mutex<Vec<(PrincipalId, bool)>>,
    fail_writes: AtomicBool,
}

impl MemoryPrincipalRepository {
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, principal: Principal) {
        self.principals
            .lock()
            .unwrap()
            .insert(principal.id, principal);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn presence_writes(&self) -> Vec<(PrincipalId, bool)> {
        self.presence_writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl PrincipalRepository for MemoryPrincipalRepository {
    async fn find_by_id(&self, id: PrincipalId) -> RepoResult<Option<Principal>> {
        Ok(self.principals.lock().unwrap().get(&id).cloned())
    }

    async fn set_presence(
        &self,
        id: PrincipalId,
        online: bool,
        last_seen: DateTime<Utc>,
    ) -> RepoResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("injected failure".to_string()));
        }

        self.presence_writes.lock().unwrap().push((id, online));
        if let Some(p) = self.principals.lock().unwrap().get_mut(&id) {
            p.is_online = online;
            p.last_seen = Some(last_seen);
        }
        Ok(())
    }
}

/// In-memory room membership store
#[derive(Default)]
pub struct MemoryRoomRepository {
    members: Mutex<HashMap<RoomId, Vec<PrincipalId>>>,
}

impl MemoryRoomRepository {
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

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
impl RoomRepository for MemoryRoomRepository {
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

/// In-memory message store with injectable write failure
#[derive(Default)]
pub struct MemoryMessageRepository {
    messages: Mutex<HashMap<MessageId, MessageRecord>>,
    fail_writes: AtomicBool,
}

impl MemoryMessageRepository {
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageRepository for MemoryMessageRepository {
    async fn create(&self, message: &NewMessage) -> RepoResult<MessageRecord> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("injected failure".to_string()));
        }

        let record = MessageRecord {
            id: MessageId::generate(),
            sender: summary_for(message.sender_id),
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

/// Event name helper for assertions
pub fn names(events: &[ServerEvent]) -> Vec<&'static str> {
    events.iter().map(ServerEvent::name).collect()
}
