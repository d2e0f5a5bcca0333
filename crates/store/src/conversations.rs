//! Conversation store: append-only message threads.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use st_domain::error::{Error, Result};
use st_domain::model::{derive_title, now_millis, Conversation, Message, NewMessage, Role};
use st_domain::trace::TraceEvent;

use crate::snapshot::Snapshot;

const SNAPSHOT_FILE: &str = "conversations.json";

/// Parameters for [`ConversationStore::create`].
#[derive(Debug, Clone, Default)]
pub struct NewConversation {
    pub endpoint_id: String,
    pub title: String,
    pub domain_id: Option<String>,
    pub site_id: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Contract
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// All conversations, most recently updated first.
    async fn list(&self) -> Result<Vec<Conversation>>;
    async fn get(&self, id: &str) -> Result<Option<Conversation>>;
    async fn create(&self, new: NewConversation) -> Result<Conversation>;
    /// Append a message and bump `updated_at`.
    ///
    /// Fails with `NotFound` when the conversation is missing.  The first
    /// message, if it is from the user, also sets the title.
    async fn append_message(&self, conversation_id: &str, message: NewMessage) -> Result<Message>;
    /// Remove a conversation together with its messages.
    async fn delete(&self, id: &str) -> Result<bool>;

    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Conversations held in a map, optionally mirrored to `conversations.json`.
pub struct MemoryConversations {
    conversations: RwLock<HashMap<String, Conversation>>,
    snapshot: Option<Snapshot>,
    dirty: AtomicBool,
}

impl Default for MemoryConversations {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryConversations {
    pub fn new() -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            snapshot: None,
            dirty: AtomicBool::new(false),
        }
    }

    /// Load or create the store at `state_dir/conversations.json`.
    pub fn open(state_dir: &Path) -> Result<Self> {
        let snapshot = Snapshot::new(state_dir, SNAPSHOT_FILE)?;
        let list: Vec<Conversation> = snapshot.load()?.unwrap_or_default();
        let conversations: HashMap<String, Conversation> =
            list.into_iter().map(|c| (c.id.clone(), c)).collect();

        tracing::info!(
            conversations = conversations.len(),
            path = %snapshot.path().display(),
            "conversation store loaded"
        );

        Ok(Self {
            conversations: RwLock::new(conversations),
            snapshot: Some(snapshot),
            dirty: AtomicBool::new(false),
        })
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    fn sorted(&self) -> Vec<Conversation> {
        let mut list: Vec<Conversation> = self.conversations.read().values().cloned().collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        list
    }
}

#[async_trait]
impl ConversationStore for MemoryConversations {
    async fn list(&self) -> Result<Vec<Conversation>> {
        Ok(self.sorted())
    }

    async fn get(&self, id: &str) -> Result<Option<Conversation>> {
        Ok(self.conversations.read().get(id).cloned())
    }

    async fn create(&self, new: NewConversation) -> Result<Conversation> {
        let now = now_millis();
        let conversation = Conversation {
            id: uuid::Uuid::new_v4().to_string(),
            title: new.title,
            messages: Vec::new(),
            endpoint_id: new.endpoint_id,
            domain_id: new.domain_id,
            site_id: new.site_id,
            created_at: now,
            updated_at: now,
        };
        self.conversations
            .write()
            .insert(conversation.id.clone(), conversation.clone());
        self.mark_dirty();

        TraceEvent::ConversationCreated {
            conversation_id: conversation.id.clone(),
            endpoint_id: conversation.endpoint_id.clone(),
            domain_id: conversation.domain_id.clone(),
            site_id: conversation.site_id.clone(),
        }
        .emit();

        Ok(conversation)
    }

    async fn append_message(&self, conversation_id: &str, message: NewMessage) -> Result<Message> {
        let mut conversations = self.conversations.write();
        let conversation = conversations
            .get_mut(conversation_id)
            .ok_or_else(|| Error::not_found("conversation", conversation_id))?;

        // Timestamps never go backwards within a thread.
        let floor = conversation
            .last_timestamp()
            .unwrap_or(conversation.created_at);
        let timestamp = message.timestamp.max(floor);

        let appended = Message {
            id: uuid::Uuid::new_v4().to_string(),
            role: message.role,
            content: message.content,
            timestamp,
        };

        if conversation.messages.is_empty() && appended.role == Role::User {
            conversation.title = derive_title(&appended.content);
        }
        conversation.messages.push(appended.clone());
        conversation.updated_at = timestamp;
        let message_count = conversation.messages.len();
        drop(conversations);
        self.mark_dirty();

        TraceEvent::MessageAppended {
            conversation_id: conversation_id.to_owned(),
            role: appended.role.to_string(),
            message_count,
        }
        .emit();

        Ok(appended)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let Some(removed) = self.conversations.write().remove(id) else {
            return Ok(false);
        };
        self.mark_dirty();

        TraceEvent::ConversationDeleted {
            conversation_id: removed.id,
            messages: removed.messages.len(),
        }
        .emit();

        Ok(true)
    }

    async fn flush(&self) -> Result<()> {
        let Some(snapshot) = &self.snapshot else {
            return Ok(());
        };
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(());
        }
        let list = self.sorted();
        if let Err(e) = snapshot.write(&list) {
            self.mark_dirty();
            return Err(e);
        }
        TraceEvent::SnapshotFlushed {
            file: SNAPSHOT_FILE.into(),
            entries: list.len(),
        }
        .emit();
        Ok(())
    }
}
