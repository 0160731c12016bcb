use axum::extract::ws::Message;
use dashmap::DashMap;
use log::*;
use std::collections::HashSet;
use tokio::sync::mpsc::UnboundedSender;

// Type alias for member identities (web layer resolves users to member_id strings)
pub type MemberId = String;

/// Unique identifier for a live session (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Session information (no redundant session_id)
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub member_id: MemberId,
    pub sender: UnboundedSender<Message>,
}

/// Session registry with dual indices for O(1) lookups
pub struct SessionRegistry {
    /// Primary storage: lookup by session_id for registration/cleanup - O(1)
    sessions: DashMap<SessionId, SessionInfo>,

    /// Secondary index: fast lookup by member_id for event routing - O(1)
    member_index: DashMap<MemberId, HashSet<SessionId>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            member_index: DashMap::new(),
        }
    }

    /// Register a new session - O(1)
    pub fn register(&self, member_id: MemberId, sender: UnboundedSender<Message>) -> SessionId {
        let session_id = SessionId::new();

        // Insert into primary storage
        self.sessions.insert(
            session_id.clone(),
            SessionInfo {
                member_id: member_id.clone(),
                sender,
            },
        );

        // Update secondary index
        self.member_index
            .entry(member_id)
            .or_default()
            .insert(session_id.clone());

        session_id
    }

    /// Number of live sessions across all members.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Unregister a session - O(1). A no-op for ids that were already
    /// removed, so callers may unconditionally clean up.
    pub fn unregister(&self, session_id: &SessionId) {
        // Remove from primary storage
        if let Some((_, info)) = self.sessions.remove(session_id) {
            let member_id = info.member_id;

            // Update secondary index
            if let Some(mut entry) = self.member_index.get_mut(&member_id) {
                entry.remove(session_id);

                // Clean up empty member entries
                if entry.is_empty() {
                    drop(entry); // Release lock before removal
                    self.member_index.remove(&member_id);
                }
            }
        }
    }

    /// Route a frame to every session of one member - O(1) lookup + O(k)
    /// sends where k = the member's session count. Returns how many sessions
    /// the frame was handed to. Sessions whose channel has closed are pruned
    /// here; their siblings still receive the frame.
    pub fn send_to_member(&self, member_id: &str, message: Message) -> usize {
        let mut delivered = 0;
        let mut dead: Vec<SessionId> = Vec::new();

        if let Some(session_ids) = self.member_index.get(member_id) {
            for session_id in session_ids.iter() {
                if let Some(info) = self.sessions.get(session_id) {
                    if info.sender.send(message.clone()).is_ok() {
                        delivered += 1;
                    } else {
                        warn!(
                            "Failed to send event to session {}. Session will be cleaned up.",
                            session_id.as_str()
                        );
                        dead.push(session_id.clone());
                    }
                }
            }
        }

        // The member_index guard must be released before unregister touches
        // the same shard again
        for session_id in &dead {
            self.unregister(session_id);
        }

        delivered
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
