//! # Session Registry
//!
//! One slot per user with a live survey session, shared by every server.
//! Holding a slot is what makes a session "live"; the answer queue for the
//! session hangs off the slot.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

use crate::domain::types::Answer;

struct SessionSlot {
    private_channel: Option<String>,
    answers: mpsc::UnboundedSender<Answer>,
}

#[derive(Default)]
pub struct SessionRegistry {
    slots: Mutex<HashMap<String, SessionSlot>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, SessionSlot>> {
        match self.slots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Claims the user's slot. Returns `None` if the user already has a live session.
    pub fn reserve(&self, user_id: &str) -> Option<mpsc::UnboundedReceiver<Answer>> {
        let mut slots = self.slots();
        if slots.contains_key(user_id) {
            return None;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        slots.insert(
            user_id.to_string(),
            SessionSlot {
                private_channel: None,
                answers: tx,
            },
        );
        Some(rx)
    }

    /// Records where the user's answers are expected to arrive.
    pub fn bind_channel(&self, user_id: &str, channel_id: &str) {
        if let Some(slot) = self.slots().get_mut(user_id) {
            slot.private_channel = Some(channel_id.to_string());
        }
    }

    pub fn release(&self, user_id: &str) {
        self.slots().remove(user_id);
    }

    #[cfg(test)]
    pub fn is_active(&self, user_id: &str) -> bool {
        self.slots().contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    /// Hands a qualifying message from the user's private channel to their session.
    /// Returns whether the message was consumed.
    pub fn offer(&self, user_id: &str, channel_id: &str, answer: Answer) -> bool {
        if !answer.qualifies() {
            return false;
        }
        let slots = self.slots();
        match slots.get(user_id) {
            Some(slot) if slot.private_channel.as_deref() == Some(channel_id) => {
                slot.answers.send(answer).is_ok()
            }
            _ => false,
        }
    }
}

/// Releases the user's slot when dropped, however the session ends.
pub struct SlotGuard {
    registry: Arc<SessionRegistry>,
    user_id: String,
}

impl SlotGuard {
    pub fn new(registry: Arc<SessionRegistry>, user_id: impl Into<String>) -> Self {
        Self {
            registry,
            user_id: user_id.into(),
        }
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.registry.release(&self.user_id);
    }
}
