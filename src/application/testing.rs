//! Recording `ChatPlatform` used by the unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::domain::traits::ChatPlatform;
use crate::domain::types::Notice;

#[derive(Default)]
struct FakeState {
    /// server -> channels
    channels: HashMap<String, HashSet<String>>,
    /// (channel, message id)
    messages: HashSet<(String, String)>,
    sent: Vec<(String, Notice)>,
    reactions: Vec<(String, String, String)>,
    removed_reactions: Vec<String>,
    dm_disabled: HashSet<String>,
    failing_channels: HashSet<String>,
    reactions_blocked: bool,
}

#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<FakeState>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn add_channel(&self, server_id: &str, channel_id: &str) {
        self.state()
            .channels
            .entry(server_id.to_string())
            .or_default()
            .insert(channel_id.to_string());
    }

    pub fn add_message(&self, server_id: &str, channel_id: &str, message_id: &str) {
        self.add_channel(server_id, channel_id);
        self.state()
            .messages
            .insert((channel_id.to_string(), message_id.to_string()));
    }

    pub fn disable_dms(&self, user_id: &str) {
        self.state().dm_disabled.insert(user_id.to_string());
    }

    pub fn set_channel_failing(&self, channel_id: &str, failing: bool) {
        let mut state = self.state();
        if failing {
            state.failing_channels.insert(channel_id.to_string());
        } else {
            state.failing_channels.remove(channel_id);
        }
    }

    pub fn block_reactions(&self) {
        self.state().reactions_blocked = true;
    }

    pub fn sent_to(&self, channel_id: &str) -> Vec<Notice> {
        self.state()
            .sent
            .iter()
            .filter(|(c, _)| c == channel_id)
            .map(|(_, n)| n.clone())
            .collect()
    }

    pub fn sent_count(&self) -> usize {
        self.state().sent.len()
    }

    pub fn reactions(&self) -> Vec<(String, String, String)> {
        self.state().reactions.clone()
    }

    pub fn removed_reactions(&self) -> Vec<String> {
        self.state().removed_reactions.clone()
    }

    pub fn dm_channel(user_id: &str) -> String {
        format!("dm:{user_id}")
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    async fn open_private_channel(&self, user_id: &str) -> Result<String, String> {
        if self.state().dm_disabled.contains(user_id) {
            return Err(format!("{user_id} does not accept direct messages"));
        }
        Ok(Self::dm_channel(user_id))
    }

    async fn send_notice(&self, channel_id: &str, notice: &Notice) -> Result<String, String> {
        let mut state = self.state();
        if state.failing_channels.contains(channel_id) {
            return Err(format!("cannot send to {channel_id}"));
        }
        state.sent.push((channel_id.to_string(), notice.clone()));
        Ok(format!("$sent{}", state.sent.len()))
    }

    async fn channel_in_server(&self, server_id: &str, channel_id: &str) -> bool {
        self.state()
            .channels
            .get(server_id)
            .is_some_and(|c| c.contains(channel_id))
    }

    async fn fetch_message(&self, channel_id: &str, message_id: &str) -> Result<(), String> {
        if self
            .state()
            .messages
            .contains(&(channel_id.to_string(), message_id.to_string()))
        {
            Ok(())
        } else {
            Err("not found".to_string())
        }
    }

    async fn locate_message(&self, server_id: &str, message_id: &str) -> Option<String> {
        let state = self.state();
        let channels = state.channels.get(server_id)?;
        state
            .messages
            .iter()
            .find(|(c, m)| m == message_id && channels.contains(c))
            .map(|(c, _)| c.clone())
    }

    async fn react(&self, channel_id: &str, message_id: &str, emoji: &str) -> Result<(), String> {
        let mut state = self.state();
        if state.reactions_blocked {
            return Err("missing permission".to_string());
        }
        state.reactions.push((
            channel_id.to_string(),
            message_id.to_string(),
            emoji.to_string(),
        ));
        Ok(())
    }

    async fn remove_reaction(&self, _channel_id: &str, reaction_id: &str) -> Result<(), String> {
        self.state().removed_reactions.push(reaction_id.to_string());
        Ok(())
    }
}
