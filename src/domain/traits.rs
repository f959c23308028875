//! # Domain Traits
//!
//! Abstract interface for the chat platform the bot runs on.
//! Allows for pluggable implementations in the Infrastructure layer.

use async_trait::async_trait;

use crate::domain::types::Notice;

/// Abstract interface for a Chat Platform (e.g., Matrix)
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Open (or reuse) the private channel with a user and return its id
    async fn open_private_channel(&self, user_id: &str) -> Result<String, String>;

    /// Send a notice to a channel, returning the new message id
    async fn send_notice(&self, channel_id: &str, notice: &Notice) -> Result<String, String>;

    /// Whether the channel exists and belongs to the given server
    async fn channel_in_server(&self, server_id: &str, channel_id: &str) -> bool;

    /// Fetch a message from a specific channel
    async fn fetch_message(&self, channel_id: &str, message_id: &str) -> Result<(), String>;

    /// Find which channel of the server holds the message, if any
    async fn locate_message(&self, server_id: &str, message_id: &str) -> Option<String>;

    /// Add the bot's own reaction to a message
    async fn react(&self, channel_id: &str, message_id: &str, emoji: &str) -> Result<(), String>;

    /// Remove a user's reaction
    async fn remove_reaction(&self, channel_id: &str, reaction_id: &str) -> Result<(), String>;
}
