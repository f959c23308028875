//! # Matrix Platform Adapter
//!
//! Implements the `ChatPlatform` trait for the Matrix protocol using the `matrix_sdk`.
//! This module acts as the bridge between the generic `ChatPlatform` interface used by the bot's core logic
//! and the specific implementation details of the Matrix SDK.
//!
//! Rooms are channels, event ids are message ids, and a "server" is the scope
//! `AppConfig::server_for_room` assigns to a room.

use crate::domain::config::ConfigStore;
use crate::domain::traits::ChatPlatform;
use crate::domain::types::{Answer, Notice};
use crate::strings::logs;
use async_trait::async_trait;
use matrix_sdk::Client;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::events::reaction::ReactionEventContent;
use matrix_sdk::ruma::events::relation::Annotation;
use matrix_sdk::ruma::events::room::MediaSource;
use matrix_sdk::ruma::events::room::message::{MessageType, RoomMessageEventContent};
use matrix_sdk::ruma::{EventId, RoomId, UserId};
use std::convert::TryFrom;
use std::sync::Arc;

#[derive(Clone)]
pub struct MatrixPlatform {
    client: Client,
    config: Arc<ConfigStore>,
}

impl MatrixPlatform {
    pub fn new(client: Client, config: Arc<ConfigStore>) -> Self {
        Self { client, config }
    }

    fn room(&self, channel_id: &str) -> Result<Room, String> {
        let room_id = <&RoomId>::try_from(channel_id).map_err(|e| e.to_string())?;
        self.client
            .get_room(room_id)
            .ok_or_else(|| format!("Room {channel_id} is not known to this client"))
    }

    /// Joined rooms belonging to a server scope.
    fn server_rooms(&self, server_id: &str) -> Vec<Room> {
        let config = self.config.current();
        self.client
            .joined_rooms()
            .into_iter()
            .filter(|room| config.server_for_room(room.room_id().as_str()) == server_id)
            .collect()
    }
}

#[async_trait]
impl ChatPlatform for MatrixPlatform {
    async fn open_private_channel(&self, user_id: &str) -> Result<String, String> {
        let user_id = <&UserId>::try_from(user_id).map_err(|e| e.to_string())?;
        if let Some(room) = self.client.get_dm_room(user_id) {
            return Ok(room.room_id().to_string());
        }
        self.client
            .create_dm(user_id)
            .await
            .map(|room| room.room_id().to_string())
            .map_err(|e| e.to_string())
    }

    async fn send_notice(&self, channel_id: &str, notice: &Notice) -> Result<String, String> {
        let room = self.room(channel_id)?;
        let content = notice.to_markdown();
        tracing::debug!("{}", logs::sending_notice(channel_id, &content));
        room.send(RoomMessageEventContent::text_markdown(content))
            .await
            .map(|resp| resp.event_id.to_string())
            .map_err(|e| e.to_string())
    }

    async fn channel_in_server(&self, server_id: &str, channel_id: &str) -> bool {
        self.room(channel_id).is_ok()
            && self.config.current().server_for_room(channel_id) == server_id
    }

    async fn fetch_message(&self, channel_id: &str, message_id: &str) -> Result<(), String> {
        let room = self.room(channel_id)?;
        let event_id = <&EventId>::try_from(message_id).map_err(|e| e.to_string())?;
        room.event(event_id, None)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn locate_message(&self, server_id: &str, message_id: &str) -> Option<String> {
        let event_id = <&EventId>::try_from(message_id).ok()?;
        for room in self.server_rooms(server_id) {
            if room.event(event_id, None).await.is_ok() {
                return Some(room.room_id().to_string());
            }
        }
        None
    }

    async fn react(&self, channel_id: &str, message_id: &str, emoji: &str) -> Result<(), String> {
        let room = self.room(channel_id)?;
        let event_id = <&EventId>::try_from(message_id).map_err(|e| e.to_string())?;
        let content =
            ReactionEventContent::new(Annotation::new(event_id.to_owned(), emoji.to_string()));
        room.send(content).await.map(|_| ()).map_err(|e| e.to_string())
    }

    async fn remove_reaction(&self, channel_id: &str, reaction_id: &str) -> Result<(), String> {
        let room = self.room(channel_id)?;
        let event_id = <&EventId>::try_from(reaction_id).map_err(|e| e.to_string())?;
        room.redact(event_id, None, None)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// Translates a room message into a survey answer. Media messages contribute
/// their `mxc://` URI and no text.
pub fn to_answer(msgtype: &MessageType) -> Option<Answer> {
    match msgtype {
        MessageType::Text(content) => Some(Answer::text(content.body.clone())),
        MessageType::Image(content) => Some(Answer::attachment(media_url(&content.source))),
        MessageType::File(content) => Some(Answer::attachment(media_url(&content.source))),
        MessageType::Audio(content) => Some(Answer::attachment(media_url(&content.source))),
        MessageType::Video(content) => Some(Answer::attachment(media_url(&content.source))),
        _ => None,
    }
}

fn media_url(source: &MediaSource) -> String {
    match source {
        MediaSource::Plain(uri) => uri.to_string(),
        MediaSource::Encrypted(file) => file.url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix_sdk::ruma::events::room::message::{
        ImageMessageEventContent, NoticeMessageEventContent, TextMessageEventContent,
    };
    use matrix_sdk::ruma::owned_mxc_uri;

    #[test]
    fn test_text_becomes_answer() {
        let msg = MessageType::Text(TextMessageEventContent::plain("hello"));
        assert_eq!(to_answer(&msg), Some(Answer::text("hello")));
    }

    #[test]
    fn test_image_becomes_attachment() {
        let msg = MessageType::Image(ImageMessageEventContent::plain(
            "cat.png".to_string(),
            owned_mxc_uri!("mxc://example.org/cat"),
        ));
        assert_eq!(
            to_answer(&msg),
            Some(Answer::attachment("mxc://example.org/cat"))
        );
    }

    #[test]
    fn test_notices_are_not_answers() {
        let msg = MessageType::Notice(NoticeMessageEventContent::plain("bot says hi"));
        assert_eq!(to_answer(&msg), None);
    }
}
