//! # Set Channel Command
//!
//! Handles `set_channel <survey_name>`: the room the command is sent from becomes the response room.

use super::CommandContext;
use crate::application::repository::RepositoryError;
use crate::strings::templates;
use anyhow::Result;

pub async fn handle_set_channel(ctx: &CommandContext<'_>, name: &str) -> Result<()> {
    let channel_id = ctx.channel_id.to_string();

    match ctx
        .repository
        .update(ctx.server_id, name, |survey| survey.response_channel = channel_id)
        .await
    {
        Ok(()) => {
            ctx.repository
                .refresh_triggers(ctx.server_id, ctx.platform)
                .await;
            ctx.reply_success(templates::SET_CHANNEL_SUCCESS, &[name])
                .await
        }
        Err(RepositoryError::NotFound(_)) => {
            ctx.reply_failure(templates::INVALID_SURVEY, &[name]).await
        }
        Err(_) => ctx.reply_failure(templates::SAVE_FAILURE, &[]).await,
    }
}
