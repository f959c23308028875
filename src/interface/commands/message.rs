//! # Set Message Command
//!
//! Handles `set_message <message_id> <survey_name>`.
//! The message must exist in the current room and accept the trigger reaction before anything is saved.

use super::CommandContext;
use crate::application::repository::RepositoryError;
use crate::strings::{logs, templates};
use anyhow::Result;

pub async fn handle_set_message(
    ctx: &CommandContext<'_>,
    message_id: &str,
    name: &str,
) -> Result<()> {
    if let Err(e) = ctx.platform.fetch_message(ctx.channel_id, message_id).await {
        tracing::debug!("{}", logs::message_fetch_failed(message_id, &e));
        return ctx
            .reply_failure(templates::SET_MESSAGE_INVALID_MESSAGE, &[])
            .await;
    }

    if !ctx.repository.exists(ctx.server_id, name).await {
        return ctx.reply_failure(templates::INVALID_SURVEY, &[name]).await;
    }

    if let Err(e) = ctx
        .platform
        .react(ctx.channel_id, message_id, &ctx.config.survey.reaction)
        .await
    {
        tracing::warn!("{}", logs::trigger_reaction_failed(message_id, &e));
        return ctx
            .reply_failure(templates::SET_MESSAGE_REACTION_FAILURE, &[])
            .await;
    }

    let trigger = message_id.to_string();
    match ctx
        .repository
        .update(ctx.server_id, name, |survey| survey.message = trigger)
        .await
    {
        Ok(()) => {
            ctx.repository
                .refresh_triggers(ctx.server_id, ctx.platform)
                .await;
            ctx.reply_success(templates::SET_MESSAGE_SUCCESS, &[name])
                .await
        }
        Err(RepositoryError::NotFound(_)) => {
            ctx.reply_failure(templates::INVALID_SURVEY, &[name]).await
        }
        Err(_) => ctx.reply_failure(templates::SAVE_FAILURE, &[]).await,
    }
}
