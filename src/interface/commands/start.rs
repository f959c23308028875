//! # Start Command
//!
//! Handles `start <survey_name>`: runs the survey for the administrator who sent it.

use super::CommandContext;
use crate::application::session::StartOutcome;
use crate::strings::templates;
use anyhow::Result;

pub async fn handle_start(ctx: &CommandContext<'_>, name: &str) -> Result<()> {
    match ctx.engine.start(ctx.server_id, name, ctx.sender).await {
        StartOutcome::UnknownSurvey => ctx.reply_failure(templates::INVALID_SURVEY, &[name]).await,
        StartOutcome::NotUsable | StartOutcome::ResponseChannelUnavailable => {
            ctx.reply_failure(templates::SURVEY_NOT_READY, &[name]).await
        }
        StartOutcome::Started | StartOutcome::AlreadyActive | StartOutcome::DeliveryFailed => {
            Ok(())
        }
    }
}
