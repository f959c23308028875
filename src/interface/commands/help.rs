//! # Help Command
//!
//! Handles the `help` command.
//! Displays every command with a short description.

use super::CommandContext;
use crate::domain::types::{Notice, Tone};
use anyhow::Result;

pub async fn handle_help(ctx: &CommandContext<'_>) -> Result<()> {
    let body = crate::strings::help::main(&ctx.config.survey.prefix);
    ctx.reply(Notice::new(Tone::Info, body).with_title(crate::strings::help::TITLE))
        .await
}
