//! # Reload Command
//!
//! Handles `reload`: re-reads the server's survey file and the configuration file.

use super::CommandContext;
use crate::strings::{logs, templates};
use anyhow::Result;

pub async fn handle_reload(ctx: &CommandContext<'_>) -> Result<()> {
    let data_ok = ctx.repository.load(ctx.server_id).await.is_ok();
    ctx.repository
        .refresh_triggers(ctx.server_id, ctx.platform)
        .await;

    let config_ok = match ctx.config_store.reload() {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("{}", logs::config_reload_failed(&format!("{e:#}")));
            false
        }
    };

    if data_ok && config_ok {
        ctx.reply_success(templates::RELOAD_SUCCESS, &[]).await
    } else {
        ctx.reply_failure(templates::RELOAD_FAILURE, &[]).await
    }
}
