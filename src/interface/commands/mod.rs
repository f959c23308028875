//! # Command Handlers
//!
//! Contains specific handler functions for each supported command (e.g., create, set_channel, help).
//! These handlers are invoked by the Router with a `CommandContext` describing where the command came from.

pub mod channel;
pub mod create;
pub mod help;
pub mod message;
pub mod reload;
pub mod start;

use anyhow::Result;
use std::sync::Arc;

use crate::application::repository::SurveyRepository;
use crate::application::session::SessionEngine;
use crate::domain::config::{AppConfig, ConfigStore};
use crate::domain::traits::ChatPlatform;
use crate::domain::types::{Notice, UserRef};

/// Everything a handler needs: shared services plus the origin of the command.
pub struct CommandContext<'a> {
    pub config: Arc<AppConfig>,
    pub config_store: &'a ConfigStore,
    pub repository: &'a SurveyRepository,
    pub platform: &'a dyn ChatPlatform,
    pub engine: &'a SessionEngine,
    pub server_id: &'a str,
    pub channel_id: &'a str,
    pub sender: &'a UserRef,
}

impl CommandContext<'_> {
    /// Sends a notice to the room the command came from. Empty notices are dropped.
    pub async fn reply(&self, notice: Notice) -> Result<()> {
        if notice.body.is_empty() && notice.title.is_none() {
            return Ok(());
        }
        self.platform
            .send_notice(self.channel_id, &notice)
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!(e))
    }

    pub async fn reply_success(&self, template: &str, params: &[&str]) -> Result<()> {
        self.reply(Notice::success(self.config.message(template, params)))
            .await
    }

    pub async fn reply_failure(&self, template: &str, params: &[&str]) -> Result<()> {
        self.reply(Notice::failure(self.config.message(template, params)))
            .await
    }
}
