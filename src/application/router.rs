//! # Command Router
//!
//! Routes incoming room messages to the appropriate command handler (in `interface/commands`).
//! It checks the prefix and the sender's admin rights, parses the command and dispatches it
//! with the necessary context.

use anyhow::Result;
use std::sync::Arc;

use crate::application::parsing::{self, Command, ParseError};
use crate::application::repository::SurveyRepository;
use crate::application::session::SessionEngine;
use crate::domain::config::ConfigStore;
use crate::domain::traits::ChatPlatform;
use crate::domain::types::UserRef;
use crate::interface::commands::{self, CommandContext};
use crate::strings::{logs, templates};

#[derive(Clone)]
pub struct CommandRouter {
    config: Arc<ConfigStore>,
    repository: Arc<SurveyRepository>,
    platform: Arc<dyn ChatPlatform>,
    engine: SessionEngine,
}

impl CommandRouter {
    pub fn new(
        config: Arc<ConfigStore>,
        repository: Arc<SurveyRepository>,
        platform: Arc<dyn ChatPlatform>,
        engine: SessionEngine,
    ) -> Self {
        Self {
            config,
            repository,
            platform,
            engine,
        }
    }

    /// Returns whether the message was a command for this bot.
    pub async fn route(
        &self,
        server_id: &str,
        channel_id: &str,
        sender: &UserRef,
        message: &str,
    ) -> Result<bool> {
        let config = self.config.current();
        let msg = message.trim();

        if !msg.starts_with(&config.prefix_with_space()) || !config.is_admin(&sender.id) {
            return Ok(false);
        }

        tracing::info!("{}", logs::command_received(&sender.id, channel_id, msg));
        self.repository
            .ensure_loaded(server_id, self.platform.as_ref())
            .await;

        let ctx = CommandContext {
            config: config.clone(),
            config_store: &self.config,
            repository: &self.repository,
            platform: self.platform.as_ref(),
            engine: &self.engine,
            server_id,
            channel_id,
            sender,
        };

        let command = match parsing::parse(&config.survey.prefix, msg) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(false),
            Err(ParseError::Syntax { usage }) => {
                ctx.reply_failure(templates::COMMAND_SYNTAX_ERROR, &[&usage])
                    .await?;
                return Ok(true);
            }
        };

        match command {
            Command::Create { name } => commands::create::handle_create(&ctx, &name).await?,
            Command::Reload => commands::reload::handle_reload(&ctx).await?,
            Command::SetChannel { name } => {
                commands::channel::handle_set_channel(&ctx, &name).await?
            }
            Command::SetMessage { message_id, name } => {
                commands::message::handle_set_message(&ctx, &message_id, &name).await?
            }
            Command::Start { name } => commands::start::handle_start(&ctx, &name).await?,
            Command::Help => commands::help::handle_help(&ctx).await?,
        }
        Ok(true)
    }
}
