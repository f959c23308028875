//! # Trigger Listener
//!
//! Starts a survey when a user adds the configured reaction to a survey's
//! trigger message.

use std::sync::Arc;

use crate::application::repository::SurveyRepository;
use crate::application::session::{SessionEngine, StartOutcome};
use crate::domain::config::ConfigStore;
use crate::domain::traits::ChatPlatform;
use crate::domain::types::ReactionAdded;
use crate::strings::logs;

#[derive(Clone)]
pub struct TriggerListener {
    bot_user_id: String,
    config: Arc<ConfigStore>,
    repository: Arc<SurveyRepository>,
    platform: Arc<dyn ChatPlatform>,
    engine: SessionEngine,
}

impl TriggerListener {
    pub fn new(
        bot_user_id: impl Into<String>,
        config: Arc<ConfigStore>,
        repository: Arc<SurveyRepository>,
        platform: Arc<dyn ChatPlatform>,
        engine: SessionEngine,
    ) -> Self {
        Self {
            bot_user_id: bot_user_id.into(),
            config,
            repository,
            platform,
            engine,
        }
    }

    /// Returns the start outcome when the reaction matched a trigger.
    pub async fn on_reaction(&self, reaction: &ReactionAdded) -> Option<StartOutcome> {
        if reaction.user.id == self.bot_user_id {
            return None;
        }
        if reaction.emoji != self.config.current().survey.reaction {
            return None;
        }

        self.repository
            .ensure_loaded(&reaction.server_id, self.platform.as_ref())
            .await;
        let survey_name = self
            .repository
            .find_trigger(&reaction.server_id, &reaction.message_id)
            .await?;

        if let Err(e) = self
            .platform
            .remove_reaction(&reaction.channel_id, &reaction.reaction_id)
            .await
        {
            tracing::warn!("{}", logs::reaction_remove_failed(&reaction.reaction_id, &e));
        }

        let outcome = self
            .engine
            .start(&reaction.server_id, &survey_name, &reaction.user)
            .await;
        tracing::debug!(
            "{}",
            logs::trigger_fired(&survey_name, &reaction.user.id, &format!("{outcome:?}"))
        );
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::registry::SessionRegistry;
    use crate::application::testing::FakePlatform;
    use crate::domain::config::test_config;
    use crate::domain::types::UserRef;
    use tempfile::TempDir;

    const SERVER: &str = "community";

    async fn listener() -> (TempDir, Arc<FakePlatform>, TriggerListener) {
        let dir = TempDir::new().unwrap();
        let repository = Arc::new(SurveyRepository::new(dir.path()));
        repository.load(SERVER).await.unwrap();
        repository
            .create(SERVER, "poll", vec!["Name?".into()])
            .await
            .unwrap();
        repository
            .update(SERVER, "poll", |s| {
                s.response_channel = "!responses".into();
                s.message = "$entry".into();
            })
            .await
            .unwrap();

        let platform = Arc::new(FakePlatform::new());
        platform.add_channel(SERVER, "!responses");
        platform.add_message(SERVER, "!lobby", "$entry");
        repository.refresh_triggers(SERVER, platform.as_ref()).await;

        let config = Arc::new(ConfigStore::from_config(test_config()));
        let engine = SessionEngine::new(
            platform.clone(),
            repository.clone(),
            config.clone(),
            Arc::new(SessionRegistry::new()),
        );
        let listener = TriggerListener::new(
            "@surveybot:example.org",
            config,
            repository,
            platform.clone(),
            engine,
        );
        (dir, platform, listener)
    }

    fn reaction(user: &str, emoji: &str, message_id: &str) -> ReactionAdded {
        ReactionAdded {
            server_id: SERVER.into(),
            channel_id: "!lobby".into(),
            message_id: message_id.into(),
            reaction_id: "$reaction".into(),
            emoji: emoji.into(),
            user: UserRef::new(user, "someone"),
        }
    }

    #[tokio::test]
    async fn test_matching_reaction_starts_survey() {
        let (_dir, platform, listener) = listener().await;
        let outcome = listener
            .on_reaction(&reaction("@alice:example.org", "📝", "$entry"))
            .await;

        assert_eq!(outcome, Some(StartOutcome::Started));
        assert_eq!(platform.removed_reactions(), vec!["$reaction"]);
        assert_eq!(platform.sent_to("dm:@alice:example.org").len(), 1);
    }

    #[tokio::test]
    async fn test_non_matching_reactions_are_ignored() {
        let (_dir, platform, listener) = listener().await;

        assert_eq!(
            listener
                .on_reaction(&reaction("@alice:example.org", "👍", "$entry"))
                .await,
            None
        );
        assert_eq!(
            listener
                .on_reaction(&reaction("@alice:example.org", "📝", "$other"))
                .await,
            None
        );
        assert_eq!(
            listener
                .on_reaction(&reaction("@surveybot:example.org", "📝", "$entry"))
                .await,
            None
        );
        assert!(platform.removed_reactions().is_empty());
        assert_eq!(platform.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_reaction_on_server_first_seen_later() {
        let (dir, platform, listener) = listener().await;
        std::fs::write(
            SurveyRepository::new(dir.path()).data_path("!late"),
            r#"{"intro":{"response_channel":"!late-responses","message":"$late","questions":["Hi?"]}}"#,
        )
        .unwrap();
        platform.add_channel("!late", "!late-responses");
        platform.add_message("!late", "!late", "$late");

        let mut late = reaction("@alice:example.org", "📝", "$late");
        late.server_id = "!late".into();
        late.channel_id = "!late".into();

        assert_eq!(listener.on_reaction(&late).await, Some(StartOutcome::Started));
        assert_eq!(platform.removed_reactions(), vec!["$reaction"]);
    }
}
