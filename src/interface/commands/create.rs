//! # Create Command
//!
//! Handles `create <survey_name>`.
//! Adds a survey with the default questions; an existing name is reported as a conflict.

use super::CommandContext;
use crate::application::repository::RepositoryError;
use crate::strings::templates;
use anyhow::Result;

pub async fn handle_create(ctx: &CommandContext<'_>, name: &str) -> Result<()> {
    let questions = ctx.config.survey.default_questions.clone();

    match ctx.repository.create(ctx.server_id, name, questions).await {
        Ok(()) => {
            ctx.repository
                .refresh_triggers(ctx.server_id, ctx.platform)
                .await;
            let path = ctx.repository.data_path(ctx.server_id);
            let reload = format!("{}reload", ctx.config.prefix_with_space());
            ctx.reply_success(
                templates::SURVEY_CREATE_SUCCESS,
                &[&path.display().to_string(), &reload],
            )
            .await
        }
        Err(RepositoryError::AlreadyExists(_)) => {
            ctx.reply_failure(templates::SURVEY_EXISTS, &[name]).await
        }
        Err(_) => ctx.reply_failure(templates::SAVE_FAILURE, &[]).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Tone;
    use crate::interface::commands::fixture::{Fixture, SERVER};

    #[tokio::test]
    async fn test_create_adds_default_survey() {
        let f = Fixture::new().await;
        handle_create(&f.ctx(), "poll").await.unwrap();

        let survey = f.repository.get(SERVER, "poll").await.unwrap();
        assert_eq!(survey.questions, vec!["Question1", "Question2", "Question3"]);
        assert!(!survey.is_usable());

        let reply = f.replies().pop().unwrap();
        assert_eq!(reply.tone, Tone::Success);
        assert!(reply.body.contains("community.json"));
        assert!(reply.body.contains("!survey reload"));
    }

    #[tokio::test]
    async fn test_create_duplicate_is_rejected() {
        let f = Fixture::new().await;
        handle_create(&f.ctx(), "poll").await.unwrap();
        f.repository
            .update(SERVER, "poll", |s| s.questions = vec!["Edited".into()])
            .await
            .unwrap();

        handle_create(&f.ctx(), "poll").await.unwrap();

        let reply = f.replies().pop().unwrap();
        assert_eq!(reply.tone, Tone::Failure);
        assert!(reply.body.contains("already exists"));
        assert_eq!(
            f.repository.get(SERVER, "poll").await.unwrap().questions,
            vec!["Edited"]
        );
    }
}
