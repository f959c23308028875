//! # Survey Session Engine
//!
//! Runs one questionnaire for one user over their private channel.
//!
//! `SessionEngine::start` validates the survey, claims the user's registry slot,
//! opens the private channel and delivers the first question. From then on the
//! session is a spawned task stepping through `SessionState` and fed by the
//! answer queue in the registry:
//!
//! ```text
//! AwaitingAnswer(0) -> AwaitingAnswer(1) -> ... -> Completing -> (released)
//!         \__________________ timeout ___________-> TimedOut  -> (released)
//! ```

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};

use crate::application::registry::{SessionRegistry, SlotGuard};
use crate::application::repository::SurveyRepository;
use crate::application::transcript::Transcript;
use crate::domain::config::ConfigStore;
use crate::domain::traits::ChatPlatform;
use crate::domain::types::{Answer, Notice, Tone, UserRef};
use crate::strings::{logs, templates};

/// Result of a `start` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    UnknownSurvey,
    /// Missing response channel, trigger message or questions.
    NotUsable,
    AlreadyActive,
    ResponseChannelUnavailable,
    /// The user could not be reached privately.
    DeliveryFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingAnswer {
        question_index: usize,
        deadline: Instant,
    },
    Completing,
    TimedOut,
}

#[derive(Clone)]
pub struct SessionEngine {
    platform: Arc<dyn ChatPlatform>,
    repository: Arc<SurveyRepository>,
    config: Arc<ConfigStore>,
    registry: Arc<SessionRegistry>,
}

impl SessionEngine {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        repository: Arc<SurveyRepository>,
        config: Arc<ConfigStore>,
        registry: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            platform,
            repository,
            config,
            registry,
        }
    }

    pub async fn start(&self, server_id: &str, survey_name: &str, user: &UserRef) -> StartOutcome {
        let Some(survey) = self.repository.get(server_id, survey_name).await else {
            return StartOutcome::UnknownSurvey;
        };
        if !survey.is_usable() {
            return StartOutcome::NotUsable;
        }

        let Some(answers) = self.registry.reserve(&user.id) else {
            tracing::debug!("{}", logs::session_already_active(&user.id));
            return StartOutcome::AlreadyActive;
        };
        let guard = SlotGuard::new(self.registry.clone(), user.id.clone());

        if !self
            .platform
            .channel_in_server(server_id, &survey.response_channel)
            .await
        {
            tracing::warn!(
                "{}",
                logs::response_channel_missing(server_id, survey_name, &survey.response_channel)
            );
            return StartOutcome::ResponseChannelUnavailable;
        }

        let private_channel = match self.platform.open_private_channel(&user.id).await {
            Ok(channel) => channel,
            Err(e) => {
                tracing::info!("{}", logs::private_channel_failed(&user.id, &e));
                return StartOutcome::DeliveryFailed;
            }
        };
        self.registry.bind_channel(&user.id, &private_channel);

        if let Err(e) = self
            .platform
            .send_notice(&private_channel, &Notice::question(&survey.questions[0]))
            .await
        {
            tracing::info!("{}", logs::question_delivery_failed(&user.id, 0, &e));
            return StartOutcome::DeliveryFailed;
        }

        let config = self.config.current();
        let session = SurveySession {
            platform: self.platform.clone(),
            survey_name: survey_name.to_string(),
            questions: survey.questions,
            response_channel: survey.response_channel,
            private_channel,
            user: user.clone(),
            timeout: config.timeout(),
            complete_text: config.message(templates::SURVEY_COMPLETE, &[]),
            timeout_text: config.message(templates::TIMEOUT, &[]),
            transcript: Transcript::new(),
        };

        let deadline = Instant::now() + session.timeout;
        tracing::info!(
            "{}",
            logs::session_started(server_id, survey_name, &user.id, self.registry.len())
        );
        tokio::spawn(session.run(answers, guard, deadline));
        StartOutcome::Started
    }

    /// Routes a private message to the sender's session, if it belongs there.
    pub fn offer_answer(&self, user_id: &str, channel_id: &str, answer: Answer) -> bool {
        self.registry.offer(user_id, channel_id, answer)
    }

    #[cfg(test)]
    pub fn is_active(&self, user_id: &str) -> bool {
        self.registry.is_active(user_id)
    }
}

struct SurveySession {
    platform: Arc<dyn ChatPlatform>,
    survey_name: String,
    questions: Vec<String>,
    response_channel: String,
    private_channel: String,
    user: UserRef,
    timeout: Duration,
    complete_text: String,
    timeout_text: String,
    transcript: Transcript,
}

impl SurveySession {
    async fn run(
        mut self,
        mut answers: mpsc::UnboundedReceiver<Answer>,
        _slot: SlotGuard,
        first_deadline: Instant,
    ) {
        let mut state = SessionState::AwaitingAnswer {
            question_index: 0,
            deadline: first_deadline,
        };

        loop {
            state = match state {
                SessionState::AwaitingAnswer {
                    question_index,
                    deadline,
                } => match timeout_at(deadline, answers.recv()).await {
                    Ok(Some(answer)) => self.accept(question_index, answer).await,
                    Ok(None) | Err(_) => SessionState::TimedOut,
                },
                SessionState::Completing => {
                    self.complete().await;
                    break;
                }
                SessionState::TimedOut => {
                    self.time_out().await;
                    break;
                }
            };
        }
    }

    async fn accept(&mut self, question_index: usize, answer: Answer) -> SessionState {
        self.transcript
            .record(&self.questions[question_index], &answer.render());

        let next = question_index + 1;
        if next >= self.questions.len() {
            return SessionState::Completing;
        }

        if let Err(e) = self
            .platform
            .send_notice(&self.private_channel, &Notice::question(&self.questions[next]))
            .await
        {
            tracing::error!("{}", logs::question_delivery_failed(&self.user.id, next, &e));
        }
        SessionState::AwaitingAnswer {
            question_index: next,
            deadline: Instant::now() + self.timeout,
        }
    }

    async fn complete(&mut self) {
        let title = format!("{} - {}", self.survey_name, self.user.name);
        for chunk in std::mem::take(&mut self.transcript).finish() {
            let notice = Notice::new(Tone::Info, chunk).with_title(title.clone());
            if let Err(e) = self.platform.send_notice(&self.response_channel, &notice).await {
                tracing::error!(
                    "{}",
                    logs::response_post_failed(&self.survey_name, &self.response_channel, &e)
                );
            }
        }

        if let Err(e) = self
            .platform
            .send_notice(&self.private_channel, &Notice::success(&self.complete_text))
            .await
        {
            tracing::debug!("{}", logs::completion_notice_failed(&self.user.id, &e));
        }
        tracing::info!("{}", logs::session_completed(&self.survey_name, &self.user.id));
    }

    async fn time_out(&mut self) {
        if let Err(e) = self
            .platform
            .send_notice(&self.private_channel, &Notice::failure(&self.timeout_text))
            .await
        {
            tracing::debug!("{}", logs::timeout_notice_failed(&self.user.id, &e));
        }
        tracing::info!("{}", logs::session_timed_out(&self.survey_name, &self.user.id));
    }
}
