//! # Domain Types
//!
//! Survey records, the notices sent through the chat platform, and the
//! user/answer/reaction shapes that platform events are translated into.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named questionnaire scoped to one server.
/// Empty `response_channel` / `message` mean "not configured yet".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Survey {
    #[serde(default)]
    pub response_channel: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub questions: Vec<String>,
}

impl Survey {
    pub fn new(questions: Vec<String>) -> Self {
        Self {
            response_channel: String::new(),
            message: String::new(),
            questions,
        }
    }

    /// A survey can only start once it has somewhere to post, a trigger and questions.
    pub fn is_usable(&self) -> bool {
        !self.response_channel.is_empty() && !self.message.is_empty() && !self.questions.is_empty()
    }
}

/// All surveys of one server, keyed by name. Ordered so trigger matching is deterministic.
pub type SurveySet = BTreeMap<String, Survey>;

/// Visual tone of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Failure,
    Question,
    Info,
}

impl Tone {
    pub fn emoji(&self) -> Option<&'static str> {
        match self {
            Tone::Success => Some("✅"),
            Tone::Failure => Some("❌"),
            Tone::Question | Tone::Info => None,
        }
    }
}

/// A styled message, the platform-neutral form of an embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub tone: Tone,
    pub title: Option<String>,
    pub body: String,
}

impl Notice {
    pub fn new(tone: Tone, body: impl Into<String>) -> Self {
        Self {
            tone,
            title: None,
            body: body.into(),
        }
    }

    pub fn success(body: impl Into<String>) -> Self {
        Self::new(Tone::Success, body)
    }

    pub fn failure(body: impl Into<String>) -> Self {
        Self::new(Tone::Failure, body)
    }

    pub fn question(body: impl Into<String>) -> Self {
        Self::new(Tone::Question, body)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Markdown rendering used by text-only platforms.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(&format!("**{title}**\n\n"));
        }
        if let Some(emoji) = self.tone.emoji() {
            out.push_str(emoji);
            out.push(' ');
        }
        out.push_str(&self.body);
        out
    }
}

/// The user a session or command belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserRef {
    pub id: String,
    pub name: String,
}

impl UserRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// An incoming private message that may answer the pending question.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Answer {
    pub text: String,
    pub attachments: Vec<String>,
}

impl Answer {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn attachment(url: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            attachments: vec![url.into()],
        }
    }

    /// Non-empty text or at least one attachment.
    pub fn qualifies(&self) -> bool {
        !self.text.is_empty() || !self.attachments.is_empty()
    }

    /// Text followed by attachment URLs with no separator.
    pub fn render(&self) -> String {
        let mut out = self.text.clone();
        for url in &self.attachments {
            out.push_str(url);
        }
        out
    }
}

/// A reaction added to a message in a server room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionAdded {
    pub server_id: String,
    pub channel_id: String,
    /// The message that was reacted to.
    pub message_id: String,
    /// The reaction itself, used to remove it again.
    pub reaction_id: String,
    pub emoji: String,
    pub user: UserRef,
}
