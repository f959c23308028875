//! # Templates
//!
//! Built-in text for the configurable message templates.
//! `config.yaml` may override any id under `messages:`; placeholders are `%s`, filled in order.

pub const COMMAND_SYNTAX_ERROR: &str = "command_syntax_error";
pub const SURVEY_CREATE_SUCCESS: &str = "survey_create_success";
pub const SURVEY_EXISTS: &str = "survey_exists";
pub const RELOAD_SUCCESS: &str = "reload_success";
pub const RELOAD_FAILURE: &str = "reload_failure";
pub const SET_CHANNEL_SUCCESS: &str = "set_channel_success";
pub const INVALID_SURVEY: &str = "invalid_survey";
pub const SET_MESSAGE_SUCCESS: &str = "set_message_success";
pub const SET_MESSAGE_REACTION_FAILURE: &str = "set_message_reaction_failure";
pub const SET_MESSAGE_INVALID_MESSAGE: &str = "set_message_invalid_message";
pub const SAVE_FAILURE: &str = "save_failure";
pub const SURVEY_NOT_READY: &str = "survey_not_ready";
pub const SURVEY_COMPLETE: &str = "survey_complete";
pub const TIMEOUT: &str = "timeout";

pub fn default_template(id: &str) -> &'static str {
    match id {
        COMMAND_SYNTAX_ERROR => "Syntax error. Usage: `%s`",
        SURVEY_CREATE_SUCCESS => {
            "Survey created. Edit the questions in `%s`, then run `%s` to apply them."
        }
        SURVEY_EXISTS => "A survey named **%s** already exists on this server.",
        RELOAD_SUCCESS => "Configuration and surveys reloaded.",
        RELOAD_FAILURE => "Reload failed, check the bot logs.",
        SET_CHANNEL_SUCCESS => "Responses for **%s** will be posted in this room.",
        INVALID_SURVEY => "There is no survey named **%s** on this server.",
        SET_MESSAGE_SUCCESS => "Reacting to that message now starts **%s**.",
        SET_MESSAGE_REACTION_FAILURE => {
            "Could not add the trigger reaction to that message, nothing was saved."
        }
        SET_MESSAGE_INVALID_MESSAGE => "No message with that id was found in this room.",
        SAVE_FAILURE => "Could not save the survey data, check the bot logs.",
        SURVEY_NOT_READY => {
            "Survey **%s** cannot start yet: set its response room and trigger message first."
        }
        SURVEY_COMPLETE => "Thanks! Your answers have been sent.",
        TIMEOUT => "You took too long to answer, the survey was cancelled.",
        _ => "",
    }
}

/// Replaces each `%s` with the next parameter. Surplus placeholders are left as-is,
/// surplus parameters are appended separated by spaces.
pub fn format(template: &str, params: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut params = params.iter();
    let mut pieces = template.split("%s").peekable();

    while let Some(piece) = pieces.next() {
        out.push_str(piece);
        if pieces.peek().is_some() {
            match params.next() {
                Some(p) => out.push_str(p),
                None => out.push_str("%s"),
            }
        }
    }
    for extra in params {
        out.push(' ');
        out.push_str(extra);
    }
    out
}
