//! # Help Text
//!
//! Help message for the `help` command, rendered with the configured prefix.

pub const TITLE: &str = "SurveyBot Help";

pub fn main(prefix: &str) -> String {
    [
        (
            format!("{prefix} create <survey_name>"),
            "Create a new survey for this server with the specified name",
        ),
        (
            format!("{prefix} reload"),
            "Reload configuration and data file for the current server",
        ),
        (
            format!("{prefix} set_channel <survey_name>"),
            "Set the room where the responses for the specified survey will be posted",
        ),
        (
            format!("{prefix} set_message <message_id> <survey_name>"),
            "Set the message with the specified ID as the starting point for the specified survey",
        ),
        (
            format!("{prefix} start <survey_name>"),
            "Take the specified survey yourself",
        ),
    ]
    .iter()
    .map(|(usage, description)| format!("* `{usage}`: {description}"))
    .collect::<Vec<_>>()
    .join("\n")
}
