//! # Log Messages
//!
//! Format functions for the lines written to the log sinks.
//! Storage lines always name the server they concern.

pub const CONFIG_PARSE_ERROR: &str = "Failed to parse YAML";

pub fn config_read_error(path: &str) -> String {
    format!("Failed to read {path}")
}

pub fn config_reload_failed(err: &str) -> String {
    format!("Failed to reload configuration, keeping the previous one: {err}")
}

pub const STARTING: &str = "Starting SurveyBot...";

pub fn logged_in(user: &str, rooms: usize) -> String {
    format!("Logged in as {user} in {rooms} rooms")
}

pub fn setting_display_name(name: &str) -> String {
    format!("Setting display name to: {name}")
}

pub fn set_display_name_fail(err: &str) -> String {
    format!("Failed to set display name: {err}")
}

pub fn server_ready(server_id: &str, surveys: usize) -> String {
    format!("Loaded {surveys} surveys for server {server_id}")
}

pub const SYNC_LOOP_START: &str = "Starting sync loop...";

pub fn sync_loop_fail(err: &str) -> String {
    format!("Sync loop failed: {err}")
}

pub const SHUTDOWN: &str = "Shutting down...";
pub const DISCONNECTED: &str = "Bot disconnected";

pub fn shutdown_fail(err: &str) -> String {
    format!("Unable to listen for shutdown signal: {err}")
}

pub fn invite_received(room_id: &str) -> String {
    format!("💌 Received invite for room {room_id:?}")
}

pub fn join_invite_fail(err: &str) -> String {
    format!("Failed to join room after invite: {err}")
}

pub fn command_received(sender: &str, room_id: &str, body: &str) -> String {
    format!("Command from {sender} in {room_id}: {body}")
}

pub fn command_failed(err: &str) -> String {
    format!("Failed to handle command: {err}")
}

pub fn data_file_create_failed(server_id: &str, err: &str) -> String {
    format!("Can't create data file for server {server_id}: {err}")
}

pub fn data_file_read_failed(server_id: &str, err: &str) -> String {
    format!("Can't read data file for server {server_id}: {err}")
}

pub fn data_file_write_failed(server_id: &str, err: &str) -> String {
    format!("Can't write data file for server {server_id}: {err}")
}

pub fn trigger_not_found(server_id: &str, survey: &str, message_id: &str) -> String {
    format!("Trigger message {message_id} of survey '{survey}' not found on server {server_id}")
}

pub fn triggers_indexed(server_id: &str, count: usize) -> String {
    format!("Indexed {count} trigger messages for server {server_id}")
}

pub fn trigger_fired(survey: &str, user: &str, outcome: &str) -> String {
    format!("Trigger for '{survey}' by {user}: {outcome}")
}

pub fn reaction_remove_failed(reaction_id: &str, err: &str) -> String {
    format!("Could not remove reaction {reaction_id}: {err}")
}

pub fn trigger_reaction_failed(message_id: &str, err: &str) -> String {
    format!("Could not react to {message_id}: {err}")
}

pub fn message_fetch_failed(message_id: &str, err: &str) -> String {
    format!("Could not fetch message {message_id}: {err}")
}

pub fn session_already_active(user: &str) -> String {
    format!("{user} already has a survey in progress")
}

pub fn response_channel_missing(server_id: &str, survey: &str, channel: &str) -> String {
    format!("Response room {channel} of survey '{survey}' is not part of server {server_id}")
}

pub fn private_channel_failed(user: &str, err: &str) -> String {
    format!("Cannot open a direct chat with {user}: {err}")
}

pub fn question_delivery_failed(user: &str, index: usize, err: &str) -> String {
    format!("Failed to send question {index} to {user}: {err}")
}

pub fn response_post_failed(survey: &str, channel: &str, err: &str) -> String {
    format!("Failed to post '{survey}' response to {channel}: {err}")
}

pub fn session_started(server_id: &str, survey: &str, user: &str, active: usize) -> String {
    format!("{user} started survey '{survey}' on server {server_id} ({active} active)")
}

pub fn session_completed(survey: &str, user: &str) -> String {
    format!("{user} completed survey '{survey}'")
}

pub fn session_timed_out(survey: &str, user: &str) -> String {
    format!("Survey '{survey}' for {user} timed out")
}

pub fn completion_notice_failed(user: &str, err: &str) -> String {
    format!("Could not tell {user} their survey was sent: {err}")
}

pub fn timeout_notice_failed(user: &str, err: &str) -> String {
    format!("Could not tell {user} their survey timed out: {err}")
}

pub fn sending_notice(channel: &str, content: &str) -> String {
    format!("Bot sending message to {channel}: {content}")
}

pub fn data_file_unavailable(server_id: &str) -> String {
    format!("Refusing to write data file for server {server_id} until it loads cleanly")
}
