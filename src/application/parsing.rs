//! # Command Parsing
//!
//! Turns `<prefix> <verb> <args...>` into a typed `Command`.
//! Argument counts are checked here so handlers never see malformed input.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create { name: String },
    Reload,
    SetChannel { name: String },
    SetMessage { message_id: String, name: String },
    Start { name: String },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Known verb, wrong arguments. Carries the full usage line.
    #[error("usage: {usage}")]
    Syntax { usage: String },
}

/// Usage line for a verb, e.g. `!survey create <survey_name>`.
pub fn usage(prefix: &str, verb: &str) -> String {
    let args = match verb {
        "create" | "set_channel" | "start" => " <survey_name>",
        "set_message" => " <message_id> <survey_name>",
        _ => "",
    };
    format!("{prefix} {verb}{args}")
}

/// Parses a message. `Ok(None)` means the message is not addressed to the bot
/// or names an unknown verb.
pub fn parse(prefix: &str, message: &str) -> Result<Option<Command>, ParseError> {
    let Some(rest) = message
        .strip_prefix(prefix)
        .filter(|rest| rest.starts_with(char::is_whitespace))
    else {
        return Ok(None);
    };

    let mut words = rest.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let verb = verb.to_lowercase();
    let args: Vec<&str> = words.collect();
    let syntax = || ParseError::Syntax {
        usage: usage(prefix, &verb),
    };

    let command = match verb.as_str() {
        "create" => match args.as_slice() {
            [name] => Command::Create {
                name: name.to_string(),
            },
            _ => return Err(syntax()),
        },
        "set_channel" => match args.as_slice() {
            [name] => Command::SetChannel {
                name: name.to_string(),
            },
            _ => return Err(syntax()),
        },
        "set_message" => match args.as_slice() {
            [message_id, name] => Command::SetMessage {
                message_id: message_id.to_string(),
                name: name.to_string(),
            },
            _ => return Err(syntax()),
        },
        "start" => match args.as_slice() {
            [name] => Command::Start {
                name: name.to_string(),
            },
            _ => return Err(syntax()),
        },
        "reload" => Command::Reload,
        "help" => Command::Help,
        _ => return Ok(None),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "!survey";

    #[test]
    fn test_parse_verbs() {
        assert_eq!(
            parse(PREFIX, "!survey create poll").unwrap(),
            Some(Command::Create { name: "poll".into() })
        );
        assert_eq!(
            parse(PREFIX, "!survey SET_MESSAGE $abc:example.org poll").unwrap(),
            Some(Command::SetMessage {
                message_id: "$abc:example.org".into(),
                name: "poll".into()
            })
        );
        assert_eq!(parse(PREFIX, "!survey  reload ").unwrap(), Some(Command::Reload));
        assert_eq!(parse(PREFIX, "!survey help me").unwrap(), Some(Command::Help));
    }

    #[test]
    fn test_ignores_other_messages() {
        assert_eq!(parse(PREFIX, "hello").unwrap(), None);
        assert_eq!(parse(PREFIX, "!surveycreate poll").unwrap(), None);
        assert_eq!(parse(PREFIX, "!survey").unwrap(), None);
        assert_eq!(parse(PREFIX, "!survey dance").unwrap(), None);
    }

    #[test]
    fn test_argument_count_mismatch() {
        assert_eq!(
            parse(PREFIX, "!survey create").unwrap_err(),
            ParseError::Syntax {
                usage: "!survey create <survey_name>".into()
            }
        );
        assert_eq!(
            parse(PREFIX, "!survey set_message poll").unwrap_err(),
            ParseError::Syntax {
                usage: "!survey set_message <message_id> <survey_name>".into()
            }
        );
        assert!(parse(PREFIX, "!survey set_channel a b").is_err());
    }
}
