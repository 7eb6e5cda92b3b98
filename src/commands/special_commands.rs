//! Special commands parser for the interactive host
//!
//! Chat sessions accept slash commands (`/help`, `/status`, `/clear`,
//! `/exit`); everything else is a question for the coach. The mood loop
//! accepts short phrases such as `next joke`, `stop music`, `helped` or
//! `save`.
//!
//! Commands are case-insensitive.

use crate::intervention::{Category, Reaction};
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType 'help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Commands available during an interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Show available commands
    Help,

    /// Show session state, connectivity and conversation size
    ShowStatus,

    /// Forget the conversation; the profile and session stay
    Clear,

    /// Extend the session
    Refresh,

    /// Leave the chat
    Exit,

    /// Not a special command; the input is a question
    None,
}

/// Parse a chat input line into a special command
///
/// # Examples
///
/// ```
/// use coachkit::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/status").unwrap(), SpecialCommand::ShowStatus);
/// assert_eq!(parse_special_command("quit").unwrap(), SpecialCommand::Exit);
/// assert_eq!(
///     parse_special_command("how much protein?").unwrap(),
///     SpecialCommand::None
/// );
/// assert!(parse_special_command("/foo").is_err());
/// ```
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with "/" but is not
/// a known command
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/clear" | "/reset" => Ok(SpecialCommand::Clear),
        "/refresh" => Ok(SpecialCommand::Refresh),
        "/exit" | "/quit" | "exit" | "quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print help for the chat commands
pub fn print_help() {
    println!(
        r#"
Chat Commands
=============

  /help           - Show this help
  /status         - Show session state and whether answers are online
  /clear          - Forget the conversation so far
  /refresh        - Extend the session
  /exit, exit     - Leave the chat

Anything else is sent to the coach, for example:
  how much protein should I eat?
  what should I eat after a workout?
"#
    );
}

/// Actions available while a mood intervention is open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoodAction {
    /// Show the next item in a category
    Next(Category),
    /// Hide a category for the rest of the intervention
    Stop(Category),
    /// Record how an item landed; `None` means the last category shown
    React(Option<Category>, Reaction),
    /// Start the current music track
    PlayMusic,
    /// Save and close
    Save,
    /// Dismiss without saving
    Close,
    /// Show available actions
    Help,
}

/// Parse a mood-loop input line
///
/// # Examples
///
/// ```
/// use coachkit::commands::special_commands::{parse_mood_action, MoodAction};
/// use coachkit::intervention::{Category, Reaction};
///
/// assert_eq!(parse_mood_action("next joke").unwrap(), MoodAction::Next(Category::Jokes));
/// assert_eq!(parse_mood_action("stop music").unwrap(), MoodAction::Stop(Category::Music));
/// assert_eq!(
///     parse_mood_action("helped").unwrap(),
///     MoodAction::React(None, Reaction::Helped)
/// );
/// assert!(parse_mood_action("dance").is_err());
/// ```
///
/// # Errors
///
/// Returns `CommandError` for unknown actions, unknown categories or a
/// missing category
pub fn parse_mood_action(input: &str) -> Result<MoodAction, CommandError> {
    let lower = input.trim().to_lowercase();
    let lower = lower.strip_prefix('/').unwrap_or(&lower);
    let (verb, rest) = match lower.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (lower, ""),
    };

    match verb {
        "next" | "more" | "another" => Ok(MoodAction::Next(category_arg(verb, rest)?)),
        "stop" | "hide" => Ok(MoodAction::Stop(category_arg(verb, rest)?)),
        "play" if rest.is_empty() || rest == "music" => Ok(MoodAction::PlayMusic),
        "play" => Err(CommandError::UnsupportedArgument {
            command: "play".to_string(),
            arg: rest.to_string(),
        }),
        "save" => Ok(MoodAction::Save),
        "close" | "dismiss" | "done" | "exit" | "quit" => Ok(MoodAction::Close),
        "help" | "?" => Ok(MoodAction::Help),
        _ => {
            let (reaction_text, category) = match lower.rsplit_once(char::is_whitespace) {
                Some((head, tail)) => match Category::parse_str(tail) {
                    Some(category) => (head.trim(), Some(category)),
                    None => (lower, None),
                },
                None => (lower, None),
            };
            Reaction::parse_str(reaction_text)
                .map(|reaction| MoodAction::React(category, reaction))
                .ok_or_else(|| CommandError::UnknownCommand(input.trim().to_string()))
        }
    }
}

fn category_arg(verb: &str, rest: &str) -> Result<Category, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgument {
            command: verb.to_string(),
            usage: format!(
                "{} <jokes|images|music|games|activities|mindfulness>",
                verb
            ),
        });
    }
    Category::parse_str(rest).ok_or_else(|| CommandError::UnsupportedArgument {
        command: verb.to_string(),
        arg: rest.to_string(),
    })
}

/// Print help for the mood loop
pub fn print_mood_help() {
    println!(
        r#"
Mood Support Actions
====================

  next <category>     - Show another item (jokes, images, music, games,
                        activities, mindfulness)
  stop <category>     - Hide a category
  play music          - Play the current track
  helped [category]   - That helped
  neutral [category]  - It was fine
  not helpful         - That did not help
  save                - Save this check-in and close
  close               - Close without saving
"#
    );
}
