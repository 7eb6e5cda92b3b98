//! Command-line interface definition for Coachkit
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chat, mood check-ins, profile and session
//! management, and the saved-intervention journal.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Coachkit - nutrition coaching chat and mood support
#[derive(Parser, Debug, Clone)]
#[command(name = "coachkit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Never call the remote generation service
    #[arg(long)]
    pub offline: bool,

    /// Directory for the session database and mood journal
    #[arg(long, env = "COACHKIT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Coachkit
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive coaching chat
    Chat,

    /// Ask a single question and print the answer
    Ask {
        /// The question
        query: String,

        /// A workout just completed (cardio, strength, hiit, yoga, ...)
        #[arg(long)]
        workout: Option<String>,

        /// Workout duration in minutes
        #[arg(long, default_value_t = 30)]
        minutes: u32,

        /// Estimated calories burned by the workout
        #[arg(long)]
        calories: Option<f64>,
    },

    /// Report how you feel; low moods open an interactive support loop
    Mood {
        /// Rating from 1 (awful) to 5 (great)
        #[arg(short, long)]
        rating: u8,

        /// Pre-selected feeling (sad, anxious, angry, stressed, happy, neutral)
        #[arg(short, long)]
        feeling: Option<String>,

        /// Free-text note
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// Manage the user profile
    Profile {
        /// Profile subcommand
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Inspect or control the current session
    Session {
        /// Session subcommand
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Browse saved mood interventions
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

/// Profile subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ProfileCommand {
    /// Create or update the profile; starts a session when none is live
    Set {
        /// Identity key
        #[arg(long)]
        id: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Goal (weight_loss, weight_gain, maintenance, muscle_gain)
        #[arg(long, default_value = "maintenance")]
        goal: String,

        /// Activity level (sedentary, light, moderate, active, very_active)
        #[arg(long, default_value = "moderate")]
        activity: String,

        /// Body weight in kilograms
        #[arg(long)]
        weight: Option<f64>,

        /// Stress level from 1 to 5
        #[arg(long)]
        stress: Option<u8>,

        /// Dietary restriction (repeatable)
        #[arg(long = "restriction")]
        restrictions: Vec<String>,

        /// Food allergy (repeatable)
        #[arg(long = "allergy")]
        allergies: Vec<String>,

        /// Area of concern (repeatable)
        #[arg(long = "concern")]
        concerns: Vec<String>,

        /// Mood goal (repeatable)
        #[arg(long = "mood-goal")]
        mood_goals: Vec<String>,
    },

    /// Print the current profile
    Show,
}

/// Session subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// Show lifecycle state and expiry
    Status,
    /// Extend the session by its full lifetime
    Refresh,
    /// Clear the session and all buffers
    Logout,
}

/// History subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List saved interventions, newest first
    List {
        /// Maximum rows to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Show everything recorded for one saved intervention
    Show {
        /// Intervention id (full or prefix)
        id: String,
    },
    /// Delete a saved intervention
    Delete {
        /// Intervention id (full or prefix)
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            offline: false,
            data_dir: None,
            command: Commands::Session {
                command: SessionCommand::Status,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(!cli.offline);
        assert!(matches!(
            cli.command,
            Commands::Session {
                command: SessionCommand::Status
            }
        ));
    }

    #[test]
    fn test_cli_parse_ask_with_workout() {
        let cli = Cli::try_parse_from([
            "coachkit",
            "--offline",
            "ask",
            "what should I eat after my run?",
            "--workout",
            "cardio",
            "--minutes",
            "45",
        ])
        .unwrap();
        assert!(cli.offline);
        match cli.command {
            Commands::Ask {
                query,
                workout,
                minutes,
                calories,
            } => {
                assert_eq!(query, "what should I eat after my run?");
                assert_eq!(workout.as_deref(), Some("cardio"));
                assert_eq!(minutes, 45);
                assert_eq!(calories, None);
            }
            other => panic!("Expected Ask, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_mood() {
        let cli = Cli::try_parse_from([
            "coachkit", "mood", "-r", "2", "-f", "anxious", "-n", "exam tomorrow",
        ])
        .unwrap();
        match cli.command {
            Commands::Mood {
                rating,
                feeling,
                note,
            } => {
                assert_eq!(rating, 2);
                assert_eq!(feeling.as_deref(), Some("anxious"));
                assert_eq!(note, "exam tomorrow");
            }
            other => panic!("Expected Mood, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_profile_set_repeatable_flags() {
        let cli = Cli::try_parse_from([
            "coachkit",
            "profile",
            "set",
            "--id",
            "u1",
            "--goal",
            "muscle_gain",
            "--allergy",
            "peanuts",
            "--allergy",
            "shellfish",
        ])
        .unwrap();
        match cli.command {
            Commands::Profile {
                command:
                    ProfileCommand::Set {
                        id,
                        goal,
                        allergies,
                        activity,
                        ..
                    },
            } => {
                assert_eq!(id, "u1");
                assert_eq!(goal, "muscle_gain");
                assert_eq!(activity, "moderate");
                assert_eq!(allergies, vec!["peanuts", "shellfish"]);
            }
            other => panic!("Expected Profile Set, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_history_list_default_limit() {
        let cli = Cli::try_parse_from(["coachkit", "history", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::History {
                command: HistoryCommand::List { limit: 20 }
            }
        ));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["coachkit"]).is_err());
    }
}
