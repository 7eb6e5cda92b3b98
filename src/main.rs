//! Coachkit - nutrition coaching chat and mood support
//!
#![doc = "Main entry point for the Coachkit terminal host."]

use anyhow::Result;

use coachkit::cli::{Cli, Commands, ProfileCommand, SessionCommand};
use coachkit::commands::{self, profile::ProfileArgs, Host};
use coachkit::config::Config;
use coachkit::error::CoachError;
use coachkit::intent::Mood;
use coachkit::logging::init_logging;
use coachkit::profile::{ExternalEvent, WorkoutKind};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    init_logging(&config.logging)?;

    // Validate configuration
    config.validate()?;

    let host = Host::open(config)?;

    // Execute command
    match cli.command {
        Commands::Chat => {
            commands::chat::run_chat(host).await?;
        }
        Commands::Ask {
            query,
            workout,
            minutes,
            calories,
        } => {
            let event = match workout {
                Some(label) => {
                    let activity = WorkoutKind::parse_str(&label).ok_or_else(|| {
                        CoachError::Command(format!("Unknown workout kind: {}", label))
                    })?;
                    Some(ExternalEvent::WorkoutCompleted {
                        activity,
                        duration_minutes: minutes,
                        calories_burned: calories,
                    })
                }
                None => None,
            };
            commands::ask::run_ask(&host, &query, event).await?;
        }
        Commands::Mood {
            rating,
            feeling,
            note,
        } => {
            if !(1..=5).contains(&rating) {
                return Err(CoachError::Command(format!(
                    "Rating must be between 1 and 5, got {}",
                    rating
                ))
                .into());
            }
            let feeling = match feeling {
                Some(label) => Some(Mood::parse_str(&label).ok_or_else(|| {
                    CoachError::Command(format!("Unknown feeling: {}", label))
                })?),
                None => None,
            };
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            commands::mood::run_mood(&host, rating, feeling, &note, stdin).await?;
        }
        Commands::Profile { command } => match command {
            ProfileCommand::Set {
                id,
                name,
                goal,
                activity,
                weight,
                stress,
                restrictions,
                allergies,
                concerns,
                mood_goals,
            } => {
                let args = ProfileArgs {
                    id,
                    name,
                    goal,
                    activity,
                    weight,
                    stress,
                    restrictions,
                    allergies,
                    concerns,
                    mood_goals,
                };
                commands::profile::set_profile(&host, args).await?;
            }
            ProfileCommand::Show => commands::profile::show_profile(&host).await?,
        },
        Commands::Session { command } => match command {
            SessionCommand::Status => commands::session::show_status(&host).await,
            SessionCommand::Refresh => commands::session::refresh(&host).await?,
            SessionCommand::Logout => commands::session::logout(&host).await,
        },
        Commands::History { command } => {
            commands::history::handle_history(&host, command)?;
        }
    }

    Ok(())
}
