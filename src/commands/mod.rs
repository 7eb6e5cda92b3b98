/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`    : Interactive coaching chat
- `ask`     : One question, one answer
- `mood`    : Mood check-in and intervention loop
- `profile` : Create or inspect the user profile
- `session` : Session status, refresh and logout
- `history` : Saved interventions from the mood journal

Every handler works on a [`Host`], which wires the engine, the session
manager and the journal together from the loaded configuration.
*/

use crate::clock::{system_clock, Clock, SharedClock};
use crate::config::Config;
use crate::engine::{CoachEngine, ResponseSource, SynthesizedResponse};
use crate::error::{CoachError, Result};
use crate::profile::{HistoryEntry, UserProfile};
use crate::session::{SessionManager, SledSessionStore};
use crate::storage::MoodJournal;

use anyhow::Context;
use colored::Colorize;
use std::sync::Arc;
use tokio::sync::Mutex;

pub mod history;
pub mod special_commands;

/// File name of the session database inside the data directory
pub const SESSION_DB: &str = "session.db";

/// Everything a command needs, built once per process
#[derive(Debug)]
pub struct Host {
    /// Loaded configuration
    pub config: Config,
    /// The coaching engine
    pub engine: CoachEngine,
    /// Session lifecycle, shared with the watchdog
    pub session: Arc<Mutex<SessionManager>>,
    /// Mood journal; absent when the database could not be opened
    pub journal: Option<MoodJournal>,
    /// Time source shared by every component
    pub clock: SharedClock,
}

impl Host {
    /// Opens the host against the configured data directory
    ///
    /// # Errors
    ///
    /// Returns error if the data directory or session database cannot be
    /// opened, or the generation provider cannot be built
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with_clock(config, system_clock())
    }

    /// Opens the host with an explicit clock
    ///
    /// # Errors
    ///
    /// See [`Host::open`]
    pub fn open_with_clock(config: Config, clock: SharedClock) -> Result<Self> {
        let data_dir = config.data_dir()?;
        std::fs::create_dir_all(&data_dir)
            .context("Failed to create data directory")
            .map_err(|e| CoachError::Storage(format!("{:#}", e)))?;

        let store = SledSessionStore::open(data_dir.join(SESSION_DB))?;
        let mut session = SessionManager::from_config(&config, Box::new(store), clock.clone());
        let state = session.init();
        tracing::debug!("Session state at startup: {}", state);

        let engine = CoachEngine::from_config(&config, clock.clone())?;
        engine.set_offline(session.is_expired());

        let journal = match MoodJournal::in_dir(&data_dir) {
            Ok(journal) => Some(journal),
            Err(e) => {
                tracing::warn!("Mood journal unavailable: {:#}", e);
                None
            }
        };

        Ok(Self {
            config,
            engine,
            session: Arc::new(Mutex::new(session)),
            journal,
            clock,
        })
    }

    /// Profile of the current session, if any
    pub async fn profile(&self) -> Option<UserProfile> {
        self.session.lock().await.profile().cloned()
    }

    /// Profile of the current session
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Command` when no profile has been set
    pub async fn require_profile(&self) -> Result<UserProfile> {
        self.profile().await.ok_or_else(|| {
            CoachError::Command(
                "No profile yet. Run `coachkit profile set --id <name>` first".to_string(),
            )
            .into()
        })
    }

    /// Recent mood check-ins as generic history entries, oldest first
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.session
            .lock()
            .await
            .mood_history()
            .iter()
            .map(|saved| saved.entry.to_history_entry())
            .collect()
    }

    /// Evaluates session expiry and mirrors it into the engine's offline flag
    pub async fn sync_offline(&self) {
        let mut session = self.session.lock().await;
        session.tick();
        self.engine.set_offline(session.is_expired());
    }
}

/// Print a coach reply with its provenance
pub fn print_response(response: &SynthesizedResponse) {
    println!("\n{}\n", response.text);
    let origin = match response.source {
        ResponseSource::Remote => "online".green(),
        ResponseSource::Local => "offline".yellow(),
    };
    if response.sources.is_empty() {
        println!("{}", format!("[{}]", origin).dimmed());
    } else {
        println!(
            "{} {}",
            format!("[{}]", origin).dimmed(),
            format!("topics: {}", response.sources.join(", ")).dimmed()
        );
    }
    println!();
}

// One-shot question handler
pub mod ask {
    //! Answers a single question and records both turns in the session.

    use super::*;
    use crate::profile::ExternalEvent;

    /// Ask one question
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Command` when no profile has been set
    pub async fn run_ask(host: &Host, query: &str, event: Option<ExternalEvent>) -> Result<()> {
        let response = ask_once(host, query, event.as_ref()).await?;
        print_response(&response);
        Ok(())
    }

    /// Runs one question through the engine and persists the session
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Command` when no profile has been set
    pub async fn ask_once(
        host: &Host,
        query: &str,
        event: Option<&ExternalEvent>,
    ) -> Result<SynthesizedResponse> {
        let profile = host.require_profile().await?;
        host.sync_offline().await;
        let history = host.history().await;

        // The lock is released while the remote service is awaited so the
        // watchdog can keep ticking.
        let mut conversation = {
            let mut session = host.session.lock().await;
            session.touch();
            session.conversation().clone()
        };
        let response = host
            .engine
            .ask(&mut conversation, &profile, &history, query, event)
            .await;

        let mut session = host.session.lock().await;
        *session.conversation_mut() = conversation;
        if let Err(e) = session.persist() {
            tracing::warn!("Failed to persist session: {:#}", e);
        }
        Ok(response)
    }
}

// Interactive chat handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Runs a readline loop that sends questions to the coach and handles
    //! slash commands. A watchdog ticks the session in the background and
    //! its warnings are printed between prompts.

    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use crate::session::{spawn_watchdog, SessionEvent};
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    /// How often the background watchdog evaluates session expiry
    pub const WATCHDOG_PERIOD: Duration = Duration::from_secs(30);

    /// Start interactive chat mode
    ///
    /// # Errors
    ///
    /// Returns error when no profile has been set or the line editor cannot
    /// be created
    pub async fn run_chat(host: Host) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let profile = host.require_profile().await?;
        let mut events = host.session.lock().await.subscribe();
        let watchdog = spawn_watchdog(host.session.clone(), WATCHDOG_PERIOD);

        let mut rl = DefaultEditor::new()?;
        print_welcome_banner(&profile, &host);

        loop {
            drain_events(&host, &mut events);
            match rl.readline("coach> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Ok(SpecialCommand::ShowStatus) => {
                            print_status_display(&host).await;
                            continue;
                        }
                        Ok(SpecialCommand::Clear) => {
                            let mut session = host.session.lock().await;
                            session.conversation_mut().clear();
                            if let Err(e) = session.persist() {
                                tracing::warn!("Failed to persist session: {:#}", e);
                            }
                            println!("Conversation cleared.\n");
                            continue;
                        }
                        Ok(SpecialCommand::Refresh) => {
                            if host.session.lock().await.refresh() {
                                host.engine.set_offline(false);
                                println!("{}\n", "Session extended.".green());
                            }
                            continue;
                        }
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::None) => {}
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    }

                    rl.add_history_entry(trimmed)?;
                    let response = ask::ask_once(&host, trimmed, None).await?;
                    print_response(&response);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        watchdog.abort();
        println!("Goodbye!");
        Ok(())
    }

    fn drain_events(host: &Host, events: &mut UnboundedReceiver<SessionEvent>) {
        while let Ok(event) = events.try_recv() {
            match event {
                SessionEvent::Warning { remaining } => {
                    println!(
                        "{}",
                        format!(
                            "Your session expires in {} minutes. Type /refresh to extend it.",
                            remaining.num_minutes()
                        )
                        .yellow()
                    );
                }
                SessionEvent::Expired => {
                    host.engine.set_offline(true);
                    println!(
                        "{}",
                        "Your session expired. Answers are offline until you /refresh.".yellow()
                    );
                }
                SessionEvent::Refreshed => host.engine.set_offline(false),
                other => tracing::debug!("Session event: {:?}", other),
            }
        }
    }

    fn print_welcome_banner(profile: &UserProfile, host: &Host) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                Coachkit Chat - Welcome!                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        let who = profile.name.as_deref().unwrap_or(&profile.id);
        println!("Coaching {} on {}", who.cyan(), profile.goal.phrase());
        if host.engine.has_remote() && !host.engine.is_offline() {
            println!("Answers: {}", "online".green());
        } else {
            println!("Answers: {}", "offline".yellow());
        }
        println!("\nType '/help' for available commands, 'exit' to quit\n");
    }

    async fn print_status_display(host: &Host) {
        let session = host.session.lock().await;
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Coachkit Session Status                   ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Session:           {}", super::session::colored_state(session.state()));
        println!(
            "Remote answers:    {}",
            if host.engine.has_remote() && !host.engine.is_offline() {
                "enabled".green()
            } else {
                "disabled".yellow()
            }
        );
        println!("Conversation Size: {} turns", session.conversation().len());
        println!("Saved check-ins:   {}", session.mood_history().len());
        println!();
    }
}

// Mood check-in handler
pub mod mood {
    //! Mood check-in handler.
    //!
    //! A low report opens an [`InterventionMachine`] with local content and
    //! starts a background fetch of remote jokes and images. The loop then
    //! reads actions line by line while merging remote content as it lands
    //! and closing itself after the configured idle time.

    use super::special_commands::{parse_mood_action, print_mood_help, MoodAction};
    use super::*;
    use crate::intent::Mood;
    use crate::intervention::{
        remote_content_stream, Category, CloseOutcome, InterventionItem, InterventionMachine,
        RemoteBatch, SavedIntervention, TriggerOutcome,
    };
    use crate::profile::MoodEntry;
    use crate::providers;
    use futures::stream::{BoxStream, StreamExt};
    use std::time::Duration;
    use tokio::io::{AsyncBufRead, AsyncBufReadExt};

    /// Report a mood and, when it is low, run the intervention loop
    ///
    /// Actions are read from `input` one per line; end of input dismisses
    /// the intervention. Returns the saved intervention when the user saved.
    ///
    /// # Errors
    ///
    /// Returns error if content providers cannot be built or reading input
    /// fails
    pub async fn run_mood<R>(
        host: &Host,
        rating: u8,
        feeling: Option<Mood>,
        note: &str,
        input: R,
    ) -> Result<Option<SavedIntervention>>
    where
        R: AsyncBufRead + Unpin,
    {
        host.sync_offline().await;
        let profile = host.profile().await.unwrap_or_default();
        let entry = MoodEntry::new(host.clock.now(), rating, feeling, note);
        let mood = host.engine.classify_mood(feeling, note, entry.rating);

        let mut machine =
            InterventionMachine::new(host.config.intervention.clone(), host.clock.clone());
        let trigger_id =
            match machine.trigger(entry, mood, host.engine.retrieval(), &profile) {
                TriggerOutcome::Opened(id) => id,
                TriggerOutcome::NotLow | TriggerOutcome::AlreadyOpen => {
                    println!(
                        "Thanks for checking in. Sounds like you're feeling {}. Keep it up!",
                        mood.to_string().green()
                    );
                    return Ok(None);
                }
            };

        let mut remote = open_remote_stream(host, trigger_id)?;
        print_offer(&machine);

        let mut lines = input.lines();
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        let mut last_category: Option<Category> = None;

        loop {
            tokio::select! {
                batch = next_remote(&mut remote) => {
                    if let Some(batch) = batch {
                        let added = machine.merge_remote(batch);
                        if added > 0 {
                            println!("{}", format!("{} more things just arrived. Try `next jokes` or `next images`.", added).dimmed());
                        }
                    }
                }
                _ = ticker.tick() => {
                    if machine.tick() {
                        println!("Closing this check-in after a quiet spell. Take care!");
                        return Ok(None);
                    }
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        machine.close(CloseOutcome::Dismiss);
                        return Ok(None);
                    };
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let action = match parse_mood_action(trimmed) {
                        Ok(action) => action,
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    };
                    touch_session(host).await;
                    match action {
                        MoodAction::Next(category) => {
                            last_category = Some(category);
                            match machine.advance(category).cloned() {
                                Some(item) => print_item(&item),
                                None => println!("Nothing to show for {}.", category),
                            }
                        }
                        MoodAction::Stop(category) => {
                            machine.stop(category);
                            println!("No more {}.", category);
                        }
                        MoodAction::React(category, reaction) => {
                            match category.or(last_category) {
                                Some(category) if machine.react(category, reaction) => {
                                    println!("Thanks, noted.");
                                }
                                Some(category) => println!("Nothing to react to in {}.", category),
                                None => println!("Which one? For example `helped jokes`."),
                            }
                        }
                        MoodAction::PlayMusic => match machine.play_music() {
                            Some(ticket) => {
                                let player = machine.music_mut();
                                if player.confirm(ticket) {
                                    if let Some(track) = player.now_playing() {
                                        println!("{} {}", "Now playing:".cyan(), track);
                                    }
                                }
                            }
                            None => println!("No music to play."),
                        },
                        MoodAction::Save => {
                            return match machine.close(CloseOutcome::Save) {
                                Some(saved) => {
                                    keep_saved(host, &saved).await;
                                    println!("{}", "Saved. Take care of yourself.".green());
                                    Ok(Some(saved))
                                }
                                None => Ok(None),
                            };
                        }
                        MoodAction::Close => {
                            machine.close(CloseOutcome::Dismiss);
                            println!("Take care!");
                            return Ok(None);
                        }
                        MoodAction::Help => print_mood_help(),
                    }
                }
            }
        }
    }

    /// Remote jokes and images for `trigger_id`, one batch per source as it lands
    fn open_remote_stream(
        host: &Host,
        trigger_id: String,
    ) -> Result<Option<BoxStream<'static, RemoteBatch>>> {
        if host.engine.is_offline() {
            return Ok(None);
        }
        let sources = providers::create_content_providers(&host.config.content)?;
        if sources.is_empty() {
            return Ok(None);
        }
        let timeout = Duration::from_millis(host.config.content.timeout_ms);
        Ok(Some(
            remote_content_stream(trigger_id, sources, timeout).boxed(),
        ))
    }

    /// Next remote batch; pends forever once the stream is exhausted
    async fn next_remote(
        remote: &mut Option<BoxStream<'static, RemoteBatch>>,
    ) -> Option<RemoteBatch> {
        let Some(stream) = remote.as_mut() else {
            return std::future::pending().await;
        };
        let batch = stream.next().await;
        if batch.is_none() {
            *remote = None;
        }
        batch
    }

    async fn touch_session(host: &Host) {
        let mut session = host.session.lock().await;
        session.touch();
        if let Err(e) = session.persist() {
            tracing::warn!("Failed to persist session: {:#}", e);
        }
    }

    async fn keep_saved(host: &Host, saved: &SavedIntervention) {
        if let Err(e) = host.session.lock().await.record_mood(saved.clone()) {
            tracing::warn!("Check-in not added to session: {:#}", e);
        }
        if let Some(journal) = &host.journal {
            if let Err(e) = journal.save(saved) {
                tracing::warn!("Failed to journal check-in: {:#}", e);
            }
        }
    }

    fn print_offer(machine: &InterventionMachine) {
        println!("\nI'm sorry you're having a hard time. Here are a few things that might help:\n");
        if let Some(point) = machine.bundle().and_then(|b| b.talking_point()) {
            println!("{}\n", point);
        }
        for category in Category::ALL {
            if let Some(item) = machine.current(category) {
                print_item(item);
            }
        }
        println!("\nType `help` for options, `save` to keep this check-in, `close` to finish.\n");
    }

    fn print_item(item: &InterventionItem) {
        let label = format!("[{}]", item.category).cyan();
        match &item.url {
            Some(url) if item.text.is_empty() => println!("{} {}", label, url),
            Some(url) => println!("{} {} ({})", label, item.text, url),
            None => println!("{} {}", label, item.text),
        }
    }
}

// Profile handlers
pub mod profile {
    //! Create, update and show the user profile.

    use super::*;
    use crate::profile::{ActivityLevel, Goal};

    /// Profile fields collected from the command line
    #[derive(Debug, Clone, Default)]
    pub struct ProfileArgs {
        /// Identity key
        pub id: String,
        /// Display name
        pub name: Option<String>,
        /// Goal label
        pub goal: String,
        /// Activity level label
        pub activity: String,
        /// Body weight in kilograms
        pub weight: Option<f64>,
        /// Stress level 1-5
        pub stress: Option<u8>,
        /// Dietary restrictions
        pub restrictions: Vec<String>,
        /// Allergies
        pub allergies: Vec<String>,
        /// Concerns
        pub concerns: Vec<String>,
        /// Mood goals
        pub mood_goals: Vec<String>,
    }

    impl ProfileArgs {
        /// Validates the labels and builds a profile
        ///
        /// # Errors
        ///
        /// Returns `CoachError::Command` for an empty id, an unknown goal or
        /// activity level, a stress level outside 1-5 or a non-positive
        /// weight
        pub fn into_profile(self) -> Result<UserProfile> {
            let id = self.id.trim().to_string();
            if id.is_empty() {
                return Err(CoachError::Command("Profile id cannot be empty".to_string()).into());
            }
            let goal = Goal::parse_str(&self.goal).ok_or_else(|| {
                CoachError::Command(format!(
                    "Unknown goal: {}. Must be one of: weight_loss, weight_gain, maintenance, muscle_gain",
                    self.goal
                ))
            })?;
            let activity_level = ActivityLevel::parse_str(&self.activity).ok_or_else(|| {
                CoachError::Command(format!(
                    "Unknown activity level: {}. Must be one of: sedentary, light, moderate, active, very_active",
                    self.activity
                ))
            })?;
            if let Some(stress) = self.stress {
                if !(1..=5).contains(&stress) {
                    return Err(CoachError::Command(format!(
                        "Stress level must be between 1 and 5, got {}",
                        stress
                    ))
                    .into());
                }
            }
            if let Some(weight) = self.weight {
                if weight <= 0.0 {
                    return Err(CoachError::Command(format!(
                        "Weight must be positive, got {}",
                        weight
                    ))
                    .into());
                }
            }

            Ok(UserProfile {
                id,
                name: self.name,
                goal,
                activity_level,
                stress_level: self.stress,
                weight_kg: self.weight,
                dietary_restrictions: self.restrictions,
                allergies: self.allergies,
                concerns: self.concerns,
                mood_goals: self.mood_goals,
            })
        }
    }

    /// Create or update the profile
    ///
    /// The same id updates the live session in place, refreshing it if it
    /// had expired; a different id, or no session, starts a new one.
    ///
    /// # Errors
    ///
    /// Returns error for invalid fields or when the profile cannot be saved
    pub async fn set_profile(host: &Host, args: ProfileArgs) -> Result<()> {
        let profile = args.into_profile()?;
        let mut session = host.session.lock().await;

        let same_user = session.profile().map(|p| p.id == profile.id).unwrap_or(false);
        if same_user {
            if session.is_expired() {
                session.refresh();
                host.engine.set_offline(false);
            }
            session.update_profile(profile)?;
            println!("{}", "Profile updated.".green());
        } else {
            let id = profile.id.clone();
            session.create(profile);
            host.engine.set_offline(false);
            println!("{}", format!("Session started for {}.", id).green());
        }
        Ok(())
    }

    /// Print the current profile as YAML
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Command` when no profile has been set
    pub async fn show_profile(host: &Host) -> Result<()> {
        let profile = host.require_profile().await?;
        print!("{}", serde_yaml::to_string(&profile)?);
        Ok(())
    }
}

// Session handlers
pub mod session {
    //! Session status, refresh and logout.

    use super::*;
    use crate::session::SessionState;
    use colored::ColoredString;

    /// Colored label for a session state
    pub fn colored_state(state: SessionState) -> ColoredString {
        match state {
            SessionState::Active => state.to_string().green(),
            SessionState::Warning => state.to_string().yellow(),
            SessionState::Expired => state.to_string().red(),
            SessionState::Uninitialized => state.to_string().dimmed(),
        }
    }

    /// Print lifecycle state and expiry
    pub async fn show_status(host: &Host) {
        let mut session = host.session.lock().await;
        session.tick();
        println!("State:         {}", colored_state(session.state()));
        if let Some(record) = session.record() {
            let remaining = record.remaining(host.clock.now());
            println!("Profile:       {}", record.profile.id);
            println!(
                "Expires:       {} ({}h {}m left)",
                record.expires_at.format("%Y-%m-%d %H:%M"),
                remaining.num_hours(),
                remaining.num_minutes() % 60
            );
            println!("Conversation:  {} turns", session.conversation().len());
            println!("Check-ins:     {}", session.mood_history().len());
        }
    }

    /// Extend the session
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Command` when there is no session
    pub async fn refresh(host: &Host) -> Result<()> {
        if !host.session.lock().await.refresh() {
            return Err(CoachError::Command("No session to refresh".to_string()).into());
        }
        host.engine.set_offline(false);
        println!("{}", "Session extended.".green());
        Ok(())
    }

    /// Clear the session and its buffers
    pub async fn logout(host: &Host) {
        host.session.lock().await.logout();
        println!("Logged out.");
    }
}
