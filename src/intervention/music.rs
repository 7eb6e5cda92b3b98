//! Music playback side channel
//!
//! Starting a track supersedes whatever was loading or playing. A pending
//! start is confirmed with the [`PlayTicket`] it returned; a stale ticket is
//! ignored, so a slow load that resolves after `stop` or a newer `play` has
//! no effect. `stop` is always safe to call.

/// Handle for one `play` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayTicket(u64);

/// Current playback state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playback {
    /// Nothing playing
    Stopped,
    /// A track was requested and has not started yet
    Loading(String),
    /// A track is playing
    Playing(String),
}

/// Tracks which song, if any, is playing
///
/// # Examples
///
/// ```
/// use coachkit::intervention::MusicPlayer;
///
/// let mut player = MusicPlayer::new();
/// let first = player.play("Lovely Day - Bill Withers");
/// let second = player.play("Here Comes the Sun - The Beatles");
/// assert!(!player.confirm(first));
/// assert!(player.confirm(second));
/// assert_eq!(player.now_playing(), Some("Here Comes the Sun - The Beatles"));
/// player.stop();
/// player.stop();
/// assert!(!player.is_active());
/// ```
#[derive(Debug, Clone)]
pub struct MusicPlayer {
    generation: u64,
    playback: Playback,
}

impl MusicPlayer {
    /// Creates a stopped player
    pub fn new() -> Self {
        Self {
            generation: 0,
            playback: Playback::Stopped,
        }
    }

    /// Requests `track`, stopping anything in flight
    pub fn play(&mut self, track: impl Into<String>) -> PlayTicket {
        self.stop();
        let track = track.into();
        tracing::debug!("Loading track: {}", track);
        self.playback = Playback::Loading(track);
        PlayTicket(self.generation)
    }

    /// Marks the request behind `ticket` as started
    ///
    /// Returns false when the ticket was superseded.
    pub fn confirm(&mut self, ticket: PlayTicket) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!("Ignoring superseded track start");
            return false;
        }
        match std::mem::replace(&mut self.playback, Playback::Stopped) {
            Playback::Loading(track) | Playback::Playing(track) => {
                self.playback = Playback::Playing(track);
                true
            }
            Playback::Stopped => false,
        }
    }

    /// Stops playback; safe in any state
    pub fn stop(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.playback != Playback::Stopped {
            tracing::debug!("Stopping music");
        }
        self.playback = Playback::Stopped;
    }

    /// Current playback state
    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    /// Title of the playing track
    pub fn now_playing(&self) -> Option<&str> {
        match &self.playback {
            Playback::Playing(track) => Some(track),
            _ => None,
        }
    }

    /// Whether a track is loading or playing
    pub fn is_active(&self) -> bool {
        self.playback != Playback::Stopped
    }
}

impl Default for MusicPlayer {
    fn default() -> Self {
        Self::new()
    }
}
