//! Periodic lifecycle evaluation

use super::manager::SessionManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Drives [`SessionManager::tick`] every `period` until the handle is aborted
///
/// Warning and expiry notifications reach the host through the manager's
/// event channel.
///
/// # Examples
///
/// ```
/// use coachkit::clock::system_clock;
/// use coachkit::config::Config;
/// use coachkit::session::{spawn_watchdog, MemorySessionStore, SessionManager};
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tokio::sync::Mutex;
///
/// # #[tokio::main]
/// # async fn main() {
/// let manager = SessionManager::from_config(
///     &Config::default(),
///     Box::new(MemorySessionStore::new()),
///     system_clock(),
/// );
/// let manager = Arc::new(Mutex::new(manager));
/// let handle = spawn_watchdog(Arc::clone(&manager), Duration::from_secs(30));
/// handle.abort();
/// # }
/// ```
pub fn spawn_watchdog(manager: Arc<Mutex<SessionManager>>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let mut manager = manager.lock().await;
            if let Some(event) = manager.tick() {
                tracing::debug!("Session watchdog: {:?}", event);
            }
        }
    })
}
