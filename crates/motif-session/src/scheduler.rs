//! Autosave Scheduler
//!
//! ```text
//! Idle
//!   ↓ all surfaces ready (restores "Auto Save" if present)
//! Armed ──every interval──▶ save "Auto Save"
//!   │   ──every backup_interval──▶ save "Backup Save"
//!   ↓ content change
//! PendingDebounce ──change──▶ PendingDebounce (timer restarts)
//!   ↓ debounce elapsed: save "Auto Save"
//! Armed
//! ```

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::SessionError;
use crate::manager::SessionManager;
use crate::registry::{AUTO_SAVE, BACKUP_SAVE};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// Waiting for the editors; no timers running
    Idle,
    /// Periodic timers running
    Armed,
    /// A content change is waiting out the debounce window
    PendingDebounce,
}

impl SchedulerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerState::Idle => "idle",
            SchedulerState::Armed => "armed",
            SchedulerState::PendingDebounce => "pending_debounce",
        }
    }
}

impl std::fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Short cycle, saved as "Auto Save"
    pub interval_secs: u64,
    /// Long cycle, saved as "Backup Save"
    pub backup_interval_secs: u64,
    pub debounce_ms: u64,
}

impl AutosaveConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn backup_interval(&self) -> Duration {
        Duration::from_secs(self.backup_interval_secs.max(1))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            backup_interval_secs: 300,
            debounce_ms: 1000,
        }
    }
}

pub struct AutosaveScheduler;

impl AutosaveScheduler {
    /// Spawn the scheduler on the current tokio runtime.
    ///
    /// Fails with [`SessionError::NoRuntime`] outside a runtime. Dropping the
    /// returned handle stops the scheduler.
    pub fn start(manager: SessionManager, config: AutosaveConfig) -> Result<AutosaveHandle> {
        let runtime = Handle::try_current().map_err(|_| SessionError::NoRuntime)?;

        let state = Arc::new(RwLock::new(SchedulerState::Idle));
        let (changes_tx, changes_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = runtime.spawn(run(
            manager,
            config,
            Arc::clone(&state),
            changes_rx,
            shutdown_rx,
        ));

        Ok(AutosaveHandle {
            state,
            changes: changes_tx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }
}

pub struct AutosaveHandle {
    state: Arc<RwLock<SchedulerState>>,
    changes: mpsc::UnboundedSender<()>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl AutosaveHandle {
    pub fn state(&self) -> SchedulerState {
        *self.state.read()
    }

    /// Report an edit on any surface. Bursts collapse into one save.
    pub fn notify_change(&self) {
        // The task only goes away after stop(), when changes no longer matter
        let _ = self.changes.send(());
    }

    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Autosave task ended abnormally");
            }
        }
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn run(
    manager: SessionManager,
    config: AutosaveConfig,
    state: Arc<RwLock<SchedulerState>>,
    mut changes: mpsc::UnboundedReceiver<()>,
    mut shutdown: oneshot::Receiver<()>,
) {
    tokio::select! {
        _ = manager.surfaces().ready() => {}
        _ = &mut shutdown => return,
    }

    // Restore the last autosave before anything can overwrite it
    match manager.load(AUTO_SAVE, true).await {
        Ok(true) => tracing::info!("Restored Auto Save"),
        Ok(false) => {}
        Err(e) => tracing::error!(error = %e, "Failed to restore Auto Save"),
    }

    // Edits reported while idle predate the restore
    while changes.try_recv().is_ok() {}

    let start = Instant::now();
    let mut autosave = tokio::time::interval_at(start + config.interval(), config.interval());
    let mut backup =
        tokio::time::interval_at(start + config.backup_interval(), config.backup_interval());
    autosave.set_missed_tick_behavior(MissedTickBehavior::Delay);
    backup.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let debounce = tokio::time::sleep(config.debounce());
    tokio::pin!(debounce);
    let mut pending = false;

    set_state(&state, SchedulerState::Armed);
    tracing::info!(
        interval_secs = config.interval().as_secs(),
        backup_interval_secs = config.backup_interval().as_secs(),
        "Autosave armed"
    );

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = autosave.tick() => autosave_to(&manager, AUTO_SAVE),
            _ = backup.tick() => autosave_to(&manager, BACKUP_SAVE),
            Some(()) = changes.recv() => {
                debounce.as_mut().reset(Instant::now() + config.debounce());
                pending = true;
                set_state(&state, SchedulerState::PendingDebounce);
            }
            _ = &mut debounce, if pending => {
                pending = false;
                set_state(&state, SchedulerState::Armed);
                autosave_to(&manager, AUTO_SAVE);
            }
        }
    }

    set_state(&state, SchedulerState::Idle);
    tracing::info!("Autosave stopped");
}

fn autosave_to(manager: &SessionManager, name: &str) {
    if let Err(e) = manager.save_now(name) {
        tracing::error!(session_name = %name, error = %e, "Autosave failed");
    }
}

fn set_state(state: &RwLock<SchedulerState>, next: SchedulerState) {
    let mut current = state.write();
    if *current != next {
        tracing::debug!(from = %*current, to = %next, "Autosave state change");
        *current = next;
    }
}
