//! Main notebook state container
//!
//! Owns storage, surfaces, the session manager and the autosave scheduler.
//! Rolls land in the Oracle surface as history paragraphs and count as
//! edits for autosave.

use chrono::Local;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use motif_oracle::{
    format_clock, game_log_entry, oracle_log_entry, DiceType, GameRoll, GameRollResult,
    OracleRoll, OracleSelection,
};
use motif_session::{
    AutosaveHandle, AutosaveScheduler, ContentSurface, ExportArchive, ReportFormat,
    SchedulerState, SessionBundle, SessionError, SessionManager, SessionSummary, Surface,
    SurfaceSet,
};
use motif_storage::{Database, KeyValueStore, MemoryStore};

use crate::config::Config;
use crate::error::CoreError;
use crate::Result;

pub struct Notebook {
    config: Config,
    sessions: SessionManager,
    autosave: Arc<Mutex<Option<AutosaveHandle>>>,
    initialized: Arc<RwLock<bool>>,
}

impl Notebook {
    /// Open the notebook database named in `config`.
    ///
    /// Surfaces start detached; the host attaches its editors with
    /// [`Notebook::attach_surface`].
    pub fn new(config: Config) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut db = Database::open(&config.database_path)?;
        if let Some(limit) = config.storage_quota_bytes {
            db = db.with_quota(limit);
        }

        tracing::info!(path = %config.database_path.display(), "Opened notebook storage");
        Ok(Self::from_parts(config, Arc::new(db), SurfaceSet::new()))
    }

    /// Notebook backed by process memory with in-memory surfaces attached.
    pub fn in_memory(config: Config) -> Self {
        let store = match config.storage_quota_bytes {
            Some(limit) => MemoryStore::with_quota(limit),
            None => MemoryStore::new(),
        };
        Self::from_parts(config, Arc::new(store), SurfaceSet::in_memory())
    }

    fn from_parts(config: Config, kv: Arc<dyn KeyValueStore>, surfaces: SurfaceSet) -> Self {
        Self {
            config,
            sessions: SessionManager::new(kv, surfaces),
            autosave: Arc::new(Mutex::new(None)),
            initialized: Arc::new(RwLock::new(false)),
        }
    }

    /// Migrate legacy content. Returns whether anything was migrated.
    pub fn initialize(&self) -> Result<bool> {
        let migrated = self.sessions.initialize()?;
        *self.initialized.write() = true;
        tracing::info!("Notebook initialized");
        Ok(migrated)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn surfaces(&self) -> &SurfaceSet {
        self.sessions.surfaces()
    }

    pub fn attach_surface(&self, surface: Surface, editor: Arc<dyn ContentSurface>) {
        self.sessions.surfaces().attach(surface, editor);
    }

    // === Autosave ===

    /// Spawn the autosave scheduler. Calling it again while running is a no-op.
    pub fn start_autosave(&self) -> Result<()> {
        if !*self.initialized.read() {
            return Err(CoreError::NotInitialized);
        }

        let mut autosave = self.autosave.lock();
        if autosave.is_none() {
            *autosave = Some(AutosaveScheduler::start(
                self.sessions.clone(),
                self.config.autosave.clone(),
            )?);
        }
        Ok(())
    }

    pub async fn stop_autosave(&self) {
        let handle = self.autosave.lock().take();
        if let Some(handle) = handle {
            handle.stop().await;
        }
    }

    pub fn autosave_state(&self) -> SchedulerState {
        self.autosave
            .lock()
            .as_ref()
            .map(|handle| handle.state())
            .unwrap_or(SchedulerState::Idle)
    }

    /// Report an edit made by the host on any surface.
    pub fn notify_change(&self) {
        if let Some(handle) = self.autosave.lock().as_ref() {
            handle.notify_change();
        }
    }

    // === Dice ===

    pub fn roll_oracle(&self, question: &str, selection: &OracleSelection) -> Result<OracleRoll> {
        let history = self.history()?;
        let roll = OracleRoll::roll(selection);

        let clock = format_clock(&Local::now());
        append(history.as_ref(), &oracle_log_entry(question, &clock, &roll));
        self.notify_change();

        tracing::info!(faces = %roll.faces_display(), interpretation = %roll.interpretation, "Oracle roll logged");
        Ok(roll)
    }

    pub fn roll_game(&self, action: &str, roll: &GameRoll) -> Result<GameRollResult> {
        let history = self.history()?;
        let result = roll.roll();

        let clock = format_clock(&Local::now());
        append(history.as_ref(), &game_log_entry(action, &clock, &result));
        self.notify_change();

        tracing::info!(roll = %roll.notation(), total = result.total(), "Game roll logged");
        Ok(result)
    }

    /// Roll from raw form input such as `(3, "d6", -1)`.
    pub fn roll_dice(
        &self,
        action: &str,
        count: u32,
        dice: &str,
        modifier: i32,
    ) -> Result<GameRollResult> {
        let sides: DiceType = dice.parse()?;
        let roll = GameRoll::new(count, sides, modifier)?;
        self.roll_game(action, &roll)
    }

    fn history(&self) -> Result<Arc<dyn ContentSurface>> {
        self.surfaces()
            .get(Surface::Oracle)
            .ok_or(CoreError::Session(SessionError::SurfacesNotReady))
    }

    // === Session operations ===

    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        self.sessions.list()
    }

    pub async fn save_session(&self, name: &str) -> Result<SessionBundle> {
        Ok(self.sessions.save(name).await?)
    }

    pub async fn load_session(&self, name: &str) -> Result<bool> {
        Ok(self.sessions.load(name, false).await?)
    }

    pub fn delete_session(&self, name: &str) -> Result<bool> {
        Ok(self.sessions.delete(name)?)
    }

    pub fn new_session(&self) -> Result<()> {
        Ok(self.sessions.new_session()?)
    }

    pub async fn export_session(&self, name: &str) -> Result<ExportArchive> {
        Ok(self.sessions.export(name).await?)
    }

    pub async fn import_session(&self, bytes: &[u8], suggested_name: &str) -> Result<String> {
        Ok(self.sessions.import(bytes, suggested_name).await?)
    }

    pub async fn export_report(&self, name: &str, format: ReportFormat) -> Result<ExportArchive> {
        Ok(self.sessions.export_report(name, format).await?)
    }
}

fn append(surface: &dyn ContentSurface, entry: &str) {
    let mut markup = surface.content();
    markup.push_str(entry);
    surface.set_content(&markup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use motif_oracle::OracleError;
    use motif_session::{TextSurface, AUTO_SAVE};
    use std::time::Duration;

    fn test_config() -> Config {
        Config::new(std::path::PathBuf::from("/tmp/motif-test"))
    }

    fn oracle_markup(notebook: &Notebook) -> String {
        notebook
            .surfaces()
            .get(Surface::Oracle)
            .unwrap()
            .content()
    }

    async fn wait_for_state(notebook: &Notebook, wanted: SchedulerState) {
        for _ in 0..1000 {
            if notebook.autosave_state() == wanted {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("autosave never reached {wanted}");
    }

    #[test]
    fn test_rolls_append_to_history() {
        let notebook = Notebook::in_memory(test_config());
        notebook
            .surfaces()
            .get(Surface::Oracle)
            .unwrap()
            .set_content("<p>Earlier</p>");

        let roll = notebook
            .roll_oracle("Is it raining?", &OracleSelection::default())
            .unwrap();
        let game = GameRoll::new(2, DiceType::D6, 1).unwrap();
        let result = notebook.roll_game("Climb", &game).unwrap();

        let markup = oracle_markup(&notebook);
        assert!(markup.starts_with("<p>Earlier</p><p><em>["));

        let oracle_at = markup.find("Oracle Roll").unwrap();
        let game_at = markup.find("Game Roll").unwrap();
        assert!(oracle_at < game_at);
        assert!(markup.contains(&format!(
            "{} | {}</p>",
            roll.faces_display(),
            roll.interpretation
        )));
        assert!(markup.contains(&result.details()));
        assert!(markup.contains("<strong>Roll:</strong> 2d6+1"));
    }

    #[test]
    fn test_roll_without_history_surface() {
        let notebook = Notebook::from_parts(
            test_config(),
            Arc::new(MemoryStore::new()),
            SurfaceSet::new(),
        );
        assert!(matches!(
            notebook.roll_oracle("", &OracleSelection::default()),
            Err(CoreError::Session(SessionError::SurfacesNotReady))
        ));
    }

    #[test]
    fn test_roll_dice_validates_input() {
        let notebook = Notebook::in_memory(test_config());

        let result = notebook.roll_dice("Strike", 3, "d6", -1).unwrap();
        assert_eq!(result.results.len(), 3);
        assert!(oracle_markup(&notebook).contains("<strong>Roll:</strong> 3d6-1"));

        assert!(matches!(
            notebook.roll_dice("", 1, "d7", 0),
            Err(CoreError::Oracle(OracleError::UnknownDice(_)))
        ));
        assert!(matches!(
            notebook.roll_dice("", 0, "d6", 0),
            Err(CoreError::Oracle(OracleError::InvalidCount { count: 0, .. }))
        ));
        assert!(!oracle_markup(&notebook).contains("d7"));
    }

    #[test]
    fn test_autosave_outside_runtime_is_an_error() {
        let notebook = Notebook::in_memory(test_config());
        notebook.initialize().unwrap();
        assert!(matches!(
            notebook.start_autosave(),
            Err(CoreError::Session(SessionError::NoRuntime))
        ));
        assert_eq!(notebook.autosave_state(), SchedulerState::Idle);
    }

    #[tokio::test]
    async fn test_autosave_requires_initialize() {
        let notebook = Notebook::in_memory(test_config());
        assert!(matches!(
            notebook.start_autosave(),
            Err(CoreError::NotInitialized)
        ));

        notebook.initialize().unwrap();
        notebook.start_autosave().unwrap();
        notebook.start_autosave().unwrap();
        notebook.stop_autosave().await;
        assert_eq!(notebook.autosave_state(), SchedulerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_roll_triggers_debounced_autosave() {
        let notebook = Notebook::in_memory(test_config());
        notebook.initialize().unwrap();
        notebook.start_autosave().unwrap();
        wait_for_state(&notebook, SchedulerState::Armed).await;

        notebook
            .roll_oracle("Is the bridge out?", &OracleSelection::default())
            .unwrap();
        wait_for_state(&notebook, SchedulerState::PendingDebounce).await;
        assert!(notebook.sessions().get(AUTO_SAVE).is_err());

        tokio::time::sleep(Duration::from_millis(1100)).await;

        let saved = notebook.sessions().get(AUTO_SAVE).unwrap();
        assert!(saved.content.oracle.contains("Is the bridge out?"));
        assert_eq!(notebook.autosave_state(), SchedulerState::Armed);

        notebook.stop_autosave().await;
    }

    #[tokio::test]
    async fn test_sessions_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path().join("data"));

        {
            let notebook = Notebook::new(config.clone()).unwrap();
            notebook.initialize().unwrap();
            assert!(!notebook.surfaces().is_ready());

            for surface in Surface::ALL {
                notebook.attach_surface(surface, Arc::new(TextSurface::new()));
            }
            notebook
                .surfaces()
                .get(Surface::Character)
                .unwrap()
                .set_content("<p>Mara, smuggler</p>");
            notebook.save_session("Chapter 1").await.unwrap();
        }

        let notebook = Notebook::new(config).unwrap();
        notebook.initialize().unwrap();
        let names: Vec<_> = notebook
            .list_sessions()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Chapter 1".to_string()]);

        for surface in Surface::ALL {
            notebook.attach_surface(surface, Arc::new(TextSurface::new()));
        }
        assert!(notebook.load_session("Chapter 1").await.unwrap());
        assert_eq!(
            notebook
                .surfaces()
                .get(Surface::Character)
                .unwrap()
                .content(),
            "<p>Mara, smuggler</p>"
        );
    }

    #[tokio::test]
    async fn test_export_import_through_notebook() {
        let notebook = Notebook::in_memory(test_config());
        notebook
            .surfaces()
            .get(Surface::Story)
            .unwrap()
            .set_content("<p>The ferry left without us.</p>");

        let archive = notebook.export_session("Ferry").await.unwrap();
        assert_eq!(archive.file_name, "MotifNotebook-Ferry.zip");

        notebook.new_session().unwrap();
        let name = notebook
            .import_session(&archive.bytes, &archive.file_name)
            .await
            .unwrap();
        assert_eq!(name, "MotifNotebook-Ferry");
        assert!(notebook
            .surfaces()
            .snapshot()
            .unwrap()
            .story
            .contains("ferry left"));

        let report = notebook
            .export_report("Ferry", ReportFormat::Markdown)
            .await
            .unwrap();
        assert_eq!(report.file_name, "MotifReport-Ferry.zip");
        assert!(notebook.delete_session(&name).unwrap());
    }
}
