//! Content surfaces and the readiness gate
//!
//! A surface is one rich-text editor on the page. Its markup is opaque to the
//! notebook: we only read it whole and replace it whole.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

use crate::bundle::NotebookContent;
use crate::error::SessionError;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Oracle,
    Character,
    Scene,
    Story,
    Extra,
}

impl Surface {
    pub const ALL: [Surface; 5] = [
        Surface::Oracle,
        Surface::Character,
        Surface::Scene,
        Surface::Story,
        Surface::Extra,
    ];

    /// DOM id of the editor hosting this surface
    pub fn editor_id(&self) -> &'static str {
        match self {
            Surface::Oracle => "rolls-editor",
            Surface::Character => "character-editor",
            Surface::Scene => "scene-editor",
            Surface::Story => "story-editor",
            Surface::Extra => "extra-editor",
        }
    }

    /// Field name used by the single-slot content blob of older releases
    pub fn legacy_field(&self) -> &'static str {
        match self {
            Surface::Oracle => "rolls",
            Surface::Character => "character",
            Surface::Scene => "scene",
            Surface::Story => "story",
            Surface::Extra => "extra",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Oracle => "oracle",
            Surface::Character => "character",
            Surface::Scene => "scene",
            Surface::Story => "story",
            Surface::Extra => "extra",
        }
    }
}

impl std::fmt::Display for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Surface {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Surface::ALL
            .into_iter()
            .find(|surface| {
                surface.as_str() == s || surface.editor_id() == s || surface.legacy_field() == s
            })
            .ok_or_else(|| format!("Unknown surface: {}", s))
    }
}

/// An editor the notebook can read from and write into.
pub trait ContentSurface: Send + Sync {
    fn content(&self) -> String;

    /// Replace the whole content; never merges.
    fn set_content(&self, markup: &str);
}

/// Surface holding its markup in memory, for headless hosts and tests.
#[derive(Default)]
pub struct TextSurface {
    markup: RwLock<String>,
}

impl TextSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(markup: impl Into<String>) -> Self {
        Self {
            markup: RwLock::new(markup.into()),
        }
    }
}

impl ContentSurface for TextSurface {
    fn content(&self) -> String {
        self.markup.read().clone()
    }

    fn set_content(&self, markup: &str) {
        *self.markup.write() = markup.to_string();
    }
}

/// The five notebook surfaces plus a gate that opens once all are attached.
pub struct SurfaceSet {
    surfaces: Arc<RwLock<HashMap<Surface, Arc<dyn ContentSurface>>>>,
    ready: Arc<watch::Sender<bool>>,
}

impl SurfaceSet {
    pub fn new() -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            surfaces: Arc::new(RwLock::new(HashMap::new())),
            ready: Arc::new(ready),
        }
    }

    /// A set with all five surfaces attached as [`TextSurface`]s.
    pub fn in_memory() -> Self {
        let set = Self::new();
        for surface in Surface::ALL {
            set.attach(surface, Arc::new(TextSurface::new()));
        }
        set
    }

    /// Register the editor backing `surface`. Re-attaching replaces it.
    pub fn attach(&self, surface: Surface, editor: Arc<dyn ContentSurface>) {
        let attached = {
            let mut surfaces = self.surfaces.write();
            surfaces.insert(surface, editor);
            surfaces.len()
        };

        tracing::debug!(surface = %surface, attached, "Surface attached");

        if attached == Surface::ALL.len() && !*self.ready.borrow() {
            self.ready.send_replace(true);
            tracing::info!("All content surfaces ready");
        }
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Resolve once every surface is attached.
    pub async fn ready(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = rx.wait_for(|ready| *ready).await;
    }

    pub fn get(&self, surface: Surface) -> Option<Arc<dyn ContentSurface>> {
        self.surfaces.read().get(&surface).cloned()
    }

    /// Read the live content of every surface.
    pub fn snapshot(&self) -> Result<NotebookContent> {
        let surfaces = self.surfaces.read();
        let mut content = NotebookContent::default();
        for surface in Surface::ALL {
            let editor = surfaces
                .get(&surface)
                .ok_or(SessionError::SurfacesNotReady)?;
            content.set(surface, editor.content());
        }
        Ok(content)
    }

    /// Replace the content of every surface with `content`.
    pub fn apply(&self, content: &NotebookContent) -> Result<()> {
        let surfaces = self.surfaces.read();
        if surfaces.len() < Surface::ALL.len() {
            return Err(SessionError::SurfacesNotReady);
        }
        for surface in Surface::ALL {
            if let Some(editor) = surfaces.get(&surface) {
                editor.set_content(content.get(surface));
            }
        }
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.apply(&NotebookContent::default())
    }
}

impl Default for SurfaceSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SurfaceSet {
    fn clone(&self) -> Self {
        Self {
            surfaces: Arc::clone(&self.surfaces),
            ready: Arc::clone(&self.ready),
        }
    }
}
