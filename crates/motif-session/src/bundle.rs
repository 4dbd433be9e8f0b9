//! Session bundle: the five-surface snapshot persisted per session name

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::surface::Surface;

/// Markup of the five notebook surfaces. Missing fields read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotebookContent {
    /// Dice roll history
    pub oracle: String,
    pub character: String,
    pub scene: String,
    pub story: String,
    pub extra: String,
}

impl NotebookContent {
    pub fn get(&self, surface: Surface) -> &str {
        match surface {
            Surface::Oracle => &self.oracle,
            Surface::Character => &self.character,
            Surface::Scene => &self.scene,
            Surface::Story => &self.story,
            Surface::Extra => &self.extra,
        }
    }

    pub fn set(&mut self, surface: Surface, markup: impl Into<String>) {
        let markup = markup.into();
        match surface {
            Surface::Oracle => self.oracle = markup,
            Surface::Character => self.character = markup,
            Surface::Scene => self.scene = markup,
            Surface::Story => self.story = markup,
            Surface::Extra => self.extra = markup,
        }
    }

    /// True when every surface is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        Surface::ALL
            .iter()
            .all(|surface| self.get(*surface).trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionBundle {
    #[serde(flatten)]
    pub content: NotebookContent,
    /// When the bundle was written
    #[serde(default = "chrono::Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl SessionBundle {
    /// Stamp `content` with the current time.
    pub fn new(content: NotebookContent) -> Self {
        Self {
            content,
            timestamp: Utc::now(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_json_shape() {
        let mut content = NotebookContent::default();
        content.set(Surface::Oracle, "<p>Roll: 4,2,6</p>");
        let bundle = SessionBundle::new(content);

        let value = serde_json::to_value(&bundle).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj["oracle"], "<p>Roll: 4,2,6</p>");
        assert_eq!(obj["character"], "");
        assert!(obj["timestamp"].as_str().unwrap().contains('T'));
        assert_eq!(obj.len(), 6);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let bundle: SessionBundle =
            serde_json::from_str(r#"{"story":"<p>Once</p>","timestamp":"2024-05-01T10:00:00.000Z"}"#)
                .unwrap();
        assert_eq!(bundle.content.story, "<p>Once</p>");
        assert_eq!(bundle.content.oracle, "");
        assert_eq!(bundle.timestamp.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn test_is_blank() {
        let mut content = NotebookContent::default();
        assert!(content.is_blank());
        content.set(Surface::Extra, "  ");
        assert!(content.is_blank());
        content.set(Surface::Scene, "<p>Tavern</p>");
        assert!(!content.is_blank());
    }
}
