use chrono::{DateTime, Utc};
use kb_bridge::StateFile;
use kb_logging::{kb_error, kb_info, kb_warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client preferences remembered between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub(crate) struct Preferences {
    pub technology_id: Option<Uuid>,
    pub version_id: Option<Uuid>,
    /// Set only when the user chose a page size explicitly.
    pub page_size: Option<usize>,
    pub saved_at: Option<DateTime<Utc>>,
}

pub(crate) fn load_preferences(file: &StateFile) -> Preferences {
    let content = match file.read() {
        Ok(Some(text)) => text,
        Ok(None) => return Preferences::default(),
        Err(err) => {
            kb_warn!("Failed to read preferences from {:?}: {}", file.path(), err);
            return Preferences::default();
        }
    };

    match ron::from_str(&content) {
        Ok(preferences) => {
            kb_info!("Loaded preferences from {:?}", file.path());
            preferences
        }
        Err(err) => {
            kb_warn!("Failed to parse preferences from {:?}: {}", file.path(), err);
            Preferences::default()
        }
    }
}

pub(crate) fn save_preferences(file: &StateFile, preferences: &Preferences) {
    let preferences = Preferences {
        saved_at: Some(Utc::now()),
        ..preferences.clone()
    };
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&preferences, pretty) {
        Ok(text) => text,
        Err(err) => {
            kb_error!("Failed to serialize preferences: {}", err);
            return;
        }
    };

    if let Err(err) = file.write(&content) {
        kb_error!("Failed to write preferences to {:?}: {}", file.path(), err);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn saved_preferences_load_back() {
        let temp = TempDir::new().unwrap();
        let file = StateFile::new(temp.path().join(".kb_state.ron"));
        let preferences = Preferences {
            technology_id: Some(Uuid::new_v4()),
            version_id: Some(Uuid::new_v4()),
            page_size: Some(50),
            saved_at: None,
        };

        save_preferences(&file, &preferences);
        let loaded = load_preferences(&file);

        assert_eq!(loaded.technology_id, preferences.technology_id);
        assert_eq!(loaded.version_id, preferences.version_id);
        assert_eq!(loaded.page_size, Some(50));
        assert!(loaded.saved_at.is_some());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let file = StateFile::new(temp.path().join(".kb_state.ron"));
        assert_eq!(load_preferences(&file), Preferences::default());
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".kb_state.ron");
        fs::write(&path, "(technology_id: 42").unwrap();
        assert_eq!(load_preferences(&StateFile::new(path)), Preferences::default());
    }

    #[test]
    fn older_files_without_page_size_still_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".kb_state.ron");
        let id = Uuid::new_v4();
        fs::write(&path, format!("(technology_id: Some(\"{id}\"))")).unwrap();

        let loaded = load_preferences(&StateFile::new(path));
        assert_eq!(loaded.technology_id, Some(id));
        assert_eq!(loaded.page_size, None);
    }
}
