use uuid::Uuid;

use crate::model::CrawlingSettings;

/// Crawl settings of the active version.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettingsStore {
    settings: Option<CrawlingSettings>,
    pub loading: bool,
    pub saving: bool,
    pub error: Option<String>,
    /// URLs the backend marked as skipped on the last filter pass.
    pub last_skipped: Option<usize>,
}

impl SettingsStore {
    pub fn settings(&self) -> Option<&CrawlingSettings> {
        self.settings.as_ref()
    }

    /// Settings to use for `version_id`, falling back to empty ones.
    pub fn effective(&self, version_id: Uuid) -> CrawlingSettings {
        self.settings
            .as_ref()
            .filter(|settings| settings.version_id == version_id)
            .cloned()
            .unwrap_or_else(|| CrawlingSettings::empty(version_id))
    }

    pub fn replace(&mut self, settings: CrawlingSettings) {
        self.settings = Some(settings);
        self.loading = false;
        self.saving = false;
        self.error = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
