use uuid::Uuid;

use crate::model::{Technology, TechnologyVersion};

/// Technologies, the versions of the selected one, and the active selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogStore {
    technologies: Vec<Technology>,
    versions: Vec<TechnologyVersion>,
    selected_technology: Option<Uuid>,
    selected_version: Option<Uuid>,
    pub loading: bool,
    pub error: Option<String>,
}

impl CatalogStore {
    pub fn technologies(&self) -> &[Technology] {
        &self.technologies
    }

    pub fn versions(&self) -> &[TechnologyVersion] {
        &self.versions
    }

    pub fn selected_technology(&self) -> Option<Uuid> {
        self.selected_technology
    }

    pub fn selected_version(&self) -> Option<Uuid> {
        self.selected_version
    }

    pub fn technology(&self, id: Uuid) -> Option<&Technology> {
        self.technologies.iter().find(|tech| tech.id == id)
    }

    pub fn version(&self, id: Uuid) -> Option<&TechnologyVersion> {
        self.versions.iter().find(|version| version.id == id)
    }

    /// Finds a technology by id or case-insensitive name.
    pub fn find_technology(&self, needle: &str) -> Option<&Technology> {
        let needle = needle.trim();
        if let Ok(id) = Uuid::parse_str(needle) {
            return self.technology(id);
        }
        self.technologies
            .iter()
            .find(|tech| tech.name.eq_ignore_ascii_case(needle))
    }

    /// Finds a version of the selected technology by id or exact label.
    pub fn find_version(&self, needle: &str) -> Option<&TechnologyVersion> {
        let needle = needle.trim();
        if let Ok(id) = Uuid::parse_str(needle) {
            return self.version(id);
        }
        self.versions.iter().find(|version| version.version == needle)
    }

    pub fn replace_technologies(&mut self, mut technologies: Vec<Technology>) {
        technologies.sort_by_key(|tech| tech.name.to_lowercase());
        self.technologies = technologies;
        self.loading = false;
        self.error = None;
        if let Some(id) = self.selected_technology {
            if self.technology(id).is_none() {
                self.selected_technology = None;
                self.selected_version = None;
                self.versions.clear();
            }
        }
    }

    pub fn merge_technology(&mut self, technology: Technology) {
        match self.technologies.iter_mut().find(|t| t.id == technology.id) {
            Some(existing) => *existing = technology,
            None => self.technologies.push(technology),
        }
        self.technologies.sort_by_key(|tech| tech.name.to_lowercase());
    }

    pub fn remove_technology(&mut self, id: Uuid) {
        self.technologies.retain(|tech| tech.id != id);
        if self.selected_technology == Some(id) {
            self.selected_technology = None;
            self.selected_version = None;
            self.versions.clear();
        }
    }

    /// Versions of another technology than the selected one are ignored.
    pub fn replace_versions(&mut self, technology_id: Uuid, versions: Vec<TechnologyVersion>) -> bool {
        if self.selected_technology != Some(technology_id) {
            return false;
        }
        self.versions = versions;
        self.loading = false;
        if let Some(id) = self.selected_version {
            if self.version(id).is_none() {
                self.selected_version = None;
            }
        }
        true
    }

    pub fn merge_version(&mut self, version: TechnologyVersion) {
        if self.selected_technology != Some(version.technology_id) {
            return;
        }
        match self.versions.iter_mut().find(|v| v.id == version.id) {
            Some(existing) => *existing = version,
            None => self.versions.push(version),
        }
    }

    pub fn remove_version(&mut self, id: Uuid) {
        self.versions.retain(|version| version.id != id);
        if self.selected_version == Some(id) {
            self.selected_version = None;
        }
    }

    /// Selecting a technology clears the version list until it is reloaded.
    pub fn select_technology(&mut self, id: Option<Uuid>) -> bool {
        if self.selected_technology == id {
            return false;
        }
        self.selected_technology = id;
        self.selected_version = None;
        self.versions.clear();
        true
    }

    pub fn select_version(&mut self, id: Option<Uuid>) -> bool {
        if self.selected_version == id {
            return false;
        }
        self.selected_version = id;
        true
    }
}
