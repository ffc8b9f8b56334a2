#![allow(dead_code)]

use std::sync::Once;

use kb_core::model::{DocumentationUrl, Technology, TechnologyVersion, UrlStatus};
use kb_core::{update, AppState, Effect, Msg};
use serde_json::json;
use uuid::Uuid;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(kb_logging::initialize_for_tests);
}

pub struct Scope {
    pub technology: Uuid,
    pub version: Uuid,
}

pub fn technology(id: Uuid, name: &str) -> Technology {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "language": "rust",
        "createdAt": "2024-03-01T10:00:00",
        "updatedAt": "2024-03-01T10:00:00",
    }))
    .unwrap()
}

pub fn version(id: Uuid, technology_id: Uuid, label: &str) -> TechnologyVersion {
    serde_json::from_value(json!({
        "id": id,
        "technologyId": technology_id,
        "version": label,
        "createdAt": "2024-03-01T10:00:00",
        "updatedAt": "2024-03-01T10:00:00",
    }))
    .unwrap()
}

pub fn doc_url(scope: &Scope, url: &str, status: UrlStatus) -> DocumentationUrl {
    serde_json::from_value(json!({
        "id": Uuid::new_v4(),
        "technologyId": scope.technology,
        "versionId": scope.version,
        "url": url,
        "status": status.as_str(),
        "html": "<html></html>",
        "isProcessed": false,
        "createdAt": "2024-03-01T10:00:00",
        "updatedAt": "2024-03-01T10:00:00",
    }))
    .unwrap()
}

/// Drives a fresh state through selecting a technology and version.
pub fn scoped_state() -> (AppState, Scope) {
    let scope = Scope {
        technology: Uuid::new_v4(),
        version: Uuid::new_v4(),
    };
    let state = AppState::new();
    let (state, _) = update(
        state,
        Msg::TechnologiesLoaded(Ok(vec![technology(scope.technology, "tokio")])),
    );
    let (state, _) = update(state, Msg::TechnologySelected(Some(scope.technology)));
    let (state, _) = update(
        state,
        Msg::VersionsLoaded {
            technology_id: scope.technology,
            result: Ok(vec![version(scope.version, scope.technology, "1.40")]),
        },
    );
    let (state, _) = update(state, Msg::VersionSelected(Some(scope.version)));
    (state, scope)
}

pub fn with_urls(state: AppState, scope: &Scope, urls: Vec<DocumentationUrl>) -> AppState {
    let (state, _) = update(
        state,
        Msg::UrlsLoaded {
            version_id: scope.version,
            result: Ok(urls),
        },
    );
    state
}

pub fn effect_names(effects: &[Effect]) -> Vec<&'static str> {
    effects.iter().map(Effect::command_name).collect()
}
