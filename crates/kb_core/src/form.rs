//! Form input and the request payloads it translates into.
//!
//! Field names of the request types are the backend's camelCase argument
//! names; the bridge serializes them as-is.

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::model::{split_list, CrawlingSettings};

pub const DEFAULT_SEARCH_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{value:?} is not a valid http(s) URL")]
    InvalidUrl { value: String },
    #[error("select a technology and version first")]
    NoVersionSelected,
    #[error("search limit must be between 1 and {max}")]
    LimitOutOfRange { max: usize },
}

fn parse_http_url(raw: &str) -> Result<Url, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FormError::Required { field: "url" });
    }
    let parsed = Url::parse(trimmed).map_err(|_| FormError::InvalidUrl {
        value: trimmed.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" if parsed.host().is_some() => Ok(parsed),
        _ => Err(FormError::InvalidUrl {
            value: trimmed.to_string(),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCrawlRequest {
    pub technology_id: Uuid,
    pub version_id: Uuid,
    pub start_url: String,
    pub prefix_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anti_paths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anti_keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_processed_urls: Option<bool>,
}

impl StartCrawlRequest {
    /// Request that re-crawls an already known URL under the version's settings.
    pub fn for_known_url(
        technology_id: Uuid,
        url: &str,
        settings: &CrawlingSettings,
    ) -> Self {
        let prefix_path = if settings.prefix_path.trim().is_empty() {
            url.to_string()
        } else {
            settings.prefix_path.clone()
        };
        Self {
            technology_id,
            version_id: settings.version_id,
            start_url: url.to_string(),
            prefix_path,
            anti_paths: non_empty(settings.anti_paths.clone()),
            anti_keywords: non_empty(settings.anti_keywords.clone()),
            skip_processed_urls: Some(settings.skip_processed),
        }
    }
}

fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    (!items.is_empty()).then_some(items)
}

/// Form that starts a crawl from a new entry point.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrawlForm {
    pub start_url: String,
    pub prefix_path: String,
    pub anti_paths_text: String,
    pub anti_keywords_text: String,
    pub skip_processed: bool,
}

impl CrawlForm {
    /// Pre-fills the form from saved settings.
    pub fn from_settings(settings: &CrawlingSettings) -> Self {
        Self {
            start_url: String::new(),
            prefix_path: settings.prefix_path.clone(),
            anti_paths_text: settings.anti_paths.join(", "),
            anti_keywords_text: settings.anti_keywords.join(", "),
            skip_processed: settings.skip_processed,
        }
    }

    pub fn to_request(
        &self,
        technology_id: Option<Uuid>,
        version_id: Option<Uuid>,
    ) -> Result<StartCrawlRequest, FormError> {
        let (Some(technology_id), Some(version_id)) = (technology_id, version_id) else {
            return Err(FormError::NoVersionSelected);
        };
        let start_url = parse_http_url(&self.start_url)?.to_string();
        let prefix_path = match self.prefix_path.trim() {
            "" => start_url.clone(),
            prefix => prefix.to_string(),
        };
        Ok(StartCrawlRequest {
            technology_id,
            version_id,
            start_url,
            prefix_path,
            anti_paths: non_empty(split_list(&self.anti_paths_text)),
            anti_keywords: non_empty(split_list(&self.anti_keywords_text)),
            skip_processed_urls: Some(self.skip_processed),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCrawlingSettingsRequest {
    pub crawling_settings_id: Option<Uuid>,
    pub version_id: Uuid,
    pub prefix_path: Option<String>,
    pub anti_paths: Option<String>,
    pub anti_keywords: Option<String>,
    pub skip_processed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettingsForm {
    pub settings_id: Option<Uuid>,
    pub prefix_path: String,
    pub anti_paths_text: String,
    pub anti_keywords_text: String,
    pub skip_processed: bool,
}

impl SettingsForm {
    pub fn from_settings(settings: &CrawlingSettings) -> Self {
        Self {
            settings_id: settings.id,
            prefix_path: settings.prefix_path.clone(),
            anti_paths_text: settings.anti_paths.join(", "),
            anti_keywords_text: settings.anti_keywords.join(", "),
            skip_processed: settings.skip_processed,
        }
    }

    pub fn to_request(
        &self,
        version_id: Option<Uuid>,
    ) -> Result<SaveCrawlingSettingsRequest, FormError> {
        let version_id = version_id.ok_or(FormError::NoVersionSelected)?;
        let joined = |text: &str| {
            let items = split_list(text);
            (!items.is_empty()).then(|| items.join(","))
        };
        let prefix = self.prefix_path.trim();
        Ok(SaveCrawlingSettingsRequest {
            crawling_settings_id: self.settings_id,
            version_id,
            prefix_path: (!prefix.is_empty()).then(|| prefix.to_string()),
            anti_paths: joined(&self.anti_paths_text),
            anti_keywords: joined(&self.anti_keywords_text),
            skip_processed: self.skip_processed,
        })
    }

    /// The settings this form would save, for local previews.
    pub fn preview(&self, version_id: Uuid) -> CrawlingSettings {
        CrawlingSettings {
            id: self.settings_id,
            version_id,
            prefix_path: self.prefix_path.trim().to_string(),
            anti_paths: split_list(&self.anti_paths_text),
            anti_keywords: split_list(&self.anti_keywords_text),
            skip_processed: self.skip_processed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUrlRequest {
    pub url: String,
    pub technology_id: Uuid,
    pub version_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddUrlForm {
    pub url: String,
}

impl AddUrlForm {
    pub fn to_request(
        &self,
        technology_id: Option<Uuid>,
        version_id: Option<Uuid>,
    ) -> Result<AddUrlRequest, FormError> {
        let (Some(technology_id), Some(version_id)) = (technology_id, version_id) else {
            return Err(FormError::NoVersionSelected);
        };
        Ok(AddUrlRequest {
            url: parse_http_url(&self.url)?.to_string(),
            technology_id,
            version_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetSearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technology_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<Uuid>,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetSearchForm {
    pub query: String,
    pub limit: usize,
    /// Restrict results to the selected technology/version.
    pub scoped: bool,
}

impl Default for SnippetSearchForm {
    fn default() -> Self {
        Self {
            query: String::new(),
            limit: DEFAULT_SEARCH_LIMIT,
            scoped: true,
        }
    }
}

impl SnippetSearchForm {
    pub const MAX_LIMIT: usize = 100;

    pub fn to_request(
        &self,
        technology_id: Option<Uuid>,
        version_id: Option<Uuid>,
    ) -> Result<SnippetSearchRequest, FormError> {
        let query = self.query.trim();
        if query.is_empty() {
            return Err(FormError::Required { field: "query" });
        }
        if !(1..=Self::MAX_LIMIT).contains(&self.limit) {
            return Err(FormError::LimitOutOfRange {
                max: Self::MAX_LIMIT,
            });
        }
        Ok(SnippetSearchRequest {
            query: query.to_string(),
            technology_id: technology_id.filter(|_| self.scoped),
            version_id: version_id.filter(|_| self.scoped),
            limit: self.limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn crawl_form_defaults_prefix_to_start_url() {
        let form = CrawlForm {
            start_url: " https://docs.example.com/guide/ ".into(),
            anti_paths_text: "/blog,\n/news".into(),
            ..CrawlForm::default()
        };
        let tech = Uuid::new_v4();
        let version = Uuid::new_v4();
        let request = form.to_request(Some(tech), Some(version)).unwrap();
        assert_eq!(request.prefix_path, "https://docs.example.com/guide/");
        assert_eq!(
            request.anti_paths,
            Some(vec!["/blog".to_string(), "/news".to_string()])
        );
        assert_eq!(request.anti_keywords, None);
        assert_eq!(request.skip_processed_urls, Some(false));
    }

    #[test]
    fn crawl_form_rejects_non_http_urls() {
        let form = CrawlForm {
            start_url: "ftp://example.com".into(),
            ..CrawlForm::default()
        };
        let err = form
            .to_request(Some(Uuid::nil()), Some(Uuid::nil()))
            .unwrap_err();
        assert!(matches!(err, FormError::InvalidUrl { .. }));
    }

    #[test]
    fn crawl_form_requires_a_version() {
        let form = CrawlForm {
            start_url: "https://example.com".into(),
            ..CrawlForm::default()
        };
        assert_eq!(
            form.to_request(Some(Uuid::nil()), None),
            Err(FormError::NoVersionSelected)
        );
    }

    #[test]
    fn settings_form_joins_lists_with_commas() {
        let form = SettingsForm {
            prefix_path: "https://docs.example.com".into(),
            anti_paths_text: "/a, /b\n".into(),
            ..SettingsForm::default()
        };
        let request = form.to_request(Some(Uuid::nil())).unwrap();
        assert_eq!(request.anti_paths.as_deref(), Some("/a,/b"));
        assert_eq!(request.anti_keywords, None);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["versionId"], serde_json::json!(Uuid::nil()));
        assert_eq!(json["prefixPath"], "https://docs.example.com");
    }

    #[test]
    fn search_form_scopes_to_selection() {
        let tech = Uuid::new_v4();
        let form = SnippetSearchForm {
            query: "  spawn blocking ".into(),
            ..SnippetSearchForm::default()
        };
        let request = form.to_request(Some(tech), None).unwrap();
        assert_eq!(request.query, "spawn blocking");
        assert_eq!(request.technology_id, Some(tech));

        let unscoped = SnippetSearchForm {
            scoped: false,
            ..form
        };
        assert_eq!(unscoped.to_request(Some(tech), None).unwrap().technology_id, None);
    }
}
