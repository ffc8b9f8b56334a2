//! Case-insensitive substring filters, recomputed on every query change.

use crate::model::{CrawlingSettings, DocumentationSnippet, DocumentationUrl, UrlStatus};

/// An empty (or whitespace-only) query matches everything.
pub fn matches_query(haystack: &str, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || haystack.to_lowercase().contains(&query.to_lowercase())
}

pub fn url_matches(url: &DocumentationUrl, query: &str, status: Option<UrlStatus>) -> bool {
    status.is_none_or(|wanted| url.status == wanted) && matches_query(&url.url, query)
}

pub fn filter_urls<'a>(
    urls: &'a [DocumentationUrl],
    query: &str,
    status: Option<UrlStatus>,
) -> Vec<&'a DocumentationUrl> {
    urls.iter()
        .filter(|url| url_matches(url, query, status))
        .collect()
}

pub fn snippet_matches(snippet: &DocumentationSnippet, query: &str, concept: Option<&str>) -> bool {
    let concept_ok = match concept.map(str::trim).filter(|c| !c.is_empty()) {
        None => true,
        Some(wanted) => snippet
            .concepts
            .iter()
            .any(|tag| tag.eq_ignore_ascii_case(wanted)),
    };
    concept_ok
        && (matches_query(&snippet.title, query)
            || matches_query(&snippet.description, query)
            || matches_query(&snippet.content, query)
            || snippet.concepts.iter().any(|tag| matches_query(tag, query)))
}

pub fn filter_snippets<'a>(
    snippets: &'a [DocumentationSnippet],
    query: &str,
    concept: Option<&str>,
) -> Vec<&'a DocumentationSnippet> {
    snippets
        .iter()
        .filter(|snippet| snippet_matches(snippet, query, concept))
        .collect()
}

/// Whether a crawl with `settings` would visit `url`.
///
/// An empty prefix admits everything. Otherwise the URL must start with the
/// prefix and contain none of the anti-paths or anti-keywords, all compared
/// case-insensitively.
pub fn should_crawl_url(url: &str, settings: &CrawlingSettings) -> bool {
    let prefix = settings.prefix_path.trim();
    if prefix.is_empty() {
        return true;
    }

    let url_lower = url.to_lowercase();
    if !url_lower.starts_with(&prefix.to_lowercase()) {
        return false;
    }

    settings
        .anti_paths
        .iter()
        .chain(settings.anti_keywords.iter())
        .filter(|needle| !needle.is_empty())
        .all(|needle| !url_lower.contains(&needle.to_lowercase()))
}

/// URLs that the backend's filter pass would mark as skipped.
pub fn skipped_by_settings<'a>(
    urls: &'a [DocumentationUrl],
    settings: &CrawlingSettings,
) -> Vec<&'a DocumentationUrl> {
    urls.iter()
        .filter(|url| url.status != UrlStatus::Skipped)
        .filter(|url| !should_crawl_url(&url.url, settings))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn settings(prefix: &str, anti_paths: &[&str], anti_keywords: &[&str]) -> CrawlingSettings {
        CrawlingSettings {
            prefix_path: prefix.to_string(),
            anti_paths: anti_paths.iter().map(|s| s.to_string()).collect(),
            anti_keywords: anti_keywords.iter().map(|s| s.to_string()).collect(),
            ..CrawlingSettings::empty(Uuid::nil())
        }
    }

    #[test]
    fn empty_prefix_admits_everything() {
        let s = settings("", &["/blog"], &[]);
        assert!(should_crawl_url("https://x.dev/blog/post", &s));
    }

    #[test]
    fn prefix_and_exclusions_are_case_insensitive() {
        let s = settings("https://Docs.Example.com/guide", &["/Internal"], &["DEPRECATED"]);
        assert!(should_crawl_url("https://docs.example.com/guide/intro", &s));
        assert!(!should_crawl_url("https://docs.example.com/api", &s));
        assert!(!should_crawl_url("https://docs.example.com/guide/internal/x", &s));
        assert!(!should_crawl_url("https://docs.example.com/guide/deprecated-apis", &s));
    }

    #[test]
    fn whitespace_query_matches_all() {
        assert!(matches_query("anything", "   "));
        assert!(matches_query("Tokio Runtime", "runtime"));
        assert!(!matches_query("Tokio Runtime", "async"));
    }
}
