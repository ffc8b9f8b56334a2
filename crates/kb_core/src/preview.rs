use crate::model::DocumentationUrl;

const TRUNCATION_NOTE: &str = "[preview truncated]";
const LINE_SNAP_WINDOW: usize = 256;
pub const MAX_PREVIEW_CONTENT: usize = 40_960;

/// Which stored body a URL preview shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewSource {
    CleanedMarkdown,
    Markdown,
    Html,
}

impl PreviewSource {
    pub fn label(self) -> &'static str {
        match self {
            PreviewSource::CleanedMarkdown => "cleaned markdown",
            PreviewSource::Markdown => "markdown",
            PreviewSource::Html => "html",
        }
    }
}

/// Most processed body of a URL, if any was stored.
pub fn best_body(url: &DocumentationUrl) -> Option<(PreviewSource, &str)> {
    fn non_empty(body: &Option<String>) -> Option<&str> {
        body.as_deref().filter(|text| !text.trim().is_empty())
    }
    non_empty(&url.cleaned_markdown)
        .map(|text| (PreviewSource::CleanedMarkdown, text))
        .or_else(|| non_empty(&url.markdown).map(|text| (PreviewSource::Markdown, text)))
        .or_else(|| non_empty(&url.html).map(|text| (PreviewSource::Html, text)))
}

/// Body text as shown in a detail dialog: metadata header removed, size capped.
pub fn prepare_preview_content(body: &str) -> String {
    truncate_preview(skip_metadata_header(body), MAX_PREVIEW_CONTENT)
}

/// Caps `text` at `max` bytes, cutting at the last line break in the final
/// `LINE_SNAP_WINDOW` bytes when there is one.
pub fn truncate_preview(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    let window_start = end.saturating_sub(LINE_SNAP_WINDOW);
    if let Some(newline) = text[window_start..end].rfind('\n') {
        end = window_start + newline;
    }
    let omitted = text.len() - end;
    format!("{}\n{TRUNCATION_NOTE} ({omitted} more bytes)", &text[..end])
}

/// Drops a leading `---` metadata block that cleaned markdown and snippet
/// content may carry. The block closes with `---` or `...` on its own line;
/// CRLF line endings are accepted. Without a closing line the text is kept.
fn skip_metadata_header(body: &str) -> &str {
    let trimmed = body.trim_start_matches('\u{feff}');
    let mut lines = trimmed.split_inclusive('\n');
    match lines.next() {
        Some(first) if first.trim_end() == "---" => {}
        _ => return body,
    }
    let mut offset = trimmed.len() - lines.clone().map(str::len).sum::<usize>();
    for line in lines {
        offset += line.len();
        if matches!(line.trim_end(), "---" | "...") {
            return trimmed[offset..].trim_start_matches(['\r', '\n']);
        }
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use uuid::Uuid;

    fn url_with(markdown: Option<&str>, cleaned: Option<&str>) -> DocumentationUrl {
        DocumentationUrl {
            id: Uuid::nil(),
            technology_id: Uuid::nil(),
            version_id: Uuid::nil(),
            url: "https://docs.example.com".into(),
            status: Default::default(),
            html: Some("<p>raw</p>".into()),
            markdown: markdown.map(str::to_string),
            cleaned_markdown: cleaned.map(str::to_string),
            is_processed: false,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn prefers_cleaned_markdown() {
        let url = url_with(Some("# raw"), Some("# clean"));
        assert_eq!(best_body(&url), Some((PreviewSource::CleanedMarkdown, "# clean")));
    }

    #[test]
    fn blank_bodies_fall_through_to_html() {
        let url = url_with(Some("  "), None);
        assert_eq!(best_body(&url), Some((PreviewSource::Html, "<p>raw</p>")));
    }

    #[test]
    fn empty_and_whitespace_bodies_are_both_skipped() {
        let mut url = url_with(Some(""), Some(" \n\t "));
        assert_eq!(best_body(&url), Some((PreviewSource::Html, "<p>raw</p>")));

        url.markdown = Some("# kept".into());
        assert_eq!(best_body(&url), Some((PreviewSource::Markdown, "# kept")));

        url.html = Some(String::new());
        url.markdown = None;
        assert_eq!(best_body(&url), None);
    }

    #[test]
    fn oversized_content_reports_omitted_bytes() {
        let content: String = "a".repeat(MAX_PREVIEW_CONTENT + 128);
        let preview = prepare_preview_content(&content);
        assert!(preview.starts_with(&"a".repeat(MAX_PREVIEW_CONTENT)));
        assert!(preview.ends_with("\n[preview truncated] (128 more bytes)"));
    }

    #[test]
    fn truncation_snaps_to_a_line_break() {
        let text = "first line\nsecond line that runs long";
        assert_eq!(
            truncate_preview(text, 20),
            "first line\n[preview truncated] (27 more bytes)"
        );
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(
            truncate_preview("ééé", 3),
            "é\n[preview truncated] (4 more bytes)"
        );
    }

    #[test]
    fn metadata_header_is_skipped() {
        let markdown = "---\ntitle: Intro\n---\n\nbody\n";
        assert_eq!(skip_metadata_header(markdown), "body\n");

        let crlf = "---\r\nsource: https://docs.example.com\r\n...\r\n# Guide";
        assert_eq!(skip_metadata_header(crlf), "# Guide");
    }

    #[test]
    fn unterminated_header_keeps_the_text() {
        let markdown = "---\nnot a header\nbody";
        assert_eq!(skip_metadata_header(markdown), markdown);
        assert_eq!(skip_metadata_header("# ---\nbody"), "# ---\nbody");
    }
}
