use kb_core::model::{BadgeTone, StageStatus, TaskStatus};
use kb_core::store::SnippetSource;
use kb_core::{
    AppViewModel, CatalogRowView, DetailView, Notification, NotificationKind, ProxyRowView,
    SettingsView, SnippetDetailView, SnippetListView, TaskRowView, UrlDetailView, UrlListView,
    UrlRowView,
};

const PROGRESS_WIDTH: usize = 20;

pub fn render_technologies(view: &AppViewModel) -> String {
    if let Some(error) = &view.catalog_error {
        return format!("Could not load technologies: {error}");
    }
    if view.technologies.is_empty() {
        return "No technologies yet. Add one with `kb tech add <name>`.".to_string();
    }
    catalog_rows(&view.technologies)
}

pub fn render_versions(view: &AppViewModel) -> String {
    let Some(technology) = &view.selected_technology else {
        return "Select a technology with --tech.".to_string();
    };
    if view.versions.is_empty() {
        return format!("{technology} has no versions.");
    }
    format!("{technology}\n{}", catalog_rows(&view.versions))
}

fn catalog_rows(rows: &[CatalogRowView]) -> String {
    rows.iter()
        .map(|row| {
            let mark = if row.selected { '*' } else { ' ' };
            format!("{mark} {}  {}", row.label, row.id)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Scope line shown above version-scoped output.
pub fn render_scope(view: &AppViewModel) -> Option<String> {
    match (&view.selected_technology, &view.selected_version) {
        (Some(technology), Some(version)) => Some(format!("{technology} {version}")),
        _ => None,
    }
}

pub fn render_urls(view: &UrlListView) -> String {
    if let Some(error) = &view.error {
        return format!("Could not load URLs: {error}");
    }
    if view.loading && view.rows.is_empty() {
        return "Loading URLs...".to_string();
    }

    let mut lines = Vec::new();
    let mut filters = Vec::new();
    if !view.search.is_empty() {
        filters.push(format!("search {:?}", view.search));
    }
    if let Some(status) = view.status_filter {
        filters.push(format!("status {}", status.as_str()));
    }
    if !filters.is_empty() {
        lines.push(format!("Filter: {}", filters.join(", ")));
    }

    if view.rows.is_empty() {
        lines.push(if view.total == 0 {
            "No URLs for this version.".to_string()
        } else {
            "No URLs match the filter.".to_string()
        });
    }
    lines.extend(view.rows.iter().map(format_url_row));
    lines.push(url_footer(view));
    lines.join("\n")
}

fn format_url_row(row: &UrlRowView) -> String {
    let mark = if row.selected { "[x]" } else { "[ ]" };
    let processed = if row.processed { " (processed)" } else { "" };
    format!(
        "{mark} {badge:<20} {url}{processed}  {id}",
        badge = badge(row.badge, row.tone),
        url = row.url,
        id = row.id
    )
}

fn url_footer(view: &UrlListView) -> String {
    let mut footer = format!(
        "Page {}/{} | {} of {} URLs",
        view.page, view.page_count, view.filtered_total, view.total
    );
    if view.selected_count > 0 {
        footer.push_str(&format!(" | {} selected", view.selected_count));
    }
    if view.discovered > 0 {
        footer.push_str(&format!(" | {} discovered", view.discovered));
    }
    footer
}

/// Status badge text with a tone marker.
pub fn badge(label: &str, tone: BadgeTone) -> String {
    let marker = match tone {
        BadgeTone::Neutral => ' ',
        BadgeTone::Active => '~',
        BadgeTone::Success => '+',
        BadgeTone::Error => '!',
        BadgeTone::Muted => '-',
    };
    format!("{marker}[{label}]")
}

pub fn render_url_detail(detail: &DetailView<UrlDetailView>) -> String {
    match detail {
        DetailView::Loading => "Loading URL...".to_string(),
        DetailView::Failed(message) => format!("Could not load URL: {message}"),
        DetailView::Loaded(url) => {
            let mut out = format!(
                "{}\nStatus: {}\nId: {}\n",
                url.url,
                url.status.badge_label(),
                url.id
            );
            match (url.source, &url.body) {
                (Some(source), Some(body)) => {
                    out.push_str(&format!("\n--- {} ---\n{body}", source.label()));
                }
                _ => out.push_str("\nNo content stored yet."),
            }
            out
        }
    }
}

pub fn render_snippets(view: &SnippetListView) -> String {
    if let Some(error) = &view.error {
        return format!("Could not load snippets: {error}");
    }
    if view.loading && view.rows.is_empty() {
        return "Loading snippets...".to_string();
    }

    let mut lines = Vec::new();
    if let (SnippetSource::SearchResults, Some(query)) = (view.source, &view.last_query) {
        lines.push(format!("Search results for {query:?}"));
    }
    if view.rows.is_empty() {
        lines.push("No snippets.".to_string());
    }
    for row in &view.rows {
        lines.push(format!("{}  {}", row.title, row.id));
        if !row.description.is_empty() {
            lines.push(format!("    {}", row.description));
        }
        let mut meta = row.source_url.clone();
        if !row.concepts.is_empty() {
            meta.push_str(&format!("  #{}", row.concepts.join(" #")));
        }
        lines.push(format!("    {meta}"));
    }
    lines.push(format!(
        "Page {}/{} | {} snippets",
        view.page, view.page_count, view.filtered_total
    ));
    if view.concept.is_none() && !view.concepts.is_empty() {
        lines.push(format!("Concepts: {}", view.concepts.join(", ")));
    }
    lines.join("\n")
}

pub fn render_snippet_detail(detail: &DetailView<SnippetDetailView>) -> String {
    match detail {
        DetailView::Loading => "Loading snippet...".to_string(),
        DetailView::Failed(message) => format!("Could not load snippet: {message}"),
        DetailView::Loaded(snippet) => {
            let mut out = format!("{}\n{}\n", snippet.title, snippet.source_url);
            if !snippet.concepts.is_empty() {
                out.push_str(&format!("#{}\n", snippet.concepts.join(" #")));
            }
            out.push('\n');
            out.push_str(&snippet.content);
            out
        }
    }
}

pub fn render_tasks(tasks: &[TaskRowView]) -> String {
    if tasks.is_empty() {
        return "No tasks.".to_string();
    }
    let mut lines = Vec::new();
    for task in tasks {
        let mut line = format!(
            "{id}  {kind:<10} {status:<10} {bar}",
            id = task.id,
            kind = task.task_type,
            status = task_status_label(task),
            bar = progress_bar(task.progress, PROGRESS_WIDTH)
        );
        if let Some(url) = &task.url {
            line.push_str(&format!("  {url}"));
        }
        lines.push(line);
        for stage in &task.stages {
            lines.push(format!(
                "    {name:<14} {status:<9} {bar}",
                name = stage.name,
                status = stage_label(stage.status),
                bar = progress_bar(stage.progress, PROGRESS_WIDTH / 2)
            ));
        }
        if let Some(error) = &task.error {
            lines.push(format!("    error: {error}"));
        }
    }
    lines.join("\n")
}

fn task_status_label(task: &TaskRowView) -> &'static str {
    if task.cancel_requested && !task.status.is_finished() {
        return "cancelling";
    }
    match task.status {
        TaskStatus::Queued => "queued",
        TaskStatus::Running => "running",
        TaskStatus::Completed => "done",
        TaskStatus::Failed => "failed",
        TaskStatus::Cancelled => "cancelled",
    }
}

fn stage_label(status: StageStatus) -> &'static str {
    match status {
        StageStatus::Pending => "pending",
        StageStatus::Active => "active",
        StageStatus::Completed => "done",
        StageStatus::Failed => "failed",
    }
}

/// Fixed-width bar followed by the percentage, e.g. `[#####.....]  50%`.
pub fn progress_bar(percent: u8, width: usize) -> String {
    let percent = percent.min(100) as usize;
    let filled = (percent * width + 50) / 100;
    format!(
        "[{}{}] {percent:>3}%",
        "#".repeat(filled),
        ".".repeat(width - filled)
    )
}

pub fn render_proxies(proxies: &[ProxyRowView]) -> String {
    if proxies.is_empty() {
        return "No proxies. Fetch some with `kb proxies refresh`.".to_string();
    }
    let mut lines: Vec<String> = proxies
        .iter()
        .map(|proxy| match &proxy.last_used {
            Some(at) => format!("{}  last used {at}", proxy.url),
            None => format!("{}  never used", proxy.url),
        })
        .collect();
    lines.push(format!("{} proxies", proxies.len()));
    lines.join("\n")
}

pub fn render_settings(settings: Option<&SettingsView>) -> String {
    let Some(settings) = settings else {
        return "No crawl settings loaded.".to_string();
    };
    let list = |items: &[String]| {
        if items.is_empty() {
            "(none)".to_string()
        } else {
            items.join(", ")
        }
    };
    let prefix = if settings.prefix_path.is_empty() {
        "(any)"
    } else {
        settings.prefix_path.as_str()
    };
    let mut out = format!(
        "Prefix path:    {prefix}\nAnti paths:     {}\nAnti keywords:  {}\nSkip processed: {}",
        list(&settings.anti_paths),
        list(&settings.anti_keywords),
        if settings.skip_processed { "yes" } else { "no" }
    );
    if let Some(skipped) = settings.last_skipped {
        out.push_str(&format!("\nLast filter pass skipped {skipped} URLs"));
    }
    out
}

pub fn render_notification(notification: &Notification) -> String {
    let level = match notification.kind {
        NotificationKind::Info => "info",
        NotificationKind::Success => "ok",
        NotificationKind::Warning => "warning",
        NotificationKind::Error => "error",
    };
    if notification.message.is_empty() {
        format!("{level}: {}", notification.title)
    } else {
        format!("{level}: {}: {}", notification.title, notification.message)
    }
}

#[cfg(test)]
mod tests {
    use kb_core::model::UrlStatus;
    use kb_core::StageView;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    use super::*;

    fn url_row(url: &str, status: UrlStatus, selected: bool) -> UrlRowView {
        UrlRowView {
            id: Uuid::nil(),
            url: url.to_string(),
            status,
            badge: status.badge_label(),
            tone: status.badge_tone(),
            selected,
            processed: false,
        }
    }

    #[test]
    fn progress_bar_rounds_and_clamps() {
        assert_eq!(progress_bar(0, 10), "[..........]   0%");
        assert_eq!(progress_bar(45, 10), "[#####.....]  45%");
        assert_eq!(progress_bar(100, 10), "[##########] 100%");
        assert_eq!(progress_bar(250, 4), "[####] 100%");
    }

    #[test]
    fn url_list_marks_selection_and_shows_footer() {
        let view = UrlListView {
            rows: vec![
                url_row("https://docs.rs/a", UrlStatus::Crawled, true),
                url_row("https://docs.rs/b", UrlStatus::CrawlError, false),
            ],
            page: 2,
            page_count: 3,
            filtered_total: 45,
            total: 60,
            selected_count: 1,
            search: "docs".to_string(),
            ..UrlListView::default()
        };
        let text = render_urls(&view);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Filter: search \"docs\"");
        assert!(lines[1].starts_with("[x] "), "{}", lines[1]);
        assert!(lines[1].contains("https://docs.rs/a"));
        assert!(lines[2].starts_with("[ ] "));
        assert!(lines[2].contains("![Crawl error]"));
        assert_eq!(lines[3], "Page 2/3 | 45 of 60 URLs | 1 selected");
    }

    #[test]
    fn empty_url_list_explains_why() {
        let unfiltered = UrlListView {
            page: 1,
            page_count: 1,
            ..UrlListView::default()
        };
        assert!(render_urls(&unfiltered).starts_with("No URLs for this version."));

        let filtered = UrlListView {
            total: 3,
            status_filter: Some(UrlStatus::Skipped),
            ..unfiltered
        };
        let text = render_urls(&filtered);
        assert!(text.contains("status skipped"));
        assert!(text.contains("No URLs match the filter."));
    }

    #[test]
    fn url_errors_replace_the_list() {
        let view = UrlListView {
            error: Some("connection refused".to_string()),
            rows: vec![url_row("https://docs.rs/a", UrlStatus::Crawled, false)],
            ..UrlListView::default()
        };
        assert_eq!(render_urls(&view), "Could not load URLs: connection refused");
    }

    #[test]
    fn tasks_show_stages_and_cancelling_state() {
        let task = TaskRowView {
            id: "t1".to_string(),
            task_type: "crawl".to_string(),
            status: TaskStatus::Running,
            progress: 40,
            url: Some("https://docs.rs/tokio".to_string()),
            stages: vec![StageView {
                name: "fetch".to_string(),
                progress: 100,
                status: StageStatus::Completed,
            }],
            cancel_requested: true,
            error: None,
        };
        let text = render_tasks(&[task]);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("t1  crawl      cancelling"), "{}", lines[0]);
        assert!(lines[0].contains("[########............]  40%"));
        assert!(lines[0].ends_with("https://docs.rs/tokio"));
        assert!(lines[1].contains("done"));
        assert!(lines[1].contains("[##########] 100%"));
    }

    #[test]
    fn settings_show_placeholders_for_empty_lists() {
        let settings = SettingsView {
            prefix_path: String::new(),
            anti_paths: Vec::new(),
            anti_keywords: vec!["changelog".to_string()],
            skip_processed: true,
            saving: false,
            last_skipped: Some(4),
        };
        assert_eq!(
            render_settings(Some(&settings)),
            "Prefix path:    (any)\nAnti paths:     (none)\nAnti keywords:  changelog\nSkip processed: yes\nLast filter pass skipped 4 URLs"
        );
    }

    #[test]
    fn notifications_carry_their_level() {
        assert_eq!(
            render_notification(&Notification::error("Load URLs", "timed out")),
            "error: Load URLs: timed out"
        );
        assert_eq!(
            render_notification(&Notification::success("Settings saved", "")),
            "ok: Settings saved"
        );
    }

    #[test]
    fn snippet_search_results_are_labelled() {
        let view = SnippetListView {
            source: SnippetSource::SearchResults,
            last_query: Some("spawn".to_string()),
            page: 1,
            page_count: 1,
            ..SnippetListView::default()
        };
        let text = render_snippets(&view);
        assert!(text.starts_with("Search results for \"spawn\"\nNo snippets."));
        assert!(text.ends_with("Page 1/1 | 0 snippets"));
    }
}
