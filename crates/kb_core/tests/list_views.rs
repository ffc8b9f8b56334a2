mod common;

use common::{doc_url, init_logging, scoped_state, with_urls};
use kb_core::model::UrlStatus;
use kb_core::{update, AppState, Msg, Pagination};
use pretty_assertions::assert_eq;

fn forty_five_urls() -> AppState {
    let (state, scope) = scoped_state();
    let urls = (0..45)
        .map(|n| {
            let status = if n % 3 == 0 {
                UrlStatus::Crawled
            } else {
                UrlStatus::PendingCrawl
            };
            doc_url(&scope, &format!("https://docs.example.com/page-{n:02}"), status)
        })
        .collect();
    with_urls(state, &scope, urls)
}

#[test]
fn pages_slice_the_filtered_list() {
    let pagination = Pagination::new(20);
    assert_eq!(pagination.page_count(45), 3);
    assert_eq!(pagination.page_count(0), 1);

    let mut last = pagination;
    last.set_page(3);
    assert_eq!(last.page_range(45), 40..45);

    let mut beyond = pagination;
    beyond.set_page(9);
    assert_eq!(beyond.current_page(45), 3);
    assert_eq!(beyond.page_range(45), 40..45);
}

#[test]
fn page_requests_are_clamped() {
    init_logging();
    let state = forty_five_urls();
    let (state, _) = update(state, Msg::UrlPageRequested(7));
    let view = state.view();
    assert_eq!(view.urls.page, 3);
    assert_eq!(view.urls.page_count, 3);
    assert_eq!(view.urls.rows.len(), 5);

    let (state, _) = update(state, Msg::UrlPageStepped(-10));
    assert_eq!(state.view().urls.page, 1);
    assert_eq!(state.view().urls.rows.len(), 20);
}

#[test]
fn search_is_case_insensitive_and_resets_the_page() {
    init_logging();
    let state = forty_five_urls();
    let (state, _) = update(state, Msg::UrlPageRequested(2));
    let (state, _) = update(state, Msg::UrlSearchChanged("PAGE-1".into()));

    let view = state.view();
    assert_eq!(view.urls.page, 1);
    assert_eq!(view.urls.filtered_total, 10);
    assert!(view.urls.rows.iter().all(|row| row.url.contains("page-1")));
}

#[test]
fn status_filter_combines_with_search() {
    init_logging();
    let state = forty_five_urls();
    let (state, _) = update(state, Msg::UrlStatusFilterChanged(Some(UrlStatus::Crawled)));
    assert_eq!(state.view().urls.filtered_total, 15);

    let (state, _) = update(state, Msg::UrlSearchChanged("page-0".into()));
    let urls: Vec<String> = state.view().urls.rows.into_iter().map(|row| row.url).collect();
    assert_eq!(
        urls,
        vec![
            "https://docs.example.com/page-00".to_string(),
            "https://docs.example.com/page-03".to_string(),
            "https://docs.example.com/page-06".to_string(),
            "https://docs.example.com/page-09".to_string(),
        ]
    );
}

#[test]
fn page_selection_covers_only_visible_rows() {
    init_logging();
    let state = forty_five_urls();
    let (state, _) = update(state, Msg::UrlPageSelected);
    assert_eq!(state.view().urls.selected_count, 20);

    let (state, _) = update(state, Msg::UrlFilteredSelected);
    assert_eq!(state.view().urls.selected_count, 45);

    let (state, _) = update(state, Msg::UrlSelectionCleared);
    assert_eq!(state.view().urls.selected_count, 0);
}

#[test]
fn toggling_twice_deselects() {
    init_logging();
    let state = forty_five_urls();
    let id = state.view().urls.rows[0].id;
    let (state, _) = update(state, Msg::UrlToggled(id));
    assert!(state.view().urls.rows[0].selected);
    let (state, _) = update(state, Msg::UrlToggled(id));
    assert!(!state.view().urls.rows[0].selected);
}

#[test]
fn reload_prunes_selection_of_missing_urls() {
    init_logging();
    let (state, scope) = scoped_state();
    let kept = doc_url(&scope, "https://docs.rs/kept", UrlStatus::Crawled);
    let dropped = doc_url(&scope, "https://docs.rs/dropped", UrlStatus::Crawled);
    let state = with_urls(state, &scope, vec![kept.clone(), dropped.clone()]);
    let (state, _) = update(state, Msg::UrlToggled(kept.id));
    let (state, _) = update(state, Msg::UrlToggled(dropped.id));

    let state = with_urls(state, &scope, vec![kept.clone()]);
    assert_eq!(state.urls().selection().ids(), vec![kept.id]);
}

#[test]
fn page_size_change_returns_to_first_page() {
    init_logging();
    let state = forty_five_urls();
    let (state, _) = update(state, Msg::UrlPageRequested(3));
    let (state, _) = update(state, Msg::UrlPageSizeChanged(10));
    let view = state.view();
    assert_eq!(view.urls.page, 1);
    assert_eq!(view.urls.page_count, 5);
}
