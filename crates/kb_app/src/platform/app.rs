use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use chrono::Local;
use kb_bridge::StateFile;
use kb_core::filter::skipped_by_settings;
use kb_core::form::{AddUrlForm, CrawlForm, SettingsForm, SnippetSearchForm};
use kb_core::model::CrawlingSettings;
use kb_core::store::SnippetSource;
use kb_core::{update, AppState, AppViewModel, Msg, Notification, NotificationKind};
use kb_logging::{kb_info, kb_warn};
use uuid::Uuid;

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::persistence::{load_preferences, save_preferences, Preferences};
use super::ui::render;
use crate::cli::{
    Cli, Command, CrawlCommand, GlobalArgs, ProxiesCommand, SettingsArgs, SettingsCommand,
    SnippetsCommand, TasksCommand, TechCommand, UrlListArgs, UrlSelectionArgs, UrlsCommand,
};

const WATCH_POLL: Duration = Duration::from_millis(250);

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::load(cli.global.config.as_deref())?;
    config.apply_overrides(&cli.global);
    kb_logging::initialize(config.log_destination()?, config.log_level()?);

    let state_file = StateFile::new(config.state_file.clone());
    let mut preferences = load_preferences(&state_file);
    if cli.global.page_size.is_some() {
        preferences.page_size = cli.global.page_size;
    }
    let page_size = preferences.page_size.unwrap_or(config.page_size);

    let settings = config.bridge_settings();
    let runner = EffectRunner::new(&settings).context("could not start the backend bridge")?;
    // Replies can only be late by the request timeout plus scheduling slack.
    let reply_timeout = settings.request_timeout + Duration::from_secs(2);
    let mut session = Session::new(AppState::with_page_size(page_size), runner, reply_timeout);
    kb_info!("kb started against {}", settings.base_url);

    session.dispatch(Msg::CatalogRefreshRequested);
    session.settle();

    let needs_technology = cli.command.needs_version()
        || matches!(
            cli.command,
            Command::Tech(TechCommand::Versions | TechCommand::AddVersion { .. })
        );
    if needs_technology || cli.global.tech.is_some() {
        session.select_scope(&cli.global, &preferences, cli.command.needs_version())?;
        preferences.technology_id = session.state.catalog().selected_technology();
        preferences.version_id = session.state.catalog().selected_version();
    }

    execute(&mut session, cli.command)?;

    if let Some(id) = preferences.technology_id {
        if session.state.catalog().technology(id).is_none() {
            preferences.technology_id = None;
            preferences.version_id = None;
        }
    }
    save_preferences(&state_file, &preferences);
    session.finish()
}

/// One run of the message loop against the backend.
struct Session {
    state: AppState,
    runner: EffectRunner,
    reply_timeout: Duration,
    failures: usize,
}

impl Session {
    fn new(state: AppState, runner: EffectRunner, reply_timeout: Duration) -> Self {
        Self {
            state,
            runner,
            reply_timeout,
            failures: 0,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let notifications = state.take_notifications();
        self.state = state;
        self.report(notifications);
        self.runner.enqueue(effects);
    }

    fn report(&mut self, notifications: Vec<Notification>) {
        for notification in notifications {
            if notification.kind == NotificationKind::Error {
                self.failures += 1;
            }
            eprintln!("{}", render::render_notification(&notification));
        }
    }

    /// Feeds replies back into `update` until no remote call is outstanding.
    fn settle(&mut self) {
        loop {
            if self.runner.pending() == 0 {
                match self.runner.try_next_msg() {
                    Some(msg) => self.dispatch(msg),
                    None => return,
                }
                continue;
            }
            match self.runner.next_msg(self.reply_timeout) {
                Some(msg) => self.dispatch(msg),
                None => {
                    kb_warn!(
                        "gave up waiting for {} backend replies",
                        self.runner.pending()
                    );
                    self.failures += 1;
                    return;
                }
            }
        }
    }

    fn run(&mut self, msgs: impl IntoIterator<Item = Msg>) {
        for msg in msgs {
            self.dispatch(msg);
        }
        self.settle();
    }

    fn view(&self) -> AppViewModel {
        self.state.view()
    }

    fn version_id(&self) -> anyhow::Result<Uuid> {
        match self.state.catalog().selected_version() {
            Some(id) => Ok(id),
            None => bail!("select a technology and version with --tech and --ver"),
        }
    }

    fn select_scope(
        &mut self,
        args: &GlobalArgs,
        preferences: &Preferences,
        needs_version: bool,
    ) -> anyhow::Result<()> {
        let explicit_tech = args.tech.is_some();
        let technology = match &args.tech {
            Some(needle) => match self.state.catalog().find_technology(needle) {
                Some(tech) => Some(tech.id),
                None => bail!("unknown technology {needle:?}"),
            },
            None => preferences
                .technology_id
                .filter(|id| self.state.catalog().technology(*id).is_some()),
        };
        let Some(technology_id) = technology else {
            bail!("select a technology with --tech");
        };
        self.run([Msg::TechnologySelected(Some(technology_id))]);

        let version = match &args.version {
            Some(needle) => match self.state.catalog().find_version(needle) {
                Some(version) => Some(version.id),
                None => bail!("unknown version {needle:?}"),
            },
            // A remembered version only applies to the remembered technology.
            None if !explicit_tech || preferences.technology_id == Some(technology_id) => {
                preferences
                    .version_id
                    .filter(|id| self.state.catalog().version(*id).is_some())
            }
            None => None,
        };
        match version {
            Some(version_id) => self.run([Msg::VersionSelected(Some(version_id))]),
            None if needs_version => bail!("select a version with --ver"),
            None => {}
        }
        if let Some(scope) = render::render_scope(&self.view()) {
            kb_info!("scope: {scope}");
        }
        Ok(())
    }

    fn apply_url_list(&mut self, args: &UrlListArgs) {
        let mut msgs = Vec::new();
        if let Some(search) = &args.search {
            msgs.push(Msg::UrlSearchChanged(search.clone()));
        }
        if args.status.is_some() {
            msgs.push(Msg::UrlStatusFilterChanged(args.status));
        }
        msgs.push(Msg::UrlPageRequested(args.page));
        self.run(msgs);
    }

    fn select_urls(&mut self, args: &UrlSelectionArgs) -> anyhow::Result<()> {
        self.apply_url_list(&args.list);
        if args.filtered {
            self.run([Msg::UrlFilteredSelected]);
        } else {
            for id in &args.ids {
                if self.state.urls().get(*id).is_none() {
                    bail!("no URL with id {id} in this version");
                }
                if !self.state.urls().selection().contains(id) {
                    self.dispatch(Msg::UrlToggled(*id));
                }
            }
        }
        if self.state.urls().selection().is_empty() {
            bail!("no URLs selected; pass ids or --filtered");
        }
        Ok(())
    }

    fn print_urls(&self) {
        let view = self.view();
        if let Some(scope) = render::render_scope(&view) {
            println!("{scope}");
        }
        println!("{}", render::render_urls(&view.urls));
    }

    fn watch_tasks(&mut self, seconds: u64, until_idle: bool) {
        self.run([Msg::TasksRefreshRequested]);
        let _ = self.state.consume_dirty();
        println!("{}", render::render_tasks(&self.view().tasks));
        if until_idle && self.state.tasks().active().is_empty() {
            return;
        }

        self.runner.subscribe_events();
        let deadline = Instant::now() + Duration::from_secs(seconds);
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            let Some(msg) = self.runner.next_msg(remaining.min(WATCH_POLL)) else {
                continue;
            };
            let closed = matches!(msg, Msg::EventStreamClosed(_));
            self.dispatch(msg);
            if self.state.consume_dirty() {
                println!("--- {} ---", Local::now().format("%H:%M:%S"));
                println!("{}", render::render_tasks(&self.view().tasks));
            }
            if closed || (until_idle && self.state.tasks().active().is_empty()) {
                break;
            }
        }
        self.runner.unsubscribe_events();
        self.settle();
    }

    fn finish(self) -> anyhow::Result<()> {
        if self.failures > 0 {
            bail!("{} operation(s) failed", self.failures);
        }
        Ok(())
    }
}

fn execute(session: &mut Session, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Tech(command) => execute_tech(session, command),
        Command::Urls(command) => execute_urls(session, command),
        Command::Settings(command) => execute_settings(session, command),
        Command::Snippets(command) => execute_snippets(session, command),
        Command::Tasks(command) => {
            match command {
                TasksCommand::List => session.run([Msg::TasksRefreshRequested]),
                TasksCommand::Cancel { task_id } => {
                    session.run([Msg::TasksRefreshRequested]);
                    if session.state.tasks().get(&task_id).is_none() {
                        bail!("no task with id {task_id:?}");
                    }
                    session.run([Msg::CancelTaskClicked(task_id)]);
                }
                TasksCommand::Watch {
                    seconds,
                    until_idle,
                } => {
                    session.watch_tasks(seconds, until_idle);
                    return Ok(());
                }
            }
            println!("{}", render::render_tasks(&session.view().tasks));
            Ok(())
        }
        Command::Crawl(command) => {
            match command {
                CrawlCommand::Start {
                    start_url,
                    settings,
                } => {
                    let version_id = session.version_id()?;
                    let mut form =
                        CrawlForm::from_settings(&session.state.settings().effective(version_id));
                    form.start_url = start_url;
                    apply_settings_args(
                        &settings,
                        &mut form.prefix_path,
                        &mut form.anti_paths_text,
                        &mut form.anti_keywords_text,
                        &mut form.skip_processed,
                    );
                    session.run([Msg::CrawlFormSubmitted(form)]);
                }
                CrawlCommand::Stop { all: true } => session.run([Msg::StopAllCrawlingClicked]),
                CrawlCommand::Stop { all: false } => session.run([Msg::StopCrawlingClicked]),
            }
            session.run([Msg::TasksRefreshRequested]);
            println!("{}", render::render_tasks(&session.view().tasks));
            Ok(())
        }
        Command::Proxies(command) => {
            session.run([match command {
                ProxiesCommand::List => Msg::ProxiesRequested,
                ProxiesCommand::Refresh => Msg::ProxiesRefreshClicked,
            }]);
            println!("{}", render::render_proxies(&session.view().proxies));
            Ok(())
        }
    }
}

fn execute_tech(session: &mut Session, command: TechCommand) -> anyhow::Result<()> {
    match command {
        TechCommand::List => {}
        TechCommand::Add { name, language } => {
            session.run([Msg::TechnologySubmitted { name, language }]);
        }
        TechCommand::Versions => {
            println!("{}", render::render_versions(&session.view()));
            return Ok(());
        }
        TechCommand::AddVersion { version } => {
            session.run([Msg::VersionSubmitted(version)]);
            println!("{}", render::render_versions(&session.view()));
            return Ok(());
        }
        TechCommand::Remove { technology } => {
            let Some(id) = session
                .state
                .catalog()
                .find_technology(&technology)
                .map(|tech| tech.id)
            else {
                bail!("unknown technology {technology:?}");
            };
            session.run([Msg::TechnologyDeleteRequested(id)]);
        }
        TechCommand::RemoveVersion { version } => {
            let Some(id) = session
                .state
                .catalog()
                .find_version(&version)
                .map(|version| version.id)
            else {
                bail!("unknown version {version:?}");
            };
            session.run([Msg::VersionDeleteRequested(id)]);
            println!("{}", render::render_versions(&session.view()));
            return Ok(());
        }
    }
    println!("{}", render::render_technologies(&session.view()));
    Ok(())
}

fn execute_urls(session: &mut Session, command: UrlsCommand) -> anyhow::Result<()> {
    match command {
        UrlsCommand::List(args) => session.apply_url_list(&args),
        UrlsCommand::Add { url } => session.run([Msg::AddUrlSubmitted(AddUrlForm { url })]),
        UrlsCommand::Show { id } => {
            session.run([Msg::UrlDetailOpened(id)]);
            if let Some(detail) = &session.view().url_detail {
                println!("{}", render::render_url_detail(detail));
            }
            session.run([Msg::UrlDetailClosed]);
            return Ok(());
        }
        UrlsCommand::Crawl(args) => {
            session.select_urls(&args)?;
            session.run([Msg::CrawlSelectedClicked]);
        }
        UrlsCommand::Clean(args) => {
            session.select_urls(&args)?;
            session.run([Msg::CleanSelectedClicked]);
        }
        UrlsCommand::Snippets(args) => {
            session.select_urls(&args)?;
            session.run([Msg::GenerateSnippetsClicked]);
        }
        UrlsCommand::Filters => {
            let version_id = session.version_id()?;
            print_skip_preview(session, &session.state.settings().effective(version_id));
            session.run([Msg::ApplyFiltersClicked]);
        }
    }
    session.print_urls();
    Ok(())
}

fn execute_settings(session: &mut Session, command: SettingsCommand) -> anyhow::Result<()> {
    if let SettingsCommand::Save(args) = command {
        let version_id = session.version_id()?;
        let mut form = SettingsForm::from_settings(&session.state.settings().effective(version_id));
        apply_settings_args(
            &args,
            &mut form.prefix_path,
            &mut form.anti_paths_text,
            &mut form.anti_keywords_text,
            &mut form.skip_processed,
        );
        print_skip_preview(session, &form.preview(version_id));
        session.run([Msg::SettingsSubmitted(form)]);
    }
    println!("{}", render::render_settings(session.view().settings.as_ref()));
    Ok(())
}

fn execute_snippets(session: &mut Session, command: SnippetsCommand) -> anyhow::Result<()> {
    match command {
        SnippetsCommand::List {
            filter,
            concept,
            page,
        } => {
            let mut msgs = vec![Msg::SnippetSourceChanged(SnippetSource::Browse)];
            if let Some(filter) = filter {
                msgs.push(Msg::SnippetFilterChanged(filter));
            }
            if concept.is_some() {
                msgs.push(Msg::SnippetConceptChanged(concept));
            }
            msgs.push(Msg::SnippetPageRequested(page));
            session.run(msgs);
        }
        SnippetsCommand::Search {
            query,
            limit,
            global,
        } => session.run([Msg::SnippetSearchSubmitted(SnippetSearchForm {
            query,
            limit,
            scoped: !global,
        })]),
        SnippetsCommand::Show { id } => {
            session.run([Msg::SnippetDetailOpened(id)]);
            if let Some(detail) = &session.view().snippet_detail {
                println!("{}", render::render_snippet_detail(detail));
            }
            session.run([Msg::SnippetDetailClosed]);
            return Ok(());
        }
    }
    println!("{}", render::render_snippets(&session.view().snippets));
    Ok(())
}

fn apply_settings_args(
    args: &SettingsArgs,
    prefix_path: &mut String,
    anti_paths: &mut String,
    anti_keywords: &mut String,
    skip_processed: &mut bool,
) {
    if let Some(prefix) = &args.prefix {
        *prefix_path = prefix.clone();
    }
    if let Some(paths) = &args.anti_paths {
        *anti_paths = paths.clone();
    }
    if let Some(keywords) = &args.anti_keywords {
        *anti_keywords = keywords.clone();
    }
    if let Some(skip) = args.skip_processed {
        *skip_processed = skip;
    }
}

/// Local count of URLs the backend filter pass would skip with `settings`.
fn print_skip_preview(session: &Session, settings: &CrawlingSettings) {
    let urls = session.state.urls().urls();
    let skipped = skipped_by_settings(urls, settings).len();
    println!(
        "{skipped} of {} URLs would be skipped by these settings",
        urls.len()
    );
}
