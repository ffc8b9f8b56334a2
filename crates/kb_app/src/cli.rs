//! Command-line surface of the `kb` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use kb_core::model::UrlStatus;
use uuid::Uuid;

/// Terminal client for the documentation knowledge base.
///
/// Every command talks to the backend bridge configured in `kb.ron`
/// (or `--config`). Technology and version scope default to the last
/// ones used and can be set with `--tech` / `--ver`.
#[derive(Debug, Parser)]
#[command(name = "kb", version, about = "Documentation knowledge-base client")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Configuration file (RON). Defaults to `./kb.ron` when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend bridge base URL, overrides the config file.
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Log destination: terminal, file, both or off.
    #[arg(long, global = true)]
    pub log: Option<String>,

    /// Log debug output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Rows per page for URL and snippet lists.
    #[arg(long, global = true)]
    pub page_size: Option<usize>,

    /// Technology name or id.
    #[arg(long, global = true)]
    pub tech: Option<String>,

    /// Version label or id of the selected technology.
    #[arg(id = "ver", long = "ver", global = true)]
    pub version: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Technologies and their versions.
    #[command(subcommand)]
    Tech(TechCommand),
    /// Documentation URLs of the selected version.
    #[command(subcommand)]
    Urls(UrlsCommand),
    /// Crawl settings of the selected version.
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Extracted documentation snippets.
    #[command(subcommand)]
    Snippets(SnippetsCommand),
    /// Backend tasks.
    #[command(subcommand)]
    Tasks(TasksCommand),
    /// Start or stop crawling.
    #[command(subcommand)]
    Crawl(CrawlCommand),
    /// Crawl proxies.
    #[command(subcommand)]
    Proxies(ProxiesCommand),
}

impl Command {
    /// Whether the command works on the technology/version scope.
    pub fn needs_version(&self) -> bool {
        match self {
            Command::Tech(command) => matches!(command, TechCommand::RemoveVersion { .. }),
            Command::Urls(_) | Command::Settings(_) => true,
            Command::Snippets(command) => !matches!(
                command,
                SnippetsCommand::Search { global: true, .. } | SnippetsCommand::Show { .. }
            ),
            Command::Crawl(command) => !matches!(command, CrawlCommand::Stop { all: true }),
            Command::Tasks(_) | Command::Proxies(_) => false,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum TechCommand {
    /// List technologies.
    List,
    /// Create a technology.
    Add {
        name: String,
        #[arg(long)]
        language: Option<String>,
    },
    /// List versions of `--tech`.
    Versions,
    /// Add a version to `--tech`.
    AddVersion { version: String },
    /// Delete a technology with all its versions.
    Remove { technology: String },
    /// Delete a version of `--tech`.
    RemoveVersion { version: String },
}

#[derive(Debug, Clone, Default, Args)]
pub struct UrlListArgs {
    /// Case-insensitive substring of the URL.
    #[arg(long)]
    pub search: Option<String>,
    /// Only URLs with this status, e.g. `markdown_ready`.
    #[arg(long, value_parser = parse_status)]
    pub status: Option<UrlStatus>,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

/// URLs to act on: explicit ids, or everything matching the list filters.
#[derive(Debug, Clone, Default, Args)]
pub struct UrlSelectionArgs {
    pub ids: Vec<Uuid>,
    /// Select every URL matching `--search` / `--status` instead of ids.
    #[arg(long, conflicts_with = "ids")]
    pub filtered: bool,
    #[command(flatten)]
    pub list: UrlListArgs,
}

#[derive(Debug, Subcommand)]
pub enum UrlsCommand {
    /// Paged URL list with status badges.
    List(UrlListArgs),
    /// Add a URL to the version.
    Add { url: String },
    /// Show a URL with its best available body.
    Show { id: Uuid },
    /// Start one crawl per selected URL.
    Crawl(UrlSelectionArgs),
    /// Clean markdown of the selected URLs.
    Clean(UrlSelectionArgs),
    /// Generate snippets from the selected URLs.
    Snippets(UrlSelectionArgs),
    /// Apply crawl filters; shows the local preview first.
    Filters,
}

#[derive(Debug, Clone, Default, Args)]
pub struct SettingsArgs {
    #[arg(long)]
    pub prefix: Option<String>,
    /// Comma separated path fragments to skip.
    #[arg(long)]
    pub anti_paths: Option<String>,
    /// Comma separated keywords to skip.
    #[arg(long)]
    pub anti_keywords: Option<String>,
    #[arg(long)]
    pub skip_processed: Option<bool>,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    Show,
    /// Save settings; omitted fields keep their current value.
    Save(SettingsArgs),
}

#[derive(Debug, Subcommand)]
pub enum SnippetsCommand {
    /// Snippets of the version, filtered locally.
    List {
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        concept: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Vector search through the backend.
    Search {
        query: String,
        #[arg(long, default_value_t = kb_core::form::DEFAULT_SEARCH_LIMIT)]
        limit: usize,
        /// Search all technologies instead of the selected version.
        #[arg(long)]
        global: bool,
    },
    Show { id: Uuid },
}

#[derive(Debug, Subcommand)]
pub enum TasksCommand {
    List,
    Cancel { task_id: String },
    /// Follow the event stream and redraw tasks as they change.
    Watch {
        /// Stop after this many seconds.
        #[arg(long, default_value_t = 60)]
        seconds: u64,
        /// Stop as soon as no task is active.
        #[arg(long)]
        until_idle: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum CrawlCommand {
    /// Crawl from a start URL with the version's settings as defaults.
    Start {
        start_url: String,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Stop crawling the selected version.
    Stop {
        /// Stop every crawl.
        #[arg(long)]
        all: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProxiesCommand {
    List,
    /// Fetch a fresh proxy list.
    Refresh,
}

fn parse_status(raw: &str) -> Result<UrlStatus, String> {
    UrlStatus::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = UrlStatus::ALL.iter().map(|status| status.as_str()).collect();
        format!("unknown status {raw:?}; expected one of {}", known.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn version_flag_and_scope_flag_coexist() {
        let err = Cli::try_parse_from(["kb", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);

        let cli = Cli::try_parse_from(["kb", "--ver", "2.0", "tasks", "list"]).unwrap();
        assert_eq!(cli.global.version.as_deref(), Some("2.0"));
    }

    #[test]
    fn global_scope_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "kb", "urls", "list", "--tech", "tokio", "--ver", "1.40", "--status", "crawl-error",
        ])
        .unwrap();
        assert_eq!(cli.global.tech.as_deref(), Some("tokio"));
        assert_eq!(cli.global.version.as_deref(), Some("1.40"));
        match cli.command {
            Command::Urls(UrlsCommand::List(args)) => {
                assert_eq!(args.status, Some(UrlStatus::CrawlError));
                assert_eq!(args.page, 1);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn filtered_selection_excludes_ids() {
        let id = Uuid::new_v4().to_string();
        assert!(Cli::try_parse_from(["kb", "urls", "crawl", "--filtered", id.as_str()]).is_err());
        assert!(Cli::try_parse_from(["kb", "urls", "crawl", id.as_str()]).is_ok());
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(Cli::try_parse_from(["kb", "urls", "list", "--status", "weird"]).is_err());
    }

    #[test]
    fn only_scoped_commands_need_a_version() {
        let needs = |args: &[&str]| Cli::try_parse_from(args).unwrap().command.needs_version();
        assert!(needs(&["kb", "urls", "filters"]));
        assert!(needs(&["kb", "snippets", "search", "spawn"]));
        assert!(!needs(&["kb", "snippets", "search", "spawn", "--global"]));
        assert!(!needs(&["kb", "crawl", "stop", "--all"]));
        assert!(!needs(&["kb", "tasks", "list"]));
        assert!(!needs(&["kb", "tech", "versions"]));
    }
}
