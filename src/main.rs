mod action;
mod api;
mod app;
mod config;
mod credentials;
mod error;
mod event;
mod graphql;
mod route;
mod search_list;
mod tui;
mod types;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::config::Config;
use crate::event::Event;
use crate::graphql::GraphQlBoard;
use crate::route::Route;
use crate::tui::EventHandler;

#[derive(Debug, Parser)]
#[command(name = "msgboard", version, about)]
struct Cli {
    /// Screen to open first, e.g. "/", "/?search=rust", "/messages/create/"
    #[arg(default_value = "/")]
    route: String,

    /// Initial search term (overrides any ?search= in the route)
    #[arg(short, long)]
    search: Option<String>,

    /// GraphQL endpoint
    #[arg(long)]
    graphql_url: Option<String>,

    /// Token endpoint used for login
    #[arg(long)]
    token_url: Option<String>,

    /// Messages fetched per page
    #[arg(long)]
    page_size: Option<u32>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Config file (default: ~/.config/msgboard/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.graphql_url {
            config.server.graphql_url = url.clone();
        }
        if let Some(url) = &self.token_url {
            config.server.token_url = url.clone();
        }
        if let Some(size) = self.page_size.filter(|s| *s > 0) {
            config.list.page_size = size;
        }
        if let Some(secs) = self.timeout {
            config.server.timeout_secs = secs;
        }
    }

    /// Unknown paths open the message list.
    fn initial_route(&self) -> Route {
        let route = Route::parse(&self.route).unwrap_or_else(|| {
            tracing::warn!(path = %self.route, "unknown route, opening message list");
            Route::List { search: None }
        });
        match (route, &self.search) {
            (Route::List { .. }, Some(term)) => Route::List {
                search: Some(term.clone()).filter(|t| !t.is_empty()),
            },
            (route, _) => route,
        }
    }
}

/// Log to ~/.cache/msgboard/msgboard.log so output does not land on the TUI.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_file = dirs::cache_dir()
        .map(|d| d.join("msgboard"))
        .and_then(|dir| {
            std::fs::create_dir_all(&dir).ok()?;
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("msgboard.log"))
                .ok()
        });

    match log_file {
        Some(file) => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
            .init(),
        None => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    let mut config = Config::load(cli.config.as_deref());
    cli.apply_overrides(&mut config);
    let route = cli.initial_route();

    let credentials = credentials::load_credentials(&config);
    let board = GraphQlBoard::new(
        config.server.graphql_url.clone(),
        config.server.token_url.clone(),
        config.timeout(),
        credentials,
    )?;
    tracing::info!(endpoint = %config.server.graphql_url, path = %route.path(), "starting");

    tui::install_panic_hook();

    let result = run(Arc::new(board), route, &config).await;

    tui::restore()?;

    result
}

async fn run(
    board: Arc<GraphQlBoard>,
    route: Route,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut app = App::new(
        board,
        action_tx.clone(),
        route,
        config.list.page_size,
        config.timeout(),
    );

    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(render_rate);

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_flag_overrides_route_query() {
        let cli = Cli::parse_from(["msgboard", "/?search=old", "--search", "new"]);
        assert_eq!(
            cli.initial_route(),
            Route::List {
                search: Some("new".to_string())
            }
        );
    }

    #[test]
    fn search_flag_ignored_for_other_routes() {
        let cli = Cli::parse_from(["msgboard", "/login/", "--search", "x"]);
        assert_eq!(cli.initial_route(), Route::Login);
    }

    #[test]
    fn unknown_route_falls_back_to_list() {
        let cli = Cli::parse_from(["msgboard", "/nope/"]);
        assert_eq!(cli.initial_route(), Route::List { search: None });
    }

    #[test]
    fn unknown_route_still_takes_search_flag() {
        let cli = Cli::parse_from(["msgboard", "/admin/", "--search", "rust"]);
        assert_eq!(
            cli.initial_route(),
            Route::List {
                search: Some("rust".to_string())
            }
        );
    }

    #[test]
    fn overrides_replace_config_values() {
        let cli = Cli::parse_from([
            "msgboard",
            "--graphql-url",
            "http://board.test/gql",
            "--page-size",
            "10",
            "--timeout",
            "3",
        ]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.server.graphql_url, "http://board.test/gql");
        assert_eq!(config.list.page_size, 10);
        assert_eq!(config.server.timeout_secs, 3);
        assert_eq!(
            config.server.token_url,
            "http://localhost:8000/api-token-auth/"
        );
    }
}
