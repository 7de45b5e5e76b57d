use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event as CEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::RwLock;
use tracing::info;

use svcdeck_core::backend::Backend;
use svcdeck_core::clock::local_clock;
use svcdeck_core::config::DeckConfig;
use svcdeck_core::model::ControlAction;
use svcdeck_core::reducer::DashEvent;
use svcdeck_core::state::DashboardState;
use svcdeck_core::store::RequestSeqs;
use svcdeck_core::view::{Intent, render_table};

use svcdeck_cli::bus::{EventBus, spawn_reducer};
use svcdeck_cli::commands;
use svcdeck_cli::demo::DemoBackend;
use svcdeck_cli::dispatcher::{ActionDispatcher, LogFetcher};
use svcdeck_cli::http::HttpBackend;
use svcdeck_cli::logging;
use svcdeck_cli::poller::{Poller, spawn_poller};
use svcdeck_cli::scope::ViewScope;
use svcdeck_cli::ticker::{spawn_clock, spawn_log_tail};
use svcdeck_cli::ui::app::{UiCommand, UiState};
use svcdeck_cli::ui::dashboard::{self, HeaderInfo};

#[derive(Parser)]
#[command(name = "svcdeck")]
#[command(about = "Watch and control services behind a service-control API", long_about = None)]
struct Cli {
    /// Base URL of the service-control API
    #[arg(long, global = true)]
    url: Option<String>,

    /// Config file (otherwise $SVCDECK_CONFIG or svcdeck.yaml is searched)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the built-in demo fleet
    #[arg(long, global = true)]
    demo: bool,

    /// Where the TUI writes its log
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive dashboard (default)
    Tui,
    /// Print stats and the service table once
    Status {
        #[arg(short, long)]
        filter: Option<String>,
    },
    Start {
        service: String,
    },
    Stop {
        service: String,
    },
    Restart {
        service: String,
    },
    /// Print recent logs for one service
    Logs {
        service: String,
    },
}

/// Resolved settings plus the file they came from.
fn load_config(cli: &Cli) -> anyhow::Result<(DeckConfig, Option<PathBuf>)> {
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    let (mut config, source) =
        DeckConfig::resolve(cli.config.as_deref(), &cwd).context("failed to load config")?;

    if let Some(url) = &cli.url {
        config.base_url = url.clone();
    }
    if cli.demo {
        config.demo = true;
    }
    if let Some(path) = &cli.log_file {
        config.log_file = Some(path.clone());
    }
    config.validate().context("invalid configuration")?;
    Ok((config, source))
}

fn build_backend(config: &DeckConfig) -> anyhow::Result<(Arc<dyn Backend>, String)> {
    if config.demo {
        return Ok((Arc::new(DemoBackend::new()), "demo fleet".to_string()));
    }
    let backend = HttpBackend::new(&config.base_url, config.request_timeout())?;
    let label = backend.base_url().to_string();
    Ok((Arc::new(backend), label))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, source) = load_config(&cli)?;

    let one_shot = !matches!(cli.command, None | Some(Commands::Tui));
    if one_shot {
        logging::init_stderr();
    } else {
        let log_path = config
            .log_file
            .clone()
            .unwrap_or_else(logging::default_log_path);
        logging::init_file(&log_path)?;
    }
    match &source {
        Some(path) => info!(path = %path.display(), "loaded config"),
        None => info!("no config file found, using defaults"),
    }

    let (backend, label) = build_backend(&config)?;

    match cli.command {
        Some(Commands::Status { filter }) => commands::run_status(backend.as_ref(), filter).await,
        Some(Commands::Start { service }) => {
            commands::run_control(backend.as_ref(), &service, ControlAction::Start).await
        }
        Some(Commands::Stop { service }) => {
            commands::run_control(backend.as_ref(), &service, ControlAction::Stop).await
        }
        Some(Commands::Restart { service }) => {
            commands::run_control(backend.as_ref(), &service, ControlAction::Restart).await
        }
        Some(Commands::Logs { service }) => commands::run_logs(backend.as_ref(), &service).await,
        Some(Commands::Tui) | None => run_tui(config, backend, label).await,
    }
}

/// Handles the input loop needs to reach the background jobs.
struct Session {
    state: Arc<RwLock<DashboardState>>,
    bus: EventBus,
    dispatcher: ActionDispatcher,
    logs: LogFetcher,
    label: String,
}

async fn run_tui(config: DeckConfig, backend: Arc<dyn Backend>, label: String) -> anyhow::Result<()> {
    info!(backend = backend.name(), target = %label, "starting dashboard");

    let bus = EventBus::new();
    let state = Arc::new(RwLock::new(DashboardState::new(&config)));
    state.write().await.clock = local_clock();
    spawn_reducer(&bus, state.clone());

    let scope = ViewScope::new();
    let seqs = Arc::new(RequestSeqs::default());

    let poller = Poller::new(backend.clone(), bus.clone(), seqs.clone(), scope.token());
    let poll = spawn_poller(poller, config.poll_interval());
    spawn_clock(bus.clone(), config.clock_interval(), scope.token());

    let dispatcher = ActionDispatcher::new(backend.clone(), bus.clone(), poll, scope.token());
    let logs = LogFetcher::new(
        backend.clone(),
        bus.clone(),
        state.clone(),
        seqs.clone(),
        scope.token(),
    );
    if let Some(period) = config.log_refresh.period() {
        spawn_log_tail(logs.clone(), state.clone(), period, scope.token());
    }

    let session = Session {
        state,
        bus: bus.clone(),
        dispatcher,
        logs,
        label,
    };

    let mut terminal = setup_terminal()?;
    let res = tui_loop(&mut terminal, &session).await;
    restore_terminal(terminal)?;

    bus.emit(DashEvent::TornDown);
    scope.cancel();
    info!("dashboard closed");
    res
}

// --- Terminal setup/teardown ---
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

async fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &Session,
) -> anyhow::Result<()> {
    let mut ui = UiState::new();

    loop {
        let now = Instant::now();
        let (table, logs_open) = {
            let mut snapshot = session.state.write().await;
            snapshot.counters.advance(now);

            let table = render_table(snapshot.store.services(), &ui.filter);
            ui.clamp_selection(&table);

            let header = HeaderInfo {
                backend: &session.label,
                now,
                now_unix: unix_now(),
            };
            terminal.draw(|f| dashboard::draw(f, &snapshot, &table, &mut ui, &header))?;
            (table, snapshot.logs.is_open())
        };

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }

        let CEvent::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match ui.handle_key(key, &table, logs_open) {
            Some(UiCommand::Quit) => break,
            Some(UiCommand::Dispatch(Intent::Control { name, action })) => {
                session.dispatcher.control_service(name, action);
            }
            Some(UiCommand::Dispatch(Intent::OpenLogs { name })) => {
                session.logs.open_logs(name);
            }
            Some(UiCommand::RefreshLogs) => {
                session.logs.refresh_current_logs().await;
            }
            Some(UiCommand::CloseLogs) => session.logs.close_logs(),
            Some(UiCommand::DismissNotice) => session.bus.emit(DashEvent::NoticeDismissed),
            None => {}
        }
    }

    Ok(())
}
