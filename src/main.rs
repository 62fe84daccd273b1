use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime;
use tracing::{info, warn, Level};

use spark_console::data::duration::parse_duration;
use spark_console::{events, file_sources, http_sources, ui, App, DashboardConfig, Schedule, Theme};

#[derive(Parser, Debug)]
#[command(name = "spark-console")]
#[command(about = "Terminal console for trading balance, positions and AI metrics")]
struct Args {
    /// Config file (TOML, YAML or JSON); SPARK_CONSOLE_* variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL serving /api/balance and /api/positions
    #[arg(long)]
    api: Option<String>,

    /// Base URL of the gateway serving /proxy/ai/metrics and /proxy/executor/*
    #[arg(long)]
    gateway: Option<String>,

    /// Balance polling interval (e.g., "5s", "500ms")
    #[arg(long, value_parser = parse_duration)]
    balance_every: Option<Duration>,

    /// Positions polling interval
    #[arg(long, value_parser = parse_duration)]
    positions_every: Option<Duration>,

    /// Metrics polling interval
    #[arg(long, value_parser = parse_duration)]
    metrics_every: Option<Duration>,

    /// Alerts health check interval
    #[arg(long, value_parser = parse_duration, conflicts_with = "no_alerts")]
    alerts_every: Option<Duration>,

    /// Do not check the alerts service
    #[arg(long)]
    no_alerts: bool,

    /// Executor settings (trading mode) polling interval
    #[arg(long, value_parser = parse_duration, conflicts_with = "no_executor")]
    executor_every: Option<Duration>,

    /// Executor risk limits polling interval
    #[arg(long, value_parser = parse_duration, conflicts_with = "no_executor")]
    risk_every: Option<Duration>,

    /// Do not poll the executor settings and risk endpoints
    #[arg(long)]
    no_executor: bool,

    /// Per-request timeout
    #[arg(long, value_parser = parse_duration)]
    timeout: Option<Duration>,

    /// Serve every surface from <dir>/<surface>.json instead of HTTP
    #[arg(short, long)]
    file_dir: Option<PathBuf>,

    /// Run one cycle per source, print the surface as JSON and exit
    #[arg(long)]
    once: bool,

    /// Log file used while the TUI owns the terminal
    #[arg(long, default_value = "spark-console.log")]
    log_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Apply command-line overrides on top of the loaded config.
    fn apply(&self, config: &mut DashboardConfig) {
        if let Some(api) = &self.api {
            config.api_base = api.clone();
        }
        if let Some(gateway) = &self.gateway {
            config.gateway_base = gateway.clone();
        }
        if let Some(every) = self.balance_every {
            config.balance_interval = every;
        }
        if let Some(every) = self.positions_every {
            config.positions_interval = every;
        }
        if let Some(every) = self.metrics_every {
            config.metrics_interval = every;
        }
        if let Some(every) = self.alerts_every {
            config.alerts_interval = every;
        }
        if self.no_alerts {
            config.alerts_enabled = false;
        }
        if let Some(every) = self.executor_every {
            config.executor_interval = every;
        }
        if let Some(every) = self.risk_every {
            config.risk_interval = every;
        }
        if self.no_executor {
            config.executor_enabled = false;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout = timeout;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = DashboardConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    init_logging(&args)?;
    info!("starting spark-console: {:?}", config);

    let schedule = match &args.file_dir {
        Some(dir) => file_sources(&config, dir),
        None => http_sources(&config)?,
    };

    let rt = Runtime::new()?;

    if args.once {
        return run_once(&rt, schedule);
    }

    run_tui(&rt, schedule)
}

/// Log to stderr in one-shot mode, to a file while the TUI owns the terminal.
fn init_logging(args: &Args) -> Result<()> {
    let level: Level = args
        .log_level
        .parse()
        .with_context(|| format!("invalid log level {:?}", args.log_level))?;
    let builder = tracing_subscriber::fmt().with_max_level(level).with_target(false);

    if args.once {
        builder.with_writer(io::stderr).init();
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&args.log_file)
            .with_context(|| format!("failed to open log file {}", args.log_file.display()))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    }
    Ok(())
}

/// Run one cycle per source and print the resulting surface
fn run_once(rt: &Runtime, schedule: Schedule) -> Result<()> {
    let mut app = App::new(schedule, rt.handle().clone());
    let applied = rt.block_on(app.refresh_once());

    println!("{}", serde_json::to_string_pretty(&app.surface)?);

    let failing = app.health.failing();
    if failing > 0 {
        warn!("{} of {} sources failed", failing, applied);
    }
    Ok(())
}

/// Run the TUI with the given sources
fn run_tui(rt: &Runtime, schedule: Schedule) -> Result<()> {
    let mut app = App::new(schedule, rt.handle().clone());
    app.theme = Theme::auto_detect();
    for line in app.source_descriptions() {
        info!("source {}", line);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    app.start();

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    app.pause();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.drain_reports();

        terminal.draw(|frame| ui::draw(frame, app))?;

        // Poll for events with a short timeout
        if let Some(Event::Key(key)) = events::poll_event(Duration::from_millis(100))? {
            events::handle_key_event(app, key);
        }
    }

    Ok(())
}
