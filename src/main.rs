use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use edit_count_monitor::events;
use edit_count_monitor::ui::{self, Theme};
use edit_count_monitor::{
    App, ChannelEvents, FetchWorker, FileProfileProvider, HttpProfileProvider, PollingSaveSource,
    ProfileFormat, ProfileProvider, SaveEventSource, SessionLog, Settings, StatusFileProbe,
    StreamEvents,
};

/// How long the main loop waits for input before ticking again.
const TICK: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "edit-count-monitor")]
#[command(about = "Warns when saved edits stop showing up on your editor profile")]
struct Args {
    /// Editor whose profile is watched
    #[arg(short, long)]
    user: Option<String>,

    /// Settings file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Connect to a TCP endpoint for host save events (host:port)
    #[arg(short, long, conflicts_with = "status_file")]
    connect: Option<String>,

    /// Poll a JSON status file written by the host
    #[arg(short, long, conflicts_with = "connect")]
    status_file: Option<PathBuf>,

    /// Status file poll interval in milliseconds
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Read the profile from a local file instead of the network
    #[arg(long)]
    profile_file: Option<PathBuf>,

    /// Profile URL template; `{user}` is replaced with the editor name
    #[arg(long)]
    profile_url: Option<String>,

    /// Profile body format: "markup" or "json"
    #[arg(long, value_parser = parse_format)]
    format: Option<ProfileFormat>,

    /// Saves without an increase before CAUTION
    #[arg(long)]
    caution: Option<u32>,

    /// Saves without an increase before ALERT
    #[arg(long)]
    alert: Option<u32>,

    /// Append session summaries to this JSON file
    #[arg(long)]
    session_log: Option<PathBuf>,

    /// Write TUI logs to this file; defaults to edit-count-monitor.log in
    /// the system temp directory (the TUI owns the terminal)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Check the profile once, print a JSON report and exit
    #[arg(long, conflicts_with_all = ["connect", "status_file"])]
    once: bool,

    /// With --once, write the report to this file instead of stdout
    #[arg(short, long, requires = "once")]
    export: Option<PathBuf>,
}

impl Args {
    /// Apply command line overrides on top of the loaded settings.
    fn apply(&self, settings: &mut Settings) {
        if let Some(ref user) = self.user {
            settings.user = Some(user.clone());
        }
        if let Some(ms) = self.poll_interval {
            settings.poll_interval_ms = ms;
        }
        if let Some(ref path) = self.profile_file {
            settings.profile.file = Some(path.clone());
        }
        if let Some(ref url) = self.profile_url {
            settings.profile.url = url.clone();
        }
        if let Some(format) = self.format {
            settings.profile.format = format;
        }
        if let Some(caution) = self.caution {
            settings.thresholds.caution = caution;
        }
        if let Some(alert) = self.alert {
            settings.thresholds.alert = alert;
        }
        if let Some(ref path) = self.session_log {
            settings.session_log = Some(path.clone());
        }
    }
}

fn parse_format(s: &str) -> Result<ProfileFormat, String> {
    match s.to_ascii_lowercase().as_str() {
        "markup" | "html" => Ok(ProfileFormat::Markup),
        "json" => Ok(ProfileFormat::Json),
        other => Err(format!("unknown profile format '{}'", other)),
    }
}

/// Where log output goes.
#[derive(Debug, PartialEq, Eq)]
enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// `--once` logs to stderr; the TUI always logs to a file.
    fn for_args(args: &Args) -> Self {
        if args.once {
            LogTarget::Stderr
        } else {
            LogTarget::File(
                args.log_file
                    .clone()
                    .unwrap_or_else(|| std::env::temp_dir().join("edit-count-monitor.log")),
            )
        }
    }
}

/// Install the tracing subscriber.
fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match LogTarget::for_args(args) {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);
    settings.validate()?;

    let user = settings
        .user
        .clone()
        .context("No editor given; pass --user or set WECM_USER")?;
    let provider = build_provider(&settings)?;

    let rt = tokio::runtime::Runtime::new()?;

    if args.once {
        return rt.block_on(run_once(&user, provider, &settings, args.export.as_deref()));
    }

    let events = rt.block_on(connect_events(&args, &settings))?;

    // Spawned tasks need a runtime context; the runtime drives them on its
    // worker threads while the TUI owns the main thread.
    let _guard = rt.enter();
    let worker = FetchWorker::spawn(provider, &user);
    let mut app = App::new(&user, events, worker, &settings).with_theme(Theme::auto_detect());
    if let Some(ref path) = settings.session_log {
        app = app.with_session_log(SessionLog::load(path)?);
    }

    run_tui(app)
}

/// Choose the profile provider once for the whole session.
fn build_provider(settings: &Settings) -> Result<Arc<dyn ProfileProvider>> {
    let mapping = settings.profile.mapping();

    if let Some(ref path) = settings.profile.file {
        return Ok(Arc::new(FileProfileProvider::new(path, mapping)));
    }

    let provider = HttpProfileProvider::builder()
        .url_template(settings.profile.url.clone())
        .timeout(settings.profile.timeout())
        .mapping(mapping)
        .build()?;
    Ok(Arc::new(provider))
}

/// Open the host event source selected on the command line.
async fn connect_events(args: &Args, settings: &Settings) -> Result<Box<dyn SaveEventSource>> {
    if let Some(ref addr) = args.connect {
        use tokio::net::TcpStream;

        info!("Connecting to {}", addr);
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("Failed to connect to {}", addr))?;
        info!("Connected to {}", addr);
        return Ok(Box::new(StreamEvents::spawn(stream, addr)));
    }

    if let Some(ref path) = args.status_file {
        return Ok(Box::new(PollingSaveSource::new(
            StatusFileProbe::new(path),
            settings.poll_interval(),
        )));
    }

    anyhow::bail!("No host event source; pass --connect or --status-file (or use --once)")
}

/// Fetch the profile once and print the report.
async fn run_once(
    user: &str,
    provider: Arc<dyn ProfileProvider>,
    settings: &Settings,
    export: Option<&std::path::Path>,
) -> Result<()> {
    let worker = FetchWorker::spawn(provider, user);
    let (_tx, events) = ChannelEvents::create("none");
    let mut app = App::new(user, Box::new(events), worker, settings);

    app.start();
    app.wait_for_fetch().await;

    match export {
        Some(path) if app.last_observation.is_some() => {
            app.export_state(path)?;
            println!("Exported edit counts to: {}", path.display());
        }
        _ => println!("{}", serde_json::to_string_pretty(&app.report())?),
    }

    if let Some(err) = app.load_error {
        anyhow::bail!("Edit counts unavailable: {}", err);
    }
    Ok(())
}

/// Run the TUI until the user quits.
fn run_tui(mut app: App) -> Result<()> {
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
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.tick();

        // A failed frame must not stop monitoring.
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, app)) {
            warn!("Failed to draw frame: {}", e);
        }

        if let Some(Event::Key(key)) = events::poll_event(TICK)? {
            if key.kind == KeyEventKind::Press {
                events::handle_key_event(app, key);
            }
        }
    }

    info!(
        "Session ended after {} saves ({} failed)",
        app.saves_completed, app.saves_failed
    );
    Ok(())
}
