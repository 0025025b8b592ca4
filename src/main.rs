use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use instrument_client::{ReqwestExchange, StoreTransport};
use instrument_dash::app::now_ms;
use instrument_dash::config::{DashConfig, Overrides};
use instrument_dash::controller::{window_from_text, window_millis};
use instrument_dash::logging::{self, LogTarget};
use instrument_dash::{events, ui, App, RemoteSource};
use instrument_types::{
    AddRequest, GetRequest, ListRequest, SampleType, StreamMutation, Value, ValueStream,
};

#[derive(Parser, Debug)]
#[command(name = "instrument-dash")]
#[command(about = "Browse and chart metrics from an instrument store")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Store base URL (e.g. http://localhost:8020)
    #[arg(long, global = true)]
    store: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Append logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print variables matching a prefix, sorted
    List {
        /// Prefix pattern, e.g. "/network/*{hostname=*}"
        prefix: String,

        #[arg(long)]
        max_variables: Option<u32>,

        /// Skip variables with nothing newer than this (e.g. "1d")
        #[arg(long)]
        max_age: Option<String>,
    },

    /// Print recent values of matching variables
    Get {
        /// Variable pattern, e.g. "cpu.load{host=*}"
        variable: String,

        /// How far back to fetch
        #[arg(short, long, default_value = "12h")]
        duration: String,

        #[arg(long)]
        max_variables: Option<u32>,

        /// Keep only the newest N values of each variable
        #[arg(long)]
        max_values: Option<u32>,

        /// Value transform (none, average, max, min, rate, rate_signed, delta, latest)
        #[arg(short, long)]
        transform: Option<SampleType>,
    },

    /// Submit one sample
    Add {
        variable: String,

        value: f64,

        /// Milliseconds since the Unix epoch (default: now)
        #[arg(long)]
        timestamp: Option<u64>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = Overrides {
        store_url: args.store.clone(),
        timeout_secs: args.timeout,
        log_file: args.log_file.clone(),
    };
    let config = DashConfig::load(args.config.as_deref(), &overrides)?;

    match args.command {
        None => run_dashboard(&config),
        Some(command) => {
            logging::init(&config.log, LogTarget::Stderr)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_command(&config, command))
        }
    }
}

fn exchange(config: &DashConfig) -> Result<ReqwestExchange> {
    ReqwestExchange::builder()
        .base_url(config.store.url.clone())
        .timeout(config.timeout())
        .build()
        .with_context(|| format!("cannot create client for {}", config.store.url))
}

/// Run one of the one-shot commands
async fn run_command(config: &DashConfig, command: Command) -> Result<()> {
    let transport = StoreTransport::new(exchange(config)?);

    match command {
        Command::List {
            prefix,
            max_variables,
            max_age,
        } => {
            let mut request = ListRequest::new(prefix);
            request.max_variables = max_variables;
            if let Some(age) = max_age {
                let secs = window_from_text(&age).map_err(anyhow::Error::msg)?;
                request.max_age = Some(window_millis(secs));
            }

            let response = transport.list(request).await?;
            let mut variables: Vec<String> =
                response.stream.into_iter().map(|s| s.variable).collect();
            variables.sort();
            for variable in variables {
                println!("{}", variable);
            }
        }

        Command::Get {
            variable,
            duration,
            max_variables,
            max_values,
            transform,
        } => {
            let secs = window_from_text(&duration).map_err(anyhow::Error::msg)?;
            let mut request = GetRequest::new(variable);
            request.min_timestamp = Some(now_ms().saturating_sub(window_millis(secs)));
            request.max_variables = max_variables;
            request.max_values = max_values;
            request.mutation = transform.into_iter().map(StreamMutation::new).collect();

            let response = transport.get(request).await?;
            for stream in &response.stream {
                for value in &stream.value {
                    let time = chrono::DateTime::from_timestamp_millis(value.timestamp as i64)
                        .map(|t| {
                            t.with_timezone(&chrono::Local)
                                .format("%Y-%m-%d %H:%M:%S")
                                .to_string()
                        })
                        .unwrap_or_default();
                    if let Some(v) = value.double_value {
                        println!("{}\t{}\t{:.6}", stream.variable, time, v);
                    } else if let Some(s) = &value.string_value {
                        println!("{}\t{}\t{}", stream.variable, time, s);
                    }
                }
            }
        }

        Command::Add {
            variable,
            value,
            timestamp,
        } => {
            let timestamp = timestamp.unwrap_or_else(now_ms);
            let request = AddRequest {
                stream: vec![ValueStream {
                    variable,
                    value: vec![Value::double(timestamp, value)],
                }],
            };
            transport.add(request).await?;
            info!("added 1 value at {}", timestamp);
        }
    }

    Ok(())
}

/// Run the full-screen dashboard against the configured store
fn run_dashboard(config: &DashConfig) -> Result<()> {
    logging::init(&config.log, LogTarget::Dashboard)?;
    let settings = config.view_settings()?;

    // Store calls run on this runtime while the TUI owns the main thread
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let source = RemoteSource::new(exchange(config)?);
    info!("dashboard against {}", config.store.url);
    run_tui(App::new(Box::new(source), settings))
}

/// Run the TUI with the given app
fn run_tui(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Countdown and "updated ago" need a redraw even when nothing happens
    const IDLE_REDRAW: Duration = Duration::from_secs(1);

    app.start();
    let mut last_draw: Option<Instant> = None;

    while app.running {
        app.tick();

        let stale = last_draw.is_none_or(|at| at.elapsed() >= IDLE_REDRAW);
        if app.take_redraw() || stale {
            terminal.draw(|frame| ui::render(frame, app))?;
            last_draw = Some(Instant::now());
        }

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    events::handle_key_event(app, key)
                }
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => app.request_redraw(),
                _ => {}
            }
        }
    }

    Ok(())
}
