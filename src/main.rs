// ABOUTME: Main entry point for the Toolbench TUI application

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, Terminal};
use std::{
    io,
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::{error, info};

use toolbench::app::{App, EventHandler};
use toolbench::components::LayoutComponent;
use toolbench::config::{default_config_path, AppConfig, ConfigOverrides};
use toolbench::models::Catalog;

#[derive(Debug, Parser)]
#[command(name = "toolbench", version, about = "Install and run catalogued tools from the terminal")]
struct Cli {
    /// Base URL of the toolbench server
    #[arg(long, env = "TOOLBENCH_SERVER")]
    server: Option<String>,

    /// Tool catalog (TOML); the built-in catalog is used otherwise
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Config file [default: ~/.toolbench/config.toml]
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = AppConfig::load(&config_path)?.with_overrides(ConfigOverrides {
        server_url: cli.server,
        catalog_path: cli.catalog,
    });

    setup_logging(&config)?;
    setup_panic_handler();
    info!("Starting toolbench against {}", config.server_url);

    let catalog = load_catalog(&config)?;
    let mut app = App::new(&config, catalog)?;
    let mut layout = LayoutComponent::new();

    let result = run_tui(&mut app, &mut layout, config.tick_rate());
    app.shutdown();
    if let Err(e) = &result {
        error!("TUI exited with error: {:#}", e);
    }
    result
}

fn load_catalog(config: &AppConfig) -> Result<Catalog> {
    match &config.catalog_path {
        Some(path) => Catalog::load(path).with_context(|| format!("loading catalog {}", path.display())),
        None => Ok(Catalog::builtin()?),
    }
}

fn run_tui(app: &mut App, layout: &mut LayoutComponent, tick_rate: Duration) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, app, layout, tick_rate);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    layout: &mut LayoutComponent,
    tick_rate: Duration,
) -> Result<()> {
    let mut needs_redraw = true;

    loop {
        if needs_redraw {
            terminal.draw(|frame| {
                app.state.screen = frame.size();
                layout.render(frame, &app.state);
            })?;
            needs_redraw = false;
        }

        if event::poll(tick_rate)? {
            needs_redraw = true;
            match event::read()? {
                Event::Key(key_event) => {
                    if let Some(app_event) = EventHandler::handle_key_event(key_event, &mut app.state) {
                        EventHandler::process_event(app_event, &mut app.state);
                    }
                }
                Event::Mouse(mouse_event) => {
                    if let Some(app_event) = EventHandler::handle_mouse_event(mouse_event, &app.state) {
                        EventHandler::process_event(app_event, &mut app.state);
                    }
                }
                Event::Paste(text) => {
                    for app_event in EventHandler::handle_paste(text, &app.state) {
                        EventHandler::process_event(app_event, &mut app.state);
                    }
                }
                Event::Resize(width, height) => {
                    app.state.handle_screen_resize(Rect::new(0, 0, width, height));
                }
                Event::FocusGained | Event::FocusLost => needs_redraw = false,
            }
        }

        if app.tick(Instant::now()) {
            needs_redraw = true;
        }

        if app.state.should_quit {
            info!("Quit requested");
            return Ok(());
        }
    }
}

fn setup_logging(config: &AppConfig) -> Result<()> {
    use std::fs::OpenOptions;
    use tracing_subscriber::prelude::*;

    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let log_file = log_dir.join(format!(
        "toolbench-{}.log",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .with_context(|| format!("opening log file {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(file)
                .with_ansi(false), // No ANSI colors in log file
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "toolbench=info".into()),
        )
        .init();

    Ok(())
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        // Ensure terminal is restored before logging the panic
        let _ = disable_raw_mode();
        let _ = execute!(
            std::io::stderr(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        );

        error!("Application panicked: {}", panic_info);
        eprintln!("Application panicked: {}", panic_info);
        eprintln!("Please check the logs for more details.");
    }));
}
