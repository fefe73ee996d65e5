//! news-reader — a terminal news list backed by a content search API.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐ LoadResult ┌──────────┐  draw()  ┌──────────┐
//! │ loader.rs │ ─────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (worker)  │ (channel)  │ (state)  │          │ (render) │
//! └───────────┘            └──────────┘          └──────────┘
//!       ▲ start/restart/cancel ▲
//!       └─────── main ◄────────┤ handle_key_event()
//!                         ┌──────────┐
//!                         │ input.rs │
//!                         └──────────┘
//! ```
//!
//! * **`source/`** — request building, the HTTP transport, and the JSON parser.
//! * **`loader`** — the background load state machine and its result cache.
//! * **`config`** — command-line flags that pick the search.
//! * **`app`** — owns the presentation state (articles, selection, status).
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations and loader commands.
//! * **`main`** — wires everything together: parse args, set up logging and
//!   the terminal, and run the event loop.

mod app;
mod config;
mod input;
mod loader;
mod source;
mod ui;

use std::fs::File;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::App;
use config::Cli;
use input::Command;
use loader::{ChannelObserver, Connectivity, NetworkWatch, ResourceLoader};
use source::HttpFetcher;

// ---------------------------------------------------------------------------
// RAII terminal guard — cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the default hook prints the panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// Send logs to `--log-file` if given.  Stdout belongs to the UI.
fn init_logging(cli: &Cli) -> Result<()> {
    let Some(path) = &cli.log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    install_panic_hook();

    let request = cli.load_request();
    info!(topic = %request.topic, order_by = %request.order_by, "starting");

    // -- loader --------------------------------------------------------------
    let fetcher = HttpFetcher::new().context("cannot build HTTP client")?;
    let watch = NetworkWatch::for_url(&request.base_url);
    let connectivity: Box<dyn Connectivity> = match watch.clone() {
        Some(watch) => Box::new(watch),
        // No host to watch: let the fetcher report the bad URL.
        None => Box::new(|| Some(true)),
    };
    let loader = ResourceLoader::new(Arc::new(fetcher), connectivity);

    let (observer, rx) = ChannelObserver::channel();
    loader.attach(Box::new(observer));

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new();

    // The first load waits until the network watch has an answer.
    let mut first_load_pending = true;
    app.checking_network();

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Issue the first load once reachability is known.
    //   2. Drain any results from the loader.
    //   3. Render the UI.
    //   4. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        if first_load_pending && watch.as_ref().map_or(true, |w| w.is_reachable().is_some()) {
            first_load_pending = false;
            app.begin_loading();
            loader.start(request.clone());
        }

        while let Ok(result) = rx.try_recv() {
            app.apply_result(result);
        }

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                match input::handle_key_event(&mut app, key) {
                    Some(Command::Refresh) => {
                        first_load_pending = false;
                        app.begin_loading();
                        loader.restart(request.clone());
                    }
                    Some(Command::Cancel) => {
                        if loader.cancel() {
                            app.load_cancelled();
                        }
                    }
                    None => {}
                }
            }
        }

        if app.quit {
            break;
        }
    }

    info!(state = ?loader.state(), cached = loader.cached().is_some(), "shutting down");
    loader.reset();
    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
