mod app;
mod infra;
mod state;
mod ui;

use std::io;
use std::process::ExitCode;
use std::sync::mpsc;

use crossterm::{
    ExecutableCommand,
    event::{DisableBracketedPaste, EnableBracketedPaste},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing::{error, info};

use app::App;
use app::worker::WorkerMessage;
use infra::env::AppConfig;
use infra::logging::init_logger;
use state::State;
use tc_base::{HttpTransport, Orchestrator};

fn main() -> ExitCode {
    // Configuration problems are reported before the terminal is taken over
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("thinkchat: {}", e);
            return ExitCode::from(2);
        }
    };

    let _log_guard = match init_logger(&config.log_dir, &config.log_filter) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("thinkchat: logging disabled ({}: {})", config.log_dir.display(), e);
            None
        }
    };

    let model = config.endpoint.model.clone();
    info!(model = %model, url = %config.endpoint.url, "starting");

    let transport = match HttpTransport::new(config.endpoint) {
        Ok(transport) => transport,
        Err(e) => {
            error!(error = %e, "could not build the HTTP client");
            eprintln!("thinkchat: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let orchestrator = Orchestrator::new(transport, model.clone());

    match run_tui(State::new(model), orchestrator) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "terminal error");
            eprintln!("thinkchat: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_tui(state: State, orchestrator: Orchestrator) -> io::Result<()> {
    // Panic hook: leave raw mode and the alternate screen before the message prints
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(DisableBracketedPaste);
        let _ = io::stdout().execute(LeaveAlternateScreen);
        error!(panic = %info, "panicked");
        default_hook(info);
    }));

    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    io::stdout().execute(EnableBracketedPaste)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let (tx, rx) = mpsc::channel::<WorkerMessage>();
    let mut app = App::new(state, orchestrator);
    let result = app.run(&mut terminal, tx, rx);

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    io::stdout().execute(DisableBracketedPaste)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    info!(turns = app.state.session.assistant_turns(), "exiting");
    result
}
