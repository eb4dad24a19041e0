mod app;
pub mod headless;
pub mod logging;
mod ui;

use crate::app::App;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use cuprum_application::config::Config;
use cuprum_application::presentation::Presentation;
use cuprum_application::training::TrainingOutcome;
use cuprum_domain::repositories::price_source::PriceTableSource;
use cuprum_infrastructure::sources::{FilesystemPriceTableSource, HttpPriceTableSource};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::path::Path;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct DashboardOpts {
    pub presentation: Presentation,
    pub outcome: Option<TrainingOutcome>,
    pub log_store: logging::SharedLogStore,
}

/// A saved page when `source_file` is given, otherwise the configured URL.
pub fn build_source(
    config: &Config,
    source_file: Option<&Path>,
) -> Result<Box<dyn PriceTableSource>, String> {
    match source_file {
        Some(path) => Ok(Box::new(FilesystemPriceTableSource::new(path))),
        None => Ok(Box::new(HttpPriceTableSource::new(
            config.source.url.clone(),
            &config.source.user_agent,
            config.source.timeout_ms,
        )?)),
    }
}

/// Blocks until the user quits. The terminal is restored on every exit path.
pub fn run(opts: DashboardOpts) -> Result<(), String> {
    metrics::counter!("cuprum.app.runs_total", "mode" => "dashboard").increment(1);
    enable_raw_mode().map_err(|err| format!("failed to enable raw mode: {err}"))?;

    let mut stdout = io::stdout();
    if let Err(err) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(format!("failed to enter alternate screen: {err}"));
    }

    let backend = CrosstermBackend::new(stdout);
    let result = Terminal::new(backend)
        .map_err(|err| format!("failed to init terminal: {err}"))
        .and_then(|mut terminal| {
            terminal
                .hide_cursor()
                .map_err(|err| format!("failed to hide cursor: {err}"))?;
            let outcome = run_loop(&mut terminal, opts);
            let _ = terminal.show_cursor();
            outcome
        });

    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);
    let _ = disable_raw_mode();

    result
}

fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    opts: DashboardOpts,
) -> Result<(), String> {
    let mut app = App::new(opts.presentation, opts.outcome, opts.log_store);

    loop {
        if app.dirty {
            terminal
                .draw(|frame| ui::draw(frame, &app))
                .map_err(|err| format!("terminal draw failed: {err}"))?;
            app.dirty = false;
        }

        let ready =
            event::poll(POLL_INTERVAL).map_err(|err| format!("terminal poll failed: {err}"))?;
        if ready {
            match event::read().map_err(|err| format!("terminal read failed: {err}"))? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.on_key(key) {
                        return Ok(());
                    }
                }
                Event::Resize(_, _) => app.dirty = true,
                _ => {}
            }
        }
        app.on_tick();
    }
}
