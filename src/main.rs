use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::LevelFilter;
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, WriteLogger};

use lectern::event_source::KeyboardEventSource;
use lectern::{App, run_app_with_event_source, settings, theme};

#[derive(Parser)]
#[command(
    name = "lectern",
    version,
    about = "A terminal lesson reader: PDF pages and audio recordings side by side"
)]
struct Args {
    /// Directory containing the lessons (manifest or PDF files)
    #[arg(default_value = ".")]
    lessons_dir: PathBuf,

    /// Log level written to lectern.log (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.log_level != LevelFilter::Off {
        let _ = WriteLogger::init(
            args.log_level,
            Config::default(),
            File::create("lectern.log")?,
        );
    }

    settings::load_settings();
    theme::set_dark_mode(settings::is_dark_mode());

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(args.lessons_dir);
    app.enable_settings_watcher();
    let mut events = KeyboardEventSource;
    let result = run_app_with_event_source(&mut terminal, &mut app, &mut events);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
