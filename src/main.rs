use std::fs;
use std::io;

use chrono::Utc;
use clap::Parser;
use ratatui::layout::Rect;

use eventurer::app::App;
use eventurer::config::{AppConfig, Cli};
use eventurer::drivers::OutputDriver;
use eventurer::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use eventurer::event_loop::{ControlFlow, EventLoop};
use eventurer::forum::{DirectoryQuota, ForumStore};
use eventurer::log_buffer::{DEFAULT_MAX_LINES, LogHandle, set_global_log};
use eventurer::tracing_sub;

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::try_from(&cli)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;

    fs::create_dir_all(&config.data_dir)?;
    let log = LogHandle::new(DEFAULT_MAX_LINES);
    log.mirror_to_file(&config.log_path())?;
    set_global_log(log.clone());
    tracing_sub::init(config.log_level, Some(log));

    let mut store =
        ForumStore::with_quota(&config.data_dir, DirectoryQuota::new(config.max_storage_bytes));
    if !store.init() {
        return Err(io::Error::other(format!(
            "could not open forum data in {}",
            config.data_dir.display()
        )));
    }

    let (width, height) = crossterm::terminal::size()?;
    let tick = config.tick;
    let mut app = App::new(config, store, Rect::new(0, 0, width, height));

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    tracing::info!("eventurer started");

    let mut pump = EventLoop::new(ConsoleInputDriver::new(), tick);
    let result = pump.run(|event| {
        match event {
            Some(event) => {
                app.handle_event(&event);
            }
            None => app.tick(Utc::now()),
        }
        if app.should_quit() {
            return Ok(ControlFlow::Quit);
        }
        output.draw(|mut frame| app.render(&mut frame))?;
        Ok(ControlFlow::Continue)
    });

    output.exit()?;
    app.shutdown();
    tracing::info!("eventurer stopped");
    result
}
