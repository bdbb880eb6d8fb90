mod app;
mod catalog;
mod config;
mod constants;
mod enrich;
mod input;
mod logging;
mod metadata;
mod query;
mod tags;
#[cfg(test)]
mod test_support;
mod theme;
mod ui;
mod video;

use anyhow::Result;
use clap::Parser;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use app::App;
use catalog::Catalog;
use config::Config;
use enrich::Enricher;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Catalog file to use instead of the one in the platform data directory
  #[arg(short, long)]
  catalog: Option<PathBuf>,
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let _log_guard = logging::init_logging()?;

  let config = Config::load();
  let catalog_path = args.catalog.unwrap_or_else(config::default_catalog_path);
  let catalog = Catalog::load(&catalog_path)?;
  let enricher = Enricher::new(&config.endpoints(), config::gemini_api_key())?;
  info!(catalog = %catalog_path.display(), videos = catalog.len(), ai = enricher.has_ai(), "startup");
  let app = App::new(catalog, enricher, config, Config::path());

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, app);
  ratatui::restore();
  result
}

fn run(terminal: &mut DefaultTerminal, mut app: App) -> Result<()> {
  loop {
    app.check_pending();
    app.expire_error();

    terminal.draw(|frame| ui::ui(frame, &mut app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key);
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  info!(videos = app.catalog.len(), "shutdown");
  Ok(())
}
