mod app;
mod cache;
mod config;
mod event;
mod logging;
mod notes;
mod query;
mod ui;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;

use notes::cached_client::CachedNoteClient;
use notes::types::{NoteId, Project};

#[derive(Parser, Debug)]
#[command(name = "noted")]
#[command(about = "A terminal client for notes kept in a GraphQL store")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/noted/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Project whose note to open (overrides the config file)
  #[arg(short, long)]
  project: Option<String>,

  /// Id of the note to open; a fresh id when omitted
  #[arg(short, long)]
  note: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  let _log_guard = logging::init()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  let project = args
    .project
    .or_else(|| config.project.clone())
    .map(Project::new)
    .ok_or_else(|| eyre!("No project given. Pass --project or set `project` in the config file"))?;

  let note_id = args.note.map(NoteId::new).unwrap_or_else(NoteId::generate);

  let client = CachedNoteClient::new(&config)?;

  let mut app = app::App::new(client, project, note_id);
  app.run().await?;

  Ok(())
}
