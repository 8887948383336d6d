use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use clap::{Parser, Subcommand};
use floormap_editor::assets::strip_data_url;
use floormap_editor::config::{Configuration, MapConfig, validate};
use floormap_editor::engine::EditorError;
use floormap_editor::files::{self, FileError};
use floormap_editor::session::{EditorSession, Role, SessionError};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    File(#[from] FileError),
    #[error("configuration is invalid:\n{0}")]
    InvalidConfig(String),
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("{0}")]
    Editor(#[from] EditorError),
    #[error("rendered image is not valid base64: {0}")]
    Image(#[from] base64::DecodeError),
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "floormap", about = "Headless floor-map editor tools")]
struct Cli {
    /// Editor configuration JSON.
    #[arg(long, env = "FLOORMAP_CONFIG", default_value = "map-editor-config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the configuration and list every problem found.
    Validate,
    /// Draw a floor and write it as PNG.
    Render {
        /// Floor id; defaults to the configured current floor.
        #[arg(long)]
        floor: Option<i64>,
        #[arg(long)]
        out: PathBuf,
        /// Leave the grid out of the image.
        #[arg(long)]
        no_grid: bool,
    },
    /// Write one floor as a standalone map document.
    ExportMap {
        #[arg(long)]
        floor: Option<i64>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Replace a floor from a map document and write the updated configuration.
    ImportMap {
        map: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config: Configuration = files::load_json_file(&cli.config).await?;
    match cli.command {
        Command::Validate => run_validate(&config),
        Command::Render { floor, out, no_grid } => run_render(config, floor, out, no_grid).await,
        Command::ExportMap { floor, out } => run_export_map(config, floor, out).await,
        Command::ImportMap { map, out } => run_import_map(config, map, out).await,
    }
}

fn run_validate(config: &Configuration) -> Result<(), CliError> {
    let errors = validate(config);
    if errors.is_empty() {
        println!("ok");
        return Ok(());
    }
    let message = errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n");
    Err(CliError::InvalidConfig(message))
}

/// Session with editing rights over `config`, showing `floor` if given.
async fn open_session(config: Configuration, floor: Option<i64>) -> Result<EditorSession, CliError> {
    let mut session = EditorSession::default();
    session.apply_roles(vec![Role::Admin]).await;
    let msg = session.set_configuration(config).await;
    if !msg.is_empty() {
        return Err(CliError::InvalidConfig(msg));
    }
    if let Some(id) = floor {
        session.switch_floor(id).await?;
    }
    Ok(session)
}

async fn run_render(config: Configuration, floor: Option<i64>, out: PathBuf, no_grid: bool) -> Result<(), CliError> {
    let mut session = open_session(config, floor).await?;
    if no_grid {
        session.engine_mut().toggle_grid(Some(false));
    }
    let map = session.engine().snapshot_map()?;
    let png = STANDARD.decode(strip_data_url(&map.rendered_image))?;
    tokio::fs::write(&out, &png).await?;
    tracing::info!(floor = map.id, path = %out.display(), bytes = png.len(), "floor rendered");
    Ok(())
}

async fn run_export_map(config: Configuration, floor: Option<i64>, out: PathBuf) -> Result<(), CliError> {
    let session = open_session(config, floor).await?;
    let map = session.export_current_floor()?;
    files::save_json_file(&out, &map).await?;
    tracing::info!(floor = map.id, items = map.items.len(), path = %out.display(), "floor exported");
    Ok(())
}

async fn run_import_map(config: Configuration, map: PathBuf, out: PathBuf) -> Result<(), CliError> {
    let map: MapConfig = files::load_json_file(&map).await?;
    let mut session = open_session(config, None).await?;
    session.import_map(map).await?;
    let updated = session.export_configuration()?;
    files::save_json_file(&out, &updated).await?;
    tracing::info!(path = %out.display(), "configuration written");
    Ok(())
}
