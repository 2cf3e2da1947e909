use anyhow::{anyhow, Context, Result};
use raster_canvas::canvas::replay::{self, ReplayScript};
use raster_canvas::canvas::settings_store;
use raster_canvas::canvas::{CanvasSession, DirectoryStore, DrawingStore};
use std::path::{Path, PathBuf};

const USAGE: &str = "usage: raster_canvas <script.json> [--settings <path>] [--save-as <name>]";

struct Args {
    script: PathBuf,
    settings: Option<PathBuf>,
    save_as: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut script = None;
    let mut settings = None;
    let mut save_as = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--settings" => {
                settings = Some(PathBuf::from(
                    args.next().ok_or_else(|| anyhow!("--settings needs a path\n{USAGE}"))?,
                ));
            }
            "--save-as" => {
                save_as = Some(
                    args.next()
                        .ok_or_else(|| anyhow!("--save-as needs a name\n{USAGE}"))?,
                );
            }
            _ if script.is_none() => script = Some(PathBuf::from(arg)),
            other => return Err(anyhow!("unexpected argument '{other}'\n{USAGE}")),
        }
    }
    Ok(Args {
        script: script.ok_or_else(|| anyhow!("{USAGE}"))?,
        settings,
        save_as,
    })
}

fn main() -> Result<()> {
    let args = parse_args()?;

    let settings_path = match args.settings {
        Some(path) => path,
        None => settings_store::resolve_settings_path()?,
    };
    let settings = settings_store::load_from_path(&settings_path)?;
    raster_canvas::logging::init(
        settings.debug_logging,
        settings.log_file.as_ref().map(PathBuf::from),
    );
    tracing::debug!(path = %settings_path.display(), "loaded canvas settings");

    let script = ReplayScript::load(&args.script)?;
    let mut session = CanvasSession::new(&settings).context("create canvas session")?;
    let mut store = DirectoryStore::open(&settings.store_dir)?;

    let base_dir = args.script.parent().unwrap_or(Path::new("."));
    let summary = replay::run(&mut session, &mut store, &script, base_dir)?;

    if let Some(name) = args.save_as {
        session.save(&mut store, &name)?;
    }

    if session.is_modified() {
        tracing::warn!("canvas has unsaved changes");
    }
    println!(
        "{} commands, {} draws; saved drawings: {}",
        summary.commands,
        summary.draws,
        store.list_names().join(", ")
    );
    Ok(())
}
