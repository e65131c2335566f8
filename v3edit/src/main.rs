use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::Path;
use v3edit::{load_session, EditorSettings};
use v3edit_core::snapshot::{read_snapshot, PROJECT_FILE};
use v3edit_core::{EditOutcome, EditorSession, FeatureType, RegionInfo};

mod args;

use args::{Cli, Commands};

fn main() -> Result<()> {
    let args = Cli::parse();

    let level = std::str::FromStr::from_str(&args.log_level).unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    let mut settings = EditorSettings::load_or_default(&args.settings);
    if let Some(resources) = args.resources {
        settings.resource_dir = resources;
    }

    let mut session = load_session(&settings)?;

    match args.command {
        Commands::Render { out, layer } => {
            let layers = match layer {
                Some(key) => vec![lookup(&session, &key)?],
                None => session.loaded_map_types().collect(),
            };
            render(&session, &layers, &out)?;
        }
        Commands::Inspect { x, y, name } => match (name, x, y) {
            (Some(prefix), _, _) => inspect_by_name(&session, &prefix),
            (None, Some(x), Some(y)) => inspect_at(&session, x, y),
            _ => bail!("inspect needs --x and --y, or --name"),
        },
        Commands::Paint {
            layer,
            label,
            points,
            export,
        } => {
            let map_type = lookup(&session, &layer)?;
            if !session.set_map_type(map_type) {
                bail!("layer '{}' is not enabled", layer);
            }
            session.select(map_type, &label)?;
            for (x, y) in points {
                match session.apply_at(x, y) {
                    EditOutcome::Applied(region) => {
                        println!("{} {} -> {}", region, layer, label)
                    }
                    EditOutcome::NoOp(reason) => println!("({}, {}) skipped: {:?}", x, y, reason),
                }
            }
            if export {
                export_session(&session, &settings.export_dir)?;
            }
        }
        Commands::Replay {
            project,
            out,
            export,
        } => {
            let mut snapshot = read_snapshot(&project)?;
            snapshot.retain_map_types(&settings.enabled_maps);
            let records = snapshot.to_records(session.catalog());
            let report = session.replay(&records);
            println!(
                "Replayed {} of {} changes ({} skipped, {} regions repainted)",
                report.applied, report.records, report.skipped, report.repainted
            );
            if let Some(active) = session.catalog().lookup(&snapshot.current_map_type) {
                session.set_map_type(active);
            }
            if let Some(out) = out {
                let layers: Vec<FeatureType> = session.loaded_map_types().collect();
                render(&session, &layers, &out)?;
            }
            if export {
                export_session(&session, &settings.export_dir)?;
            }
        }
        Commands::Export => export_session(&session, &settings.export_dir)?,
    }

    Ok(())
}

fn lookup(session: &EditorSession, key: &str) -> Result<FeatureType> {
    session
        .catalog()
        .lookup(key)
        .with_context(|| format!("unknown layer '{}'", key))
}

/// Writes `<out>/<layer>.png`. Layers that are not loaded are synthesized.
fn render(session: &EditorSession, layers: &[FeatureType], out: &Path) -> Result<()> {
    std::fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;
    for &ft in layers {
        let key = session.catalog().key(ft);
        let path = out.join(format!("{}.png", key));
        match session.layer(ft) {
            Some(layer) => layer.save(&path),
            None => session.synthesize(ft).save(&path),
        }
        .with_context(|| format!("writing {}", path.display()))?;
        println!("Rendered {} to {}", key, path.display());
    }
    Ok(())
}

fn inspect_at(session: &EditorSession, x: i64, y: i64) {
    match session.inspect(x, y) {
        Some(info) => print_region(&info),
        None => println!("({}, {}) is outside the map", x, y),
    }
}

fn inspect_by_name(session: &EditorSession, prefix: &str) {
    match session.registry().find_by_name_prefix(prefix) {
        Some(region) => print_region(&session.inspect_region(region)),
        None => println!("No state name starts with '{}'", prefix),
    }
}

fn print_region(info: &RegionInfo) {
    println!("Region: {}", info.region);
    println!("State: {}", info.name.as_deref().unwrap_or("-"));
    println!("Terrain: {}", info.terrain.as_deref().unwrap_or("-"));
    for feature in &info.features {
        let description = feature
            .descriptor
            .as_ref()
            .map(|d| format!("{} ({})", d.desc_short, d.desc_long))
            .unwrap_or_else(|| "unavailable".to_string());
        let label = if feature.label.is_empty() {
            "<unset>"
        } else {
            feature.label.as_str()
        };
        println!("{}: {} {}", feature.display_name, label, description);
    }
}

fn export_session(session: &EditorSession, root: &Path) -> Result<()> {
    let dir = session.export(root)?;
    println!("Exported to {}", dir.join(PROJECT_FILE).display());
    Ok(())
}
