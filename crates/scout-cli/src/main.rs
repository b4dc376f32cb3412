//! `scout` – inspect world snapshots through the observation cache.
//!
//! Loads a JSON [`SimWorld`] snapshot, runs one refresh of the cache over it
//! and answers the same questions the behaviour layer asks at runtime:
//!
//! ```text
//! scout inspect world.json
//! scout nearest-item world.json oak_log birch_log --from 10,64,-3
//! scout nearest-entity world.json creature:zombie player
//! scout init-config
//! ```

mod config;
mod report;
mod telemetry;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use scout_tracker::sim::SimWorld;
use scout_tracker::world::share;
use scout_tracker::{CacheConfig, ObservationCache, WorldSource};
use scout_types::{Category, ItemKind, QueryError, ScoutError, Vec3};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "scout", version)]
#[command(about = "Query a world snapshot through the entity observation cache")]
struct Cli {
    /// Config file to use instead of ~/.scout/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Refresh once and print every bucket
    Inspect {
        snapshot: PathBuf,
        /// Emit the report as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Closest dropped stack of any of the given items
    NearestItem {
        snapshot: PathBuf,
        #[arg(required = true)]
        items: Vec<String>,
        /// Reference point as x,y,z (defaults to the observer)
        #[arg(long)]
        from: Option<Vec3>,
    },
    /// Closest entity in any of the given categories
    NearestEntity {
        snapshot: PathBuf,
        /// `player`, `item`, `creature:<kind>`, `projectile:<kind>` or `other:<kind>`
        #[arg(required = true)]
        categories: Vec<Category>,
        #[arg(long)]
        from: Option<Vec3>,
    },
    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = telemetry::init_tracing("scout");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ScoutError> {
    let resolve = || config::resolve(cli.config.as_deref());
    match cli.command {
        Command::InitConfig { force } => {
            let path = cli.config.clone().unwrap_or_else(config::config_path);
            init_config(&path, force)?;
        }
        Command::Inspect { snapshot, json } => {
            let cache = open(&snapshot, resolve()?)?;
            let report = report::InspectReport::collect(&cache);
            if json {
                let out = serde_json::to_string_pretty(&report)
                    .map_err(|e| ScoutError::Snapshot(e.to_string()))?;
                println!("{out}");
            } else {
                report::print_inspect(&report);
            }
        }
        Command::NearestItem {
            snapshot,
            items,
            from,
        } => {
            let cache = open(&snapshot, resolve()?)?;
            let reference = reference_point(&cache, from)?;
            let items: Vec<ItemKind> = items.into_iter().map(ItemKind::new).collect();
            // A fresh cache has an empty blacklist, so a miss here means
            // none of the items is on the ground at all.
            if let Some(first) = items.first()
                && !cache.any_item_dropped(&items)
            {
                return Err(QueryError::NeverDropped(first.clone()).into());
            }
            match cache.closest_item_drop_of(reference, &items) {
                Some(drop) => println!("{}", report::describe(&drop)),
                None => println!("{}", "no reachable drop".yellow()),
            }
        }
        Command::NearestEntity {
            snapshot,
            categories,
            from,
        } => {
            let cache = open(&snapshot, resolve()?)?;
            let reference = reference_point(&cache, from)?;
            match cache.closest_entity(reference, |_| true, &categories) {
                Some(entity) => println!("{}", report::describe(&entity)),
                None => println!("{}", "no matching entity".yellow()),
            }
        }
    }
    Ok(())
}

fn open(snapshot: &Path, cfg: CacheConfig) -> Result<ObservationCache<SimWorld>, ScoutError> {
    let world = SimWorld::load(snapshot)?;
    info!(
        snapshot = %snapshot.display(),
        objects = world.objects.len(),
        "snapshot loaded"
    );
    Ok(ObservationCache::new(share(world), cfg))
}

fn reference_point(
    cache: &ObservationCache<SimWorld>,
    from: Option<Vec3>,
) -> Result<Vec3, ScoutError> {
    if let Some(point) = from {
        return Ok(point);
    }
    let world = cache
        .world()
        .read()
        .map_err(|_| ScoutError::Snapshot("world lock poisoned".into()))?;
    world.observer().map(|o| o.position).ok_or_else(|| {
        ScoutError::Snapshot("snapshot has no observer; pass --from x,y,z".into())
    })
}

fn init_config(path: &Path, force: bool) -> Result<(), ScoutError> {
    if path.exists() && !force {
        return Err(ScoutError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    config::save_to(&CacheConfig::default(), path)?;
    println!(
        "  {} Config written to {}",
        "✓".green().bold(),
        path.display().to_string().bold()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn categories_and_points_parse_from_arguments() {
        let cli = Cli::try_parse_from([
            "scout",
            "nearest-entity",
            "world.json",
            "creature:zombie",
            "player",
            "--from",
            "1,64,-2",
        ])
        .unwrap();
        let Command::NearestEntity {
            categories, from, ..
        } = cli.command
        else {
            panic!("wrong subcommand");
        };
        assert_eq!(
            categories,
            vec![
                Category::Creature(scout_types::CreatureKind::Zombie),
                Category::PlayerLike
            ]
        );
        assert_eq!(from, Some(Vec3::new(1.0, 64.0, -2.0)));
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(Cli::try_parse_from(["scout", "nearest-entity", "w.json", "creature:dragon"]).is_err());
    }

    #[test]
    fn nearest_item_requires_an_item() {
        assert!(Cli::try_parse_from(["scout", "nearest-item", "w.json"]).is_err());
    }

    #[test]
    fn init_config_refuses_to_overwrite() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        init_config(&path, false).expect("first write");
        assert!(matches!(init_config(&path, false), Err(ScoutError::Config(_))));
        init_config(&path, true).expect("forced write");
    }

    #[test]
    fn reference_point_falls_back_to_observer() {
        let world = SimWorld::new().with_observer(1, Vec3::new(3.0, 64.0, 3.0));
        let cache = ObservationCache::new(share(world), CacheConfig::default());
        assert_eq!(reference_point(&cache, None).unwrap(), Vec3::new(3.0, 64.0, 3.0));
        let there = Vec3::new(0.0, 0.0, 1.0);
        assert_eq!(reference_point(&cache, Some(there)).unwrap(), there);

        let empty = ObservationCache::new(share(SimWorld::new()), CacheConfig::default());
        assert!(reference_point(&empty, None).is_err());
    }

    #[test]
    fn nearest_item_reports_items_never_dropped() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let config = dir.path().join("config.toml");
        config::save_to(&CacheConfig::default(), &config).expect("config written");
        let snapshot = dir.path().join("world.json");
        let world = SimWorld::new()
            .with_observer(1, Vec3::ZERO)
            .with_object(scout_types::LiveObject::item_drop(2, "stick", Vec3::new(1.0, 0.0, 0.0)));
        std::fs::write(&snapshot, world.to_json().unwrap()).unwrap();

        let args = |item: &str| {
            Cli::try_parse_from([
                "scout",
                "--config",
                config.to_str().unwrap(),
                "nearest-item",
                snapshot.to_str().unwrap(),
                item,
            ])
            .unwrap()
        };
        assert!(run(args("stick")).is_ok());
        match run(args("diamond")) {
            Err(ScoutError::Query(QueryError::NeverDropped(item))) => {
                assert_eq!(item, ItemKind::new("diamond"));
            }
            other => panic!("expected a never-dropped error, got {other:?}"),
        }
    }

    #[test]
    fn open_reads_snapshot_files() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("world.json");
        let world = SimWorld::new()
            .with_observer(1, Vec3::ZERO)
            .with_object(scout_types::LiveObject::item_drop(2, "stick", Vec3::new(1.0, 0.0, 0.0)));
        std::fs::write(&path, world.to_json().unwrap()).unwrap();

        let cache = open(&path, CacheConfig::default()).unwrap();
        assert!(cache.any_item_dropped(&[ItemKind::new("stick")]));
    }
}
