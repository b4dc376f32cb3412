//! Human and JSON renderings of cache contents.

use colored::Colorize;
use scout_perception::CachedProjectile;
use scout_tracker::{CacheSummary, ObservationCache, ObservedEntity, PlayerRecord, WorldSource};
use scout_types::ObjectKind;
use serde::Serialize;

/// Everything `scout inspect` prints.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub summary: CacheSummary,
    pub close_entities: Vec<ObservedEntity>,
    pub hostiles: Vec<ObservedEntity>,
    pub projectiles: Vec<CachedProjectile>,
    pub players: Vec<PlayerRecord>,
}

impl InspectReport {
    pub fn collect<W: WorldSource>(cache: &ObservationCache<W>) -> Self {
        let summary = cache.summary();
        let players = summary
            .players
            .iter()
            .filter_map(|name| cache.player(name))
            .collect();
        Self {
            close_entities: cache.close_entities(),
            hostiles: cache.hostiles(),
            projectiles: cache.projectiles(),
            players,
            summary,
        }
    }
}

/// One-line description of an entity, e.g. `#7 item stick x3 at (1.00, 64.00, 0.00)`.
pub fn describe(entity: &ObservedEntity) -> String {
    let object = &entity.object;
    let detail = match &object.kind {
        ObjectKind::Player { name, .. } => format!(" {name}"),
        ObjectKind::ItemDrop { item, count } if *count > 1 => format!(" {item} x{count}"),
        ObjectKind::ItemDrop { item, .. } => format!(" {item}"),
        _ => String::new(),
    };
    format!("{} {}{} at {}", object.id, entity.category, detail, object.position)
}

pub fn print_inspect(report: &InspectReport) {
    let s = &report.summary;
    println!(
        "{} tick {} ({} refresh{})",
        "Observation cache".bold().cyan(),
        s.tick,
        s.refreshes,
        if s.refreshes == 1 { "" } else { "es" }
    );

    println!("\n  {}", "Tracked".bold());
    if s.tracked.is_empty() {
        println!("    {}", "nothing".dimmed());
    }
    for (category, count) in &s.tracked {
        println!("    {category:<28} {count}");
    }

    if !s.item_drops.is_empty() {
        println!("\n  {}", "Dropped items".bold());
        for (item, count) in &s.item_drops {
            println!("    {item:<28} {count}");
        }
    }

    print_entities("Close range", &report.close_entities);
    print_entities("Hostile", &report.hostiles);

    if !report.projectiles.is_empty() {
        println!("\n  {} ({})", "Projectiles".bold(), report.projectiles.len());
        for p in &report.projectiles {
            println!(
                "    {} at {} moving {} gravity {}",
                p.kind.as_str(),
                p.position,
                p.velocity,
                p.gravity
            );
        }
    }

    if !report.players.is_empty() {
        println!("\n  {}", "Players".bold());
        for p in &report.players {
            println!("    {} {} at {}", p.id, p.name.bold(), p.position);
        }
    }

    if s.blacklisted > 0 {
        println!("\n  {} {}", "Blacklisted:".yellow(), s.blacklisted);
    }
}

fn print_entities(title: &str, entities: &[ObservedEntity]) {
    println!("\n  {} ({})", title.bold(), entities.len());
    for e in entities {
        println!("    {}", describe(e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_tracker::CacheConfig;
    use scout_tracker::sim::SimWorld;
    use scout_tracker::world::share;
    use scout_types::{CreatureKind, LiveObject, ProjectileKind, Vec3};

    fn cache() -> ObservationCache<SimWorld> {
        let world = SimWorld::new()
            .with_observer(1, Vec3::ZERO)
            .with_object(LiveObject::player(2, "Alex", Vec3::new(2.0, 0.0, 0.0)))
            .with_object(LiveObject::creature(3, CreatureKind::Creeper, Vec3::new(3.0, 0.0, 0.0)))
            .with_object(LiveObject::item_drop(4, "stick", Vec3::new(50.0, 0.0, 0.0)))
            .with_object(LiveObject::projectile(
                5,
                ProjectileKind::Arrow,
                Vec3::new(4.0, 1.0, 0.0),
                Vec3::new(-1.0, 0.0, 0.0),
            ));
        ObservationCache::new(share(world), CacheConfig::default())
    }

    #[test]
    fn collect_gathers_every_list() {
        let report = InspectReport::collect(&cache());
        assert_eq!(report.summary.refreshes, 1);
        assert_eq!(report.close_entities.len(), 3);
        assert_eq!(report.hostiles.len(), 1);
        assert_eq!(report.projectiles.len(), 1);
        assert_eq!(report.players.len(), 1);
        assert_eq!(report.players[0].name, "Alex");
    }

    #[test]
    fn report_serializes_to_json() {
        let report = InspectReport::collect(&cache());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["summary"]["tracked"]["item"], 1);
        assert_eq!(value["hostiles"][0]["object"]["id"], 3);
        assert_eq!(value["players"][0]["name"], "Alex");
    }

    #[test]
    fn describe_names_items_and_players() {
        let cache = cache();
        let close = cache.close_entities();
        let alex = close.iter().find(|e| e.id().0 == 2).unwrap();
        assert!(describe(alex).starts_with("#2 player Alex at"));

        let items = cache.tracked_entities(scout_types::Category::DroppedItem);
        assert!(describe(&items[0]).starts_with("#4 item stick at"));
    }
}
