//! Basic Demo
//!
//! Spawns a handful of entities with overlapping component sets and walks
//! through plain storage access, a two-type view, and an excluding view.

use covey::prelude::*;

#[derive(Debug)]
struct Position {
    x: f32,
    y: f32,
}
impl Component for Position {}

#[derive(Debug)]
struct Velocity {
    x: f32,
    y: f32,
}
impl Component for Velocity {}

#[derive(Debug)]
struct Health(f32);
impl Component for Health {}

#[derive(Debug)]
struct Armor;
impl Component for Armor {}

fn main() {
    env_logger::init();
    println!("=== Basic Demo ===\n");

    let mut registry = Registry::new();

    let player = registry.create();
    registry.emplace(player, Position { x: 0.0, y: 0.0 });
    registry.emplace(player, Velocity { x: 1.0, y: 1.0 });
    registry.emplace(player, Health(100.0));
    registry.emplace(player, Armor);

    let enemy = registry.create();
    registry.emplace(enemy, Position { x: 5.0, y: 5.0 });
    registry.emplace(enemy, Velocity { x: -1.0, y: 0.0 });
    registry.emplace(enemy, Health(100.0));

    let rock = registry.create();
    registry.emplace(rock, Position { x: 10.0, y: 10.0 });

    println!("[SETUP] {} entities created\n", registry.entity_count());

    println!("[Movement] moving entities:");
    for (entity, pos, vel) in registry.view::<(Position, Velocity)>().each() {
        println!("  {entity} at ({:.1}, {:.1}) velocity ({:.1}, {:.1})", pos.x, pos.y, vel.x, vel.y);
    }
    println!();

    println!("[Combat] unarmored entities take damage:");
    for entity in registry.view_with_exclude::<(Health,), (Armor,)>().iter().collect::<Vec<_>>() {
        registry.get_mut::<Health>(entity).0 -= 20.0;
        println!("  {entity} hp now {:.1}", registry.get::<Health>(entity).0);
    }
    println!();

    println!("[Filter] entities with Position but no Velocity:");
    for entity in registry.view_with_exclude::<(Position,), (Velocity,)>().iter() {
        println!("  {entity} is static");
    }

    registry.dump_storage_sizes();
}
