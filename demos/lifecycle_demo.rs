//! Lifecycle Demo
//!
//! Spawns entities with a per-frame countdown component, drives `start` and
//! several `update` ticks by hand, and shows deferred vs. timed destruction.

use covey::prelude::*;

#[derive(Debug)]
struct Health(i32);
impl Component for Health {}

#[derive(Debug)]
struct Countdown {
    frames_left: u32,
}
impl Component for Countdown {
    fn start(&mut self) {
        println!("  countdown armed at {} frames", self.frames_left);
    }
}

fn main() {
    env_logger::init();
    println!("=== Lifecycle Demo ===\n");

    let mut registry = Registry::new();

    let permanent = registry.create();
    registry.emplace(permanent, Health(100));

    let mut temporary = Vec::new();
    for i in 1..=3 {
        let e = registry.create();
        registry.emplace(e, Health(10 * i));
        registry.emplace(e, Countdown { frames_left: i as u32 });
        temporary.push(e);
    }

    println!("[SETUP] 1 permanent + {} temporary entities\n", temporary.len());
    registry.start();

    for frame in 1..=5u32 {
        println!("[FRAME {frame}]");

        let expired: Vec<Entity> = registry
            .view::<(Countdown,)>()
            .iter()
            .filter(|&e| registry.get::<Countdown>(e).frames_left <= frame)
            .collect();

        for e in expired {
            println!("  {e} countdown expired, destroying");
            registry.destroy(e);
        }

        registry.update(1.0);

        println!("  {} entities remain", registry.entity_count());
        for (entity, hp) in registry.view::<(Health,)>().each() {
            println!("    {entity} hp: {}", hp.0);
        }
        println!();
    }

    println!("=== Final State ===");
    registry.dump_storage_sizes();
}
