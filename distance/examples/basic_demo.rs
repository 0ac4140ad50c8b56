//! Basic demonstration of the distance engine.
//!
//! Run with: cargo run --example basic_demo

use tbg_distance::{DistanceConfig, DistanceMethod, DistanceWorld};

fn main() {
    println!("=== This Bitter Ground - Distance Demo ===\n");

    for method in DistanceMethod::ALL {
        let mut sim = DistanceWorld::with_config(DistanceConfig::new(method));

        // Two blocks of units facing each other
        sim.spawn_mass_units(-50.0, 0.0, 100, 40.0, 0);
        sim.spawn_mass_units(50.0, 0.0, 100, 40.0, 1000);

        // Run 20 ticks, querying every Blue-Red pair once per tick
        for _ in 0..20 {
            sim.step();
            let mut closest = f32::MAX;
            for a in 0..100 {
                for b in 1000..1100 {
                    if let Some(d) = sim.squared_distance(a, b) {
                        closest = closest.min(d);
                    }
                }
            }
            if sim.current_tick() % 10 == 0 {
                println!(
                    "  {:?} tick {}: closest pair at {:.2}",
                    method,
                    sim.current_tick(),
                    closest.sqrt()
                );
            }
        }

        let calc = sim.calculation();
        if !method.is_cached() {
            println!("  {:?}: no precomputed matrix\n", method);
            continue;
        }
        let stats = if method == DistanceMethod::Condensed {
            calc.condensed_stats()
        } else {
            calc.square_stats()
        };
        println!(
            "  {:?}: {} builds, {} cache hits, avg build {:?}\n",
            method,
            calc.build_count(),
            stats.hits,
            stats.avg_build_time()
        );
    }

    let sim = {
        let mut sim = DistanceWorld::new();
        sim.spawn_unit(1, 0.0, 0.0);
        sim.spawn_unit(2, 3.0, 4.0);
        sim.step();
        sim
    };
    println!("=== Distances to (0, 4) ===");
    for (tag, d) in sim.distances_to_point(0.0, 4.0) {
        println!("  Unit {}: {:.2}", tag, d);
    }
}
