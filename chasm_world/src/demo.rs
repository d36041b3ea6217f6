//! Prints a generated course and the jump budget behind it.

use std::collections::VecDeque;

use chasm_world::{Tuning, WorldGenerator};

fn main() {
    let seed: u64 = std::env::args().nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2024);
    let tuning = Tuning::default();

    println!("\n=== Chasm Course Demo (seed {}) ===\n", seed);

    // ── 1. Jump budget ────────────────────────────────────────────────────
    println!("1. Jump budget");
    println!("   gravity={}  jump_velocity={}  scroll_speed={}",
             tuning.gravity, tuning.jump_velocity, tuning.scroll_speed);
    println!("   air time     = {:.1} ticks", tuning.air_ticks());
    println!("   max jump     = {:.1} units", tuning.max_jump_distance());
    println!("   gap range    = [{}, {})  (limit {:.1})\n",
             tuning.min_gap, tuning.max_gap, tuning.gap_limit());

    // ── 2. Course ─────────────────────────────────────────────────────────
    println!("2. First 12 platforms");
    let mut world = WorldGenerator::with_seed(tuning, seed);
    let mut platforms = VecDeque::new();
    world.seed(&mut platforms);
    world.ensure_ahead(&mut platforms, 12);

    let mut prev_end: Option<f32> = None;
    for (i, p) in platforms.iter().enumerate() {
        let gap = prev_end.map(|e| format!("{:6.1}", p.x - e)).unwrap_or_else(|| "     -".into());
        println!("   #{:<2} x={:8.1}  width={:6.1}  gap={}", i, p.x, p.width, gap);
        prev_end = Some(p.end());
    }

    // ── 3. Widest chasm over a long course ────────────────────────────────
    let mut widest = 0.0_f32;
    for _ in 0..10_000 {
        let before = world.frontier();
        let p = world.spawn_next(&mut platforms);
        widest = widest.max(p.x - before);
        platforms.pop_front();
    }
    println!("\n3. Widest of 10 000 chasms: {:.1} (< {:.1})\n", widest, tuning.gap_limit());
}
