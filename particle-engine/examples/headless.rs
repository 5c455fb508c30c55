// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Headless simulation demo
//!
//! Runs the standard bouncing-particle simulation without a window, with a
//! viewport that shrinks halfway through, and prints a summary of what the
//! render sink received.
//!
//! ```text
//! RUST_LOG=info cargo run --example headless -- [config.toml]
//! ```

use particle_engine::{FrameRecorder, Simulation, SimulationConfig, ViewportBounds};
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Instant;

const FRAMES: u64 = 600;
const DELTA_TIME: f32 = 1.0 / 60.0;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };

    println!("Particle Engine - Headless Demo");
    println!("===============================\n");
    println!("Entities: {}", config.entity_count);
    println!("Velocity: {}..={}", config.velocity.min, config.velocity.max);
    println!("Scale:    {}..={}\n", config.scale.min, config.scale.max);

    let window = Arc::new(Mutex::new(ViewportBounds::new(1280.0, 720.0)));
    let handle = Arc::clone(&window);
    let bounds = move || match handle.lock() {
        Ok(bounds) => *bounds,
        Err(poisoned) => *poisoned.into_inner(),
    };

    let recorder = FrameRecorder::shared();
    let mut simulation = Simulation::new(config, bounds, Arc::clone(&recorder))?;
    if let Some(seed) = simulation.seed() {
        println!("Seed: {}\n", seed);
    }

    let started = Instant::now();
    for frame in 1..=FRAMES {
        if frame == FRAMES / 2 {
            if let Ok(mut bounds) = window.lock() {
                *bounds = ViewportBounds::new(640.0, 360.0);
            }
            println!("Frame {}: viewport resized to 640x360", frame);
        }

        let stats = simulation.tick(DELTA_TIME)?;
        if frame % 120 == 0 {
            println!(
                "Frame {:>4}: {} systems, {} entity visits",
                stats.frame, stats.routines, stats.visited
            );
        }
    }
    let elapsed = started.elapsed();

    let recorder = recorder.lock().map_err(|_| "render sink lock poisoned")?;
    let final_bounds = ViewportBounds::new(640.0, 360.0);
    let inside = recorder
        .last_frame()
        .iter()
        .filter(|instance| final_bounds.contains(instance.transform.origin[0], instance.transform.origin[1]))
        .count();

    println!("\nFrames submitted: {}", recorder.frames());
    println!("Instances in last frame: {}", recorder.last_count());
    println!("Inside final viewport: {}", inside);
    println!(
        "Average frame time: {:.3} ms",
        elapsed.as_secs_f64() * 1000.0 / FRAMES as f64
    );

    Ok(())
}
