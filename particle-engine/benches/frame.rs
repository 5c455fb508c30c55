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
//! Benchmarks for full frames
//!
//! These benchmarks measure:
//! - Frame cost of the standard simulation across population sizes
//! - Serial versus partitioned execution of the simulation systems

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use particle_engine::ecs::systems::{BounceSystem, ColorCycleSystem, MovementSystem, RenderBatchSystem};
use particle_engine::ecs::{EntityStore, Scheduler};
use particle_engine::seeding::seed_population;
use particle_engine::{FrameRecorder, Simulation, SimulationConfig, ViewportBounds};

const BOUNDS: ViewportBounds = ViewportBounds {
    width: 1920.0,
    height: 1080.0,
};

fn build(count: usize, parallel: bool) -> Simulation {
    let config = SimulationConfig::default().with_entity_count(count).with_seed(12345);
    let mut store = EntityStore::with_capacity(count);
    seed_population(&mut store, &config, BOUNDS).unwrap();

    let mut scheduler = Scheduler::new();
    scheduler.register("movement", parallel, MovementSystem::new()).unwrap();
    scheduler.register("bounce", parallel, BounceSystem::new(BOUNDS)).unwrap();
    scheduler.register("color_cycle", parallel, ColorCycleSystem::new()).unwrap();
    scheduler
        .register_exclusive("render", RenderBatchSystem::with_capacity(FrameRecorder::new(), count))
        .unwrap();
    Simulation::from_parts(store, scheduler)
}

/// Benchmark: one frame of the standard simulation
fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");

    for entity_count in [1_000, 10_000, 100_000].iter() {
        group.throughput(Throughput::Elements(*entity_count as u64));

        group.bench_with_input(BenchmarkId::new("serial", entity_count), entity_count, |b, &count| {
            let mut simulation = build(count, false);
            b.iter(|| black_box(simulation.tick(black_box(1.0 / 60.0)).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("parallel", entity_count), entity_count, |b, &count| {
            let mut simulation = build(count, true);
            b.iter(|| black_box(simulation.tick(black_box(1.0 / 60.0)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark: movement alone, where partitioning has the least work to amortize
fn bench_movement_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("movement_only");

    for entity_count in [10_000, 100_000].iter() {
        group.throughput(Throughput::Elements(*entity_count as u64));

        for parallel in [false, true] {
            let label = if parallel { "parallel" } else { "serial" };
            group.bench_with_input(BenchmarkId::new(label, entity_count), entity_count, |b, &count| {
                let config = SimulationConfig::default().with_entity_count(count).with_seed(1);
                let mut store = EntityStore::with_capacity(count);
                seed_population(&mut store, &config, BOUNDS).unwrap();
                let mut scheduler = Scheduler::new();
                scheduler.register("movement", parallel, MovementSystem::new()).unwrap();

                b.iter(|| black_box(scheduler.run_frame(&mut store, 1.0 / 60.0).unwrap()));
            });
        }
    }

    group.finish();
}

criterion_group!(frame_benches, bench_frame, bench_movement_only);
criterion_main!(frame_benches);
