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
//! End-to-end frame tests
//!
//! Drives all four systems through the scheduler and checks the state the
//! render sink sees.

use approx::assert_abs_diff_eq;
use particle_engine::ecs::components::{Color, Position, Scale, Velocity};
use particle_engine::ecs::systems::{BounceSystem, ColorCycleSystem, MovementSystem, RenderBatchSystem};
use particle_engine::ecs::{Entity, EntityInit, EntityStore, Scheduler};
use particle_engine::{FrameRecorder, Simulation, ViewportBounds};
use std::sync::{Arc, Mutex};

fn three_entities() -> EntityStore {
    let seeds = [
        (Position::new(98.0, 50.0), Velocity::new(10.0, 0.0)),
        (Position::new(50.0, 50.0), Velocity::zero()),
        (Position::new(20.0, 1.0), Velocity::new(0.0, -2.0)),
    ];

    let mut store = EntityStore::new();
    store
        .create(seeds.len(), |i| {
            let (position, velocity) = seeds[i];
            EntityInit::full(position, velocity, Scale::uniform(10.0), Color::hsva(0.5, 1.0, 1.0, 1.0))
        })
        .unwrap();
    store
}

fn standard_scheduler(bounds: ViewportBounds, recorder: &Arc<Mutex<FrameRecorder>>) -> Scheduler {
    let mut scheduler = Scheduler::new();
    scheduler.register("movement", true, MovementSystem::new()).unwrap();
    scheduler.register("bounce", true, BounceSystem::new(bounds)).unwrap();
    scheduler.register("color_cycle", true, ColorCycleSystem::new()).unwrap();
    scheduler
        .register_exclusive("render", RenderBatchSystem::new(Arc::clone(recorder)))
        .unwrap();
    scheduler
}

#[test]
fn test_overshoot_then_return() {
    let recorder = FrameRecorder::shared();
    let scheduler = standard_scheduler(ViewportBounds::new(100.0, 100.0), &recorder);
    let mut simulation = Simulation::from_parts(three_entities(), scheduler);
    let first = Entity::from_index(0);

    // Frame 1: moves past the right edge and has its velocity flipped.
    simulation.tick(1.0).unwrap();
    let position = simulation.store().get::<Position>(first).unwrap();
    assert_abs_diff_eq!(position.x(), 108.0, epsilon = 1e-5);
    assert_abs_diff_eq!(position.y(), 50.0, epsilon = 1e-5);
    assert_eq!(*simulation.store().get::<Velocity>(first).unwrap(), Velocity::new(-10.0, 0.0));

    // The sink sees the overshooting position for that frame.
    assert_eq!(recorder.lock().unwrap().last_frame()[0].transform.origin, [108.0, 50.0]);

    // Frame 2: back inside, velocity unchanged.
    simulation.tick(1.0).unwrap();
    let position = simulation.store().get::<Position>(first).unwrap();
    assert_abs_diff_eq!(position.x(), 98.0, epsilon = 1e-5);
    assert_eq!(*simulation.store().get::<Velocity>(first).unwrap(), Velocity::new(-10.0, 0.0));
}

#[test]
fn test_bottom_edge_reflects_upward() {
    let recorder = FrameRecorder::shared();
    let scheduler = standard_scheduler(ViewportBounds::new(100.0, 100.0), &recorder);
    let mut simulation = Simulation::from_parts(three_entities(), scheduler);
    let third = Entity::from_index(2);

    simulation.tick(1.0).unwrap();
    assert_abs_diff_eq!(simulation.store().get::<Position>(third).unwrap().y(), -1.0, epsilon = 1e-5);
    assert_eq!(*simulation.store().get::<Velocity>(third).unwrap(), Velocity::new(0.0, 2.0));

    simulation.tick(1.0).unwrap();
    assert_abs_diff_eq!(simulation.store().get::<Position>(third).unwrap().y(), 1.0, epsilon = 1e-5);
}

#[test]
fn test_stationary_entity_is_untouched() {
    let recorder = FrameRecorder::shared();
    let scheduler = standard_scheduler(ViewportBounds::new(100.0, 100.0), &recorder);
    let mut simulation = Simulation::from_parts(three_entities(), scheduler);

    for _ in 0..25 {
        simulation.tick(0.1).unwrap();
    }
    let second = Entity::from_index(1);
    assert_eq!(*simulation.store().get::<Position>(second).unwrap(), Position::new(50.0, 50.0));
    assert_eq!(*simulation.store().get::<Velocity>(second).unwrap(), Velocity::zero());
}

#[test]
fn test_render_sees_this_frames_state() {
    let recorder = FrameRecorder::shared();
    let scheduler = standard_scheduler(ViewportBounds::new(100.0, 100.0), &recorder);
    let mut simulation = Simulation::from_parts(three_entities(), scheduler);

    for _ in 0..5 {
        simulation.tick(0.25).unwrap();
        let recorder = recorder.lock().unwrap();
        assert_eq!(recorder.last_count(), 3);
        for (i, instance) in recorder.last_frame().iter().enumerate() {
            let entity = Entity::from_index(i);
            let position = simulation.store().get::<Position>(entity).unwrap();
            let color = simulation.store().get::<Color>(entity).unwrap();
            assert_eq!(instance.transform.origin, position.as_array());
            assert_eq!(instance.transform.x_axis, [10.0, 0.0]);
            assert_eq!(instance.transform.y_axis, [0.0, 10.0]);
            assert_eq!(instance.color, color.to_rgba());
        }
    }
}

#[test]
fn test_hue_advances_with_frame_time() {
    let recorder = FrameRecorder::shared();
    let scheduler = standard_scheduler(ViewportBounds::new(100.0, 100.0), &recorder);
    let mut simulation = Simulation::from_parts(three_entities(), scheduler);

    simulation.tick(0.3).unwrap();
    simulation.tick(0.3).unwrap();
    let hue = simulation.store().get::<Color>(Entity::from_index(0)).unwrap().hue();
    assert_abs_diff_eq!(hue, 0.1, epsilon = 1e-5);
}

#[test]
fn test_negative_delta_time_is_rejected() {
    let recorder = FrameRecorder::shared();
    let scheduler = standard_scheduler(ViewportBounds::new(100.0, 100.0), &recorder);
    let mut simulation = Simulation::from_parts(three_entities(), scheduler);

    assert!(simulation.tick(-1.0).is_err());
    assert_eq!(simulation.frames(), 0);
    assert_eq!(recorder.lock().unwrap().frames(), 0);
    assert_eq!(*simulation.store().get::<Position>(Entity::from_index(0)).unwrap(), Position::new(98.0, 50.0));
}
