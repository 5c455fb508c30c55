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
//! System scheduler with parallel execution support
//!
//! The scheduler keeps an ordered registry of systems and runs each of them
//! once per frame, in registration order. Later systems observe every
//! mutation made by earlier ones in the same frame, so order is part of the
//! simulation's meaning (movement before bounce, rendering last).
//!
//! A system registered as parallel has its matched rows cut into one
//! contiguous chunk per worker thread. Chunks of the same system run
//! concurrently on the Rayon pool and all of them finish before the next
//! system starts. Because a query only borrows its declared columns and each
//! row belongs to exactly one chunk, workers never touch the same data.

use crate::ecs::component::AttributeSet;
use crate::ecs::query::{Query, Rows};
use crate::ecs::store::EntityStore;
use crate::ecs::system::{ExclusiveSystem, FrameContext, System};
use crate::ecs::Entity;
use crate::error::{ConfigError, FrameError, SystemError};

/// Registration record of one system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemDescriptor {
    name: String,
    access: AttributeSet,
    writes: AttributeSet,
    parallel: bool,
}

impl SystemDescriptor {
    fn for_query<Q: Query>(name: String, parallel: bool) -> Self {
        SystemDescriptor {
            name,
            access: Q::ACCESS,
            writes: Q::WRITES,
            parallel,
        }
    }

    /// Diagnostic name given at registration
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes an entity must have to be visited
    pub fn access(&self) -> AttributeSet {
        self.access
    }

    /// Attributes the system may write
    pub fn writes(&self) -> AttributeSet {
        self.writes
    }

    /// Whether matched rows are partitioned across worker threads
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }
}

/// Summary of a completed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Frame number, starting at 1
    pub frame: u64,
    /// Systems that ran
    pub routines: usize,
    /// Entity visits summed over all systems
    pub visited: usize,
}

/// Thread pool used for parallel systems
struct Workers {
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl Workers {
    fn global() -> Self {
        Workers {
            #[cfg(feature = "parallel")]
            pool: None,
        }
    }

    #[cfg(feature = "parallel")]
    fn with_threads(threads: usize) -> Result<Self, ConfigError> {
        if threads == 0 {
            return Ok(Self::global());
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("particle-worker-{}", i))
            .build()?;
        log::info!("built worker pool with {} threads", pool.current_num_threads());
        Ok(Workers { pool: Some(pool) })
    }

    #[cfg(not(feature = "parallel"))]
    fn with_threads(threads: usize) -> Result<Self, ConfigError> {
        if threads > 1 {
            log::warn!("parallel feature disabled; ignoring request for {} worker threads", threads);
        }
        Ok(Self::global())
    }

    fn threads(&self) -> usize {
        #[cfg(feature = "parallel")]
        {
            match &self.pool {
                Some(pool) => pool.current_num_threads(),
                None => rayon::current_num_threads(),
            }
        }
        #[cfg(not(feature = "parallel"))]
        {
            1
        }
    }

    #[cfg(feature = "parallel")]
    fn for_each<'a, Q, F>(&self, rows: Rows<'a, Q>, f: F) -> usize
    where
        Q: Query,
        F: Fn(Entity, Q::Item<'a>) + Sync,
    {
        let partitions = self.threads();
        match &self.pool {
            Some(pool) => pool.install(|| rows.par_for_each(partitions, &f)),
            None => rows.par_for_each(partitions, &f),
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn for_each<'a, Q, F>(&self, rows: Rows<'a, Q>, f: F) -> usize
    where
        Q: Query,
        F: Fn(Entity, Q::Item<'a>) + Sync,
    {
        rows.fold(0, |visited, (entity, item)| {
            f(entity, item);
            visited + 1
        })
    }
}

/// Type-erased registered system
trait Routine: Send {
    fn descriptor(&self) -> &SystemDescriptor;

    /// Run for one frame, returning the number of entities visited
    fn run(&mut self, store: &mut EntityStore, ctx: &FrameContext, workers: &Workers) -> Result<usize, SystemError>;
}

struct SystemRoutine<S> {
    descriptor: SystemDescriptor,
    system: S,
}

impl<S: System> Routine for SystemRoutine<S> {
    fn descriptor(&self) -> &SystemDescriptor {
        &self.descriptor
    }

    fn run(&mut self, store: &mut EntityStore, ctx: &FrameContext, workers: &Workers) -> Result<usize, SystemError> {
        self.system.prepare(ctx)?;
        let rows = store.query::<S::Query>()?;
        let system = &self.system;

        if self.descriptor.parallel {
            return Ok(workers.for_each(rows, |entity, item| system.update(ctx, entity, item)));
        }
        Ok(rows.fold(0, |visited, (entity, item)| {
            system.update(ctx, entity, item);
            visited + 1
        }))
    }
}

struct ExclusiveRoutine<S> {
    descriptor: SystemDescriptor,
    system: S,
}

impl<S: ExclusiveSystem> Routine for ExclusiveRoutine<S> {
    fn descriptor(&self) -> &SystemDescriptor {
        &self.descriptor
    }

    fn run(&mut self, store: &mut EntityStore, ctx: &FrameContext, _workers: &Workers) -> Result<usize, SystemError> {
        let visited = store.count_matching(self.descriptor.access);
        let rows = store.query::<S::Query>()?;
        self.system.run(ctx, rows)?;
        Ok(visited)
    }
}

/// Ordered system registry and frame driver
///
/// # Examples
///
/// ```
/// use particle_engine::ecs::{EntityInit, EntityStore, Scheduler};
/// use particle_engine::ecs::components::{Position, Velocity};
/// use particle_engine::ecs::systems::MovementSystem;
///
/// let mut store = EntityStore::new();
/// store.create(4, |_| {
///     EntityInit::new()
///         .with_position(Position::zero())
///         .with_velocity(Velocity::new(1.0, 0.0))
/// }).unwrap();
///
/// let mut scheduler = Scheduler::new();
/// scheduler.register("movement", true, MovementSystem::new()).unwrap();
///
/// let stats = scheduler.run_frame(&mut store, 0.5).unwrap();
/// assert_eq!(stats.visited, 4);
/// assert_eq!(store.column::<Position>()[0].x(), 0.5);
/// ```
pub struct Scheduler {
    routines: Vec<Box<dyn Routine>>,
    workers: Workers,
    frame: u64,
}

impl Scheduler {
    /// Create a scheduler that fans out on the global Rayon pool
    pub fn new() -> Self {
        Scheduler {
            routines: Vec::new(),
            workers: Workers::global(),
            frame: 0,
        }
    }

    /// Create a scheduler with a dedicated pool of `threads` workers
    ///
    /// `0` selects the global pool. Without the `parallel` feature the count
    /// is ignored and every system runs on the calling thread.
    pub fn with_threads(threads: usize) -> Result<Self, ConfigError> {
        Ok(Scheduler {
            routines: Vec::new(),
            workers: Workers::with_threads(threads)?,
            frame: 0,
        })
    }

    /// Append a per-entity system
    ///
    /// Registration order is execution order. With `parallel` set, the
    /// system's matched rows are partitioned across worker threads.
    pub fn register<S>(&mut self, name: impl Into<String>, parallel: bool, system: S) -> Result<(), ConfigError>
    where
        S: System + 'static,
    {
        let descriptor = Self::describe::<S::Query>(name.into(), parallel)?;
        self.routines.push(Box::new(SystemRoutine { descriptor, system }));
        Ok(())
    }

    /// Append a whole-range system that runs on the calling thread
    pub fn register_exclusive<S>(&mut self, name: impl Into<String>, system: S) -> Result<(), ConfigError>
    where
        S: ExclusiveSystem + 'static,
    {
        let descriptor = Self::describe::<S::Query>(name.into(), false)?;
        self.routines.push(Box::new(ExclusiveRoutine { descriptor, system }));
        Ok(())
    }

    fn describe<Q: Query>(name: String, parallel: bool) -> Result<SystemDescriptor, ConfigError> {
        if Q::ALIASED {
            return Err(ConfigError::AliasedQuery { system: name });
        }
        log::debug!(
            "registered system '{}' (access {}, writes {}, parallel {})",
            name,
            Q::ACCESS,
            Q::WRITES,
            parallel
        );
        Ok(SystemDescriptor::for_query::<Q>(name, parallel))
    }

    /// Registered systems in execution order
    pub fn descriptors(&self) -> impl Iterator<Item = &SystemDescriptor> + '_ {
        self.routines.iter().map(|routine| routine.descriptor())
    }

    /// Get the number of registered systems
    pub fn system_count(&self) -> usize {
        self.routines.len()
    }

    /// Worker threads available to parallel systems
    pub fn worker_threads(&self) -> usize {
        self.workers.threads()
    }

    /// Number of frames started so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Run every registered system once
    ///
    /// A negative or non-finite `delta_time` is rejected before anything
    /// runs. Otherwise the store is sealed and the systems run in order; the
    /// first failing system aborts the frame, leaving the mutations of the
    /// systems before it in place.
    pub fn run_frame(&mut self, store: &mut EntityStore, delta_time: f32) -> Result<FrameStats, FrameError> {
        if !delta_time.is_finite() || delta_time < 0.0 {
            return Err(FrameError::InvalidDeltaTime(delta_time));
        }

        store.seal();
        self.frame += 1;
        let ctx = FrameContext::new(delta_time, self.frame);
        let mut stats = FrameStats {
            frame: self.frame,
            ..FrameStats::default()
        };

        for routine in &mut self.routines {
            let visited = routine.run(store, &ctx, &self.workers).map_err(|source| {
                let system = routine.descriptor().name().to_string();
                log::warn!("frame {} aborted in system '{}': {}", ctx.frame(), system, source);
                FrameError::System { system, source }
            })?;
            log::trace!(
                "frame {}: system '{}' visited {} entities",
                ctx.frame(),
                routine.descriptor().name(),
                visited
            );
            stats.routines += 1;
            stats.visited += visited;
        }

        Ok(stats)
    }

    /// Clear all systems from the scheduler
    pub fn clear(&mut self) {
        self.routines.clear();
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
