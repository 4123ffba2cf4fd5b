//! Compute backends
//!
//! [`SerialBackend`] runs work-items one after another in id order, which
//! makes results reproducible. [`RayonBackend`] spreads them over a rayon
//! thread pool. Both return from [`ComputeBackend::dispatch`] only after
//! every work-item finished, so the following [`ComputeBackend::barrier`]
//! is a synchronization point: all writes of the dispatch are visible to
//! whatever runs next.

use crate::error::{ComputeError, ComputeResult};
use crate::unit::{ComputeUnit, IndexSpace};
use rayon::prelude::*;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, trace};

/// Executes compute units over index spaces.
pub trait ComputeBackend {
    /// Backend name used in logs.
    fn name(&self) -> &'static str;

    /// Run `unit` once for every item of `space`.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::UnitFailed`] if a work-item panicked.
    fn dispatch(&self, unit: &dyn ComputeUnit, space: IndexSpace) -> ComputeResult<()>;

    /// Wait until every previous dispatch has committed its writes.
    fn barrier(&self) {
        trace!(backend = self.name(), "barrier");
    }

    /// Dispatch followed by a barrier.
    fn run(&self, unit: &dyn ComputeUnit, space: IndexSpace) -> ComputeResult<()> {
        self.dispatch(unit, space)?;
        self.barrier();
        Ok(())
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "work-item panicked".to_string()
    }
}

/// Single-threaded backend, work-items in id order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialBackend;

impl SerialBackend {
    /// Create a serial backend.
    pub fn new() -> Self {
        SerialBackend
    }
}

impl ComputeBackend for SerialBackend {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn dispatch(&self, unit: &dyn ComputeUnit, space: IndexSpace) -> ComputeResult<()> {
        debug!(
            backend = self.name(),
            unit = unit.name(),
            items = space.len(),
            dims = space.dimensions(),
            "dispatch"
        );
        catch_unwind(AssertUnwindSafe(|| {
            for id in 0..space.len() {
                unit.execute(space.item(id));
            }
        }))
        .map_err(|payload| ComputeError::UnitFailed {
            unit: unit.name(),
            message: panic_message(payload),
        })
    }
}

/// Thread-pool backend built on rayon.
pub struct RayonBackend {
    pool: rayon::ThreadPool,
}

impl RayonBackend {
    /// Create a pool with `threads` workers, or rayon's default when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::PoolCreation`] if the pool cannot be built.
    pub fn new(threads: Option<usize>) -> ComputeResult<Self> {
        let mut builder = rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("mapcolor-worker-{i}"));
        if let Some(n) = threads {
            builder = builder.num_threads(n);
        }
        let pool = builder.build()?;
        debug!(threads = pool.current_num_threads(), "created worker pool");
        Ok(Self { pool })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl std::fmt::Debug for RayonBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RayonBackend")
            .field("threads", &self.threads())
            .finish()
    }
}

impl ComputeBackend for RayonBackend {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn dispatch(&self, unit: &dyn ComputeUnit, space: IndexSpace) -> ComputeResult<()> {
        debug!(
            backend = self.name(),
            unit = unit.name(),
            items = space.len(),
            dims = space.dimensions(),
            "dispatch"
        );
        self.pool
            .install(|| {
                catch_unwind(AssertUnwindSafe(|| {
                    (0..space.len())
                        .into_par_iter()
                        .for_each(|id| unit.execute(space.item(id)));
                }))
            })
            .map_err(|payload| ComputeError::UnitFailed {
                unit: unit.name(),
                message: panic_message(payload),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::WorkItem;
    use mapcolor_core::AtomicBuffer;

    struct CountUnit<'a> {
        counter: &'a AtomicBuffer,
        seen: &'a AtomicBuffer,
    }

    impl ComputeUnit for CountUnit<'_> {
        fn name(&self) -> &'static str {
            "count"
        }

        fn execute(&self, item: WorkItem) {
            self.counter.fetch_add(0, 1);
            self.seen.fetch_add(item.global_id, 1);
        }
    }

    struct PanicUnit;

    impl ComputeUnit for PanicUnit {
        fn name(&self) -> &'static str {
            "panic"
        }

        fn execute(&self, item: WorkItem) {
            if item.global_id == 3 {
                panic!("boom");
            }
        }
    }

    fn check_backend(backend: &dyn ComputeBackend) {
        let counter = AtomicBuffer::new(1, 0).unwrap();
        let seen = AtomicBuffer::new(1000, 0).unwrap();
        let unit = CountUnit {
            counter: &counter,
            seen: &seen,
        };
        backend.run(&unit, IndexSpace::Linear(1000)).unwrap();
        assert_eq!(counter.load(0), 1000);
        assert!(seen.to_vec().iter().all(|&n| n == 1));
    }

    #[test]
    fn test_serial_runs_every_item_once() {
        check_backend(&SerialBackend::new());
    }

    #[test]
    fn test_rayon_runs_every_item_once() {
        let backend = RayonBackend::new(Some(4)).unwrap();
        assert_eq!(backend.threads(), 4);
        check_backend(&backend);
    }

    #[test]
    fn test_panicking_unit_is_reported() {
        let err = SerialBackend::new()
            .dispatch(&PanicUnit, IndexSpace::Linear(5))
            .unwrap_err();
        assert!(matches!(err, ComputeError::UnitFailed { unit: "panic", .. }));

        let backend = RayonBackend::new(Some(2)).unwrap();
        let err = backend
            .dispatch(&PanicUnit, IndexSpace::Linear(5))
            .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_empty_space() {
        let counter = AtomicBuffer::new(1, 0).unwrap();
        let seen = AtomicBuffer::new(1, 0).unwrap();
        let unit = CountUnit {
            counter: &counter,
            seen: &seen,
        };
        SerialBackend::new()
            .run(&unit, IndexSpace::Linear(0))
            .unwrap();
        assert_eq!(counter.load(0), 0);
    }
}
