//! Bounded pool of interchangeable read handles
//!
//! Handles are fungible: any idle one serves any caller. Admission is an
//! exact compare-and-increment on the outstanding count, so no more than
//! `limit` handles are ever checked out at once, even under contention.
//! A handle is returned to the idle cache when its guard drops; handles
//! are never closed while the pool lives.

use std::fs::File;
use std::io;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crate::observability::{log_event_with_fields, Event, LookupMetrics, ObservationScope};

use super::errors::{PoolError, PoolResult};

/// Something the pool knows how to open more of
pub trait ResourceSource: Send + Sync {
    /// The pooled resource
    type Resource: Send;

    /// Opens a fresh resource.
    fn open(&self) -> io::Result<Self::Resource>;

    /// Human-readable name used in errors and logs.
    fn describe(&self) -> String;
}

/// Opens read-only handles onto one data file
#[derive(Debug, Clone)]
pub struct DataFileSource {
    path: PathBuf,
}

impl DataFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResourceSource for DataFileSource {
    type Resource = File;

    fn open(&self) -> io::Result<File> {
        File::open(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Pool of data-file handles
pub type HandlePool = Pool<DataFileSource>;

/// Bounded object pool with an admission gate
pub struct Pool<S: ResourceSource> {
    source: S,
    limit: usize,
    outstanding: AtomicUsize,
    idle: Mutex<Vec<S::Resource>>,
    metrics: Arc<LookupMetrics>,
}

impl HandlePool {
    /// Pool over the data file at `path`, admitting at most `limit` handles.
    pub fn for_file(path: impl Into<PathBuf>, limit: usize) -> Self {
        Pool::new(DataFileSource::new(path), limit)
    }
}

impl<S: ResourceSource> Pool<S> {
    /// Creates an empty pool. Nothing is opened until first acquisition.
    pub fn new(source: S, limit: usize) -> Self {
        Self::with_metrics(source, limit, Arc::new(LookupMetrics::new()))
    }

    /// Creates an empty pool reporting into a shared metrics registry.
    pub fn with_metrics(source: S, limit: usize, metrics: Arc<LookupMetrics>) -> Self {
        Self {
            source,
            limit,
            outstanding: AtomicUsize::new(0),
            idle: Mutex::new(Vec::new()),
            metrics,
        }
    }

    /// Checks out a handle.
    ///
    /// Fails with `TooManyConcurrentHandles` when `limit` handles are
    /// already out, changing nothing. Fails with `InvalidHandle` when a
    /// fresh handle cannot be opened; the admission slot is given back.
    pub fn acquire(&self) -> PoolResult<Pooled<'_, S>> {
        self.admit()?;

        let resource = match self.take_idle() {
            Some(resource) => {
                self.metrics.increment_handles_reused();
                resource
            }
            None => match self.source.open() {
                Ok(resource) => {
                    self.metrics.increment_handles_opened();
                    let resource_name = self.source.describe();
                    log_event_with_fields(Event::HandleOpened, &[("resource", resource_name.as_str())]);
                    resource
                }
                Err(source) => {
                    self.outstanding.fetch_sub(1, Ordering::AcqRel);
                    self.metrics.increment_handle_open_failures();
                    let err = PoolError::InvalidHandle {
                        resource: self.source.describe(),
                        source,
                    };
                    let reason = err.to_string();
                    log_event_with_fields(Event::HandleOpenFailed, &[("reason", reason.as_str())]);
                    return Err(err);
                }
            },
        };

        Ok(Pooled {
            pool: self,
            resource: Some(resource),
        })
    }

    /// Returns a handle to the pool. Equivalent to dropping it.
    pub fn release(&self, handle: Pooled<'_, S>) {
        drop(handle);
    }

    /// Opens `count` handles up front, one at a time with `delay` between
    /// acquisitions, then returns them all to the idle cache.
    ///
    /// On the first failure the error is returned and every handle
    /// acquired so far is released.
    pub fn warm_up(&self, count: usize, delay: Duration) -> PoolResult<()> {
        let count_str = count.to_string();
        let delay_str = delay.as_millis().to_string();
        let scope = ObservationScope::with_fields(
            "WARMUP",
            &[("count", count_str.as_str()), ("delay_ms", delay_str.as_str())],
        );

        let mut held = Vec::with_capacity(count);
        for i in 0..count {
            if i > 0 && !delay.is_zero() {
                thread::sleep(delay);
            }
            match self.acquire() {
                Ok(handle) => held.push(handle),
                Err(e) => {
                    scope.fail(&e.to_string());
                    return Err(e);
                }
            }
        }
        drop(held);

        let idle = self.idle_count().to_string();
        scope.complete_with_fields(&[("idle", idle.as_str())]);
        Ok(())
    }

    /// Handles currently checked out
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Maximum handles checked out at once
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Handles sitting in the idle cache
    pub fn idle_count(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Handles ever opened by this pool
    pub fn opened_count(&self) -> u64 {
        self.metrics.handles_opened()
    }

    /// What the pool opens
    pub fn source(&self) -> &S {
        &self.source
    }

    fn admit(&self) -> PoolResult<()> {
        let limit = self.limit;
        self.outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                if n < limit {
                    Some(n + 1)
                } else {
                    None
                }
            })
            .map(|_| ())
            .map_err(|current| {
                self.metrics.increment_admission_rejections();
                let limit_str = limit.to_string();
                let current_str = current.to_string();
                log_event_with_fields(
                    Event::HandleAdmissionRejected,
                    &[("limit", limit_str.as_str()), ("outstanding", current_str.as_str())],
                );
                PoolError::TooManyConcurrentHandles { limit }
            })
    }

    fn take_idle(&self) -> Option<S::Resource> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).pop()
    }

    fn put_back(&self, resource: S::Resource) {
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(resource);
        self.outstanding.fetch_sub(1, Ordering::AcqRel);
    }
}

/// A checked-out handle. Goes back to the pool when dropped.
pub struct Pooled<'a, S: ResourceSource> {
    pool: &'a Pool<S>,
    resource: Option<S::Resource>,
}

impl<S: ResourceSource> Pooled<'_, S> {
    /// Returns the handle to its pool.
    pub fn release(self) {
        drop(self);
    }
}

impl<S: ResourceSource> Deref for Pooled<'_, S> {
    type Target = S::Resource;

    fn deref(&self) -> &S::Resource {
        // Only `Drop` takes the resource out
        match self.resource.as_ref() {
            Some(resource) => resource,
            None => unreachable!("pooled handle used after release"),
        }
    }
}

impl<S: ResourceSource> DerefMut for Pooled<'_, S> {
    fn deref_mut(&mut self) -> &mut S::Resource {
        match self.resource.as_mut() {
            Some(resource) => resource,
            None => unreachable!("pooled handle used after release"),
        }
    }
}

impl<S: ResourceSource> Drop for Pooled<'_, S> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            self.pool.put_back(resource);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    /// Hands out sequence numbers and can be told to fail
    #[derive(Default)]
    struct CountingSource {
        opened: AtomicUsize,
        failing: AtomicBool,
    }

    impl ResourceSource for &CountingSource {
        type Resource = usize;

        fn open(&self) -> io::Result<usize> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(io::Error::new(io::ErrorKind::Other, "open refused"));
            }
            Ok(self.opened.fetch_add(1, Ordering::SeqCst))
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    #[test]
    fn test_acquire_opens_lazily() {
        let source = CountingSource::default();
        let pool = Pool::new(&source, 4);

        assert_eq!(source.opened.load(Ordering::SeqCst), 0);
        let handle = pool.acquire().unwrap();
        assert_eq!(*handle, 0);
        assert_eq!(pool.outstanding(), 1);
        assert_eq!(source.opened.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_release_returns_to_idle_cache() {
        let source = CountingSource::default();
        let pool = Pool::new(&source, 4);

        let handle = pool.acquire().unwrap();
        pool.release(handle);
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.idle_count(), 1);

        let again = pool.acquire().unwrap();
        assert_eq!(*again, 0);
        assert_eq!(source.opened.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_limit_is_exact() {
        let source = CountingSource::default();
        let pool = Pool::new(&source, 2);

        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        let err = pool.acquire().err().unwrap();
        assert!(matches!(err, PoolError::TooManyConcurrentHandles { limit: 2 }));
        assert_eq!(pool.outstanding(), 2);

        drop(a);
        let c = pool.acquire().unwrap();
        assert_eq!(pool.outstanding(), 2);
        drop(b);
        drop(c);
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn test_open_failure_gives_slot_back() {
        let source = CountingSource::default();
        source.failing.store(true, Ordering::SeqCst);
        let pool = Pool::new(&source, 1);

        for _ in 0..3 {
            let err = pool.acquire().err().unwrap();
            assert!(matches!(err, PoolError::InvalidHandle { .. }));
            assert_eq!(pool.outstanding(), 0);
        }

        source.failing.store(false, Ordering::SeqCst);
        assert!(pool.acquire().is_ok());
    }

    #[test]
    fn test_warm_up_fills_idle_cache() {
        let source = CountingSource::default();
        let pool = Pool::new(&source, 8);

        pool.warm_up(5, Duration::ZERO).unwrap();
        assert_eq!(pool.idle_count(), 5);
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(source.opened.load(Ordering::SeqCst), 5);

        let held: Vec<_> = (0..5).map(|_| pool.acquire().unwrap()).collect();
        assert_eq!(source.opened.load(Ordering::SeqCst), 5);
        drop(held);
    }

    #[test]
    fn test_warm_up_beyond_limit_fails_and_releases() {
        let source = CountingSource::default();
        let pool = Pool::new(&source, 3);

        let err = pool.warm_up(5, Duration::ZERO).unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.idle_count(), 3);
    }

    #[test]
    fn test_metrics_track_reuse() {
        let source = CountingSource::default();
        let metrics = Arc::new(LookupMetrics::new());
        let pool = Pool::with_metrics(&source, 2, Arc::clone(&metrics));

        drop(pool.acquire().unwrap());
        drop(pool.acquire().unwrap());
        let _a = pool.acquire().unwrap();
        let _b = pool.acquire().unwrap();
        assert!(pool.acquire().is_err());

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.handles_opened, 2);
        assert_eq!(snapshot.handles_reused, 2);
        assert_eq!(snapshot.admission_rejections, 1);
    }
}
