//! Diagnostic observers for resolution events.
//!
//! Observers registered on the builder are notified around every
//! `get` call, including the nested ones issued by factories, extensions and
//! the autowire engine. Observer calls run synchronously on the resolving
//! thread, so keep implementations cheap.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::DiError;

/// Which resolution path produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionSource {
    /// Served from the instance cache
    Cached,
    /// Forwarded to the aliased identifier
    Alias,
    /// Produced by a registered factory
    Factory,
    /// Delegated to the autowire resolver
    Autowired,
    /// Zero-argument construction of the identifier as a type name
    Constructed,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionSource::Cached => "cached",
            ResolutionSource::Alias => "alias",
            ResolutionSource::Factory => "factory",
            ResolutionSource::Autowired => "autowired",
            ResolutionSource::Constructed => "constructed",
        }
    }
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observer trait for resolution events.
///
/// # Examples
///
/// ```
/// use keyed_di::{Container, DiError, DiObserver, ResolutionSource, service};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder {
///     seen: Mutex<Vec<(String, ResolutionSource)>>,
/// }
///
/// impl DiObserver for Recorder {
///     fn resolved(&self, id: &str, source: ResolutionSource, _duration: Duration) {
///         self.seen.lock().unwrap().push((id.to_string(), source));
///     }
/// }
///
/// let recorder = Arc::new(Recorder::default());
/// let container = Container::builder()
///     .instance("answer", service(42u32))
///     .observer(recorder.clone())
///     .build();
///
/// container.get("answer").unwrap();
/// assert_eq!(
///     recorder.seen.lock().unwrap().as_slice(),
///     &[("answer".to_string(), ResolutionSource::Cached)]
/// );
/// ```
pub trait DiObserver: Send + Sync {
    /// Called before resolution of `id` starts.
    fn resolving(&self, id: &str) {
        let _ = id;
    }

    /// Called after `id` resolved successfully.
    fn resolved(&self, id: &str, source: ResolutionSource, duration: Duration);

    /// Called when resolution of `id` failed.
    fn failed(&self, id: &str, error: &DiError) {
        let _ = (id, error);
    }
}

/// Collection of observers owned by a container.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self { observers: Vec::new() }
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[cfg(any(test, feature = "diagnostics"))]
    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    #[inline]
    pub(crate) fn resolving(&self, id: &str) {
        for observer in &self.observers {
            observer.resolving(id);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, id: &str, source: ResolutionSource, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(id, source, duration);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, id: &str, error: &DiError) {
        for observer in &self.observers {
            observer.failed(id, error);
        }
    }
}

/// Observer that forwards events to `tracing`.
///
/// # Examples
///
/// ```
/// use keyed_di::{Container, LoggingObserver};
/// use std::sync::Arc;
///
/// let container = Container::builder()
///     .observer(Arc::new(LoggingObserver::with_prefix("app")))
///     .build();
/// assert!(!container.has("anything"));
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self { prefix: "keyed-di".to_string() }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for LoggingObserver {
    fn resolving(&self, id: &str) {
        debug!(prefix = %self.prefix, id, "Resolving");
    }

    fn resolved(&self, id: &str, source: ResolutionSource, duration: Duration) {
        info!(prefix = %self.prefix, id, source = %source, ?duration, "Resolved");
    }

    fn failed(&self, id: &str, error: &DiError) {
        warn!(prefix = %self.prefix, id, %error, "Resolution failed");
    }
}

/// Observer counting resolutions per outcome.
#[derive(Default)]
pub struct MetricsObserver {
    resolutions: AtomicU64,
    cache_hits: AtomicU64,
    failures: AtomicU64,
    total_nanos: AtomicU64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Successful resolutions, cache hits included.
    pub fn resolution_count(&self) -> u64 {
        self.resolutions.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn total_resolution_time(&self) -> Duration {
        Duration::from_nanos(self.total_nanos.load(Ordering::Relaxed))
    }

    pub fn average_resolution_time(&self) -> Option<Duration> {
        let count = self.resolution_count();
        if count == 0 {
            return None;
        }
        Some(Duration::from_nanos(self.total_nanos.load(Ordering::Relaxed) / count))
    }

    pub fn reset(&self) {
        self.resolutions.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        self.total_nanos.store(0, Ordering::Relaxed);
    }
}

impl DiObserver for MetricsObserver {
    fn resolved(&self, _id: &str, source: ResolutionSource, duration: Duration) {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        if source == ResolutionSource::Cached {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        }
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    fn failed(&self, _id: &str, _error: &DiError) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }
}
