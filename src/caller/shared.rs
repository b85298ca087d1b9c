//! Live, shareable caller registry.
//!
//! Readers take a snapshot with [`SharedRegistry::load`]; writers build a new
//! registry off to the side and swap it in, so a lookup never sees a
//! half-sorted member list.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::caller::entry::CallerEntry;
use crate::caller::registry::CallerRegistry;
use crate::observability::metrics;

/// Copy-on-write handle to the current [`CallerRegistry`].
#[derive(Debug)]
pub struct SharedRegistry {
    inner: ArcSwap<CallerRegistry>,
}

impl SharedRegistry {
    pub fn new(registry: CallerRegistry) -> Self {
        metrics::record_registry_size(registry.len());
        Self {
            inner: ArcSwap::from_pointee(registry),
        }
    }

    /// Snapshot of the current registry.
    pub fn load(&self) -> Arc<CallerRegistry> {
        self.inner.load_full()
    }

    /// Replace the whole registry (config reload).
    pub fn store(&self, registry: CallerRegistry) {
        tracing::info!(rules = registry.len(), "Caller registry replaced");
        metrics::record_registry_size(registry.len());
        self.inner.store(Arc::new(registry));
    }

    /// Register one more entry.
    pub fn register(&self, entry: CallerEntry) {
        tracing::debug!(ip = %entry.ip(), note = %entry.note, "Registering caller rule");
        let previous = self.inner.rcu(|current| {
            let mut next = CallerRegistry::clone(current);
            next.add(entry.clone());
            next
        });
        metrics::record_registry_size(previous.len() + 1);
    }
}

impl Default for SharedRegistry {
    fn default() -> Self {
        Self::new(CallerRegistry::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::thread;

    use ::metrics::{
        Counter, Gauge, GaugeFn, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };

    /// Records the last value set on `caller_registry_rules`.
    #[derive(Default)]
    struct GaugeRecorder {
        rules: Arc<RulesGauge>,
    }

    #[derive(Default)]
    struct RulesGauge(AtomicU64);

    impl GaugeFn for RulesGauge {
        fn increment(&self, value: f64) {
            self.set(f64::from_bits(self.0.load(Ordering::Relaxed)) + value);
        }

        fn decrement(&self, value: f64) {
            self.set(f64::from_bits(self.0.load(Ordering::Relaxed)) - value);
        }

        fn set(&self, value: f64) {
            self.0.store(value.to_bits(), Ordering::Relaxed);
        }
    }

    impl GaugeRecorder {
        fn rules(&self) -> f64 {
            f64::from_bits(self.rules.0.load(Ordering::Relaxed))
        }
    }

    impl Recorder for GaugeRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, _: &Key, _: &Metadata<'_>) -> Counter {
            Counter::noop()
        }

        fn register_gauge(&self, key: &Key, _: &Metadata<'_>) -> Gauge {
            if key.name() == "caller_registry_rules" {
                Gauge::from_arc(self.rules.clone())
            } else {
                Gauge::noop()
            }
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    #[test]
    fn test_register_is_copy_on_write() {
        let mut registry = CallerRegistry::default();
        registry.initialize().unwrap();
        let shared = SharedRegistry::new(registry);

        let before = shared.load();
        shared.register(CallerEntry::new("10.0.0.*").unwrap().enabled(true));
        let after = shared.load();

        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 2);
        assert_eq!(after.entries()[0].ip(), "10.0.0.*");
        assert_eq!(before.find_by_ip("10.0.0.1").ip(), "*.*.*.*");
        assert_eq!(after.find_by_ip("10.0.0.1").ip(), "10.0.0.*");
    }

    #[test]
    fn test_rules_gauge_follows_mutations() {
        let recorder = GaugeRecorder::default();
        ::metrics::with_local_recorder(&recorder, || {
            let mut registry = CallerRegistry::default();
            registry.initialize().unwrap();
            let shared = SharedRegistry::new(registry);
            assert_eq!(recorder.rules(), 1.0);

            shared.register(CallerEntry::new("10.0.0.*").unwrap().enabled(true));
            shared.register(CallerEntry::new("10.0.1.*").unwrap().enabled(true));
            assert_eq!(recorder.rules(), 3.0);

            let mut smaller = CallerRegistry::default();
            smaller.initialize().unwrap();
            shared.store(smaller);
            assert_eq!(recorder.rules(), 1.0);
        });
    }

    #[test]
    fn test_concurrent_register() {
        let mut registry = CallerRegistry::default();
        registry.initialize().unwrap();
        let shared = Arc::new(SharedRegistry::new(registry));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let ip = format!("10.0.{}.*", i);
                    shared.register(CallerEntry::new(&ip).unwrap().enabled(true));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let snapshot = shared.load();
        assert_eq!(snapshot.len(), 9);
        assert_eq!(snapshot.entries().last().unwrap().ip(), "*.*.*.*");
    }
}
