//! The metric registry: one published generation, swapped as a whole.
//!
//! A collection cycle builds a [`Generation`] off to the side and hands it to
//! [`MetricRegistry::publish`]. Readers take an `Arc` to the current
//! generation, so an exposition request sees either the previous cycle's
//! samples or this cycle's, never a mix and never an empty intermediate.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bdx_types::{MetricFamily, MetricSample};
use parking_lot::RwLock;

/// The complete sample set of one cycle, grouped by family.
///
/// Every family is present, possibly with no samples, so publishing a
/// generation always resets families whose sources failed. Within a family
/// a label set appears at most once; a later sample with the same labels
/// replaces the earlier one.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    families: BTreeMap<MetricFamily, Vec<MetricSample>>,
}

impl Default for Generation {
    fn default() -> Self {
        Self {
            families: MetricFamily::ALL
                .into_iter()
                .map(|family| (family, Vec::new()))
                .collect(),
        }
    }
}

impl Generation {
    /// An empty generation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample under its own family.
    ///
    /// Returns `true` when a sample with the same label set was replaced.
    pub fn push(&mut self, sample: MetricSample) -> bool {
        debug_assert!(
            sample.has_schema_labels(),
            "{} sample with labels {:?}",
            sample.family,
            sample.labels
        );
        let samples = self.families.entry(sample.family).or_default();
        match samples.iter_mut().find(|s| s.labels == sample.labels) {
            Some(existing) => {
                *existing = sample;
                true
            }
            None => {
                samples.push(sample);
                false
            }
        }
    }

    /// Samples of one family, in insertion order.
    pub fn samples(&self, family: MetricFamily) -> &[MetricSample] {
        self.families
            .get(&family)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Families and their samples in exposition order.
    pub fn iter(&self) -> impl Iterator<Item = (MetricFamily, &[MetricSample])> {
        self.families.iter().map(|(f, s)| (*f, s.as_slice()))
    }

    /// Total number of samples across families.
    pub fn len(&self) -> usize {
        self.families.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Extend<MetricSample> for Generation {
    fn extend<I: IntoIterator<Item = MetricSample>>(&mut self, iter: I) {
        for sample in iter {
            self.push(sample);
        }
    }
}

impl FromIterator<MetricSample> for Generation {
    fn from_iter<I: IntoIterator<Item = MetricSample>>(iter: I) -> Self {
        let mut generation = Generation::new();
        generation.extend(iter);
        generation
    }
}

#[derive(Debug)]
struct Inner {
    current: RwLock<Arc<Generation>>,
    published: AtomicU64,
}

/// A registry value owned by the collector and shared with the server.
///
/// Cloning is cheap and yields a handle to the same registry. Separate
/// registries are fully isolated from each other.
#[derive(Debug, Clone)]
pub struct MetricRegistry {
    inner: Arc<Inner>,
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricRegistry {
    /// A registry whose current generation is empty.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                current: RwLock::new(Arc::new(Generation::new())),
                published: AtomicU64::new(0),
            }),
        }
    }

    /// Replace the current generation in a single write.
    pub fn publish(&self, generation: Generation) {
        let next = Arc::new(generation);
        *self.inner.current.write() = next;
        self.inner.published.fetch_add(1, Ordering::Release);
    }

    /// The current generation.
    pub fn snapshot(&self) -> Arc<Generation> {
        self.inner.current.read().clone()
    }

    /// Number of generations published so far.
    pub fn published(&self) -> u64 {
        self.inner.published.load(Ordering::Acquire)
    }
}
