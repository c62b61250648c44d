use crate::Stats;
use crate::error::ConfigError;
use crate::sequence::{Destructor, Sequence};
use builder::KeyEq;
use entry::Entry;
use log::trace;
use stats::Counters;
use std::cell::Cell;
use std::convert::Infallible;
use std::fmt;
use std::time::Instant;

pub(crate) mod builder;
mod entry;
pub(crate) mod stats;

pub use builder::CacheBuilder;

type Generator<K, V, E> = Box<dyn FnMut(&K) -> Result<V, E>>;

/// Fixed-capacity memoizer that computes values on a miss and evicts in insertion order.
///
/// Entries are kept oldest first. A hit returns the stored value and never moves the entry, so
/// the cache is a FIFO window rather than an LRU: once the cache is full, a miss always evicts
/// the entry that was inserted first, no matter how often it was read since.
///
/// Lookups scan the resident entries with the configured key comparison, which makes the cache a
/// good fit for small capacities and keys that cannot be hashed.
///
/// # Examples
///
/// ```rust
/// use ringcache::BoundedCache;
///
/// let mut cache = BoundedCache::new(2, |key: &u64| key * key);
///
/// assert_eq!(*cache.get(3), 9);
/// assert_eq!(*cache.get(4), 16);
/// // evicts 3, the oldest entry
/// assert_eq!(*cache.get(5), 25);
/// assert!(!cache.contains(&3));
/// ```
pub struct BoundedCache<K, V, E = Infallible> {
    capacity: usize,
    entries: Sequence<Entry<K, V>>,
    key_eq: KeyEq<K>,
    generator: Generator<K, V, E>,
    release: Option<Destructor<Entry<K, V>>>,
    counters: Counters,
    metrics_last_accessed: Cell<Instant>,
}

impl<K, V> BoundedCache<K, V, Infallible>
where
    K: PartialEq + 'static,
    V: 'static,
{
    /// Creates a cache holding at most `capacity` entries. Keys are compared with `==` and
    /// missing values are computed by `generator`.
    ///
    /// ## Panics
    /// Panics if `capacity` is zero. Use [`BoundedCache::try_new`] to handle that case.
    pub fn new<G>(capacity: usize, generator: G) -> BoundedCache<K, V>
    where
        G: FnMut(&K) -> V + 'static,
    {
        CacheBuilder::new(capacity).build(generator)
    }

    pub fn try_new<G>(capacity: usize, generator: G) -> Result<BoundedCache<K, V>, ConfigError>
    where
        G: FnMut(&K) -> V + 'static,
    {
        CacheBuilder::new(capacity).try_build(generator)
    }
}

impl<K, V, E> BoundedCache<K, V, E>
where
    K: 'static,
    V: 'static,
{
    pub(crate) fn from_parts(
        capacity: usize,
        key_eq: KeyEq<K>,
        generator: Generator<K, V, E>,
        key_destructor: Option<Destructor<K>>,
        value_destructor: Option<Destructor<V>>,
    ) -> Self {
        let release = entry::entry_destructor(key_destructor, value_destructor);

        // one extra slot so a full window never grows the buffer
        let entries = Sequence::from_parts(capacity.saturating_add(1), release.clone());

        Self {
            capacity,
            entries,
            key_eq,
            generator,
            release,
            counters: Counters::default(),
            metrics_last_accessed: Cell::new(Instant::now()),
        }
    }
}

impl<K, V> BoundedCache<K, V, Infallible> {
    /// Returns the value for `key`, computing and inserting it on a miss.
    ///
    /// A hit leaves the entry where it is. A miss on a full cache evicts the oldest entry before
    /// the new one is appended.
    pub fn get(&mut self, key: K) -> &V {
        match self.try_get(key) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }
}

impl<K, V, E> BoundedCache<K, V, E> {
    /// Returns the value for `key`, computing and inserting it on a miss.
    ///
    /// If the generator fails, the error is returned unchanged and the cache is left as it was:
    /// nothing is evicted and nothing is inserted.
    pub fn try_get(&mut self, key: K) -> Result<&V, E> {
        let index = match self.position(&key) {
            Some(index) => {
                self.counters.increment_hit_count();
                index
            }
            None => {
                self.counters.increment_miss_count();
                trace!("cache miss, generating value");
                let value = (self.generator)(&key)?;

                if self.entries.len() >= self.capacity {
                    self.evict();
                }

                self.entries.enqueue(Entry::new(key, value));
                self.entries.len() - 1
            }
        };

        Ok(self.entries.get(index).value())
    }

    /// Returns `true` if `key` is resident. Does not call the generator or touch the stats.
    pub fn contains(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    /// Resident keys, oldest first.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(Entry::key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the counters collected since the previous call and resets them.
    pub fn stats(&self) -> Stats {
        let millis_elapsed = self.metrics_last_accessed.replace(Instant::now()).elapsed();

        let stats = Stats {
            miss_count: self.counters.miss_count(),
            hit_count: self.counters.hit_count(),
            eviction_count: self.counters.eviction_count(),
            millis_elapsed: millis_elapsed.as_millis(),
        };
        self.counters.reset();

        stats
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.entries
            .index_of(key, |entry: &Entry<K, V>, key: &K| (self.key_eq)(entry.key(), key))
    }

    fn evict(&mut self) {
        if let Some(entry) = self.entries.dequeue() {
            trace!("cache full at {} entries, evicting oldest", self.capacity);
            self.counters.increment_eviction_count();
            if let Some(release) = &self.release {
                release(entry);
            }
        }
    }
}

impl<K, V, E> fmt::Debug for BoundedCache<K, V, E>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedCache")
            .field("capacity", &self.capacity)
            .field("keys", &self.keys().collect::<Vec<_>>())
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;

    type Calls = Rc<RefCell<HashMap<u32, u32>>>;

    fn counting_cache(capacity: usize) -> (BoundedCache<u32, &'static str>, Calls) {
        let calls: Calls = Rc::default();
        let counter = Rc::clone(&calls);
        let cache = BoundedCache::new(capacity, move |key: &u32| {
            *counter.borrow_mut().entry(*key).or_default() += 1;
            match key {
                0 => "zero",
                1 => "one",
                2 => "two",
                3 => "three",
                4 => "four",
                5 => "five",
                _ => panic!("no value for key {key}"),
            }
        });
        (cache, calls)
    }

    fn call_counts(calls: &Calls) -> [u32; 6] {
        let calls = calls.borrow();
        std::array::from_fn(|key| calls.get(&(key as u32)).copied().unwrap_or(0))
    }

    #[test]
    fn it_evicts_in_insertion_order_not_recency() {
        // given
        let (mut cache, calls) = counting_cache(4);

        // (key, expected value, generator calls per key after the lookup)
        let steps: [(u32, &str, [u32; 6]); 35] = [
            // {0, N, N, N}
            (0, "zero", [1, 0, 0, 0, 0, 0]),
            (0, "zero", [1, 0, 0, 0, 0, 0]),
            // {0, 1, N, N}
            (1, "one", [1, 1, 0, 0, 0, 0]),
            (1, "one", [1, 1, 0, 0, 0, 0]),
            (0, "zero", [1, 1, 0, 0, 0, 0]),
            (1, "one", [1, 1, 0, 0, 0, 0]),
            // {0, 1, 2, N}
            (2, "two", [1, 1, 1, 0, 0, 0]),
            (2, "two", [1, 1, 1, 0, 0, 0]),
            (0, "zero", [1, 1, 1, 0, 0, 0]),
            (1, "one", [1, 1, 1, 0, 0, 0]),
            (2, "two", [1, 1, 1, 0, 0, 0]),
            // {0, 1, 2, 3}
            (3, "three", [1, 1, 1, 1, 0, 0]),
            (3, "three", [1, 1, 1, 1, 0, 0]),
            (0, "zero", [1, 1, 1, 1, 0, 0]),
            (1, "one", [1, 1, 1, 1, 0, 0]),
            (2, "two", [1, 1, 1, 1, 0, 0]),
            (3, "three", [1, 1, 1, 1, 0, 0]),
            // {1, 2, 3, 4}
            (4, "four", [1, 1, 1, 1, 1, 0]),
            (4, "four", [1, 1, 1, 1, 1, 0]),
            // {2, 3, 4, 0}
            (0, "zero", [2, 1, 1, 1, 1, 0]),
            (2, "two", [2, 1, 1, 1, 1, 0]),
            (3, "three", [2, 1, 1, 1, 1, 0]),
            (4, "four", [2, 1, 1, 1, 1, 0]),
            // {3, 4, 0, 1}
            (1, "one", [2, 2, 1, 1, 1, 0]),
            (1, "one", [2, 2, 1, 1, 1, 0]),
            (3, "three", [2, 2, 1, 1, 1, 0]),
            (4, "four", [2, 2, 1, 1, 1, 0]),
            (0, "zero", [2, 2, 1, 1, 1, 0]),
            // {4, 0, 1, 5}
            (5, "five", [2, 2, 1, 1, 1, 1]),
            (5, "five", [2, 2, 1, 1, 1, 1]),
            (4, "four", [2, 2, 1, 1, 1, 1]),
            (0, "zero", [2, 2, 1, 1, 1, 1]),
            (1, "one", [2, 2, 1, 1, 1, 1]),
            // {0, 1, 5, 2}
            (2, "two", [2, 2, 2, 1, 1, 1]),
            (5, "five", [2, 2, 2, 1, 1, 1]),
        ];

        for (step, (key, expected_value, expected_calls)) in steps.into_iter().enumerate() {
            // when
            let value = *cache.get(key);

            // then
            assert_eq!(value, expected_value, "value at step {step}");
            assert_eq!(call_counts(&calls), expected_calls, "calls at step {step}");
        }

        assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec![0, 1, 5, 2]);
    }

    #[test]
    fn it_does_not_regenerate_resident_keys() {
        // given
        let (mut cache, calls) = counting_cache(2);

        // when
        for _ in 0..10 {
            cache.get(1);
            cache.get(2);
        }

        // then
        assert_eq!(call_counts(&calls), [0, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn it_handles_one_capacity() {
        // given
        let (mut cache, calls) = counting_cache(1);

        // when
        cache.get(0);
        cache.get(1);
        cache.get(0);

        // then
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&0));
        assert!(!cache.contains(&1));
        assert_eq!(call_counts(&calls), [2, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn it_rejects_zero_capacity() {
        // when
        let result = BoundedCache::<u32, u32>::try_new(0, |key| *key);

        // then
        assert_eq!(result.err(), Some(ConfigError::ZeroCacheCapacity));
    }

    #[test]
    fn it_never_grows_its_entry_buffer() {
        // given
        let mut cache = BoundedCache::new(3, |key: &u32| *key);

        // when
        for key in 0..20 {
            cache.get(key);
        }

        // then
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.entries.capacity(), 4);
    }

    #[test]
    fn it_propagates_generator_errors_without_inserting() {
        // given
        let mut cache = CacheBuilder::new(2).build_fallible(|key: &i32| {
            if *key < 0 {
                Err(format!("negative key {key}"))
            } else {
                Ok(key * 10)
            }
        });
        cache.try_get(1).unwrap();
        cache.try_get(2).unwrap();

        // when
        let result = cache.try_get(-1);

        // then
        assert_eq!(result, Err(String::from("negative key -1")));
        assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(cache.stats().eviction_count, 0);
    }

    #[test]
    fn it_is_unchanged_when_the_key_comparison_panics() {
        // given
        let released = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&released);
        let mut cache = CacheBuilder::with_key_eq(2, |stored: &u32, key: &u32| {
            if *key == 9 {
                panic!("cannot compare key {key}");
            }
            stored == key
        })
        .key_destructor(move |key: u32| sink.borrow_mut().push(key))
        .build(|key: &u32| key + 100);
        cache.get(1);
        cache.get(2);

        // when
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            cache.get(9);
        }));

        // then
        assert!(result.is_err());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert!(released.borrow().is_empty());
        let stats = cache.stats();
        assert_eq!(stats.miss_count, 2);
        assert_eq!(stats.eviction_count, 0);
        assert_eq!(*cache.get(2), 102);
    }

    #[test]
    fn it_is_unchanged_when_the_generator_panics() {
        // given
        let (mut cache, calls) = counting_cache(2);
        cache.get(0);
        cache.get(1);

        // when
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            cache.get(9);
        }));

        // then
        assert!(result.is_err());
        assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(cache.stats().eviction_count, 0);
        assert_eq!(call_counts(&calls), [1, 1, 0, 0, 0, 0]);

        // when
        cache.get(2);

        // then
        assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn it_releases_evicted_and_remaining_entries() {
        // given
        let released = Rc::new(RefCell::new(Vec::new()));
        let (keys, values) = (Rc::clone(&released), Rc::clone(&released));
        let mut cache = CacheBuilder::new(2)
            .key_destructor(move |key: u32| keys.borrow_mut().push(format!("k{key}")))
            .value_destructor(move |value: u32| values.borrow_mut().push(format!("v{value}")))
            .build(|key: &u32| key + 100);

        // when
        cache.get(1);
        cache.get(2);
        cache.get(3);

        // then
        assert_eq!(*released.borrow(), vec!["k1", "v101"]);

        // when
        drop(cache);

        // then
        assert_eq!(
            *released.borrow(),
            vec!["k1", "v101", "k2", "v102", "k3", "v103"]
        );
    }

    #[test]
    fn it_returns_and_resets_stats() {
        // given
        let (mut cache, _calls) = counting_cache(2);

        // when
        cache.get(0);
        cache.get(0);
        cache.get(1);
        cache.get(2);
        cache.get(1);

        // then
        let stats = cache.stats();
        assert_eq!(stats.hit_count, 2);
        assert_eq!(stats.miss_count, 3);
        assert_eq!(stats.eviction_count, 1);

        let stats = cache.stats();
        assert_eq!(stats.hit_count, 0);
        assert_eq!(stats.miss_count, 0);
        assert_eq!(stats.eviction_count, 0);
    }

    #[test]
    fn it_does_not_count_contains_as_access() {
        // given
        let (mut cache, calls) = counting_cache(2);
        cache.get(3);

        // when
        let resident = cache.contains(&3);
        let missing = cache.contains(&4);

        // then
        assert!(resident);
        assert!(!missing);
        assert_eq!(cache.stats().hit_count, 0);
        assert_eq!(call_counts(&calls), [0, 0, 0, 1, 0, 0]);
    }

    #[test]
    fn it_formats_resident_keys() {
        // given
        let (mut cache, _calls) = counting_cache(2);
        cache.get(1);

        // when
        let formatted = format!("{cache:?}");

        // then
        assert!(formatted.contains("capacity: 2"));
        assert!(formatted.contains("keys: [1]"));
    }
}
