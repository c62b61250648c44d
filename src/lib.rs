//! A growable circular-buffer sequence and a bounded memoization cache built on top of it.
//!
//! # Features
//!
//! - [`Sequence`]: a double-ended, generic list with amortized *O(1)* push and pop at both ends,
//!   logical indexing, in-place stable merge sort, and filter/map/min-max helpers
//! - [`BoundedCache`]: a fixed-capacity key-value memoizer that computes values on a miss and
//!   evicts strictly in insertion order (FIFO, not LRU)
//! - Optional destructor hooks that take ownership of every element a container disposes of
//! - No unsafe code
//!
//! Both containers are single-threaded. Wrap an instance in a mutex of your choice if it has to
//! be shared.
//!
//! # Examples
//!
//! Using a sequence as a queue and as a stack:
//!
//! ```rust
//! use ringcache::Sequence;
//!
//! let mut sequence = Sequence::new();
//! sequence.enqueue("first");
//! sequence.enqueue("second");
//! sequence.push("third");
//!
//! assert_eq!(sequence.dequeue(), Some("first"));
//! assert_eq!(sequence.pop(), Some("third"));
//! assert_eq!(sequence.len(), 1);
//! ```
//!
//! Sorting and searching with closures:
//!
//! ```rust
//! use ringcache::Sequence;
//!
//! let mut sequence = Sequence::from_slice(&[4, 1, 3, 2]);
//! sequence.sort(|a, b| a <= b);
//!
//! assert_eq!(sequence.to_vec(), vec![1, 2, 3, 4]);
//! assert_eq!(sequence.index_of(&3, |stored, needle| stored == needle), Some(2));
//! assert_eq!(sequence.min_max(|candidate, current| candidate > current), Some(&4));
//! ```
//!
//! Memoizing an expensive computation. Reading an entry does not protect it from eviction:
//!
//! ```rust
//! use ringcache::BoundedCache;
//!
//! let mut cache = BoundedCache::new(2, |n: &u64| (1..=*n).product::<u64>());
//!
//! assert_eq!(*cache.get(5), 120);
//! assert_eq!(*cache.get(6), 720);
//! assert_eq!(*cache.get(5), 120);
//!
//! // 5 is still the oldest entry, so it is evicted
//! cache.get(7);
//! assert!(!cache.contains(&5));
//!
//! let stats = cache.stats();
//! assert_eq!(stats.hit_count, 1);
//! assert_eq!(stats.miss_count, 3);
//! assert_eq!(stats.eviction_count, 1);
//! ```

#![forbid(unsafe_code)]
pub mod cache;
pub mod error;
pub mod maybe;
pub mod sequence;

pub use cache::stats::Stats;
pub use cache::{BoundedCache, CacheBuilder};
pub use error::ConfigError;
pub use maybe::Maybe;
pub use sequence::{DEFAULT_CAPACITY, Destructor, Sequence};
