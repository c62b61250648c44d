use crate::cache::BoundedCache;
use crate::error::ConfigError;
use crate::sequence::Destructor;
use std::convert::Infallible;
use std::rc::Rc;

pub(crate) type KeyEq<K> = Box<dyn Fn(&K, &K) -> bool>;

/// Configures and builds a [`BoundedCache`].
///
/// # Examples
///
/// ```rust
/// use ringcache::CacheBuilder;
///
/// // Keys are compared case-insensitively.
/// let mut cache = CacheBuilder::with_key_eq(2, |stored: &String, key: &String| {
///     stored.eq_ignore_ascii_case(key)
/// })
/// .build(|key: &String| key.len());
///
/// assert_eq!(*cache.get("Hello".to_string()), 5);
/// assert_eq!(*cache.get("HELLO".to_string()), 5);
/// assert_eq!(cache.len(), 1);
/// ```
pub struct CacheBuilder<K, V> {
    capacity: usize,
    key_eq: KeyEq<K>,
    key_destructor: Option<Destructor<K>>,
    value_destructor: Option<Destructor<V>>,
}

impl<K, V> CacheBuilder<K, V>
where
    K: PartialEq + 'static,
    V: 'static,
{
    /// Starts a builder for a cache holding at most `capacity` entries whose keys are compared
    /// with `==`.
    pub fn new(capacity: usize) -> Self {
        Self::with_key_eq(capacity, |stored: &K, key: &K| stored == key)
    }
}

impl<K, V> CacheBuilder<K, V>
where
    K: 'static,
    V: 'static,
{
    /// Starts a builder whose keys are compared with `key_eq(stored_key, queried_key)`.
    ///
    /// Any context the comparison needs is captured by the closure.
    pub fn with_key_eq<F>(capacity: usize, key_eq: F) -> Self
    where
        F: Fn(&K, &K) -> bool + 'static,
    {
        Self {
            capacity,
            key_eq: Box::new(key_eq),
            key_destructor: None,
            value_destructor: None,
        }
    }

    /// Replaces the key comparison.
    pub fn key_eq<F>(mut self, key_eq: F) -> Self
    where
        F: Fn(&K, &K) -> bool + 'static,
    {
        self.key_eq = Box::new(key_eq);
        self
    }

    /// Hands the key of every evicted or dropped entry to `destructor`.
    pub fn key_destructor<D>(mut self, destructor: D) -> Self
    where
        D: Fn(K) + 'static,
    {
        self.key_destructor = Some(Rc::new(destructor));
        self
    }

    /// Hands the value of every evicted or dropped entry to `destructor`.
    pub fn value_destructor<D>(mut self, destructor: D) -> Self
    where
        D: Fn(V) + 'static,
    {
        self.value_destructor = Some(Rc::new(destructor));
        self
    }

    /// Builds a cache that computes missing values with `generator`.
    ///
    /// ## Panics
    /// Panics if the capacity is zero. Use [`CacheBuilder::try_build`] to handle that case.
    pub fn build<G>(self, generator: G) -> BoundedCache<K, V>
    where
        G: FnMut(&K) -> V + 'static,
    {
        match self.try_build(generator) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_build<G>(self, mut generator: G) -> Result<BoundedCache<K, V>, ConfigError>
    where
        G: FnMut(&K) -> V + 'static,
    {
        self.try_build_fallible(move |key: &K| Ok::<V, Infallible>(generator(key)))
    }

    /// Builds a cache whose generator may fail. Failures surface from
    /// [`BoundedCache::try_get`].
    ///
    /// ## Panics
    /// Panics if the capacity is zero.
    pub fn build_fallible<E, G>(self, generator: G) -> BoundedCache<K, V, E>
    where
        G: FnMut(&K) -> Result<V, E> + 'static,
    {
        match self.try_build_fallible(generator) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_build_fallible<E, G>(
        self,
        generator: G,
    ) -> Result<BoundedCache<K, V, E>, ConfigError>
    where
        G: FnMut(&K) -> Result<V, E> + 'static,
    {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCacheCapacity);
        }

        Ok(BoundedCache::from_parts(
            self.capacity,
            self.key_eq,
            Box::new(generator),
            self.key_destructor,
            self.value_destructor,
        ))
    }
}
