use crate::sequence::Destructor;
use std::rc::Rc;

pub(crate) struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

/// Builds the hook that releases an entry through the cache's key and value destructors, key
/// first. Returns [`None`] when neither destructor is set so entries are simply dropped.
pub(crate) fn entry_destructor<K, V>(
    key_destructor: Option<Destructor<K>>,
    value_destructor: Option<Destructor<V>>,
) -> Option<Destructor<Entry<K, V>>>
where
    K: 'static,
    V: 'static,
{
    if key_destructor.is_none() && value_destructor.is_none() {
        return None;
    }

    Some(Rc::new(move |entry: Entry<K, V>| {
        let (key, value) = entry.into_parts();
        if let Some(key_destructor) = &key_destructor {
            key_destructor(key);
        }
        if let Some(value_destructor) = &value_destructor {
            value_destructor(value);
        }
    }))
}
