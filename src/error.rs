use thiserror::Error;

/// Error returned by the fallible constructors when a configuration parameter is invalid.
///
/// The panicking constructors ([`Sequence::with_capacity`](crate::Sequence::with_capacity),
/// [`BoundedCache::new`](crate::BoundedCache::new), ...) panic with the same message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("sequence capacity must be at least 1")]
    ZeroSequenceCapacity,
    #[error("cache capacity must be at least 1")]
    ZeroCacheCapacity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_names_the_parameter_in_the_message() {
        // when
        let sequence_err = ConfigError::ZeroSequenceCapacity.to_string();
        let cache_err = ConfigError::ZeroCacheCapacity.to_string();

        // then
        assert!(sequence_err.contains("sequence capacity"));
        assert!(cache_err.contains("cache capacity"));
    }
}
