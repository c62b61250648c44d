/// A box that may or may not hold a value, with checked take/set semantics.
///
/// Unlike a bare [`Option`], reading from an empty box or filling a full one is treated as a
/// caller bug and panics. Neither [`Sequence`](crate::Sequence) nor
/// [`BoundedCache`](crate::BoundedCache) uses it; it is offered for wrapping their results.
///
/// # Examples
///
/// ```rust
/// use ringcache::Maybe;
///
/// let mut slot = Maybe::none();
/// slot.set(3);
/// assert_eq!(*slot.get(), 3);
/// assert_eq!(slot.take(), 3);
/// assert!(!slot.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Maybe<T> {
    value: Option<T>,
}

impl<T> Maybe<T> {
    pub fn none() -> Self {
        Self { value: None }
    }

    pub fn some(value: T) -> Self {
        Self { value: Some(value) }
    }

    pub fn is_some(&self) -> bool {
        self.value.is_some()
    }

    /// ## Panics
    /// Panics if the box is empty.
    pub fn get(&self) -> &T {
        match &self.value {
            Some(value) => value,
            None => panic!("called `Maybe::get` on an empty box"),
        }
    }

    /// Moves the value out, leaving the box empty.
    ///
    /// ## Panics
    /// Panics if the box is empty.
    pub fn take(&mut self) -> T {
        match self.value.take() {
            Some(value) => value,
            None => panic!("called `Maybe::take` on an empty box"),
        }
    }

    /// Fills the box.
    ///
    /// ## Panics
    /// Panics if the box already holds a value.
    pub fn set(&mut self, value: T) {
        assert!(
            self.value.is_none(),
            "called `Maybe::set` on a box that already holds a value"
        );
        self.value = Some(value);
    }

    pub fn into_option(self) -> Option<T> {
        self.value
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(value: Option<T>) -> Self {
        Self { value }
    }
}
