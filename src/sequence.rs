use crate::error::ConfigError;
use log::trace;
use std::cmp;
use std::fmt;
use std::ops::{ControlFlow, Index, IndexMut};
use std::rc::Rc;

mod iter;
mod sort;

pub use iter::{IntoIter, Iter};

/// Number of slots a sequence allocates when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 16;

/// Cleanup hook that takes ownership of every element a [`Sequence`] disposes of.
///
/// The hook runs for elements the sequence discards on its own ([`Sequence::remove`],
/// [`Sequence::clear`], [`Sequence::truncate`] and dropping the sequence). Popped elements are
/// moved to the caller and never reach the hook.
pub type Destructor<T> = Rc<dyn Fn(T)>;

/// A growable double-ended sequence backed by a circular buffer.
///
/// Pushing and popping at either end is amortized *O(1)*. One slot of the buffer is always kept
/// unused so that an empty sequence (`head == tail`) can be told apart from a full one. When an
/// insertion would make `head` and `tail` collide, the buffer grows to `ceil(capacity * 1.5)`
/// slots and the live elements are moved to the start of the new buffer in logical order.
///
/// Elements are addressed by their *logical index*, the 0-based position counted from the
/// front, independent of where they live in the buffer.
///
/// The destructor hook is held in an [`Rc`], so `Sequence<T>` is `!Send` and `!Sync` whatever
/// `T` is. A sequence stays on the thread that created it.
///
/// # Examples
///
/// ```rust
/// use ringcache::Sequence;
///
/// let mut sequence = Sequence::new();
/// sequence.push_back(2);
/// sequence.push_back(3);
/// sequence.push_front(1);
///
/// assert_eq!(sequence.len(), 3);
/// assert_eq!(sequence[0], 1);
/// assert_eq!(sequence.pop_back(), Some(3));
/// assert_eq!(sequence.dequeue(), Some(1));
/// ```
pub struct Sequence<T> {
    head: usize,
    tail: usize,
    buffer: Vec<Option<T>>,
    destructor: Option<Destructor<T>>,
}

impl<T> Sequence<T> {
    /// Creates an empty sequence with [`DEFAULT_CAPACITY`] slots.
    pub fn new() -> Sequence<T> {
        Sequence::from_parts(DEFAULT_CAPACITY, None)
    }

    /// Creates an empty sequence with `capacity` slots.
    ///
    /// ## Panics
    /// Panics if `capacity` is zero. Use [`Sequence::try_with_capacity`] to handle that case.
    pub fn with_capacity(capacity: usize) -> Sequence<T> {
        match Sequence::try_with_capacity(capacity) {
            Ok(sequence) => sequence,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates an empty sequence with `capacity` slots, failing if `capacity` is zero.
    pub fn try_with_capacity(capacity: usize) -> Result<Sequence<T>, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroSequenceCapacity);
        }
        Ok(Sequence::from_parts(capacity, None))
    }

    /// Creates an empty sequence that hands every element it disposes of to `destructor`.
    pub fn with_destructor<D>(destructor: D) -> Sequence<T>
    where
        D: Fn(T) + 'static,
    {
        Sequence::from_parts(DEFAULT_CAPACITY, Some(Rc::new(destructor)))
    }

    /// Combination of [`Sequence::with_capacity`] and [`Sequence::with_destructor`].
    ///
    /// ## Panics
    /// Panics if `capacity` is zero. Use [`Sequence::try_with_capacity_and_destructor`] to handle
    /// that case.
    pub fn with_capacity_and_destructor<D>(capacity: usize, destructor: D) -> Sequence<T>
    where
        D: Fn(T) + 'static,
    {
        match Sequence::try_with_capacity_and_destructor(capacity, destructor) {
            Ok(sequence) => sequence,
            Err(err) => panic!("{err}"),
        }
    }

    /// Combination of [`Sequence::try_with_capacity`] and [`Sequence::with_destructor`].
    pub fn try_with_capacity_and_destructor<D>(
        capacity: usize,
        destructor: D,
    ) -> Result<Sequence<T>, ConfigError>
    where
        D: Fn(T) + 'static,
    {
        if capacity == 0 {
            return Err(ConfigError::ZeroSequenceCapacity);
        }
        Ok(Sequence::from_parts(capacity, Some(Rc::new(destructor))))
    }

    pub(crate) fn from_parts(capacity: usize, destructor: Option<Destructor<T>>) -> Sequence<T> {
        let mut buffer = Vec::with_capacity(capacity);
        buffer.resize_with(capacity, || None);
        Sequence {
            head: 0,
            tail: 0,
            buffer,
            destructor,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn len(&self) -> usize {
        self.wrap_sub(self.tail, self.head)
    }

    /// Number of allocated slots. A sequence holds at most `capacity() - 1` elements before it
    /// grows.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    fn is_full(&self) -> bool {
        self.wrap_add(self.tail, 1) == self.head
    }

    /// Adds an element to the back of the sequence, growing the buffer first if needed.
    pub fn push_back(&mut self, value: T) {
        if self.is_full() {
            self.grow();
        }

        // capacity     - - - - - -
        // head           |
        // tail                 |
        //             [N S S S N N ]
        self.buffer[self.tail] = Some(value);
        self.tail = self.wrap_add(self.tail, 1);
        //             [N S S S S N ]
    }

    /// Adds an element to the front of the sequence, growing the buffer first if needed.
    pub fn push_front(&mut self, value: T) {
        if self.is_full() {
            self.grow();
        }

        self.head = self.wrap_sub(self.head, 1);
        self.buffer[self.head] = Some(value);
    }

    /// Removes the last element and returns it, or [`None`] if the sequence is empty.
    ///
    /// Ownership moves to the caller, so the destructor does not run.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        self.tail = self.wrap_sub(self.tail, 1);
        self.buffer[self.tail].take()
    }

    /// Removes the first element and returns it, or [`None`] if the sequence is empty.
    ///
    /// Ownership moves to the caller, so the destructor does not run.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let value = self.buffer[self.head].take();
        self.head = self.wrap_add(self.head, 1);
        value
    }

    /// Alias for [`Sequence::push_back`] when used as a stack.
    pub fn push(&mut self, value: T) {
        self.push_back(value);
    }

    /// Alias for [`Sequence::pop_back`] when used as a stack.
    pub fn pop(&mut self) -> Option<T> {
        self.pop_back()
    }

    /// Alias for [`Sequence::push_back`] when used as a queue.
    pub fn enqueue(&mut self, value: T) {
        self.push_back(value);
    }

    /// Alias for [`Sequence::pop_front`] when used as a queue.
    pub fn dequeue(&mut self) -> Option<T> {
        self.pop_front()
    }

    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            None
        } else {
            Some(self.slot(self.head))
        }
    }

    pub fn back(&self) -> Option<&T> {
        if self.is_empty() {
            None
        } else {
            Some(self.slot(self.wrap_sub(self.tail, 1)))
        }
    }

    /// Swaps the elements at logical indices `a` and `b`.
    ///
    /// ## Panics
    /// Panics if either index is out of bounds.
    pub fn swap(&mut self, a: usize, b: usize) {
        let len = self.len();
        assert!(
            a < len && b < len,
            "swap indices ({a}, {b}) out of bounds for sequence of length {len}"
        );

        let (a, b) = (self.physical_index(a), self.physical_index(b));
        self.buffer.swap(a, b);
    }

    /// Returns the logical index of the first element for which `equal(element, needle)` holds.
    pub fn index_of<N, F>(&self, needle: &N, mut equal: F) -> Option<usize>
    where
        N: ?Sized,
        F: FnMut(&T, &N) -> bool,
    {
        self.iter().position(|element| equal(element, needle))
    }

    /// Returns a reference to the element at logical index `index`.
    ///
    /// ## Panics
    /// Panics if `index` is out of bounds.
    pub fn get(&self, index: usize) -> &T {
        self.check_index(index);
        self.slot(self.physical_index(index))
    }

    /// Returns a mutable reference to the element at logical index `index`.
    ///
    /// ## Panics
    /// Panics if `index` is out of bounds.
    pub fn get_mut(&mut self, index: usize) -> &mut T {
        self.check_index(index);
        let physical_idx = self.physical_index(index);
        self.buffer[physical_idx]
            .as_mut()
            .expect("slots between head and tail are always occupied")
    }

    /// Removes the element at logical index `index` and hands it to the destructor.
    ///
    /// Every following element moves one slot toward the front, so relative order is kept.
    ///
    /// ## Panics
    /// Panics if `index` is out of bounds. A panic raised by the destructor surfaces after the
    /// element has left the sequence.
    pub fn remove(&mut self, index: usize) {
        self.check_index(index);

        let mut idx = self.physical_index(index);
        let removed = self.buffer[idx].take();

        // head               |
        // tail         |
        // removed                 |
        //             [N N N S S S S ]
        loop {
            let next = self.wrap_add(idx, 1);
            if next == self.tail {
                break;
            }
            self.buffer[idx] = self.buffer[next].take();
            idx = next;
        }
        //             [N N N S S S N ]
        self.tail = idx;

        if let Some(removed) = removed {
            self.dispose(removed);
        }
    }

    /// Inserts `value` so that it ends up at logical index `index`.
    ///
    /// Elements at and after `index` move one slot toward the back. An `index` at or past the
    /// end appends the value, exactly like [`Sequence::push_back`].
    pub fn insert(&mut self, index: usize, value: T) {
        if index >= self.len() {
            self.push_back(value);
            return;
        }

        if self.is_full() {
            self.grow();
        }

        let target = self.physical_index(index);
        let mut idx = self.tail;
        while idx != target {
            let prev = self.wrap_sub(idx, 1);
            self.buffer[idx] = self.buffer[prev].take();
            idx = prev;
        }

        self.buffer[target] = Some(value);
        self.tail = self.wrap_add(self.tail, 1);
    }

    /// Visits the elements front to back until `visitor` returns [`ControlFlow::Break`].
    ///
    /// Returns [`ControlFlow::Break`] if the visitor stopped the iteration early.
    pub fn iterate<F>(&self, visitor: F) -> ControlFlow<()>
    where
        F: FnMut(&T) -> ControlFlow<()>,
    {
        self.iter().try_for_each(visitor)
    }

    /// Returns a new sequence that owns clones of the elements matching `predicate`, in their
    /// original order. The new sequence shares this sequence's destructor.
    pub fn filter<P>(&self, mut predicate: P) -> Sequence<T>
    where
        T: Clone,
        P: FnMut(&T) -> bool,
    {
        let mut filtered = Sequence::from_parts(DEFAULT_CAPACITY, self.destructor.clone());
        for element in self.iter() {
            if predicate(element) {
                filtered.push_back(element.clone());
            }
        }
        filtered
    }

    /// Returns a new sequence holding `f(element)` for every element, in order.
    pub fn map<U, F>(&self, f: F) -> Sequence<U>
    where
        F: FnMut(&T) -> U,
    {
        self.map_into(None, f)
    }

    /// Like [`Sequence::map`], but the new sequence hands disposed elements to `destructor`.
    pub fn map_with_destructor<U, D, F>(&self, destructor: D, f: F) -> Sequence<U>
    where
        D: Fn(U) + 'static,
        F: FnMut(&T) -> U,
    {
        self.map_into(Some(Rc::new(destructor)), f)
    }

    fn map_into<U, F>(&self, destructor: Option<Destructor<U>>, mut f: F) -> Sequence<U>
    where
        F: FnMut(&T) -> U,
    {
        let mut mapped = Sequence::from_parts(DEFAULT_CAPACITY, destructor);
        for element in self.iter() {
            mapped.push_back(f(element));
        }
        mapped
    }

    /// Folds the sequence front to back, starting with the first element as the current extreme.
    ///
    /// `replaces(candidate, current)` returns `true` if `candidate` should become the new extreme.
    /// Pass a "less than" closure to find the minimum and a "greater than" closure for the maximum.
    /// Returns [`None`] for an empty sequence.
    pub fn min_max<F>(&self, mut replaces: F) -> Option<&T>
    where
        F: FnMut(&T, &T) -> bool,
    {
        let mut elements = self.iter();
        let mut extreme = elements.next()?;
        for candidate in elements {
            if replaces(candidate, extreme) {
                extreme = candidate;
            }
        }
        Some(extreme)
    }

    /// Sorts the sequence in place with a stable merge sort.
    ///
    /// `before(a, b)` returns `true` if `a` sorts at or before `b`. Takes *O(n log(n))* time and
    /// *O(n)* extra space. Afterwards the elements start at slot 0 of the buffer.
    ///
    /// The comparator only ever sees the elements in place. If it panics, the sequence keeps
    /// every element in its previous order.
    pub fn sort<F>(&mut self, mut before: F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        let len = self.len();
        if len < 2 {
            return;
        }

        let indices: Vec<usize> = (0..len).collect();
        let order = sort::merge_sort(indices, &mut |a: &usize, b: &usize| {
            before(self.get(*a), self.get(*b))
        });

        let mut elements = Vec::with_capacity(len);
        while let Some(element) = self.pop_front() {
            elements.push(Some(element));
        }

        self.head = 0;
        self.tail = 0;
        for idx in order {
            self.buffer[self.tail] = elements[idx].take();
            self.tail += 1;
        }
    }

    /// Copies the elements into a contiguous vector in logical order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Removes every element, handing each to the destructor front to back.
    ///
    /// If the destructor panics, the elements behind the one it was handed stay in the sequence.
    pub fn clear(&mut self) {
        while let Some(element) = self.pop_front() {
            self.dispose(element);
        }
        self.head = 0;
        self.tail = 0;
    }

    /// Shortens the sequence to `len` elements, disposing of the ones removed from the back.
    pub fn truncate(&mut self, len: usize) {
        while self.len() > len {
            if let Some(element) = self.pop_back() {
                self.dispose(element);
            }
        }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    fn grow(&mut self) {
        let old_capacity = self.buffer.len();
        let new_capacity = old_capacity + old_capacity.div_ceil(2);
        trace!("growing sequence from {old_capacity} to {new_capacity} slots");

        let mut buffer = Vec::with_capacity(new_capacity);
        let mut idx = self.head;
        while idx != self.tail {
            buffer.push(self.buffer[idx].take());
            idx = self.wrap_add(idx, 1);
        }

        let len = buffer.len();
        buffer.resize_with(new_capacity, || None);

        self.buffer = buffer;
        self.head = 0;
        self.tail = len;
    }

    fn dispose(&self, element: T) {
        match &self.destructor {
            Some(destructor) => destructor(element),
            None => drop(element),
        }
    }

    fn check_index(&self, index: usize) {
        let len = self.len();
        assert!(
            index < len,
            "index {index} out of bounds for sequence of length {len}"
        );
    }

    fn slot(&self, physical_idx: usize) -> &T {
        self.buffer[physical_idx]
            .as_ref()
            .expect("slots between head and tail are always occupied")
    }

    fn physical_index(&self, index: usize) -> usize {
        self.wrap_add(self.head, index)
    }

    fn wrap_add(&self, idx: usize, addend: usize) -> usize {
        let capacity = self.buffer.len();
        let idx = idx.wrapping_add(addend);
        if idx >= capacity { idx - capacity } else { idx }
    }

    fn wrap_sub(&self, idx: usize, subtrahend: usize) -> usize {
        if idx >= subtrahend {
            idx - subtrahend
        } else {
            idx + self.buffer.len() - subtrahend
        }
    }
}

impl<T: Clone> Sequence<T> {
    /// Creates a sequence holding clones of `elements`, in order.
    pub fn from_slice(elements: &[T]) -> Sequence<T> {
        elements.iter().cloned().collect()
    }
}

impl<T> Drop for Sequence<T> {
    fn drop(&mut self) {
        if self.destructor.is_some() {
            self.clear();
        }
    }
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Sequence::new()
    }
}

impl<T: Clone> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        let mut cloned = Sequence::from_parts(self.capacity(), self.destructor.clone());
        cloned.extend(self.iter().cloned());
        cloned
    }
}

impl<T: fmt::Debug> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for Sequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for Sequence<T> {}

impl<T> Index<usize> for Sequence<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.get(index)
    }
}

impl<T> IndexMut<usize> for Sequence<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.get_mut(index)
    }
}

impl<T> Extend<T> for Sequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.push_back(element);
        }
    }
}

impl<T> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let capacity = cmp::max(lower.saturating_add(1), DEFAULT_CAPACITY);
        let mut sequence = Sequence::from_parts(capacity, None);
        sequence.extend(iter);
        sequence
    }
}

impl<T> From<Vec<T>> for Sequence<T> {
    fn from(elements: Vec<T>) -> Self {
        elements.into_iter().collect()
    }
}

impl<T> IntoIterator for Sequence<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter::new(self)
    }
}

impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
