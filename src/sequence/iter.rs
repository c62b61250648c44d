use crate::sequence::Sequence;
use std::iter::FusedIterator;

/// Borrowing iterator over a [`Sequence`], front to back.
#[derive(Debug)]
pub struct Iter<'a, T> {
    sequence: &'a Sequence<T>,
    front: usize,
    back: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new(sequence: &'a Sequence<T>) -> Self {
        Self {
            sequence,
            front: 0,
            back: sequence.len(),
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            sequence: self.sequence,
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }

        let physical_idx = self.sequence.physical_index(self.front);
        self.front += 1;
        Some(self.sequence.slot(physical_idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }

        self.back -= 1;
        let physical_idx = self.sequence.physical_index(self.back);
        Some(self.sequence.slot(physical_idx))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Owning iterator over a [`Sequence`], front to back.
///
/// Elements that are not consumed are disposed of by the sequence's destructor when the iterator
/// is dropped.
#[derive(Debug)]
pub struct IntoIter<T> {
    sequence: Sequence<T>,
}

impl<T> IntoIter<T> {
    pub(super) fn new(sequence: Sequence<T>) -> Self {
        Self { sequence }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.sequence.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.sequence.len();
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.sequence.pop_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}
