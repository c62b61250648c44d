/// Stable top-down merge sort over owned elements.
///
/// `before(a, b)` returns `true` if `a` sorts at or before `b`. On ties the element from the left
/// half is taken first, which keeps equal elements in their original order.
pub(super) fn merge_sort<T, F>(mut elements: Vec<T>, before: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> bool,
{
    match elements.len() {
        0 | 1 => elements,
        2 => {
            if !before(&elements[0], &elements[1]) {
                elements.swap(0, 1);
            }
            elements
        }
        len => {
            let right = elements.split_off(len / 2);
            let left = merge_sort(elements, before);
            let right = merge_sort(right, before);
            merge(left, right, before)
        }
    }
}

fn merge<T, F>(left: Vec<T>, right: Vec<T>, before: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> bool,
{
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => before(l, r),
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };

        let next = if take_left { left.next() } else { right.next() };
        merged.extend(next);
    }

    merged
}
