use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr::NonNull;

cfg_if::cfg_if! {
    if #[cfg(feature = "no-std")] {
        use alloc::boxed::Box;
    } else {
        use std::boxed::Box;
    }
}

pub type ForwardListResult<T> = Result<T, ForwardListError>;

/// the ways a positional operation on a `ForwardList` can be rejected. a
/// rejected operation never modifies the list.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ForwardListError {
    /// the cursor is past the end, there is no node to splice after
    PastTheEnd,
    /// the cursor is on the last node, there is nothing after it to erase
    NoSuccessor,
}

impl fmt::Display for ForwardListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PastTheEnd => f.write_str("cursor is past the end of the list"),
            Self::NoSuccessor => f.write_str("no node follows the cursor"),
        }
    }
}

#[cfg(not(feature = "no-std"))]
impl std::error::Error for ForwardListError {}

type Link<T> = Option<NonNull<ForwardListNode<T>>>;

/// a heap-allocated, singly-linked list. the list owns a sentinel node that
/// sits before the first element so inserting or erasing at the front is the
/// same operation as inserting or erasing after any other node.
pub struct ForwardList<T> {
    /// a sentinel node that always exists, even in empty lists
    sentinel: NonNull<ForwardListNode<T>>,
    /// the number of non-sentinel elements in the list
    len: usize,
    marker: PhantomData<Box<ForwardListNode<T>>>,
}

impl<T> ForwardList<T> {
    /// create a new, empty ForwardList
    pub fn new() -> Self {
        let sentinel = Box::new(ForwardListNode::Sentinel { next: None });
        Self {
            sentinel: NonNull::from(Box::leak(sentinel)),
            len: 0,
            marker: PhantomData,
        }
    }

    /// get the length of the list, not including the sentinel node
    pub fn len(&self) -> usize {
        self.len
    }

    /// returns true if the length of the list is 0
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// immutably borrow the first element, or None if the list is empty
    pub fn front(&self) -> Option<&T> {
        // SAFETY: linked nodes are owned by `self` and outlive the borrow
        self.head()
            .and_then(|node| unsafe { (*node.as_ptr()).data() })
    }

    /// mutably borrow the first element, or None if the list is empty
    pub fn front_mut(&mut self) -> Option<&mut T> {
        // SAFETY: linked nodes are owned by `self` and `&mut self` is exclusive
        self.head()
            .and_then(|node| unsafe { (*node.as_ptr()).data_mut() })
    }

    /// push a value to the front of this list
    pub fn push_front(&mut self, value: T) {
        // SAFETY: the sentinel is always a valid position in its own list
        unsafe { self.link_after(self.sentinel, value) };
    }

    /// pop the value at the front of this list. popping an empty list does
    /// nothing and returns None.
    pub fn pop_front(&mut self) -> Option<T> {
        // SAFETY: the sentinel is always a valid position in its own list
        unsafe { self.unlink_after(self.sentinel) }
    }

    /// drop every element, leaving only the sentinel
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
        debug_assert!(self.head().is_none());
    }

    /// reverse the order of the list in place by re-pointing every node at its
    /// predecessor. no element is moved or copied.
    pub fn reverse(&mut self) {
        let mut prev: Link<T> = None;
        let mut curr = self.head();

        while let Some(node) = curr {
            // SAFETY: every linked node is owned by `self` and `&mut self` makes
            // this the only access to the chain
            let node_ref = unsafe { &mut *node.as_ptr() };
            curr = node_ref.next();
            node_ref.set_next(prev);
            prev = Some(node);
        }

        // SAFETY: the sentinel lives until `self` is dropped
        unsafe { self.sentinel.as_mut().set_next(prev) };
    }

    /// exchange the contents of two lists without touching any node
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.sentinel, &mut other.sentinel);
        core::mem::swap(&mut self.len, &mut other.len);
    }

    /// a cursor on the sentinel, usable to insert or erase at the front
    pub fn before_begin(&self) -> Cursor<'_, T> {
        Cursor {
            list: self,
            curr: Some(self.sentinel),
        }
    }

    /// a cursor on the first element, or past the end if the list is empty
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor {
            list: self,
            curr: self.head(),
        }
    }

    /// a cursor past the end of the list
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor {
            list: self,
            curr: None,
        }
    }

    pub fn cbefore_begin(&self) -> Cursor<'_, T> {
        self.before_begin()
    }

    pub fn cbegin(&self) -> Cursor<'_, T> {
        self.begin()
    }

    pub fn cend(&self) -> Cursor<'_, T> {
        self.end()
    }

    /// a mutable cursor on the sentinel
    pub fn before_begin_mut(&mut self) -> CursorMut<'_, T> {
        let curr = Some(self.sentinel);
        CursorMut { list: self, curr }
    }

    /// a mutable cursor on the first element, or past the end if the list is
    /// empty
    pub fn begin_mut(&mut self) -> CursorMut<'_, T> {
        let curr = self.head();
        CursorMut { list: self, curr }
    }

    /// return an immutable iterator for this list
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            links: Links::new(self.head(), self.len),
            marker: PhantomData,
        }
    }

    /// return a mutable iterator for this list
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            links: Links::new(self.head(), self.len),
            marker: PhantomData,
        }
    }

    fn head(&self) -> Link<T> {
        // SAFETY: the sentinel is allocated in `new` and only freed in `drop`
        unsafe { self.sentinel.as_ref().next() }
    }

    /// allocate a node holding `value` and link it directly after `pos`,
    /// returning the new node
    /// # Safety
    /// `pos` must point to the sentinel or a data node owned by `self`
    // Before: (pos) -> (pos.next)
    // After: (pos) -> (new) -> (pos.next)
    unsafe fn link_after(
        &mut self,
        pos: NonNull<ForwardListNode<T>>,
        value: T,
    ) -> NonNull<ForwardListNode<T>> {
        let pos = &mut *pos.as_ptr();
        let node = Box::new(ForwardListNode::Data {
            data: value,
            next: pos.next(),
        });
        let node = NonNull::from(Box::leak(node));
        pos.set_next(Some(node));
        self.len += 1;
        node
    }

    /// unlink and free the node directly after `pos`, returning its data, or
    /// None if `pos` is the last node
    /// # Safety
    /// `pos` must point to the sentinel or a data node owned by `self`
    // Before: (pos) -> (erased) -> (erased.next)
    // After: (pos) -> (erased.next)
    unsafe fn unlink_after(&mut self, pos: NonNull<ForwardListNode<T>>) -> Option<T> {
        let pos = &mut *pos.as_ptr();
        let erased = pos.next()?;
        let erased = *Box::from_raw(erased.as_ptr());
        pos.set_next(erased.next());
        debug_assert!(self.len > 0, "a linked node was found in an empty list");
        self.len -= 1;
        Some(erased.into_data())
    }
}

unsafe impl<T: Send> Send for ForwardList<T> {}
unsafe impl<T: Sync> Sync for ForwardList<T> {}

impl<T> Drop for ForwardList<T> {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: the sentinel was leaked from a Box in `new` and is freed
        // nowhere else
        unsafe { drop(Box::from_raw(self.sentinel.as_ptr())) };
    }
}

impl<T> Default for ForwardList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for ForwardList<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }

    /// copy-and-swap: if cloning `source` panics, `self` is left untouched
    fn clone_from(&mut self, source: &Self) {
        let mut copy = source.clone();
        self.swap(&mut copy);
    }
}

/// exchange the contents of two lists
pub fn swap<T>(lhs: &mut ForwardList<T>, rhs: &mut ForwardList<T>) {
    lhs.swap(rhs);
}

impl<T> FromIterator<T> for ForwardList<T> {
    /// builds the list back to front with `push_front`, then reverses it once
    /// so the produced order is kept
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        for value in iter {
            list.push_front(value);
        }
        list.reverse();
        list
    }
}

impl<T, const N: usize> From<[T; N]> for ForwardList<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T> Extend<T> for ForwardList<T> {
    /// appends after the current last element
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let mut tail = self.sentinel;
        // SAFETY: every linked node is owned by `self`
        while let Some(next) = unsafe { tail.as_ref().next() } {
            tail = next;
        }
        for value in iter {
            // SAFETY: `tail` is the sentinel or the most recently linked node
            tail = unsafe { self.link_after(tail, value) };
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for ForwardList<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T: PartialEq> PartialEq for ForwardList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for ForwardList<T> {}

impl<T: PartialOrd> PartialOrd for ForwardList<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for ForwardList<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash> Hash for ForwardList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for data in self.iter() {
            data.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ForwardList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> IntoIterator for ForwardList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

impl<'a, T> IntoIterator for &'a ForwardList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut ForwardList<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// build a `ForwardList` from a list of values, keeping their order
#[macro_export]
macro_rules! forward_list {
    () => {
        $crate::collections::forward_list::ForwardList::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::collections::forward_list::ForwardList::from([$($value),+])
    };
}

/// the private layout of a node, either the sentinel or an element
enum ForwardListNode<T> {
    Sentinel { next: Link<T> },
    Data { data: T, next: Link<T> },
}

impl<T> ForwardListNode<T> {
    fn next(&self) -> Link<T> {
        match self {
            Self::Sentinel { next } | Self::Data { next, .. } => *next,
        }
    }

    fn set_next(&mut self, new_next: Link<T>) {
        match self {
            Self::Sentinel { next } | Self::Data { next, .. } => *next = new_next,
        }
    }

    fn data(&self) -> Option<&T> {
        match self {
            Self::Sentinel { .. } => None,
            Self::Data { data, .. } => Some(data),
        }
    }

    fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Sentinel { .. } => None,
            Self::Data { data, .. } => Some(data),
        }
    }

    fn into_data(self) -> T {
        match self {
            Self::Sentinel { .. } => {
                unreachable!("the sentinel is never linked after another node")
            }
            Self::Data { data, .. } => data,
        }
    }
}

/// walks the chain of data nodes. shared by `Iter` and `IterMut`, which only
/// differ in how they hand out the data.
struct Links<T> {
    next: Link<T>,
    remaining: usize,
}

impl<T> Links<T> {
    fn new(head: Link<T>, len: usize) -> Self {
        Self {
            next: head,
            remaining: len,
        }
    }

    fn advance(&mut self) -> Option<NonNull<ForwardListNode<T>>> {
        let node = self.next?;
        // SAFETY: the wrapping iterator borrows the list, so linked nodes stay
        // alive and linked for as long as this walker exists
        self.next = unsafe { node.as_ref().next() };
        self.remaining -= 1;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> Clone for Links<T> {
    fn clone(&self) -> Self {
        Self {
            next: self.next,
            remaining: self.remaining,
        }
    }
}

pub struct Iter<'a, T> {
    links: Links<T>,
    marker: PhantomData<&'a ForwardListNode<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        // SAFETY: the walker only yields data nodes of the borrowed list
        self.links
            .advance()
            .and_then(|node| unsafe { (*node.as_ptr()).data() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.links.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            links: self.links.clone(),
            marker: PhantomData,
        }
    }
}

unsafe impl<T: Sync> Send for Iter<'_, T> {}
unsafe impl<T: Sync> Sync for Iter<'_, T> {}

pub struct IterMut<'a, T> {
    links: Links<T>,
    marker: PhantomData<&'a mut ForwardListNode<T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        // SAFETY: the walker yields each data node of the exclusively borrowed
        // list exactly once, so the returned references never alias
        self.links
            .advance()
            .and_then(|node| unsafe { (*node.as_ptr()).data_mut() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.links.size_hint()
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

unsafe impl<T: Send> Send for IterMut<'_, T> {}
unsafe impl<T: Sync> Sync for IterMut<'_, T> {}

/// an owning iterator that pops elements off the front of the list
pub struct IntoIter<T> {
    list: ForwardList<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

/// a read-only position in a list: the sentinel, an element, or past the end.
/// cursors compare equal when they sit on the same node, and every past the
/// end cursor is equal to every other.
pub struct Cursor<'a, T> {
    list: &'a ForwardList<T>,
    curr: Link<T>,
}

impl<'a, T> Cursor<'a, T> {
    /// get the data of the current node, or None on the sentinel or past the
    /// end
    pub fn current(&self) -> Option<&'a T> {
        // SAFETY: `curr` is a node owned by the borrowed list
        self.curr
            .and_then(|node| unsafe { (*node.as_ptr()).data() })
    }

    /// get the data of the node after the current one, if there is one
    pub fn peek_next(&self) -> Option<&'a T> {
        // SAFETY: `curr` and its successor are nodes owned by the borrowed list
        unsafe {
            let next = self.curr?.as_ref().next()?;
            (*next.as_ptr()).data()
        }
    }

    /// move the cursor forward one node. a cursor past the end stays there.
    pub fn move_next(&mut self) {
        if let Some(node) = self.curr {
            // SAFETY: `node` is owned by the borrowed list
            self.curr = unsafe { node.as_ref().next() };
        }
    }

    pub fn is_before_begin(&self) -> bool {
        self.curr == Some(self.list.sentinel)
    }

    pub fn is_end(&self) -> bool {
        self.curr.is_none()
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.curr == other.curr
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("before_begin", &self.is_before_begin())
            .field("current", &self.current())
            .finish()
    }
}

/// a read-write position in a list. holding one borrows the list exclusively,
/// so the only node it can invalidate is one it erases itself.
pub struct CursorMut<'a, T> {
    list: &'a mut ForwardList<T>,
    curr: Link<T>,
}

impl<'a, T> CursorMut<'a, T> {
    /// get the data of the current node, or None on the sentinel or past the
    /// end
    pub fn current(&self) -> Option<&T> {
        // SAFETY: `curr` is a node owned by the borrowed list
        self.curr
            .and_then(|node| unsafe { (*node.as_ptr()).data() })
    }

    /// mutably borrow the data of the current node, or None on the sentinel or
    /// past the end
    pub fn current_mut(&mut self) -> Option<&mut T> {
        // SAFETY: `curr` is a node owned by the exclusively borrowed list
        self.curr
            .and_then(|node| unsafe { (*node.as_ptr()).data_mut() })
    }

    /// get the data of the node after the current one, if there is one
    pub fn peek_next(&self) -> Option<&T> {
        self.as_cursor().peek_next()
    }

    /// move the cursor forward one node. a cursor past the end stays there.
    pub fn move_next(&mut self) {
        if let Some(node) = self.curr {
            // SAFETY: `node` is owned by the borrowed list
            self.curr = unsafe { node.as_ref().next() };
        }
    }

    pub fn is_before_begin(&self) -> bool {
        self.curr == Some(self.list.sentinel)
    }

    pub fn is_end(&self) -> bool {
        self.curr.is_none()
    }

    /// a read-only view of the same position
    pub fn as_cursor(&self) -> Cursor<'_, T> {
        Cursor {
            list: &*self.list,
            curr: self.curr,
        }
    }

    /// insert `value` directly after the current node, increasing the size of
    /// the list by 1. the cursor does not move; the returned cursor sits on the
    /// new node.
    ///
    /// a cursor past the end has no node to insert after, in which case
    /// `value` is dropped and the list is unchanged.
    pub fn insert_after(&mut self, value: T) -> ForwardListResult<CursorMut<'_, T>> {
        let pos = match self.curr {
            Some(pos) => pos,
            None => {
                log::debug!("rejected insert_after on a cursor past the end");
                return Err(ForwardListError::PastTheEnd);
            }
        };

        // SAFETY: `pos` is the sentinel or a data node of the borrowed list
        let node = unsafe { self.list.link_after(pos, value) };
        Ok(CursorMut {
            list: &mut *self.list,
            curr: Some(node),
        })
    }

    /// remove the node directly after the current one, decreasing the size of
    /// the list by 1 and returning its data. the cursor does not move, so its
    /// next node is now whatever followed the erased one.
    pub fn erase_after(&mut self) -> ForwardListResult<T> {
        let pos = match self.curr {
            Some(pos) => pos,
            None => {
                log::debug!("rejected erase_after on a cursor past the end");
                return Err(ForwardListError::PastTheEnd);
            }
        };

        // SAFETY: `pos` is the sentinel or a data node of the borrowed list
        match unsafe { self.list.unlink_after(pos) } {
            Some(data) => Ok(data),
            None => {
                log::debug!(
                    "rejected erase_after on the last node of a list of {} elements",
                    self.list.len()
                );
                Err(ForwardListError::NoSuccessor)
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for CursorMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("before_begin", &self.is_before_begin())
            .field("current", &self.current())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use std::cell::Cell;
    use std::collections::hash_map::DefaultHasher;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::rc::Rc;

    use super::*;

    /// counts its own drops, and panics on clone when asked to
    #[derive(Debug)]
    struct Tracked {
        drops: Rc<Cell<usize>>,
        panic_on_clone: bool,
    }

    impl Tracked {
        fn new(drops: &Rc<Cell<usize>>) -> Self {
            Self {
                drops: drops.clone(),
                panic_on_clone: false,
            }
        }

        fn poisoned(drops: &Rc<Cell<usize>>) -> Self {
            Self {
                drops: drops.clone(),
                panic_on_clone: true,
            }
        }
    }

    impl Clone for Tracked {
        fn clone(&self) -> Self {
            if self.panic_on_clone {
                panic!("Tracked::clone called on a poisoned value");
            }
            Self::new(&self.drops)
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    fn contents<T: Clone>(list: &ForwardList<T>) -> Vec<T> {
        list.iter().cloned().collect()
    }

    fn hash_of<T: Hash>(t: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        t.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn forward_lists_are_sendable() {
        fn send<S: Send>(_: S) {}
        send(ForwardList::<u32>::new());
    }

    #[test]
    fn new_list_is_empty() {
        let ll = ForwardList::<u32>::new();
        assert_eq!(ll.len(), 0);
        assert!(ll.is_empty());
        assert!(ll.iter().next().is_none());
        assert!(ll.begin() == ll.end());
        assert!(ll.front().is_none());
    }

    #[test]
    fn push_front_increases_len() {
        let mut ll = ForwardList::new();
        ll.push_front(73);
        assert_eq!(ll.len(), 1);
        ll.push_front(42);
        assert_eq!(ll.len(), 2);
        assert_eq!(ll.front(), Some(&42));
    }

    #[test]
    fn pop_front_on_empty_list_returns_none() {
        let mut ll = ForwardList::<u32>::new();
        assert_eq!(ll.pop_front(), None);
        assert_eq!(ll.len(), 0);
    }

    #[test]
    fn push_front_then_pop_front_restores_list() {
        let mut ll = ForwardList::from([1, 2, 3]);
        ll.push_front(0);
        assert_eq!(contents(&ll), [0, 1, 2, 3]);
        assert_eq!(ll.pop_front(), Some(0));
        assert_eq!(contents(&ll), [1, 2, 3]);
        assert_eq!(ll.len(), 3);
    }

    #[test]
    fn front_mut_modifies_first_element() {
        let mut ll = ForwardList::from([1, 2]);
        *ll.front_mut().expect("list is not empty") += 10;
        assert_eq!(contents(&ll), [11, 2]);
    }

    #[test]
    fn push_front_scenario() {
        let mut ll = ForwardList::new();
        ll.push_front(3);
        ll.push_front(2);
        ll.push_front(1);
        assert_eq!(contents(&ll), [1, 2, 3]);
        assert_eq!(ll.len(), 3);

        ll.before_begin_mut()
            .erase_after()
            .expect("failed to erase_after");
        assert_eq!(contents(&ll), [2, 3]);
        assert_eq!(ll.len(), 2);

        ll.before_begin_mut()
            .insert_after(9)
            .expect("failed to insert_after");
        assert_eq!(contents(&ll), [9, 2, 3]);
        assert_eq!(ll.len(), 3);
    }

    #[test]
    fn collect_preserves_order() {
        let ll: ForwardList<u32> = [1, 2, 3, 4].into_iter().collect();
        assert_eq!(contents(&ll), [1, 2, 3, 4]);
        assert_eq!(ll.len(), 4);
    }

    #[test]
    fn from_array_and_macro_preserve_order() {
        let from_array = ForwardList::from([1, 2, 3, 4]);
        let from_macro = crate::forward_list![1, 2, 3, 4];
        assert_eq!(contents(&from_array), [1, 2, 3, 4]);
        assert_eq!(from_array, from_macro);

        let empty: ForwardList<u32> = crate::forward_list![];
        assert!(empty.is_empty());
    }

    #[test]
    fn clear_removes_all_elements() {
        let mut ll = ForwardList::from([1, 2, 3]);
        ll.clear();
        assert_eq!(ll.len(), 0);
        assert!(ll.iter().next().is_none());
        ll.push_front(4);
        assert_eq!(contents(&ll), [4]);
    }

    #[test]
    fn clear_on_empty_list_does_nothing() {
        let mut ll = ForwardList::<u32>::new();
        ll.clear();
        assert_eq!(ll.len(), 0);
        assert!(ll.is_empty());
    }

    #[test]
    fn reverse_empty_and_single_element_lists() {
        let mut ll = ForwardList::<u32>::new();
        ll.reverse();
        assert!(ll.is_empty());

        let mut ll = ForwardList::from([7]);
        ll.reverse();
        assert_eq!(contents(&ll), [7]);
    }

    #[test]
    fn reverse_reverses_order() {
        let mut ll = ForwardList::from([1, 2, 3, 4, 5]);
        ll.reverse();
        assert_eq!(contents(&ll), [5, 4, 3, 2, 1]);
        assert_eq!(ll.len(), 5);
        ll.reverse();
        assert_eq!(contents(&ll), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn clone_is_independent_of_source() {
        let mut original = ForwardList::from([1, 2, 3]);
        let mut copy = original.clone();
        assert_eq!(original, copy);

        copy.push_front(0);
        *original.front_mut().expect("list is not empty") = 100;

        assert_eq!(contents(&original), [100, 2, 3]);
        assert_eq!(contents(&copy), [0, 1, 2, 3]);
    }

    #[test]
    fn clone_from_replaces_contents() {
        let source = ForwardList::from([4, 5, 6]);
        let mut target = ForwardList::from([1, 2]);
        target.clone_from(&source);
        assert_eq!(target, source);

        target.pop_front();
        assert_eq!(contents(&source), [4, 5, 6]);
        assert_eq!(contents(&target), [5, 6]);
    }

    #[test]
    fn clone_from_drops_previous_contents() {
        let drops = Rc::new(Cell::new(0));
        let source = ForwardList::from([Tracked::new(&drops)]);
        let mut target = ForwardList::from([Tracked::new(&drops), Tracked::new(&drops)]);

        target.clone_from(&source);
        assert_eq!(drops.get(), 2);
        assert_eq!(target.len(), 1);
    }

    #[test]
    fn panicking_clone_from_leaves_target_untouched() {
        let drops = Rc::new(Cell::new(0));
        let source = ForwardList::from([
            Tracked::new(&drops),
            Tracked::new(&drops),
            Tracked::poisoned(&drops),
            Tracked::new(&drops),
        ]);
        let mut target = ForwardList::from([Tracked::new(&drops)]);

        let result = catch_unwind(AssertUnwindSafe(|| target.clone_from(&source)));
        assert!(result.is_err());

        // the two clones made before the panic were torn down with the partial copy
        assert_eq!(drops.get(), 2);
        assert_eq!(target.len(), 1);
        assert_eq!(source.len(), 4);

        drop(source);
        drop(target);
        assert_eq!(drops.get(), 7);
    }

    #[test]
    fn panicking_iterator_does_not_leak_partial_list() {
        let drops = Rc::new(Cell::new(0));

        let result = catch_unwind(AssertUnwindSafe(|| {
            (0..10)
                .map(|i| {
                    if i == 5 {
                        panic!("iterator failed while building a list");
                    }
                    Tracked::new(&drops)
                })
                .collect::<ForwardList<Tracked>>()
        }));

        assert!(result.is_err());
        assert_eq!(drops.get(), 5);
    }

    #[test]
    fn dropping_list_drops_every_element() {
        let drops = Rc::new(Cell::new(0));
        let mut ll = ForwardList::new();
        for _ in 0..8 {
            ll.push_front(Tracked::new(&drops));
        }
        drop(ll.pop_front());
        assert_eq!(drops.get(), 1);

        drop(ll);
        assert_eq!(drops.get(), 8);
    }

    #[test]
    fn swap_exchanges_contents() {
        let mut a = ForwardList::from([1, 2, 3]);
        let mut b = ForwardList::from([9]);
        a.swap(&mut b);
        assert_eq!(contents(&a), [9]);
        assert_eq!(contents(&b), [1, 2, 3]);
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 3);

        swap(&mut a, &mut b);
        assert_eq!(contents(&a), [1, 2, 3]);
        assert_eq!(contents(&b), [9]);
    }

    #[test]
    fn equality_requires_same_length_and_elements() {
        assert_eq!(ForwardList::from([1, 2, 3]), ForwardList::from([1, 2, 3]));
        assert_ne!(ForwardList::from([1, 2, 3]), ForwardList::from([1, 2]));
        assert_ne!(ForwardList::from([1, 2, 3]), ForwardList::from([1, 2, 4]));
        assert_eq!(ForwardList::<u32>::new(), ForwardList::new());
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(ForwardList::from([1, 2, 3]) < ForwardList::from([1, 2, 4]));
        assert!(ForwardList::from([1, 2]) < ForwardList::from([1, 2, 3]));
        assert!(ForwardList::new() < ForwardList::from([1]));
        assert!(ForwardList::from([2]) > ForwardList::from([1, 9, 9]));
        assert!(ForwardList::from([1, 2, 3]) <= ForwardList::from([1, 2, 3]));
        assert!(ForwardList::from([1, 2, 3]) >= ForwardList::from([1, 2, 3]));
        assert_eq!(
            ForwardList::from([1, 2, 3]).cmp(&ForwardList::from([1, 2, 3])),
            Ordering::Equal
        );
    }

    #[test]
    fn equal_lists_hash_equally() {
        let a = ForwardList::from([1, 2, 3]);
        let b: ForwardList<u32> = (1..=3).collect();
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn extend_appends_after_last_element() {
        let mut ll = ForwardList::from([1, 2]);
        ll.extend([3, 4]);
        assert_eq!(contents(&ll), [1, 2, 3, 4]);
        assert_eq!(ll.len(), 4);

        let mut empty: ForwardList<u32> = ForwardList::new();
        empty.extend(&[5, 6]);
        assert_eq!(contents(&empty), [5, 6]);
    }

    #[test]
    fn debug_formats_as_list() {
        let ll = ForwardList::from([1, 2, 3]);
        assert_eq!(format!("{:?}", ll), "[1, 2, 3]");
    }

    #[test]
    fn errors_display_a_reason() {
        assert_eq!(
            ForwardListError::PastTheEnd.to_string(),
            "cursor is past the end of the list"
        );
        assert_eq!(
            ForwardListError::NoSuccessor.to_string(),
            "no node follows the cursor"
        );
    }
}



// proptest doesn't run under miri with default config
#[cfg(all(not(miri), test))]
mod proptests {
    use proptest::collection::vec;
    use proptest::prelude::*;
    use proptest::test_runner::Config;
    use proptest_derive::Arbitrary;
    use proptest_state_machine::{ReferenceStateMachine, StateMachineTest};
    use rand::Rng;

    use super::*;

    proptest_state_machine::prop_state_machine! {
        #![proptest_config(Config {
            failure_persistence: None,
            .. Config::default()
        })]

        #[test]
        fn forward_list_state_machine_test(
            sequential
            100..500
            =>
            ForwardList<u32>
        );
    }

    /// a position `p` is the slot after the first `p` elements, so 0 is the
    /// sentinel
    #[derive(Clone, Debug)]
    pub enum Transition {
        PushFront(u32),
        PopFront,
        InsertAfter(usize, u32),
        EraseAfter(usize),
        Reverse,
        Clear,
        AssignFrom(Vec<u32>),
    }

    pub struct ForwardListStateMachine;

    impl ReferenceStateMachine for ForwardListStateMachine {
        type State = Vec<u32>;
        type Transition = Transition;

        fn init_state() -> BoxedStrategy<Self::State> {
            Just(Vec::new()).boxed()
        }

        fn transitions(state: &Self::State) -> BoxedStrategy<Self::Transition> {
            let len = state.len();
            prop_oneof![
                1 => Just(Transition::PopFront),
                3 => any::<u32>().prop_map(Transition::PushFront),
                2 => (0..=len, any::<u32>())
                    .prop_map(|(pos, value)| Transition::InsertAfter(pos, value)),
                2 => (0..=len).prop_map(Transition::EraseAfter),
                1 => Just(Transition::Reverse),
                1 => Just(Transition::Clear),
                1 => vec(any::<u32>(), 0..16).prop_map(Transition::AssignFrom),
            ]
            .boxed()
        }

        fn preconditions(state: &Self::State, transition: &Self::Transition) -> bool {
            match transition {
                Transition::InsertAfter(pos, _) | Transition::EraseAfter(pos) => {
                    *pos <= state.len()
                }
                _ => true,
            }
        }

        fn apply(mut state: Self::State, transition: &Self::Transition) -> Self::State {
            match transition {
                Transition::PushFront(value) => state.insert(0, *value),
                Transition::PopFront => {
                    if !state.is_empty() {
                        state.remove(0);
                    }
                }
                Transition::InsertAfter(pos, value) => state.insert(*pos, *value),
                Transition::EraseAfter(pos) => {
                    if *pos < state.len() {
                        state.remove(*pos);
                    }
                }
                Transition::Reverse => state.reverse(),
                Transition::Clear => state.clear(),
                Transition::AssignFrom(values) => state = values.clone(),
            }
            state
        }
    }

    fn cursor_at(list: &mut ForwardList<u32>, pos: usize) -> CursorMut<'_, u32> {
        let mut cursor = list.before_begin_mut();
        for _ in 0..pos {
            cursor.move_next();
        }
        cursor
    }

    impl StateMachineTest for ForwardList<u32> {
        type SystemUnderTest = Self;
        type Reference = ForwardListStateMachine;

        fn init_test(
            _ref_state: &<Self::Reference as ReferenceStateMachine>::State,
        ) -> Self::SystemUnderTest {
            Self::new()
        }

        fn apply(
            mut state: Self::SystemUnderTest,
            _ref_state: &<Self::Reference as ReferenceStateMachine>::State,
            transition: Transition,
        ) -> Self::SystemUnderTest {
            match transition {
                Transition::PushFront(value) => state.push_front(value),
                Transition::PopFront => {
                    let was_empty = state.is_empty();
                    assert_eq!(state.pop_front().is_none(), was_empty);
                }
                Transition::InsertAfter(pos, value) => {
                    let mut cursor = cursor_at(&mut state, pos);
                    let inserted = cursor
                        .insert_after(value)
                        .expect("position is within the list");
                    assert_eq!(inserted.current(), Some(&value));
                }
                Transition::EraseAfter(pos) => {
                    let len = state.len();
                    let result = cursor_at(&mut state, pos).erase_after();
                    if pos < len {
                        assert!(result.is_ok());
                    } else {
                        assert_eq!(result, Err(ForwardListError::NoSuccessor));
                    }
                }
                Transition::Reverse => state.reverse(),
                Transition::Clear => state.clear(),
                Transition::AssignFrom(values) => {
                    let source: ForwardList<u32> = values.into_iter().collect();
                    state.clone_from(&source);
                }
            }
            state
        }

        fn check_invariants(
            state: &Self::SystemUnderTest,
            ref_state: &<Self::Reference as ReferenceStateMachine>::State,
        ) {
            assert_eq!(state.len(), ref_state.len());
            assert_eq!(state.is_empty(), state.begin() == state.end());
            assert!(state.iter().eq(ref_state.iter()));
        }
    }

    proptest! {
        #[test]
        fn collect_preserves_order(values in vec(any::<u32>(), 0..64)) {
            let ll: ForwardList<u32> = values.iter().copied().collect();
            prop_assert_eq!(ll.len(), values.len());
            prop_assert!(ll.iter().eq(values.iter()));
        }

        #[test]
        fn reverse_twice_restores_order(values in vec(any::<u32>(), 0..64)) {
            let mut ll: ForwardList<u32> = values.iter().copied().collect();
            ll.reverse();
            prop_assert!(ll.iter().eq(values.iter().rev()));
            ll.reverse();
            prop_assert!(ll.iter().eq(values.iter()));
        }

        #[test]
        fn push_front_then_pop_front_restores_list(
            values in vec(any::<u32>(), 0..32),
            value in any::<u32>(),
        ) {
            let mut ll: ForwardList<u32> = values.iter().copied().collect();
            ll.push_front(value);
            prop_assert_eq!(ll.pop_front(), Some(value));
            prop_assert_eq!(ll.len(), values.len());
            prop_assert!(ll.iter().eq(values.iter()));
        }

        #[test]
        fn insert_after_then_erase_after_restores_list(
            values in vec(any::<u32>(), 0..32),
            pos in any::<prop::sample::Index>(),
            value in any::<u32>(),
        ) {
            let mut ll: ForwardList<u32> = values.iter().copied().collect();
            let pos = pos.index(values.len() + 1);
            {
                let mut cursor = cursor_at(&mut ll, pos);
                cursor.insert_after(value).expect("position is within the list");
                prop_assert_eq!(cursor.erase_after(), Ok(value));
            }
            prop_assert_eq!(ll.len(), values.len());
            prop_assert!(ll.iter().eq(values.iter()));
        }

        #[test]
        fn comparisons_agree_with_vec(
            a in vec(0u32..4, 0..6),
            b in vec(0u32..4, 0..6),
        ) {
            let la: ForwardList<u32> = a.iter().copied().collect();
            let lb: ForwardList<u32> = b.iter().copied().collect();
            prop_assert_eq!(la == lb, a == b);
            prop_assert_eq!(la.cmp(&lb), a.cmp(&b));
            prop_assert_eq!(la < lb, a < b);
            prop_assert_eq!(la >= lb, a >= b);
        }

        #[test]
        fn clone_is_deep(values in vec(any::<u32>(), 1..32)) {
            let original: ForwardList<u32> = values.iter().copied().collect();
            let mut copy = ForwardList::new();
            copy.clone_from(&original);
            prop_assert_eq!(&copy, &original);

            copy.clear();
            prop_assert!(original.iter().eq(values.iter()));
        }
    }

    #[derive(Arbitrary, Debug)]
    enum Operation {
        PushFront(u32),
        PopFront,
        InsertAfter(u32),
        EraseAfter,
        Reverse,
        CloneAssign,
        Clear,
    }

    proptest! {
        #[test]
        #[ignore]
        fn longform(ops in vec(any::<Operation>(), 2048)) {
            println!("Executing {} operations against ForwardList\n\t{:?}", ops.len(), ops);

            let mut reference = Vec::new();
            let mut ll = ForwardList::new();

            for op in ops.iter() {
                match op {
                    Operation::PushFront(i) => {
                        reference.insert(0, *i);
                        ll.push_front(*i);
                    }
                    Operation::PopFront => {
                        let expected = if reference.is_empty() {
                            None
                        } else {
                            Some(reference.remove(0))
                        };
                        assert_eq!(ll.pop_front(), expected);
                    }
                    Operation::InsertAfter(i) => {
                        let pos = rand::thread_rng().gen_range(0..=reference.len());
                        reference.insert(pos, *i);
                        cursor_at(&mut ll, pos)
                            .insert_after(*i)
                            .expect("position is within the list");
                    }
                    Operation::EraseAfter => {
                        if reference.is_empty() {
                            continue;
                        }
                        let pos = rand::thread_rng().gen_range(0..reference.len());
                        let expected = reference.remove(pos);
                        assert_eq!(cursor_at(&mut ll, pos).erase_after(), Ok(expected));
                    }
                    Operation::Reverse => {
                        reference.reverse();
                        ll.reverse();
                    }
                    Operation::CloneAssign => {
                        let copy = ll.clone();
                        assert_eq!(copy, ll);
                        ll = copy;
                    }
                    Operation::Clear => {
                        reference.clear();
                        ll.clear();
                    }
                }

                assert_eq!(ll.len(), reference.len());
                assert!(ll.iter().eq(reference.iter()));
            }

            println!("Successfully executed {} operations against ForwardList\n\t{:?}", ops.len(), ops);
        }
    }
}
