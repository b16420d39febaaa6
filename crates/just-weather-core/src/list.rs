//! Doubly linked list with stable node handles
//!
//! Nodes live in a slot arena and link to each other by index, so appending,
//! removing by [`NodeRef`] and moving a node to the back are O(1) without any
//! unsafe pointer juggling. Indexed access walks the links and is O(n).
//!
//! Removal hands the value back to the caller instead of running a
//! destructor callback; dropping the list drops every remaining value.

use std::fmt;
use std::iter::FusedIterator;

/// Stable reference to a node in a [`List`]
///
/// A reference stays valid until its node is removed. After that it never
/// resolves again, even if the slot is reused for a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    index: usize,
    generation: u64,
}

struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

struct Slot<T> {
    generation: u64,
    node: Option<Node<T>>,
}

/// Generic ordered container
pub struct List<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> List<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Create an empty list with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a value at the back. O(1).
    pub fn push_back(&mut self, value: T) -> NodeRef {
        let index = self.alloc(value);
        self.link_back(index);
        self.len += 1;
        self.node_ref(index)
    }

    /// Insert a value so that it ends up at position `index`. O(n).
    ///
    /// Hands the value back as `Err` when `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<NodeRef, T> {
        if index > self.len {
            return Err(value);
        }
        if index == self.len {
            return Ok(self.push_back(value));
        }
        let Some(at) = self.slot_at(index) else {
            return Err(value);
        };
        let new = self.alloc(value);
        self.link_before(new, at);
        self.len += 1;
        Ok(self.node_ref(new))
    }

    /// Value at position `index`. O(n).
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slot_at(index).and_then(|i| self.value_at(i))
    }

    /// Handle for the node at position `index`. O(n).
    pub fn node_at(&self, index: usize) -> Option<NodeRef> {
        self.slot_at(index).map(|i| self.node_ref(i))
    }

    /// Value behind a handle
    pub fn value(&self, node: NodeRef) -> Option<&T> {
        self.resolve(node).and_then(|i| self.value_at(i))
    }

    /// Mutable value behind a handle
    pub fn value_mut(&mut self, node: NodeRef) -> Option<&mut T> {
        let index = self.resolve(node)?;
        self.slots[index].node.as_mut().map(|n| &mut n.value)
    }

    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|i| self.value_at(i))
    }

    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|i| self.value_at(i))
    }

    /// Remove the node behind `node` and return its value. O(1).
    pub fn remove(&mut self, node: NodeRef) -> Option<T> {
        let index = self.resolve(node)?;
        self.release(index)
    }

    /// Remove the value at position `index`. O(n) to locate, O(1) to unlink.
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        let slot = self.slot_at(index)?;
        self.release(slot)
    }

    /// Remove and return the oldest value. O(1).
    pub fn pop_front(&mut self) -> Option<T> {
        let head = self.head?;
        self.release(head)
    }

    /// Move an existing node to the back. O(1).
    ///
    /// Returns `false` if the handle no longer resolves.
    pub fn move_to_back(&mut self, node: NodeRef) -> bool {
        let Some(index) = self.resolve(node) else {
            return false;
        };
        if self.tail != Some(index) {
            self.unlink(index);
            self.link_back(index);
        }
        true
    }

    /// Drop every value. Outstanding handles stop resolving.
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation += 1;
                self.free.push(index);
            }
        }
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Front-to-back iterator
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            next: self.head,
            remaining: self.len,
        }
    }

    fn node_ref(&self, index: usize) -> NodeRef {
        NodeRef {
            index,
            generation: self.slots[index].generation,
        }
    }

    fn resolve(&self, node: NodeRef) -> Option<usize> {
        let slot = self.slots.get(node.index)?;
        (slot.generation == node.generation && slot.node.is_some()).then_some(node.index)
    }

    fn value_at(&self, index: usize) -> Option<&T> {
        self.slots.get(index)?.node.as_ref().map(|n| &n.value)
    }

    fn links(&self, index: usize) -> (Option<usize>, Option<usize>) {
        self.slots[index]
            .node
            .as_ref()
            .map_or((None, None), |n| (n.prev, n.next))
    }

    fn set_prev(&mut self, index: usize, prev: Option<usize>) {
        if let Some(node) = self.slots[index].node.as_mut() {
            node.prev = prev;
        }
    }

    fn set_next(&mut self, index: usize, next: Option<usize>) {
        if let Some(node) = self.slots[index].node.as_mut() {
            node.next = next;
        }
    }

    /// Walk from whichever end is closer
    fn slot_at(&self, index: usize) -> Option<usize> {
        if index >= self.len {
            return None;
        }
        if index <= self.len / 2 {
            let mut cursor = self.head;
            for _ in 0..index {
                cursor = cursor.and_then(|i| self.links(i).1);
            }
            cursor
        } else {
            let mut cursor = self.tail;
            for _ in 0..(self.len - 1 - index) {
                cursor = cursor.and_then(|i| self.links(i).0);
            }
            cursor
        }
    }

    fn alloc(&mut self, value: T) -> usize {
        let node = Node {
            value,
            prev: None,
            next: None,
        };
        match self.free.pop() {
            Some(index) => {
                self.slots[index].node = Some(node);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, index: usize) -> Option<T> {
        self.unlink(index);
        let slot = &mut self.slots[index];
        let node = slot.node.take()?;
        slot.generation += 1;
        self.free.push(index);
        self.len -= 1;
        Some(node.value)
    }

    fn link_back(&mut self, index: usize) {
        let old_tail = self.tail;
        self.set_prev(index, old_tail);
        self.set_next(index, None);
        match old_tail {
            Some(tail) => self.set_next(tail, Some(index)),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
    }

    fn link_before(&mut self, index: usize, at: usize) {
        let (prev, _) = self.links(at);
        self.set_prev(index, prev);
        self.set_next(index, Some(at));
        self.set_prev(at, Some(index));
        match prev {
            Some(p) => self.set_next(p, Some(index)),
            None => self.head = Some(index),
        }
    }

    fn unlink(&mut self, index: usize) {
        let (prev, next) = self.links(index);
        match prev {
            Some(p) => self.set_next(p, next),
            None => self.head = next,
        }
        match next {
            Some(n) => self.set_prev(n, prev),
            None => self.tail = prev,
        }
        self.set_prev(index, None);
        self.set_next(index, None);
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Extend<T> for List<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = List::new();
        list.extend(iter);
        list
    }
}

/// Borrowing iterator over a [`List`]
pub struct Iter<'a, T> {
    list: &'a List<T>,
    next: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        let node = self.list.slots[index].node.as_ref()?;
        self.next = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator over a [`List`], front to back
pub struct IntoIter<T> {
    list: List<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len, Some(self.list.len))
    }
}

impl<T> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn collect(list: &List<i32>) -> Vec<i32> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_push_back_and_iter() {
        let mut list = List::new();
        list.push_back(1);
        list.push_back(2);
        list.push_back(3);

        assert_eq!(list.len(), 3);
        assert_eq!(collect(&list), vec![1, 2, 3]);
        assert_eq!(list.front(), Some(&1));
        assert_eq!(list.back(), Some(&3));
    }

    #[test]
    fn test_indexed_get() {
        let list: List<i32> = (0..7).collect();
        for i in 0..7 {
            assert_eq!(list.get(i), Some(&(i as i32)));
        }
        assert_eq!(list.get(7), None);
    }

    #[test]
    fn test_insert_at_index() {
        let mut list: List<i32> = [1, 3].into_iter().collect();
        assert!(list.insert(1, 2).is_ok());
        assert!(list.insert(0, 0).is_ok());
        assert!(list.insert(4, 4).is_ok());
        assert_eq!(list.insert(9, 99), Err(99));

        assert_eq!(collect(&list), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_remove_by_reference() {
        let mut list = List::new();
        let a = list.push_back("a");
        let b = list.push_back("b");
        let c = list.push_back("c");

        assert_eq!(list.remove(b), Some("b"));
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec!["a", "c"]);

        assert_eq!(list.remove(a), Some("a"));
        assert_eq!(list.remove(c), Some("c"));
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
    }

    #[test]
    fn test_stale_reference_does_not_resolve() {
        let mut list = List::new();
        let a = list.push_back(1);
        assert_eq!(list.remove(a), Some(1));

        // Slot is reused, the old handle must stay dead
        let b = list.push_back(2);
        assert_eq!(list.remove(a), None);
        assert_eq!(list.value(a), None);
        assert_eq!(list.value(b), Some(&2));
    }

    #[test]
    fn test_remove_at_index() {
        let mut list: List<i32> = (0..5).collect();
        assert_eq!(list.remove_at(3), Some(3));
        assert_eq!(list.remove_at(0), Some(0));
        assert_eq!(list.remove_at(10), None);
        assert_eq!(collect(&list), vec![1, 2, 4]);
    }

    #[test]
    fn test_move_to_back() {
        let mut list = List::new();
        let a = list.push_back(1);
        list.push_back(2);
        list.push_back(3);

        assert!(list.move_to_back(a));
        assert_eq!(collect(&list), vec![2, 3, 1]);
        assert_eq!(list.pop_front(), Some(2));
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let mut list = List::new();
        let a = list.push_back(1);
        list.push_back(2);
        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.value(a), None);
        list.push_back(3);
        assert_eq!(collect(&list), vec![3]);
    }

    #[test]
    fn test_removal_transfers_ownership() {
        struct Tracked(Rc<Cell<usize>>);
        impl Drop for Tracked {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let drops = Rc::new(Cell::new(0));
        let mut list = List::new();
        let first = list.push_back(Tracked(drops.clone()));
        list.push_back(Tracked(drops.clone()));
        list.push_back(Tracked(drops.clone()));

        let taken = list.remove(first);
        assert_eq!(drops.get(), 0);
        drop(taken);
        assert_eq!(drops.get(), 1);

        drop(list);
        assert_eq!(drops.get(), 3);
    }

    #[test]
    fn test_value_mut() {
        let mut list = List::new();
        let a = list.push_back(String::from("old"));
        if let Some(value) = list.value_mut(a) {
            value.push_str("-new");
        }
        assert_eq!(list.value(a).map(String::as_str), Some("old-new"));
    }
}
