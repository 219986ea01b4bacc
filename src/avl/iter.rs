//! In-order traversal over a tree snapshot.

use std::iter::FusedIterator;

use smallvec::SmallVec;

use super::node::{Direction, Node, NodeRef};

/// Inline stack depth; covers AVL trees of several million items before
/// spilling to the heap.
const INLINE_DEPTH: usize = 32;

/// An iterator over the items of an [`AvlTree`](super::AvlTree) in
/// ascending order under the tree's ordering.
///
/// Created by [`AvlTree::iter`](super::AvlTree::iter).
pub struct Iter<'a, T> {
    /// Nodes whose item and greater subtree are still to be visited.
    stack: SmallVec<[&'a Node<T>; INLINE_DEPTH]>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(root: Option<&'a NodeRef<T>>, length: usize) -> Self {
        let mut iterator = Self {
            stack: SmallVec::new(),
            remaining: length,
        };
        iterator.push_less_spine(root.map(|node| node.as_ref()));
        iterator
    }

    fn push_less_spine(&mut self, mut node: Option<&'a Node<T>>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.child(Direction::Less).map(|node| node.as_ref());
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_less_spine(node.child(Direction::Greater).map(|node| node.as_ref()));
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}
