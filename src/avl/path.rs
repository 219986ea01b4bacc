//! The per-call path engine.
//!
//! A [`Path`] records the nodes from the root down to the node a mutating
//! call is working on. Nodes are moved onto the path detached from their
//! parents, so each one is exclusively owned while the call runs: a node
//! that belongs to the call's generation is edited in place, anything else
//! is copied into that generation first. [`Path::finish`] walks the nodes
//! back up, restores the AVL balance where asked to, and reattaches every
//! node to its parent, yielding the new root.
//!
//! Paths are recycled through [`super::pool::PathPool`] rather than
//! allocated per call.

use std::cmp::Ordering;
use std::sync::Arc;

use super::node::{Direction, Node, NodeRef};

/// Scratch state for one mutating call.
pub(crate) struct Path<T> {
    /// Root first, current working node last.
    nodes: Vec<NodeRef<T>>,
    /// `turns[i]` is the child slot of `nodes[i]` that `nodes[i + 1]` was
    /// detached from. That slot stays empty until [`Path::finish`].
    turns: Vec<Direction>,
    /// Generation of the call using this path.
    generation: u64,
}

impl<T> Default for Path<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Path<T> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            turns: Vec::new(),
            generation: 0,
        }
    }

    /// Prepares the path for a call running at `generation`.
    pub(crate) const fn stamp(&mut self, generation: u64) {
        self.generation = generation;
    }

    pub(crate) const fn generation(&self) -> u64 {
        self.generation
    }

    /// Drops every node reference while keeping the buffers.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.turns.clear();
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// The node the call is currently working on.
    pub(crate) fn deepest(&self) -> &Node<T> {
        let Some(node) = self.nodes.last() else {
            panic!("path engine used before a path was located");
        };
        node
    }
}

impl<T: Clone> Path<T> {
    /// Creates a leaf owned by this path's generation.
    pub(crate) fn new_leaf(&self, item: T) -> NodeRef<T> {
        Arc::new(Node::leaf(item, self.generation))
    }

    /// Returns `node` if this call may edit it, otherwise a copy it may edit.
    fn claim(&self, node: NodeRef<T>) -> NodeRef<T> {
        if node.generation == self.generation && Arc::strong_count(&node) == 1 {
            node
        } else {
            Arc::new(node.copy_into(self.generation))
        }
    }

    /// Mutable access to the working node. Every node on the path has been
    /// claimed, so this never clones.
    pub(crate) fn deepest_mut(&mut self) -> &mut Node<T> {
        let Some(node) = self.nodes.last_mut() else {
            panic!("path engine used before a path was located");
        };
        Arc::make_mut(node)
    }

    /// Moves the working node's child in `direction` onto the path.
    fn descend(&mut self, direction: Direction) {
        let Some(child) = self.deepest_mut().children[direction.index()].take() else {
            panic!("descended into a missing child; the tree is corrupt");
        };
        let child = self.claim(child);
        self.nodes.push(child);
        self.turns.push(direction);
    }

    /// Builds the path from `root` toward `target`.
    ///
    /// Stops at the node holding an item equal to `target`, or at the node
    /// whose child in the required direction is absent. Returns how `target`
    /// orders relative to that last node.
    pub(crate) fn locate<F>(&mut self, root: NodeRef<T>, target: &T, less: F) -> Ordering
    where
        F: Fn(&T, &T) -> bool,
    {
        self.clear();
        let root = self.claim(root);
        self.nodes.push(root);
        loop {
            let node = self.deepest();
            let (direction, relation) = if less(&node.item, target) {
                (Direction::Greater, Ordering::Greater)
            } else if less(target, &node.item) {
                (Direction::Less, Ordering::Less)
            } else {
                return Ordering::Equal;
            };
            if node.child(direction).is_none() {
                return relation;
            }
            self.descend(direction);
        }
    }

    /// Hangs a new leaf off the working node. Returns `true` when the
    /// opposite slot is empty, the only case in which heights along the
    /// path can have changed.
    pub(crate) fn attach_leaf(&mut self, direction: Direction, item: T) -> bool {
        let leaf = self.new_leaf(item);
        let node = self.deepest_mut();
        node.children[direction.index()] = Some(leaf);
        node.child(direction.flip()).is_none()
    }

    /// Extends the path from an interior working node to its in-order
    /// neighbour: one step into the first child present, then as far as
    /// possible in the opposite direction.
    pub(crate) fn descend_to_neighbor(&mut self) {
        let direction = if self.deepest().child(Direction::Less).is_some() {
            Direction::Less
        } else {
            Direction::Greater
        };
        self.descend(direction);
        let opposite = direction.flip();
        while self.deepest().child(opposite).is_some() {
            self.descend(opposite);
        }
    }

    /// Swaps the item at path position `index` with the working node's item.
    pub(crate) fn swap_with_deepest(&mut self, index: usize) {
        let split = self.nodes.len() - 1;
        let (upper, lower) = self.nodes.split_at_mut(split);
        std::mem::swap(
            &mut Arc::make_mut(&mut upper[index]).item,
            &mut Arc::make_mut(&mut lower[0]).item,
        );
    }

    /// Removes the working node from the path and the tree, returning its
    /// item. Its slot in the parent is already empty.
    pub(crate) fn detach_deepest(&mut self) -> T {
        let Some(node) = self.nodes.pop() else {
            panic!("path engine used before a path was located");
        };
        self.turns.pop();
        Arc::try_unwrap(node).map_or_else(|shared| shared.item.clone(), |node| node.item)
    }

    /// Reattaches the path bottom-up and returns the resulting root.
    ///
    /// With `rebalance` set, every node is checked on the way up until one
    /// is found whose height did not change; nodes above it are only
    /// reattached. The path is empty afterwards.
    pub(crate) fn finish(&mut self, rebalance: bool) -> Option<NodeRef<T>> {
        let mut rebalancing = rebalance;
        let mut carried: Option<NodeRef<T>> = None;
        while let Some(mut node) = self.nodes.pop() {
            if let Some(child) = carried.take() {
                let Some(direction) = self.turns.pop() else {
                    panic!("path lost the slot of a detached child");
                };
                Arc::make_mut(&mut node).children[direction.index()] = Some(child);
            }
            if rebalancing {
                (node, rebalancing) = self.rebalance_node(node);
            }
            carried = Some(node);
        }
        self.turns.clear();
        carried
    }

    /// Restores balance at one node. Returns the subtree root that replaces
    /// it and whether the walk has to continue upward.
    fn rebalance_node(&self, mut node: NodeRef<T>) -> (NodeRef<T>, bool) {
        let (child_height, balance) = node.height_and_balance();
        let heavy = match balance {
            -1..=1 => {
                if u16::from(node.height) == u16::from(child_height) + 1 {
                    return (node, false);
                }
                Arc::make_mut(&mut node).update_height();
                return (node, true);
            }
            2 => Direction::Greater,
            -2 => Direction::Less,
            _ => panic!("balance factor {balance} is outside the AVL bounds; the tree is corrupt"),
        };
        let node = self.restore(node, heavy);
        let changed = u16::from(node.height) != u16::from(child_height) + 1;
        (node, changed)
    }

    /// Rebalances a node whose `heavy` side is two levels taller.
    fn restore(&self, mut node: NodeRef<T>, heavy: Direction) -> NodeRef<T> {
        let toward = heavy.flip();
        let Some(child) = Arc::make_mut(&mut node).children[heavy.index()].take() else {
            panic!("heavy child missing during rebalance; the tree is corrupt");
        };
        let mut child = self.claim(child);
        if child.balance() == toward.lean() {
            child = self.rotate(child, heavy);
        }
        Arc::make_mut(&mut node).children[heavy.index()] = Some(child);
        self.rotate(node, toward)
    }

    /// Rotates `node` toward `toward`; its child on the other side becomes
    /// the root of the subtree.
    ///
    /// ```text
    ///     node              pivot
    ///    /    \            /     \
    ///   x    pivot  =>   node     z
    ///        /   \       /  \
    ///       y     z     x    y
    /// ```
    fn rotate(&self, mut node: NodeRef<T>, toward: Direction) -> NodeRef<T> {
        let heavy = toward.flip();
        let Some(pivot) = Arc::make_mut(&mut node).children[heavy.index()].take() else {
            panic!("rotation pivot missing; the tree is corrupt");
        };
        let mut pivot = self.claim(pivot);
        let pivot_mut = Arc::make_mut(&mut pivot);
        let node_mut = Arc::make_mut(&mut node);
        node_mut.children[heavy.index()] = pivot_mut.children[toward.index()].take();
        node_mut.update_height();
        pivot_mut.children[toward.index()] = Some(node);
        pivot_mut.update_height();
        pivot
    }
}

// =============================================================================
// Tests
// =============================================================================
