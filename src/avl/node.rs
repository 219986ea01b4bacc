//! Tree cells and the per-node height/generation bookkeeping.
//!
//! A [`Node`] is shared between tree snapshots through [`NodeRef`]. Once the
//! mutating call that created it has returned, a node is never written again;
//! later edits copy it into the generation of the call doing the editing.

use std::sync::Arc;

/// Shared handle to a node.
pub(crate) type NodeRef<T> = Arc<Node<T>>;

/// Largest height a node may record. AVL height is at most about
/// `1.44 * log2(n)`, far below this for any addressable element count.
pub(crate) const MAX_HEIGHT: u8 = u8::MAX;

/// Largest generation a lineage may reach before forking falls back to a
/// full copy. Matches the range left over when height is packed in the low
/// eight bits of a 64-bit tag.
pub(crate) const MAX_GENERATION: u64 = u64::MAX >> 8;

// =============================================================================
// Direction
// =============================================================================

/// Which child slot of a node is meant.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Direction {
    /// The child holding items that order before the node's item.
    Less,
    /// The child holding items that order after the node's item.
    Greater,
}

impl Direction {
    #[inline]
    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Less => 0,
            Self::Greater => 1,
        }
    }

    #[inline]
    pub(crate) const fn flip(self) -> Self {
        match self {
            Self::Less => Self::Greater,
            Self::Greater => Self::Less,
        }
    }

    /// Balance factor of a node leaning one step toward this side.
    #[inline]
    pub(crate) const fn lean(self) -> i16 {
        match self {
            Self::Less => -1,
            Self::Greater => 1,
        }
    }
}

// =============================================================================
// Node Definition
// =============================================================================

/// A single tree cell.
#[derive(Clone)]
pub(crate) struct Node<T> {
    /// `children[0]` orders before `item`, `children[1]` after it.
    pub(crate) children: [Option<NodeRef<T>>; 2],
    pub(crate) item: T,
    /// Generation of the mutating call that owns this node.
    pub(crate) generation: u64,
    /// Leaves have height 1.
    pub(crate) height: u8,
}

impl<T> Node<T> {
    /// Creates a childless node owned by `generation`.
    pub(crate) const fn leaf(item: T, generation: u64) -> Self {
        Self {
            children: [None, None],
            item,
            generation,
            height: 1,
        }
    }

    /// Copies this node into `generation`, sharing both children.
    pub(crate) fn copy_into(&self, generation: u64) -> Self
    where
        T: Clone,
    {
        Self {
            children: self.children.clone(),
            item: self.item.clone(),
            generation,
            height: self.height,
        }
    }

    #[inline]
    pub(crate) fn child(&self, direction: Direction) -> Option<&NodeRef<T>> {
        self.children[direction.index()].as_ref()
    }

    #[inline]
    pub(crate) fn child_height(&self, direction: Direction) -> u8 {
        self.child(direction).map_or(0, |child| child.height)
    }

    /// Height of the taller child, 0 when there are none.
    #[inline]
    pub(crate) fn max_child_height(&self) -> u8 {
        self.child_height(Direction::Less)
            .max(self.child_height(Direction::Greater))
    }

    /// Greater-child height minus less-child height.
    #[inline]
    pub(crate) fn balance(&self) -> i16 {
        i16::from(self.child_height(Direction::Greater))
            - i16::from(self.child_height(Direction::Less))
    }

    /// Returns the taller child's height together with the balance factor.
    #[inline]
    pub(crate) fn height_and_balance(&self) -> (u8, i16) {
        (self.max_child_height(), self.balance())
    }

    /// Recomputes this node's height from its children.
    pub(crate) fn update_height(&mut self) {
        let child_height = self.max_child_height();
        assert!(
            child_height < MAX_HEIGHT,
            "tree height exceeds {MAX_HEIGHT}; the tree is corrupt"
        );
        self.height = child_height + 1;
    }

    /// Follows `direction` until the last node on that side.
    pub(crate) fn extreme(&self, direction: Direction) -> &Self {
        let mut node = self;
        while let Some(child) = node.child(direction) {
            node = child;
        }
        node
    }
}

/// Copies every node below `node` into generation 0, swapping child slots
/// when `reverse` is set. Heights are carried over unchanged.
pub(crate) fn deep_copy<T: Clone>(node: &NodeRef<T>, reverse: bool) -> NodeRef<T> {
    let mut less = node.child(Direction::Less).map(|child| deep_copy(child, reverse));
    let mut greater = node
        .child(Direction::Greater)
        .map(|child| deep_copy(child, reverse));
    if reverse {
        std::mem::swap(&mut less, &mut greater);
    }
    Arc::new(Node {
        children: [less, greater],
        item: node.item.clone(),
        generation: 0,
        height: node.height,
    })
}

// =============================================================================
// Tests
// =============================================================================
