//! The persistent AVL tree handle.
//!
//! [`AvlTree`] is an immutable value: every insert or delete forks the
//! receiver into a new generation and edits the fork, copying only the nodes
//! on the search path that the new generation does not already own. All
//! other nodes stay shared with the receiver.
//!
//! # Examples
//!
//! ```rust
//! use persistent_avl::AvlTree;
//!
//! let tree = AvlTree::from_items(|left: &i32, right: &i32| left < right, [5, 3, 8]);
//! let grown = tree.insert(4);
//!
//! assert_eq!(tree.len(), 3);
//! assert_eq!(grown.len(), 4);
//! assert_eq!(grown.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5, 8]);
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::iter::Iter;
use super::node::{Direction, MAX_GENERATION, Node, NodeRef, deep_copy};
use super::path::Path;
use super::pool::PathPool;
use crate::error::InvariantViolation;

/// A strict less-than predicate shared by every tree in a lineage.
pub type LessThan<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

// =============================================================================
// AvlTree Definition
// =============================================================================

/// A persistent, ordered, copy-on-write AVL tree.
///
/// Items are kept in the order defined by a strict less-than predicate
/// supplied at construction. Two items neither of which orders before the
/// other are treated as equal, and a tree holds at most one of them.
///
/// Cloning a handle is O(1) and shares everything. Mutating methods take
/// `&self` and return a new handle; the receiver is never changed.
///
/// # Time Complexity
///
/// | Operation               | Complexity   |
/// |-------------------------|--------------|
/// | `get`/`fetch`/`has`     | O(log N)     |
/// | `insert`/`delete`       | O(log N)     |
/// | `min`/`max`             | O(log N)     |
/// | `len`/`fork`            | O(1)         |
/// | `reverse`               | O(N)         |
/// | `sorted_clone`          | O(N log N)   |
///
/// # Examples
///
/// ```rust
/// use persistent_avl::AvlTree;
///
/// let tree: AvlTree<i32> = [5, 3, 8, 1, 4].into_iter().collect();
/// assert_eq!(tree.min(), Some(&1));
/// assert_eq!(tree.max(), Some(&8));
///
/// let (smaller, removed) = tree.delete(&5);
/// assert_eq!(removed, Some(5));
/// assert_eq!(smaller.len(), 4);
/// assert_eq!(tree.len(), 5);
/// ```
pub struct AvlTree<T> {
    root: Option<NodeRef<T>>,
    less: LessThan<T>,
    /// Generation new and copied nodes are stamped with while this handle
    /// is being edited.
    generation: u64,
    length: usize,
    pool: Arc<PathPool<T>>,
}

static_assertions::assert_impl_all!(AvlTree<i32>: Send, Sync, Clone);

impl<T> Clone for AvlTree<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            less: Arc::clone(&self.less),
            generation: self.generation,
            length: self.length,
            pool: Arc::clone(&self.pool),
        }
    }
}

// =============================================================================
// Bulk Capabilities
// =============================================================================

/// Inserts items into a tree under construction.
///
/// Handed to the callbacks of [`AvlTree::create_with`] and
/// [`AvlTree::insert_with`]; every insert reuses the same path engine.
pub struct Filler<'a, T> {
    tree: &'a mut AvlTree<T>,
    path: &'a mut Path<T>,
}

impl<T: Clone> Filler<'_, T> {
    /// Inserts `item`, replacing an equal item if one is present.
    pub fn insert(&mut self, item: T) {
        self.tree.insert_one(self.path, item);
    }

    /// Number of items in the tree so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.length
    }

    /// Returns `true` if nothing has been inserted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.length == 0
    }
}

/// Removes items from a tree being edited.
///
/// Handed to the callback of [`AvlTree::delete_with`].
pub struct Eraser<'a, T> {
    tree: &'a mut AvlTree<T>,
    path: &'a mut Path<T>,
}

impl<T: Clone> Eraser<'_, T> {
    /// Removes the item equal to `item`, returning it if it was present.
    pub fn delete(&mut self, item: &T) -> Option<T> {
        self.tree.delete_one(self.path, item)
    }

    /// Number of items left in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.length
    }

    /// Returns `true` once every item has been removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.length == 0
    }
}

// =============================================================================
// Construction and Queries
// =============================================================================

impl<T> AvlTree<T> {
    fn with_parts(less: LessThan<T>, pool: Arc<PathPool<T>>) -> Self {
        Self {
            root: None,
            less,
            generation: 0,
            length: 0,
            pool,
        }
    }

    /// Creates an empty tree ordered by `less`, starting a new lineage.
    ///
    /// `less` must be a strict weak ordering.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::AvlTree;
    ///
    /// let tree = AvlTree::new(|left: &String, right: &String| left.len() < right.len());
    /// assert!(tree.is_empty());
    /// ```
    #[must_use]
    pub fn new<F>(less: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Self::with_parts(Arc::new(less), Arc::new(PathPool::new()))
    }

    /// Creates an empty tree ordered by `T`'s own `Ord` implementation.
    #[must_use]
    pub fn natural() -> Self
    where
        T: Ord + 'static,
    {
        Self::new(|left: &T, right: &T| left < right)
    }

    /// Returns the number of items in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the tree holds no items.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the number of nodes on the longest root-to-leaf path, 0 for
    /// an empty tree.
    #[must_use]
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, |root| usize::from(root.height))
    }

    /// Returns the generation this handle edits in when it is forked.
    ///
    /// Every fork advances the generation by one; deleting the last item
    /// resets it to 0.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the ordering the tree is sorted by.
    #[must_use]
    pub fn less(&self) -> LessThan<T> {
        Arc::clone(&self.less)
    }

    /// Builds a comparator for [`get`](Self::get) and [`has`](Self::has)
    /// from this tree's ordering.
    ///
    /// The comparator reports how a stored item orders relative to
    /// `reference`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::AvlTree;
    ///
    /// let tree: AvlTree<i32> = [1, 2, 3].into_iter().collect();
    /// assert!(tree.has(tree.comparator(2)));
    /// assert!(!tree.has(tree.comparator(7)));
    /// ```
    pub fn comparator(&self, reference: T) -> impl Fn(&T) -> Ordering + use<T> {
        let less = Arc::clone(&self.less);
        move |stored: &T| {
            if less(stored, &reference) {
                Ordering::Less
            } else if less(&reference, stored) {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        }
    }

    /// Returns the stored item for which `comparator` reports
    /// [`Ordering::Equal`].
    ///
    /// `comparator` describes how a stored item orders relative to the
    /// item being looked for: `Greater` sends the search toward smaller
    /// items and `Less` toward larger ones. It must agree with the tree's
    /// ordering, otherwise the result is unspecified.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::AvlTree;
    ///
    /// let tree = AvlTree::from_items(
    ///     |left: &(u32, &str), right: &(u32, &str)| left.0 < right.0,
    ///     [(1, "one"), (2, "two")],
    /// );
    /// assert_eq!(tree.get(|stored| stored.0.cmp(&2)), Some(&(2, "two")));
    /// assert_eq!(tree.get(|stored| stored.0.cmp(&9)), None);
    /// ```
    pub fn get<F>(&self, comparator: F) -> Option<&T>
    where
        F: Fn(&T) -> Ordering,
    {
        let mut node = self.root.as_deref();
        while let Some(current) = node {
            let direction = match comparator(&current.item) {
                Ordering::Greater => Direction::Less,
                Ordering::Less => Direction::Greater,
                Ordering::Equal => return Some(&current.item),
            };
            node = current.child(direction).map(|child| child.as_ref());
        }
        None
    }

    /// Returns `true` if some stored item is judged equal by `comparator`.
    pub fn has<F>(&self, comparator: F) -> bool
    where
        F: Fn(&T) -> Ordering,
    {
        self.get(comparator).is_some()
    }

    /// Returns the stored item equal to `item` under the tree's ordering.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::AvlTree;
    ///
    /// let tree: AvlTree<i32> = [4, 2, 6].into_iter().collect();
    /// assert_eq!(tree.fetch(&2), Some(&2));
    /// assert_eq!(tree.fetch(&3), None);
    /// ```
    #[must_use]
    pub fn fetch(&self, item: &T) -> Option<&T> {
        let mut node = self.root.as_deref();
        while let Some(current) = node {
            let direction = if (self.less)(item, &current.item) {
                Direction::Less
            } else if (self.less)(&current.item, item) {
                Direction::Greater
            } else {
                return Some(&current.item);
            };
            node = current.child(direction).map(|child| child.as_ref());
        }
        None
    }

    /// Returns the smallest item, or `None` if the tree is empty.
    #[must_use]
    pub fn min(&self) -> Option<&T> {
        self.root
            .as_deref()
            .map(|root| &root.extreme(Direction::Less).item)
    }

    /// Returns the largest item, or `None` if the tree is empty.
    #[must_use]
    pub fn max(&self) -> Option<&T> {
        self.root
            .as_deref()
            .map(|root| &root.extreme(Direction::Greater).item)
    }

    /// Returns an iterator over the items in ascending order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::AvlTree;
    ///
    /// let tree: AvlTree<i32> = [3, 1, 2].into_iter().collect();
    /// let items: Vec<&i32> = tree.iter().collect();
    /// assert_eq!(items, vec![&1, &2, &3]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.root.as_ref(), self.length)
    }

    /// Checks every structural invariant of the tree.
    ///
    /// Reports the first item out of order, node out of balance, node with
    /// a stale height, or a count that disagrees with the reachable nodes.
    /// A tree only fails this check when its ordering is not a strict weak
    /// ordering.
    ///
    /// # Errors
    ///
    /// Returns the [`InvariantViolation`] that was found.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut audit = Audit {
            less: &*self.less,
            previous: None,
            position: 0,
        };
        audit.visit(self.root.as_deref())?;
        if audit.position != self.length {
            return Err(InvariantViolation::LengthMismatch {
                recorded: self.length,
                reachable: audit.position,
            });
        }
        Ok(())
    }
}

/// In-order walk behind [`AvlTree::validate`].
struct Audit<'a, T> {
    less: &'a (dyn Fn(&T, &T) -> bool + Send + Sync),
    previous: Option<&'a T>,
    position: usize,
}

impl<'a, T> Audit<'a, T> {
    /// Returns the height of the subtree rooted at `node`.
    fn visit(&mut self, node: Option<&'a Node<T>>) -> Result<u8, InvariantViolation> {
        let Some(node) = node else {
            return Ok(0);
        };
        let less_height = self.visit(node.child(Direction::Less).map(|child| child.as_ref()))?;

        let position = self.position;
        if let Some(previous) = self.previous
            && !(self.less)(previous, &node.item)
        {
            return Err(InvariantViolation::OutOfOrder { position });
        }
        self.previous = Some(&node.item);
        self.position += 1;

        let greater_height =
            self.visit(node.child(Direction::Greater).map(|child| child.as_ref()))?;

        let balance = i16::from(greater_height) - i16::from(less_height);
        if balance.abs() > 1 {
            return Err(InvariantViolation::Unbalanced { position, balance });
        }
        let computed = less_height.max(greater_height).saturating_add(1);
        if node.height != computed {
            return Err(InvariantViolation::HeightMismatch {
                position,
                stored: node.height,
                computed,
            });
        }
        Ok(computed)
    }
}

// =============================================================================
// Mutation
// =============================================================================

impl<T: Clone> AvlTree<T> {
    /// Creates a tree ordered by `less` holding `items`.
    ///
    /// Later items replace earlier ones they are equal to. All items are
    /// inserted through one path engine.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::AvlTree;
    ///
    /// let tree = AvlTree::from_items(|left: &i32, right: &i32| left < right, [5, 3, 8, 3]);
    /// assert_eq!(tree.len(), 3);
    /// ```
    #[must_use]
    pub fn from_items<F, I>(less: F, items: I) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        let mut tree = Self::new(less);
        tree.extend_in_place(items);
        tree
    }

    /// Creates a tree ordered by `less` and filled by `fill`.
    ///
    /// `fill` receives a [`Filler`] and may insert any number of items
    /// through it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::AvlTree;
    ///
    /// let tree = AvlTree::create_with(|left: &u64, right: &u64| left < right, |filler| {
    ///     for value in 0..100 {
    ///         filler.insert(value * value);
    ///     }
    /// });
    /// assert_eq!(tree.len(), 100);
    /// assert_eq!(tree.max(), Some(&9801));
    /// ```
    #[must_use]
    pub fn create_with<F, P>(less: F, fill: P) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
        P: FnOnce(&mut Filler<'_, T>),
    {
        let mut tree = Self::new(less);
        tree.edit_in_place(|tree, path| fill(&mut Filler { tree, path }));
        tree
    }

    /// Creates an independent tree ordered by `less` holding `items` that
    /// shares only this tree's path engine pool.
    #[must_use]
    pub fn bud<F, I>(&self, less: F, items: I) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        let mut tree = Self::with_parts(Arc::new(less), Arc::clone(&self.pool));
        tree.extend_in_place(items);
        tree
    }

    /// Returns a handle sharing this tree's items in the next generation.
    ///
    /// When the generation counter would pass its limit the fork copies
    /// every node instead and restarts at generation 0.
    #[must_use]
    pub fn fork(&self) -> Self {
        let generation = self.generation + 1;
        if generation < MAX_GENERATION {
            return Self {
                generation,
                ..self.clone()
            };
        }
        tracing::warn!(
            generation = self.generation,
            length = self.length,
            "generation limit reached, copying every node"
        );
        Self {
            root: self.root.as_ref().map(|root| deep_copy(root, false)),
            generation: 0,
            ..self.clone()
        }
    }

    /// Returns a tree with `item` added, replacing an equal item if one is
    /// present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::AvlTree;
    ///
    /// let tree: AvlTree<i32> = [1, 2, 3].into_iter().collect();
    /// let grown = tree.insert(4);
    /// assert!(!tree.has(tree.comparator(4)));
    /// assert!(grown.has(grown.comparator(4)));
    /// ```
    #[must_use]
    pub fn insert(&self, item: T) -> Self {
        self.edit(|tree, path| tree.insert_one(path, item)).0
    }

    /// Returns a tree with every item of `items` added.
    #[must_use]
    pub fn insert_from<I>(&self, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        self.edit(|tree, path| {
            for item in items {
                tree.insert_one(path, item);
            }
        })
        .0
    }

    /// Returns a tree with every item `fill` inserts through its
    /// [`Filler`] added.
    #[must_use]
    pub fn insert_with<P>(&self, fill: P) -> Self
    where
        P: FnOnce(&mut Filler<'_, T>),
    {
        self.edit(|tree, path| fill(&mut Filler { tree, path })).0
    }

    /// Returns a tree without the item equal to `item`, together with the
    /// removed item if there was one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::AvlTree;
    ///
    /// let tree: AvlTree<i32> = [1, 2, 3].into_iter().collect();
    /// let (smaller, removed) = tree.delete(&2);
    /// assert_eq!(removed, Some(2));
    /// assert_eq!(smaller.len(), 2);
    ///
    /// let (same, removed) = tree.delete(&9);
    /// assert_eq!(removed, None);
    /// assert_eq!(same.len(), 3);
    /// ```
    #[must_use]
    pub fn delete(&self, item: &T) -> (Self, Option<T>) {
        self.edit(|tree, path| tree.delete_one(path, item))
    }

    /// Returns a tree without the items `erase` removes through its
    /// [`Eraser`].
    #[must_use]
    pub fn delete_with<E>(&self, erase: E) -> Self
    where
        E: FnOnce(&mut Eraser<'_, T>),
    {
        self.edit(|tree, path| erase(&mut Eraser { tree, path })).0
    }

    /// Returns a tree without any item equal to an item of `items`.
    #[must_use]
    pub fn delete_from<I>(&self, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        self.edit(|tree, path| {
            for item in items {
                tree.delete_one(path, item.borrow());
            }
        })
        .0
    }

    /// Returns a tree without the items equal to `items`, together with
    /// the number of items removed.
    #[must_use]
    pub fn delete_items(&self, items: &[T]) -> (Self, usize) {
        self.edit(|tree, path| {
            items
                .iter()
                .filter(|item| tree.delete_one(path, item).is_some())
                .count()
        })
    }

    /// Forks the receiver and runs `operation` on the fork.
    fn edit<R, O>(&self, operation: O) -> (Self, R)
    where
        O: FnOnce(&mut Self, &mut Path<T>) -> R,
    {
        let mut fork = self.fork();
        let result = fork.edit_in_place(operation);
        (fork, result)
    }

    /// Runs `operation` on this handle with a pooled path engine.
    fn edit_in_place<R, O>(&mut self, operation: O) -> R
    where
        O: FnOnce(&mut Self, &mut Path<T>) -> R,
    {
        let mut path = PathPool::acquire(&self.pool, self.generation);
        debug_assert_eq!(path.generation(), self.generation);
        let result = operation(self, &mut *path);
        self.reattach(&mut path);
        result
    }

    /// Zips back a path left behind by a call that unwound out of the
    /// ordering, so a caught panic inside a [`Filler`] or [`Eraser`]
    /// callback does not cost the tree its root.
    fn reattach(&mut self, path: &mut Path<T>) {
        if !path.is_empty() {
            self.root = path.finish(false);
        }
    }

    fn extend_in_place<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.edit_in_place(|tree, path| {
            for item in items {
                tree.insert_one(path, item);
            }
        });
    }

    fn insert_one(&mut self, path: &mut Path<T>, item: T) {
        self.reattach(path);
        let Some(root) = self.root.take() else {
            self.root = Some(path.new_leaf(item));
            self.length = 1;
            return;
        };
        let rebalance = match path.locate(root, &item, &*self.less) {
            Ordering::Equal => {
                path.deepest_mut().item = item;
                false
            }
            Ordering::Less => {
                self.length += 1;
                path.attach_leaf(Direction::Less, item)
            }
            Ordering::Greater => {
                self.length += 1;
                path.attach_leaf(Direction::Greater, item)
            }
        };
        self.root = path.finish(rebalance);
    }

    fn delete_one(&mut self, path: &mut Path<T>, item: &T) -> Option<T> {
        self.reattach(path);
        let root = self.root.take()?;
        if path.locate(root, item, &*self.less) != Ordering::Equal {
            self.root = path.finish(false);
            return None;
        }
        loop {
            if path.deepest().height == 1 {
                let removed = path.detach_deepest();
                if path.is_empty() {
                    self.root = None;
                    self.generation = 0;
                } else {
                    self.root = path.finish(true);
                }
                self.length -= 1;
                return Some(removed);
            }
            // Interior node: trade items with the in-order neighbour and
            // keep going until the item sits in a leaf.
            let target = path.len() - 1;
            path.descend_to_neighbor();
            path.swap_with_deepest(target);
        }
    }
}

// =============================================================================
// Reordering
// =============================================================================

impl<T: Clone + 'static> AvlTree<T> {
    /// Returns a tree with the opposite ordering holding the same items.
    ///
    /// Every node is copied with its children swapped, so the result
    /// shares no nodes with the receiver.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::AvlTree;
    ///
    /// let tree: AvlTree<i32> = [1, 2, 3].into_iter().collect();
    /// let reversed = tree.reverse();
    /// assert_eq!(reversed.min(), Some(&3));
    /// assert_eq!(reversed.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
    /// ```
    #[must_use]
    pub fn reverse(&self) -> Self {
        let less = Arc::clone(&self.less);
        tracing::debug!(length = self.length, "copying tree in reverse order");
        Self {
            root: self.root.as_ref().map(|root| deep_copy(root, true)),
            less: Arc::new(move |left: &T, right: &T| less(right, left)),
            generation: 0,
            length: self.length,
            pool: Arc::clone(&self.pool),
        }
    }

    /// Returns an empty tree ordered by `less`, falling back to this tree's
    /// ordering for items `less` considers equal.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::AvlTree;
    ///
    /// type Person = (&'static str, u32);
    ///
    /// let by_name = AvlTree::new(|left: &Person, right: &Person| left.0 < right.0);
    /// let by_age = by_name.sort_by(|left, right| left.1 < right.1);
    /// let people = by_age.insert_from([("bo", 30), ("al", 30), ("cy", 20)]);
    /// let order: Vec<&str> = people.iter().map(|person| person.0).collect();
    /// assert_eq!(order, vec!["cy", "al", "bo"]);
    /// ```
    #[must_use]
    pub fn sort_by<F>(&self, less: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        let fallback = Arc::clone(&self.less);
        let composite = move |left: &T, right: &T| {
            if less(left, right) {
                true
            } else if less(right, left) {
                false
            } else {
                fallback(left, right)
            }
        };
        Self::with_parts(Arc::new(composite), Arc::clone(&self.pool))
    }

    /// Returns a tree holding this tree's items ordered as
    /// [`sort_by`](Self::sort_by) would order them.
    #[must_use]
    pub fn sorted_clone<F>(&self, less: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        let mut tree = self.sort_by(less);
        tree.extend_in_place(self.iter().cloned());
        tree
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T: Ord + 'static> Default for AvlTree<T> {
    fn default() -> Self {
        Self::natural()
    }
}

impl<T: Clone + Ord + 'static> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::natural();
        tree.extend_in_place(iter);
        tree
    }
}

impl<'a, T> IntoIterator for &'a AvlTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for AvlTree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for AvlTree<T> {}

impl<T: fmt::Debug> fmt::Debug for AvlTree<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for AvlTree<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for item in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{item}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for AvlTree<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
struct AvlTreeVisitor<T> {
    marker: std::marker::PhantomData<T>,
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Visitor<'de> for AvlTreeVisitor<T>
where
    T: serde::Deserialize<'de> + Clone + Ord + 'static,
{
    type Value = AvlTree<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut tree = AvlTree::natural();
        let mut failure = None;
        tree.edit_in_place(|tree, path| {
            loop {
                match access.next_element() {
                    Ok(Some(item)) => tree.insert_one(path, item),
                    Ok(None) => break,
                    Err(error) => {
                        failure = Some(error);
                        break;
                    }
                }
            }
        });
        failure.map_or(Ok(tree), Err)
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for AvlTree<T>
where
    T: serde::Deserialize<'de> + Clone + Ord + 'static,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(AvlTreeVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
