//! Persistent AVL tree with generation-tagged structural sharing.
//!
//! Every tree handle belongs to a *lineage*: the set of trees derived from
//! one another by forking. A lineage shares three things:
//!
//! - the ordering predicate, behind an `Arc`,
//! - a pool of path engines used by mutating calls,
//! - every node that no later edit had to copy.
//!
//! Nodes carry the generation of the call that created them. A mutating call
//! runs in a fresh generation, edits in place the nodes it created itself
//! and copies everything else it touches, so a handle never observes a
//! change made through another handle.
//!
//! # Examples
//!
//! ```rust
//! use persistent_avl::AvlTree;
//!
//! let base = AvlTree::create_with(|left: &i32, right: &i32| left < right, |filler| {
//!     for value in [50, 20, 80, 10, 30] {
//!         filler.insert(value);
//!     }
//! });
//!
//! let without_twenty = base.delete(&20).0;
//! let with_ninety = base.insert(90);
//!
//! assert_eq!(base.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30, 50, 80]);
//! assert_eq!(without_twenty.len(), 4);
//! assert_eq!(with_ninety.max(), Some(&90));
//! ```

mod iter;
mod node;
mod path;
mod pool;
mod tree;

pub use iter::Iter;
pub use tree::{AvlTree, Eraser, Filler, LessThan};
