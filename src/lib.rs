//! # persistent-avl
//!
//! A persistent, copy-on-write AVL tree for Rust.
//!
//! ## Overview
//!
//! [`AvlTree`] is an ordered collection of unique items. Inserting into or
//! deleting from a tree returns a new tree and leaves the receiver intact;
//! both share every node the operation did not need to touch. Handles are
//! cheap to clone and can be sent to and read from any thread.
//!
//! - **Ordering**: any strict less-than predicate, supplied at construction
//! - **Lookups**: by item, or by a comparator consistent with the ordering
//! - **Bulk edits**: fill and erase callbacks that reuse one path engine
//! - **Reordering**: reversed copies and composite orderings
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize` and `Deserialize` for [`AvlTree`]
//!
//! ## Example
//!
//! ```rust
//! use persistent_avl::prelude::*;
//!
//! let tree: AvlTree<i32> = [3, 1, 2].into_iter().collect();
//! let grown = tree.insert(0);
//!
//! assert_eq!(tree.min(), Some(&1));
//! assert_eq!(grown.min(), Some(&0));
//! assert!(grown.validate().is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use persistent_avl::prelude::*;
/// ```
pub mod prelude {
    pub use crate::avl::*;
    pub use crate::error::InvariantViolation;
}

pub mod avl;
pub mod error;

pub use avl::{AvlTree, Eraser, Filler, Iter, LessThan};
pub use error::InvariantViolation;
