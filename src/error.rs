//! Error types reported by structural audits.
//!
//! Mutating operations never return errors: a broken invariant found while
//! rebalancing halts the call with a panic. [`InvariantViolation`] is what
//! [`AvlTree::validate`](crate::AvlTree::validate) reports when it inspects
//! a tree and finds it inconsistent, which can only happen when the ordering
//! supplied by the caller is not a strict weak ordering.

/// A structural invariant that does not hold for a tree.
///
/// # Examples
///
/// ```rust
/// use persistent_avl::InvariantViolation;
///
/// let violation = InvariantViolation::OutOfOrder { position: 3 };
/// assert_eq!(
///     format!("{violation}"),
///     "item at in-order position 3 does not order after its predecessor"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// An item does not order strictly after the item before it in an
    /// in-order walk.
    OutOfOrder {
        /// Zero-based in-order position of the offending item.
        position: usize,
    },
    /// A node's children differ in height by more than one.
    Unbalanced {
        /// Zero-based in-order position of the node's item.
        position: usize,
        /// Greater-child height minus less-child height.
        balance: i16,
    },
    /// A node's recorded height disagrees with the height of its subtree.
    HeightMismatch {
        /// Zero-based in-order position of the node's item.
        position: usize,
        /// The height stored in the node.
        stored: u8,
        /// The height computed from the children.
        computed: u8,
    },
    /// The element count of the handle differs from the number of nodes
    /// reachable from its root.
    LengthMismatch {
        /// The count recorded by the handle.
        recorded: usize,
        /// The number of reachable nodes.
        reachable: usize,
    },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfOrder { position } => write!(
                formatter,
                "item at in-order position {position} does not order after its predecessor"
            ),
            Self::Unbalanced { position, balance } => write!(
                formatter,
                "node at in-order position {position} has balance factor {balance}"
            ),
            Self::HeightMismatch {
                position,
                stored,
                computed,
            } => write!(
                formatter,
                "node at in-order position {position} records height {stored} but has height {computed}"
            ),
            Self::LengthMismatch {
                recorded,
                reachable,
            } => write!(
                formatter,
                "tree records {recorded} items but {reachable} are reachable"
            ),
        }
    }
}

impl std::error::Error for InvariantViolation {}
