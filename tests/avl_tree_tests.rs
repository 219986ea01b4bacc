//! Scenario tests for AvlTree.
//!
//! Covers construction, lookups, single and bulk edits, and the reordering
//! operations.

use persistent_avl::{AvlTree, InvariantViolation};
use rstest::{fixture, rstest};
use std::cmp::Ordering;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

fn ascending(left: &i32, right: &i32) -> bool {
    left < right
}

fn items(tree: &AvlTree<i32>) -> Vec<i32> {
    tree.iter().copied().collect()
}

#[fixture]
fn nine() -> AvlTree<i32> {
    AvlTree::from_items(ascending, [5, 3, 8, 1, 4, 7, 9, 2, 6])
}

// =============================================================================
// Construction Tests
// =============================================================================

#[rstest]
fn test_new_creates_empty_tree() {
    let tree = AvlTree::new(ascending);
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.generation(), 0);
}

#[rstest]
fn test_default_uses_natural_ordering() {
    let tree: AvlTree<String> = AvlTree::default();
    let tree = tree.insert_from(["pear".to_string(), "apple".to_string()]);
    assert_eq!(tree.min(), Some(&"apple".to_string()));
}

#[rstest]
fn test_from_items_builds_balanced_tree(nine: AvlTree<i32>) {
    assert_eq!(nine.len(), 9);
    assert_eq!(nine.min(), Some(&1));
    assert_eq!(nine.max(), Some(&9));
    assert!(nine.height() <= 4);
    assert_eq!(nine.validate(), Ok(()));
}

#[rstest]
fn test_from_items_keeps_last_of_equal_items() {
    let tree = AvlTree::from_items(
        |left: &(i32, char), right: &(i32, char)| left.0 < right.0,
        [(1, 'a'), (2, 'b'), (1, 'c')],
    );
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.fetch(&(1, ' ')), Some(&(1, 'c')));
}

#[rstest]
fn test_create_with_inserts_everything_filled() {
    let tree = AvlTree::create_with(ascending, |filler| {
        assert!(filler.is_empty());
        for value in (0..50).rev() {
            filler.insert(value);
        }
        assert_eq!(filler.len(), 50);
    });
    assert_eq!(items(&tree), (0..50).collect::<Vec<_>>());
    assert_eq!(tree.validate(), Ok(()));
}

#[rstest]
fn test_create_with_nothing_filled_is_empty() {
    let tree = AvlTree::create_with(ascending, |_| {});
    assert!(tree.is_empty());
    assert_eq!(tree.min(), None);
}

#[rstest]
fn test_collect_from_iterator() {
    let tree: AvlTree<i32> = vec![3, 1, 2, 3, 1].into_iter().collect();
    assert_eq!(items(&tree), vec![1, 2, 3]);
}

// =============================================================================
// Query Tests
// =============================================================================

#[rstest]
fn test_empty_tree_reports_not_found() {
    let tree = AvlTree::new(ascending);
    assert_eq!(tree.min(), None);
    assert_eq!(tree.max(), None);
    assert_eq!(tree.get(|_| Ordering::Equal), None);
    assert!(!tree.has(|stored: &i32| stored.cmp(&0)));
    assert_eq!(tree.fetch(&0), None);
    assert_eq!(tree.len(), 0);
}

#[rstest]
#[case(1, true)]
#[case(5, true)]
#[case(9, true)]
#[case(0, false)]
#[case(10, false)]
fn test_get_and_has_with_comparator(
    nine: AvlTree<i32>,
    #[case] target: i32,
    #[case] found: bool,
) {
    let by_value = |stored: &i32| stored.cmp(&target);
    assert_eq!(nine.has(by_value), found);
    assert_eq!(nine.get(by_value).is_some(), found);
    assert_eq!(nine.has(nine.comparator(target)), found);
    assert_eq!(nine.fetch(&target).is_some(), found);
}

#[rstest]
fn test_get_by_key_projection() {
    let tree = AvlTree::from_items(
        |left: &(String, u32), right: &(String, u32)| left.0 < right.0,
        [
            ("carol".to_string(), 3),
            ("alice".to_string(), 1),
            ("bob".to_string(), 2),
        ],
    );
    let found = tree.get(|stored| stored.0.as_str().cmp("bob"));
    assert_eq!(found.map(|entry| entry.1), Some(2));
}

#[rstest]
fn test_comparator_follows_tree_ordering() {
    let tree = AvlTree::from_items(|left: &i32, right: &i32| left > right, [1, 2, 3]);
    let compare = tree.comparator(2);
    assert_eq!(compare(&3), Ordering::Less);
    assert_eq!(compare(&1), Ordering::Greater);
    assert_eq!(compare(&2), Ordering::Equal);
    assert!(tree.has(tree.comparator(3)));
}

#[rstest]
fn test_less_returns_shared_ordering(nine: AvlTree<i32>) {
    let less = nine.less();
    assert!(less(&1, &2));
    assert!(!less(&2, &1));
}

#[rstest]
fn test_iter_is_exact_size(nine: AvlTree<i32>) {
    let mut iter = nine.iter();
    assert_eq!(iter.len(), 9);
    iter.next();
    assert_eq!(iter.len(), 8);
    assert_eq!(iter.count(), 8);
    assert_eq!((&nine).into_iter().sum::<i32>(), 45);
}

// =============================================================================
// Insert Tests
// =============================================================================

#[rstest]
fn test_insert_leaves_receiver_unchanged() {
    let tree = AvlTree::from_items(ascending, [1, 2, 3]);
    let grown = tree.insert(4);
    assert_eq!(tree.len(), 3);
    assert_eq!(grown.len(), 4);
    assert!(!tree.has(tree.comparator(4)));
    assert!(grown.has(grown.comparator(4)));
}

#[rstest]
fn test_insert_equal_item_replaces_without_growing() {
    let tree = AvlTree::from_items(
        |left: &(i32, &str), right: &(i32, &str)| left.0 < right.0,
        [(1, "one"), (2, "two")],
    );
    let replaced = tree.insert((2, "deux"));
    assert_eq!(replaced.len(), 2);
    assert_eq!(replaced.fetch(&(2, "")), Some(&(2, "deux")));
    assert_eq!(tree.fetch(&(2, "")), Some(&(2, "two")));
}

#[rstest]
fn test_insert_from_and_insert_with_agree(nine: AvlTree<i32>) {
    let from_iterator = nine.insert_from(10..20);
    let from_filler = nine.insert_with(|filler| {
        for value in 10..20 {
            filler.insert(value);
        }
    });
    assert_eq!(from_iterator, from_filler);
    assert_eq!(from_iterator.len(), 19);
    assert_eq!(from_iterator.validate(), Ok(()));
    assert_eq!(nine.len(), 9);
}

#[rstest]
fn test_sequential_inserts_stay_logarithmic() {
    let tree = (0..1024).fold(AvlTree::new(ascending), |tree, value| tree.insert(value));
    assert_eq!(tree.len(), 1024);
    assert!(tree.height() <= 15);
    assert_eq!(tree.validate(), Ok(()));
}

// =============================================================================
// Delete Tests
// =============================================================================

#[rstest]
fn test_delete_root_of_scenario_tree(nine: AvlTree<i32>) {
    let (smaller, removed) = nine.delete(&5);
    assert_eq!(removed, Some(5));
    assert_eq!(smaller.len(), 8);
    assert!(!smaller.has(smaller.comparator(5)));
    assert_eq!(items(&smaller), vec![1, 2, 3, 4, 6, 7, 8, 9]);
    assert_eq!(smaller.validate(), Ok(()));
    assert_eq!(nine.len(), 9);
    assert!(nine.has(nine.comparator(5)));
}

#[rstest]
fn test_delete_absent_item_reports_not_found(nine: AvlTree<i32>) {
    let (same, removed) = nine.delete(&42);
    assert_eq!(removed, None);
    assert_eq!(same, nine);
}

#[rstest]
fn test_delete_only_item_resets_generation() {
    let tree = AvlTree::new(ascending).insert(7).insert(8);
    let (tree, _) = tree.delete(&8);
    let (empty, removed) = tree.delete(&7);
    assert_eq!(removed, Some(7));
    assert!(empty.is_empty());
    assert_eq!(empty.generation(), 0);
    assert_eq!(empty.insert(1).generation(), 1);
}

#[rstest]
fn test_delete_with_reports_each_removal(nine: AvlTree<i32>) {
    let mut outcomes = Vec::new();
    let smaller = nine.delete_with(|eraser| {
        outcomes.push(eraser.delete(&1));
        outcomes.push(eraser.delete(&1));
        outcomes.push(eraser.delete(&9));
        assert_eq!(eraser.len(), 7);
    });
    assert_eq!(outcomes, vec![Some(1), None, Some(9)]);
    assert_eq!(items(&smaller), vec![2, 3, 4, 5, 6, 7, 8]);
}

#[rstest]
fn test_delete_with_can_empty_the_tree(nine: AvlTree<i32>) {
    let empty = nine.delete_with(|eraser| {
        for value in 1..=9 {
            eraser.delete(&value);
        }
        assert!(eraser.is_empty());
    });
    assert!(empty.is_empty());
    assert_eq!(empty.generation(), 0);
    assert_eq!(nine.len(), 9);
}

#[rstest]
fn test_delete_from_accepts_owned_and_borrowed_items(nine: AvlTree<i32>) {
    let owned = nine.delete_from(vec![2, 4, 6, 8]);
    let borrowed = nine.delete_from(&[2, 4, 6, 8]);
    assert_eq!(items(&owned), vec![1, 3, 5, 7, 9]);
    assert_eq!(owned, borrowed);
}

#[rstest]
fn test_delete_items_counts_removals(nine: AvlTree<i32>) {
    let (smaller, removed) = nine.delete_items(&[1, 3, 100, 3]);
    assert_eq!(removed, 2);
    assert_eq!(smaller.len(), 7);
}

#[rstest]
fn test_interleaved_inserts_and_deletes_keep_invariants() {
    let mut tree = AvlTree::new(ascending);
    for value in 0..300 {
        tree = tree.insert((value * 37) % 301);
        if value % 3 == 0 {
            tree = tree.delete(&((value * 11) % 301)).0;
        }
        assert_eq!(tree.validate(), Ok(()));
    }
}

// =============================================================================
// Reordering Tests
// =============================================================================

#[rstest]
fn test_bud_shares_nothing_but_the_lineage(nine: AvlTree<i32>) {
    let bud = nine.bud(|left: &i32, right: &i32| left > right, [1, 2, 3]);
    assert_eq!(items(&bud), vec![3, 2, 1]);
    assert_eq!(bud.generation(), 0);
    assert_eq!(nine.len(), 9);
}

#[rstest]
fn test_reverse_inverts_order(nine: AvlTree<i32>) {
    let reversed = nine.reverse();
    assert_eq!(items(&reversed), (1..=9).rev().collect::<Vec<_>>());
    assert_eq!(reversed.min(), Some(&9));
    assert_eq!(reversed.max(), Some(&1));
    assert_eq!(reversed.height(), nine.height());
    assert_eq!(reversed.validate(), Ok(()));

    let grown = reversed.insert(0).insert(10);
    assert_eq!(grown.max(), Some(&0));
    assert_eq!(grown.min(), Some(&10));
    assert_eq!(items(&nine), (1..=9).collect::<Vec<_>>());
}

#[rstest]
fn test_reverse_twice_restores_order(nine: AvlTree<i32>) {
    assert_eq!(nine.reverse().reverse(), nine);
}

#[rstest]
fn test_sort_by_returns_empty_tree(nine: AvlTree<i32>) {
    let sorted = nine.sort_by(|left, right| left % 3 < right % 3);
    assert!(sorted.is_empty());
}

#[rstest]
fn test_sorted_clone_breaks_ties_with_previous_ordering(nine: AvlTree<i32>) {
    let by_remainder = nine.sorted_clone(|left, right| left % 3 < right % 3);
    assert_eq!(items(&by_remainder), vec![3, 6, 9, 1, 4, 7, 2, 5, 8]);
    assert_eq!(by_remainder.len(), 9);
    assert_eq!(by_remainder.validate(), Ok(()));
}

#[rstest]
fn test_sorted_clone_of_reversed_tree_keeps_reversed_ties(nine: AvlTree<i32>) {
    let by_parity = nine.reverse().sorted_clone(|left, right| left % 2 < right % 2);
    assert_eq!(items(&by_parity), vec![8, 6, 4, 2, 9, 7, 5, 3, 1]);
}

// =============================================================================
// Audit and Formatting Tests
// =============================================================================

#[rstest]
fn test_validate_flags_ordering_that_changed_after_construction() {
    let descending = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&descending);
    let tree = AvlTree::from_items(
        move |left: &i32, right: &i32| {
            if flag.load(AtomicOrdering::Relaxed) {
                left > right
            } else {
                left < right
            }
        },
        [1, 2, 3],
    );
    assert_eq!(tree.validate(), Ok(()));

    descending.store(true, AtomicOrdering::Relaxed);
    let violation = tree.validate().unwrap_err();
    assert_eq!(violation, InvariantViolation::OutOfOrder { position: 1 });
}

#[rstest]
fn test_display_lists_items_in_order(nine: AvlTree<i32>) {
    assert_eq!(nine.to_string(), "{1, 2, 3, 4, 5, 6, 7, 8, 9}");
    assert_eq!(format!("{:?}", AvlTree::new(ascending)), "{}");
}

// =============================================================================
// Unwinding Ordering Tests
// =============================================================================

fn rejects_ninety_nine(left: &i32, right: &i32) -> bool {
    assert!(*left != 99 && *right != 99, "ordering rejects 99");
    left < right
}

#[rstest]
fn test_caught_ordering_panic_in_filler_keeps_earlier_items() {
    let tree = AvlTree::create_with(rejects_ninety_nine, |filler| {
        for value in 0..10 {
            filler.insert(value);
        }
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| filler.insert(99)));
        assert!(outcome.is_err());
        assert_eq!(filler.len(), 10);
        filler.insert(100);
    });
    let mut expected: Vec<i32> = (0..10).collect();
    expected.push(100);
    assert_eq!(items(&tree), expected);
    assert_eq!(tree.validate(), Ok(()));
}

#[rstest]
fn test_caught_ordering_panic_as_last_fill_keeps_tree() {
    let tree = AvlTree::create_with(rejects_ninety_nine, |filler| {
        for value in 0..10 {
            filler.insert(value);
        }
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| filler.insert(99)));
        assert!(outcome.is_err());
    });
    assert_eq!(items(&tree), (0..10).collect::<Vec<_>>());
    assert_eq!(tree.validate(), Ok(()));
}

#[rstest]
fn test_caught_ordering_panic_in_eraser_keeps_remaining_items() {
    let tree = AvlTree::from_items(rejects_ninety_nine, 0..10);
    let smaller = tree.delete_with(|eraser| {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| eraser.delete(&99)));
        assert!(outcome.is_err());
        assert_eq!(eraser.delete(&3), Some(3));
    });
    assert_eq!(items(&smaller), vec![0, 1, 2, 4, 5, 6, 7, 8, 9]);
    assert_eq!(smaller.validate(), Ok(()));
    assert_eq!(items(&tree), (0..10).collect::<Vec<_>>());
}
