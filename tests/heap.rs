//! Integration tests for heaps and priority queues.

use skp_primitives::{Heap, IndexedHeap, PrimitiveError, PriorityQueue};
use tokio_test::{assert_err, assert_ok};

#[test]
fn test_heap_drains_in_order() {
    let mut heap = Heap::min();
    for v in [42, 7, 19, 3, 88, 3, 56] {
        heap.push(v);
    }

    let mut drained = Vec::new();
    while let Some(v) = heap.pop() {
        drained.push(v);
    }
    assert_eq!(drained, vec![3, 3, 7, 19, 42, 56, 88]);
    assert!(heap.is_empty());
}

#[test]
fn test_custom_comparator_heap() {
    // Shortest deadline first, ties broken by name
    let mut jobs = Heap::with_comparator(|a: &(u32, &str), b: &(u32, &str)| a < b);
    jobs.push((30, "report"));
    jobs.push((10, "email"));
    jobs.push((10, "backup"));

    assert_eq!(jobs.pop(), Some((10, "backup")));
    assert_eq!(jobs.pop(), Some((10, "email")));
    assert_eq!(jobs.peek(), Some(&(30, "report")));
}

#[test]
fn test_from_vec_heapifies() {
    let heap = Heap::from_vec(vec![5, 1, 9, 2, 8], |a: &i32, b: &i32| a > b);
    assert_eq!(heap.peek(), Some(&9));
    assert_eq!(heap.into_sorted_vec(), vec![9, 8, 5, 2, 1]);
}

#[test]
fn test_indexed_heap_reprioritizes() {
    let mut heap = IndexedHeap::min();
    for v in [10, 20, 30, 40] {
        assert!(heap.push(v));
    }
    assert!(!heap.push(20));

    assert_ok!(heap.update(&40, 5));
    assert_eq!(heap.peek(), Some(&5));

    assert_eq!(assert_err!(heap.update(&99, 1)), PrimitiveError::NotFound);
    assert_eq!(assert_err!(heap.update(&10, 30)), PrimitiveError::Duplicate);

    assert!(heap.delete(&5));
    assert!(!heap.contains(&5));
    assert_eq!(heap.pop(), Some(10));
    assert_eq!(heap.len(), 2);
}

#[test]
fn test_priority_queue_both_directions() {
    let mut urgent = PriorityQueue::max_first();
    let mut cheap = PriorityQueue::min_first();
    for (task, cost) in [("a", 3), ("b", 9), ("c", 1)] {
        urgent.push(task, cost);
        cheap.push(task, cost);
    }

    assert_eq!(urgent.pop(), Some("b"));
    assert_eq!(cheap.pop(), Some("c"));
    assert_eq!(cheap.peek_priority(), Some(&3));

    let item = urgent.pop_item().unwrap();
    assert_eq!((item.value, item.priority), ("a", 3));
}
