use super::*;

// ============================================================================
// Basic allocation tests
// ============================================================================

#[test]
fn test_sequential_allocate() {
    let mut slots = SlotAllocator::new(3);
    assert_eq!(slots.allocate(), 0);
    assert_eq!(slots.allocate(), 1);
    assert_eq!(slots.allocate(), 2);
    assert_eq!(slots.record_count(), 3);
    assert_eq!(slots.data().len(), 9);
}

#[test]
fn test_new_is_empty() {
    let slots = SlotAllocator::new(8);
    assert!(slots.is_empty());
    assert_eq!(slots.len(), 0);
    assert_eq!(slots.record_count(), 0);
    assert_eq!(slots.record_len(), 8);
    assert!(slots.as_bytes().is_empty());
}

#[test]
fn test_allocate_grows_by_exactly_one_record() {
    let mut slots = SlotAllocator::new(5);
    slots.allocate();
    assert_eq!(slots.data().len(), 5);
    slots.allocate();
    assert_eq!(slots.data().len(), 10);
}

// ============================================================================
// Free and recycle tests
// ============================================================================

#[test]
fn test_add_delete_add_returns_same_index() {
    let mut slots = SlotAllocator::new(4);
    slots.allocate();
    let b = slots.allocate();
    slots.allocate();
    slots.free(b);
    assert_eq!(slots.allocate(), b);
    assert_eq!(slots.record_count(), 3);
}

#[test]
fn test_free_multiple_recycle_lifo() {
    // Free list is a stack (LIFO): last freed = first recycled
    let mut slots = SlotAllocator::new(2);
    let a = slots.allocate(); // 0
    let _b = slots.allocate(); // 1
    let c = slots.allocate(); // 2
    slots.free(a); // free list: [0]
    slots.free(c); // free list: [0, 2]

    assert_eq!(slots.allocate(), 2);
    assert_eq!(slots.allocate(), 0);
    // Free list exhausted, next is fresh
    assert_eq!(slots.allocate(), 3);
}

#[test]
fn test_free_zeroes_record() {
    let mut slots = SlotAllocator::new(4);
    let a = slots.allocate();
    let b = slots.allocate();
    slots.record_mut(a).copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
    slots.record_mut(b).copy_from_slice(&[5.0, 6.0, 7.0, 8.0]);

    slots.free(a);

    assert_eq!(slots.record(a), &[0.0; 4]);
    assert_eq!(slots.record(b), &[5.0, 6.0, 7.0, 8.0]);
}

#[test]
fn test_recycled_record_reads_zero() {
    let mut slots = SlotAllocator::new(2);
    let a = slots.allocate();
    slots.record_mut(a).fill(9.0);
    slots.free(a);
    let again = slots.allocate();
    assert_eq!(again, a);
    assert_eq!(slots.record(again), &[0.0, 0.0]);
}

#[test]
fn test_len_tracks_live_records() {
    let mut slots = SlotAllocator::new(1);
    slots.allocate();
    slots.allocate();
    assert_eq!(slots.len(), 2);
    slots.free(0);
    assert_eq!(slots.len(), 1);
    assert_eq!(slots.free_slots(), &[0]);
    slots.allocate_pair();
    assert_eq!(slots.len(), 3);
}

// ============================================================================
// Pair allocation tests
// ============================================================================

#[test]
fn test_allocate_pair_grows_by_two_records() {
    let mut slots = SlotAllocator::new(3);
    slots.allocate();
    assert_eq!(slots.allocate_pair(), 1);
    assert_eq!(slots.record_count(), 3);
}

#[test]
fn test_allocate_pair_prefers_adjacent_free_records() {
    let mut slots = SlotAllocator::new(2);
    for _ in 0..8 {
        slots.allocate();
    }
    // Two isolated free slots and one adjacent pair (5, 6)
    slots.free(1);
    slots.free(5);
    slots.free(3);
    slots.free(6);

    let first = slots.allocate_pair();

    assert_eq!(first, 5);
    assert_eq!(slots.record_count(), 8);
    assert_eq!(slots.free_slots(), &[1, 3]);
}

#[test]
fn test_allocate_pair_finds_pair_freed_in_reverse_order() {
    let mut slots = SlotAllocator::new(2);
    for _ in 0..4 {
        slots.allocate();
    }
    slots.free(2);
    slots.free(1);
    assert_eq!(slots.allocate_pair(), 1);
    assert!(slots.free_slots().is_empty());
}

#[test]
fn test_allocate_pair_without_adjacent_free_grows() {
    let mut slots = SlotAllocator::new(2);
    for _ in 0..5 {
        slots.allocate();
    }
    slots.free(0);
    slots.free(2);
    slots.free(4);

    assert_eq!(slots.allocate_pair(), 5);
    assert_eq!(slots.record_count(), 7);
    assert_eq!(slots.free_slots(), &[0, 2, 4]);
}

// ============================================================================
// Clear and byte view tests
// ============================================================================

#[test]
fn test_clear_resets_everything() {
    let mut slots = SlotAllocator::new(4);
    slots.allocate();
    slots.allocate();
    slots.free(0);
    slots.clear();

    assert!(slots.is_empty());
    assert_eq!(slots.record_count(), 0);
    assert!(slots.free_slots().is_empty());
    assert_eq!(slots.allocate(), 0);
}

#[test]
fn test_as_bytes_covers_backing_array() {
    let mut slots = SlotAllocator::new(2);
    let a = slots.allocate();
    slots.record_mut(a).copy_from_slice(&[1.0, 2.0]);
    assert_eq!(slots.as_bytes().len(), 8);
    assert_eq!(&slots.as_bytes()[..4], &1.0f32.to_ne_bytes());
}
