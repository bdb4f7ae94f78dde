//! Persistent (immutable) data structures.
//!
//! This module provides efficient immutable data structures that use
//! structural sharing to minimize copying:
//!
//! - [`PersistentStack`]: Persistent LIFO stack (cons cells)
//! - [`PersistentQueue`]: Persistent FIFO queue with worst-case O(1)
//!   operations (incremental rotation over five stacks)
//!
//! # Structural Sharing
//!
//! All data structures in this module use structural sharing to ensure
//! that operations like pushing, enqueueing, or dequeueing create new
//! versions without copying the entire structure. Every version produced
//! along the way remains valid and independently usable.
//!
//! # Examples
//!
//! ## `PersistentStack`
//!
//! ```rust
//! use rtq::persistent::PersistentStack;
//!
//! let stack = PersistentStack::new().push(3).push(2).push(1);
//! assert_eq!(stack.peek(), Ok(&1));
//!
//! // Structural sharing: the original stack is preserved
//! let extended = stack.push(0);
//! assert_eq!(stack.len(), 3);    // Original unchanged
//! assert_eq!(extended.len(), 4); // New stack
//! ```
//!
//! ## `PersistentQueue`
//!
//! ```rust
//! use rtq::persistent::PersistentQueue;
//!
//! let queue = PersistentQueue::new().enqueue(1).enqueue(2).enqueue(3);
//! assert_eq!(queue.peek(), Ok(&1));
//!
//! // Structural sharing: the original queue is preserved
//! let (front, rest) = queue.dequeue().unwrap();
//! assert_eq!(front, 1);
//! assert_eq!(queue.len(), 3); // Original unchanged
//! assert_eq!(rest.len(), 2);  // New queue
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod queue;
mod stack;

pub use queue::EmptyQueueError;
pub use queue::PersistentQueue;
pub use queue::PersistentQueueIntoIterator;
pub use queue::PersistentQueueIterator;
pub use stack::EmptyStackError;
pub use stack::PersistentStack;
pub use stack::PersistentStackIntoIterator;
pub use stack::PersistentStackIterator;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod reference_counter_tests {
    use super::ReferenceCounter;
    use rstest::rstest;

    #[rstest]
    fn test_reference_counter_clone() {
        let reference_counter: ReferenceCounter<i32> = ReferenceCounter::new(42);
        let reference_counter_clone = reference_counter.clone();
        assert_eq!(*reference_counter, *reference_counter_clone);
    }

    #[rstest]
    fn test_reference_counter_strong_count() {
        let reference_counter: ReferenceCounter<i32> = ReferenceCounter::new(42);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 1);
        let reference_counter_clone = reference_counter.clone();
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 2);
        drop(reference_counter_clone);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 1);
    }

    #[rstest]
    fn test_reference_counter_pointer_equality_after_clone() {
        let reference_counter: ReferenceCounter<String> =
            ReferenceCounter::new("shared".to_string());
        let reference_counter_clone = reference_counter.clone();
        assert!(ReferenceCounter::ptr_eq(
            &reference_counter,
            &reference_counter_clone
        ));
    }
}
