//! Persistent (immutable) FIFO queue with worst-case O(1) operations.
//!
//! This module provides [`PersistentQueue`], an immutable queue whose
//! `enqueue`, `dequeue`, and `peek` all run in worst-case constant time,
//! on every version ever produced.
//!
//! # Overview
//!
//! A classic two-stack functional queue reverses its rear stack into the
//! front whenever the front runs dry. The reversal is O(n), which is
//! acceptable amortized for a single timeline but not for a persistent
//! structure: any number of live versions can sit just before the
//! expensive step, and each one can be charged for it over and over.
//!
//! `PersistentQueue` performs the reversal incrementally instead. The
//! moment the rear grows longer than the front, the queue freezes its
//! stacks and starts a rebuild, then carries the rebuild forward by at
//! most three primitive steps during each subsequent operation:
//!
//! 1. The pre-rebuild front is moved, element by element, into a schedule
//!    stack, while a frozen snapshot of it keeps serving reads.
//! 2. The frozen rear is reversed into the new front, one element per
//!    step.
//! 3. The scheduled elements are pushed back on top of the new front in
//!    their original order; elements that a mid-rebuild `dequeue` already
//!    served are discarded instead.
//!
//! Enqueues performed while the rebuild is in flight go to a separate
//! buffer stack so the rebuild's view of the rear never shifts; the
//! buffer becomes the new rear when the rebuild completes. The step
//! budget is sized so that a rebuild always finishes before intervening
//! dequeues could exhaust the elements it is rebuilding, which is what
//! lifts every operation from amortized to worst-case O(1).
//!
//! # Examples
//!
//! ```rust
//! use rtq::persistent::PersistentQueue;
//!
//! let queue = PersistentQueue::new().enqueue(1).enqueue(2).enqueue(3);
//! assert_eq!(queue.peek(), Ok(&1));
//!
//! let (first, rest) = queue.dequeue().unwrap();
//! assert_eq!(first, 1);
//! assert_eq!(rest.peek(), Ok(&2));
//!
//! // Structural sharing: the original queue is preserved
//! assert_eq!(queue.len(), 3);
//! assert_eq!(queue.to_vec(), vec![1, 2, 3]);
//! ```
//!
//! # Structural Sharing
//!
//! Elements are stored behind reference-counted pointers, so moving an
//! element between the internal stacks during a rebuild only bumps a
//! reference count and never clones the element itself. Any number of
//! versions share the same underlying cells; a cell is reclaimed once no
//! version references it.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

use super::{PersistentStack, ReferenceCounter};

/// Number of rebuild steps performed during each operation while a
/// rebuild is in flight.
///
/// Three steps per operation are enough to retire a rebuild strictly
/// before the elements being rebuilt could be drained by dequeues.
const ROTATION_BUDGET: usize = 3;

/// Error returned when an element is requested from an empty queue.
///
/// This error is returned by [`PersistentQueue::dequeue`] and
/// [`PersistentQueue::peek`] when the queue contains no elements. The
/// non-failing duals [`PersistentQueue::try_dequeue`] and
/// [`PersistentQueue::try_peek`] return `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyQueueError;

impl fmt::Display for EmptyQueueError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "PersistentQueue: queue is empty")
    }
}

impl std::error::Error for EmptyQueueError {}

/// Progress of the incremental front rebuild.
///
/// The rebuild-only stacks exist only inside the `Rebuilding` variant, so
/// a stable queue physically cannot carry stale snapshot or schedule
/// content.
enum RotationState<T> {
    /// No rebuild in flight. The front serves reads and the rear receives
    /// enqueues.
    Stable,
    /// A rebuild is in flight. The front is under reconstruction and the
    /// rear is frozen for reversal.
    Rebuilding {
        /// The pre-rebuild front, frozen at the trigger. Serves reads
        /// while `remaining_to_restore` is positive.
        snapshot: PersistentStack<ReferenceCounter<T>>,
        /// Receives enqueues while the rebuild is in flight. Promoted to
        /// be the rear when the rebuild completes.
        rear_buffer: PersistentStack<ReferenceCounter<T>>,
        /// Archive of pre-rebuild front elements awaiting restoration
        /// onto the new front (or discarding, once served).
        schedule: PersistentStack<ReferenceCounter<T>>,
        /// How many pre-rebuild front elements still have to be either
        /// served by a dequeue or restored onto the new front.
        remaining_to_restore: usize,
        /// Whether the front still holds only pre-rebuild elements, i.e.
        /// the reversal has not started writing into it yet.
        front_still_original: bool,
    },
}

// Clone by hand: the stacks clone without any bound on T, and a derive
// would demand T: Clone anyway.
impl<T> Clone for RotationState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Stable => Self::Stable,
            Self::Rebuilding {
                snapshot,
                rear_buffer,
                schedule,
                remaining_to_restore,
                front_still_original,
            } => Self::Rebuilding {
                snapshot: snapshot.clone(),
                rear_buffer: rear_buffer.clone(),
                schedule: schedule.clone(),
                remaining_to_restore: *remaining_to_restore,
                front_still_original: *front_still_original,
            },
        }
    }
}

/// A persistent (immutable) FIFO queue with worst-case O(1) operations.
///
/// `PersistentQueue` is an immutable data structure: every operation
/// returns a new queue version and leaves the receiver untouched, so all
/// previously obtained versions stay valid and independently usable. An
/// incremental rotation protocol (see the [module documentation](self))
/// bounds the work of every single call by a constant, so the complexity
/// guarantees below are worst-case, not amortized.
///
/// # Time Complexity
///
/// | Operation | Complexity     |
/// |-----------|----------------|
/// | `new`     | O(1)           |
/// | `enqueue` | O(1) worst case |
/// | `dequeue` | O(1) worst case |
/// | `peek`    | O(1) worst case |
/// | `len`     | O(1)           |
///
/// # Examples
///
/// ```rust
/// use rtq::persistent::PersistentQueue;
///
/// let queue = PersistentQueue::singleton(42);
/// assert_eq!(queue.peek(), Ok(&42));
/// ```
pub struct PersistentQueue<T> {
    /// Serves dequeues and peeks in the stable state; holds the front
    /// under reconstruction while a rebuild is in flight.
    front: PersistentStack<ReferenceCounter<T>>,
    /// Receives enqueues in the stable state; frozen and consumed by the
    /// reversal while a rebuild is in flight.
    rear: PersistentStack<ReferenceCounter<T>>,
    /// Rebuild progress, including the rebuild-only stacks.
    state: RotationState<T>,
    /// Cached element count for O(1) access.
    length: usize,
}

// Static assertions to verify the sharing mode: Rc pins the queue to one
// thread, Arc frees it.
#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(PersistentQueue<i32>: Send, Sync);
#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentQueue<i32>: Send, Sync);

impl<T> PersistentQueue<T> {
    /// Creates a new empty queue.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentQueue;
    ///
    /// let queue: PersistentQueue<i32> = PersistentQueue::new();
    /// assert!(queue.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            front: PersistentStack::new(),
            rear: PersistentStack::new(),
            state: RotationState::Stable,
            length: 0,
        }
    }

    /// Creates a queue containing a single element.
    ///
    /// # Arguments
    ///
    /// * `element` - The element to store in the queue
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentQueue;
    ///
    /// let queue = PersistentQueue::singleton(42);
    /// assert_eq!(queue.peek(), Ok(&42));
    /// assert_eq!(queue.len(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().enqueue(element)
    }

    /// Adds an element to the end of the queue.
    ///
    /// Returns a new queue version; the receiver is unaffected. In the
    /// stable state the element goes onto the rear; while a rebuild is in
    /// flight it goes onto the rear buffer instead, so the rebuild's view
    /// of the rear never shifts. Either way the rotation is advanced by
    /// at most its per-operation budget afterwards.
    ///
    /// # Arguments
    ///
    /// * `element` - The element to add
    ///
    /// # Returns
    ///
    /// A new queue version with the element at the end
    ///
    /// # Complexity
    ///
    /// O(1) worst case
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentQueue;
    ///
    /// let queue = PersistentQueue::new().enqueue(1).enqueue(2);
    /// assert_eq!(queue.len(), 2);
    /// assert_eq!(queue.peek(), Ok(&1));
    /// ```
    #[must_use]
    pub fn enqueue(&self, element: T) -> Self {
        let element = ReferenceCounter::new(element);
        match self.state.clone() {
            RotationState::Stable => {
                let queue = Self {
                    front: self.front.clone(),
                    rear: self.rear.push(element),
                    state: RotationState::Stable,
                    length: self.length + 1,
                };
                queue.begin_rotation_if_needed()
            }
            RotationState::Rebuilding {
                snapshot,
                rear_buffer,
                schedule,
                remaining_to_restore,
                front_still_original,
            } => {
                let queue = Self {
                    front: self.front.clone(),
                    rear: self.rear.clone(),
                    state: RotationState::Rebuilding {
                        snapshot,
                        rear_buffer: rear_buffer.push(element),
                        schedule,
                        remaining_to_restore,
                        front_still_original,
                    },
                    length: self.length + 1,
                };
                queue.advance_rotation()
            }
        }
    }

    /// Returns a reference to the element at the beginning of the queue.
    ///
    /// While a rebuild is in flight the element is read from the frozen
    /// snapshot of the pre-rebuild front as long as unrestored elements
    /// remain, and from the rebuilt front afterwards; the two views agree
    /// at the switchover point.
    ///
    /// # Errors
    ///
    /// Returns `Err(EmptyQueueError)` if the queue is empty.
    ///
    /// # Complexity
    ///
    /// O(1) worst case
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::{EmptyQueueError, PersistentQueue};
    ///
    /// let queue = PersistentQueue::new().enqueue(1).enqueue(2);
    /// assert_eq!(queue.peek(), Ok(&1));
    ///
    /// let empty: PersistentQueue<i32> = PersistentQueue::new();
    /// assert_eq!(empty.peek(), Err(EmptyQueueError));
    /// ```
    pub fn peek(&self) -> Result<&T, EmptyQueueError> {
        if self.length == 0 {
            return Err(EmptyQueueError);
        }
        let source = match &self.state {
            RotationState::Rebuilding {
                snapshot,
                remaining_to_restore,
                ..
            } if *remaining_to_restore > 0 => snapshot,
            _ => &self.front,
        };
        match source.peek() {
            Ok(element) => Ok(&**element),
            Err(_) => unreachable!("queue is non-empty but the serving stack is empty"),
        }
    }

    /// Returns a reference to the element at the beginning of the queue,
    /// or `None` if the queue is empty.
    ///
    /// This is the non-failing dual of [`PersistentQueue::peek`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentQueue;
    ///
    /// let queue = PersistentQueue::singleton(1);
    /// assert_eq!(queue.try_peek(), Some(&1));
    ///
    /// let empty: PersistentQueue<i32> = PersistentQueue::new();
    /// assert_eq!(empty.try_peek(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn try_peek(&self) -> Option<&T> {
        self.peek().ok()
    }

    /// Returns the number of elements in the queue.
    ///
    /// # Complexity
    ///
    /// O(1) - the length is cached
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentQueue;
    ///
    /// let queue = PersistentQueue::new().enqueue(1).enqueue(2);
    /// assert_eq!(queue.len(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the queue contains no elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentQueue;
    ///
    /// let empty: PersistentQueue<i32> = PersistentQueue::new();
    /// assert!(empty.is_empty());
    ///
    /// let non_empty = empty.enqueue(1);
    /// assert!(!non_empty.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns an iterator over the elements in FIFO order.
    ///
    /// The iterator works on a private copy of this version: each step
    /// dequeues the copy and yields the removed element, so the iterated
    /// version itself is never changed or consumed, and iteration can be
    /// restarted from it at any time. Elements are yielded by value,
    /// which requires `T: Clone` to drive the iterator.
    ///
    /// # Complexity
    ///
    /// O(1) to create; each step is a worst-case O(1) dequeue
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentQueue;
    ///
    /// let queue = PersistentQueue::new().enqueue(1).enqueue(2).enqueue(3);
    /// let collected: Vec<i32> = queue.iter().collect();
    /// assert_eq!(collected, vec![1, 2, 3]);
    /// assert_eq!(queue.len(), 3); // Original unchanged
    /// ```
    #[inline]
    #[must_use]
    pub fn iter(&self) -> PersistentQueueIterator<T> {
        PersistentQueueIterator {
            queue: self.clone(),
        }
    }

    /// Starts a rebuild if the rear has outgrown the front.
    ///
    /// Called after every operation performed in the stable state. On
    /// trigger, the current front is frozen into the snapshot, its length
    /// is recorded as the restore obligation, and one rotation pass runs
    /// immediately.
    fn begin_rotation_if_needed(self) -> Self {
        if self.rear.len() <= self.front.len() {
            return self;
        }
        let snapshot = self.front.clone();
        let remaining_to_restore = self.front.len();
        let queue = Self {
            front: self.front,
            rear: self.rear,
            state: RotationState::Rebuilding {
                snapshot,
                rear_buffer: PersistentStack::new(),
                schedule: PersistentStack::new(),
                remaining_to_restore,
                front_still_original: true,
            },
            length: self.length,
        };
        queue.advance_rotation()
    }

    /// Advances an in-flight rebuild by at most [`ROTATION_BUDGET`] steps.
    ///
    /// Applied to a stable queue this is a no-op, so the function is total
    /// over both states. The phases run in order within the budget:
    /// dismantle the pre-rebuild front into the schedule, reverse the
    /// frozen rear into the new front, then restore (or discard) the
    /// scheduled elements. When the schedule drains, the rebuild is
    /// complete and the rear buffer becomes the new rear.
    fn advance_rotation(self) -> Self {
        let Self {
            mut front,
            mut rear,
            state,
            length,
        } = self;

        let RotationState::Rebuilding {
            snapshot,
            rear_buffer,
            mut schedule,
            mut remaining_to_restore,
            mut front_still_original,
        } = state
        else {
            return Self {
                front,
                rear,
                state: RotationState::Stable,
                length,
            };
        };

        let mut budget = ROTATION_BUDGET;

        // Phase 1: dismantle the pre-rebuild front into the schedule
        // archive. The frozen snapshot keeps serving reads from the same
        // cells in the meantime.
        while front_still_original && budget > 0 {
            let Some((element, remaining)) = front.try_pop() else {
                break;
            };
            front = remaining;
            schedule = schedule.push(element);
            budget -= 1;
        }

        // Phase 2: reverse the frozen rear into the cleared front, one
        // element per step. The first moved element marks the front as
        // rebuilt content.
        while budget > 0 {
            let Some((element, remaining)) = rear.try_pop() else {
                break;
            };
            front_still_original = false;
            rear = remaining;
            front = front.push(element);
            budget -= 1;
        }

        // Phase 3: put archived elements back on top of the rebuilt front
        // in their original order. Elements that a mid-rebuild dequeue
        // already served are discarded instead of restored.
        while budget > 0 {
            let Some((element, remaining)) = schedule.try_pop() else {
                break;
            };
            schedule = remaining;
            if remaining_to_restore > 0 {
                front = front.push(element);
                remaining_to_restore -= 1;
            }
            budget -= 1;
        }

        if schedule.is_empty() {
            #[cfg(debug_assertions)]
            debug_assert_eq!(remaining_to_restore, 0);
            #[cfg(debug_assertions)]
            debug_assert!(rear.is_empty());
            return Self {
                front,
                rear: rear_buffer,
                state: RotationState::Stable,
                length,
            };
        }

        Self {
            front,
            rear,
            state: RotationState::Rebuilding {
                snapshot,
                rear_buffer,
                schedule,
                remaining_to_restore,
                front_still_original,
            },
            length,
        }
    }
}

impl<T: Clone> PersistentQueue<T> {
    /// Creates a queue from a slice.
    ///
    /// The elements are enqueued in slice order, so the first element of
    /// the slice ends up at the beginning of the queue.
    ///
    /// # Arguments
    ///
    /// * `slice` - The slice to build the queue from
    ///
    /// # Complexity
    ///
    /// O(n) where n = `slice.len()`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentQueue;
    ///
    /// let queue = PersistentQueue::from_slice(&[1, 2, 3]);
    /// assert_eq!(queue.peek(), Ok(&1));
    /// assert_eq!(queue.len(), 3);
    /// ```
    #[must_use]
    pub fn from_slice(slice: &[T]) -> Self {
        slice.iter().cloned().collect()
    }

    /// Removes the element at the beginning of the queue.
    ///
    /// Returns the removed element together with the new queue version;
    /// the receiver is unaffected. While a rebuild is in flight the
    /// element is served from the frozen snapshot as long as unrestored
    /// elements remain, and from the rebuilt front afterwards. Either way
    /// the rotation is advanced by at most its per-operation budget.
    ///
    /// # Returns
    ///
    /// The removed element and the new queue version
    ///
    /// # Errors
    ///
    /// Returns `Err(EmptyQueueError)` if the queue is empty.
    ///
    /// # Complexity
    ///
    /// O(1) worst case
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentQueue;
    ///
    /// let queue = PersistentQueue::new().enqueue(1).enqueue(2);
    /// let (first, rest) = queue.dequeue().unwrap();
    /// assert_eq!(first, 1);
    /// assert_eq!(rest.peek(), Ok(&2));
    /// assert_eq!(queue.len(), 2); // Original unchanged
    /// ```
    pub fn dequeue(&self) -> Result<(T, Self), EmptyQueueError> {
        if self.length == 0 {
            return Err(EmptyQueueError);
        }
        match self.state.clone() {
            RotationState::Stable => {
                let Some((element, front)) = self.front.try_pop() else {
                    unreachable!("queue is non-empty but the front stack is empty");
                };
                let queue = Self {
                    front,
                    rear: self.rear.clone(),
                    state: RotationState::Stable,
                    length: self.length - 1,
                };
                Ok(((*element).clone(), queue.begin_rotation_if_needed()))
            }
            RotationState::Rebuilding {
                snapshot,
                rear_buffer,
                schedule,
                remaining_to_restore,
                front_still_original,
            } => {
                if remaining_to_restore > 0 {
                    let Some((element, snapshot)) = snapshot.try_pop() else {
                        unreachable!("unrestored elements remain but the snapshot is empty");
                    };
                    let queue = Self {
                        front: self.front.clone(),
                        rear: self.rear.clone(),
                        state: RotationState::Rebuilding {
                            snapshot,
                            rear_buffer,
                            schedule,
                            remaining_to_restore: remaining_to_restore - 1,
                            front_still_original,
                        },
                        length: self.length - 1,
                    };
                    Ok(((*element).clone(), queue.advance_rotation()))
                } else {
                    let Some((element, front)) = self.front.try_pop() else {
                        unreachable!("queue is non-empty but the rebuilt front is empty");
                    };
                    let queue = Self {
                        front,
                        rear: self.rear.clone(),
                        state: RotationState::Rebuilding {
                            snapshot,
                            rear_buffer,
                            schedule,
                            remaining_to_restore,
                            front_still_original,
                        },
                        length: self.length - 1,
                    };
                    Ok(((*element).clone(), queue.advance_rotation()))
                }
            }
        }
    }

    /// Removes the element at the beginning of the queue, or returns
    /// `None` if the queue is empty.
    ///
    /// This is the non-failing dual of [`PersistentQueue::dequeue`]. On
    /// an empty queue nothing happens at all; no new version is produced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentQueue;
    ///
    /// let queue = PersistentQueue::singleton(1);
    /// let (element, rest) = queue.try_dequeue().unwrap();
    /// assert_eq!(element, 1);
    /// assert!(rest.is_empty());
    ///
    /// let empty: PersistentQueue<i32> = PersistentQueue::new();
    /// assert!(empty.try_dequeue().is_none());
    /// ```
    #[inline]
    #[must_use]
    pub fn try_dequeue(&self) -> Option<(T, Self)> {
        self.dequeue().ok()
    }

    /// Determines whether an element is in the queue.
    ///
    /// The scan traverses a private copy in FIFO order, so the queue
    /// itself is unaffected.
    ///
    /// # Arguments
    ///
    /// * `element` - The element to locate
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentQueue;
    ///
    /// let queue = PersistentQueue::from_slice(&[1, 2, 3]);
    /// assert!(queue.contains(&2));
    /// assert!(!queue.contains(&4));
    /// ```
    #[must_use]
    pub fn contains(&self, element: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|candidate| candidate == *element)
    }

    /// Copies the queue elements to a new `Vec` in FIFO order.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentQueue;
    ///
    /// let queue = PersistentQueue::new().enqueue(1).enqueue(2).enqueue(3);
    /// assert_eq!(queue.to_vec(), vec![1, 2, 3]);
    /// assert_eq!(queue.len(), 3); // Original unchanged
    /// ```
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over elements of a [`PersistentQueue`] in FIFO order.
///
/// The iterator owns a private copy of the queue version it was created
/// from and dequeues it step by step, yielding elements by value. The
/// original version is never changed or consumed.
pub struct PersistentQueueIterator<T> {
    queue: PersistentQueue<T>,
}

impl<T: Clone> Iterator for PersistentQueueIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let (element, rest) = self.queue.try_dequeue()?;
        self.queue = rest;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.length, Some(self.queue.length))
    }
}

impl<T: Clone> ExactSizeIterator for PersistentQueueIterator<T> {
    fn len(&self) -> usize {
        self.queue.length
    }
}

/// An owning iterator over elements of a [`PersistentQueue`] in FIFO
/// order.
pub struct PersistentQueueIntoIterator<T> {
    queue: PersistentQueue<T>,
}

impl<T: Clone> Iterator for PersistentQueueIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let (element, rest) = self.queue.try_dequeue()?;
        self.queue = rest;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.length, Some(self.queue.length))
    }
}

impl<T: Clone> ExactSizeIterator for PersistentQueueIntoIterator<T> {
    fn len(&self) -> usize {
        self.queue.length
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

// Clone is implemented by hand so that queues of non-Clone elements can
// still be cloned: five stack handles and two scalars are copied.
impl<T> Clone for PersistentQueue<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            front: self.front.clone(),
            rear: self.rear.clone(),
            state: self.state.clone(),
            length: self.length,
        }
    }
}

impl<T> Default for PersistentQueue<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for PersistentQueue<T> {
    /// Creates a queue by enqueueing the iterator's elements in order.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |queue, element| queue.enqueue(element))
    }
}

impl<T: Clone> IntoIterator for PersistentQueue<T> {
    type Item = T;
    type IntoIter = PersistentQueueIntoIterator<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        PersistentQueueIntoIterator { queue: self }
    }
}

impl<'a, T: Clone> IntoIterator for &'a PersistentQueue<T> {
    type Item = T;
    type IntoIter = PersistentQueueIterator<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Compares two queues by their observable FIFO sequence.
///
/// Versions that hold the same elements in the same order compare equal
/// even when their internal rotation progress differs.
impl<T: Clone + PartialEq> PartialEq for PersistentQueue<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.length != other.length {
            return false;
        }
        self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Clone + Eq> Eq for PersistentQueue<T> {}

/// Computes a hash value for this queue.
///
/// The hash is computed by first hashing the length, then hashing each
/// element in FIFO order, so equal queues produce equal hash values
/// regardless of their internal rotation progress (Hash-Eq consistency).
impl<T: Clone + Hash> Hash for PersistentQueue<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hash the length first to distinguish queues of different lengths
        self.length.hash(state);
        // Hash each element in FIFO order
        for element in self.iter() {
            element.hash(state);
        }
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for PersistentQueue<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Clone + fmt::Display> fmt::Display for PersistentQueue<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        let mut first = true;
        for element in self.iter() {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize + Clone> serde::Serialize for PersistentQueue<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self.iter() {
            seq.serialize_element(&element)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentQueueVisitor<T> {
    marker: std::marker::PhantomData<T>,
}

#[cfg(feature = "serde")]
impl<T> PersistentQueueVisitor<T> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Visitor<'de> for PersistentQueueVisitor<T>
where
    T: serde::Deserialize<'de>,
{
    type Value = PersistentQueue<T>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        const MAX_PREALLOCATE: usize = 4096;
        let capacity = seq.size_hint().unwrap_or(0).min(MAX_PREALLOCATE);
        let mut elements = Vec::with_capacity(capacity);
        while let Some(element) = seq.next_element()? {
            elements.push(element);
        }
        Ok(elements.into_iter().collect())
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentQueue<T>
where
    T: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(PersistentQueueVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
impl<T> PersistentQueue<T> {
    /// Whether a rebuild is currently in flight.
    fn is_rebuilding(&self) -> bool {
        matches!(self.state, RotationState::Rebuilding { .. })
    }

    /// Remaining rebuild work, measured in rotation steps: two per
    /// undismantled front element (archive plus restore), one per
    /// unreversed rear element, one per schedule element.
    fn remaining_rotation_steps(&self) -> Option<usize> {
        match &self.state {
            RotationState::Stable => None,
            RotationState::Rebuilding {
                schedule,
                front_still_original,
                ..
            } => {
                let dismantle = if *front_still_original {
                    2 * self.front.len()
                } else {
                    0
                };
                Some(dismantle + self.rear.len() + schedule.len())
            }
        }
    }

    /// Checks that the cached length matches the live elements reachable
    /// through the stacks, phase by phase.
    fn internal_accounting_holds(&self) -> bool {
        match &self.state {
            RotationState::Stable => self.front.len() + self.rear.len() == self.length,
            RotationState::Rebuilding {
                rear_buffer,
                remaining_to_restore,
                front_still_original,
                ..
            } => {
                // While the front is still original its elements are
                // duplicates of snapshot cells and counted through the
                // restore obligation instead.
                let front = if *front_still_original {
                    0
                } else {
                    self.front.len()
                };
                remaining_to_restore + front + self.rear.len() + rear_buffer.len() == self.length
            }
        }
    }

    /// Front length is at least the rear length whenever no rebuild is in
    /// flight.
    fn stable_balance_holds(&self) -> bool {
        match self.state {
            RotationState::Stable => self.front.len() >= self.rear.len(),
            RotationState::Rebuilding { .. } => true,
        }
    }
}
