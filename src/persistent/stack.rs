//! Persistent (immutable) LIFO stack.
//!
//! This module provides [`PersistentStack`], an immutable stack built from
//! cons cells that uses structural sharing for efficient operations.
//!
//! # Overview
//!
//! `PersistentStack` is the building block for the persistent queue. It
//! provides:
//!
//! - O(1) push
//! - O(1) pop
//! - O(1) peek
//! - O(1) length access
//!
//! All operations return new stacks without modifying the original, and
//! structural sharing ensures memory efficiency: `push` allocates exactly
//! one cell and `pop` allocates none.
//!
//! # Examples
//!
//! ```rust
//! use rtq::persistent::PersistentStack;
//!
//! // Build a stack by pushing
//! let stack = PersistentStack::new().push(3).push(2).push(1);
//! assert_eq!(stack.peek(), Ok(&1));
//! assert_eq!(stack.len(), 3);
//!
//! // Structural sharing: the original stack is preserved
//! let extended = stack.push(0);
//! assert_eq!(stack.len(), 3);    // Original unchanged
//! assert_eq!(extended.len(), 4); // New stack with pushed element
//!
//! // Pop returns the removed element together with the remaining stack
//! let (top, rest) = stack.pop().unwrap();
//! assert_eq!(top, 1);
//! assert_eq!(rest.len(), 2);
//! assert_eq!(stack.len(), 3);    // Original still unchanged
//! ```
//!
//! # Structural Sharing
//!
//! When you create a new stack by pushing an element, the new stack shares
//! all cells with the original stack:
//!
//! ```text
//! stack1: 1 -> 2 -> 3 -> nil
//! stack2 = stack1.push(0): 0 -> [1 -> 2 -> 3 -> nil]  // shares [1, 2, 3] with stack1
//! ```
//!
//! Popping shares the entire remaining chain, so any number of versions can
//! coexist while referencing the same cells.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

use super::ReferenceCounter;

/// Error returned when an element is requested from an empty stack.
///
/// This error is returned by [`PersistentStack::pop`] and
/// [`PersistentStack::peek`] when the stack contains no elements. The
/// non-failing duals [`PersistentStack::try_pop`] and
/// [`PersistentStack::try_peek`] return `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyStackError;

impl fmt::Display for EmptyStackError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "PersistentStack: stack is empty")
    }
}

impl std::error::Error for EmptyStackError {}

/// Internal cell structure for the persistent stack.
///
/// Each cell contains an element and an optional reference to the cell
/// below it. Using `ReferenceCounter` enables structural sharing between
/// stacks.
struct Node<T> {
    /// The element stored in this cell.
    element: T,
    /// Reference to the cell below (if any).
    next: Option<ReferenceCounter<Self>>,
}

/// A persistent (immutable) LIFO stack.
///
/// `PersistentStack` is an immutable data structure that uses structural
/// sharing to efficiently support versioned use: every operation returns a
/// new stack and leaves the receiver untouched, so all previously obtained
/// versions stay valid.
///
/// # Time Complexity
///
/// | Operation  | Complexity |
/// |------------|------------|
/// | `new`      | O(1)       |
/// | `push`     | O(1)       |
/// | `pop`      | O(1)       |
/// | `peek`     | O(1)       |
/// | `len`      | O(1)       |
///
/// # Examples
///
/// ```rust
/// use rtq::persistent::PersistentStack;
///
/// let stack = PersistentStack::singleton(42);
/// assert_eq!(stack.peek(), Ok(&42));
/// ```
pub struct PersistentStack<T> {
    /// Reference to the top cell (if any).
    head: Option<ReferenceCounter<Node<T>>>,
    /// Cached length for O(1) access.
    length: usize,
}

// Static assertions to verify the sharing mode: Rc pins the stack to one
// thread, Arc frees it.
#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(PersistentStack<i32>: Send, Sync);
#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentStack<i32>: Send, Sync);

impl<T> PersistentStack<T> {
    /// Creates a new empty stack.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentStack;
    ///
    /// let stack: PersistentStack<i32> = PersistentStack::new();
    /// assert!(stack.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            head: None,
            length: 0,
        }
    }

    /// Creates a stack containing a single element.
    ///
    /// # Arguments
    ///
    /// * `element` - The element to store in the stack
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentStack;
    ///
    /// let stack = PersistentStack::singleton(42);
    /// assert_eq!(stack.peek(), Ok(&42));
    /// assert_eq!(stack.len(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().push(element)
    }

    /// Builds a stack from a Vec efficiently.
    ///
    /// Uses `Vec::pop()` to consume elements from the end, which is O(1).
    /// The first element of the Vec ends up on top of the stack.
    ///
    /// # Arguments
    ///
    /// * `elements` - The Vec containing elements to build the stack from
    ///
    /// # Returns
    ///
    /// A new stack whose top-to-bottom order matches the Vec order
    fn build_from_vec(mut elements: Vec<T>) -> Self {
        let length = elements.len();
        if length == 0 {
            return Self::new();
        }

        // Build from bottom to top using Vec::pop()
        let mut head: Option<ReferenceCounter<Node<T>>> = None;
        while let Some(element) = elements.pop() {
            head = Some(ReferenceCounter::new(Node {
                element,
                next: head,
            }));
        }

        Self { head, length }
    }

    /// Pushes an element onto the top of the stack.
    ///
    /// This operation creates a new stack with the element on top, sharing
    /// the structure of the original stack.
    ///
    /// # Arguments
    ///
    /// * `element` - The element to push
    ///
    /// # Returns
    ///
    /// A new stack with the element on top
    ///
    /// # Complexity
    ///
    /// O(1) time and space
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentStack;
    ///
    /// let stack = PersistentStack::new().push(1).push(2).push(3);
    /// assert_eq!(stack.peek(), Ok(&3));
    /// assert_eq!(stack.len(), 3);
    /// ```
    #[inline]
    #[must_use]
    pub fn push(&self, element: T) -> Self {
        Self {
            head: Some(ReferenceCounter::new(Node {
                element,
                next: self.head.clone(),
            })),
            length: self.length + 1,
        }
    }

    /// Returns a reference to the element on top of the stack.
    ///
    /// # Errors
    ///
    /// Returns `Err(EmptyStackError)` if the stack is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::{EmptyStackError, PersistentStack};
    ///
    /// let stack = PersistentStack::new().push(1).push(2);
    /// assert_eq!(stack.peek(), Ok(&2));
    ///
    /// let empty: PersistentStack<i32> = PersistentStack::new();
    /// assert_eq!(empty.peek(), Err(EmptyStackError));
    /// ```
    #[inline]
    pub fn peek(&self) -> Result<&T, EmptyStackError> {
        self.head
            .as_ref()
            .map_or(Err(EmptyStackError), |node| Ok(&node.element))
    }

    /// Returns a reference to the element on top of the stack, or `None`
    /// if the stack is empty.
    ///
    /// This is the non-failing dual of [`PersistentStack::peek`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentStack;
    ///
    /// let stack = PersistentStack::singleton(1);
    /// assert_eq!(stack.try_peek(), Some(&1));
    ///
    /// let empty: PersistentStack<i32> = PersistentStack::new();
    /// assert_eq!(empty.try_peek(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn try_peek(&self) -> Option<&T> {
        self.head.as_ref().map(|node| &node.element)
    }

    /// Returns the number of elements in the stack.
    ///
    /// # Complexity
    ///
    /// O(1) - the length is cached
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentStack;
    ///
    /// let stack = PersistentStack::new().push(1).push(2);
    /// assert_eq!(stack.len(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the stack contains no elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentStack;
    ///
    /// let empty: PersistentStack<i32> = PersistentStack::new();
    /// assert!(empty.is_empty());
    ///
    /// let non_empty = empty.push(1);
    /// assert!(!non_empty.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns an iterator over references to the elements.
    ///
    /// The iterator yields elements from top to bottom.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentStack;
    ///
    /// let stack = PersistentStack::new().push(3).push(2).push(1);
    /// let collected: Vec<&i32> = stack.iter().collect();
    /// assert_eq!(collected, vec![&1, &2, &3]);
    /// ```
    #[inline]
    #[must_use]
    pub const fn iter(&self) -> PersistentStackIterator<'_, T> {
        PersistentStackIterator {
            current: self.head.as_ref(),
        }
    }
}

impl<T: Clone> PersistentStack<T> {
    /// Creates a stack from a slice.
    ///
    /// The first element of the slice becomes the top of the stack, so
    /// iteration order matches the slice order.
    ///
    /// # Arguments
    ///
    /// * `slice` - The slice to build the stack from
    ///
    /// # Complexity
    ///
    /// O(n) where n = `slice.len()`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentStack;
    ///
    /// let stack = PersistentStack::from_slice(&[1, 2, 3]);
    /// assert_eq!(stack.peek(), Ok(&1));
    /// assert_eq!(stack.len(), 3);
    /// ```
    #[must_use]
    pub fn from_slice(slice: &[T]) -> Self {
        Self::build_from_vec(slice.to_vec())
    }

    /// Removes the element on top of the stack.
    ///
    /// Returns the removed element together with the remaining stack. The
    /// remaining stack is the existing chain below the top cell, so this
    /// operation allocates nothing and the original stack is unaffected.
    ///
    /// # Returns
    ///
    /// The removed element and the new stack version
    ///
    /// # Errors
    ///
    /// Returns `Err(EmptyStackError)` if the stack is empty.
    ///
    /// # Complexity
    ///
    /// O(1) time and space
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentStack;
    ///
    /// let stack = PersistentStack::new().push(1).push(2);
    /// let (top, rest) = stack.pop().unwrap();
    /// assert_eq!(top, 2);
    /// assert_eq!(rest.peek(), Ok(&1));
    /// assert_eq!(stack.len(), 2); // Original unchanged
    /// ```
    #[inline]
    pub fn pop(&self) -> Result<(T, Self), EmptyStackError> {
        self.try_pop().ok_or(EmptyStackError)
    }

    /// Removes the element on top of the stack, or returns `None` if the
    /// stack is empty.
    ///
    /// This is the non-failing dual of [`PersistentStack::pop`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rtq::persistent::PersistentStack;
    ///
    /// let stack = PersistentStack::singleton(1);
    /// let (top, rest) = stack.try_pop().unwrap();
    /// assert_eq!(top, 1);
    /// assert!(rest.is_empty());
    ///
    /// let empty: PersistentStack<i32> = PersistentStack::new();
    /// assert!(empty.try_pop().is_none());
    /// ```
    #[inline]
    #[must_use]
    pub fn try_pop(&self) -> Option<(T, Self)> {
        self.head.as_ref().map(|node| {
            let rest = Self {
                head: node.next.clone(),
                length: self.length.saturating_sub(1),
            };
            (node.element.clone(), rest)
        })
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over references to elements of a [`PersistentStack`].
pub struct PersistentStackIterator<'a, T> {
    current: Option<&'a ReferenceCounter<Node<T>>>,
}

impl<'a, T> Iterator for PersistentStackIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.current.map(|node| {
            self.current = node.next.as_ref();
            &node.element
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // We cannot efficiently compute the remaining length,
        // but we know it's at least 0 and at most the original stack length
        (0, None)
    }
}

/// An owning iterator over elements of a [`PersistentStack`].
pub struct PersistentStackIntoIterator<T> {
    stack: PersistentStack<T>,
}

impl<T: Clone> Iterator for PersistentStackIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((element, rest)) = self.stack.try_pop() {
            self.stack = rest;
            Some(element)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.stack.length, Some(self.stack.length))
    }
}

impl<T: Clone> ExactSizeIterator for PersistentStackIntoIterator<T> {
    fn len(&self) -> usize {
        self.stack.length
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

// Clone is implemented by hand so that stacks of non-Clone elements can
// still be cloned: only the head reference and the cached length are copied.
impl<T> Clone for PersistentStack<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
            length: self.length,
        }
    }
}

impl<T> Default for PersistentStack<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for PersistentStack<T> {
    /// Creates a stack from an iterator.
    ///
    /// The first element of the iterator becomes the top of the stack, so
    /// iteration order is preserved.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let elements: Vec<T> = iter.into_iter().collect();
        Self::build_from_vec(elements)
    }
}

impl<T: Clone> IntoIterator for PersistentStack<T> {
    type Item = T;
    type IntoIter = PersistentStackIntoIterator<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        PersistentStackIntoIterator { stack: self }
    }
}

impl<'a, T> IntoIterator for &'a PersistentStack<T> {
    type Item = &'a T;
    type IntoIter = PersistentStackIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for PersistentStack<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.length != other.length {
            return false;
        }
        self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq> Eq for PersistentStack<T> {}

/// Computes a hash value for this stack.
///
/// The hash is computed by first hashing the length, then hashing each
/// element from top to bottom. This ensures that:
///
/// - Stacks with different lengths have different hashes (with high probability)
/// - The order of elements affects the hash value
/// - Equal stacks produce equal hash values (Hash-Eq consistency)
impl<T: Hash> Hash for PersistentStack<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hash the length first to distinguish stacks of different lengths
        self.length.hash(state);
        // Hash each element from top to bottom
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentStack<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentStack<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        let mut first = true;
        for element in self {
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
impl<T: serde::Serialize> serde::Serialize for PersistentStack<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentStackVisitor<T> {
    marker: std::marker::PhantomData<T>,
}

#[cfg(feature = "serde")]
impl<T> PersistentStackVisitor<T> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Visitor<'de> for PersistentStackVisitor<T>
where
    T: serde::Deserialize<'de>,
{
    type Value = PersistentStack<T>;

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
        Ok(PersistentStack::build_from_vec(elements))
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentStack<T>
where
    T: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(PersistentStackVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================
