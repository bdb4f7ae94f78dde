//! # rtq
//!
//! Fully-persistent FIFO queue and stack for Rust with worst-case O(1)
//! operations.
//!
//! ## Overview
//!
//! Every operation on these structures returns a brand-new version and
//! leaves the receiver untouched, so any number of historical versions
//! stay alive and usable at once. The queue goes further than the usual
//! two-stack design: an incremental rotation protocol spreads the cost
//! of rebuilding the front across subsequent operations, so every single
//! call is O(1) in the worst case, not just amortized. It includes:
//!
//! - **`PersistentStack`**: Immutable LIFO stack built from structurally
//!   shared cons cells
//! - **`PersistentQueue`**: Immutable FIFO queue with worst-case O(1)
//!   `enqueue`, `dequeue`, and `peek`
//!
//! ## Feature Flags
//!
//! - `arc`: Use `Arc` instead of `Rc` for structural sharing, making the
//!   structures `Send + Sync`
//! - `serde`: Serialization and deserialization support
//!
//! ## Example
//!
//! ```rust
//! use rtq::prelude::*;
//!
//! let empty: PersistentQueue<i32> = PersistentQueue::new();
//! let one = empty.enqueue(1);
//! let two = one.enqueue(2);
//!
//! let (first, rest) = two.dequeue().unwrap();
//! assert_eq!(first, 1);
//! assert_eq!(rest.peek(), Ok(&2));
//!
//! // Earlier versions are still alive and unchanged.
//! assert!(empty.is_empty());
//! assert_eq!(one.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use rtq::prelude::*;
/// ```
pub mod prelude {

    pub use crate::persistent::*;
}

pub mod persistent;
