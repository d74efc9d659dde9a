//! # Shared Types Crate
//!
//! Platform primitives shared by the lottery executor, the history indexer
//! and the runtime.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Addresses, transaction context and receipts
//!   are defined once here and never redefined by a subsystem.
//! - **Receipts, not side effects**: An executed action reports every write it
//!   made as a `KeyValue` and every audit entry as a `ReceiptLog`.
//! - **Ordered storage**: The `KeyValueStore` port exposes prefix range
//!   listing in both directions, which the history indices rely on.

pub mod entities;
pub mod errors;
pub mod store;

pub use entities::*;
pub use errors::*;
pub use store::*;
