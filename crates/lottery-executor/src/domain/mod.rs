//! # Domain Module
//!
//! Core domain types for the lottery executor.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod missing;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use missing::*;
pub use value_objects::*;
