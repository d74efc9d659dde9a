//! # Ports Layer
//!
//! The indexer only has driving ports; storage is the shared
//! [`shared_types::KeyValueStore`].

pub mod inbound;

pub use inbound::*;
