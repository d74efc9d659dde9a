//! # Numbers Lottery Test Suite
//!
//! Cross-crate scenarios that run the executor, the history indexer and the
//! runtime node together.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── multi_round.rs    # Coin conservation over many rounds and lotteries
//! │   ├── history_flow.rs   # Pagination and rollback over real receipts
//! │   └── script_flow.rs    # JSON scripts through the runtime
//! └── benches/
//!     └── lottery_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lottery-tests
//! cargo test -p lottery-tests integration::history_flow
//! cargo bench -p lottery-tests
//! ```

pub mod integration;
