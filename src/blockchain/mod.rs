// Blockchain module
//
// This module contains the core ledger implementation including:
// - Account and account registry
// - Transaction structure and content-derived ids
// - Block structure and hashing
// - Blockchain structure and verification
// - The ledger engine that ties them together

pub mod account;
pub mod block;
pub mod chain;
pub mod clock;
pub mod crypto;
pub mod ledger;
pub mod shared;
pub mod transaction;

// Re-export main components for easier access
pub use account::{Account, AccountRegistry};
pub use block::Block;
pub use chain::{Blockchain, ChainError};
pub use clock::{Clock, ManualClock, SystemClock};
pub use ledger::{Ledger, LedgerError, LedgerState, LogProcessor, TransactionProcessor};
pub use shared::SharedLedger;
pub use transaction::{Amount, Transaction};
