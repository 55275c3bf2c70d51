//! A minimal hash-linked ledger.
//!
//! Transactions are identified by the hash of their content, blocks by the
//! hash of their timestamp, their predecessor's hash and their transaction
//! ids. The [`cli`] module drives a [`blockchain::Ledger`] from a
//! line-oriented command loop.

pub mod blockchain;
pub mod cli;
