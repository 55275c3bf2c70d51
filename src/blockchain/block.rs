use chrono::{DateTime, Utc};
use serde::Serialize;

use super::clock::canonical_timestamp;
use super::crypto::sha256_hex;
use super::transaction::Transaction;

/// Represents a block in the blockchain
#[derive(Debug, Clone, Serialize)]
pub struct Block {
    /// Timestamp when the block was created
    timestamp: DateTime<Utc>,

    /// List of transactions included in this block, in replay order
    transactions: Vec<Transaction>,

    /// Hash of the previous block, empty for genesis
    previous_hash: String,

    /// Hash of the current block
    hash: String,
}

impl Block {
    /// Creates a new block
    ///
    /// # Arguments
    ///
    /// * `transactions` - The list of transactions to include in the block
    /// * `previous_hash` - The hash of the previous block
    /// * `timestamp` - The creation instant
    ///
    /// # Returns
    ///
    /// A new Block instance
    pub fn new(
        transactions: Vec<Transaction>,
        previous_hash: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let block = Block {
            timestamp,
            transactions,
            previous_hash,
            hash: String::new(),
        };

        let hash = block.calculate_hash();

        Block { hash, ..block }
    }

    /// Calculates the hash of the block
    ///
    /// # Returns
    ///
    /// `hex(sha256(timestamp || previous_hash || tx ids in order))`
    pub fn calculate_hash(&self) -> String {
        let timestamp = canonical_timestamp(&self.timestamp);

        let parts = [timestamp.as_str(), self.previous_hash.as_str()]
            .into_iter()
            .chain(self.transactions.iter().map(Transaction::id));

        sha256_hex(parts)
    }

    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn is_genesis_shaped(&self) -> bool {
        self.previous_hash.is_empty() && self.transactions.is_empty()
    }

    /// Replaces the stored hash without recomputing it
    #[cfg(test)]
    pub(crate) fn with_forged_hash(self, hash: &str) -> Self {
        Block {
            hash: hash.to_string(),
            ..self
        }
    }
}
