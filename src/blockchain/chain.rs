use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;

use super::block::Block;
use super::clock::{Clock, SystemClock};
use super::transaction::Transaction;

/// Reasons a chain can fail verification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Invalid genesis block: {0}")]
    InvalidGenesis(String),

    #[error("Block {index} has hash {stored} but its contents hash to {computed}")]
    HashMismatch {
        index: usize,
        stored: String,
        computed: String,
    },

    #[error("Block {index} links to {previous_hash} instead of {expected}")]
    BrokenLink {
        index: usize,
        previous_hash: String,
        expected: String,
    },
}

/// Represents the blockchain
///
/// Append-only. Block 0 is always the genesis block.
#[derive(Debug, Clone)]
pub struct Blockchain {
    /// The chain of blocks
    blocks: Vec<Block>,

    /// Source of block timestamps
    clock: Arc<dyn Clock>,
}

impl Blockchain {
    /// Creates a new blockchain with a genesis block, timestamped by the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a new blockchain with a genesis block
    ///
    /// # Arguments
    ///
    /// * `clock` - The time source used to timestamp every block
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let genesis_block = Block::new(Vec::new(), String::new(), clock.now());
        debug!("Created genesis block {}", genesis_block.hash());

        Blockchain {
            blocks: vec![genesis_block],
            clock,
        }
    }

    /// Gets the last block in the chain
    pub fn last_block(&self) -> &Block {
        // The genesis block is never removed
        &self.blocks[self.blocks.len() - 1]
    }

    /// Appends a new block holding `transactions`, linked to the current tip
    ///
    /// # Returns
    ///
    /// The newly appended block
    pub fn append(&mut self, transactions: Vec<Transaction>) -> &Block {
        let previous_hash = self.last_block().hash().to_string();
        let block = Block::new(transactions, previous_hash, self.clock.now());

        info!(
            "Appended block {} at height {} with {} transaction(s)",
            block.hash(),
            self.blocks.len(),
            block.transactions().len()
        );

        self.blocks.push(block);
        self.last_block()
    }

    /// Gets the entire blockchain
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: a chain holds at least its genesis block
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Validates the blockchain
    ///
    /// Recomputes every block hash, genesis included, and checks every link.
    ///
    /// # Returns
    ///
    /// The first violation found, if any
    pub fn verify(&self) -> Result<(), ChainError> {
        let genesis = self
            .blocks
            .first()
            .ok_or_else(|| ChainError::InvalidGenesis("chain has no blocks".to_string()))?;

        if !genesis.is_genesis_shaped() {
            return Err(ChainError::InvalidGenesis(
                "genesis must have no previous hash and no transactions".to_string(),
            ));
        }

        for (index, block) in self.blocks.iter().enumerate() {
            let computed = block.calculate_hash();
            if block.hash() != computed {
                return Err(ChainError::HashMismatch {
                    index,
                    stored: block.hash().to_string(),
                    computed,
                });
            }

            if index == 0 {
                continue;
            }

            let previous_block = &self.blocks[index - 1];
            if block.previous_hash() != previous_block.hash() {
                return Err(ChainError::BrokenLink {
                    index,
                    previous_hash: block.previous_hash().to_string(),
                    expected: previous_block.hash().to_string(),
                });
            }
        }

        Ok(())
    }

    /// Boolean form of [`Blockchain::verify`]
    pub fn is_valid(&self) -> bool {
        match self.verify() {
            Ok(()) => true,
            Err(err) => {
                warn!("Chain failed verification: {}", err);
                false
            }
        }
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    use super::*;
    use crate::blockchain::account::Account;
    use crate::blockchain::clock::ManualClock;
    use crate::blockchain::transaction::Amount;

    fn manual_clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ))
    }

    fn transfer(from: &str, to: &str, amount: f64) -> Transaction {
        Transaction::new(
            Arc::new(Account::new(from)),
            Arc::new(Account::new(to)),
            Amount::new(amount),
        )
    }

    #[test]
    fn test_new_blockchain() {
        let blockchain = Blockchain::new();

        assert_eq!(blockchain.len(), 1);
        assert!(!blockchain.is_empty());
        assert_eq!(blockchain.blocks()[0].previous_hash(), "");
        assert!(blockchain.blocks()[0].transactions().is_empty());
        assert!(blockchain.is_valid());
    }

    #[test]
    fn test_append_links_to_tip() {
        let mut blockchain = Blockchain::with_clock(manual_clock());
        let genesis_hash = blockchain.last_block().hash().to_string();

        let block = blockchain.append(vec![transfer("alice", "bob", 10.0)]);
        assert_eq!(block.previous_hash(), genesis_hash);

        let second_hash = block.hash().to_string();
        let block = blockchain.append(Vec::new());
        assert_eq!(block.previous_hash(), second_hash);
        assert!(block.transactions().is_empty());

        assert_eq!(blockchain.len(), 3);
        assert!(blockchain.verify().is_ok());
    }

    #[test]
    fn test_same_clock_reproduces_hashes() {
        let mut first = Blockchain::with_clock(manual_clock());
        let mut second = Blockchain::with_clock(manual_clock());

        first.append(vec![transfer("alice", "bob", 10.0)]);
        second.append(vec![transfer("alice", "bob", 10.0)]);

        assert_eq!(first.last_block().hash(), second.last_block().hash());
    }

    #[test]
    fn test_detects_broken_link() {
        let clock = manual_clock();
        let mut blockchain = Blockchain::with_clock(clock.clone());
        blockchain.append(vec![transfer("alice", "bob", 1.0)]);

        // A self-consistent block pointing at the wrong parent
        blockchain
            .blocks
            .push(Block::new(Vec::new(), "bogus".to_string(), clock.now()));

        let err = blockchain.verify().unwrap_err();
        assert!(matches!(err, ChainError::BrokenLink { index: 2, .. }));
        assert!(!blockchain.is_valid());
    }

    #[test]
    fn test_detects_tampered_hash() {
        let mut blockchain = Blockchain::with_clock(manual_clock());
        blockchain.append(vec![transfer("alice", "bob", 1.0)]);

        let tampered = blockchain.blocks[1].clone().with_forged_hash("00");
        blockchain.blocks[1] = tampered;

        let err = blockchain.verify().unwrap_err();
        assert!(matches!(err, ChainError::HashMismatch { index: 1, .. }));
    }

    #[test]
    fn test_detects_tampered_genesis() {
        let mut blockchain = Blockchain::with_clock(manual_clock());
        let forged = blockchain.blocks[0].clone().with_forged_hash("00");
        blockchain.blocks[0] = forged;

        assert!(matches!(
            blockchain.verify(),
            Err(ChainError::HashMismatch { index: 0, .. })
        ));
    }

    #[test]
    fn test_detects_non_genesis_first_block() {
        let clock = manual_clock();
        let mut blockchain = Blockchain::with_clock(clock.clone());
        blockchain.blocks[0] = Block::new(vec![transfer("a", "b", 1.0)], String::new(), clock.now());

        assert!(matches!(blockchain.verify(), Err(ChainError::InvalidGenesis(_))));
    }

    proptest! {
        #[test]
        fn prop_appends_keep_integrity(
            batches in prop::collection::vec(
                prop::collection::vec((0usize..4, 0usize..4, -1.0e6f64..1.0e6), 0..4),
                0..12,
            ),
            step_ms in 0i64..5_000,
        ) {
            let names = ["alice", "bob", "carol", "dave"];
            let clock = manual_clock();
            let mut blockchain = Blockchain::with_clock(clock.clone());

            for batch in batches {
                let before: Vec<String> =
                    blockchain.blocks().iter().map(|b| b.hash().to_string()).collect();

                let transactions = batch
                    .into_iter()
                    .map(|(from, to, amount)| transfer(names[from], names[to], amount))
                    .collect();
                blockchain.append(transactions);
                clock.advance(Duration::milliseconds(step_ms));

                // Exactly one block added, nothing before it touched
                prop_assert_eq!(blockchain.len(), before.len() + 1);
                for (index, hash) in before.iter().enumerate() {
                    prop_assert_eq!(blockchain.blocks()[index].hash(), hash.as_str());
                }
            }

            prop_assert_eq!(blockchain.blocks()[0].previous_hash(), "");
            for pair in blockchain.blocks().windows(2) {
                prop_assert_eq!(pair[1].previous_hash(), pair[0].hash());
            }
            prop_assert!(blockchain.verify().is_ok());
        }
    }
}
