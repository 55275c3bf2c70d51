use std::fmt;
use std::sync::Arc;

use log::info;
use thiserror::Error;

use super::account::{Account, AccountRegistry};
use super::block::Block;
use super::chain::Blockchain;
use super::clock::{Clock, SystemClock};
use super::transaction::{Amount, Transaction};

/// Errors that can occur during ledger operations
///
/// Each of these aborts a single command; none of them leaves a partial
/// block behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Account with username {0} already exists")]
    DuplicateAccount(String),

    #[error("Invalid sender or receiver: no account named {0}")]
    UnknownAccount(String),

    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),
}

/// Side effect run for every transaction when its block is executed
pub trait TransactionProcessor: Send + Sync {
    fn process(&self, transaction: &Transaction);
}

/// Default processor: logs each transaction and touches no state
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProcessor;

impl TransactionProcessor for LogProcessor {
    fn process(&self, transaction: &Transaction) {
        // Balances are not tracked, so replay is observational only
        info!(
            "Processing transaction: id={}, from={}, to={}, amount={}",
            transaction.id(),
            transaction.sender().username(),
            transaction.receiver().username(),
            transaction.amount()
        );
    }
}

/// Lifecycle of a ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerState {
    /// No accounts and only the genesis block
    Empty,
    Running,
}

/// The ledger engine: owns the chain and the account registry
pub struct Ledger {
    chain: Blockchain,
    accounts: AccountRegistry,
    processor: Box<dyn TransactionProcessor>,
}

impl Ledger {
    /// Creates a ledger timestamped by the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a ledger whose blocks are timestamped by `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Ledger {
            chain: Blockchain::with_clock(clock),
            accounts: AccountRegistry::new(),
            processor: Box::new(LogProcessor),
        }
    }

    /// Replaces the side effect run when blocks are executed
    pub fn with_processor(mut self, processor: impl TransactionProcessor + 'static) -> Self {
        self.processor = Box::new(processor);
        self
    }

    pub fn state(&self) -> LedgerState {
        if self.accounts.is_empty() && self.chain.len() == 1 {
            LedgerState::Empty
        } else {
            LedgerState::Running
        }
    }

    /// Creates and registers a new account
    ///
    /// # Returns
    ///
    /// The new account, or `DuplicateAccount` if the username is taken
    pub fn create_account(&mut self, username: &str) -> Result<Arc<Account>, LedgerError> {
        let account = self.accounts.create(username)?;
        info!("Account created: {}", username);
        Ok(account)
    }

    /// Gets an account by username
    pub fn get_account(&self, username: &str) -> Option<Arc<Account>> {
        self.accounts.get(username)
    }

    /// Transfers `amount` from one account to another
    ///
    /// Builds a transaction, appends it as a block of its own and executes
    /// that block. Nothing is appended unless both accounts exist.
    ///
    /// # Returns
    ///
    /// The newly appended block
    pub fn send(
        &mut self,
        sender: &str,
        receiver: &str,
        amount: Amount,
    ) -> Result<&Block, LedgerError> {
        let sender = self.accounts.require(sender)?;
        let receiver = self.accounts.require(receiver)?;

        let transaction = Transaction::new(sender, receiver, amount);
        Ok(self.add_block(vec![transaction]))
    }

    /// Appends a block holding `transactions` and executes it
    pub fn add_block(&mut self, transactions: Vec<Transaction>) -> &Block {
        let block = self.chain.append(transactions);
        Self::replay(self.processor.as_ref(), block);
        block
    }

    /// Runs every transaction of `block` through the processor, in stored order
    pub fn execute_block(&self, block: &Block) {
        Self::replay(self.processor.as_ref(), block);
    }

    fn replay(processor: &dyn TransactionProcessor, block: &Block) {
        for transaction in block.transactions() {
            processor.process(transaction);
        }
    }

    pub fn blockchain(&self) -> &Blockchain {
        &self.chain
    }

    pub fn accounts(&self) -> &AccountRegistry {
        &self.accounts
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("chain", &self.chain)
            .field("accounts", &self.accounts)
            .finish_non_exhaustive()
    }
}
