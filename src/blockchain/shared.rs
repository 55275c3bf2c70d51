use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::account::Account;
use super::block::Block;
use super::ledger::{Ledger, LedgerError};
use super::transaction::Amount;

/// A ledger that can be shared between threads
///
/// One lock guards the registry and the chain together: writers are
/// exclusive, readers run concurrently when no write is in flight.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        SharedLedger {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Ledger> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_account(&self, username: &str) -> Result<Arc<Account>, LedgerError> {
        self.write().create_account(username)
    }

    pub fn get_account(&self, username: &str) -> Option<Arc<Account>> {
        self.read().get_account(username)
    }

    /// Sends `amount` and returns a copy of the appended block
    pub fn send(&self, sender: &str, receiver: &str, amount: Amount) -> Result<Block, LedgerError> {
        self.write().send(sender, receiver, amount).cloned()
    }

    /// Gets a snapshot of the entire blockchain
    pub fn chain(&self) -> Vec<Block> {
        self.read().blockchain().blocks().to_vec()
    }

    pub fn chain_len(&self) -> usize {
        self.read().blockchain().len()
    }

    pub fn is_valid(&self) -> bool {
        self.read().blockchain().is_valid()
    }

    /// Runs `f` with shared access to the ledger
    pub fn with_ledger<T>(&self, f: impl FnOnce(&Ledger) -> T) -> T {
        f(&*self.read())
    }
}

impl From<Ledger> for SharedLedger {
    fn from(ledger: Ledger) -> Self {
        Self::new(ledger)
    }
}
