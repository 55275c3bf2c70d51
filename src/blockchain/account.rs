use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::ledger::LedgerError;

/// Represents an account in the ledger
///
/// An account is only an identity. Uniqueness of the username is the
/// registry's job, not the account's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Account {
    /// The account's username
    username: String,
}

impl Account {
    /// Creates a new account
    ///
    /// # Arguments
    ///
    /// * `username` - The account's username
    ///
    /// # Returns
    ///
    /// A new Account instance
    pub fn new(username: impl Into<String>) -> Self {
        Account {
            username: username.into(),
        }
    }

    /// Gets the account's username
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Owns every account known to a ledger, keyed by username
///
/// Transactions hold shared handles to the accounts registered here.
#[derive(Debug, Clone, Default)]
pub struct AccountRegistry {
    accounts: HashMap<String, Arc<Account>>,
}

impl AccountRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        AccountRegistry {
            accounts: HashMap::new(),
        }
    }

    /// Registers a new account
    ///
    /// # Arguments
    ///
    /// * `username` - The username to register
    ///
    /// # Returns
    ///
    /// The registered account, or `DuplicateAccount` if the username is taken
    pub fn create(&mut self, username: &str) -> Result<Arc<Account>, LedgerError> {
        if self.accounts.contains_key(username) {
            return Err(LedgerError::DuplicateAccount(username.to_string()));
        }

        let account = Arc::new(Account::new(username));
        self.accounts.insert(username.to_string(), Arc::clone(&account));

        Ok(account)
    }

    /// Looks up an account by username
    pub fn get(&self, username: &str) -> Option<Arc<Account>> {
        self.accounts.get(username).cloned()
    }

    /// Looks up an account, failing with `UnknownAccount` if it is absent
    pub fn require(&self, username: &str) -> Result<Arc<Account>, LedgerError> {
        self.get(username)
            .ok_or_else(|| LedgerError::UnknownAccount(username.to_string()))
    }

    pub fn contains(&self, username: &str) -> bool {
        self.accounts.contains_key(username)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Gets all usernames, sorted
    pub fn usernames(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.accounts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
