use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use super::account::Account;
use super::crypto::sha256_hex;
use super::ledger::LedgerError;

/// Amount being transferred
///
/// Signed, unbounded and unit-less. Only finite values can be constructed
/// from text.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Amount(f64);

impl Amount {
    pub fn new(value: f64) -> Self {
        Amount(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Renders the amount with six fractional digits, as fed to the transaction hash
    pub fn hash_repr(&self) -> String {
        format!("{:.6}", self.0)
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Amount {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Amount(value)),
            _ => Err(LedgerError::InvalidAmount(s.to_string())),
        }
    }
}

/// Represents a transaction in the ledger
///
/// The id is derived from the sender, the receiver and the amount only, so
/// two transfers with the same content share an id.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    /// Content hash of the transaction
    id: String,

    /// Sender's account
    sender: Arc<Account>,

    /// Receiver's account
    receiver: Arc<Account>,

    /// Amount being transferred
    amount: Amount,
}

impl Transaction {
    /// Creates a new transaction and derives its id
    ///
    /// # Arguments
    ///
    /// * `sender` - The sending account
    /// * `receiver` - The receiving account (may be the sender)
    /// * `amount` - The amount to transfer
    ///
    /// # Returns
    ///
    /// A new Transaction instance
    pub fn new(sender: Arc<Account>, receiver: Arc<Account>, amount: Amount) -> Self {
        let id = Self::calculate_id(&sender, &receiver, amount);

        Transaction {
            id,
            sender,
            receiver,
            amount,
        }
    }

    /// Calculates the id a transaction with these fields would carry
    ///
    /// `hex(sha256(sender || receiver || amount with six fractional digits))`
    pub fn calculate_id(sender: &Account, receiver: &Account, amount: Amount) -> String {
        sha256_hex([
            sender.username(),
            receiver.username(),
            amount.hash_repr().as_str(),
        ])
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sender(&self) -> &Arc<Account> {
        &self.sender
    }

    pub fn receiver(&self) -> &Arc<Account> {
        &self.receiver
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TxID: {} | From: {} | To: {} | Amount: {}",
            self.id,
            self.sender.username(),
            self.receiver.username(),
            self.amount
        )
    }
}
