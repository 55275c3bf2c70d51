use thiserror::Error;

use crate::blockchain::{Amount, LedgerError};

pub const CREATE_ACCOUNT_USAGE: &str = "create_account [username]";
pub const SEND_USAGE: &str = "send [sender] [receiver] [amount]";

/// Every command the session understands, in menu order
pub const MENU: [&str; 7] = [
    CREATE_ACCOUNT_USAGE,
    SEND_USAGE,
    "view_blockchain",
    "validate_chain",
    "list_accounts",
    "export_chain",
    "exit",
];

/// Errors raised while turning a line into a command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// A validated operator command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateAccount {
        username: String,
    },
    Send {
        sender: String,
        receiver: String,
        amount: Amount,
    },
    ViewBlockchain,
    ValidateChain,
    ListAccounts,
    ExportChain,
    Exit,
}

impl Command {
    /// Parses one input line
    ///
    /// Tokens are separated by any whitespace. Argument counts are checked
    /// and the amount of a `send` is parsed here, so the ledger only ever
    /// sees well-formed values.
    ///
    /// # Returns
    ///
    /// `Ok(None)` for a blank line
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let Some((&name, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let command = match name {
            "create_account" => match args {
                [username] => Command::CreateAccount {
                    username: username.to_string(),
                },
                _ => return Err(CommandError::Usage(CREATE_ACCOUNT_USAGE)),
            },
            "send" => match args {
                [sender, receiver, amount] => Command::Send {
                    sender: sender.to_string(),
                    receiver: receiver.to_string(),
                    amount: amount.parse()?,
                },
                _ => return Err(CommandError::Usage(SEND_USAGE)),
            },
            "view_blockchain" => Command::ViewBlockchain,
            "validate_chain" => Command::ValidateChain,
            "list_accounts" => Command::ListAccounts,
            "export_chain" => Command::ExportChain,
            "exit" => Command::Exit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        // The remaining commands take no arguments and are their own usage line
        if !command.takes_arguments() && !args.is_empty() {
            return Err(CommandError::Usage(command.name()));
        }

        Ok(Some(command))
    }

    /// The keyword that introduces this command
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateAccount { .. } => "create_account",
            Command::Send { .. } => "send",
            Command::ViewBlockchain => "view_blockchain",
            Command::ValidateChain => "validate_chain",
            Command::ListAccounts => "list_accounts",
            Command::ExportChain => "export_chain",
            Command::Exit => "exit",
        }
    }

    fn takes_arguments(&self) -> bool {
        matches!(self, Command::CreateAccount { .. } | Command::Send { .. })
    }
}
