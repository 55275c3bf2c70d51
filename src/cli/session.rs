use std::fmt;
use std::io::{BufRead, Write};

use anyhow::Context;
use log::warn;
use serde::Serialize;

use super::command::{Command, MENU};
use crate::blockchain::{Block, Blockchain, Ledger};

/// Whether the session keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// JSON document printed by `export_chain`
#[derive(Serialize)]
pub struct ChainSnapshot<'a> {
    /// The length of the chain
    pub length: usize,

    /// Whether the chain is valid
    pub is_valid: bool,

    /// The blocks in the chain
    pub chain: &'a [Block],
}

impl<'a> From<&'a Blockchain> for ChainSnapshot<'a> {
    fn from(blockchain: &'a Blockchain) -> Self {
        ChainSnapshot {
            length: blockchain.len(),
            is_valid: blockchain.is_valid(),
            chain: blockchain.blocks(),
        }
    }
}

/// An interactive session: reads commands from `input`, answers on `output`
pub struct Session<R, W> {
    ledger: Ledger,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(ledger: Ledger, input: R, output: W) -> Self {
        Session {
            ledger,
            input,
            output,
        }
    }

    /// Runs until `exit` or end of input
    pub fn run(&mut self) -> anyhow::Result<()> {
        loop {
            self.print_menu()?;

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .context("Failed to read command")?;

            if read == 0 {
                writeln!(self.output)?;
                writeln!(self.output, "Exiting...")?;
                return Ok(());
            }

            if self.execute(&line)? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Parses and runs a single command line
    ///
    /// Rejected commands are reported on the output and never end the
    /// session. Only I/O failures are returned as errors.
    pub fn execute(&mut self, line: &str) -> anyhow::Result<Flow> {
        match Command::parse(line) {
            Ok(Some(command)) => self.dispatch(command),
            Ok(None) => Ok(Flow::Continue),
            Err(err) => {
                self.reject(line, &err)?;
                Ok(Flow::Continue)
            }
        }
    }

    fn dispatch(&mut self, command: Command) -> anyhow::Result<Flow> {
        match command {
            Command::CreateAccount { username } => {
                match self.ledger.create_account(&username) {
                    Ok(account) => writeln!(self.output, "Account created: {}", account.username())?,
                    Err(err) => self.reject(&username, &err)?,
                }
            }

            Command::Send {
                sender,
                receiver,
                amount,
            } => {
                let height = self.ledger.blockchain().len();
                match self.ledger.send(&sender, &receiver, amount) {
                    Ok(block) => {
                        writeln!(self.output, "Block {} appended: {}", height, block.hash())?
                    }
                    Err(err) => self.reject(&format!("{sender} -> {receiver}"), &err)?,
                }
            }

            Command::ViewBlockchain => write_chain(&mut self.output, self.ledger.blockchain())?,

            Command::ValidateChain => match self.ledger.blockchain().verify() {
                Ok(()) => writeln!(
                    self.output,
                    "Blockchain is valid ({} blocks)",
                    self.ledger.blockchain().len()
                )?,
                Err(err) => {
                    warn!("Chain failed verification: {}", err);
                    writeln!(self.output, "Blockchain is invalid: {}", err)?
                }
            },

            Command::ListAccounts => {
                let accounts = self.ledger.accounts();
                if accounts.is_empty() {
                    writeln!(self.output, "No accounts")?;
                }
                for username in accounts.usernames() {
                    writeln!(self.output, "{}", username)?;
                }
            }

            Command::ExportChain => {
                let snapshot = ChainSnapshot::from(self.ledger.blockchain());
                let json = serde_json::to_string_pretty(&snapshot)
                    .context("Failed to serialize blockchain")?;
                writeln!(self.output, "{}", json)?;
            }

            Command::Exit => {
                writeln!(self.output, "Exiting...")?;
                return Ok(Flow::Exit);
            }
        }

        Ok(Flow::Continue)
    }

    fn print_menu(&mut self) -> anyhow::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "Commands:")?;
        for (index, usage) in MENU.iter().enumerate() {
            writeln!(self.output, "{}. {}", index + 1, usage)?;
        }
        write!(self.output, "Enter command: ")?;
        self.output.flush()?;
        Ok(())
    }

    fn reject(&mut self, context: &str, err: &dyn fmt::Display) -> anyhow::Result<()> {
        warn!("Rejected command ({}): {}", context.trim(), err);
        writeln!(self.output, "{}", err)?;
        Ok(())
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_parts(self) -> (Ledger, W) {
        (self.ledger, self.output)
    }
}

/// Prints every block with its hashes and transactions
pub fn write_chain(out: &mut impl Write, blockchain: &Blockchain) -> std::io::Result<()> {
    for (index, block) in blockchain.blocks().iter().enumerate() {
        writeln!(out, "Block {}:", index)?;
        writeln!(out, "Hash: {}", block.hash())?;
        writeln!(out, "Previous Hash: {}", block.previous_hash())?;
        for transaction in block.transactions() {
            writeln!(out, "  {}", transaction)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::blockchain::ManualClock;

    fn session(input: &str) -> Session<Cursor<Vec<u8>>, Vec<u8>> {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        Session::new(
            Ledger::with_clock(Arc::new(clock)),
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
        )
    }

    fn output_of<R>(session: &Session<R, Vec<u8>>) -> String {
        String::from_utf8(session.output.clone()).unwrap()
    }

    #[test]
    fn test_duplicate_account_keeps_session_alive() {
        let mut session = session("");
        assert_eq!(session.execute("create_account x").unwrap(), Flow::Continue);
        assert_eq!(session.execute("create_account x").unwrap(), Flow::Continue);

        let output = output_of(&session);
        assert!(output.contains("Account created: x"));
        assert!(output.contains("Account with username x already exists"));
        assert_eq!(session.ledger().accounts().len(), 1);
    }

    #[test]
    fn test_rejected_send_appends_nothing() {
        let mut session = session("");
        session.execute("create_account alice").unwrap();
        session.execute("create_account bob").unwrap();

        session.execute("send alice carol 5").unwrap();
        session.execute("send alice bob five").unwrap();
        session.execute("send alice bob").unwrap();

        let output = output_of(&session);
        assert!(output.contains("no account named carol"));
        assert!(output.contains("Invalid amount: \"five\""));
        assert!(output.contains("Usage: send [sender] [receiver] [amount]"));
        assert_eq!(session.ledger().blockchain().len(), 1);
    }

    #[test]
    fn test_unknown_command() {
        let mut session = session("");
        assert_eq!(session.execute("mine now").unwrap(), Flow::Continue);
        assert!(output_of(&session).contains("Unknown command: mine"));
    }

    #[test]
    fn test_exit() {
        let mut session = session("");
        assert_eq!(session.execute("exit").unwrap(), Flow::Exit);
    }

    #[test]
    fn test_run_stops_at_end_of_input() {
        let mut session = session("create_account alice\nlist_accounts\n");
        session.run().unwrap();

        let output = output_of(&session);
        assert!(output.contains("Account created: alice"));
        assert!(output.contains("Enter command: alice\n"));
        assert!(output.ends_with("Exiting...\n"));
    }

    #[test]
    fn test_run_stops_at_exit() {
        let mut session = session("exit\ncreate_account alice\n");
        session.run().unwrap();

        assert!(session.ledger().get_account("alice").is_none());
    }

    #[test]
    fn test_validate_chain() {
        let mut session = session("");
        session.execute("validate_chain").unwrap();
        assert!(output_of(&session).contains("Blockchain is valid (1 blocks)"));
    }

    #[test]
    fn test_export_chain() {
        let mut session = session("");
        session.execute("create_account alice").unwrap();
        session.execute("create_account bob").unwrap();
        session.execute("send alice bob 10").unwrap();
        session.execute("export_chain").unwrap();

        let output = output_of(&session);
        let json_start = output.find('{').unwrap();
        let value: serde_json::Value = serde_json::from_str(&output[json_start..]).unwrap();

        assert_eq!(value["length"], 2);
        assert_eq!(value["is_valid"], true);
        assert_eq!(value["chain"][0]["previous_hash"], "");
        assert_eq!(value["chain"][1]["previous_hash"], value["chain"][0]["hash"]);

        let tx = &value["chain"][1]["transactions"][0];
        assert_eq!(tx["sender"]["username"], "alice");
        assert_eq!(tx["receiver"]["username"], "bob");
        assert_eq!(tx["amount"], 10.0);
    }
}
