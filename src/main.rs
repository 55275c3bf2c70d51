use std::io;

use log::info;

use ledger_vm::blockchain::Ledger;
use ledger_vm::cli::Session;

fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Create a new ledger with only the genesis block
    let ledger = Ledger::new();
    info!(
        "Ledger started with genesis block {}",
        ledger.blockchain().last_block().hash()
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(ledger, stdin.lock(), stdout.lock());

    session.run()
}
