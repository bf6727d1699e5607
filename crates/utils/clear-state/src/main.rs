//! # Clear State Utility
//!
//! Removes the persisted wallet identity and every stored auth token from the
//! explorer's state file. The next start behaves like a first visit.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --package clear-state --bin clear_state [-- --yes]
//! ```
//!
//! The program will:
//! 1. Open the file at `EXPLORER_STORAGE_PATH`
//! 2. Report which entries exist
//! 3. Ask for confirmation (skipped with `--yes`)
//! 4. Remove them

use lib_core::model::store::{AUTH_TOKENS_KEY, WALLET_IDENTITY_KEY};
use lib_core::{Config, JsonFileStorage, KeyValueStorage};
use std::io::{self, Write};

const KEYS: [&str; 2] = [WALLET_IDENTITY_KEY, AUTH_TOKENS_KEY];

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let assume_yes = std::env::args().skip(1).any(|arg| arg == "--yes" || arg == "-y");

    let config = Config::from_env().map_err(anyhow::Error::msg)?;
    let storage = JsonFileStorage::open(&config.storage_path)?;

    println!("State file: {}", storage.path().display());
    let mut present = Vec::new();
    for key in KEYS {
        let exists = storage.contains_key(key)?;
        println!("  {:<16} {}", key, if exists { "present" } else { "absent" });
        if exists {
            present.push(key);
        }
    }

    if present.is_empty() {
        println!("Nothing to clear.");
        return Ok(());
    }

    if !assume_yes {
        print!("Remove {} entr{}? (yes/no): ", present.len(), if present.len() == 1 { "y" } else { "ies" });
        io::stdout().flush()?;

        let mut confirmation = String::new();
        io::stdin().read_line(&mut confirmation)?;
        let confirmation = confirmation.trim().to_lowercase();
        if confirmation != "yes" && confirmation != "y" {
            println!("Operation cancelled.");
            return Ok(());
        }
    }

    for key in present {
        storage.remove_item(key)?;
        println!("Removed {}", key);
    }
    println!("State cleared.");

    Ok(())
}
