use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::LedgerService;
use crate::domain::{DEFAULT_SEED_BALANCE, Units, parse_units};

/// Polizza - Named-Balance Allocation Ledger
#[derive(Parser)]
#[command(name = "polizza")]
#[command(about = "A minimal ledger of named balances funded by an admin account")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "polizza.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new ledger with a seeded admin balance
    Init {
        /// Seed balance for the admin funding record
        #[arg(long, default_value_t = DEFAULT_SEED_BALANCE)]
        seed: Units,
    },

    /// Allocate an amount from admin to a new applicant
    Approve {
        /// Applicant identifier (must not already hold a balance)
        applicant: String,

        /// Amount to allocate (whole units, e.g. "300")
        amount: String,
    },

    /// Move an amount between two existing owners
    Transfer {
        /// Amount to transfer (whole units, e.g. "100")
        amount: String,

        /// Sender identifier
        #[arg(long)]
        from: String,

        /// Receiver identifier
        #[arg(long)]
        to: String,
    },

    /// Show the balance record for an owner
    Read {
        /// Owner identifier
        owner: String,
    },

    /// List all balance records
    Balances,

    /// Dispatch a raw mutating invocation (approve, transfer) by name
    Invoke {
        /// Function name
        function: String,

        /// Ordered string arguments, as the hosting platform would pass them
        args: Vec<String>,
    },

    /// Dispatch a raw read-only query (read) by name
    Query {
        /// Function name
        function: String,

        /// Ordered string arguments
        args: Vec<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init { seed } => {
                let service = LedgerService::init(&self.database, seed).await?;
                let admin = service.read("admin").await?;
                println!(
                    "Ledger initialized: {} (admin balance: {})",
                    self.database, admin.balance
                );
            }

            Commands::Approve { applicant, amount } => {
                let service = LedgerService::connect(&self.database).await?;
                let amount: Units =
                    parse_units(&amount).context("Invalid amount format. Use whole units, e.g. '300'")?;

                let result = service.approve(&applicant, amount).await?;
                println!(
                    "Approved {} for {} (admin balance: {})",
                    result.applicant.balance, result.applicant.owner, result.admin.balance
                );
            }

            Commands::Transfer { amount, from, to } => {
                let service = LedgerService::connect(&self.database).await?;
                let amount: Units =
                    parse_units(&amount).context("Invalid amount format. Use whole units, e.g. '100'")?;

                let result = service.transfer(&from, &to, amount).await?;
                println!(
                    "Transferred {} {} -> {} (balances: {} / {})",
                    amount,
                    result.sender.owner,
                    result.receiver.owner,
                    result.sender.balance,
                    result.receiver.balance
                );
            }

            Commands::Read { owner } => {
                let service = LedgerService::connect(&self.database).await?;
                let record = service.read(&owner).await?;

                println!("Owner:   {}", record.owner);
                println!("Balance: {}", record.balance);
                if self.verbose {
                    println!("Created: {}", record.created_at.format("%Y-%m-%d %H:%M:%S"));
                }
            }

            Commands::Balances => {
                let service = LedgerService::connect(&self.database).await?;
                let records = service.balances().await?;

                if records.is_empty() {
                    println!("No balance records found.");
                } else {
                    println!("{:<20} {:>12}", "OWNER", "BALANCE");
                    println!("{}", "-".repeat(33));
                    let mut total: Units = 0;
                    for record in &records {
                        println!("{:<20} {:>12}", record.owner, record.balance);
                        total += record.balance;
                    }
                    println!("{}", "-".repeat(33));
                    println!("{:<20} {:>12}", "TOTAL", total);
                }
            }

            Commands::Invoke { function, args } => {
                let service = LedgerService::connect(&self.database).await?;
                if self.verbose {
                    eprintln!("invoke is running: {}", function);
                }
                let bytes = service.invoke(&function, &args).await?;
                println!("{}", String::from_utf8_lossy(&bytes));
            }

            Commands::Query { function, args } => {
                let service = LedgerService::connect(&self.database).await?;
                if self.verbose {
                    eprintln!("query is running: {}", function);
                }
                let bytes = service.query(&function, &args).await?;
                println!("{}", String::from_utf8_lossy(&bytes));
            }
        }

        Ok(())
    }
}
