//! Cadastro CLI - manage users, customers and their addresses.
//!
//! # Usage
//!
//! ```bash
//! # Sign in with the seeded administrator
//! cadastro user login --username admin --password 123456
//!
//! # List customers with their principal address
//! cadastro customer list
//!
//! # Make address 3 the customer's principal address
//! cadastro address update 3 --principal true
//!
//! # Back up everything
//! cadastro snapshot export backup.json
//! ```
//!
//! # Commands
//!
//! - `user` - Register users and check credentials
//! - `customer` - Register, update, delete and list customers
//! - `address` - Create, update, delete and list a customer's addresses
//! - `snapshot` - Export and import the whole registry as JSON
//!
//! Every invocation loads the data file (see [`config`]), runs one command and
//! writes the file back when the command changed something.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io;
use std::path::PathBuf;

use cadastro_core::{AddressId, CustomerId, Notice, Snapshot};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod data;
mod error;
mod render;

use commands::Outcome;
use commands::address::{AddressForm, AddressPatch};
use commands::customer::{CustomerForm, CustomerPatch};
use config::{CliConfig, LogFormat};
use error::CliError;

#[derive(Parser)]
#[command(name = "cadastro")]
#[command(author, version, about = "Customer and address registry")]
struct Cli {
    /// Data file to use instead of `CADASTRO_DATA_FILE`
    #[arg(long, global = true, value_name = "PATH")]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage customers
    Customer {
        #[command(subcommand)]
        action: CustomerAction,
    },
    /// Manage customer addresses
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Export or import the whole registry
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a new user
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },
    /// Check a username and password
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum CustomerAction {
    /// Register a customer with its first address
    Register {
        #[command(flatten)]
        customer: CustomerForm,

        #[command(flatten)]
        address: AddressForm,
    },
    /// Change a customer's fields
    Update {
        id: i32,

        #[command(flatten)]
        patch: CustomerPatch,
    },
    /// Delete a customer and all of its addresses
    Delete {
        id: i32,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List customers
    List,
}

#[derive(Subcommand)]
enum AddressAction {
    /// Add an address to a customer
    Create {
        customer_id: i32,

        #[command(flatten)]
        address: AddressForm,

        /// Make this the customer's principal address
        #[arg(long)]
        principal: bool,
    },
    /// Change an address
    Update {
        id: i32,

        #[command(flatten)]
        patch: AddressPatch,

        /// Set or clear the principal flag (kept when omitted)
        #[arg(long, value_name = "BOOL")]
        principal: Option<bool>,
    },
    /// Delete an address
    Delete { id: i32 },
    /// List a customer's addresses
    List { customer_id: i32 },
}

#[derive(Subcommand)]
enum SnapshotAction {
    /// Write every record to a JSON file
    Export {
        #[arg(default_value = Snapshot::DEFAULT_FILE_NAME)]
        path: PathBuf,
    },
    /// Replace every record with the contents of a JSON file
    Import { path: PathBuf },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = CliConfig::from_env();

    init_tracing(config.as_ref().map_or(LogFormat::Text, |c| c.log_format));

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        if let CliError::Service(service) = &e
            && let Err(write_err) = render::notice(&mut io::stderr(), &Notice::from(service))
        {
            tracing::warn!("Cannot print notice: {write_err}");
        }
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing with `EnvFilter`, logging to stderr so stdout only
/// carries command output.
fn init_tracing(format: LogFormat) {
    // Defaults to info level if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let json_layer = (format == LogFormat::Json).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(io::stderr)
    });
    let text_layer = (format == LogFormat::Text)
        .then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli, mut config: CliConfig) -> Result<(), CliError> {
    if let Some(path) = cli.data_file {
        config.data_file = path;
    }

    let mut registry = data::load(&config).await?;
    let mut out = io::stdout();

    let outcome: Outcome = match cli.command {
        Commands::User { action } => match action {
            UserAction::Register {
                name,
                username,
                password,
            } => commands::user::register(
                &mut registry,
                &name,
                &username,
                &SecretString::from(password),
            )?,
            UserAction::Login { username, password } => {
                commands::user::login(&registry, &username, &SecretString::from(password))?
            }
        },
        Commands::Customer { action } => match action {
            CustomerAction::Register { customer, address } => {
                commands::customer::register(&mut registry, &customer, &address)?
            }
            CustomerAction::Update { id, patch } => {
                commands::customer::update(&mut registry, CustomerId::new(id), &patch)?
            }
            CustomerAction::Delete { id, yes } => {
                commands::customer::delete(&mut registry, CustomerId::new(id), yes)?
            }
            CustomerAction::List => commands::customer::list(&registry, &mut out)?,
        },
        Commands::Address { action } => match action {
            AddressAction::Create {
                customer_id,
                address,
                principal,
            } => commands::address::create(
                &mut registry,
                CustomerId::new(customer_id),
                &address,
                principal,
            )?,
            AddressAction::Update {
                id,
                patch,
                principal,
            } => commands::address::update(&mut registry, AddressId::new(id), &patch, principal)?,
            AddressAction::Delete { id } => {
                commands::address::delete(&mut registry, AddressId::new(id))?
            }
            AddressAction::List { customer_id } => {
                commands::address::list(&registry, CustomerId::new(customer_id), &mut out)?
            }
        },
        Commands::Snapshot { action } => match action {
            SnapshotAction::Export { path } => commands::snapshot::export(&registry, &path).await?,
            SnapshotAction::Import { path } => {
                commands::snapshot::import(&mut registry, &path).await?
            }
        },
    };

    if outcome.mutated {
        data::write_snapshot(&registry, &config.data_file).await?;
    }
    if let Some(notice) = &outcome.notice {
        render::notice(&mut out, notice).map_err(CliError::Output)?;
    }
    Ok(())
}
