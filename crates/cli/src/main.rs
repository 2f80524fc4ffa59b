//! Organic Farm CLI - cart, catalog, and contact form tools.
//!
//! # Usage
//!
//! ```bash
//! # Add two bags of compost to the cart
//! of-cli cart add p1 -q 2
//!
//! # Show the priced cart
//! of-cli cart show
//!
//! # Remove a product, or empty the cart
//! of-cli cart remove p1
//! of-cli cart clear
//!
//! # Browse the catalog
//! of-cli catalog list --max-price 300
//! of-cli catalog search soil
//!
//! # Validate a contact form submission
//! of-cli contact -n "Asha" -e asha@example.com -m "Do you ship to Pune?"
//! ```
//!
//! # Commands
//!
//! - `cart` - Add, remove, clear, and show the persisted cart
//! - `catalog` - List and search products
//! - `contact` - Validate a contact message
//!
//! Configuration is read from the environment; see `organic_farm_cart::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use organic_farm_cart::{CartConfig, project};
use rust_decimal::Decimal;

mod commands;

#[derive(Parser)]
#[command(name = "of-cli")]
#[command(author, version, about = "Organic Farm CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the persisted cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Browse the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Validate a contact form submission
    Contact {
        /// Sender name
        #[arg(short, long)]
        name: String,

        /// Sender email address
        #[arg(short, long)]
        email: String,

        /// Message body
        #[arg(short, long)]
        message: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add units of a product
    Add {
        /// Product ID (e.g. p1)
        product_id: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product entirely
    Remove {
        /// Product ID
        product_id: String,
    },
    /// Empty the cart
    Clear,
    /// Show cart lines and total
    Show,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products
    List {
        /// Only show products at or below this price
        #[arg(long)]
        max_price: Option<Decimal>,
    },
    /// Search products by name
    Search {
        /// Case-insensitive name fragment
        query: String,
    },
}

fn main() {
    // Initialize tracing; logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli);

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::print_stdout)]
fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CartConfig::from_env()?;
    let output = execute(cli.command, &config)?;
    println!("{output}");
    Ok(())
}

/// Run one command and return what it prints. The catalog is only loaded by
/// the commands that price or list products.
fn execute(command: Commands, config: &CartConfig) -> Result<String, Box<dyn std::error::Error>> {
    let output = match command {
        Commands::Cart { action } => {
            let catalog = config.load_catalog()?;
            let store = config.open_store();

            // Re-render the running total whenever the cart changes
            let display_catalog = catalog.clone();
            store.subscribe(move |state| {
                let total = project(state, &display_catalog);
                tracing::info!(
                    total = %total.grand_total_price().display(),
                    items = total.item_count(),
                    "Cart updated"
                );
            });

            match action {
                CartAction::Add {
                    product_id,
                    quantity,
                } => commands::cart::add(&store, &catalog, &product_id, quantity)?,
                CartAction::Remove { product_id } => {
                    commands::cart::remove(&store, &catalog, &product_id)
                }
                CartAction::Clear => commands::cart::clear(&store, &catalog),
                CartAction::Show => commands::cart::show(&store, &catalog),
            }
        }
        Commands::Catalog { action } => {
            let catalog = config.load_catalog()?;
            match action {
                CatalogAction::List { max_price } => commands::catalog::list(&catalog, max_price),
                CatalogAction::Search { query } => commands::catalog::search(&catalog, &query),
            }
        }
        Commands::Contact {
            name,
            email,
            message,
        } => commands::contact::submit(&name, &email, &message)?,
    };
    Ok(output)
}
