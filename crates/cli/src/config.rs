//! Command line configuration

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Where the cart and submitted orders are kept.
#[derive(Debug, Args)]
pub struct StorageConfig {
    /// Directory holding the cart slot and the order outbox
    #[arg(long, env = "CART_STORAGE_DIR", default_value = ".storefront", global = true)]
    pub storage_dir: PathBuf,
}

/// Catalog and display settings.
#[derive(Debug, Args)]
pub struct CatalogConfig {
    /// Products fixture standing in for the catalog API
    #[arg(
        long,
        env = "CART_CATALOG",
        default_value = "fixtures/products/demo.yml",
        global = true
    )]
    pub catalog: PathBuf,

    /// ISO currency code used to display prices (GBP, USD, EUR)
    #[arg(long, env = "CART_CURRENCY", default_value = "USD", global = true)]
    pub currency: String,
}

/// Cart commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List catalog products with the quantity already in the cart
    Products,

    /// Show the cart lines and totals
    Show,

    /// Add units of a product to the cart
    Add {
        /// Fixture key or product id
        product: String,

        /// Units to add
        #[arg(short = 'n', long, default_value_t = 1)]
        quantity: u32,
    },

    /// Set the quantity of a product in the cart; 0 or less removes it
    Set {
        /// Fixture key or product id
        product: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Remove a product from the cart
    Remove {
        /// Fixture key or product id
        product: String,
    },

    /// Remove every product from the cart
    Clear,

    /// Re-read every cart line from the catalog, clamping to current stock
    Refresh,

    /// Place an order for the cart contents
    Checkout {
        /// Delivery address
        #[arg(long)]
        address: String,

        /// Delivery latitude
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Delivery longitude
        #[arg(long, allow_negative_numbers = true)]
        lng: Option<f64>,

        /// Ordering customer id
        #[arg(long, env = "CART_USER_ID")]
        user: Option<String>,
    },

    /// End the session, emptying the cart
    Logout,
}

/// Storefront cart configuration
#[derive(Debug, Parser)]
#[command(name = "storefront-cart", about = "Storefront cart", long_about = None)]
pub struct CliConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Storage settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Catalog settings.
    #[command(flatten)]
    pub catalog: CatalogConfig,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
