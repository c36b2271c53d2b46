//! Utils

use std::path::PathBuf;

use clap::Parser;

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Arguments for the cart pricing examples
#[derive(Debug, Parser)]
#[command(name = "price_cart", about = "Price a fixture cart and print its receipt", long_about = None)]
pub struct ExampleCartArgs {
    /// Catalog fixture to load products, offers & promotions from
    #[arg(short, long, env = "PRICING_FIXTURE", default_value = "marketplace")]
    pub fixture: String,

    /// Cart fixture to price
    #[arg(short, long, env = "PRICING_CART", default_value = "office")]
    pub cart: String,

    /// Directory holding the `catalogs/` and `carts/` fixture folders
    #[arg(long, env = "PRICING_FIXTURES_PATH", default_value = "./fixtures")]
    pub fixtures_path: PathBuf,

    /// Output file path
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl ExampleCartArgs {
    /// Load arguments from the command line, environment and `.env`
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
