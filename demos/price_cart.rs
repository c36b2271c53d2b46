//! Priced Cart Receipt Example
//!
//! Loads a catalog and a cart from the YAML fixtures, prices the cart and prints the receipt.
//!
//! Use `-f` to pick the catalog fixture and `-c` the cart fixture
//! Use `-o` to write the receipt to a file instead of stdout
//! Set `LOG_FORMAT=json` and `RUST_LOG=debug` to see per-line pricing decisions

use std::{fs::File, io, io::Write, time::Instant};

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use storefront_pricing::{
    fixtures::Fixture,
    pricing::price_cart,
    receipt::Receipt,
    utils::{ExampleCartArgs, LogFormat},
};

/// Priced Cart Receipt Example
#[expect(clippy::print_stdout, reason = "Example program output to user")]
pub fn main() -> Result<()> {
    let args = ExampleCartArgs::load()?;

    init_tracing(&args)?;

    let mut fixture = Fixture::with_base_path(&args.fixtures_path);

    fixture.load_catalog(&args.fixture)?.load_cart(&args.cart)?;

    let catalog = fixture.catalog()?;
    let cart = fixture.cart()?;

    let start = Instant::now();
    let result = price_cart(cart, catalog)?;
    let elapsed = start.elapsed();

    let receipt = Receipt::from_pricing(&result);

    if let Some(path) = args.out.as_deref() {
        receipt.write_to(File::create(path)?, catalog)?;

        println!("\nReceipt written to: {}", path.display());
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();

        receipt.write_to(&mut handle, catalog)?;

        writeln!(handle, " priced in {elapsed:?}")?;
    }

    if result.is_overdiscounted() {
        println!("\nwarning: discounts exceed the subtotal");
    }

    Ok(())
}

fn init_tracing(args: &ExampleCartArgs) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    match args.log_format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_writer(io::stderr),
            )
            .with(filter)
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true)
                    .with_writer(io::stderr),
            )
            .with(filter)
            .try_init()?,
    }

    Ok(())
}
