//! `tiller quote`

use std::{
    io::{self, Write},
    path::Path,
};

use anyhow::{Context, anyhow};
use clap::Args;
use tiller::{fixtures::Fixture, receipt::Receipt};
use tracing::debug;

/// Arguments for `tiller quote`
#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Order fixture to replay
    #[arg(default_value = "default")]
    pub order: String,

    /// Fixture set providing products, users and settings
    #[arg(long, default_value = "default")]
    pub set: String,

    /// Validate the order for checkout against live stock
    #[arg(long)]
    pub checkout: bool,

    /// Override live stock before checkout, as `PRODUCT=QUANTITY`
    #[arg(long = "stock", value_name = "PRODUCT=QUANTITY", value_parser = parse_stock)]
    pub stock: Vec<(String, u32)>,
}

/// Replay an order and print its receipt.
///
/// # Errors
///
/// Returns an error if a fixture cannot be loaded, the order cannot be priced or checked out,
/// or the receipt cannot be written.
pub fn run(fixtures: &Path, args: &QuoteArgs) -> anyhow::Result<()> {
    let mut fixture = Fixture::with_base_path(fixtures);

    fixture
        .load_products(&args.set)?
        .load_users(&args.set)?
        .load_settings(&args.set)?;

    let order = fixture
        .order(&args.order)
        .with_context(|| format!("failed to read order {}", args.order))?;

    let cart = fixture.cart(&order)?;

    for (product, quantity) in &args.stock {
        debug!(product, quantity, "overriding live stock");

        fixture.catalog_mut().set_stock(product, *quantity)?;
    }

    let mut stdout = io::stdout().lock();

    if args.checkout {
        let sale = fixture.sale(&order, &cart)?;

        Receipt::from_sale(&sale).write_to(&mut stdout)?;

        writeln!(
            stdout,
            "{:?} for client {} by seller {}, paid with {}",
            sale.kind, sale.client_id, sale.seller_id, sale.payment
        )?;
    } else {
        let settings = fixture.settings();
        let totals = cart.totals(&settings.tax_rate, &settings.exchange_rate)?;

        Receipt::new(&cart, totals).write_to(&mut stdout)?;
    }

    Ok(())
}

fn parse_stock(s: &str) -> anyhow::Result<(String, u32)> {
    let (product, quantity) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected PRODUCT=QUANTITY, got {s}"))?;

    let quantity = quantity
        .trim()
        .parse()
        .with_context(|| format!("invalid quantity in {s}"))?;

    Ok((product.trim().to_string(), quantity))
}
