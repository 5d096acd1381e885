//! Checkout of recorded orders against the default fixture set.
//!
//! The default order is two laptops at 10% off plus one mouse:
//!
//! - Laptop: 2 × $125,000.00 × 0.90 = $225,000.00
//! - Mouse: 1 × $8,500.00
//! - Subtotal: $233,500.00
//! - Tax (21%): $49,035.00
//! - Total: $282,535.00
//! - Total in USD at 350.50: 806.09

use rusty_money::{
    Money,
    iso::{ARS, USD},
};
use testresult::TestResult;
use tiller::{
    fixtures::{Fixture, FixtureError},
    receipt::Receipt,
    sales::{Checkout, PaymentMethod, SaleError, SaleKind, prepare_sale},
};

#[test]
fn default_order_totals_match_point_of_sale() -> TestResult {
    let fixture = Fixture::from_set("default")?;
    let order = fixture.order("default")?;
    let cart = fixture.cart(&order)?;

    let settings = fixture.settings();
    let totals = cart.totals(&settings.tax_rate, &settings.exchange_rate)?;

    assert_eq!(totals.subtotal, Money::from_minor(23_350_000, ARS));
    assert_eq!(totals.tax, Money::from_minor(4_903_500, ARS));
    assert_eq!(totals.total, Money::from_minor(28_253_500, ARS));
    assert_eq!(totals.secondary_total, Money::from_minor(80_609, USD));

    Ok(())
}

#[test]
fn stock_sold_elsewhere_blocks_checkout_and_keeps_cart() -> TestResult {
    let mut fixture = Fixture::from_set("default")?;
    let order = fixture.order("default")?;
    let cart = fixture.cart(&order)?;

    fixture.catalog_mut().set_stock("1", 1)?;

    let result = fixture.sale(&order, &cart);

    assert!(
        matches!(
            &result,
            Err(FixtureError::Sale(SaleError::StockChanged { product, requested: 2, available: 1 }))
                if product == "1"
        ),
        "expected stock change, got {result:?}"
    );
    assert_eq!(cart.line("1").map(|line| line.quantity()), Some(2));

    Ok(())
}

#[test]
fn over_stock_order_is_clamped_then_checks_out() -> TestResult {
    let fixture = Fixture::from_set("default")?;
    let order = fixture.order("over_stock")?;
    let cart = fixture.cart(&order)?;
    let sale = fixture.sale(&order, &cart)?;

    assert_eq!(sale.kind, SaleKind::Presupuesto);
    assert_eq!(sale.client_id, "2");
    assert_eq!(sale.lines.len(), 1);
    assert_eq!(sale.lines.first().map(|line| line.quantity), Some(8));
    assert_eq!(sale.totals.total, Money::from_minor(14_520_000, ARS));
    assert_eq!(sale.totals.secondary_total, Money::from_minor(41_427, USD));

    Ok(())
}

#[test]
fn mercado_pago_depends_on_seller_plan() -> TestResult {
    let fixture = Fixture::from_set("default")?;
    let order = fixture.order("mercado_pago")?;
    let cart = fixture.cart(&order)?;

    let entry = fixture.sale(&order, &cart);

    assert!(matches!(
        entry,
        Err(FixtureError::Sale(SaleError::PaymentUnavailable {
            method: PaymentMethod::MercadoPago,
            ..
        }))
    ));

    let checkout = order.checkout.as_ref().ok_or("order has no checkout")?;
    let admin = fixture.user("admin")?;

    let sale = prepare_sale(
        &cart,
        &Checkout {
            client: checkout.client.as_ref(),
            seller: admin,
            kind: checkout.kind,
            payment: checkout.payment,
        },
        fixture.settings(),
        fixture.catalog(),
    )?;

    assert_eq!(sale.seller_id, "u-admin");
    assert_eq!(sale.payment, PaymentMethod::MercadoPago);

    Ok(())
}

#[test]
fn receipt_prints_prepared_sale() -> TestResult {
    let fixture = Fixture::from_set("default")?;
    let order = fixture.order("default")?;
    let cart = fixture.cart(&order)?;
    let sale = fixture.sale(&order, &cart)?;

    let mut out = Vec::new();
    Receipt::from_sale(&sale).write_to(&mut out)?;

    let output = String::from_utf8(out)?;

    assert!(output.contains("LAPTOP001"));
    assert!(output.contains("MOUSE001"));
    assert!(output.contains("Total USD:"));

    Ok(())
}

#[test]
fn clearing_after_sale_empties_cart() -> TestResult {
    let fixture = Fixture::from_set("default")?;
    let order = fixture.order("default")?;
    let mut cart = fixture.cart(&order)?;

    fixture.sale(&order, &cart)?;
    cart.clear();

    let settings = fixture.settings();
    let totals = cart.totals(&settings.tax_rate, &settings.exchange_rate)?;

    assert!(cart.is_empty());
    assert_eq!(totals.total, Money::from_minor(0, ARS));

    Ok(())
}
