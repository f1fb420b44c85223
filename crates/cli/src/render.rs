//! Text rendering for cart and catalog views.

use std::ops::Range;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use tabled::{
    Table,
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use storefront_cart::{cart::Cart, catalog::Catalog};

/// Stock level at or below which a line shows a low-stock warning.
const LOW_STOCK_THRESHOLD: u32 = 5;

/// Rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Unsupported currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Amount does not fit in minor units
    #[error("Amount {0} cannot be displayed")]
    AmountOutOfRange(Decimal),
}

/// Resolve a display currency from its ISO code.
///
/// # Errors
///
/// Returns [`RenderError::UnknownCurrency`] for codes other than GBP, USD and
/// EUR.
pub fn parse_currency(code: &str) -> Result<&'static Currency, RenderError> {
    match code.to_ascii_uppercase().as_str() {
        "GBP" => Ok(iso::GBP),
        "USD" => Ok(iso::USD),
        "EUR" => Ok(iso::EUR),
        _ => Err(RenderError::UnknownCurrency(code.to_string())),
    }
}

/// Format an amount in the given currency.
///
/// # Errors
///
/// Returns [`RenderError::AmountOutOfRange`] if the amount does not fit in
/// minor units.
pub fn format_money(amount: Decimal, currency: &'static Currency) -> Result<String, RenderError> {
    let minor_units = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or(RenderError::AmountOutOfRange(amount))?;

    Ok(Money::from_minor(minor_units, currency).to_string())
}

/// Render the cart page: lines, then totals.
///
/// # Errors
///
/// Returns a [`RenderError`] if an amount cannot be formatted.
pub fn cart_view(cart: &Cart, currency: &'static Currency) -> Result<String, RenderError> {
    if cart.is_empty() {
        return Ok("Your cart is empty".to_string());
    }

    let mut builder = Builder::default();
    builder.push_record(["Product", "Category", "Unit price", "Qty", "Line total", "Note"]);

    for item in cart.items() {
        let product = item.product();

        let note = if item.at_stock_limit() {
            "max stock reached".to_string()
        } else if product.stock_quantity <= LOW_STOCK_THRESHOLD {
            format!("only {} left in stock", product.stock_quantity)
        } else {
            String::new()
        };

        builder.push_record([
            product.name.clone(),
            product
                .category
                .as_ref()
                .map(|category| category.name.clone())
                .unwrap_or_default(),
            format_money(product.price, currency)?,
            item.quantity().to_string(),
            format_money(item.price(), currency)?,
            note,
        ]);
    }

    let table = style_table(builder, Columns::new(2..5));

    let item_label = if cart.total_count() == 1 { "item" } else { "items" };

    Ok(format!(
        "{table}\n{} {item_label} in your cart\nTotal: {}",
        cart.total_count(),
        format_money(cart.total_price(), currency)?
    ))
}

/// Render the product list with the quantity of each product in the cart.
///
/// # Errors
///
/// Returns a [`RenderError`] if a price cannot be formatted.
pub fn catalog_view(
    catalog: &Catalog,
    cart: &Cart,
    currency: &'static Currency,
) -> Result<String, RenderError> {
    let mut builder = Builder::default();
    builder.push_record(["Key", "Product", "Price", "Stock", "In cart"]);

    for entry in catalog.entries() {
        builder.push_record([
            entry.key.clone(),
            entry.product.name.clone(),
            format_money(entry.product.price, currency)?,
            entry.product.stock_quantity.to_string(),
            cart.quantity_of(entry.product.id).to_string(),
        ]);
    }

    let table = style_table(builder, Columns::new(2..5));

    Ok(table.to_string())
}

fn style_table(builder: Builder, numeric: Columns<Range<usize>>) -> Table {
    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(numeric, Alignment::right());

    table
}
