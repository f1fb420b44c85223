//! Pricing

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    items::CartItem,
    products::{ProductSnapshot, ProductUuid},
};

/// Errors that can occur while calculating line prices and totals.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TotalPriceError {
    /// A line price, or the running total including it, does not fit in a
    /// [`Decimal`].
    #[error("price of product {0} overflows the cart total")]
    Overflow(ProductUuid),
}

/// Aggregate totals derived from a set of cart lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of line quantities
    pub count: u64,

    /// Sum of line prices
    pub price: Decimal,
}

/// Calculates the price of `quantity` units of a product.
///
/// # Errors
///
/// Returns [`TotalPriceError::Overflow`] if the product does not fit.
pub fn line_price(product: &ProductSnapshot, quantity: u32) -> Result<Decimal, TotalPriceError> {
    product
        .price
        .checked_mul(Decimal::from(quantity))
        .ok_or(TotalPriceError::Overflow(product.id))
}

/// Calculates the totals of a sequence of cart lines, in order.
///
/// An empty sequence totals to zero.
///
/// # Errors
///
/// Returns [`TotalPriceError::Overflow`] naming the first line whose price
/// does not fit in the running total.
pub fn totals<'a>(
    items: impl IntoIterator<Item = &'a CartItem>,
) -> Result<CartTotals, TotalPriceError> {
    items
        .into_iter()
        .try_fold(CartTotals::default(), |acc, item| {
            let price = acc
                .price
                .checked_add(item.price())
                .ok_or(TotalPriceError::Overflow(item.product_id()))?;

            Ok(CartTotals {
                count: acc.count + u64::from(item.quantity()),
                price,
            })
        })
}
