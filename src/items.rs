//! Items

use rust_decimal::Decimal;

use crate::{
    pricing::{TotalPriceError, line_price},
    products::{ProductSnapshot, ProductUuid},
};

/// One product's quantity entry within a cart.
///
/// The line price is computed when the quantity or snapshot changes, so a
/// line that exists always has a price that fits in a [`Decimal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    product: ProductSnapshot,
    quantity: u32,
    price: Decimal,
}

impl CartItem {
    pub(crate) fn new(product: ProductSnapshot, quantity: u32) -> Result<Self, TotalPriceError> {
        let price = line_price(&product, quantity)?;

        Ok(Self {
            product,
            quantity,
            price,
        })
    }

    /// Returns the product snapshot captured for this line
    pub fn product(&self) -> &ProductSnapshot {
        &self.product
    }

    /// Returns the product identifier
    pub fn product_id(&self) -> ProductUuid {
        self.product.id
    }

    /// Returns the quantity in the cart
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the line price (unit price × quantity)
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Whether the quantity has reached the captured stock level.
    pub fn at_stock_limit(&self) -> bool {
        self.quantity >= self.product.stock_quantity
    }

    /// A copy of this line holding `quantity` units.
    pub(crate) fn with_quantity(&self, quantity: u32) -> Result<Self, TotalPriceError> {
        Self::new(self.product.clone(), quantity)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn line_price_is_unit_price_times_quantity() -> TestResult {
        let product = ProductSnapshot::new(ProductUuid::new(), "Notebook", Decimal::new(350, 2), 10);

        let item = CartItem::new(product, 4)?;

        assert_eq!(item.price(), Decimal::new(1400, 2));

        Ok(())
    }

    #[test]
    fn at_stock_limit_when_quantity_matches_stock() -> TestResult {
        let product = ProductSnapshot::new(ProductUuid::new(), "Notebook", Decimal::ONE, 2);

        let item = CartItem::new(product, 1)?;
        assert!(!item.at_stock_limit());

        let item = item.with_quantity(2)?;
        assert!(item.at_stock_limit());
        assert_eq!(item.price(), Decimal::TWO);

        Ok(())
    }

    #[test]
    fn oversized_line_is_refused() {
        let product = ProductSnapshot::new(ProductUuid::new(), "Bullion", Decimal::MAX, 2);

        assert_eq!(
            CartItem::new(product.clone(), 2),
            Err(TotalPriceError::Overflow(product.id))
        );
    }
}
