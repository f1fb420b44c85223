//! Cart
//!
//! The cart aggregate and its quantity state machine. A product is either
//! absent from the cart or present with a quantity in `1..=stock`, where
//! `stock` is the stock level captured in the line's product snapshot.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    items::CartItem,
    pricing::{CartTotals, TotalPriceError, totals},
    products::{ProductSnapshot, ProductUuid},
};

/// Mutations the cart refuses. The cart is left untouched when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The product had no stock when it was captured.
    #[error("product {0} is out of stock")]
    OutOfStock(ProductUuid),

    /// The product snapshot carries a negative unit price.
    #[error("product {0} has a negative price")]
    NegativePrice(ProductUuid),

    /// The requested quantity is above the captured stock level.
    #[error("requested {requested} of product {product}, but only {available} in stock")]
    ExceedsStock {
        /// Product the change targeted
        product: ProductUuid,

        /// Quantity that was asked for
        requested: i64,

        /// Stock level in the line's snapshot
        available: u32,
    },

    /// The change would push a line price or the cart total past what a
    /// [`Decimal`] holds.
    #[error(transparent)]
    PriceOverflow(#[from] TotalPriceError),
}

/// Outcome of a cart operation that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line was appended with quantity 1.
    Added,

    /// An existing line was incremented.
    Incremented {
        /// New quantity
        quantity: u32,
    },

    /// The line is already at its stock level; nothing changed.
    AtStockLimit {
        /// Current quantity
        quantity: u32,
    },

    /// A line's quantity was set.
    QuantityChanged {
        /// Previous quantity
        from: u32,

        /// New quantity
        to: u32,
    },

    /// The requested quantity equals the current one.
    Unchanged,

    /// A line was removed.
    Removed {
        /// Quantity the line held
        quantity: u32,
    },

    /// The product has no line in the cart; nothing changed.
    NotInCart,

    /// A line's snapshot was replaced with fresher catalog data.
    Refreshed {
        /// Quantity after clamping to the new stock level
        quantity: u32,
    },

    /// Every line was removed.
    Cleared {
        /// Number of lines removed
        lines: usize,
    },
}

impl CartChange {
    /// Whether the operation left the cart exactly as it was.
    pub fn is_noop(&self) -> bool {
        matches!(
            self,
            Self::AtStockLimit { .. } | Self::Unchanged | Self::NotInCart | Self::Cleared { lines: 0 }
        )
    }
}

/// An ordered collection of cart lines with totals derived from them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
    totals: CartTotals,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_items(items: Vec<CartItem>) -> Result<Self, TotalPriceError> {
        let totals = totals(&items)?;

        Ok(Self { items, totals })
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The line for a product, if present.
    pub fn item(&self, product: ProductUuid) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id() == product)
    }

    /// Quantity of a product in the cart, 0 when absent.
    pub fn quantity_of(&self, product: ProductUuid) -> u32 {
        self.item(product).map_or(0, CartItem::quantity)
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of line quantities.
    pub fn total_count(&self) -> u64 {
        self.totals.count
    }

    /// Sum of line prices.
    pub fn total_price(&self) -> Decimal {
        self.totals.price
    }

    /// Both derived totals.
    pub fn totals(&self) -> CartTotals {
        self.totals
    }

    /// Add one unit of a product.
    ///
    /// A new product is appended with quantity 1. An existing line is
    /// incremented unless it already holds its captured stock level, in which
    /// case nothing changes. The stored snapshot is kept as-is on increment.
    ///
    /// # Errors
    ///
    /// - [`CartError::OutOfStock`]: the snapshot has zero stock.
    /// - [`CartError::NegativePrice`]: the snapshot has a negative price.
    /// - [`CartError::PriceOverflow`]: the new line price or cart total does
    ///   not fit.
    pub fn add(&mut self, product: ProductSnapshot) -> Result<CartChange, CartError> {
        if product.price < Decimal::ZERO {
            return Err(CartError::NegativePrice(product.id));
        }

        if !product.in_stock() {
            return Err(CartError::OutOfStock(product.id));
        }

        let (line, change) = match self.item(product.id) {
            Some(item) if item.at_stock_limit() => {
                return Ok(CartChange::AtStockLimit {
                    quantity: item.quantity(),
                });
            }
            Some(item) => {
                let quantity = item.quantity() + 1;

                (item.with_quantity(quantity)?, CartChange::Incremented { quantity })
            }
            None => (CartItem::new(product, 1)?, CartChange::Added),
        };

        self.put_line(line)?;

        Ok(change)
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// Quantities below 1 remove the line. Products not in the cart are
    /// ignored.
    ///
    /// # Errors
    ///
    /// - [`CartError::ExceedsStock`]: `quantity` is above the line's captured
    ///   stock level.
    /// - [`CartError::PriceOverflow`]: the new line price or cart total does
    ///   not fit.
    pub fn change_quantity(
        &mut self,
        product: ProductUuid,
        quantity: i64,
    ) -> Result<CartChange, CartError> {
        if quantity < 1 {
            return self.remove(product);
        }

        let Some(item) = self.item(product) else {
            return Ok(CartChange::NotInCart);
        };

        let available = item.product().stock_quantity;

        let to = match u32::try_from(quantity) {
            Ok(to) if to <= available => to,
            _ => {
                return Err(CartError::ExceedsStock {
                    product,
                    requested: quantity,
                    available,
                });
            }
        };

        let from = item.quantity();

        if from == to {
            return Ok(CartChange::Unchanged);
        }

        let line = item.with_quantity(to)?;
        self.put_line(line)?;

        Ok(CartChange::QuantityChanged { from, to })
    }

    /// Remove a product's line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::PriceOverflow`] if the remaining lines cannot be
    /// totalled. Lines only enter the cart once their totals fit, so this
    /// signals a cart built around those checks.
    pub fn remove(&mut self, product: ProductUuid) -> Result<CartChange, CartError> {
        let Some(index) = self.position(product) else {
            return Ok(CartChange::NotInCart);
        };

        let totals = totals(
            self.items
                .iter()
                .filter(|item| item.product_id() != product),
        )?;

        let removed = self.items.remove(index);
        self.totals = totals;

        Ok(CartChange::Removed {
            quantity: removed.quantity(),
        })
    }

    /// Remove every line.
    pub fn clear(&mut self) -> CartChange {
        let lines = self.items.len();

        self.items.clear();
        self.totals = CartTotals::default();

        CartChange::Cleared { lines }
    }

    /// Replace a line's snapshot with fresh catalog data.
    ///
    /// The quantity is clamped to the new stock level and the line is removed
    /// when the product is no longer in stock.
    ///
    /// # Errors
    ///
    /// - [`CartError::NegativePrice`]: the fresh snapshot has a negative
    ///   price.
    /// - [`CartError::PriceOverflow`]: the refreshed line price or cart total
    ///   does not fit.
    pub fn refresh_product(&mut self, product: ProductSnapshot) -> Result<CartChange, CartError> {
        if product.price < Decimal::ZERO {
            return Err(CartError::NegativePrice(product.id));
        }

        if !product.in_stock() {
            return self.remove(product.id);
        }

        let Some(item) = self.item(product.id) else {
            return Ok(CartChange::NotInCart);
        };

        if item.product() == &product {
            return Ok(CartChange::Unchanged);
        }

        let quantity = item.quantity().min(product.stock_quantity);

        self.put_line(CartItem::new(product, quantity)?)?;

        Ok(CartChange::Refreshed { quantity })
    }

    /// Store `line` in place of its product's line, or append it, once the
    /// resulting totals are known to fit. The cart is untouched on error.
    fn put_line(&mut self, line: CartItem) -> Result<(), CartError> {
        let id = line.product_id();

        let replaced = self
            .items
            .iter()
            .map(|item| if item.product_id() == id { &line } else { item });
        let appended = self.item(id).is_none().then_some(&line);

        let totals = totals(replaced.chain(appended))?;

        match self.item_mut(id) {
            Some(item) => *item = line,
            None => self.items.push(line),
        }

        self.totals = totals;

        Ok(())
    }

    fn position(&self, product: ProductUuid) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.product_id() == product)
    }

    fn item_mut(&mut self, product: ProductUuid) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| item.product_id() == product)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn product(price: Decimal, stock: u32) -> ProductSnapshot {
        ProductSnapshot::new(ProductUuid::new(), "Widget", price, stock)
    }

    fn assert_totals_consistent(cart: &Cart) {
        let count: u64 = cart.items().iter().map(|item| u64::from(item.quantity())).sum();
        let price: Decimal = cart.items().iter().map(CartItem::price).sum();

        assert_eq!(cart.total_count(), count, "total count drifted from lines");
        assert_eq!(cart.total_price(), price, "total price drifted from lines");
    }

    #[test]
    fn add_appends_new_line_with_quantity_one() -> TestResult {
        let mut cart = Cart::new();
        let widget = product(Decimal::TEN, 5);

        let change = cart.add(widget.clone())?;

        assert_eq!(change, CartChange::Added);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(widget.id), 1);
        assert_totals_consistent(&cart);

        Ok(())
    }

    #[test]
    fn add_keeps_insertion_order() -> TestResult {
        let mut cart = Cart::new();
        let first = product(Decimal::ONE, 5);
        let second = product(Decimal::TWO, 5);

        cart.add(first.clone())?;
        cart.add(second.clone())?;
        cart.add(first.clone())?;

        let ids: Vec<_> = cart.items().iter().map(CartItem::product_id).collect();

        assert_eq!(ids, vec![first.id, second.id]);

        Ok(())
    }

    #[test]
    fn add_at_stock_limit_is_noop() -> TestResult {
        let mut cart = Cart::new();
        let widget = product(Decimal::TEN, 1);

        cart.add(widget.clone())?;
        let before = cart.clone();

        let change = cart.add(widget)?;

        assert_eq!(change, CartChange::AtStockLimit { quantity: 1 });
        assert!(change.is_noop());
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn add_rejects_out_of_stock_product() {
        let mut cart = Cart::new();
        let widget = product(Decimal::TEN, 0);

        assert_eq!(cart.add(widget.clone()), Err(CartError::OutOfStock(widget.id)));
        assert!(cart.is_empty());
    }

    #[test]
    fn add_rejects_negative_price() {
        let mut cart = Cart::new();
        let widget = product(Decimal::NEGATIVE_ONE, 3);

        assert_eq!(cart.add(widget.clone()), Err(CartError::NegativePrice(widget.id)));
        assert!(cart.is_empty());
    }

    #[test]
    fn add_accepts_free_product() -> TestResult {
        let mut cart = Cart::new();

        cart.add(product(Decimal::ZERO, 3))?;

        assert_eq!(cart.total_price(), Decimal::ZERO);
        assert_eq!(cart.total_count(), 1);

        Ok(())
    }

    #[test]
    fn change_quantity_sets_quantity() -> TestResult {
        let mut cart = Cart::new();
        let widget = product(Decimal::new(250, 2), 5);
        cart.add(widget.clone())?;

        let change = cart.change_quantity(widget.id, 4)?;

        assert_eq!(change, CartChange::QuantityChanged { from: 1, to: 4 });
        assert_eq!(cart.total_price(), Decimal::TEN);
        assert_totals_consistent(&cart);

        Ok(())
    }

    #[test]
    fn change_quantity_to_stock_level_is_allowed() -> TestResult {
        let mut cart = Cart::new();
        let widget = product(Decimal::ONE, 3);
        cart.add(widget.clone())?;

        cart.change_quantity(widget.id, 3)?;

        assert_eq!(cart.quantity_of(widget.id), 3);

        Ok(())
    }

    #[test]
    fn change_quantity_above_stock_is_rejected() -> TestResult {
        let mut cart = Cart::new();
        let widget = product(Decimal::ONE, 3);
        cart.add(widget.clone())?;
        let before = cart.clone();

        let result = cart.change_quantity(widget.id, 4);

        assert_eq!(
            result,
            Err(CartError::ExceedsStock {
                product: widget.id,
                requested: 4,
                available: 3,
            })
        );
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn change_quantity_beyond_u32_is_rejected() -> TestResult {
        let mut cart = Cart::new();
        let widget = product(Decimal::ONE, u32::MAX);
        cart.add(widget.clone())?;

        let result = cart.change_quantity(widget.id, i64::from(u32::MAX) + 1);

        assert!(matches!(result, Err(CartError::ExceedsStock { .. })));
        assert_eq!(cart.quantity_of(widget.id), 1);

        Ok(())
    }

    #[test]
    fn change_quantity_below_one_removes_line() -> TestResult {
        let mut cart = Cart::new();
        let widget = product(Decimal::ONE, 3);
        cart.add(widget.clone())?;
        cart.add(widget.clone())?;

        let change = cart.change_quantity(widget.id, -2)?;

        assert_eq!(change, CartChange::Removed { quantity: 2 });
        assert!(cart.is_empty());
        assert_totals_consistent(&cart);

        Ok(())
    }

    #[test]
    fn change_quantity_for_missing_product_is_noop() -> TestResult {
        let mut cart = Cart::new();

        assert_eq!(cart.change_quantity(ProductUuid::new(), 2)?, CartChange::NotInCart);
        assert_eq!(cart.change_quantity(ProductUuid::new(), 0)?, CartChange::NotInCart);

        Ok(())
    }

    #[test]
    fn change_quantity_to_same_value_is_unchanged() -> TestResult {
        let mut cart = Cart::new();
        let widget = product(Decimal::ONE, 3);
        cart.add(widget.clone())?;

        assert_eq!(cart.change_quantity(widget.id, 1)?, CartChange::Unchanged);

        Ok(())
    }

    #[test]
    fn add_refuses_line_price_overflow() -> TestResult {
        let mut cart = Cart::new();
        let bullion = product(Decimal::MAX, 5);

        cart.add(bullion.clone())?;
        let before = cart.clone();

        assert_eq!(
            cart.add(bullion.clone()),
            Err(CartError::PriceOverflow(TotalPriceError::Overflow(bullion.id)))
        );
        assert_eq!(cart, before);
        assert_eq!(cart.quantity_of(bullion.id), 1);

        Ok(())
    }

    #[test]
    fn add_refuses_cart_total_overflow() -> TestResult {
        let mut cart = Cart::new();
        let bullion = product(Decimal::MAX, 5);
        let mug = product(Decimal::ONE, 5);

        cart.add(bullion)?;
        let before = cart.clone();

        assert!(matches!(cart.add(mug), Err(CartError::PriceOverflow(_))));
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn change_quantity_refuses_price_overflow() -> TestResult {
        let mut cart = Cart::new();
        let ingot = product(Decimal::from_i128_with_scale(10_i128.pow(20), 0), u32::MAX);

        cart.add(ingot.clone())?;
        let before = cart.clone();

        let result = cart.change_quantity(ingot.id, 4_000_000_000);

        assert!(matches!(result, Err(CartError::PriceOverflow(_))));
        assert_eq!(cart, before);
        assert_totals_consistent(&cart);

        Ok(())
    }

    #[test]
    fn remove_missing_product_is_noop() {
        let mut cart = Cart::new();

        assert_eq!(cart.remove(ProductUuid::new()), Ok(CartChange::NotInCart));
    }

    #[test]
    fn clear_twice_yields_empty_cart() -> TestResult {
        let mut cart = Cart::new();
        cart.add(product(Decimal::ONE, 3))?;
        cart.add(product(Decimal::TWO, 3))?;

        assert_eq!(cart.clear(), CartChange::Cleared { lines: 2 });
        let once = cart.clone();

        assert!(cart.clear().is_noop());
        assert_eq!(cart, once);
        assert_eq!(cart.totals(), CartTotals::default());

        Ok(())
    }

    #[test]
    fn refresh_clamps_quantity_to_new_stock() -> TestResult {
        let mut cart = Cart::new();
        let widget = product(Decimal::ONE, 5);
        cart.add(widget.clone())?;
        cart.change_quantity(widget.id, 4)?;

        let fresh = ProductSnapshot {
            stock_quantity: 2,
            price: Decimal::TWO,
            ..widget.clone()
        };

        let change = cart.refresh_product(fresh)?;

        assert_eq!(change, CartChange::Refreshed { quantity: 2 });
        assert_eq!(cart.total_price(), Decimal::new(4, 0));
        assert_totals_consistent(&cart);

        Ok(())
    }

    #[test]
    fn refresh_removes_sold_out_line() -> TestResult {
        let mut cart = Cart::new();
        let widget = product(Decimal::ONE, 5);
        cart.add(widget.clone())?;

        let sold_out = ProductSnapshot {
            stock_quantity: 0,
            ..widget
        };

        assert_eq!(cart.refresh_product(sold_out)?, CartChange::Removed { quantity: 1 });
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn refresh_ignores_products_not_in_cart() -> TestResult {
        let mut cart = Cart::new();

        assert_eq!(cart.refresh_product(product(Decimal::ONE, 1))?, CartChange::NotInCart);

        Ok(())
    }
}
