//! Products

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductSnapshot>;

/// Category UUID
pub type CategoryUuid = TypedUuid<CategoryRef>;

/// Reference to the catalog category a product belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    /// Category identifier
    pub id: CategoryUuid,

    /// Category display name
    pub name: String,
}

/// A copy of a catalog product, captured when it was added to the cart.
///
/// The cart never re-reads the catalog on its own: price and stock are the
/// values observed at capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    /// Product identifier
    pub id: ProductUuid,

    /// Product display name
    pub name: String,

    /// Unit price
    pub price: Decimal,

    /// Units available when the snapshot was taken
    pub stock_quantity: u32,

    /// Owning category, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,

    /// Product image location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ProductSnapshot {
    /// Create a snapshot with no category or image.
    pub fn new(id: ProductUuid, name: impl Into<String>, price: Decimal, stock_quantity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            stock_quantity,
            category: None,
            image_url: None,
        }
    }

    /// Whether at least one unit was available at capture time.
    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}
