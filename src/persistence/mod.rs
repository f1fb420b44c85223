//! Persistence
//!
//! The cart is saved to a single key-value slot as JSON. Only the lines are
//! stored; totals are derived again on load so they can never disagree with
//! the lines they summarise.

use std::io;

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::{
    cart::Cart,
    items::CartItem,
    products::{ProductSnapshot, ProductUuid},
};

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Storage slot holding the serialised cart.
pub const CART_STORAGE_KEY: &str = "cart";

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The slot key cannot name a slot in this backend.
    #[error("invalid slot key: {0:?}")]
    InvalidKey(String),

    /// Filesystem error.
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while loading or saving the cart.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Wrapped storage backend error.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The payload is not valid cart JSON.
    #[error("malformed cart payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload parsed but breaks a cart invariant.
    #[error("corrupted cart payload: {0}")]
    Corrupted(String),
}

/// A key-value slot store, shaped like browser local storage.
#[cfg_attr(test, automock)]
pub trait CartStorage {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be written.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PersistedCart {
    items: Vec<PersistedLine>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PersistedLine {
    product_id: ProductUuid,
    quantity: u32,
    product: ProductSnapshot,
}

/// Serialise a cart's lines.
///
/// # Errors
///
/// Returns [`PersistenceError::Json`] if serialisation fails.
pub fn encode(cart: &Cart) -> Result<String, PersistenceError> {
    let persisted = PersistedCart {
        items: cart
            .items()
            .iter()
            .map(|item| PersistedLine {
                product_id: item.product_id(),
                quantity: item.quantity(),
                product: item.product().clone(),
            })
            .collect(),
    };

    Ok(serde_json::to_string(&persisted)?)
}

/// Rebuild a cart from a serialised payload, recomputing its totals.
///
/// # Errors
///
/// - [`PersistenceError::Json`]: the payload is not valid cart JSON.
/// - [`PersistenceError::Corrupted`]: a line disagrees with its snapshot, is
///   duplicated, has a negative price, holds a quantity outside `1..=stock`,
///   or the lines cannot be totalled.
pub fn decode(payload: &str) -> Result<Cart, PersistenceError> {
    let persisted: PersistedCart = serde_json::from_str(payload)?;

    let mut seen = FxHashSet::default();
    let mut items = Vec::with_capacity(persisted.items.len());

    for line in persisted.items {
        let product = line.product;

        if line.product_id != product.id {
            return Err(PersistenceError::Corrupted(format!(
                "line {} holds snapshot for {}",
                line.product_id, product.id
            )));
        }

        if !seen.insert(product.id) {
            return Err(PersistenceError::Corrupted(format!(
                "product {} appears more than once",
                product.id
            )));
        }

        if product.price < Decimal::ZERO {
            return Err(PersistenceError::Corrupted(format!(
                "product {} has a negative price",
                product.id
            )));
        }

        if line.quantity == 0 || line.quantity > product.stock_quantity {
            return Err(PersistenceError::Corrupted(format!(
                "product {} has quantity {} outside 1..={}",
                product.id, line.quantity, product.stock_quantity
            )));
        }

        let item = CartItem::new(product, line.quantity)
            .map_err(|error| PersistenceError::Corrupted(error.to_string()))?;

        items.push(item);
    }

    Cart::from_items(items).map_err(|error| PersistenceError::Corrupted(error.to_string()))
}

/// Load the cart stored under [`CART_STORAGE_KEY`].
///
/// An empty slot yields an empty cart.
///
/// # Errors
///
/// Returns a [`PersistenceError`] if the slot cannot be read or decoded.
pub fn load<S: CartStorage + ?Sized>(storage: &S) -> Result<Cart, PersistenceError> {
    match storage.read(CART_STORAGE_KEY)? {
        Some(payload) => decode(&payload),
        None => Ok(Cart::new()),
    }
}

/// Save the cart under [`CART_STORAGE_KEY`].
///
/// # Errors
///
/// Returns a [`PersistenceError`] if the cart cannot be encoded or written.
pub fn save<S: CartStorage + ?Sized>(storage: &mut S, cart: &Cart) -> Result<(), PersistenceError> {
    let payload = encode(cart)?;

    storage.write(CART_STORAGE_KEY, &payload)?;

    Ok(())
}
