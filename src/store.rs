//! Cart store
//!
//! [`CartStore`] is the single owner of the cart. Views read it through
//! [`CartStore::cart`] and change it only through the store's operations.
//! Every operation that changes the cart runs the same commit sequence:
//! persist, then notify subscribers in registration order.

use std::fmt;

use slotmap::{SlotMap, new_key_type};
use tracing::{debug, warn};

use crate::{
    cart::{Cart, CartChange, CartError},
    persistence::{self, CartStorage},
    products::{ProductSnapshot, ProductUuid},
};

new_key_type! {
    /// Handle returned by [`CartStore::subscribe`].
    pub struct Subscription;
}

/// Receives the cart after each committed change.
pub trait CartObserver {
    /// Called once per committed change with the updated cart.
    fn on_change(&mut self, cart: &Cart, change: CartChange);
}

impl<F> CartObserver for F
where
    F: FnMut(&Cart, CartChange),
{
    fn on_change(&mut self, cart: &Cart, change: CartChange) {
        self(cart, change);
    }
}

/// Owns the cart, its storage slot and its subscribers.
///
/// Observers live in registration order next to their handle. The slot map
/// only hands out handles, so a stale handle never matches a later
/// subscriber.
pub struct CartStore<S: CartStorage> {
    cart: Cart,
    storage: S,
    handles: SlotMap<Subscription, ()>,
    subscribers: Vec<(Subscription, Box<dyn CartObserver>)>,
}

impl<S: CartStorage + fmt::Debug> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("storage", &self.storage)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<S: CartStorage> CartStore<S> {
    /// Open the store, restoring whatever cart `storage` holds.
    ///
    /// A slot that cannot be read or decoded is treated as empty.
    pub fn open(storage: S) -> Self {
        let cart = persistence::load(&storage).unwrap_or_else(|error| {
            warn!(%error, "discarding persisted cart");

            Cart::new()
        });

        debug!(lines = cart.len(), "cart store opened");

        Self {
            cart,
            storage,
            handles: SlotMap::with_key(),
            subscribers: Vec::new(),
        }
    }

    /// The current cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add one unit of `product`, or increment its line up to its stock level.
    ///
    /// # Errors
    ///
    /// See [`Cart::add`]. The cart is unchanged on error.
    pub fn add_to_cart(&mut self, product: ProductSnapshot) -> Result<CartChange, CartError> {
        let change = self.cart.add(product)?;

        self.commit(change);

        Ok(change)
    }

    /// Set the quantity of `product`; quantities below 1 remove it.
    ///
    /// # Errors
    ///
    /// See [`Cart::change_quantity`]. The cart is unchanged on error.
    pub fn change_quantity(
        &mut self,
        product: ProductUuid,
        quantity: i64,
    ) -> Result<CartChange, CartError> {
        let change = self.cart.change_quantity(product, quantity)?;

        self.commit(change);

        Ok(change)
    }

    /// Remove `product`'s line if present.
    ///
    /// # Errors
    ///
    /// See [`Cart::remove`]. The cart is unchanged on error.
    pub fn remove_from_cart(&mut self, product: ProductUuid) -> Result<CartChange, CartError> {
        let change = self.cart.remove(product)?;

        self.commit(change);

        Ok(change)
    }

    /// Empty the cart. Always persists and notifies.
    pub fn clear_cart(&mut self) -> CartChange {
        let change = self.cart.clear();

        self.persist();
        self.notify(change);

        change
    }

    /// Replace a line's snapshot with fresh catalog data.
    ///
    /// # Errors
    ///
    /// See [`Cart::refresh_product`]. The cart is unchanged on error.
    pub fn refresh_product(&mut self, product: ProductSnapshot) -> Result<CartChange, CartError> {
        let change = self.cart.refresh_product(product)?;

        self.commit(change);

        Ok(change)
    }

    /// Register an observer called after every committed change.
    pub fn subscribe(&mut self, observer: impl CartObserver + 'static) -> Subscription {
        let subscription = self.handles.insert(());
        self.subscribers.push((subscription, Box::new(observer)));

        subscription
    }

    /// Remove an observer. Returns `false` if it was already removed.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        if self.handles.remove(subscription).is_none() {
            return false;
        }

        self.subscribers.retain(|(key, _)| *key != subscription);

        true
    }

    /// Number of registered observers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Close the store and hand back its storage.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn commit(&mut self, change: CartChange) {
        if change.is_noop() {
            return;
        }

        self.persist();
        self.notify(change);
    }

    fn persist(&mut self) {
        if let Err(error) = persistence::save(&mut self.storage, &self.cart) {
            warn!(%error, "failed to persist cart; continuing in memory");
        }
    }

    fn notify(&mut self, change: CartChange) {
        debug!(
            ?change,
            lines = self.cart.len(),
            total_count = self.cart.total_count(),
            total_price = %self.cart.total_price(),
            "cart changed"
        );

        for (_, observer) in &mut self.subscribers {
            observer.on_change(&self.cart, change);
        }
    }
}
