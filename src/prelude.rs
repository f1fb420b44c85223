//! Storefront Cart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartChange, CartError},
    catalog::{Catalog, CatalogEntry, FixtureError},
    checkout::{
        CheckoutError, CheckoutField, CheckoutForm, GatewayError, LatLng, OrderConfirmation,
        OrderGateway, OrderRequest, OrderUuid, UserUuid, place_order,
    },
    items::CartItem,
    persistence::{
        CART_STORAGE_KEY, CartStorage, FileStorage, MemoryStorage, PersistenceError, StorageError,
    },
    pricing::{CartTotals, TotalPriceError},
    products::{CategoryRef, CategoryUuid, ProductSnapshot, ProductUuid},
    store::{CartObserver, CartStore, Subscription},
};
