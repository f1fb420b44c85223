//! Storefront Cart
//!
//! The client-side shopping cart engine of the storefront: product snapshots,
//! the cart and its derived totals, a store that persists the cart and
//! notifies views of changes, and the checkout handoff to the order API.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod items;
pub mod persistence;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod store;
pub mod uuids;
