//! Command dispatch.

use std::{io::Write, path::Path};

use anyhow::Context;
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::{debug, info};

use storefront_cart::prelude::*;

use crate::{config::Command, outbox::OutboxGateway, render};

/// Errors specific to the command line front-end.
#[derive(Debug, Error)]
pub enum CliError {
    /// Product key or id not found in the catalog
    #[error("Unknown product: {0}")]
    UnknownProduct(String),
}

/// Everything a command needs to run.
pub struct Session<'a, S: CartStorage> {
    /// Products available to add
    pub catalog: &'a Catalog,

    /// Cart store backed by the storage slot
    pub store: &'a mut CartStore<S>,

    /// Display currency
    pub currency: &'static Currency,

    /// Directory orders are written to
    pub outbox_dir: &'a Path,
}

impl<S: CartStorage> Session<'_, S> {
    /// Run a command, writing its output to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unknown, the cart refuses the
    /// change, checkout fails, or output cannot be written.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> anyhow::Result<()> {
        debug!(?command, "executing command");

        match command {
            Command::Products => {
                let view = render::catalog_view(self.catalog, self.store.cart(), self.currency)?;
                writeln!(out, "{view}")?;
            }
            Command::Show => self.show(out)?,
            Command::Add { product, quantity } => self.add(&product, quantity, out)?,
            Command::Set { product, quantity } => {
                let id = self.resolve_id(&product)?;
                let change = self.store.change_quantity(id, quantity)?;

                describe(change, &product, out)?;
                self.show(out)?;
            }
            Command::Remove { product } => {
                let id = self.resolve_id(&product)?;
                let change = self.store.remove_from_cart(id)?;

                describe(change, &product, out)?;
            }
            Command::Clear => {
                self.store.clear_cart();
                writeln!(out, "Cart cleared")?;
            }
            Command::Refresh => self.refresh(out)?,
            Command::Checkout {
                address,
                lat,
                lng,
                user,
            } => {
                let form = CheckoutForm {
                    user_id: user
                        .as_deref()
                        .map(str::parse::<UserUuid>)
                        .transpose()
                        .context("invalid user id")?,
                    address_name: address,
                    location: lat.zip(lng).map(|(lat, lng)| LatLng { lat, lng }),
                };

                let total = render::format_money(self.store.cart().total_price(), self.currency)?;
                let gateway = OutboxGateway::new(self.outbox_dir);
                let confirmation = place_order(self.store, &form, &gateway)?;

                writeln!(out, "Order {} placed for {total}", confirmation.id)?;
            }
            Command::Logout => {
                self.store.clear_cart();
                info!("session ended");
                writeln!(out, "Logged out")?;
            }
        }

        Ok(())
    }

    fn show<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        let view = render::cart_view(self.store.cart(), self.currency)?;
        writeln!(out, "{view}")?;

        Ok(())
    }

    fn add<W: Write>(&mut self, key: &str, quantity: u32, out: &mut W) -> anyhow::Result<()> {
        let product = self
            .catalog
            .find(key)
            .cloned()
            .ok_or_else(|| CliError::UnknownProduct(key.to_string()))?;

        let name = product.name.clone();

        for _ in 0..quantity {
            let change = self.store.add_to_cart(product.clone())?;

            if let CartChange::AtStockLimit { quantity } = change {
                writeln!(out, "{name}: max stock reached ({quantity} in cart)")?;
                break;
            }
        }

        writeln!(
            out,
            "{name}: {} in cart, {} items total",
            self.store.cart().quantity_of(product.id),
            self.store.cart().total_count()
        )?;

        Ok(())
    }

    fn refresh<W: Write>(&mut self, out: &mut W) -> anyhow::Result<()> {
        let fresh: Vec<_> = self
            .store
            .cart()
            .items()
            .iter()
            .filter_map(|item| self.catalog.find(&item.product_id().to_string()).cloned())
            .collect();

        for product in fresh {
            let name = product.name.clone();
            let change = self.store.refresh_product(product)?;

            describe(change, &name, out)?;
        }

        Ok(())
    }

    /// Products in the cart may have left the catalog, so ids are accepted
    /// as-is when no catalog entry matches.
    fn resolve_id(&self, key_or_id: &str) -> Result<ProductUuid, CliError> {
        self.catalog
            .find(key_or_id)
            .map(|product| product.id)
            .or_else(|| key_or_id.parse().ok())
            .ok_or_else(|| CliError::UnknownProduct(key_or_id.to_string()))
    }
}

fn describe<W: Write>(change: CartChange, name: &str, out: &mut W) -> anyhow::Result<()> {
    match change {
        CartChange::Added => writeln!(out, "{name}: added")?,
        CartChange::Incremented { quantity } => writeln!(out, "{name}: {quantity} in cart")?,
        CartChange::AtStockLimit { quantity } => {
            writeln!(out, "{name}: max stock reached ({quantity} in cart)")?;
        }
        CartChange::QuantityChanged { from, to } => writeln!(out, "{name}: {from} -> {to}")?,
        CartChange::Unchanged => writeln!(out, "{name}: unchanged")?,
        CartChange::Removed { .. } => writeln!(out, "{name}: removed")?,
        CartChange::NotInCart => writeln!(out, "{name}: not in cart")?,
        CartChange::Refreshed { quantity } => {
            writeln!(out, "{name}: refreshed, {quantity} in cart")?;
        }
        CartChange::Cleared { lines } => writeln!(out, "{lines} lines removed")?,
    }

    Ok(())
}
