//! Catalog
//!
//! Loads product snapshots from YAML fixture files in `fixtures/products/`.
//! The remote catalog API is the real source of products; fixtures stand in
//! for it in the command line front-end and in tests.

use std::{collections::BTreeMap, fs, path::Path};

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use thiserror::Error;

use crate::products::{CategoryRef, ProductSnapshot, ProductUuid};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A product has a negative price
    #[error("Product {0} has a negative price")]
    NegativePrice(String),

    /// Two fixture keys share a product id
    #[error("Product id {0} is used more than once")]
    DuplicateId(ProductUuid),
}

/// Top-level products fixture from YAML.
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Products keyed by fixture key
    pub products: BTreeMap<String, ProductFixture>,
}

/// A single product in the fixture.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProductFixture {
    /// Product id
    pub id: ProductUuid,

    /// Display name
    pub name: String,

    /// Unit price, e.g. `"12.50"`
    pub price: Decimal,

    /// Units in stock
    #[serde(alias = "stock_quantity")]
    pub stock: u32,

    /// Category
    #[serde(default)]
    pub category: Option<CategoryRef>,

    /// Image location
    #[serde(default, alias = "image_url")]
    pub image: Option<String>,
}

impl From<ProductFixture> for ProductSnapshot {
    fn from(fixture: ProductFixture) -> Self {
        Self {
            id: fixture.id,
            name: fixture.name,
            price: fixture.price,
            stock_quantity: fixture.stock,
            category: fixture.category,
            image_url: fixture.image,
        }
    }
}

/// Catalog entry: a product and the fixture key it was loaded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Fixture key
    pub key: String,

    /// Product snapshot
    pub product: ProductSnapshot,
}

/// Products available to add to the cart, ordered by fixture key.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Parse a products fixture.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the YAML is invalid, a price is negative,
    /// or two products share an id.
    pub fn from_yaml(yaml: &str) -> Result<Self, FixtureError> {
        let fixture: ProductsFixture = serde_norway::from_str(yaml)?;

        let mut ids = FxHashSet::default();
        let mut entries = Vec::with_capacity(fixture.products.len());

        for (key, product) in fixture.products {
            if product.price < Decimal::ZERO {
                return Err(FixtureError::NegativePrice(key));
            }

            if !ids.insert(product.id) {
                return Err(FixtureError::DuplicateId(product.id));
            }

            entries.push(CatalogEntry {
                key,
                product: product.into(),
            });
        }

        Ok(Self { entries })
    }

    /// Read and parse a products fixture file.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let yaml = fs::read_to_string(path)?;

        Self::from_yaml(&yaml)
    }

    /// All entries, ordered by fixture key.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Look a product up by fixture key or by id.
    pub fn find(&self, key_or_id: &str) -> Option<&ProductSnapshot> {
        let id = key_or_id.parse::<ProductUuid>().ok();

        self.entries
            .iter()
            .find(|entry| entry.key == key_or_id || Some(entry.product.id) == id)
            .map(|entry| &entry.product)
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
