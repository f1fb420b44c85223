//! Checkout
//!
//! Turns the cart into an order request for the remote order API and empties
//! the cart once the order has been confirmed.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[cfg(test)]
use mockall::automock;

use crate::{
    cart::Cart,
    persistence::CartStorage,
    products::ProductUuid,
    store::CartStore,
    uuids::TypedUuid,
};

/// Customer account marker
#[derive(Debug)]
pub struct User;

/// User UUID
pub type UserUuid = TypedUuid<User>;

/// Order UUID
pub type OrderUuid = TypedUuid<OrderConfirmation>;

/// A delivery location picked on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    /// Latitude in degrees
    pub lat: f64,

    /// Longitude in degrees
    pub lng: f64,
}

/// Delivery details entered on the checkout page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutForm {
    /// Signed-in customer, if known
    pub user_id: Option<UserUuid>,

    /// Free-form delivery address
    pub address_name: String,

    /// Selected map location
    pub location: Option<LatLng>,
}

/// A checkout form field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutField {
    /// Address is blank.
    AddressName,

    /// No location was selected on the map.
    Location,

    /// The cart has no lines.
    Items,
}

impl fmt::Display for CheckoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AddressName => "address is required",
            Self::Location => "please select a location on the map",
            Self::Items => "cart is empty",
        })
    }
}

/// Errors from the remote order API.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The API refused the order.
    #[error("order rejected: {0}")]
    Rejected(String),

    /// The API could not be reached or its response could not be read.
    #[error("order API unavailable: {0}")]
    Unavailable(String),
}

/// Checkout Errors
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// One or more form fields are missing.
    #[error("checkout form is incomplete: {}", join_fields(.0))]
    Incomplete(Vec<CheckoutField>),

    /// Wrapped order API error. The cart is left intact.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

fn join_fields(fields: &[CheckoutField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Coordinates as sent to the order API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLatLng {
    /// Latitude, as a decimal string
    pub lat: String,

    /// Longitude, as a decimal string
    pub lng: String,
}

/// Delivery address as sent to the order API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAddress {
    /// Free-form delivery address
    pub address_name: String,

    /// Selected map location
    pub address_lat_lng: OrderLatLng,
}

/// One order line as sent to the order API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    /// Ordered product
    pub product_id: ProductUuid,

    /// Units ordered
    pub quantity: u32,

    /// Unit price from the cart snapshot
    pub price: Decimal,
}

/// Order creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Order total computed from the cart
    pub total_price: Decimal,

    /// Ordering customer
    pub user_id: Option<UserUuid>,

    /// Delivery address
    pub order_address: OrderAddress,

    /// Ordered lines, in cart order
    pub order_items: Vec<OrderItemRequest>,
}

impl OrderRequest {
    /// Build an order request from the cart and the checkout form.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Incomplete`] listing every missing field.
    pub fn build(cart: &Cart, form: &CheckoutForm) -> Result<Self, CheckoutError> {
        let mut missing = Vec::new();

        if form.address_name.trim().is_empty() {
            missing.push(CheckoutField::AddressName);
        }

        if form.location.is_none() {
            missing.push(CheckoutField::Location);
        }

        if cart.is_empty() {
            missing.push(CheckoutField::Items);
        }

        let Some(location) = form.location else {
            return Err(CheckoutError::Incomplete(missing));
        };

        if !missing.is_empty() {
            return Err(CheckoutError::Incomplete(missing));
        }

        Ok(Self {
            total_price: cart.total_price(),
            user_id: form.user_id,
            order_address: OrderAddress {
                address_name: form.address_name.trim().to_string(),
                address_lat_lng: OrderLatLng {
                    lat: location.lat.to_string(),
                    lng: location.lng.to_string(),
                },
            },
            order_items: cart
                .items()
                .iter()
                .map(|item| OrderItemRequest {
                    product_id: item.product_id(),
                    quantity: item.quantity(),
                    price: item.product().price,
                })
                .collect(),
        })
    }
}

/// Order confirmed by the order API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    /// Identifier of the created order, used by the payment step
    pub id: OrderUuid,
}

/// The remote order API.
#[cfg_attr(test, automock)]
pub trait OrderGateway {
    /// Create an order.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the order was not created.
    fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, GatewayError>;
}

/// Submit the cart as an order and clear it once the order is confirmed.
///
/// # Errors
///
/// - [`CheckoutError::Incomplete`]: the form or cart is incomplete; nothing
///   is sent.
/// - [`CheckoutError::Gateway`]: the order API failed; the cart is kept.
pub fn place_order<S, G>(
    store: &mut CartStore<S>,
    form: &CheckoutForm,
    gateway: &G,
) -> Result<OrderConfirmation, CheckoutError>
where
    S: CartStorage,
    G: OrderGateway + ?Sized,
{
    let request = OrderRequest::build(store.cart(), form)?;

    let confirmation = gateway.create_order(&request).inspect_err(|error| {
        warn!(%error, "order creation failed; keeping cart");
    })?;

    info!(
        order = %confirmation.id,
        lines = request.order_items.len(),
        total_price = %request.total_price,
        "order created"
    );

    store.clear_cart();

    Ok(confirmation)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        persistence::MemoryStorage,
        products::{ProductSnapshot, ProductUuid},
    };

    use super::*;

    fn filled_store() -> Result<(CartStore<MemoryStorage>, ProductSnapshot), crate::cart::CartError> {
        let mut store = CartStore::open(MemoryStorage::new());
        let product = ProductSnapshot::new(ProductUuid::new(), "Kettle", Decimal::new(3500, 2), 4);

        store.add_to_cart(product.clone())?;
        store.add_to_cart(product.clone())?;

        Ok((store, product))
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            user_id: Some(UserUuid::new()),
            address_name: "  12 Nile Street, Cairo ".to_string(),
            location: Some(LatLng {
                lat: 29.0661,
                lng: 31.0994,
            }),
        }
    }

    #[test]
    fn build_maps_cart_lines_to_order_items() -> TestResult {
        let (store, product) = filled_store()?;

        let request = OrderRequest::build(store.cart(), &form())?;

        assert_eq!(request.total_price, Decimal::new(7000, 2));
        assert_eq!(request.order_address.address_name, "12 Nile Street, Cairo");
        assert_eq!(request.order_address.address_lat_lng.lat, "29.0661");
        assert_eq!(
            request.order_items,
            vec![OrderItemRequest {
                product_id: product.id,
                quantity: 2,
                price: Decimal::new(3500, 2),
            }]
        );

        Ok(())
    }

    #[test]
    fn request_serialises_with_api_field_names() -> TestResult {
        let (store, _) = filled_store()?;

        let json = serde_json::to_value(OrderRequest::build(store.cart(), &form())?)?;

        assert!(json.get("totalPrice").is_some());
        assert!(json.get("userId").is_some());
        assert!(json["orderAddress"]["addressLatLng"].get("lng").is_some());
        assert_eq!(json["orderItems"][0]["quantity"], 2);

        Ok(())
    }

    #[test]
    fn build_reports_every_missing_field() {
        let result = OrderRequest::build(&Cart::new(), &CheckoutForm::default());

        assert!(matches!(
            result,
            Err(CheckoutError::Incomplete(fields)) if fields == vec![
                CheckoutField::AddressName,
                CheckoutField::Location,
                CheckoutField::Items,
            ]
        ));
    }

    #[test]
    fn place_order_clears_cart_on_confirmation() -> TestResult {
        let (mut store, _) = filled_store()?;
        let order_id = OrderUuid::new();
        let mut gateway = MockOrderGateway::new();

        gateway
            .expect_create_order()
            .once()
            .withf(|request| request.order_items.len() == 1)
            .returning(move |_| Ok(OrderConfirmation { id: order_id }));

        let confirmation = place_order(&mut store, &form(), &gateway)?;

        assert_eq!(confirmation.id, order_id);
        assert!(store.cart().is_empty());

        Ok(())
    }

    #[test]
    fn place_order_keeps_cart_when_gateway_fails() -> TestResult {
        let (mut store, product) = filled_store()?;
        let mut gateway = MockOrderGateway::new();

        gateway
            .expect_create_order()
            .once()
            .returning(|_| Err(GatewayError::Unavailable("timeout".to_string())));

        let result = place_order(&mut store, &form(), &gateway);

        assert!(matches!(result, Err(CheckoutError::Gateway(_))));
        assert_eq!(store.cart().quantity_of(product.id), 2);

        Ok(())
    }

    #[test]
    fn place_order_with_incomplete_form_sends_nothing() -> TestResult {
        let (mut store, _) = filled_store()?;
        let mut gateway = MockOrderGateway::new();

        gateway.expect_create_order().never();

        let incomplete = CheckoutForm {
            location: None,
            ..form()
        };

        assert!(matches!(
            place_order(&mut store, &incomplete, &gateway),
            Err(CheckoutError::Incomplete(_))
        ));
        assert!(!store.cart().is_empty());

        Ok(())
    }
}
