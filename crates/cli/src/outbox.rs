//! Order outbox
//!
//! Stands in for the remote order API: each accepted order request is written
//! to `<storage-dir>/orders/<order-id>.json` for a later sync to pick up.

use std::{fs, path::PathBuf};

use storefront_cart::checkout::{
    GatewayError, OrderConfirmation, OrderGateway, OrderRequest, OrderUuid,
};

/// Order gateway writing requests to a local directory.
#[derive(Debug, Clone)]
pub struct OutboxGateway {
    dir: PathBuf,
}

impl OutboxGateway {
    /// Use `dir` as the outbox.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl OrderGateway for OutboxGateway {
    fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, GatewayError> {
        let id = OrderUuid::new();

        let payload = serde_json::to_string_pretty(request)
            .map_err(|error| GatewayError::Rejected(error.to_string()))?;

        fs::create_dir_all(&self.dir)
            .and_then(|()| fs::write(self.dir.join(format!("{id}.json")), payload))
            .map_err(|error| GatewayError::Unavailable(error.to_string()))?;

        Ok(OrderConfirmation { id })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use storefront_cart::checkout::{OrderAddress, OrderLatLng};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn writes_request_named_after_order_id() -> TestResult {
        let dir = tempfile::tempdir()?;
        let gateway = OutboxGateway::new(dir.path().join("orders"));

        let request = OrderRequest {
            total_price: Decimal::new(1250, 2),
            user_id: None,
            order_address: OrderAddress {
                address_name: "1 Harbour Way".to_string(),
                address_lat_lng: OrderLatLng {
                    lat: "1.5".to_string(),
                    lng: "2.5".to_string(),
                },
            },
            order_items: Vec::new(),
        };

        let confirmation = gateway.create_order(&request)?;

        let written =
            fs::read_to_string(dir.path().join("orders").join(format!("{}.json", confirmation.id)))?;
        let parsed: OrderRequest = serde_json::from_str(&written)?;

        assert_eq!(parsed, request);

        Ok(())
    }
}
