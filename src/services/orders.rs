//! Order ingestion: validates a cart snapshot plus customer details, records
//! it durably when possible, and otherwise falls back to the in-memory list
//! so checkout keeps working while the store is down.

use crate::{
    entities::OrderStatus,
    errors::ServiceError,
    events::{Event, EventSender},
    services::order_store::{DurableOrderStore, FallbackOrderList, OrderStore},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Largest caller-supplied/recomputed total difference tolerated before the
/// order is rejected.
const TOTAL_TOLERANCE: Decimal = dec!(0.01);

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ShippingAddress {
    #[validate(length(min = 1, message = "Street is required"))]
    pub street: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "Zip code is required"))]
    pub zip_code: String,
}

/// One line of the submitted cart snapshot. The price is the unit price the
/// customer saw at add-time; it is captured here, never re-read from the
/// catalog.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderLineInput {
    #[serde(rename = "product", alias = "productId")]
    #[validate(length(min = 1, message = "Product reference is required"))]
    pub product_id: String,
    #[serde(default, rename = "name", alias = "productName")]
    pub product_name: Option<String>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateOrderInput {
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,
    #[validate]
    pub shipping_address: ShippingAddress,
    #[validate]
    pub items: Vec<OrderLineInput>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(rename = "product")]
    pub product_id: String,
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub quantity: u32,
    pub price: Decimal,
}

/// Normalized order record returned to the caller regardless of which
/// backend recorded it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: String,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderLine>,
    pub total_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order ingestion over dual-path storage.
#[derive(Clone)]
pub struct OrderIngestionService {
    durable: Option<Arc<DurableOrderStore>>,
    fallback: Arc<FallbackOrderList>,
    store_timeout: Duration,
    event_sender: Arc<EventSender>,
}

impl OrderIngestionService {
    pub fn new(
        db: Option<Arc<DatabaseConnection>>,
        event_sender: Arc<EventSender>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            durable: db.map(|db| Arc::new(DurableOrderStore::new(db))),
            fallback: Arc::new(FallbackOrderList::new()),
            store_timeout,
            event_sender,
        }
    }

    /// Records an order. A single durable attempt is made under the
    /// configured timeout; any failure, including a timeout, takes the
    /// in-memory fallback path. Either way the caller gets a normalized
    /// pending record back.
    #[instrument(skip(self, input), fields(customer = %input.customer_name))]
    pub async fn create_order(
        &self,
        input: CreateOrderInput,
    ) -> Result<OrderRecord, ServiceError> {
        input.validate()?;

        if input.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "Order must contain at least one item".to_string(),
            ));
        }
        for line in &input.items {
            if line.price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Item {} has a negative price",
                    line.product_id
                )));
            }
        }

        // The caller-supplied total is not trusted; recompute from the line
        // items and reject anything beyond a one-cent tolerance.
        let computed: Decimal = input
            .items
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum();
        if (computed - input.total_amount).abs() > TOTAL_TOLERANCE {
            return Err(ServiceError::ValidationError(format!(
                "Total amount {} does not match line items ({})",
                input.total_amount, computed
            )));
        }

        if let Some(durable) = &self.durable {
            match timeout(self.store_timeout, durable.record_order(&input)).await {
                Ok(Ok(record)) => {
                    self.event_sender
                        .send_or_log(Event::OrderCreated(record.id.clone()))
                        .await;
                    info!(order_id = %record.id, "order recorded durably");
                    return Ok(record);
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "durable order write failed; using in-memory fallback");
                }
                Err(_) => {
                    warn!(
                        timeout_secs = self.store_timeout.as_secs(),
                        "durable order write timed out; using in-memory fallback"
                    );
                }
            }
        }

        let record = self.fallback.record_order(&input).await?;
        self.event_sender
            .send_or_log(Event::OrderRecordedOffline(record.id.clone()))
            .await;
        Ok(record)
    }

    /// Fetches an order from the durable store. Fallback-list identifiers
    /// never resolve here: that list has no read path.
    #[instrument(skip(self))]
    pub async fn get_order(&self, id: &str) -> Result<Option<OrderRecord>, ServiceError> {
        let durable = self.durable()?;
        let Ok(uuid) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        durable.fetch_order(uuid).await
    }

    /// Lists durable orders, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<OrderRecord>, ServiceError> {
        self.durable()?.list_orders().await
    }

    /// Moves an order to `status`. The target value is already confined to
    /// the enumeration by its type; no transition-graph checks are applied.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Option<OrderRecord>, ServiceError> {
        let durable = self.durable()?;
        let Ok(uuid) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        match durable.update_status(uuid, status).await? {
            Some((old_status, record)) => {
                self.event_sender
                    .send_or_log(Event::OrderStatusChanged {
                        order_id: record.id.clone(),
                        old_status: old_status.to_string(),
                        new_status: status.to_string(),
                    })
                    .await;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Deletes a durable order; returns whether anything was removed.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: &str) -> Result<bool, ServiceError> {
        let durable = self.durable()?;
        let Ok(uuid) = Uuid::parse_str(id) else {
            return Ok(false);
        };

        let deleted = durable.delete_order(uuid).await?;
        if deleted {
            self.event_sender
                .send_or_log(Event::OrderDeleted(id.to_string()))
                .await;
        }
        Ok(deleted)
    }

    /// Orders captured by the fallback list, in append order. Exposed for
    /// observability; these are invisible to the durable read path.
    pub fn offline_orders(&self) -> Vec<OrderRecord> {
        self.fallback.snapshot()
    }

    fn durable(&self) -> Result<&Arc<DurableOrderStore>, ServiceError> {
        self.durable.as_ref().ok_or_else(|| {
            ServiceError::StoreUnavailable("no durable store configured".to_string())
        })
    }
}
