//! Storage capability behind order ingestion: a durable sea-orm backend and
//! a process-local in-memory list used when the store is unreachable.

use super::orders::{CreateOrderInput, OrderLine, OrderRecord, ShippingAddress};
use crate::entities::{order, order_item, Order, OrderItem, OrderStatus};
use crate::errors::ServiceError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Write capability over order storage. Both backends record a pending order
/// and hand back the normalized record; only the durable backend also has a
/// read path.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn record_order(&self, draft: &CreateOrderInput) -> Result<OrderRecord, ServiceError>;
}

/// Orders persisted through sea-orm.
#[derive(Clone)]
pub struct DurableOrderStore {
    db: Arc<DatabaseConnection>,
}

impl DurableOrderStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn fetch_order(&self, id: Uuid) -> Result<Option<OrderRecord>, ServiceError> {
        let Some(model) = Order::find_by_id(id).one(self.db.as_ref()).await? else {
            return Ok(None);
        };
        let items = self.load_items(id).await?;
        Ok(Some(record_from_models(model, items)))
    }

    /// All orders, newest first.
    pub async fn list_orders(&self) -> Result<Vec<OrderRecord>, ServiceError> {
        let models = Order::find()
            .order_by_desc(order::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        let mut records = Vec::with_capacity(models.len());
        for model in models {
            let items = self.load_items(model.id).await?;
            records.push(record_from_models(model, items));
        }
        Ok(records)
    }

    /// Sets the order status; returns the previous status alongside the
    /// updated record, or `None` for an unknown id.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<(OrderStatus, OrderRecord)>, ServiceError> {
        let Some(model) = Order::find_by_id(id).one(self.db.as_ref()).await? else {
            return Ok(None);
        };

        let old_status = model.status;
        let mut active: order::ActiveModel = model.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now());
        let updated = active.update(self.db.as_ref()).await?;

        let items = self.load_items(id).await?;
        Ok(Some((old_status, record_from_models(updated, items))))
    }

    /// Removes an order and its line items; returns whether anything was
    /// deleted.
    pub async fn delete_order(&self, id: Uuid) -> Result<bool, ServiceError> {
        let txn = self.db.begin().await?;
        OrderItem::delete_many()
            .filter(order_item::Column::OrderId.eq(id))
            .exec(&txn)
            .await?;
        let result = Order::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    async fn load_items(&self, order_id: Uuid) -> Result<Vec<order_item::Model>, ServiceError> {
        Ok(OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::Position)
            .all(self.db.as_ref())
            .await?)
    }
}

#[async_trait]
impl OrderStore for DurableOrderStore {
    async fn record_order(&self, draft: &CreateOrderInput) -> Result<OrderRecord, ServiceError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let txn = self.db.begin().await?;

        order::ActiveModel {
            id: Set(id),
            customer_name: Set(draft.customer_name.clone()),
            email: Set(draft.email.clone()),
            phone: Set(draft.phone.clone()),
            ship_street: Set(draft.shipping_address.street.clone()),
            ship_city: Set(draft.shipping_address.city.clone()),
            ship_zip: Set(draft.shipping_address.zip_code.clone()),
            total_amount: Set(draft.total_amount),
            notes: Set(draft.notes.clone()),
            status: Set(OrderStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        for (position, line) in draft.items.iter().enumerate() {
            order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(id),
                position: Set(position as i32),
                product_id: Set(line.product_id.clone()),
                product_name: Set(line.product_name.clone()),
                quantity: Set(line.quantity as i32),
                price: Set(line.price),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        Ok(record_from_draft(id.to_string(), draft, now))
    }
}

/// Process-local fallback list: append-only, never reordered, gone on
/// restart, and invisible to durable reads.
#[derive(Debug, Default)]
pub struct FallbackOrderList {
    entries: RwLock<Vec<OrderRecord>>,
    seq: AtomicU64,
}

impl FallbackOrderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of everything recorded so far, in append order.
    pub fn snapshot(&self) -> Vec<OrderRecord> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl OrderStore for FallbackOrderList {
    async fn record_order(&self, draft: &CreateOrderInput) -> Result<OrderRecord, ServiceError> {
        let now = Utc::now();
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let id = format!("offline-{}-{}", now.timestamp_millis(), seq);

        let record = record_from_draft(id, draft, now);
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.clone());
        Ok(record)
    }
}

fn record_from_draft(id: String, draft: &CreateOrderInput, now: DateTime<Utc>) -> OrderRecord {
    OrderRecord {
        id,
        customer_name: draft.customer_name.clone(),
        email: draft.email.clone(),
        phone: draft.phone.clone(),
        shipping_address: draft.shipping_address.clone(),
        items: draft
            .items
            .iter()
            .map(|line| OrderLine {
                product_id: line.product_id.clone(),
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                price: line.price,
            })
            .collect(),
        total_amount: draft.total_amount,
        notes: draft.notes.clone(),
        status: OrderStatus::Pending,
        created_at: now,
        updated_at: now,
    }
}

fn record_from_models(model: order::Model, items: Vec<order_item::Model>) -> OrderRecord {
    OrderRecord {
        id: model.id.to_string(),
        customer_name: model.customer_name,
        email: model.email,
        phone: model.phone,
        shipping_address: ShippingAddress {
            street: model.ship_street,
            city: model.ship_city,
            zip_code: model.ship_zip,
        },
        items: items
            .into_iter()
            .map(|item| OrderLine {
                product_id: item.product_id,
                product_name: item.product_name,
                quantity: item.quantity.max(0) as u32,
                price: item.price,
            })
            .collect(),
        total_amount: model.total_amount,
        notes: model.notes,
        status: model.status,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
