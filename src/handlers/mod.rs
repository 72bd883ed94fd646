pub mod common;
pub mod health;
pub mod orders;
pub mod products;

use crate::{
    config::AppConfig,
    events::EventSender,
    services::{catalog::CatalogService, orders::OrderIngestionService},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;

/// Aggregated services used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub orders: Arc<OrderIngestionService>,
}

impl AppServices {
    /// Wires the service layer. A `None` database keeps everything running
    /// in fallback mode: mock catalog reads and in-memory order capture.
    pub fn new(
        db: Option<Arc<DatabaseConnection>>,
        event_sender: Arc<EventSender>,
        config: &AppConfig,
    ) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(db.clone(), event_sender.clone())),
            orders: Arc::new(OrderIngestionService::new(
                db,
                event_sender,
                Duration::from_secs(config.order_store_timeout_secs),
            )),
        }
    }
}
