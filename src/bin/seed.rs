//! Loads the starter catalog into the durable store. Safe to re-run:
//! products that already exist by name are skipped.

use anyhow::Context;
use petalworks_api as api;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use api::entities::{product, Product};
use api::services::catalog::{fallback_catalog, CatalogService, CreateProductInput};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    let db = api::db::establish_connection_from_app_config(&cfg)
        .await
        .context("cannot seed: durable store unreachable")?;
    api::db::ensure_schema(&db).await?;
    let db = Arc::new(db);

    let (event_tx, event_rx) = mpsc::channel(64);
    tokio::spawn(api::events::process_events(event_rx));
    let catalog = CatalogService::new(
        Some(db.clone()),
        Arc::new(api::events::EventSender::new(event_tx)),
    );

    let mut created = 0usize;
    let mut skipped = 0usize;

    for starter in fallback_catalog() {
        let existing = Product::find()
            .filter(product::Column::Name.eq(starter.name.clone()))
            .one(db.as_ref())
            .await?;
        if existing.is_some() {
            skipped += 1;
            continue;
        }

        catalog
            .create_product(CreateProductInput {
                name: starter.name.clone(),
                description: starter.description.clone(),
                price: starter.price,
                category: starter.category,
                image_url: starter.image_url.clone(),
                in_stock: starter.in_stock,
                featured: starter.featured,
            })
            .await
            .with_context(|| format!("failed to seed product '{}'", starter.name))?;
        created += 1;
    }

    info!(created, skipped, "catalog seeding finished");
    Ok(())
}
