use crate::{
    entities::{product, Category, Product},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Catalog product as served over the API. The identifier is an opaque
/// string: durable rows carry UUIDs, mock catalog entries carry short
/// numeric ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub image_url: String,
    pub in_stock: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<product::Model> for ProductRecord {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id.to_string(),
            name: model.name,
            description: model.description,
            price: model.price,
            category: model.category,
            image_url: model.image_url,
            in_stock: model.in_stock,
            featured: model.featured,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Listing filter. `featured` only narrows when explicitly true, matching
/// the query-string contract.
#[derive(Debug, Clone, Default)]
pub struct ProductListFilter {
    pub category: Option<Category>,
    pub featured: Option<bool>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, validator::Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProductInput {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Product description is required"))]
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    #[validate(length(min = 1, message = "Product image is required"))]
    pub image_url: String,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub featured: bool,
}

fn default_in_stock() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<Category>,
    pub image_url: Option<String>,
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
}

/// Built-in catalog served when the durable store is unreachable; also the
/// starter data the `seed` binary loads into a fresh store.
pub fn fallback_catalog() -> &'static [ProductRecord] {
    static CATALOG: Lazy<Vec<ProductRecord>> = Lazy::new(|| {
        let listed = Utc::now();
        let entry = |id: &str,
                     name: &str,
                     description: &str,
                     price: Decimal,
                     category: Category,
                     image_url: &str,
                     featured: bool| ProductRecord {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            price,
            category,
            image_url: image_url.to_string(),
            in_stock: true,
            featured,
            created_at: listed,
            updated_at: listed,
        };

        vec![
            entry(
                "1",
                "Classic Red Roses",
                "A timeless bouquet of 12 premium red roses with baby's breath and lush greenery. Perfect for expressing love and romance.",
                dec!(59.99),
                Category::Roses,
                "/images/red-roses.png",
                true,
            ),
            entry(
                "2",
                "Spring Tulip Mix",
                "Vibrant assortment of colorful tulips that bring the essence of spring into any room. Available in pink, yellow, and white.",
                dec!(45.99),
                Category::Tulips,
                "/images/spring-tulips.png",
                true,
            ),
            entry(
                "3",
                "Sunshine Sunflowers",
                "Cheerful sunflowers that brighten any day. This bouquet features 6 large sunflower blooms with complementary greenery.",
                dec!(39.99),
                Category::Sunflowers,
                "/images/sunflowers.jpg",
                true,
            ),
            entry(
                "4",
                "Elegant White Lilies",
                "Pure white oriental lilies symbolizing elegance and tranquility. Perfect for special occasions and sympathy arrangements.",
                dec!(54.99),
                Category::Lilies,
                "/images/white-lilies.png",
                false,
            ),
            entry(
                "5",
                "Mixed Wildflower Bundle",
                "Rustic arrangement of seasonal wildflowers picked at their peak. Each bouquet is unique and full of natural charm.",
                dec!(34.99),
                Category::Mixed,
                "/images/wildflowers.png",
                true,
            ),
            entry(
                "6",
                "Pink Peony Perfection",
                "Luxurious peonies in shades of pink and blush. These full-bloomed beauties are the epitome of romantic elegance.",
                dec!(69.99),
                Category::Peonies,
                "/images/pink-peonies.png",
                false,
            ),
        ]
    });

    &CATALOG
}

/// Read path over the durable product catalog with the built-in mock
/// catalog as fallback, plus durable-only admin CRUD.
#[derive(Clone)]
pub struct CatalogService {
    db: Option<Arc<DatabaseConnection>>,
    event_sender: Arc<EventSender>,
}

impl CatalogService {
    pub fn new(db: Option<Arc<DatabaseConnection>>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Lists products, newest first. Falls back to the built-in catalog when
    /// the durable store is unreachable or was never configured.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductListFilter,
    ) -> Result<Vec<ProductRecord>, ServiceError> {
        let Some(db) = &self.db else {
            return Ok(filter_fallback(&filter));
        };

        let mut query = Product::find();
        if let Some(category) = filter.category {
            query = query.filter(product::Column::Category.eq(category));
        }
        if filter.featured == Some(true) {
            query = query.filter(product::Column::Featured.eq(true));
        }
        query = query.order_by_desc(product::Column::CreatedAt);
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        match query.all(db.as_ref()).await {
            Ok(models) => Ok(models.into_iter().map(ProductRecord::from).collect()),
            Err(e) => {
                warn!(error = %e, "durable product query failed; serving mock catalog");
                Ok(filter_fallback(&filter))
            }
        }
    }

    /// Fetches one product by opaque id. Identifiers that are not UUIDs can
    /// only match mock catalog entries.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> Result<Option<ProductRecord>, ServiceError> {
        let Some(db) = &self.db else {
            return Ok(lookup_fallback(id));
        };

        let Ok(uuid) = Uuid::parse_str(id) else {
            return Ok(lookup_fallback(id));
        };

        match Product::find_by_id(uuid).one(db.as_ref()).await {
            Ok(found) => Ok(found.map(ProductRecord::from)),
            Err(e) => {
                warn!(error = %e, "durable product lookup failed; serving mock catalog");
                Ok(lookup_fallback(id))
            }
        }
    }

    /// Creates a product in the durable store. Unlike reads, admin writes
    /// have no mock fallback.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<ProductRecord, ServiceError> {
        validate_price(input.price)?;
        let db = self.durable()?;

        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            category: Set(input.category),
            image_url: Set(input.image_url),
            in_stock: Set(input.in_stock),
            featured: Set(input.featured),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model.insert(db.as_ref()).await?;
        let record = ProductRecord::from(created);

        self.event_sender
            .send_or_log(Event::ProductCreated(record.id.clone()))
            .await;
        info!(product_id = %record.id, "product created");
        Ok(record)
    }

    /// Applies a partial update; returns `None` for an unknown id.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: &str,
        input: UpdateProductInput,
    ) -> Result<Option<ProductRecord>, ServiceError> {
        if let Some(price) = input.price {
            validate_price(price)?;
        }
        let db = self.durable()?;

        let Ok(uuid) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let Some(existing) = Product::find_by_id(uuid).one(db.as_ref()).await? else {
            return Ok(None);
        };

        let mut model: product::ActiveModel = existing.into();
        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(description) = input.description {
            model.description = Set(description);
        }
        if let Some(price) = input.price {
            model.price = Set(price);
        }
        if let Some(category) = input.category {
            model.category = Set(category);
        }
        if let Some(image_url) = input.image_url {
            model.image_url = Set(image_url);
        }
        if let Some(in_stock) = input.in_stock {
            model.in_stock = Set(in_stock);
        }
        if let Some(featured) = input.featured {
            model.featured = Set(featured);
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(db.as_ref()).await?;
        Ok(Some(ProductRecord::from(updated)))
    }

    /// Deletes a product; returns whether a row was removed.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &str) -> Result<bool, ServiceError> {
        let db = self.durable()?;

        let Ok(uuid) = Uuid::parse_str(id) else {
            return Ok(false);
        };

        let result = Product::delete_by_id(uuid).exec(db.as_ref()).await?;
        let deleted = result.rows_affected > 0;
        if deleted {
            self.event_sender
                .send_or_log(Event::ProductDeleted(id.to_string()))
                .await;
        }
        Ok(deleted)
    }

    fn durable(&self) -> Result<&Arc<DatabaseConnection>, ServiceError> {
        self.db.as_ref().ok_or_else(|| {
            ServiceError::StoreUnavailable("no durable store configured".to_string())
        })
    }
}

fn validate_price(price: Decimal) -> Result<(), ServiceError> {
    if price < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "price must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn filter_fallback(filter: &ProductListFilter) -> Vec<ProductRecord> {
    let mut records: Vec<ProductRecord> = fallback_catalog()
        .iter()
        .filter(|p| filter.category.map_or(true, |c| p.category == c))
        .filter(|p| filter.featured != Some(true) || p.featured)
        .cloned()
        .collect();

    if let Some(limit) = filter.limit {
        records.truncate(limit as usize);
    }
    records
}

fn lookup_fallback(id: &str) -> Option<ProductRecord> {
    fallback_catalog().iter().find(|p| p.id == id).cloned()
}
