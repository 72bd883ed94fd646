use crate::handlers::common::{created_response, success_response, validate_input};
use crate::{
    entities::Category,
    errors::ServiceError,
    services::catalog::{CreateProductInput, ProductListFilter, UpdateProductInput},
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use utoipa::IntoParams;

/// Creates the router for product endpoints
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProductListQuery {
    /// Category filter; "all" (or absent) disables the filter
    pub category: Option<String>,
    /// When true, only featured products are returned
    pub featured: Option<bool>,
    /// Maximum number of products to return
    pub limit: Option<u64>,
}

impl ProductListQuery {
    fn into_filter(self) -> Result<ProductListFilter, ServiceError> {
        let category = match self.category.as_deref() {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(Category::from_str(raw).map_err(|_| {
                ServiceError::ValidationError(format!("Unknown category: {}", raw))
            })?),
        };

        Ok(ProductListFilter {
            category,
            featured: self.featured,
            limit: self.limit,
        })
    }
}

/// List products with optional filtering
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Products retrieved successfully", body = [crate::services::catalog::ProductRecord]),
        (status = 400, description = "Unknown category", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = query.into_filter()?;
    let products = state.services.catalog.list_products(filter).await?;
    Ok(success_response(products))
}

/// Get a single product by id
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product retrieved successfully", body = crate::services::catalog::ProductRecord),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    match state.services.catalog.get_product(&id).await? {
        Some(product) => Ok(success_response(product)),
        None => Err(ServiceError::NotFound(format!(
            "Product with ID {} not found",
            id
        ))),
    }
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = CreateProductInput,
    responses(
        (status = 201, description = "Product created successfully", body = crate::services::catalog::ProductRecord),
        (status = 400, description = "Invalid product payload", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductInput>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let product = state.services.catalog.create_product(payload).await?;
    Ok(created_response(product))
}

/// Update an existing product
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = String, Path, description = "Product id")),
    request_body = UpdateProductInput,
    responses(
        (status = 200, description = "Product updated successfully", body = crate::services::catalog::ProductRecord),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProductInput>,
) -> Result<impl IntoResponse, ServiceError> {
    match state.services.catalog.update_product(&id, payload).await? {
        Some(product) => Ok(success_response(product)),
        None => Err(ServiceError::NotFound(format!(
            "Product with ID {} not found",
            id
        ))),
    }
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted successfully"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    if state.services.catalog.delete_product(&id).await? {
        Ok(success_response(json!({
            "message": "Product deleted successfully"
        })))
    } else {
        Err(ServiceError::NotFound(format!(
            "Product with ID {} not found",
            id
        )))
    }
}
