use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Petalworks Storefront API",
        version = "0.1.0",
        description = r#"
# Petalworks Storefront API

Backend for the Petalworks flower shop storefront: product catalog, order
ingestion, and order lifecycle.

Order creation degrades gracefully: when the durable store is unreachable,
orders are captured on a process-local in-memory list and still answered
with `201 Created`. That fallback list does not survive restarts and is not
visible to the read endpoints.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Products", description = "Catalog reads and admin CRUD"),
        (name = "Orders", description = "Order ingestion and lifecycle"),
        (name = "Health", description = "Liveness probe")
    ),
    paths(
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_order_status,
        crate::handlers::orders::delete_order,
        crate::handlers::health::health_check,
    ),
    components(schemas(
        crate::services::catalog::ProductRecord,
        crate::services::catalog::CreateProductInput,
        crate::services::catalog::UpdateProductInput,
        crate::entities::Category,
        crate::entities::OrderStatus,
        crate::services::orders::OrderRecord,
        crate::services::orders::OrderLine,
        crate::services::orders::OrderLineInput,
        crate::services::orders::CreateOrderInput,
        crate::services::orders::ShippingAddress,
        crate::handlers::orders::UpdateOrderStatusRequest,
        crate::errors::ErrorResponse,
    ))
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
