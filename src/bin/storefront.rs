//! Command-line storefront client: browses the catalog, maintains the
//! locally persisted cart, and submits checkout to the API.
//!
//! The cart lives in a JSON snapshot next to the current directory (or at
//! `--cart <path>`), so it survives between invocations exactly like a
//! browser cart survives between sessions.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use petalworks_api::cart::{CartStore, FileCartStorage};
use petalworks_api::errors::ErrorResponse;
use petalworks_api::services::catalog::ProductRecord;
use petalworks_api::services::orders::{
    CreateOrderInput, OrderLineInput, OrderRecord, ShippingAddress,
};
use reqwest::StatusCode;

#[derive(Parser)]
#[command(name = "storefront", about = "Petalworks storefront client")]
struct Cli {
    /// Base URL of the storefront API
    #[arg(long, default_value = "http://localhost:8080")]
    api: String,

    /// Path of the cart snapshot file
    #[arg(long)]
    cart: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List products
    Catalog {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        featured: bool,
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Show the cart
    Show,
    /// Add a product to the cart
    Add {
        product_id: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product from the cart
    Remove { product_id: String },
    /// Replace the quantity of a cart line (0 removes it)
    SetQuantity { product_id: String, quantity: u32 },
    /// Empty the cart
    Clear,
    /// Submit the cart as an order
    Checkout {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        street: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        zip: String,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let storage = match &cli.cart {
        Some(path) => FileCartStorage::at_path(path.clone()),
        None => FileCartStorage::new("."),
    };
    let mut cart = CartStore::open(Box::new(storage));
    let client = reqwest::Client::new();

    match cli.command {
        Command::Catalog {
            category,
            featured,
            limit,
        } => {
            let mut query: Vec<(&str, String)> = Vec::new();
            if let Some(category) = category {
                query.push(("category", category));
            }
            if featured {
                query.push(("featured", "true".to_string()));
            }
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }

            let response = client
                .get(format!("{}/api/products", cli.api))
                .query(&query)
                .send()
                .await
                .context("catalog request failed")?;
            let products: Vec<ProductRecord> = parse_response(response).await?;

            for product in products {
                println!(
                    "{:>4}  {:<28} {:>8}  {}{}",
                    product.id,
                    product.name,
                    product.price,
                    product.category,
                    if product.featured { "  (featured)" } else { "" }
                );
            }
        }

        Command::Show => {
            if cart.is_empty() {
                println!("cart is empty");
                return Ok(());
            }
            for item in cart.items() {
                println!(
                    "{:>4}  {:<28} {:>3} x {:>8} = {:>9}",
                    item.product_id,
                    item.name,
                    item.quantity,
                    item.price,
                    item.line_total()
                );
            }
            println!("total: {}  ({} items)", cart.total(), cart.count());
        }

        Command::Add {
            product_id,
            quantity,
        } => {
            let response = client
                .get(format!("{}/api/products/{}", cli.api, product_id))
                .send()
                .await
                .context("product lookup failed")?;
            let product: ProductRecord = parse_response(response).await?;

            cart.add(&product, quantity)?;
            println!("added {} x {}", quantity, product.name);
        }

        Command::Remove { product_id } => {
            cart.remove(&product_id)?;
            println!("removed {}", product_id);
        }

        Command::SetQuantity {
            product_id,
            quantity,
        } => {
            cart.set_quantity(&product_id, quantity)?;
            println!("set {} to quantity {}", product_id, quantity);
        }

        Command::Clear => {
            cart.clear()?;
            println!("cart cleared");
        }

        Command::Checkout {
            name,
            email,
            phone,
            street,
            city,
            zip,
            notes,
        } => {
            if cart.is_empty() {
                bail!("cart is empty; nothing to check out");
            }

            let order = CreateOrderInput {
                customer_name: name,
                email,
                phone,
                shipping_address: ShippingAddress {
                    street,
                    city,
                    zip_code: zip,
                },
                items: cart
                    .items()
                    .iter()
                    .map(|item| OrderLineInput {
                        product_id: item.product_id.clone(),
                        product_name: Some(item.name.clone()),
                        quantity: item.quantity,
                        price: item.price,
                    })
                    .collect(),
                total_amount: cart.total(),
                notes,
            };

            let response = client
                .post(format!("{}/api/orders", cli.api))
                .json(&order)
                .send()
                .await
                .context("order submission failed")?;

            if response.status() != StatusCode::CREATED {
                // Checkout halts here; the cart is only cleared on success.
                return Err(api_error(response).await);
            }

            let record: OrderRecord = response
                .json()
                .await
                .context("could not decode order record")?;
            cart.clear()?;
            println!(
                "order {} placed (status: {}, total: {})",
                record.id, record.status, record.total_amount
            );
        }
    }

    Ok(())
}

async fn parse_response<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    response.json().await.context("could not decode response")
}

async fn api_error(response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    match response.json::<ErrorResponse>().await {
        Ok(body) => anyhow!("{} ({})", body.message, status),
        Err(_) => anyhow!("request failed with status {}", status),
    }
}
