use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Catalog product entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub price: Decimal,
    pub category: Category,
    pub image_url: String,
    pub in_stock: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Product category enumeration.
///
/// A single closed set covering every category the catalog and the starter
/// data actually use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[sea_orm(string_value = "roses")]
    Roses,
    #[sea_orm(string_value = "tulips")]
    Tulips,
    #[sea_orm(string_value = "orchids")]
    Orchids,
    #[sea_orm(string_value = "sunflowers")]
    Sunflowers,
    #[sea_orm(string_value = "lilies")]
    Lilies,
    #[sea_orm(string_value = "peonies")]
    Peonies,
    #[sea_orm(string_value = "mixed")]
    Mixed,
    #[sea_orm(string_value = "seasonal")]
    Seasonal,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Roses => "roses",
            Category::Tulips => "tulips",
            Category::Orchids => "orchids",
            Category::Sunflowers => "sunflowers",
            Category::Lilies => "lilies",
            Category::Peonies => "peonies",
            Category::Mixed => "mixed",
            Category::Seasonal => "seasonal",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "roses" => Ok(Category::Roses),
            "tulips" => Ok(Category::Tulips),
            "orchids" => Ok(Category::Orchids),
            "sunflowers" => Ok(Category::Sunflowers),
            "lilies" => Ok(Category::Lilies),
            "peonies" => Ok(Category::Peonies),
            "mixed" => Ok(Category::Mixed),
            "seasonal" => Ok(Category::Seasonal),
            _ => Err(()),
        }
    }
}
