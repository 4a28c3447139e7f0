//! Product catalogue rules: positive price, non-negative stock.

use crate::error::AppError;
use crate::store::{Collection, Row, SharedStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const COLLECTION: &str = "products";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Prices are integer cents.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Row<ProductRecord>> for Product {
    fn from(row: Row<ProductRecord>) -> Self {
        let ProductRecord {
            name,
            description,
            price_cents,
            stock,
            created_at,
            updated_at,
        } = row.data;
        Product {
            id: row.id,
            name,
            description,
            price_cents,
            stock,
            created_at,
            updated_at,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<i64>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct StockUpdate {
    pub stock: Option<i64>,
}

#[derive(Clone)]
pub struct ProductService {
    products: Collection<ProductRecord>,
}

impl ProductService {
    pub fn new(store: SharedStore) -> Self {
        ProductService {
            products: Collection::new(store, COLLECTION),
        }
    }

    pub async fn list(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.products.list().await?.into_iter().map(Product::from).collect())
    }

    /// Products with stock left.
    pub async fn available(&self) -> Result<Vec<Product>, AppError> {
        Ok(self
            .products
            .list()
            .await?
            .into_iter()
            .filter(|row| row.data.stock > 0)
            .map(Product::from)
            .collect())
    }

    pub async fn get(&self, id: i64) -> Result<Product, AppError> {
        Ok(self.products.require(id).await?.into())
    }

    pub async fn create(&self, input: NewProduct) -> Result<Product, AppError> {
        let name = match input.name.map(|n| n.trim().to_string()) {
            Some(n) if !n.is_empty() => n,
            _ => return Err(AppError::Validation("name is required".into())),
        };
        let price_cents = valid_price(input.price_cents.ok_or_else(|| {
            AppError::Validation("priceCents is required".into())
        })?)?;
        let stock = valid_stock(input.stock.unwrap_or(0))?;
        let now = Utc::now();
        let row = self
            .products
            .insert(ProductRecord {
                name,
                description: non_empty(input.description),
                price_cents,
                stock,
                created_at: now,
                updated_at: now,
            })
            .await?;
        tracing::info!(product_id = row.id, "product registered");
        Ok(row.into())
    }

    pub async fn update(&self, id: i64, input: UpdateProduct) -> Result<Product, AppError> {
        let mut record = self.products.require(id).await?.data;
        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::Validation("name is required".into()));
            }
            record.name = name;
        }
        if input.description.is_some() {
            record.description = non_empty(input.description);
        }
        if let Some(price) = input.price_cents {
            record.price_cents = valid_price(price)?;
        }
        if let Some(stock) = input.stock {
            record.stock = valid_stock(stock)?;
        }
        self.save(id, record).await
    }

    pub async fn set_stock(&self, id: i64, update: StockUpdate) -> Result<Product, AppError> {
        let stock = valid_stock(update.stock.ok_or_else(|| AppError::Validation("stock is required".into()))?)?;
        let mut record = self.products.require(id).await?.data;
        record.stock = stock;
        self.save(id, record).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if self.products.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("{} {}", COLLECTION, id)))
        }
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        self.products.count().await
    }

    async fn save(&self, id: i64, mut record: ProductRecord) -> Result<Product, AppError> {
        record.updated_at = Utc::now();
        self.products
            .update(id, record)
            .await?
            .map(Product::from)
            .ok_or_else(|| AppError::NotFound(format!("{} {}", COLLECTION, id)))
    }
}

fn valid_price(price_cents: i64) -> Result<i64, AppError> {
    if price_cents > 0 {
        Ok(price_cents)
    } else {
        Err(AppError::Validation("priceCents must be greater than zero".into()))
    }
}

fn valid_stock(stock: i64) -> Result<i64, AppError> {
    if stock >= 0 {
        Ok(stock)
    } else {
        Err(AppError::Validation("stock must not be negative".into()))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
