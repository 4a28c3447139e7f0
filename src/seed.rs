//! Sample data for demos, inserted through the plugin services so their rules apply.

use crate::error::AppError;
use crate::plugins::products::{NewProduct, ProductService};
use crate::plugins::users::{NewUser, UserService};
use crate::store::SharedStore;

const USERS: &[(&str, &str)] = &[
    ("João Silva", "joao@email.com"),
    ("Maria Santos", "maria@email.com"),
    ("Pedro Costa", "pedro@email.com"),
    ("Ana Oliveira", "ana@email.com"),
    ("Carlos Ferreira", "carlos@email.com"),
];

const PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("Notebook Dell Inspiron", "15 inch, Intel i5, 8GB RAM", 299_999, 10),
    ("Logitech Wireless Mouse", "M185, 1000 DPI", 8_990, 50),
    ("RGB Mechanical Keyboard", "Blue switches", 29_999, 15),
    ("24\" LED Monitor", "Full HD", 59_999, 8),
    ("Gaming Headset", "Microphone and RGB", 19_999, 20),
    ("HD Webcam", "1080p with built-in microphone", 15_999, 12),
    ("SSD 500GB", "SATA, notebook or desktop", 39_999, 25),
    ("RAM 8GB", "DDR4 2666MHz", 24_999, 30),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub products: usize,
}

/// Insert sample users and products unless users already exist.
pub async fn seed_sample_data(store: SharedStore) -> Result<SeedReport, AppError> {
    let users = UserService::new(store.clone());
    let products = ProductService::new(store);
    if users.count().await? > 0 {
        tracing::info!("store already has users; skipping sample data");
        return Ok(SeedReport::default());
    }
    let mut report = SeedReport::default();
    for (name, email) in USERS {
        users
            .create(NewUser {
                name: Some((*name).into()),
                email: Some((*email).into()),
            })
            .await?;
        report.users += 1;
    }
    if products.count().await? == 0 {
        for (name, description, price_cents, stock) in PRODUCTS {
            products
                .create(NewProduct {
                    name: Some((*name).into()),
                    description: Some((*description).into()),
                    price_cents: Some(*price_cents),
                    stock: Some(*stock),
                })
                .await?;
            report.products += 1;
        }
    }
    tracing::info!(users = report.users, products = report.products, "sample data inserted");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn seeds_once() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let first = seed_sample_data(store.clone()).await.unwrap();
        assert_eq!(first, SeedReport { users: 5, products: 8 });
        let second = seed_sample_data(store).await.unwrap();
        assert_eq!(second, SeedReport::default());
    }
}
