//! Orders and their line items. Totals are recomputed from the items on every change.

use crate::error::AppError;
use crate::store::{Collection, Row, SharedStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use utoipa::ToSchema;

pub const ORDERS: &str = "orders";
pub const ORDER_ITEMS: &str = "order_items";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Cancelled => "CANCELLED",
        })
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "PAID" => Ok(OrderStatus::Paid),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(AppError::Validation(format!(
                "unknown status '{}' (expected PENDING, PAID or CANCELLED)",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub user_id: i64,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRecord {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

impl From<Row<OrderItemRecord>> for OrderItem {
    fn from(row: Row<OrderItemRecord>) -> Self {
        OrderItem {
            id: row.id,
            product_id: row.data.product_id,
            quantity: row.data.quantity,
            unit_price_cents: row.data.unit_price_cents,
            subtotal_cents: row.data.quantity.saturating_mul(row.data.unit_price_cents),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Row<OrderRecord>> for Order {
    fn from(row: Row<OrderRecord>) -> Self {
        Order {
            id: row.id,
            user_id: row.data.user_id,
            status: row.data.status,
            total_cents: row.data.total_cents,
            created_at: row.data.created_at,
            updated_at: row.data.updated_at,
        }
    }
}

/// An order together with its line items.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub product_id: Option<i64>,
    pub quantity: Option<i64>,
    pub unit_price_cents: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: Option<i64>,
    #[serde(default)]
    pub items: Vec<NewOrderItem>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct OrderService {
    orders: Collection<OrderRecord>,
    items: Collection<OrderItemRecord>,
    /// Serializes item changes with the total recomputation that follows them.
    write_lock: Arc<Mutex<()>>,
}

impl OrderService {
    pub fn new(store: SharedStore) -> Self {
        OrderService {
            orders: Collection::new(store.clone(), ORDERS),
            items: Collection::new(store, ORDER_ITEMS),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn list(&self) -> Result<Vec<Order>, AppError> {
        Ok(self.orders.list().await?.into_iter().map(Order::from).collect())
    }

    pub async fn by_user(&self, user_id: i64) -> Result<Vec<Order>, AppError> {
        Ok(self
            .orders
            .list()
            .await?
            .into_iter()
            .filter(|row| row.data.user_id == user_id)
            .map(Order::from)
            .collect())
    }

    pub async fn get(&self, id: i64) -> Result<OrderDetail, AppError> {
        let order = self.orders.require(id).await?.into();
        Ok(OrderDetail {
            order,
            items: self.items_of(id).await?,
        })
    }

    /// Creates a PENDING order with the given line items.
    pub async fn create(&self, input: NewOrder) -> Result<OrderDetail, AppError> {
        let user_id = match input.user_id {
            Some(id) if id > 0 => id,
            Some(_) => return Err(AppError::Validation("userId must be positive".into())),
            None => return Err(AppError::Validation("userId is required".into())),
        };
        let items = input
            .items
            .into_iter()
            .map(|item| valid_item(0, item))
            .collect::<Result<Vec<_>, _>>()?;
        let total_cents = total_of(items.iter())?;

        let _guard = self.write_lock.lock().await;
        let now = Utc::now();
        let order = self
            .orders
            .insert(OrderRecord {
                user_id,
                status: OrderStatus::Pending,
                total_cents,
                created_at: now,
                updated_at: now,
            })
            .await?;
        for mut item in items {
            item.order_id = order.id;
            self.items.insert(item).await?;
        }
        tracing::info!(order_id = order.id, user_id, total_cents, "order created");
        Ok(OrderDetail {
            items: self.items_of(order.id).await?,
            order: order.into(),
        })
    }

    /// Only PENDING orders accept new items.
    pub async fn add_item(&self, order_id: i64, item: NewOrderItem) -> Result<OrderDetail, AppError> {
        let item = valid_item(order_id, item)?;
        let _guard = self.write_lock.lock().await;
        let mut order = self.orders.require(order_id).await?.data;
        if order.status != OrderStatus::Pending {
            return Err(AppError::Validation(format!(
                "order {} is {} and cannot be changed",
                order_id, order.status
            )));
        }
        self.items.insert(item).await?;
        let items = self.item_rows(order_id).await?;
        order.total_cents = total_of(items.iter().map(|row| &row.data))?;
        order.updated_at = Utc::now();
        let order = self.save(order_id, order).await?;
        Ok(OrderDetail {
            order,
            items: items.into_iter().map(OrderItem::from).collect(),
        })
    }

    pub async fn set_status(&self, order_id: i64, update: StatusUpdate) -> Result<Order, AppError> {
        let status: OrderStatus = update
            .status
            .ok_or_else(|| AppError::Validation("status is required".into()))?
            .parse()?;
        self.transition(order_id, status).await
    }

    /// Marks the order PAID. A cancelled order cannot be finalized.
    pub async fn finalize(&self, order_id: i64) -> Result<Order, AppError> {
        self.transition(order_id, OrderStatus::Paid).await
    }

    pub async fn delete(&self, order_id: i64) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        if !self.orders.delete(order_id).await? {
            return Err(AppError::NotFound(format!("{} {}", ORDERS, order_id)));
        }
        for row in self.item_rows(order_id).await? {
            self.items.delete(row.id).await?;
        }
        Ok(())
    }

    async fn transition(&self, order_id: i64, status: OrderStatus) -> Result<Order, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut order = self.orders.require(order_id).await?.data;
        if order.status == OrderStatus::Cancelled && status == OrderStatus::Paid {
            return Err(AppError::Validation(format!(
                "order {} is cancelled and cannot be finalized",
                order_id
            )));
        }
        order.status = status;
        order.updated_at = Utc::now();
        let saved = self.save(order_id, order).await?;
        tracing::info!(order_id, status = %status, "order status changed");
        Ok(saved)
    }

    async fn save(&self, order_id: i64, order: OrderRecord) -> Result<Order, AppError> {
        self.orders
            .update(order_id, order)
            .await?
            .map(Order::from)
            .ok_or_else(|| AppError::NotFound(format!("{} {}", ORDERS, order_id)))
    }

    async fn item_rows(&self, order_id: i64) -> Result<Vec<Row<OrderItemRecord>>, AppError> {
        Ok(self
            .items
            .list()
            .await?
            .into_iter()
            .filter(|row| row.data.order_id == order_id)
            .collect())
    }

    async fn items_of(&self, order_id: i64) -> Result<Vec<OrderItem>, AppError> {
        Ok(self.item_rows(order_id).await?.into_iter().map(OrderItem::from).collect())
    }
}

fn valid_item(order_id: i64, item: NewOrderItem) -> Result<OrderItemRecord, AppError> {
    let product_id = item
        .product_id
        .ok_or_else(|| AppError::Validation("productId is required".into()))?;
    let quantity = match item.quantity {
        Some(q) if q > 0 => q,
        _ => return Err(AppError::Validation("quantity must be greater than zero".into())),
    };
    let unit_price_cents = match item.unit_price_cents {
        Some(p) if p > 0 => p,
        _ => return Err(AppError::Validation("unitPriceCents must be greater than zero".into())),
    };
    Ok(OrderItemRecord {
        order_id,
        product_id,
        quantity,
        unit_price_cents,
    })
}

fn total_of<'a>(mut items: impl Iterator<Item = &'a OrderItemRecord>) -> Result<i64, AppError> {
    items.try_fold(0i64, |acc, item| {
        item.quantity
            .checked_mul(item.unit_price_cents)
            .and_then(|subtotal| acc.checked_add(subtotal))
            .ok_or_else(|| AppError::Validation("order total is too large".into()))
    })
}
