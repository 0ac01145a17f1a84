use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::Row;

use platewise_core::domain::menu::MenuItemId;
use platewise_core::domain::order::{Order, OrderId, OrderLine, OrderStatus};
use platewise_core::recommendations::sources::{OrderHistory, SourceError};

use super::menu::{parse_u64, parse_uuid};
use super::RepositoryError;
use crate::DbPool;

/// Sqlite-backed order history restricted to realized purchases.
pub struct SqlOrderHistory {
    pool: DbPool,
}

impl SqlOrderHistory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn realized_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let order_rows = sqlx::query(
            "SELECT id, status, created_at
             FROM orders
             WHERE status IN ('ready', 'completed')
             ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let line_rows = sqlx::query(
            "SELECT oi.order_id, oi.menu_item_id, oi.quantity
             FROM order_items oi
             JOIN orders o ON o.id = oi.order_id
             WHERE o.status IN ('ready', 'completed')
             ORDER BY oi.id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut lines_by_order: HashMap<OrderId, Vec<OrderLine>> = HashMap::new();
        for row in line_rows {
            let order_id = OrderId(parse_uuid("order_id", &row.try_get::<String, _>("order_id")?)?);
            let item_id =
                MenuItemId(parse_uuid("menu_item_id", &row.try_get::<String, _>("menu_item_id")?)?);
            let quantity = parse_u64("quantity", row.try_get("quantity")?)?;

            lines_by_order.entry(order_id).or_default().push(OrderLine {
                item_id,
                quantity: u32::try_from(quantity).unwrap_or(u32::MAX),
            });
        }

        let mut orders = Vec::with_capacity(order_rows.len());
        for row in order_rows {
            let id = OrderId(parse_uuid("id", &row.try_get::<String, _>("id")?)?);

            let status_raw = row.try_get::<String, _>("status")?;
            let status = OrderStatus::parse(&status_raw).ok_or_else(|| {
                RepositoryError::Decode(format!("unknown order status `{status_raw}`"))
            })?;

            orders.push(Order {
                id,
                status,
                lines: lines_by_order.remove(&id).unwrap_or_default(),
                created_at: parse_timestamp("created_at", &row.try_get::<String, _>("created_at")?)?,
            });
        }

        Ok(orders)
    }
}

#[async_trait::async_trait]
impl OrderHistory for SqlOrderHistory {
    async fn realized_orders(&self) -> Result<Vec<Order>, SourceError> {
        SqlOrderHistory::realized_orders(self)
            .await
            .map_err(|error| SourceError::OrderHistoryUnavailable(error.to_string()))
    }
}

fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| {
            RepositoryError::Decode(format!("invalid timestamp in `{column}`: {error}"))
        })
}
