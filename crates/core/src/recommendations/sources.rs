//! External data sources consumed by the recommendation subsystem.
//!
//! Total unavailability of a source is an infrastructure failure and
//! surfaces as an error; absence of data (no orders, no associations) is a
//! valid outcome and never errors.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::menu::{MenuItem, MenuItemId};
use crate::domain::order::Order;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("order history unavailable: {0}")]
    OrderHistoryUnavailable(String),
    #[error("item catalog unavailable: {0}")]
    CatalogUnavailable(String),
}

/// Read-only provider of completed transactions.
#[async_trait]
pub trait OrderHistory: Send + Sync {
    /// All orders whose status counts as a realized purchase.
    async fn realized_orders(&self) -> Result<Vec<Order>, SourceError>;
}

/// Read-only provider of menu item attributes.
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    /// Lookup restricted to active items; inactive or deleted items resolve
    /// to `None`.
    async fn find_active(&self, id: &MenuItemId) -> Result<Option<MenuItem>, SourceError>;

    /// Lookup regardless of the active flag.
    async fn find_by_id(&self, id: &MenuItemId) -> Result<Option<MenuItem>, SourceError>;

    async fn active_items(&self) -> Result<Vec<MenuItem>, SourceError>;
}

/// Vec-backed order history for tests and embedded use.
#[derive(Debug, Default)]
pub struct InMemoryOrderHistory {
    orders: Vec<Order>,
}

impl InMemoryOrderHistory {
    pub fn new(orders: Vec<Order>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl OrderHistory for InMemoryOrderHistory {
    async fn realized_orders(&self) -> Result<Vec<Order>, SourceError> {
        Ok(self.orders.iter().filter(|order| order.status.is_realized()).cloned().collect())
    }
}

/// Vec-backed item catalog for tests and embedded use.
#[derive(Debug, Default)]
pub struct InMemoryItemCatalog {
    items: Vec<MenuItem>,
}

impl InMemoryItemCatalog {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl ItemCatalog for InMemoryItemCatalog {
    async fn find_active(&self, id: &MenuItemId) -> Result<Option<MenuItem>, SourceError> {
        Ok(self.items.iter().find(|item| item.id == *id && item.active).cloned())
    }

    async fn find_by_id(&self, id: &MenuItemId) -> Result<Option<MenuItem>, SourceError> {
        Ok(self.items.iter().find(|item| item.id == *id).cloned())
    }

    async fn active_items(&self) -> Result<Vec<MenuItem>, SourceError> {
        Ok(self.items.iter().filter(|item| item.active).cloned().collect())
    }
}
