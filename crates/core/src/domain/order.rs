use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::menu::MenuItemId;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "preparing" => Some(Self::Preparing),
            "ready" => Some(Self::Ready),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether this status counts as a realized purchase for analytics.
    pub fn is_realized(&self) -> bool {
        matches!(self, Self::Ready | Self::Completed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: MenuItemId,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Distinct items purchased together in this order. Quantities and
    /// duplicate lines for the same item collapse to one basket member.
    pub fn basket(&self) -> BTreeSet<MenuItemId> {
        self.lines.iter().map(|line| line.item_id).collect()
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (&self.status, next),
            (OrderStatus::Pending, OrderStatus::Confirmed)
                | (OrderStatus::Confirmed, OrderStatus::Preparing)
                | (OrderStatus::Preparing, OrderStatus::Ready)
                | (OrderStatus::Ready, OrderStatus::Completed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Confirmed, OrderStatus::Cancelled)
                | (OrderStatus::Preparing, OrderStatus::Cancelled)
        )
    }

    pub fn transition_to(&mut self, next: OrderStatus) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            self.status = next;
            return Ok(());
        }

        Err(DomainError::InvalidOrderTransition { from: self.status, to: next })
    }
}
