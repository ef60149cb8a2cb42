//! Common closed enums used across the platform
//!
//! Warehouse sites and lifecycle statuses are fixed by the domain. They are
//! parsed once at the boundary (JSON deserialization or database row
//! conversion) and never re-cast from free-form strings internally.

use serde::{Deserialize, Serialize};

/// The three distribution warehouses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Warehouse {
    Paris,
    Lyon,
    Bordeaux,
}

impl Warehouse {
    pub fn as_str(&self) -> &'static str {
        match self {
            Warehouse::Paris => "paris",
            Warehouse::Lyon => "lyon",
            Warehouse::Bordeaux => "bordeaux",
        }
    }

    pub const ALL: [Warehouse; 3] = [Warehouse::Paris, Warehouse::Lyon, Warehouse::Bordeaux];
}

impl std::str::FromStr for Warehouse {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paris" => Ok(Warehouse::Paris),
            "lyon" => Ok(Warehouse::Lyon),
            "bordeaux" => Ok(Warehouse::Bordeaux),
            _ => Err("Unknown warehouse"),
        }
    }
}

impl std::fmt::Display for Warehouse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transfer request lifecycle
///
/// `pending -> in_preparation -> ready_to_ship -> shipped -> received`,
/// with `cancelled` reachable as a side branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    InPreparation,
    ReadyToShip,
    Shipped,
    Received,
    Cancelled,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::InPreparation => "in_preparation",
            TransferStatus::ReadyToShip => "ready_to_ship",
            TransferStatus::Shipped => "shipped",
            TransferStatus::Received => "received",
            TransferStatus::Cancelled => "cancelled",
        }
    }

    /// Reception confirmation is legal only from `shipped`.
    pub fn can_confirm_reception(&self) -> bool {
        matches!(self, TransferStatus::Shipped)
    }

    /// Transitions that attribute the preparer (`prepared_by`/`prepared_at`).
    pub fn records_preparation(&self) -> bool {
        matches!(self, TransferStatus::InPreparation | TransferStatus::ReadyToShip)
    }

    /// Statuses counted as "pending reception" at a destination warehouse.
    pub fn awaiting_reception(&self) -> bool {
        matches!(self, TransferStatus::Shipped | TransferStatus::ReadyToShip)
    }
}

impl std::str::FromStr for TransferStatus {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransferStatus::Pending),
            "in_preparation" => Ok(TransferStatus::InPreparation),
            "ready_to_ship" => Ok(TransferStatus::ReadyToShip),
            "shipped" => Ok(TransferStatus::Shipped),
            "received" => Ok(TransferStatus::Received),
            "cancelled" => Ok(TransferStatus::Cancelled),
            _ => Err("Unknown transfer status"),
        }
    }
}

/// Order lifecycle statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Submitted,
    Validated,
    InPreparation,
    Ready,
    Shipped,
    Delivered,
    Refused,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Submitted => "submitted",
            OrderStatus::Validated => "validated",
            OrderStatus::InPreparation => "in_preparation",
            OrderStatus::Ready => "ready",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Refused => "refused",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(OrderStatus::Submitted),
            "validated" => Ok(OrderStatus::Validated),
            "in_preparation" => Ok(OrderStatus::InPreparation),
            "ready" => Ok(OrderStatus::Ready),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "refused" => Ok(OrderStatus::Refused),
            _ => Err("Unknown order status"),
        }
    }
}
