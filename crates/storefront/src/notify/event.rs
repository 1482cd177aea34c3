use crate::model::OrderStatus;
use serde::Serialize;

/// Order lifecycle events that produce customer notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Created,
    StatusChanged { from: OrderStatus, to: OrderStatus },
    DeliveryFailed { reason: String },
}

impl OrderEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            OrderEvent::Created => "created",
            OrderEvent::StatusChanged { .. } => "status-changed",
            OrderEvent::DeliveryFailed { .. } => "delivery-failed",
        }
    }

    /// Status updates honour the recipient's `order_updates` switch.
    pub fn is_status_update(&self) -> bool {
        matches!(self, OrderEvent::StatusChanged { .. })
    }
}
