//! Error types for the Order actor.

use crate::model::OrderStatus;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderError {
    /// The order payload is inconsistent (empty, or totals that do not add up).
    #[error("Invalid order: {0}")]
    Validation(String),

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    /// The order store could not be reached. Fatal for the write in progress.
    #[error("Order repository error: {0}")]
    Repository(String),
}
