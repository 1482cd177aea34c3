//! Custom actions for the Order actor.
//!
//! Status changes are actions rather than updates: the actor re-reads the current status,
//! checks the transition table and the caller's rights, and applies the change in one step.

use crate::model::{Order, OrderStatus, Principal};

#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Move to `to`. Operators follow the transition table; customers may only cancel their
    /// own pending order.
    Transition {
        to: OrderStatus,
        by: Principal,
        tracking_number: Option<String>,
    },
    /// Cancel a pending order. Allowed for the owner and for operators.
    Cancel { by: Principal },
}

/// What a status action did.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    Transitioned { order: Order, from: OrderStatus },
    /// The order was already in the requested status.
    Unchanged(Order),
}

impl TransitionOutcome {
    pub fn order(&self) -> &Order {
        match self {
            TransitionOutcome::Transitioned { order, .. } => order,
            TransitionOutcome::Unchanged(order) => order,
        }
    }

    pub fn into_order(self) -> Order {
        match self {
            TransitionOutcome::Transitioned { order, .. } => order,
            TransitionOutcome::Unchanged(order) => order,
        }
    }

    /// `(from, to)` when the status actually changed.
    pub fn change(&self) -> Option<(OrderStatus, OrderStatus)> {
        match self {
            TransitionOutcome::Transitioned { order, from } => Some((*from, order.status)),
            TransitionOutcome::Unchanged(_) => None,
        }
    }
}
