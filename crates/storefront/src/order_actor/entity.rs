//! [`ActorEntity`] implementation for [`Order`].
//!
//! Creation checks that the owning user exists (through the injected [`UserClient`]).
//! Status actions run inside the actor loop, so the read-compare-set of a transition cannot
//! interleave with another request for the same order.

use super::actions::{OrderAction, TransitionOutcome};
use super::error::OrderError;
use crate::clients::UserClient;
use crate::model::{Order, OrderCreate, OrderId, OrderStatus, OrderUpdate, Principal};
use crate::user_actor::UserError;
use async_trait::async_trait;
use chrono::Utc;
use resource_actor::{ActorClient, ActorEntity};
use tracing::debug;

impl Order {
    fn cancel(&mut self, by: Principal) -> Result<TransitionOutcome, OrderError> {
        if by.user_id != self.user_id && !by.is_operator() {
            return Err(OrderError::Forbidden(format!(
                "{} does not own {}",
                by.user_id, self.id
            )));
        }
        match self.status {
            OrderStatus::Cancelled => Ok(TransitionOutcome::Unchanged(self.clone())),
            OrderStatus::Pending => self.apply(OrderStatus::Cancelled, None),
            from => Err(OrderError::InvalidTransition {
                from,
                to: OrderStatus::Cancelled,
            }),
        }
    }

    fn apply(
        &mut self,
        to: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<TransitionOutcome, OrderError> {
        let from = self.status;
        if from == to {
            debug!(order_id = %self.id, status = %to, "Already in requested status");
            return Ok(TransitionOutcome::Unchanged(self.clone()));
        }
        if !from.can_transition_to(to) {
            return Err(OrderError::InvalidTransition { from, to });
        }

        self.status = to;
        self.updated_at = Utc::now();
        if to == OrderStatus::Shipped && tracking_number.is_some() {
            self.tracking_number = tracking_number;
        }
        Ok(TransitionOutcome::Transitioned {
            order: self.clone(),
            from,
        })
    }
}

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = OrderUpdate;
    type Action = OrderAction;
    type ActionResult = TransitionOutcome;
    type Context = UserClient;
    type Error = OrderError;

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, Self::Error> {
        let summary = &params.summary;
        if summary.lines.is_empty() && summary.samples.is_empty() {
            return Err(OrderError::Validation("order has no items".into()));
        }
        if !summary.is_balanced() {
            return Err(OrderError::Validation(format!(
                "total {} does not match its components",
                summary.total
            )));
        }
        Ok(Order::from_summary(id, params))
    }

    /// The owning user must exist.
    async fn on_create(&mut self, users: &UserClient) -> Result<(), Self::Error> {
        match users.require(self.user_id).await {
            Ok(_) => Ok(()),
            Err(UserError::NotFound(id)) => Err(OrderError::UnknownUser(id)),
            Err(e) => Err(OrderError::Repository(e.to_string())),
        }
    }

    async fn on_update(&mut self, update: OrderUpdate, _ctx: &UserClient) -> Result<(), Self::Error> {
        match update {}
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        _ctx: &UserClient,
    ) -> Result<TransitionOutcome, Self::Error> {
        match action {
            OrderAction::Transition {
                to,
                by,
                tracking_number,
            } => {
                if by.is_operator() {
                    self.apply(to, tracking_number)
                } else if to == OrderStatus::Cancelled {
                    self.cancel(by)
                } else {
                    Err(OrderError::Forbidden(format!(
                        "{} may not move {} to {}",
                        by.user_id, self.id, to
                    )))
                }
            }
            OrderAction::Cancel { by } => self.cancel(by),
        }
    }
}
