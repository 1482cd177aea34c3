//! # Order Client
//!
//! High-level API for the `Order` actor. Entity errors raised inside the actor come back as
//! the original [`OrderError`].

use crate::model::{Order, OrderCreate, OrderId, OrderStatus, Principal};
use crate::order_actor::{OrderAction, OrderError, TransitionOutcome};
use async_trait::async_trait;
use resource_actor::{ActorClient, FrameworkError, ResourceClient};
use tracing::{debug, instrument};

/// Client for interacting with the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    /// Stores a new `pending` order. The actor checks the owning user exists first.
    #[instrument(skip_all, fields(user_id = %params.user_id))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<OrderId, OrderError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        id: OrderId,
        to: OrderStatus,
        by: Principal,
        tracking_number: Option<String>,
    ) -> Result<TransitionOutcome, OrderError> {
        debug!("Sending request");
        self.inner
            .perform_action(
                id,
                OrderAction::Transition {
                    to,
                    by,
                    tracking_number,
                },
            )
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, id: OrderId, by: Principal) -> Result<TransitionOutcome, OrderError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, OrderAction::Cancel { by })
            .await
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            other => other
                .downcast_entity::<OrderError>()
                .unwrap_or_else(|e| OrderError::Repository(e.to_string())),
        }
    }
}
