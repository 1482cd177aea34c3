//! # Product Client
//!
//! High-level API for the `Product` actor. Also the storefront's [`ProductCatalog`].

use crate::model::{Product, ProductCreate, ProductId, ProductQuote, ProductUpdate};
use crate::pricing::ProductCatalog;
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};
use async_trait::async_trait;
use resource_actor::{ActorClient, FrameworkError, ResourceClient};
use tracing::{debug, instrument};

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<ProductId, ProductError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    /// Change price, stock or sample sizes. Existing orders are unaffected.
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<Product> for ProductClient {
    type Error = ProductError;

    fn inner(&self) -> &ResourceClient<Product> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.downcast_entity::<ProductError>()
            .unwrap_or_else(|other| ProductError::ActorCommunicationError(other.to_string()))
    }
}

#[async_trait]
impl ProductCatalog for ProductClient {
    #[instrument(skip(self))]
    async fn price_and_availability(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductQuote>, ProductError> {
        match self.inner.perform_action(product_id, ProductAction::Quote).await {
            Ok(ProductActionResult::Quote(quote)) => Ok(Some(quote)),
            Err(FrameworkError::NotFound(_)) => Ok(None),
            Err(e) => Err(Self::map_error(e)),
        }
    }
}
