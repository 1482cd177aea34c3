//! # ActorClient Trait
//!
//! Shared read operations for the resource-specific client wrappers. A wrapper only has to
//! expose its inner [`ResourceClient`] and say how framework errors map onto its own error
//! enum; `get` and `require` come for free.

use crate::{ActorEntity, FrameworkError, ResourceClient};
use async_trait::async_trait;

/// Trait for resource-specific clients to inherit standard read operations.
///
/// # Example
///
/// ```rust
/// use resource_actor::{ActorClient, ActorEntity, FrameworkError, ResourceClient};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)]
/// struct Coupon { code: String }
/// #[derive(Debug)] struct CouponCreate { code: String }
/// #[derive(Debug)] struct CouponUpdate;
/// #[derive(Debug)] enum CouponAction {}
/// #[derive(Debug, thiserror::Error)]
/// #[error("coupon error: {0}")]
/// struct CouponError(String);
///
/// #[async_trait]
/// impl ActorEntity for Coupon {
///     type Id = u32;
///     type Create = CouponCreate;
///     type Update = CouponUpdate;
///     type Action = CouponAction;
///     type ActionResult = ();
///     type Context = ();
///     type Error = CouponError;
///
///     fn from_create_params(_id: u32, p: CouponCreate) -> Result<Self, Self::Error> {
///         Ok(Self { code: p.code })
///     }
///     async fn on_update(&mut self, _: CouponUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, _: CouponAction, _: &()) -> Result<(), Self::Error> { Ok(()) }
/// }
///
/// struct CouponClient { inner: ResourceClient<Coupon> }
///
/// #[async_trait]
/// impl ActorClient<Coupon> for CouponClient {
///     type Error = CouponError;
///     fn inner(&self) -> &ResourceClient<Coupon> { &self.inner }
///     fn map_error(e: FrameworkError) -> CouponError { CouponError(e.to_string()) }
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the resource error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch an entity by id; `None` when it does not exist.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Fetch an entity by id, treating absence as [`FrameworkError::NotFound`].
    #[tracing::instrument(skip(self))]
    async fn require(&self, id: T::Id) -> Result<T, Self::Error> {
        match self.inner().get(id.clone()).await.map_err(Self::map_error)? {
            Some(entity) => Ok(entity),
            None => Err(Self::map_error(FrameworkError::NotFound(id.to_string()))),
        }
    }
}
