//! # ActorEntity Trait
//!
//! The contract every resource (orders, products, user profiles) implements to be owned by a
//! [`ResourceActor`](crate::ResourceActor). Associated types pin down the id, the creation and
//! update payloads, the resource-specific actions and the error type, so a client for one
//! resource cannot send another resource's payloads.
//!
//! Hooks run inside the actor's sequential loop. Whatever a hook reads and then writes on
//! `self` happens without any other request for the same actor interleaving, which is what
//! makes check-then-mutate logic (such as order status transitions) safe without locks.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by a `ResourceActor`.
///
/// # Async & Context
/// Hooks are `async` so they can call other actors. The `Context` associated type is injected
/// into every hook by [`ResourceActor::run`](crate::ResourceActor::run), which lets an actor
/// depend on clients that were created after the actor itself ("late binding").
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// Identifier. Generated by the actor from a monotonically increasing `u32`.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// Payload used to create a new instance.
    type Create: Send + Sync + Debug;

    /// Payload used to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Resource-specific operations that do not fit create/read/update.
    type Action: Send + Sync + Debug;

    /// Result returned by [`ActorEntity::handle_action`].
    type ActionResult: Send + Sync + Debug;

    /// Runtime dependencies injected into every hook. Use `()` when there are none.
    type Context: Send + Sync;

    /// One error enum per resource. It travels back to callers boxed inside
    /// [`FrameworkError::EntityError`](crate::FrameworkError::EntityError) and typed clients
    /// downcast it again.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build the entity from its freshly generated id and the creation payload.
    /// Called synchronously before [`ActorEntity::on_create`].
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Called after construction and before the entity is stored. Returning an error
    /// discards the entity.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Apply an update payload in place.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Handle a resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
