//! # Order Actor
//!
//! Owns placed orders and enforces the status lifecycle:
//!
//! ```text
//! pending ──> confirmed ──> processing ──> shipped ──> delivered
//!    │            │              │
//!    └────────────┴──────────────┴──> cancelled
//! ```
//!
//! - Operators and admins drive every transition in the table.
//! - The owning customer may only cancel, and only while the order is `pending`.
//! - Asking for the status the order already has is a no-op
//!   ([`TransitionOutcome::Unchanged`]).
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](resource_actor::ActorEntity) implementation for
//!   [`Order`](crate::model::Order); its context is the [`UserClient`](crate::clients::UserClient)
//! - [`error`] - [`OrderError`]
//! - [`actions`] - [`OrderAction`] and [`TransitionOutcome`]

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::Order;
use resource_actor::{ResourceActor, ResourceClient};

/// Creates a new Order actor and its client.
pub fn new() -> (ResourceActor<Order>, ResourceClient<Order>) {
    ResourceActor::new(64)
}
