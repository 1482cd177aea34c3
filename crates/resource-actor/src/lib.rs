//! # Resource Actor
//!
//! Building blocks for type-safe, concurrent resource services: every resource type (orders,
//! products, user profiles) is owned by one actor task and reached only through a cloneable
//! client.
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ActorEntity`]) - domain model and its hooks
//! 2. **Runtime Layer** ([`ResourceActor`]) - sequential message processing
//! 3. **Interface Layer** ([`ResourceClient`], [`ActorClient`]) - typed requests and errors
//!
//! Alongside the actors the crate carries the plumbing the services built on it share:
//!
//! - [`retry`] - attempt counting with fixed or exponential backoff
//! - [`worker`] - a bounded single-consumer job queue with explicit backpressure
//! - [`telemetry`] - `tracing` subscriber setup
//! - [`mock`] - scripted fake actors for tests
//!
//! ## Example
//!
//! ```rust
//! use resource_actor::{ActorEntity, ResourceActor};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)]
//! struct Batch { id: u32, bottles: u32 }
//!
//! #[derive(Debug)] struct BatchCreate { bottles: u32 }
//! #[derive(Debug)] struct BatchUpdate { bottles: u32 }
//! #[derive(Debug)] enum BatchAction { Fill(u32) }
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("batch is full")]
//! struct BatchFull;
//!
//! #[async_trait]
//! impl ActorEntity for Batch {
//!     type Id = u32;
//!     type Create = BatchCreate;
//!     type Update = BatchUpdate;
//!     type Action = BatchAction;
//!     type ActionResult = u32;
//!     type Context = ();
//!     type Error = BatchFull;
//!
//!     fn from_create_params(id: u32, params: BatchCreate) -> Result<Self, BatchFull> {
//!         Ok(Self { id, bottles: params.bottles })
//!     }
//!
//!     async fn on_update(&mut self, update: BatchUpdate, _: &()) -> Result<(), BatchFull> {
//!         self.bottles = update.bottles;
//!         Ok(())
//!     }
//!
//!     async fn handle_action(&mut self, action: BatchAction, _: &()) -> Result<u32, BatchFull> {
//!         let BatchAction::Fill(n) = action;
//!         if self.bottles + n > 100 {
//!             return Err(BatchFull);
//!         }
//!         self.bottles += n;
//!         Ok(self.bottles)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ResourceActor::<Batch>::new(10);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client.create(BatchCreate { bottles: 90 }).await.unwrap();
//!     assert_eq!(client.perform_action(id, BatchAction::Fill(5)).await.unwrap(), 95);
//!
//!     // A failed action leaves the stored entity as it was.
//!     assert!(client.perform_action(id, BatchAction::Fill(50)).await.is_err());
//!     assert_eq!(client.get(id).await.unwrap().unwrap().bottles, 95);
//! }
//! ```
//!
//! ## Context Injection
//!
//! Dependencies are handed to [`ResourceActor::run`] rather than to the constructor, so all
//! actors can be created first and wired afterwards. An order actor, for instance, runs with
//! the user directory client as its context and checks the customer exists in `on_create`.
//!
//! ## Concurrency Model
//!
//! - Each actor runs in its own Tokio task.
//! - Requests to one actor are processed strictly one after another.
//! - Separate actors run in parallel and share nothing but channels.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod retry;
pub mod telemetry;
pub mod worker;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
