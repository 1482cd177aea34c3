//! # User Actor
//!
//! Owns user profiles: contact details, role and notification preferences. The notification
//! pipeline only ever reads from it, through [`UserDirectory`](crate::clients::UserDirectory).
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](resource_actor::ActorEntity) implementation for [`User`]
//! - [`error`] - [`UserError`]
//!
//! ## Usage
//!
//! ```rust
//! use storefront::clients::{UserClient, UserDirectory};
//! use storefront::model::{NotificationPreferences, UserCreate, UserUpdate};
//! use storefront::user_actor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, generic_client) = user_actor::new();
//!     let client = UserClient::new(generic_client);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client
//!         .create_user(UserCreate::customer("Meera", "meera@example.com"))
//!         .await?;
//!
//!     let opt_in = NotificationPreferences {
//!         sms_notifications: true,
//!         ..NotificationPreferences::default()
//!     };
//!     client
//!         .update_user(id, UserUpdate { preferences: Some(opt_in), ..Default::default() })
//!         .await?;
//!
//!     assert!(client.preferences(id).await?.sms_notifications);
//!     Ok(())
//! }
//! ```

pub mod entity;
pub mod error;

pub use entity::UserAction;
pub use error::*;

use crate::model::User;
use resource_actor::{ResourceActor, ResourceClient};

/// Creates a new User actor and its client.
pub fn new() -> (ResourceActor<User>, ResourceClient<User>) {
    ResourceActor::new(32)
}
