//! # User Client
//!
//! High-level API for the `User` actor, and the [`UserDirectory`] the notification pipeline
//! reads preferences and contact details from.

use crate::model::{ContactInfo, NotificationPreferences, User, UserCreate, UserId, UserUpdate};
use crate::user_actor::UserError;
use async_trait::async_trait;
use resource_actor::{ActorClient, FrameworkError, ResourceClient};
use tracing::{debug, instrument};

/// Read-only view of user profiles.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn preferences(&self, user_id: UserId) -> Result<NotificationPreferences, UserError>;
    async fn contact_info(&self, user_id: UserId) -> Result<ContactInfo, UserError>;
}

/// Client for interacting with the User actor.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl UserClient {
    pub fn new(inner: ResourceClient<User>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn create_user(&self, params: UserCreate) -> Result<UserId, UserError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<User> for UserClient {
    type Error = UserError;

    fn inner(&self) -> &ResourceClient<User> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => UserError::NotFound(id),
            other => other
                .downcast_entity::<UserError>()
                .unwrap_or_else(|e| UserError::ActorCommunicationError(e.to_string())),
        }
    }
}

#[async_trait]
impl UserDirectory for UserClient {
    async fn preferences(&self, user_id: UserId) -> Result<NotificationPreferences, UserError> {
        Ok(self.require(user_id).await?.preferences)
    }

    async fn contact_info(&self, user_id: UserId) -> Result<ContactInfo, UserError> {
        Ok(self.require(user_id).await?.contact_info())
    }
}
