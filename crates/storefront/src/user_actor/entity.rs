//! [`ActorEntity`] implementation for [`User`].

use super::error::UserError;
use crate::model::{User, UserCreate, UserId, UserUpdate};
use async_trait::async_trait;
use resource_actor::ActorEntity;

/// Users have no operations beyond create/read/update.
#[derive(Debug, Clone)]
pub enum UserAction {}

fn check_email(email: &str) -> Result<(), UserError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if valid {
        Ok(())
    } else {
        Err(UserError::InvalidEmail(email.to_string()))
    }
}

#[async_trait]
impl ActorEntity for User {
    type Id = UserId;
    type Create = UserCreate;
    type Update = UserUpdate;
    type Action = UserAction;
    type ActionResult = ();
    type Context = ();
    type Error = UserError;

    fn from_create_params(id: UserId, params: UserCreate) -> Result<Self, Self::Error> {
        if params.name.trim().is_empty() {
            return Err(UserError::EmptyName);
        }
        if let Some(email) = &params.email {
            check_email(email)?;
        }
        Ok(Self {
            id,
            name: params.name,
            email: params.email,
            phone: params.phone,
            role: params.role,
            preferences: params.preferences,
        })
    }

    async fn on_update(&mut self, update: UserUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(UserError::EmptyName);
            }
            self.name = name;
        }
        if let Some(email) = update.email {
            check_email(&email)?;
            self.email = Some(email);
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(preferences) = update.preferences {
            self.preferences = preferences;
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: UserAction, _ctx: &()) -> Result<(), Self::Error> {
        match action {}
    }
}
