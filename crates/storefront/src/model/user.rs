//! User profiles, notification preferences and the caller identity used for authorization.
//!
//! # Actor Framework
//! [`User`] is managed by a [`ResourceActor`](resource_actor::ResourceActor); see
//! [`crate::user_actor`].

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u32);

impl From<u32> for UserId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Operator,
    Admin,
}

/// Per-user notification switches. Missing fields take the storefront defaults: email and
/// order updates on, everything else off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    #[serde(default = "enabled")]
    pub email_notifications: bool,
    #[serde(default)]
    pub sms_notifications: bool,
    #[serde(default)]
    pub whatsapp_notifications: bool,
    #[serde(default = "enabled")]
    pub order_updates: bool,
    #[serde(default)]
    pub promotions: bool,
    #[serde(default)]
    pub newsletter: bool,
}

fn enabled() -> bool {
    true
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email_notifications: true,
            sms_notifications: false,
            whatsapp_notifications: false,
            order_updates: true,
            promotions: false,
            newsletter: false,
        }
    }
}

impl NotificationPreferences {
    /// Every channel switched off.
    pub fn silent() -> Self {
        Self {
            email_notifications: false,
            sms_notifications: false,
            whatsapp_notifications: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub preferences: NotificationPreferences,
}

impl User {
    pub fn contact_info(&self) -> ContactInfo {
        ContactInfo {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }

    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.id,
            role: self.role,
        }
    }
}

/// Where a user can be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInfo {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UserCreate {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub preferences: NotificationPreferences,
}

impl UserCreate {
    /// A customer with an email address and default preferences.
    pub fn customer(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: Some(email.into()),
            phone: None,
            role: Role::Customer,
            preferences: NotificationPreferences::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub preferences: Option<NotificationPreferences>,
}

/// The authenticated caller of an order operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn customer(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Customer,
        }
    }

    pub fn operator(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Operator,
        }
    }

    /// Operators and admins may drive fulfilment transitions.
    pub fn is_operator(&self) -> bool {
        matches!(self.role, Role::Operator | Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_preference_fields_take_defaults() {
        let prefs: NotificationPreferences =
            serde_json::from_str(r#"{"smsNotifications": true}"#).unwrap();
        assert!(prefs.email_notifications);
        assert!(prefs.sms_notifications);
        assert!(!prefs.whatsapp_notifications);
        assert!(prefs.order_updates);
        assert!(!prefs.promotions);
        assert!(!prefs.newsletter);
    }

    #[test]
    fn admins_count_as_operators() {
        let admin = Principal {
            user_id: UserId(1),
            role: Role::Admin,
        };
        assert!(admin.is_operator());
        assert!(!Principal::customer(UserId(2)).is_operator());
    }
}
