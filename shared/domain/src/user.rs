//! User accounts, profiles, and subscription state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::notification::Notification;
use crate::plan::SubscriptionPeriod;
use crate::{Cents, UserId};

/// An active (or lapsed) subscription attached to an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub period: SubscriptionPeriod,
    pub expires_at: DateTime<Utc>,
}

/// A platform account. The admin account doubles as the creator identity
/// that fans message, tip, and subscribe to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Argon2 hash of the account password.
    pub password_hash: String,
    pub is_admin: bool,
    pub is_verified: bool,
    pub balance: Cents,
    pub avatar: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub subscription: Option<Subscription>,
    /// Inbox, append-ordered. Accessors sort newest first.
    pub notifications: Vec<Notification>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, email: String, password_hash: String, balance: Cents) -> Self {
        Self {
            id: UserId::new(),
            username,
            email,
            password_hash,
            is_admin: false,
            is_verified: false,
            balance,
            avatar: None,
            name: None,
            bio: None,
            subscription: None,
            notifications: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Subscribed means a subscription exists and has not expired.
    pub fn has_active_subscription(&self, now: DateTime<Utc>) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|s| s.expires_at > now)
    }
}
