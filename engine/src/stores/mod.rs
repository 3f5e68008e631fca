//! Entity stores and the narrow seams they expose to one another.
//!
//! Each store owns one persisted collection behind a mutex. Stores never
//! reach into each other's collections; cross-store needs flow through
//! the small traits below, all of which the account store implements.

pub mod account;
pub mod messages;
pub mod payments;
pub mod plans;
pub mod posts;
pub mod wallet;

use std::sync::{Mutex, MutexGuard, PoisonError};

use creatorhub_domain::notification::NotificationEvent;
use creatorhub_domain::{Cents, UserId};

use crate::storage::StorageError;

/// Append a notification to a user's inbox. Fire and forget: a failed
/// delivery is logged by the implementor and never surfaced here.
pub trait Notify: Send + Sync {
    fn notify(&self, target: UserId, title: &str, message: &str, event: NotificationEvent);
}

/// Read-only profile facts other stores need for gating and copy.
pub trait Profiles: Send + Sync {
    fn admin_id(&self) -> Option<UserId>;
    fn username_of(&self, user: UserId) -> Option<String>;
    fn avatar_of(&self, user: UserId) -> Option<String>;
    fn is_admin(&self, user: UserId) -> bool;
    fn has_active_subscription(&self, user: UserId) -> bool;
}

/// Balance reads and atomic signed adjustments, owned by the account
/// store so the check and the write happen under one lock.
pub trait BalanceAccess: Send + Sync {
    fn balance_of(&self, user: UserId) -> Option<Cents>;

    /// Apply a signed delta and return the new balance. A debit that
    /// would take the balance below zero is refused without mutating.
    fn adjust_balance(&self, user: UserId, delta: Cents) -> Result<Cents, BalanceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    #[error("unknown user")]
    UnknownUser,
    #[error("insufficient balance: have {available}, need {required}")]
    Insufficient { available: Cents, required: Cents },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Lock a mutex, recovering the guard if a previous holder panicked.
/// The guarded collections are plain data and stay coherent.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
