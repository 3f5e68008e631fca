//! Mocked account layer: login and registration, the session pointer,
//! profiles, subscription state, and each user's notification inbox.
//!
//! There is no real identity provider behind this store. Logging in with
//! an unknown email mints a demo account on the spot, and registration
//! grants admin to any email containing "admin". Password hashes are
//! still real Argon2 so the verify path is honest.

use argon2::{
    password_hash::{PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use creatorhub_domain::notification::{Notification, NotificationEvent};
use creatorhub_domain::plan::SubscriptionPeriod;
use creatorhub_domain::user::{Subscription, User};
use creatorhub_domain::{Cents, NotificationId, UserId};

use crate::config::EngineConfig;
use crate::seed;
use crate::storage::{Storage, StorageError, KEY_SESSION, KEY_USERS};
use crate::stores::{lock, BalanceAccess, BalanceError, Notify, Profiles};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("unknown user")]
    UnknownUser,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, AccountError>;

/// Fields a user may change on their own profile. `None` leaves the
/// current value untouched.
#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

pub struct AccountStore {
    users: Mutex<Vec<User>>,
    session: Mutex<Option<UserId>>,
    storage: Storage,
    login_delay: Duration,
}

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AccountError::Hash(err.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub(crate) fn avatar_url(username: &str) -> String {
    format!("https://ui-avatars.com/api/?name={username}&background=random")
}

impl AccountStore {
    /// Load the user collection, seeding the demo accounts on first run
    /// or when the stored snapshot cannot be decoded.
    pub(crate) fn hydrate(storage: Storage, config: &EngineConfig) -> anyhow::Result<Self> {
        let users = match storage.load::<Vec<User>>(KEY_USERS)? {
            Some(users) => users,
            None => {
                let seeded = seed::users(config)?;
                storage.save(KEY_USERS, &seeded)?;
                info!(count = seeded.len(), "seeded user collection");
                seeded
            }
        };

        // A stale session pointing at a user that no longer exists is
        // treated as logged out.
        let session = storage
            .load::<UserId>(KEY_SESSION)?
            .filter(|id| users.iter().any(|user| user.id == *id));

        Ok(Self {
            users: Mutex::new(users),
            session: Mutex::new(session),
            storage,
            login_delay: Duration::from_millis(config.login_delay_ms),
        })
    }

    /// Authenticate by email and password. An unknown email mints a new
    /// demo account with a starter balance instead of failing.
    pub fn login(&self, email: &str, password: &str) -> Result<User> {
        self.simulate_network_delay();

        if email.trim().is_empty() || password.len() < MIN_PASSWORD_LEN {
            return Err(AccountError::InvalidCredentials);
        }

        let existing = {
            let users = lock(&self.users);
            users.iter().find(|user| user.email == email).cloned()
        };

        let user = match existing {
            Some(user) => {
                if !verify_password(password, &user.password_hash) {
                    return Err(AccountError::InvalidCredentials);
                }
                user
            }
            None => {
                let username = email.split('@').next().unwrap_or(email).to_string();
                let mut user = User::new(
                    username.clone(),
                    email.to_string(),
                    hash_password(password)?,
                    Cents(10_000),
                );
                user.avatar = Some(avatar_url(&username));

                let mut users = lock(&self.users);
                users.push(user.clone());
                self.persist(&users)?;
                info!(user = %user.username, "minted account on first login");
                user
            }
        };

        self.set_session(Some(user.id))?;
        info!(user = %user.username, admin = user.is_admin, "login");
        Ok(user)
    }

    /// Create an account and log it in. Emails containing "admin" get
    /// the creator role.
    pub fn register(&self, username: &str, email: &str, password: &str) -> Result<User> {
        self.simulate_network_delay();

        if username.trim().is_empty() {
            return Err(AccountError::MissingField("username"));
        }
        if email.trim().is_empty() {
            return Err(AccountError::MissingField("email"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AccountError::WeakPassword);
        }

        let mut user = User::new(
            username.to_string(),
            email.to_string(),
            hash_password(password)?,
            Cents(5_000),
        );
        user.is_admin = email.contains("admin");
        user.avatar = Some(avatar_url(username));

        {
            let mut users = lock(&self.users);
            if users.iter().any(|existing| existing.email == email) {
                return Err(AccountError::EmailTaken);
            }
            users.push(user.clone());
            self.persist(&users)?;
        }

        self.set_session(Some(user.id))?;
        info!(user = %user.username, admin = user.is_admin, "registered account");
        Ok(user)
    }

    pub fn logout(&self) -> Result<()> {
        self.set_session(None)?;
        debug!("logout");
        Ok(())
    }

    pub fn current_user(&self) -> Option<User> {
        let id = (*lock(&self.session))?;
        self.user(id)
    }

    pub fn is_authenticated(&self) -> bool {
        lock(&self.session).is_some()
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        lock(&self.users).iter().find(|user| user.id == id).cloned()
    }

    /// Merge the given fields into the user's profile.
    pub fn update_profile(&self, user_id: UserId, update: ProfileUpdate) -> Result<User> {
        let mut users = lock(&self.users);
        let user = users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or(AccountError::UnknownUser)?;

        if let Some(name) = update.name {
            user.name = Some(name);
        }
        if let Some(bio) = update.bio {
            user.bio = Some(bio);
        }
        if let Some(avatar) = update.avatar {
            user.avatar = Some(avatar);
        }
        let updated = user.clone();
        self.persist(&users)?;
        Ok(updated)
    }

    /// Record an active subscription on the user.
    pub(crate) fn set_subscription(
        &self,
        user_id: UserId,
        period: SubscriptionPeriod,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut users = lock(&self.users);
        let user = users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or(AccountError::UnknownUser)?;
        user.subscription = Some(Subscription { period, expires_at });
        self.persist(&users)?;
        Ok(())
    }

    /// Mark the account verified and tell the user. Re-verifying an
    /// already verified account is a no-op and sends nothing.
    pub fn verify_user(&self, user_id: UserId) -> Result<()> {
        {
            let mut users = lock(&self.users);
            let user = users
                .iter_mut()
                .find(|user| user.id == user_id)
                .ok_or(AccountError::UnknownUser)?;
            if user.is_verified {
                return Ok(());
            }
            user.is_verified = true;
            self.persist(&users)?;
        }

        self.notify(
            user_id,
            "Account Verified",
            "Your account has been verified",
            NotificationEvent::System,
        );
        info!(?user_id, "account verified");
        Ok(())
    }

    /// The user's inbox, newest first.
    pub fn notifications_for(&self, user_id: UserId) -> Vec<Notification> {
        let users = lock(&self.users);
        let mut inbox = users
            .iter()
            .find(|user| user.id == user_id)
            .map(|user| user.notifications.clone())
            .unwrap_or_default();
        inbox.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        inbox
    }

    pub fn unread_notification_count(&self, user_id: UserId) -> usize {
        let users = lock(&self.users);
        users
            .iter()
            .find(|user| user.id == user_id)
            .map(|user| user.notifications.iter().filter(|n| !n.read).count())
            .unwrap_or(0)
    }

    /// Mark one notification read. Unknown notification ids are ignored.
    pub fn mark_notification_read(
        &self,
        user_id: UserId,
        notification_id: NotificationId,
    ) -> Result<()> {
        let mut users = lock(&self.users);
        let user = users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or(AccountError::UnknownUser)?;
        match user
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
        {
            Some(notification) => {
                notification.read = true;
                self.persist(&users)?;
            }
            None => debug!(?notification_id, "ignoring read receipt for unknown notification"),
        }
        Ok(())
    }

    fn simulate_network_delay(&self) {
        if !self.login_delay.is_zero() {
            thread::sleep(self.login_delay);
        }
    }

    fn set_session(&self, user_id: Option<UserId>) -> std::result::Result<(), StorageError> {
        let mut session = lock(&self.session);
        *session = user_id;
        match user_id {
            Some(id) => self.storage.save(KEY_SESSION, &id),
            None => self.storage.remove(KEY_SESSION),
        }
    }

    fn persist(&self, users: &[User]) -> std::result::Result<(), StorageError> {
        self.storage.save(KEY_USERS, &users)
    }
}

impl Notify for AccountStore {
    fn notify(&self, target: UserId, title: &str, message: &str, event: NotificationEvent) {
        let mut users = lock(&self.users);
        let user = match users.iter_mut().find(|user| user.id == target) {
            Some(user) => user,
            None => {
                warn!(?target, title, "dropping notification for unknown user");
                return;
            }
        };
        user.notifications.push(Notification::new(
            target,
            title.to_string(),
            message.to_string(),
            event,
        ));
        debug!(?target, title, "notification delivered");
        if let Err(err) = self.persist(&users) {
            warn!(%err, "failed to persist notification");
        }
    }
}

impl Profiles for AccountStore {
    fn admin_id(&self) -> Option<UserId> {
        lock(&self.users)
            .iter()
            .find(|user| user.is_admin)
            .map(|user| user.id)
    }

    fn username_of(&self, user: UserId) -> Option<String> {
        lock(&self.users)
            .iter()
            .find(|u| u.id == user)
            .map(|u| u.username.clone())
    }

    fn avatar_of(&self, user: UserId) -> Option<String> {
        lock(&self.users)
            .iter()
            .find(|u| u.id == user)
            .and_then(|u| u.avatar.clone())
    }

    fn is_admin(&self, user: UserId) -> bool {
        lock(&self.users)
            .iter()
            .any(|u| u.id == user && u.is_admin)
    }

    fn has_active_subscription(&self, user: UserId) -> bool {
        let now = Utc::now();
        lock(&self.users)
            .iter()
            .find(|u| u.id == user)
            .map(|u| u.has_active_subscription(now))
            .unwrap_or(false)
    }
}

impl BalanceAccess for AccountStore {
    fn balance_of(&self, user: UserId) -> Option<Cents> {
        lock(&self.users)
            .iter()
            .find(|u| u.id == user)
            .map(|u| u.balance)
    }

    fn adjust_balance(&self, user: UserId, delta: Cents) -> std::result::Result<Cents, BalanceError> {
        let mut users = lock(&self.users);
        let account = users
            .iter_mut()
            .find(|u| u.id == user)
            .ok_or(BalanceError::UnknownUser)?;

        let updated = account.balance + delta;
        if updated < Cents::ZERO {
            return Err(BalanceError::Insufficient {
                available: account.balance,
                required: -delta,
            });
        }
        account.balance = updated;
        self.persist(&users)?;
        Ok(updated)
    }
}
