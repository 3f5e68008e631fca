//! Persistence adapter: whole-collection JSON snapshots stored under
//! flat logical keys in an embedded sled database.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

use creatorhub_domain::UserId;

pub const KEY_USERS: &str = "users";
pub const KEY_SESSION: &str = "session";
pub const KEY_CONVERSATIONS: &str = "conversations";
pub const KEY_MESSAGES: &str = "messages";
pub const KEY_PAYMENT_REQUESTS: &str = "payment_requests";
pub const KEY_POSTS: &str = "posts";
pub const KEY_PLANS: &str = "subscription_plans";

/// Key for a single user's transaction history.
pub fn transactions_key(user: UserId) -> String {
    format!("transactions_{}", user.0)
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend failure: {0}")]
    Backend(#[from] sled::Error),
    #[error("storage directory is not usable: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode collection {key}: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Handle to the embedded database. Cheap to clone; every store keeps
/// its own copy and persists whole collections on each mutation.
#[derive(Debug, Clone)]
pub struct Storage {
    db: sled::Db,
}

impl Storage {
    /// Open (or create) the database under `path`.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Open a throwaway database that vanishes on drop.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Load a collection snapshot. Missing keys and undecodable
    /// snapshots both come back as `None`; corruption is logged and the
    /// caller falls back to its seed data.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let bytes = match self.db.get(key)? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(key, %err, "discarding undecodable collection snapshot");
                Ok(None)
            }
        }
    }

    /// Load a collection, or build it with `fallback`, persist the
    /// result, and return it.
    pub fn load_or<T, F>(&self, key: &str, fallback: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(value) = self.load(key)? {
            return Ok(value);
        }
        let value = fallback();
        self.save(key, &value)?;
        Ok(value)
    }

    /// Serialize and persist a collection snapshot, flushing to disk
    /// before returning.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.db.insert(key, bytes)?;
        self.db.flush()?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.db.remove(key)?;
        self.db.flush()?;
        Ok(())
    }
}
