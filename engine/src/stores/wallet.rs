//! Wallet ledger: per-user transaction histories plus the debit and
//! credit paths every paid action funnels through.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use creatorhub_domain::ledger::{Transaction, TransactionKind};
use creatorhub_domain::{Cents, UserId};

use crate::storage::{transactions_key, Storage, StorageError};
use crate::stores::{lock, BalanceAccess, BalanceError};

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("insufficient balance: have {available}, need {required}")]
    InsufficientBalance { available: Cents, required: Cents },
    #[error("unknown user")]
    UnknownUser,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, WalletError>;

impl From<BalanceError> for WalletError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::UnknownUser => WalletError::UnknownUser,
            BalanceError::Insufficient {
                available,
                required,
            } => WalletError::InsufficientBalance {
                available,
                required,
            },
            BalanceError::Storage(err) => WalletError::Storage(err),
        }
    }
}

pub struct WalletStore {
    /// Histories load lazily, one user at a time, under their own key.
    transactions: Mutex<HashMap<UserId, Vec<Transaction>>>,
    storage: Storage,
    balances: Arc<dyn BalanceAccess>,
}

impl WalletStore {
    pub(crate) fn new(storage: Storage, balances: Arc<dyn BalanceAccess>) -> Self {
        Self {
            transactions: Mutex::new(HashMap::new()),
            storage,
            balances,
        }
    }

    /// Debit the user and record a negative ledger entry. The balance
    /// check and the debit are one atomic step; on refusal nothing is
    /// recorded and nothing is charged.
    pub fn make_payment(
        &self,
        user: UserId,
        amount: Cents,
        description: &str,
        kind: TransactionKind,
    ) -> Result<()> {
        if !amount.is_positive() {
            return Err(WalletError::InvalidAmount);
        }
        let remaining = self.balances.adjust_balance(user, -amount)?;
        self.append(user, Transaction::new(user, kind, -amount, description.to_string()))?;
        debug!(%amount, %remaining, ?kind, "wallet debited");
        Ok(())
    }

    /// Credit the user and record a positive ledger entry.
    pub fn credit(
        &self,
        user: UserId,
        amount: Cents,
        description: &str,
        kind: TransactionKind,
    ) -> Result<()> {
        if !amount.is_positive() {
            return Err(WalletError::InvalidAmount);
        }
        let balance = self.balances.adjust_balance(user, amount)?;
        self.append(user, Transaction::new(user, kind, amount, description.to_string()))?;
        debug!(%amount, %balance, ?kind, "wallet credited");
        Ok(())
    }

    /// Top up the wallet from the user's own action.
    pub fn add_funds(&self, user: UserId, amount: Cents) -> Result<()> {
        self.credit(
            user,
            amount,
            &format!("Added {amount} to wallet"),
            TransactionKind::Deposit,
        )
    }

    pub fn balance_of(&self, user: UserId) -> Option<Cents> {
        self.balances.balance_of(user)
    }

    /// The user's ledger, newest first.
    pub fn transactions_for(&self, user: UserId) -> Vec<Transaction> {
        let mut map = lock(&self.transactions);
        let mut history = match Self::entries(&self.storage, &mut map, user) {
            Ok(entries) => entries.clone(),
            Err(err) => {
                warn!(%err, "failed to load transaction history");
                return Vec::new();
            }
        };
        history.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        history
    }

    fn append(&self, user: UserId, transaction: Transaction) -> Result<()> {
        let mut map = lock(&self.transactions);
        let entries = Self::entries(&self.storage, &mut map, user)?;
        entries.push(transaction);
        self.storage.save(&transactions_key(user), entries)?;
        Ok(())
    }

    fn entries<'a>(
        storage: &Storage,
        map: &'a mut HashMap<UserId, Vec<Transaction>>,
        user: UserId,
    ) -> std::result::Result<&'a mut Vec<Transaction>, StorageError> {
        match map.entry(user) {
            Entry::Occupied(occupied) => Ok(occupied.into_mut()),
            Entry::Vacant(vacant) => {
                let stored = storage.load(&transactions_key(user))?.unwrap_or_default();
                Ok(vacant.insert(stored))
            }
        }
    }
}
