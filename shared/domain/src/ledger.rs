//! Wallet ledger entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Cents, TransactionId, UserId};

/// What moved the money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Payment,
    Subscription,
    Tip,
}

/// One append-only ledger entry. Debits carry negative amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub kind: TransactionKind,
    pub amount: Cents,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(user_id: UserId, kind: TransactionKind, amount: Cents, description: String) -> Self {
        Self {
            id: TransactionId::new(),
            user_id,
            kind,
            amount,
            description,
            occurred_at: Utc::now(),
        }
    }
}
