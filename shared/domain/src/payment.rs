//! Payment requests and their settlement lifecycle.
//!
//! A payment request is a user-initiated ask for the creator to manually
//! credit funds after an out-of-band payment. Requests move from pending
//! to completed or rejected; both outcomes are terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Cents, RequestId, UserId};

/// Out-of-band payment rails a requester can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    PayPal,
    CashApp,
    #[serde(rename = "Apple Pay")]
    ApplePay,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    Crypto,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::PayPal => "PayPal",
            PaymentMethod::CashApp => "CashApp",
            PaymentMethod::ApplePay => "Apple Pay",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Crypto => "Crypto",
        };
        f.write_str(label)
    }
}

/// Settlement status of a payment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Awaiting review by the admin.
    Pending,
    /// Approved and credited. Terminal.
    Completed,
    /// Declined by the admin. Terminal.
    Rejected,
}

/// A user's request to have funds credited to their wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub id: RequestId,
    pub user_id: UserId,
    pub amount: Cents,
    pub method: PaymentMethod,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
    /// When the status last left pending.
    pub status_updated_at: Option<DateTime<Utc>>,
    /// Free-text payment instructions added by the admin.
    pub payment_details: Option<String>,
    /// Proof-of-payment screenshot URL submitted by the requester.
    pub screenshot_url: Option<String>,
}

impl PaymentRequest {
    /// Create a new pending request.
    pub fn new(user_id: UserId, amount: Cents, method: PaymentMethod) -> Self {
        Self {
            id: RequestId::new(),
            user_id,
            amount,
            method,
            status: RequestStatus::Pending,
            requested_at: Utc::now(),
            status_updated_at: None,
            payment_details: None,
            screenshot_url: None,
        }
    }

    /// Mark the request approved.
    pub fn complete(&mut self) {
        self.status = RequestStatus::Completed;
        self.status_updated_at = Some(Utc::now());
    }

    /// Mark the request declined.
    pub fn reject(&mut self) {
        self.status = RequestStatus::Rejected;
        self.status_updated_at = Some(Utc::now());
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}
