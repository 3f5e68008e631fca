//! Payout requests: fans ask to be paid out, the creator reviews them.
//!
//! A request moves Pending -> Completed or Pending -> Rejected exactly
//! once. Approval credits the requester's wallet in the same call; if
//! the credit fails the request stays pending and reviewable.

use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use creatorhub_domain::ledger::TransactionKind;
use creatorhub_domain::notification::NotificationEvent;
use creatorhub_domain::payment::{PaymentMethod, PaymentRequest};
use creatorhub_domain::{validate_media_url, Cents, DomainError, RequestId, UserId};

use crate::storage::{Storage, StorageError, KEY_PAYMENT_REQUESTS};
use crate::stores::wallet::{WalletError, WalletStore};
use crate::stores::{lock, Notify, Profiles};

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("unknown payment request")]
    UnknownRequest,
    #[error("request is already settled")]
    AlreadySettled,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, PaymentError>;

pub struct PaymentRequestStore {
    requests: Mutex<Vec<PaymentRequest>>,
    storage: Storage,
    wallet: Arc<WalletStore>,
    profiles: Arc<dyn Profiles>,
    notifier: Arc<dyn Notify>,
}

impl PaymentRequestStore {
    pub(crate) fn hydrate(
        storage: Storage,
        wallet: Arc<WalletStore>,
        profiles: Arc<dyn Profiles>,
        notifier: Arc<dyn Notify>,
    ) -> anyhow::Result<Self> {
        let requests = storage.load_or(KEY_PAYMENT_REQUESTS, Vec::new)?;
        Ok(Self {
            requests: Mutex::new(requests),
            storage,
            wallet,
            profiles,
            notifier,
        })
    }

    /// Open a payout request and tell the creator about it.
    pub fn request_payment(
        &self,
        user_id: UserId,
        amount: Cents,
        method: PaymentMethod,
    ) -> Result<RequestId> {
        if !amount.is_positive() {
            return Err(PaymentError::Domain(DomainError::InvalidAmount));
        }

        let request = PaymentRequest::new(user_id, amount, method);
        let request_id = request.id;
        {
            let mut requests = lock(&self.requests);
            requests.push(request);
            self.persist(&requests)?;
        }

        if let Some(admin) = self.profiles.admin_id() {
            let username = self
                .profiles
                .username_of(user_id)
                .unwrap_or_else(|| "someone".to_string());
            self.notifier.notify(
                admin,
                "New Payment Request",
                &format!("User {username} requested a payment of {amount} via {method}"),
                NotificationEvent::PaymentRequest { request_id },
            );
        }
        info!(%amount, %method, ?request_id, "payment request opened");
        Ok(request_id)
    }

    /// Attach or replace the payout coordinates on a pending request
    /// and tell the requester to go pay.
    pub fn update_payment_details(&self, request_id: RequestId, details: &str) -> Result<()> {
        let (user_id, amount) = {
            let mut requests = lock(&self.requests);
            let request = Self::pending_mut(&mut requests, request_id)?;
            request.payment_details = Some(details.to_string());
            let summary = (request.user_id, request.amount);
            self.persist(&requests)?;
            summary
        };

        self.notifier.notify(
            user_id,
            "Payment Details Added",
            &format!("The admin has added payment details for your {amount} request"),
            NotificationEvent::PaymentRequest { request_id },
        );
        Ok(())
    }

    /// Attach proof of payment to a pending request and tell the
    /// creator it is ready for review.
    pub fn submit_payment_proof(&self, request_id: RequestId, screenshot_url: &str) -> Result<()> {
        validate_media_url(screenshot_url)?;

        let (user_id, amount) = {
            let mut requests = lock(&self.requests);
            let request = Self::pending_mut(&mut requests, request_id)?;
            request.screenshot_url = Some(screenshot_url.to_string());
            let summary = (request.user_id, request.amount);
            self.persist(&requests)?;
            summary
        };

        if let Some(admin) = self.profiles.admin_id() {
            let username = self
                .profiles
                .username_of(user_id)
                .unwrap_or_else(|| "someone".to_string());
            self.notifier.notify(
                admin,
                "Payment Proof Submitted",
                &format!("User {username} has submitted payment proof for {amount}"),
                NotificationEvent::PaymentRequest { request_id },
            );
        }
        Ok(())
    }

    /// Approve a pending request: credit the requester's wallet and
    /// flip the status in one step. The credit happens first, so a
    /// failed credit leaves the request pending.
    pub fn approve_payment_request(
        &self,
        request_id: RequestId,
        details: Option<&str>,
    ) -> Result<()> {
        let (user_id, amount) = {
            let mut requests = lock(&self.requests);
            let request = Self::pending_mut(&mut requests, request_id)?;
            let user_id = request.user_id;
            let amount = request.amount;
            let method = request.method;

            self.wallet.credit(
                user_id,
                amount,
                &format!("Payment request approved via {method}"),
                TransactionKind::Deposit,
            )?;

            request.complete();
            if let Some(details) = details {
                request.payment_details = Some(details.to_string());
            }
            self.persist(&requests)?;
            (user_id, amount)
        };

        self.notifier.notify(
            user_id,
            "Payment Request Approved",
            &format!("Your payment request for {amount} has been approved"),
            NotificationEvent::PaymentRequest { request_id },
        );
        info!(%amount, ?request_id, "payment request approved");
        Ok(())
    }

    /// Reject a pending request. No money moves.
    pub fn reject_payment_request(&self, request_id: RequestId) -> Result<()> {
        let (user_id, amount) = {
            let mut requests = lock(&self.requests);
            let request = Self::pending_mut(&mut requests, request_id)?;
            request.reject();
            let summary = (request.user_id, request.amount);
            self.persist(&requests)?;
            summary
        };

        self.notifier.notify(
            user_id,
            "Payment Request Rejected",
            &format!("Your payment request for {amount} has been rejected"),
            NotificationEvent::PaymentRequest { request_id },
        );
        info!(%amount, ?request_id, "payment request rejected");
        Ok(())
    }

    pub fn request(&self, request_id: RequestId) -> Option<PaymentRequest> {
        lock(&self.requests)
            .iter()
            .find(|r| r.id == request_id)
            .cloned()
    }

    /// One user's requests in the order they were opened.
    pub fn user_payment_requests(&self, user_id: UserId) -> Vec<PaymentRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Every request, newest first. The creator's review queue.
    pub fn all_payment_requests(&self) -> Vec<PaymentRequest> {
        let mut requests = lock(&self.requests).clone();
        requests.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        requests
    }

    fn pending_mut(
        requests: &mut [PaymentRequest],
        request_id: RequestId,
    ) -> Result<&mut PaymentRequest> {
        let request = requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or(PaymentError::UnknownRequest)?;
        if !request.is_pending() {
            debug!(?request_id, status = ?request.status, "request already settled");
            return Err(PaymentError::AlreadySettled);
        }
        Ok(request)
    }

    fn persist(&self, requests: &[PaymentRequest]) -> std::result::Result<(), StorageError> {
        self.storage.save(KEY_PAYMENT_REQUESTS, &requests)
    }
}
