//! Subscription plans and the purchase path that activates them.

use chrono::Utc;
use std::sync::{Arc, Mutex};
use tracing::info;

use creatorhub_domain::ledger::TransactionKind;
use creatorhub_domain::notification::NotificationEvent;
use creatorhub_domain::plan::SubscriptionPlan;
use creatorhub_domain::{PlanId, UserId};

use crate::storage::{Storage, StorageError, KEY_PLANS};
use crate::stores::account::{AccountError, AccountStore};
use crate::stores::wallet::{WalletError, WalletStore};
use crate::stores::{lock, Notify, Profiles};

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("unknown subscription plan")]
    UnknownPlan,
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, PlanError>;

/// The catalog is fixed after seeding; only the read and purchase
/// paths are exposed.
pub struct PlanStore {
    plans: Mutex<Vec<SubscriptionPlan>>,
    wallet: Arc<WalletStore>,
    accounts: Arc<AccountStore>,
}

impl PlanStore {
    pub(crate) fn hydrate(
        storage: Storage,
        wallet: Arc<WalletStore>,
        accounts: Arc<AccountStore>,
    ) -> anyhow::Result<Self> {
        let plans = storage.load_or(KEY_PLANS, crate::seed::plans)?;
        Ok(Self {
            plans: Mutex::new(plans),
            wallet,
            accounts,
        })
    }

    pub fn plans(&self) -> Vec<SubscriptionPlan> {
        lock(&self.plans).clone()
    }

    pub fn plan(&self, plan_id: PlanId) -> Option<SubscriptionPlan> {
        lock(&self.plans).iter().find(|p| p.id == plan_id).cloned()
    }

    /// Buy a plan: debit the wallet, activate the subscription with an
    /// expiry derived from the plan period, and tell the creator. A
    /// refused debit activates nothing.
    pub fn subscribe(&self, user_id: UserId, plan_id: PlanId) -> Result<()> {
        let plan = self.plan(plan_id).ok_or(PlanError::UnknownPlan)?;

        self.wallet.make_payment(
            user_id,
            plan.price,
            &format!("{} subscription", plan.period),
            TransactionKind::Subscription,
        )?;
        let expires_at = plan.period.next_expiry(Utc::now());
        self.accounts
            .set_subscription(user_id, plan.period, expires_at)?;

        if let Some(admin) = self.accounts.admin_id() {
            if admin != user_id {
                let username = self
                    .accounts
                    .username_of(user_id)
                    .unwrap_or_else(|| "someone".to_string());
                self.accounts.notify(
                    admin,
                    "New Subscriber",
                    &format!("{username} subscribed to the {} plan", plan.name),
                    NotificationEvent::Subscription { plan_id },
                );
            }
        }
        info!(plan = %plan.name, %expires_at, "subscription activated");
        Ok(())
    }
}
