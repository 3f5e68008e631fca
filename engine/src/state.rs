//! Composition root: opens storage, hydrates every store, and wires the
//! cross-store seams.

use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use crate::config::EngineConfig;
use crate::storage::Storage;
use crate::stores::account::AccountStore;
use crate::stores::messages::MessageStore;
use crate::stores::payments::PaymentRequestStore;
use crate::stores::plans::PlanStore;
use crate::stores::posts::PostStore;
use crate::stores::wallet::WalletStore;

pub struct AppState {
    config: EngineConfig,
    accounts: Arc<AccountStore>,
    wallet: Arc<WalletStore>,
    messages: Arc<MessageStore>,
    payments: Arc<PaymentRequestStore>,
    posts: Arc<PostStore>,
    plans: Arc<PlanStore>,
}

impl AppState {
    /// Open (or create) the database at the configured data directory
    /// and hydrate every collection.
    pub fn open(config: EngineConfig) -> anyhow::Result<Arc<Self>> {
        let storage = Storage::open(&config.data_dir).with_context(|| {
            format!("failed to open data directory {}", config.data_dir.display())
        })?;
        Self::wire(config, storage)
    }

    /// Open against a throwaway database. Used by tests and demos.
    pub fn open_temporary(config: EngineConfig) -> anyhow::Result<Arc<Self>> {
        let storage = Storage::temporary().context("failed to open temporary storage")?;
        Self::wire(config, storage)
    }

    fn wire(config: EngineConfig, storage: Storage) -> anyhow::Result<Arc<Self>> {
        let accounts = Arc::new(
            AccountStore::hydrate(storage.clone(), &config).context("hydrating accounts")?,
        );
        let wallet = Arc::new(WalletStore::new(storage.clone(), accounts.clone()));
        let messages = Arc::new(
            MessageStore::hydrate(
                storage.clone(),
                wallet.clone(),
                accounts.clone(),
                accounts.clone(),
            )
            .context("hydrating conversations")?,
        );
        let payments = Arc::new(
            PaymentRequestStore::hydrate(
                storage.clone(),
                wallet.clone(),
                accounts.clone(),
                accounts.clone(),
            )
            .context("hydrating payment requests")?,
        );
        let posts = Arc::new(
            PostStore::hydrate(storage.clone(), wallet.clone(), accounts.clone())
                .context("hydrating posts")?,
        );
        let plans = Arc::new(
            PlanStore::hydrate(storage, wallet.clone(), accounts.clone())
                .context("hydrating plans")?,
        );

        info!("state engine ready");
        Ok(Arc::new(Self {
            config,
            accounts,
            wallet,
            messages,
            payments,
            posts,
            plans,
        }))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    pub fn wallet(&self) -> &WalletStore {
        &self.wallet
    }

    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    pub fn payments(&self) -> &PaymentRequestStore {
        &self.payments
    }

    pub fn posts(&self) -> &PostStore {
        &self.posts
    }

    pub fn plans(&self) -> &PlanStore {
        &self.plans
    }
}

#[cfg(test)]
mod tests {
    use crate::seed;
    use crate::stores::testing::open_state;

    #[test]
    fn temporary_state_seeds_everything() {
        let state = open_state();

        assert!(state.accounts().user(seed::admin_id()).is_some());
        assert!(state
            .messages()
            .conversation(seed::welcome_conversation_id())
            .is_some());
        assert_eq!(state.plans().plans().len(), 3);
        assert_eq!(state.posts().feed().len(), 3);
        assert!(state.payments().all_payment_requests().is_empty());
        assert!(state.accounts().current_user().is_none());
    }
}
