//! Everything that happens through the stores must survive a process
//! restart: close the database, reopen it, find the same state.

use std::sync::Arc;

use creatorhub_domain::payment::{PaymentMethod, RequestStatus};
use creatorhub_domain::Cents;
use creatorhub_engine::{seed, AppState, EngineConfig};

fn config_at(dir: &tempfile::TempDir) -> EngineConfig {
    EngineConfig {
        data_dir: dir.path().to_path_buf(),
        login_delay_ms: 0,
        admin_email: "admin@example.com".to_string(),
        admin_password: "admin123".to_string(),
    }
}

#[test]
fn reopened_database_restores_every_collection() {
    let dir = tempfile::tempdir().unwrap();
    let fan = seed::demo_fan_id();
    let conv = seed::welcome_conversation_id();

    let (sent_id, request_id) = {
        let state = AppState::open(config_at(&dir)).unwrap();

        state.accounts().login("user1@example.com", "password123").unwrap();
        let sent = state
            .messages()
            .send_message(
                conv,
                fan,
                seed::admin_id(),
                "remember me",
                Vec::new(),
                false,
                Cents::ZERO,
            )
            .unwrap();
        state.wallet().add_funds(fan, Cents(1_000)).unwrap();
        let request_id = state
            .payments()
            .request_payment(fan, Cents(250), PaymentMethod::Crypto)
            .unwrap();
        state
            .posts()
            .add_post(seed::admin_id(), "persisted post", Vec::new(), false, Cents::ZERO)
            .unwrap();

        (sent.id, request_id)
        // Dropping the state releases the database lock.
    };

    let state: Arc<AppState> = AppState::open(config_at(&dir)).unwrap();

    // Session survives.
    assert_eq!(state.accounts().current_user().map(|u| u.id), Some(fan));

    // The sent message and the thread summary survive.
    let thread = state.messages().messages_in(conv);
    assert!(thread.iter().any(|m| m.id == sent_id));
    let summary = state.messages().conversation(conv).unwrap();
    assert_eq!(summary.last_message.map(|m| m.id), Some(sent_id));

    // Money and its paper trail survive.
    assert_eq!(state.wallet().balance_of(fan), Some(Cents(11_000)));
    assert!(!state.wallet().transactions_for(fan).is_empty());

    // The pending payout request survives and is still reviewable.
    let request = state.payments().request(request_id).unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    state
        .payments()
        .approve_payment_request(request_id, None)
        .unwrap();

    // The feed kept the new post on top of the seeded three.
    let feed = state.posts().feed();
    assert_eq!(feed.len(), 4);
    assert_eq!(feed[0].content, "persisted post");
}

#[test]
fn logout_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let state = AppState::open(config_at(&dir)).unwrap();
        state.accounts().login("user1@example.com", "password123").unwrap();
        state.accounts().logout().unwrap();
    }

    let state = AppState::open(config_at(&dir)).unwrap();
    assert!(state.accounts().current_user().is_none());
    assert!(!state.accounts().is_authenticated());
}
