//! Messaging flows that cross store boundaries: the subscription gate,
//! pay-per-view funding, and tipping.

use std::path::PathBuf;
use std::sync::Arc;

use creatorhub_domain::Cents;
use creatorhub_engine::{seed, AppState, EngineConfig};

fn test_config() -> EngineConfig {
    EngineConfig {
        data_dir: PathBuf::from("unused-in-tests"),
        login_delay_ms: 0,
        admin_email: "admin@example.com".to_string(),
        admin_password: "admin123".to_string(),
    }
}

fn open_state() -> Arc<AppState> {
    AppState::open_temporary(test_config()).expect("temporary state opens")
}

#[test]
fn buying_a_plan_lifts_the_send_gate() {
    let state = open_state();
    let admin = seed::admin_id();
    let casey = state
        .accounts()
        .login("casey@example.com", "hunter22")
        .unwrap();
    let conv = state
        .messages()
        .get_or_create_conversation(casey.id, admin)
        .unwrap();

    state
        .messages()
        .send_message(conv, casey.id, admin, "hi!", Vec::new(), false, Cents::ZERO)
        .unwrap();
    state
        .messages()
        .send_message(conv, casey.id, admin, "hello?", Vec::new(), false, Cents::ZERO)
        .unwrap();

    // Two free messages used up; the third needs a subscription.
    assert!(!state.messages().can_send_message(casey.id, admin));
    assert!(state
        .messages()
        .send_message(conv, casey.id, admin, "third", Vec::new(), false, Cents::ZERO)
        .is_err());

    let monthly = state.plans().plan(seed::monthly_plan_id()).unwrap();
    state.plans().subscribe(casey.id, monthly.id).unwrap();

    // The purchase debited the wallet and opened the gate.
    assert_eq!(
        state.wallet().balance_of(casey.id),
        Some(Cents(10_000) - monthly.price)
    );
    assert!(state.messages().can_send_message(casey.id, admin));
    state
        .messages()
        .send_message(conv, casey.id, admin, "third", Vec::new(), false, Cents::ZERO)
        .unwrap();

    let admin_inbox = state.accounts().notifications_for(admin);
    assert!(admin_inbox
        .iter()
        .any(|n| n.message == "casey subscribed to the Monthly VIP plan"));
}

#[test]
fn ppv_unlock_waits_for_funding() {
    let state = open_state();
    let admin = seed::admin_id();
    let fan = seed::demo_fan_id();
    let conv = seed::welcome_conversation_id();

    // Price the message just above the fan's $100 balance.
    let ppv = state
        .messages()
        .send_message(
            conv,
            admin,
            fan,
            "something special",
            Vec::new(),
            true,
            Cents(10_500),
        )
        .unwrap();

    assert!(state.messages().unlock_ppv_message(conv, ppv.id, fan).is_err());
    let still_locked = state
        .messages()
        .messages_in(conv)
        .into_iter()
        .find(|m| m.id == ppv.id)
        .unwrap();
    assert!(!still_locked.is_unlocked);
    assert_eq!(state.wallet().balance_of(fan), Some(Cents(10_000)));

    state.wallet().add_funds(fan, Cents(500)).unwrap();
    state
        .messages()
        .unlock_ppv_message(conv, ppv.id, fan)
        .unwrap();

    let unlocked = state
        .messages()
        .messages_in(conv)
        .into_iter()
        .find(|m| m.id == ppv.id)
        .unwrap();
    assert!(unlocked.is_unlocked);
    assert_eq!(state.wallet().balance_of(fan), Some(Cents::ZERO));

    // Unlocking again must not charge again.
    state
        .messages()
        .unlock_ppv_message(conv, ppv.id, fan)
        .unwrap();
    assert_eq!(state.wallet().balance_of(fan), Some(Cents::ZERO));
}

#[test]
fn tips_debit_the_tipper_and_notify_the_author() {
    let state = open_state();
    let admin = seed::admin_id();
    let fan = seed::demo_fan_id();
    let conv = seed::welcome_conversation_id();

    let target = state
        .messages()
        .messages_in(conv)
        .into_iter()
        .find(|m| m.is_ppv)
        .unwrap();

    state.messages().send_tip(conv, target.id, fan, Cents(500)).unwrap();

    assert_eq!(state.wallet().balance_of(fan), Some(Cents(9_500)));
    let tipped = state
        .messages()
        .messages_in(conv)
        .into_iter()
        .find(|m| m.id == target.id)
        .unwrap();
    assert_eq!(tipped.tip_total, Cents(500));

    let inbox = state.accounts().notifications_for(admin);
    assert_eq!(inbox[0].title, "New Tip");
    assert_eq!(inbox[0].message, "You received a tip of $5.00");

    // Tips are ledgered for the tipper but never credit the author.
    assert_eq!(state.wallet().balance_of(admin), Some(Cents(100_000)));
}
