//! The payout request lifecycle end to end: open, annotate, prove,
//! settle, and the money movement that settlement implies.

use std::path::PathBuf;
use std::sync::Arc;

use creatorhub_domain::ledger::TransactionKind;
use creatorhub_domain::payment::{PaymentMethod, RequestStatus};
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
fn approval_settles_and_credits_in_one_step() {
    let state = open_state();
    let admin = seed::admin_id();
    let fan = seed::demo_fan_id();

    let id = state
        .payments()
        .request_payment(fan, Cents(2_500), PaymentMethod::PayPal)
        .unwrap();

    let admin_inbox = state.accounts().notifications_for(admin);
    assert_eq!(admin_inbox[0].title, "New Payment Request");
    assert_eq!(
        admin_inbox[0].message,
        "User user1 requested a payment of $25.00 via PayPal"
    );

    state
        .payments()
        .update_payment_details(id, "paypal.me/creator")
        .unwrap();
    state
        .payments()
        .submit_payment_proof(id, "https://cdn.example.com/proof.png")
        .unwrap();

    let before = state.wallet().balance_of(fan).unwrap();
    state.payments().approve_payment_request(id, None).unwrap();

    // One call moved the status and the money together.
    assert_eq!(state.wallet().balance_of(fan), Some(before + Cents(2_500)));
    let settled = state.payments().request(id).unwrap();
    assert_eq!(settled.status, RequestStatus::Completed);
    assert!(settled.status_updated_at.is_some());

    let history = state.wallet().transactions_for(fan);
    assert_eq!(history[0].amount, Cents(2_500));
    assert_eq!(history[0].kind, TransactionKind::Deposit);

    let fan_inbox = state.accounts().notifications_for(fan);
    assert!(fan_inbox
        .iter()
        .any(|n| n.message == "Your payment request for $25.00 has been approved"));
}

#[test]
fn settled_requests_are_terminal() {
    let state = open_state();
    let fan = seed::demo_fan_id();

    let id = state
        .payments()
        .request_payment(fan, Cents(2_500), PaymentMethod::CashApp)
        .unwrap();
    state.payments().approve_payment_request(id, None).unwrap();

    // Every later review action bounces off the settled request.
    assert!(state.payments().approve_payment_request(id, None).is_err());
    assert!(state.payments().reject_payment_request(id).is_err());
    assert!(state
        .payments()
        .update_payment_details(id, "too late")
        .is_err());
    assert!(state
        .payments()
        .submit_payment_proof(id, "https://cdn.example.com/late.png")
        .is_err());

    // And crucially, the wallet was credited exactly once.
    assert_eq!(state.wallet().transactions_for(fan).len(), 1);
    assert_eq!(state.wallet().balance_of(fan), Some(Cents(12_500)));
}

#[test]
fn rejection_notifies_with_a_two_decimal_amount() {
    let state = open_state();
    let fan = seed::demo_fan_id();

    let id = state
        .payments()
        .request_payment(fan, Cents(2_500), PaymentMethod::BankTransfer)
        .unwrap();
    state.payments().reject_payment_request(id).unwrap();

    assert_eq!(
        state.payments().request(id).unwrap().status,
        RequestStatus::Rejected
    );
    assert_eq!(state.wallet().balance_of(fan), Some(Cents(10_000)));

    let inbox = state.accounts().notifications_for(fan);
    assert_eq!(
        inbox[0].message,
        "Your payment request for $25.00 has been rejected"
    );
}
