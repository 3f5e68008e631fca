//! User-facing notifications with typed event payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Cents, ConversationId, MessageId, NotificationId, PlanId, RequestId, UserId};

/// What a notification is about, one concrete payload shape per variant.
///
/// Serialized with a `type` discriminant and a `data` payload so stored
/// notifications stay self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum NotificationEvent {
    PaymentRequest {
        request_id: RequestId,
    },
    Message {
        conversation_id: ConversationId,
        message_id: MessageId,
    },
    Tip {
        conversation_id: ConversationId,
        message_id: MessageId,
        amount: Cents,
    },
    Subscription {
        plan_id: PlanId,
    },
    System,
}

/// A notification appended to a user's inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: NotificationEvent,
}

impl Notification {
    pub fn new(user_id: UserId, title: String, message: String, event: NotificationEvent) -> Self {
        Self {
            id: NotificationId::new(),
            user_id,
            title,
            message,
            read: false,
            created_at: Utc::now(),
            event,
        }
    }
}
