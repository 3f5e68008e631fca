//! Conversations and direct messages, including pay-per-view state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{validate_media_url, Cents, ConversationId, MessageId, UserId};

/// Kind of media carried by an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Video,
    File,
}

/// A media attachment on a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub kind: MediaKind,
    pub url: String,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
}

impl MediaAttachment {
    /// Build an attachment, rejecting non-http(s) URLs up front.
    pub fn new(kind: MediaKind, url: String) -> crate::Result<Self> {
        validate_media_url(&url)?;
        Ok(Self {
            kind,
            url,
            file_name: None,
            file_size: None,
        })
    }
}

/// A direct message between two users.
///
/// Created by the send operation and mutated in place afterwards
/// (mark-read, unlock, tip, pin). There is no deletion path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub media: Vec<MediaAttachment>,
    /// Pay-per-view: content hidden from the receiver until unlocked.
    pub is_ppv: bool,
    pub price: Cents,
    pub is_read: bool,
    /// Defaults to the inverse of the pay-per-view flag.
    pub is_unlocked: bool,
    pub is_pinned: bool,
    /// Tips accumulate on the message they were attached to.
    pub tip_total: Cents,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        sender_id: UserId,
        receiver_id: UserId,
        content: String,
        media: Vec<MediaAttachment>,
        is_ppv: bool,
        price: Cents,
    ) -> Self {
        Self {
            id: MessageId::new(),
            sender_id,
            receiver_id,
            content,
            media,
            is_ppv,
            price,
            is_read: false,
            is_unlocked: !is_ppv,
            is_pinned: false,
            tip_total: Cents::ZERO,
            sent_at: Utc::now(),
        }
    }
}

/// A two-party conversation with a cached last message and unread counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub participants: [UserId; 2],
    pub last_message: Option<Message>,
    pub unread_count: u32,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(a: UserId, b: UserId) -> Self {
        Self {
            id: ConversationId::new(),
            participants: [a, b],
            last_message: None,
            unread_count: 0,
            created_at: Utc::now(),
        }
    }

    pub fn involves(&self, user: UserId) -> bool {
        self.participants.contains(&user)
    }

    /// Participant-pair match, insensitive to argument order.
    pub fn matches_pair(&self, a: UserId, b: UserId) -> bool {
        let [x, y] = self.participants;
        (x == a && y == b) || (x == b && y == a)
    }

    pub fn other_participant(&self, user: UserId) -> Option<UserId> {
        let [x, y] = self.participants;
        if x == user {
            Some(y)
        } else if y == user {
            Some(x)
        } else {
            None
        }
    }

    /// Timestamp of the latest activity, used to sort conversation lists.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_message
            .as_ref()
            .map(|m| m.sent_at)
            .unwrap_or(self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ppv_message_starts_locked() {
        let msg = Message::new(
            UserId::new(),
            UserId::new(),
            "exclusive".to_string(),
            Vec::new(),
            true,
            Cents(500),
        );
        assert!(!msg.is_unlocked);
        assert!(!msg.is_read);
        assert_eq!(msg.tip_total, Cents::ZERO);
    }

    #[test]
    fn free_message_starts_unlocked() {
        let msg = Message::new(
            UserId::new(),
            UserId::new(),
            "hi".to_string(),
            Vec::new(),
            false,
            Cents::ZERO,
        );
        assert!(msg.is_unlocked);
    }

    #[test]
    fn pair_match_is_order_independent() {
        let a = UserId::new();
        let b = UserId::new();
        let conv = Conversation::new(a, b);

        assert!(conv.matches_pair(a, b));
        assert!(conv.matches_pair(b, a));
        assert!(!conv.matches_pair(a, UserId::new()));
        assert_eq!(conv.other_participant(a), Some(b));
        assert_eq!(conv.other_participant(UserId::new()), None);
    }

    #[test]
    fn attachment_rejects_bad_url() {
        assert!(MediaAttachment::new(MediaKind::Image, "file:///etc/passwd".to_string()).is_err());
        let ok = MediaAttachment::new(MediaKind::Image, "https://cdn.example.com/a.jpg".to_string());
        assert!(ok.is_ok());
    }
}
