//! Conversations and messages: pair-matched threads created lazily, the
//! send gate, pay-per-view unlocking, tipping, and pinning.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use creatorhub_domain::ledger::TransactionKind;
use creatorhub_domain::message::{Conversation, MediaAttachment, Message};
use creatorhub_domain::notification::NotificationEvent;
use creatorhub_domain::{Cents, ConversationId, DomainError, MessageId, UserId};

use crate::storage::{Storage, StorageError, KEY_CONVERSATIONS, KEY_MESSAGES};
use crate::stores::wallet::{WalletError, WalletStore};
use crate::stores::{lock, Notify, Profiles};

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("sender is not allowed to message this recipient")]
    NotPermitted,
    #[error("message needs text or media")]
    EmptyMessage,
    #[error("unknown conversation")]
    UnknownConversation,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, MessageError>;

/// The send gate. The creator can always message anyone. A fan
/// messaging the creator gets two free messages per thread; after that
/// they need an active subscription. Fan-to-fan threads are ungated.
pub fn gate_allows(
    sender_is_admin: bool,
    receiver_is_admin: bool,
    sender_subscribed: bool,
    prior_from_sender: usize,
) -> bool {
    if sender_is_admin {
        return true;
    }
    if receiver_is_admin {
        return sender_subscribed || prior_from_sender <= 1;
    }
    true
}

struct Inner {
    conversations: Vec<Conversation>,
    messages: HashMap<ConversationId, Vec<Message>>,
}

pub struct MessageStore {
    inner: Mutex<Inner>,
    storage: Storage,
    wallet: Arc<WalletStore>,
    profiles: Arc<dyn Profiles>,
    notifier: Arc<dyn Notify>,
}

impl MessageStore {
    pub(crate) fn hydrate(
        storage: Storage,
        wallet: Arc<WalletStore>,
        profiles: Arc<dyn Profiles>,
        notifier: Arc<dyn Notify>,
    ) -> anyhow::Result<Self> {
        let conversations = storage.load_or(KEY_CONVERSATIONS, crate::seed::conversations)?;
        let messages = storage.load_or(KEY_MESSAGES, crate::seed::messages)?;
        Ok(Self {
            inner: Mutex::new(Inner {
                conversations,
                messages,
            }),
            storage,
            wallet,
            profiles,
            notifier,
        })
    }

    /// Find the thread between two users, creating an empty one if
    /// this pair has never talked. Participant order does not matter.
    pub fn get_or_create_conversation(&self, a: UserId, b: UserId) -> Result<ConversationId> {
        let mut guard = lock(&self.inner);
        let inner = &mut *guard;
        if let Some(existing) = inner.conversations.iter().find(|c| c.matches_pair(a, b)) {
            return Ok(existing.id);
        }
        let conversation = Conversation::new(a, b);
        let id = conversation.id;
        inner.conversations.push(conversation);
        inner.messages.insert(id, Vec::new());
        self.persist(inner)?;
        debug!(?id, "conversation created");
        Ok(id)
    }

    /// Would the gate let `sender` message `receiver` right now?
    pub fn can_send_message(&self, sender: UserId, receiver: UserId) -> bool {
        let prior = {
            let guard = lock(&self.inner);
            prior_from(&guard, sender, receiver)
        };
        self.gate(sender, receiver, prior)
    }

    /// Append a message to an existing thread and update its summary.
    /// The gate is enforced here, not just in `can_send_message`.
    #[allow(clippy::too_many_arguments)]
    pub fn send_message(
        &self,
        conversation_id: ConversationId,
        sender: UserId,
        receiver: UserId,
        content: &str,
        media: Vec<MediaAttachment>,
        is_ppv: bool,
        price: Cents,
    ) -> Result<Message> {
        if content.trim().is_empty() && media.is_empty() {
            return Err(MessageError::EmptyMessage);
        }
        if is_ppv && !price.is_positive() {
            return Err(MessageError::Domain(DomainError::InvalidAmount));
        }

        let message = {
            let mut guard = lock(&self.inner);
            let inner = &mut *guard;
            let conversation = inner
                .conversations
                .iter_mut()
                .find(|c| c.id == conversation_id)
                .ok_or(MessageError::UnknownConversation)?;

            let prior_from_sender = inner
                .messages
                .get(&conversation_id)
                .map(|thread| thread.iter().filter(|m| m.sender_id == sender).count())
                .unwrap_or(0);
            if !self.gate(sender, receiver, prior_from_sender) {
                return Err(MessageError::NotPermitted);
            }

            let message = Message::new(
                sender,
                receiver,
                content.to_string(),
                media,
                is_ppv,
                if is_ppv { price } else { Cents::ZERO },
            );
            inner
                .messages
                .entry(conversation_id)
                .or_default()
                .push(message.clone());
            conversation.last_message = Some(message.clone());
            conversation.unread_count += 1;
            self.persist(inner)?;
            message
        };

        self.notify_receiver(sender, receiver, conversation_id, message.id);
        debug!(?conversation_id, ppv = is_ppv, "message sent");
        Ok(message)
    }

    /// Flag every message addressed to `reader` as read and clear the
    /// thread's unread counter. Unknown threads are ignored.
    pub fn mark_as_read(&self, conversation_id: ConversationId, reader: UserId) -> Result<()> {
        let mut guard = lock(&self.inner);
        let inner = &mut *guard;
        let conversation = match inner
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
        {
            Some(conversation) => conversation,
            None => {
                debug!(?conversation_id, "read receipt for unknown conversation ignored");
                return Ok(());
            }
        };

        if let Some(thread) = inner.messages.get_mut(&conversation_id) {
            for message in thread.iter_mut().filter(|m| m.receiver_id == reader) {
                message.is_read = true;
            }
        }
        if let Some(last) = conversation.last_message.as_mut() {
            if last.receiver_id == reader {
                last.is_read = true;
            }
        }
        conversation.unread_count = 0;
        self.persist(inner)?;
        Ok(())
    }

    /// Pay for and unlock a pay-per-view message. Free or already
    /// unlocked messages are a no-op and never charge; an unfunded
    /// wallet refuses the whole operation and the message stays locked.
    pub fn unlock_ppv_message(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
        payer: UserId,
    ) -> Result<()> {
        let mut guard = lock(&self.inner);
        let inner = &mut *guard;
        let thread = match inner.messages.get_mut(&conversation_id) {
            Some(thread) => thread,
            None => {
                debug!(?conversation_id, "unlock for unknown conversation ignored");
                return Ok(());
            }
        };
        let position = match thread.iter().position(|m| m.id == message_id) {
            Some(position) => position,
            None => {
                debug!(?message_id, "unlock for unknown message ignored");
                return Ok(());
            }
        };
        if !thread[position].is_ppv || thread[position].is_unlocked {
            return Ok(());
        }

        let price = thread[position].price;
        self.wallet.make_payment(
            payer,
            price,
            "Unlocked pay-per-view message",
            TransactionKind::Payment,
        )?;
        thread[position].is_unlocked = true;
        let updated = thread[position].clone();
        sync_last_message(&mut inner.conversations, conversation_id, &updated);
        self.persist(inner)?;
        info!(%price, ?message_id, "pay-per-view message unlocked");
        Ok(())
    }

    /// Tip the author of a message. The debit and the tip counter move
    /// together; a refused debit leaves the counter untouched.
    pub fn send_tip(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
        tipper: UserId,
        amount: Cents,
    ) -> Result<()> {
        if !amount.is_positive() {
            return Err(MessageError::Domain(DomainError::InvalidAmount));
        }

        let recipient = {
            let mut guard = lock(&self.inner);
            let inner = &mut *guard;
            let thread = match inner.messages.get_mut(&conversation_id) {
                Some(thread) => thread,
                None => {
                    debug!(?conversation_id, "tip for unknown conversation ignored");
                    return Ok(());
                }
            };
            let position = match thread.iter().position(|m| m.id == message_id) {
                Some(position) => position,
                None => {
                    debug!(?message_id, "tip for unknown message ignored");
                    return Ok(());
                }
            };

            let recipient = thread[position].sender_id;
            let recipient_name = self
                .profiles
                .username_of(recipient)
                .unwrap_or_else(|| "the creator".to_string());
            self.wallet.make_payment(
                tipper,
                amount,
                &format!("Tip to {recipient_name}"),
                TransactionKind::Tip,
            )?;
            thread[position].tip_total += amount;
            let updated = thread[position].clone();
            sync_last_message(&mut inner.conversations, conversation_id, &updated);
            self.persist(inner)?;
            recipient
        };

        self.notifier.notify(
            recipient,
            "New Tip",
            &format!("You received a tip of {amount}"),
            NotificationEvent::Tip {
                conversation_id,
                message_id,
                amount,
            },
        );
        info!(%amount, ?message_id, "tip recorded");
        Ok(())
    }

    /// Flip a message's pinned flag. Unknown ids are ignored.
    pub fn toggle_pin_message(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> Result<()> {
        let mut guard = lock(&self.inner);
        let inner = &mut *guard;
        let thread = match inner.messages.get_mut(&conversation_id) {
            Some(thread) => thread,
            None => {
                debug!(?conversation_id, "pin for unknown conversation ignored");
                return Ok(());
            }
        };
        let position = match thread.iter().position(|m| m.id == message_id) {
            Some(position) => position,
            None => {
                debug!(?message_id, "pin for unknown message ignored");
                return Ok(());
            }
        };
        thread[position].is_pinned = !thread[position].is_pinned;
        let updated = thread[position].clone();
        sync_last_message(&mut inner.conversations, conversation_id, &updated);
        self.persist(inner)?;
        Ok(())
    }

    pub fn conversation(&self, id: ConversationId) -> Option<Conversation> {
        lock(&self.inner)
            .conversations
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// Threads involving `user`, most recently active first.
    pub fn conversations_for(&self, user: UserId) -> Vec<Conversation> {
        let guard = lock(&self.inner);
        let mut threads: Vec<Conversation> = guard
            .conversations
            .iter()
            .filter(|c| c.involves(user))
            .cloned()
            .collect();
        threads.sort_by(|a, b| b.last_activity().cmp(&a.last_activity()));
        threads
    }

    pub fn messages_in(&self, conversation_id: ConversationId) -> Vec<Message> {
        lock(&self.inner)
            .messages
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn pinned_messages(&self, conversation_id: ConversationId) -> Vec<Message> {
        lock(&self.inner)
            .messages
            .get(&conversation_id)
            .map(|thread| thread.iter().filter(|m| m.is_pinned).cloned().collect())
            .unwrap_or_default()
    }

    /// Sum of unread counters across the user's threads.
    pub fn unread_total_for(&self, user: UserId) -> u32 {
        lock(&self.inner)
            .conversations
            .iter()
            .filter(|c| c.involves(user))
            .map(|c| c.unread_count)
            .sum()
    }

    fn gate(&self, sender: UserId, receiver: UserId, prior_from_sender: usize) -> bool {
        gate_allows(
            self.profiles.is_admin(sender),
            self.profiles.is_admin(receiver),
            self.profiles.has_active_subscription(sender),
            prior_from_sender,
        )
    }

    fn notify_receiver(
        &self,
        sender: UserId,
        receiver: UserId,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) {
        let event = NotificationEvent::Message {
            conversation_id,
            message_id,
        };
        if self.profiles.is_admin(sender) {
            self.notifier.notify(
                receiver,
                "New Creator Message",
                "The creator sent you a new message",
                event,
            );
        } else {
            let sender_name = self
                .profiles
                .username_of(sender)
                .unwrap_or_else(|| "someone".to_string());
            self.notifier.notify(
                receiver,
                "New Message",
                &format!("You have a new message from {sender_name}"),
                event,
            );
        }
    }

    fn persist(&self, inner: &Inner) -> std::result::Result<(), StorageError> {
        self.storage.save(KEY_CONVERSATIONS, &inner.conversations)?;
        self.storage.save(KEY_MESSAGES, &inner.messages)?;
        Ok(())
    }
}

fn prior_from(inner: &Inner, sender: UserId, receiver: UserId) -> usize {
    inner
        .conversations
        .iter()
        .find(|c| c.matches_pair(sender, receiver))
        .and_then(|c| inner.messages.get(&c.id))
        .map(|thread| thread.iter().filter(|m| m.sender_id == sender).count())
        .unwrap_or(0)
}

fn sync_last_message(
    conversations: &mut [Conversation],
    conversation_id: ConversationId,
    message: &Message,
) {
    if let Some(conversation) = conversations.iter_mut().find(|c| c.id == conversation_id) {
        if conversation
            .last_message
            .as_ref()
            .map(|last| last.id == message.id)
            .unwrap_or(false)
        {
            conversation.last_message = Some(message.clone());
        }
    }
}
