//! Demo dataset written on first open, or again for any collection
//! whose stored snapshot cannot be decoded.
//!
//! Entity ids are fixed so collections seeded at different times still
//! reference each other correctly.

use chrono::{Duration, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use creatorhub_domain::message::{Conversation, MediaKind, Message};
use creatorhub_domain::plan::{SubscriptionPeriod, SubscriptionPlan};
use creatorhub_domain::post::{Comment, Post, PostMedia};
use creatorhub_domain::user::User;
use creatorhub_domain::{
    Cents, CommentId, ConversationId, MessageId, PlanId, PostId, UserId,
};

use crate::config::EngineConfig;
use crate::stores::account::{avatar_url, hash_password, AccountError};

pub fn admin_id() -> UserId {
    UserId(Uuid::from_u128(0x01))
}

pub fn demo_fan_id() -> UserId {
    UserId(Uuid::from_u128(0x02))
}

pub fn welcome_conversation_id() -> ConversationId {
    ConversationId(Uuid::from_u128(0x101))
}

fn welcome_message_id() -> MessageId {
    MessageId(Uuid::from_u128(0x201))
}

fn teaser_message_id() -> MessageId {
    MessageId(Uuid::from_u128(0x202))
}

pub fn weekly_plan_id() -> PlanId {
    PlanId(Uuid::from_u128(0x401))
}

pub fn monthly_plan_id() -> PlanId {
    PlanId(Uuid::from_u128(0x402))
}

pub fn yearly_plan_id() -> PlanId {
    PlanId(Uuid::from_u128(0x403))
}

/// The creator account plus one demo fan. The creator's credentials
/// come from the engine configuration.
pub(crate) fn users(config: &EngineConfig) -> Result<Vec<User>, AccountError> {
    let now = Utc::now();

    let admin = User {
        id: admin_id(),
        username: "admin".to_string(),
        email: config.admin_email.clone(),
        password_hash: hash_password(&config.admin_password)?,
        is_admin: true,
        is_verified: true,
        balance: Cents(100_000),
        avatar: Some(avatar_url("admin")),
        name: None,
        bio: Some("Platform administrator and content creator.".to_string()),
        subscription: None,
        notifications: Vec::new(),
        created_at: now,
    };

    let fan = User {
        id: demo_fan_id(),
        username: "user1".to_string(),
        email: "user1@example.com".to_string(),
        password_hash: hash_password("password123")?,
        is_admin: false,
        is_verified: false,
        balance: Cents(10_000),
        avatar: Some(avatar_url("user1")),
        name: None,
        bio: None,
        subscription: None,
        notifications: Vec::new(),
        created_at: now,
    };

    Ok(vec![admin, fan])
}

fn welcome_message() -> Message {
    Message {
        id: welcome_message_id(),
        sender_id: admin_id(),
        receiver_id: demo_fan_id(),
        content: "Welcome to my page! Thanks for subscribing.".to_string(),
        media: Vec::new(),
        is_ppv: false,
        price: Cents::ZERO,
        is_read: true,
        is_unlocked: true,
        is_pinned: false,
        tip_total: Cents::ZERO,
        sent_at: Utc::now() - Duration::hours(1),
    }
}

fn teaser_message() -> Message {
    Message {
        id: teaser_message_id(),
        sender_id: admin_id(),
        receiver_id: demo_fan_id(),
        content: "Here's some exclusive content just for you!".to_string(),
        media: Vec::new(),
        is_ppv: true,
        price: Cents(500),
        is_read: false,
        is_unlocked: false,
        is_pinned: false,
        tip_total: Cents::ZERO,
        sent_at: Utc::now() - Duration::minutes(30),
    }
}

/// One thread between the creator and the demo fan, with the locked
/// teaser still unread.
pub(crate) fn conversations() -> Vec<Conversation> {
    vec![Conversation {
        id: welcome_conversation_id(),
        participants: [admin_id(), demo_fan_id()],
        last_message: Some(teaser_message()),
        unread_count: 1,
        created_at: Utc::now() - Duration::hours(1),
    }]
}

pub(crate) fn messages() -> HashMap<ConversationId, Vec<Message>> {
    let mut map = HashMap::new();
    map.insert(
        welcome_conversation_id(),
        vec![welcome_message(), teaser_message()],
    );
    map
}

pub(crate) fn plans() -> Vec<SubscriptionPlan> {
    vec![
        SubscriptionPlan {
            id: weekly_plan_id(),
            name: "Weekly Pass".to_string(),
            period: SubscriptionPeriod::Weekly,
            price: Cents(499),
            features: vec![
                "Unlimited creator messaging".to_string(),
                "Access to subscriber posts".to_string(),
                "Cancel anytime".to_string(),
            ],
        },
        SubscriptionPlan {
            id: monthly_plan_id(),
            name: "Monthly VIP".to_string(),
            period: SubscriptionPeriod::Monthly,
            price: Cents(1_499),
            features: vec![
                "Everything in Weekly Pass".to_string(),
                "Priority replies".to_string(),
                "Monthly exclusive drop".to_string(),
            ],
        },
        SubscriptionPlan {
            id: yearly_plan_id(),
            name: "Yearly Premium".to_string(),
            period: SubscriptionPeriod::Yearly,
            price: Cents(14_999),
            features: vec![
                "Everything in Monthly VIP".to_string(),
                "Two months free".to_string(),
                "Behind-the-scenes archive".to_string(),
            ],
        },
    ]
}

/// Three creator posts, newest first, one of them premium.
pub(crate) fn posts() -> Vec<Post> {
    let now = Utc::now();
    let avatar = Some(avatar_url("admin"));

    let shoot = Post {
        id: PostId(Uuid::from_u128(0x301)),
        author_id: admin_id(),
        author_name: "admin".to_string(),
        author_avatar: avatar.clone(),
        content: "Exclusive behind-the-scenes from this week's shoot 📸".to_string(),
        media: vec![PostMedia {
            kind: MediaKind::Image,
            url: "https://picsum.photos/seed/creatorhub-shoot/800/600".to_string(),
        }],
        is_premium: true,
        price: Cents(999),
        likes: Vec::new(),
        comments: Vec::new(),
        purchased_by: Vec::new(),
        posted_at: now - Duration::days(2),
    };

    let preview = Post {
        id: PostId(Uuid::from_u128(0x302)),
        author_id: admin_id(),
        author_name: "admin".to_string(),
        author_avatar: avatar.clone(),
        content: "New workout routine drops Friday. Here's a quick preview!".to_string(),
        media: vec![PostMedia {
            kind: MediaKind::Video,
            url: "https://cdn.creatorhub.app/previews/workout-teaser.mp4".to_string(),
        }],
        is_premium: false,
        price: Cents::ZERO,
        likes: Vec::new(),
        comments: Vec::new(),
        purchased_by: Vec::new(),
        posted_at: now - Duration::days(5),
    };

    let hello = Post {
        id: PostId(Uuid::from_u128(0x303)),
        author_id: admin_id(),
        author_name: "admin".to_string(),
        author_avatar: avatar,
        content: "Welcome to my page! New content every week.".to_string(),
        media: vec![PostMedia {
            kind: MediaKind::Image,
            url: "https://picsum.photos/seed/creatorhub-welcome/800/600".to_string(),
        }],
        is_premium: false,
        price: Cents::ZERO,
        likes: vec![demo_fan_id()],
        comments: vec![Comment {
            id: CommentId(Uuid::from_u128(0x501)),
            user_id: demo_fan_id(),
            username: "user1".to_string(),
            content: "Love your content!".to_string(),
            commented_at: now - Duration::days(6),
        }],
        purchased_by: Vec::new(),
        posted_at: now - Duration::days(7),
    };

    vec![shoot, preview, hello]
}
