//! Creator posts: feed content, likes, comments, premium purchases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::MediaKind;
use crate::{validate_media_url, Cents, CommentId, PostId, UserId};

/// Media embedded in a feed post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMedia {
    pub kind: MediaKind,
    pub url: String,
}

impl PostMedia {
    pub fn new(kind: MediaKind, url: String) -> crate::Result<Self> {
        validate_media_url(&url)?;
        Ok(Self { kind, url })
    }
}

/// A comment left on a post. The username is denormalized at creation
/// time, matching the persisted feed layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub user_id: UserId,
    pub username: String,
    pub content: String,
    pub commented_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(user_id: UserId, username: String, content: String) -> Self {
        Self {
            id: CommentId::new(),
            user_id,
            username,
            content,
            commented_at: Utc::now(),
        }
    }
}

/// A feed post. Premium posts hide their media behind a one-time unlock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub content: String,
    pub media: Vec<PostMedia>,
    pub is_premium: bool,
    pub price: Cents,
    pub likes: Vec<UserId>,
    pub comments: Vec<Comment>,
    pub purchased_by: Vec<UserId>,
    pub posted_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        author_id: UserId,
        author_name: String,
        author_avatar: Option<String>,
        content: String,
        media: Vec<PostMedia>,
        is_premium: bool,
        price: Cents,
    ) -> Self {
        Self {
            id: PostId::new(),
            author_id,
            author_name,
            author_avatar,
            content,
            media,
            is_premium,
            price,
            likes: Vec::new(),
            comments: Vec::new(),
            purchased_by: Vec::new(),
            posted_at: Utc::now(),
        }
    }

    /// Free posts are visible to everyone; premium posts to the author
    /// and anyone who purchased them.
    pub fn can_view(&self, viewer: UserId) -> bool {
        !self.is_premium || self.author_id == viewer || self.purchased_by.contains(&viewer)
    }

    pub fn liked_by(&self, user: UserId) -> bool {
        self.likes.contains(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn premium_post(author: UserId) -> Post {
        Post::new(
            author,
            "creator".to_string(),
            None,
            "exclusive shoot".to_string(),
            Vec::new(),
            true,
            Cents(999),
        )
    }

    #[test]
    fn free_posts_are_public() {
        let post = Post::new(
            UserId::new(),
            "creator".to_string(),
            None,
            "hello".to_string(),
            Vec::new(),
            false,
            Cents::ZERO,
        );
        assert!(post.can_view(UserId::new()));
    }

    #[test]
    fn premium_posts_gate_viewers() {
        let author = UserId::new();
        let buyer = UserId::new();
        let mut post = premium_post(author);

        assert!(post.can_view(author));
        assert!(!post.can_view(buyer));

        post.purchased_by.push(buyer);
        assert!(post.can_view(buyer));
    }
}
