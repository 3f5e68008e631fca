//! The public feed: creator posts with likes, comments, and premium
//! unlocks.

use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use creatorhub_domain::ledger::TransactionKind;
use creatorhub_domain::post::{Comment, Post, PostMedia};
use creatorhub_domain::{Cents, DomainError, PostId, UserId};

use crate::storage::{Storage, StorageError, KEY_POSTS};
use crate::stores::wallet::{WalletError, WalletStore};
use crate::stores::{lock, Profiles};

#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("unknown post")]
    UnknownPost,
    #[error("unknown user")]
    UnknownUser,
    #[error("post needs text or media")]
    EmptyPost,
    #[error("comment text is required")]
    EmptyComment,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, PostError>;

pub struct PostStore {
    posts: Mutex<Vec<Post>>,
    storage: Storage,
    wallet: Arc<WalletStore>,
    profiles: Arc<dyn Profiles>,
}

impl PostStore {
    pub(crate) fn hydrate(
        storage: Storage,
        wallet: Arc<WalletStore>,
        profiles: Arc<dyn Profiles>,
    ) -> anyhow::Result<Self> {
        let posts = storage.load_or(KEY_POSTS, crate::seed::posts)?;
        Ok(Self {
            posts: Mutex::new(posts),
            storage,
            wallet,
            profiles,
        })
    }

    /// Publish a post at the top of the feed. The author's display name
    /// and avatar are captured at publish time.
    pub fn add_post(
        &self,
        author: UserId,
        content: &str,
        media: Vec<PostMedia>,
        is_premium: bool,
        price: Cents,
    ) -> Result<Post> {
        if content.trim().is_empty() && media.is_empty() {
            return Err(PostError::EmptyPost);
        }
        if is_premium && !price.is_positive() {
            return Err(PostError::Domain(DomainError::InvalidAmount));
        }
        let author_name = self
            .profiles
            .username_of(author)
            .ok_or(PostError::UnknownUser)?;
        let author_avatar = self.profiles.avatar_of(author);

        let post = Post::new(
            author,
            author_name,
            author_avatar,
            content.to_string(),
            media,
            is_premium,
            if is_premium { price } else { Cents::ZERO },
        );
        let mut posts = lock(&self.posts);
        posts.insert(0, post.clone());
        self.persist(&posts)?;
        info!(post = ?post.id, premium = is_premium, "post published");
        Ok(post)
    }

    /// Like or unlike. Returns whether the user likes the post now.
    pub fn toggle_like(&self, post_id: PostId, user: UserId) -> Result<bool> {
        let mut posts = lock(&self.posts);
        let post = Self::find_mut(&mut posts, post_id)?;
        let liked = if post.liked_by(user) {
            post.likes.retain(|id| *id != user);
            false
        } else {
            post.likes.push(user);
            true
        };
        self.persist(&posts)?;
        Ok(liked)
    }

    pub fn add_comment(&self, post_id: PostId, user: UserId, content: &str) -> Result<Comment> {
        if content.trim().is_empty() {
            return Err(PostError::EmptyComment);
        }
        let username = self
            .profiles
            .username_of(user)
            .ok_or(PostError::UnknownUser)?;

        let mut posts = lock(&self.posts);
        let post = Self::find_mut(&mut posts, post_id)?;
        let comment = Comment::new(user, username, content.to_string());
        post.comments.push(comment.clone());
        self.persist(&posts)?;
        debug!(post = ?post_id, "comment added");
        Ok(comment)
    }

    /// Pay for access to a premium post. Free posts and repeat
    /// purchases are no-ops and never charge.
    pub fn purchase_post(&self, post_id: PostId, buyer: UserId) -> Result<()> {
        let mut posts = lock(&self.posts);
        let post = Self::find_mut(&mut posts, post_id)?;
        if !post.is_premium || post.purchased_by.contains(&buyer) {
            return Ok(());
        }

        self.wallet.make_payment(
            buyer,
            post.price,
            "Unlocked premium post",
            TransactionKind::Payment,
        )?;
        post.purchased_by.push(buyer);
        self.persist(&posts)?;
        info!(post = ?post_id, "premium post unlocked");
        Ok(())
    }

    /// The whole feed, newest first.
    pub fn feed(&self) -> Vec<Post> {
        lock(&self.posts).clone()
    }

    pub fn posts_by(&self, author: UserId) -> Vec<Post> {
        lock(&self.posts)
            .iter()
            .filter(|p| p.author_id == author)
            .cloned()
            .collect()
    }

    pub fn post(&self, post_id: PostId) -> Option<Post> {
        lock(&self.posts).iter().find(|p| p.id == post_id).cloned()
    }

    fn find_mut(posts: &mut [Post], post_id: PostId) -> Result<&mut Post> {
        posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or(PostError::UnknownPost)
    }

    fn persist(&self, posts: &[Post]) -> std::result::Result<(), StorageError> {
        self.storage.save(KEY_POSTS, &posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use crate::stores::account::AccountStore;
    use crate::stores::testing::test_config;
    use creatorhub_domain::message::MediaKind;

    struct Fixture {
        accounts: Arc<AccountStore>,
        wallet: Arc<WalletStore>,
        posts: PostStore,
    }

    fn fixture() -> Fixture {
        let storage = Storage::temporary().unwrap();
        let accounts = Arc::new(AccountStore::hydrate(storage.clone(), &test_config()).unwrap());
        let wallet = Arc::new(WalletStore::new(storage.clone(), accounts.clone()));
        let posts = PostStore::hydrate(storage, wallet.clone(), accounts.clone()).unwrap();
        Fixture {
            accounts,
            wallet,
            posts,
        }
    }

    fn seeded_premium_post(fx: &Fixture) -> Post {
        fx.posts
            .feed()
            .into_iter()
            .find(|p| p.is_premium)
            .expect("seed contains a premium post")
    }

    #[test]
    fn new_posts_lead_the_feed() {
        let fx = fixture();
        let admin = seed::admin_id();
        let seeded = fx.posts.feed().len();

        let post = fx
            .posts
            .add_post(admin, "fresh drop", Vec::new(), false, Cents::ZERO)
            .unwrap();

        let feed = fx.posts.feed();
        assert_eq!(feed.len(), seeded + 1);
        assert_eq!(feed[0].id, post.id);
        assert_eq!(feed[0].author_name, "admin");
        assert!(feed[0].author_avatar.is_some());
    }

    #[test]
    fn post_guards_inputs() {
        let fx = fixture();
        let admin = seed::admin_id();

        assert!(matches!(
            fx.posts.add_post(admin, "  ", Vec::new(), false, Cents::ZERO),
            Err(PostError::EmptyPost)
        ));
        assert!(matches!(
            fx.posts.add_post(admin, "pay me", Vec::new(), true, Cents::ZERO),
            Err(PostError::Domain(DomainError::InvalidAmount))
        ));
        assert!(matches!(
            fx.posts
                .add_post(UserId::new(), "ghost", Vec::new(), false, Cents::ZERO),
            Err(PostError::UnknownUser)
        ));

        // Media alone is enough.
        let media =
            PostMedia::new(MediaKind::Image, "https://picsum.photos/800".to_string()).unwrap();
        fx.posts
            .add_post(admin, "", vec![media], false, Cents::ZERO)
            .unwrap();
    }

    #[test]
    fn likes_toggle() {
        let fx = fixture();
        let fan = seed::demo_fan_id();
        let post = seeded_premium_post(&fx);

        assert!(fx.posts.toggle_like(post.id, fan).unwrap());
        assert!(fx.posts.post(post.id).unwrap().liked_by(fan));
        assert!(!fx.posts.toggle_like(post.id, fan).unwrap());
        assert!(!fx.posts.post(post.id).unwrap().liked_by(fan));

        assert!(matches!(
            fx.posts.toggle_like(PostId::new(), fan),
            Err(PostError::UnknownPost)
        ));
    }

    #[test]
    fn comments_carry_the_commenter_name() {
        let fx = fixture();
        let fan = seed::demo_fan_id();
        let post = seeded_premium_post(&fx);

        let comment = fx.posts.add_comment(post.id, fan, "love this").unwrap();
        assert_eq!(comment.username, "user1");

        let stored = fx.posts.post(post.id).unwrap();
        assert!(stored.comments.iter().any(|c| c.id == comment.id));

        assert!(matches!(
            fx.posts.add_comment(post.id, fan, "   "),
            Err(PostError::EmptyComment)
        ));
    }

    #[test]
    fn premium_purchase_is_fused_and_idempotent() {
        let fx = fixture();
        let fan = seed::demo_fan_id();
        let post = seeded_premium_post(&fx);
        assert!(!post.can_view(fan));

        let before = fx.wallet.balance_of(fan).unwrap();
        fx.posts.purchase_post(post.id, fan).unwrap();
        assert_eq!(fx.wallet.balance_of(fan), Some(before - post.price));
        assert!(fx.posts.post(post.id).unwrap().can_view(fan));

        // Repeat purchases do not charge again.
        fx.posts.purchase_post(post.id, fan).unwrap();
        assert_eq!(fx.wallet.balance_of(fan), Some(before - post.price));

        let history = fx.wallet.transactions_for(fan);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].description, "Unlocked premium post");
    }

    #[test]
    fn refused_purchase_grants_nothing() {
        let fx = fixture();
        let broke = fx
            .accounts
            .register("broke", "broke@example.com", "hunter22")
            .unwrap();
        // Starter balance is $50; price the post out of reach.
        let pricey = fx
            .posts
            .add_post(seed::admin_id(), "vault", Vec::new(), true, Cents(99_999))
            .unwrap();

        let err = fx.posts.purchase_post(pricey.id, broke.id).unwrap_err();
        assert!(matches!(
            err,
            PostError::Wallet(WalletError::InsufficientBalance { .. })
        ));
        assert!(!fx.posts.post(pricey.id).unwrap().can_view(broke.id));

        // Free posts are viewable without ever paying.
        let free = fx
            .posts
            .feed()
            .into_iter()
            .find(|p| !p.is_premium)
            .unwrap();
        fx.posts.purchase_post(free.id, broke.id).unwrap();
        assert!(fx.posts.post(free.id).unwrap().can_view(broke.id));
    }

    #[test]
    fn posts_by_filters_author() {
        let fx = fixture();
        let admin = seed::admin_id();
        let seeded = fx.posts.posts_by(admin).len();
        assert!(seeded >= 3);
        assert!(fx.posts.posts_by(seed::demo_fan_id()).is_empty());
    }
}
