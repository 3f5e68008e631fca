//! Pure helpers for rendering conversation lists. No store access.

use chrono::{DateTime, Duration, Utc};

use creatorhub_domain::message::{MediaKind, Message};

/// One-line summary of a message for thread lists. Locked pay-per-view
/// content never leaks its text.
pub fn message_preview(message: &Message) -> String {
    if message.is_ppv && !message.is_unlocked {
        return "📸 Pay-Per-View content".to_string();
    }

    let content = message.content.trim();
    if !content.is_empty() {
        return if content.chars().count() > 30 {
            let head: String = content.chars().take(30).collect();
            format!("{head}...")
        } else {
            content.to_string()
        };
    }

    match message.media.first().map(|m| m.kind) {
        Some(MediaKind::Image) => "📷 Photo".to_string(),
        Some(MediaKind::Video) => "🎥 Video".to_string(),
        Some(MediaKind::File) => "📎 File".to_string(),
        None => String::new(),
    }
}

/// Coarse human-readable age of a timestamp, switching to a plain date
/// past one week.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    if elapsed < Duration::minutes(1) {
        return "Just now".to_string();
    }
    if elapsed < Duration::hours(1) {
        return format!("{}m ago", elapsed.num_minutes());
    }
    if elapsed < Duration::days(1) {
        return format!("{}h ago", elapsed.num_hours());
    }
    if elapsed < Duration::days(7) {
        return format!("{}d ago", elapsed.num_days());
    }
    then.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use creatorhub_domain::message::MediaAttachment;
    use creatorhub_domain::{Cents, UserId};

    fn text_message(content: &str) -> Message {
        Message::new(
            UserId::new(),
            UserId::new(),
            content.to_string(),
            Vec::new(),
            false,
            Cents::ZERO,
        )
    }

    #[test]
    fn locked_ppv_hides_content() {
        let mut msg = text_message("the secret text");
        msg.is_ppv = true;
        msg.is_unlocked = false;
        assert_eq!(message_preview(&msg), "📸 Pay-Per-View content");

        msg.is_unlocked = true;
        assert_eq!(message_preview(&msg), "the secret text");
    }

    #[test]
    fn long_text_is_truncated() {
        let msg = text_message("a very long message that should be cut off somewhere");
        let preview = message_preview(&msg);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 33);
    }

    #[test]
    fn media_only_messages_show_a_placeholder() {
        let media =
            MediaAttachment::new(MediaKind::Video, "https://cdn.example.com/v.mp4".to_string())
                .unwrap();
        let msg = Message::new(
            UserId::new(),
            UserId::new(),
            String::new(),
            vec![media],
            false,
            Cents::ZERO,
        );
        assert_eq!(message_preview(&msg), "🎥 Video");
    }

    #[test]
    fn relative_time_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();

        assert_eq!(relative_time(now - Duration::seconds(30), now), "Just now");
        assert_eq!(relative_time(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(relative_time(now - Duration::hours(3), now), "3h ago");
        assert_eq!(relative_time(now - Duration::days(2), now), "2d ago");
        assert_eq!(
            relative_time(now - Duration::days(30), now),
            "Apr 20, 2024"
        );
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let now = Utc::now();
        assert_eq!(relative_time(now + Duration::seconds(5), now), "Just now");
    }
}
