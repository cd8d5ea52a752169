use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tera::Tera;

use crate::message::{Message, MessageId};

pub const WELCOME_TITLE: &str = "Добро пожаловать в КулиЧат!";
pub const WELCOME_TEXT: &str = "Здесь вы можете общаться анонимно";

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttachmentView {
    /// Shown inline, enlarged on click.
    Image { src: String, alt: String },
    Download {
        href: String,
        file_name: String,
        label: String,
    },
}

/// Everything needed to draw one message, detached from any output medium.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageView {
    pub id: MessageId,
    pub attachment: Option<AttachmentView>,
    pub text: Option<String>,
    pub timestamp: String,
}

impl MessageView {
    pub fn from_message<Tz: TimeZone>(msg: &Message, now: &DateTime<Tz>) -> MessageView
    where
        Tz::Offset: fmt::Display,
    {
        let attachment = msg.file.as_ref().map(|file| {
            if file.is_image() {
                AttachmentView::Image {
                    src: file.data.clone(),
                    alt: file.name.clone(),
                }
            } else {
                AttachmentView::Download {
                    href: file.data.clone(),
                    file_name: file.name.clone(),
                    label: format!("📎 {}", file.name),
                }
            }
        });
        MessageView {
            id: msg.id,
            attachment,
            text: msg.text.clone().filter(|t| !t.is_empty()),
            timestamp: format_timestamp(&msg.timestamp, now),
        }
    }
}

impl fmt::Display for MessageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.timestamp)?;
        match &self.attachment {
            Some(AttachmentView::Image { alt, .. }) => write!(f, " 🖼 {}", alt)?,
            Some(AttachmentView::Download { label, .. }) => write!(f, " {}", label)?,
            None => {}
        }
        if let Some(text) = &self.text {
            write!(f, " {}", text)?;
        }
        Ok(())
    }
}

pub fn render_all<Tz: TimeZone>(messages: &[Message], now: &DateTime<Tz>) -> Vec<MessageView>
where
    Tz::Offset: fmt::Display,
{
    messages
        .iter()
        .map(|m| MessageView::from_message(m, now))
        .collect()
}

/// Time of day for messages younger than a day, full date and time otherwise,
/// both in the viewer's time zone.
pub fn format_timestamp<Tz: TimeZone>(timestamp: &DateTime<Utc>, now: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    let local = timestamp.with_timezone(&now.timezone());
    let age = now.timestamp_millis() - timestamp.timestamp_millis();
    if age < DAY_MILLIS {
        local.format("%H:%M").to_string()
    } else {
        local.format("%d.%m.%Y, %H:%M").to_string()
    }
}

/// Icon used to preview a non-image file before it is sent.
pub fn attachment_icon(mime_type: &str) -> &'static str {
    if mime_type.starts_with("image/") {
        "🖼"
    } else if mime_type.starts_with("video/") {
        "🎥"
    } else if mime_type.starts_with("audio/") {
        "🎵"
    } else if mime_type.contains("pdf") {
        "📄"
    } else if mime_type.contains("doc") {
        "📝"
    } else {
        "📎"
    }
}

pub fn render_page(tera: &Tera, views: &[MessageView]) -> tera::Result<String> {
    let mut context = tera::Context::new();
    context.insert("messages", views);
    context.insert("welcome_title", WELCOME_TITLE);
    context.insert("welcome_text", WELCOME_TEXT);
    tera.render("index.html", &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Attachment;
    use chrono::FixedOffset;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn message(text: Option<&str>, file: Option<Attachment>) -> Message {
        Message {
            id: 7,
            text: text.map(str::to_string),
            timestamp: utc("2024-03-10T12:30:00Z"),
            file,
        }
    }

    fn templates() -> Tera {
        Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/*.html")).unwrap()
    }

    #[test]
    fn recent_messages_show_time_of_day() {
        let now = utc("2024-03-10T18:00:00Z");
        assert_eq!(format_timestamp(&utc("2024-03-10T12:30:00Z"), &now), "12:30");
        assert_eq!(format_timestamp(&utc("2024-03-09T18:00:01Z"), &now), "18:00");
    }

    #[test]
    fn old_messages_show_full_date() {
        let now = utc("2024-03-10T18:00:00Z");
        assert_eq!(
            format_timestamp(&utc("2024-03-09T18:00:00Z"), &now),
            "09.03.2024, 18:00"
        );
    }

    #[test]
    fn timestamps_follow_viewer_zone() {
        let moscow = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = utc("2024-03-10T18:00:00Z").with_timezone(&moscow);
        assert_eq!(format_timestamp(&utc("2024-03-10T12:30:00Z"), &now), "15:30");
    }

    #[test]
    fn text_only_message() {
        let now = utc("2024-03-10T13:00:00Z");
        let view = MessageView::from_message(&message(Some("Hello"), None), &now);
        assert_eq!(view.attachment, None);
        assert_eq!(view.text.as_deref(), Some("Hello"));
        assert_eq!(view.to_string(), "[12:30] Hello");
    }

    #[test]
    fn image_attachment_is_inline() {
        let now = utc("2024-03-10T13:00:00Z");
        let file = Attachment::from_bytes("cat.png", "image/png", b"png");
        let view = MessageView::from_message(&message(None, Some(file.clone())), &now);
        assert_eq!(
            view.attachment,
            Some(AttachmentView::Image {
                src: file.data,
                alt: "cat.png".to_string()
            })
        );
        assert_eq!(view.text, None);
        assert_eq!(view.to_string(), "[12:30] 🖼 cat.png");
    }

    #[test]
    fn other_attachment_is_a_download() {
        let now = utc("2024-03-10T13:00:00Z");
        let file = Attachment::from_bytes("notes.pdf", "application/pdf", b"%PDF");
        let view = MessageView::from_message(&message(Some("see"), Some(file)), &now);
        match view.attachment {
            Some(AttachmentView::Download {
                ref file_name,
                ref label,
                ..
            }) => {
                assert_eq!(file_name, "notes.pdf");
                assert_eq!(label, "📎 notes.pdf");
            }
            ref other => panic!("unexpected attachment {:?}", other),
        }
        assert_eq!(view.to_string(), "[12:30] 📎 notes.pdf see");
    }

    #[test]
    fn preview_icons() {
        assert_eq!(attachment_icon("video/mp4"), "🎥");
        assert_eq!(attachment_icon("audio/ogg"), "🎵");
        assert_eq!(attachment_icon("application/pdf"), "📄");
        assert_eq!(attachment_icon("application/msword"), "📝");
        assert_eq!(attachment_icon("application/zip"), "📎");
    }

    #[test]
    fn page_shows_welcome_when_empty() {
        let html = render_page(&templates(), &[]).unwrap();
        assert!(html.contains(WELCOME_TITLE));
    }

    #[test]
    fn page_escapes_message_text() {
        let now = utc("2024-03-10T13:00:00Z");
        let views = render_all(&[message(Some("<b>hi</b>"), None)], &now);
        let html = render_page(&templates(), &views).unwrap();
        assert!(html.contains("&lt;b&gt;hi"));
        assert!(!html.contains("<b>hi"));
        assert!(!html.contains(WELCOME_TITLE));
    }
}
