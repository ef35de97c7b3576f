//! Channel and message types shared across the engine and platform bindings.

use std::{fmt, str::FromStr};

/// A human-provided channel identifier: a numeric id or a public handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChannelRef {
    Id(i64),
    Handle(String),
}

impl FromStr for ChannelRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('@');
        if s.is_empty() {
            return Err("empty channel identifier".into());
        }
        match s.parse::<i64>() {
            Ok(id) => Ok(Self::Id(id)),
            Err(_) => Ok(Self::Handle(s.to_string())),
        }
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Handle(handle) => write!(f, "@{handle}"),
        }
    }
}

/// Parse a comma-separated channel list, skipping empty entries.
pub fn parse_channel_list(raw: &str) -> Vec<ChannelRef> {
    raw.split(',')
        .filter_map(|entry| entry.parse::<ChannelRef>().ok())
        .collect()
}

/// A resolved channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHandle {
    pub id: i64,
    pub title: String,
}

impl fmt::Display for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.id)
    }
}

/// Media attached to a message, reduced to what delivery needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Media {
    Photo { file_id: String },
    Document { file_id: String },
    /// A link-preview-only message; `url` is the previewed address.
    WebPage { url: String },
    /// Any media kind the fallback cannot recreate (video, voice, ...).
    Other { kind: String },
}

/// A single channel message. `text` carries the caption for media messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: i64,
    pub text: Option<String>,
    pub media: Option<Media>,
}

impl Message {
    /// True when the message carries neither text nor media. Such messages
    /// are skipped but still advance the cursor.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().is_none_or(str::is_empty) && self.media.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_ids_and_handles() {
        assert_eq!("-1001234".parse::<ChannelRef>().unwrap(), ChannelRef::Id(-1001234));
        assert_eq!(
            "@somechannel".parse::<ChannelRef>().unwrap(),
            ChannelRef::Handle("somechannel".into())
        );
        assert_eq!(
            " news_feed ".parse::<ChannelRef>().unwrap(),
            ChannelRef::Handle("news_feed".into())
        );
        assert!("".parse::<ChannelRef>().is_err());
    }

    #[test]
    fn channel_list_skips_empty_entries() {
        let list = parse_channel_list("-1001, @alpha, ,beta,");
        assert_eq!(
            list,
            vec![
                ChannelRef::Id(-1001),
                ChannelRef::Handle("alpha".into()),
                ChannelRef::Handle("beta".into()),
            ]
        );
    }

    #[test]
    fn empty_message_detection() {
        let empty = Message { id: 1, text: None, media: None };
        assert!(empty.is_empty());
        let blank = Message { id: 2, text: Some(String::new()), media: None };
        assert!(blank.is_empty());
        let media_only = Message {
            id: 3,
            text: None,
            media: Some(Media::Photo { file_id: "f".into() }),
        };
        assert!(!media_only.is_empty());
    }
}
