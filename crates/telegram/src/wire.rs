//! Wire types for the slice of the Bot API this binding consumes.

use {serde::Deserialize, serde_json::Value};

use tgferry_core::{Media, Message};

#[derive(Debug, Deserialize)]
pub(crate) struct RawUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub channel_post: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawChat {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPhotoSize {
    pub file_id: String,
    #[serde(default)]
    pub width: i64,
    #[serde(default)]
    pub height: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawDocument {
    pub file_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLinkPreview {
    #[serde(default)]
    pub url: Option<String>,
}

/// A channel post, reduced to the fields delivery cares about. Media kinds
/// beyond photo and document are only detected, never downloaded.
#[derive(Debug, Deserialize)]
pub(crate) struct RawMessage {
    pub message_id: i64,
    pub chat: RawChat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub photo: Option<Vec<RawPhotoSize>>,
    #[serde(default)]
    pub document: Option<RawDocument>,
    #[serde(default)]
    pub link_preview_options: Option<RawLinkPreview>,
    #[serde(default)]
    pub video: Option<Value>,
    #[serde(default)]
    pub audio: Option<Value>,
    #[serde(default)]
    pub voice: Option<Value>,
    #[serde(default)]
    pub video_note: Option<Value>,
    #[serde(default)]
    pub sticker: Option<Value>,
}

impl RawMessage {
    pub(crate) fn into_message(self) -> Message {
        let RawMessage {
            message_id,
            chat: _,
            text,
            caption,
            photo,
            document,
            link_preview_options,
            video,
            audio,
            voice,
            video_note,
            sticker,
        } = self;

        let media = if let Some(sizes) = photo {
            // Telegram sends every thumbnail size; keep the largest.
            sizes
                .into_iter()
                .max_by_key(|s| s.width * s.height)
                .map(|s| Media::Photo { file_id: s.file_id })
        } else if let Some(doc) = document {
            Some(Media::Document { file_id: doc.file_id })
        } else if let Some(url) = link_preview_options.and_then(|p| p.url) {
            Some(Media::WebPage { url })
        } else {
            [
                ("video", video.is_some()),
                ("audio", audio.is_some()),
                ("voice", voice.is_some()),
                ("video_note", video_note.is_some()),
                ("sticker", sticker.is_some()),
            ]
            .into_iter()
            .find_map(|(kind, present)| present.then(|| Media::Other { kind: kind.into() }))
        };

        Message {
            id: message_id,
            text: text.or(caption),
            media,
        }
    }
}
