//! The seam to the messaging platform.
//!
//! The engine only ever talks to this trait; the Telegram binding lives in
//! `tgferry-telegram` and tests use an in-memory implementation.

use async_trait::async_trait;

use crate::{
    error::Result,
    types::{ChannelHandle, ChannelRef, Media, Message},
};

#[async_trait]
pub trait ChannelClient: Send + Sync {
    /// Map an identifier to a live channel. Fails with
    /// [`Error::Resolution`](crate::Error::Resolution) for unknown handles,
    /// deleted channels, or channels the account cannot access.
    async fn resolve(&self, channel: &ChannelRef) -> Result<ChannelHandle>;

    /// The single most recent message of a channel, if any. Used to set the
    /// first-run baseline without touching the backlog.
    async fn latest_message(&self, channel: &ChannelHandle) -> Result<Option<Message>>;

    /// All messages with id strictly greater than `min_id`, oldest first.
    async fn messages_after(&self, channel: &ChannelHandle, min_id: i64) -> Result<Vec<Message>>;

    /// Re-broadcast by reference, preserving platform forwarding metadata.
    async fn forward(&self, dest: i64, from: &ChannelHandle, message: &Message) -> Result<()>;

    async fn send_text(&self, dest: i64, text: &str) -> Result<()>;

    /// Re-upload media with an optional caption.
    async fn send_media(&self, dest: i64, media: &Media, caption: Option<&str>) -> Result<()>;
}
