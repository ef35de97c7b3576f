//! The delivery engine: cursor-diffed, idempotent forwarding of channel
//! messages into a single destination, with a content-recreation fallback
//! when direct forwarding is refused.

use std::{sync::Arc, time::Duration};

use tracing::{debug, error, info, warn};

use crate::{
    client::ChannelClient,
    cursor::{CursorStore, Cursors},
    error::Result,
    types::{ChannelHandle, ChannelRef, Media, Message},
};

/// Counters for one pass over all source channels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    pub channels_checked: usize,
    pub channels_skipped: usize,
    pub forwarded: usize,
    pub copied: usize,
    pub failed: usize,
    pub skipped: usize,
    pub baselined: usize,
}

impl PassReport {
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.forwarded + self.copied
    }

    pub fn merge(&mut self, other: &PassReport) {
        self.channels_checked += other.channels_checked;
        self.channels_skipped += other.channels_skipped;
        self.forwarded += other.forwarded;
        self.copied += other.copied;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.baselined += other.baselined;
    }
}

enum Outcome {
    Forwarded,
    Copied,
    SkippedEmpty,
}

pub struct DeliveryEngine {
    client: Arc<dyn ChannelClient>,
    store: CursorStore,
    sources: Vec<ChannelRef>,
    destination: i64,
    message_delay: Duration,
}

impl DeliveryEngine {
    pub fn new(
        client: Arc<dyn ChannelClient>,
        store: CursorStore,
        sources: Vec<ChannelRef>,
        destination: i64,
        message_delay: Duration,
    ) -> Self {
        Self {
            client,
            store,
            sources,
            destination,
            message_delay,
        }
    }

    pub async fn load_cursors(&self) -> Cursors {
        self.store.load().await
    }

    pub async fn save_cursors(&self, cursors: &Cursors) -> Result<()> {
        self.store.save(cursors).await
    }

    /// One pass over all source channels, in configured order. Per-channel
    /// errors are logged and skipped; cursors are persisted after every
    /// channel so a mid-run crash loses at most one channel's progress.
    pub async fn run_pass(&self, cursors: &mut Cursors) -> PassReport {
        let mut report = PassReport::default();
        for source in &self.sources {
            match self.process_channel(source, cursors, &mut report).await {
                Ok(true) => {
                    if let Err(e) = self.store.save(cursors).await {
                        error!(
                            error = %e,
                            "cursor state not persisted; next run may forward duplicates"
                        );
                    }
                },
                Ok(false) => {},
                Err(e) => {
                    warn!(channel = %source, error = %e, "channel skipped this pass");
                    report.channels_skipped += 1;
                },
            }
        }
        report
    }

    /// Process a single channel; returns whether its cursor moved.
    async fn process_channel(
        &self,
        source: &ChannelRef,
        cursors: &mut Cursors,
        report: &mut PassReport,
    ) -> Result<bool> {
        let handle = self.client.resolve(source).await?;
        report.channels_checked += 1;
        let last_seen = cursors.get(handle.id);

        if last_seen == 0 {
            // First observation: baseline to the newest message so the
            // destination is not flooded with the channel's entire backlog.
            return match self.client.latest_message(&handle).await? {
                Some(newest) => {
                    cursors.advance(handle.id, newest.id);
                    report.baselined += 1;
                    info!(
                        channel = %handle,
                        message_id = newest.id,
                        "baseline set, backlog not forwarded"
                    );
                    Ok(true)
                },
                None => {
                    debug!(channel = %handle, "channel has no messages yet");
                    Ok(false)
                },
            };
        }

        let mut pending = self.client.messages_after(&handle, last_seen).await?;
        // Destination order must match source chronology.
        pending.sort_by_key(|m| m.id);

        if pending.is_empty() {
            debug!(channel = %handle, "no new messages");
            return Ok(false);
        }
        info!(channel = %handle, count = pending.len(), "new messages");

        for message in &pending {
            match self.deliver(&handle, message).await {
                Ok(Outcome::Forwarded) => report.forwarded += 1,
                Ok(Outcome::Copied) => report.copied += 1,
                Ok(Outcome::SkippedEmpty) => report.skipped += 1,
                Err(e) => {
                    // Poison messages are skipped, not retried: the cursor
                    // advances regardless so one broken message cannot stall
                    // the channel forever.
                    warn!(
                        channel = %handle,
                        message_id = message.id,
                        error = %e,
                        "message dropped after failed delivery"
                    );
                    report.failed += 1;
                },
            }
            cursors.advance(handle.id, message.id);
            if !self.message_delay.is_zero() {
                tokio::time::sleep(self.message_delay).await;
            }
        }
        Ok(true)
    }

    async fn deliver(&self, from: &ChannelHandle, message: &Message) -> Result<Outcome> {
        if message.is_empty() {
            debug!(channel = %from, message_id = message.id, "skipping empty message");
            return Ok(Outcome::SkippedEmpty);
        }

        match self.client.forward(self.destination, from, message).await {
            Ok(()) => {
                debug!(channel = %from, message_id = message.id, "forwarded");
                Ok(Outcome::Forwarded)
            },
            Err(e) => {
                debug!(
                    channel = %from,
                    message_id = message.id,
                    error = %e,
                    "direct forward refused, recreating content"
                );
                self.recreate(from, message).await?;
                Ok(Outcome::Copied)
            },
        }
    }

    /// Re-publish the message's visible content as a fresh message.
    async fn recreate(&self, from: &ChannelHandle, message: &Message) -> Result<()> {
        let text = message.text.as_deref().unwrap_or_default();
        match &message.media {
            Some(media @ (Media::Photo { .. } | Media::Document { .. })) => {
                let caption = (!text.is_empty()).then_some(text);
                self.client.send_media(self.destination, media, caption).await
            },
            Some(Media::WebPage { url }) => {
                let mut body = text.to_string();
                if !url.is_empty() && !body.contains(url.as_str()) {
                    if !body.is_empty() {
                        body.push_str("\n\n");
                    }
                    body.push_str(url);
                }
                self.client.send_text(self.destination, &body).await
            },
            Some(Media::Other { kind }) => {
                let body = if text.is_empty() {
                    format!("[unsupported {kind} message from {}]", from.title)
                } else {
                    text.to_string()
                };
                self.client.send_text(self.destination, &body).await
            },
            None => self.client.send_text(self.destination, text).await,
        }
    }
}
