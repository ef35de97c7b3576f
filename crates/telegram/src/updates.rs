//! Per-channel buffering of drained `getUpdates` batches.
//!
//! The Bot API redelivers unconfirmed updates, so the buffer tolerates
//! duplicates; true idempotence comes from the engine's cursor diff.

use std::collections::HashMap;

use tgferry_core::Message;

use crate::wire::RawUpdate;

pub(crate) struct UpdateBuffer {
    offset: i64,
    posts: HashMap<i64, Vec<Message>>,
}

impl UpdateBuffer {
    pub(crate) fn new() -> Self {
        Self {
            offset: 0,
            posts: HashMap::new(),
        }
    }

    /// The next `getUpdates` offset; confirms everything absorbed so far.
    pub(crate) fn offset(&self) -> i64 {
        self.offset
    }

    /// Fold a batch of updates into the per-channel buffers. Non-channel
    /// updates still advance the offset so they are not redelivered.
    pub(crate) fn absorb(&mut self, updates: Vec<RawUpdate>) {
        for update in updates {
            self.offset = self.offset.max(update.update_id + 1);
            let Some(post) = update.channel_post else {
                continue;
            };
            let chat_id = post.chat.id;
            let message = post.into_message();
            let entry = self.posts.entry(chat_id).or_default();
            // Updates arrive in order; the insert keeps ascending id order
            // even when a redelivered batch overlaps.
            match entry.binary_search_by_key(&message.id, |m| m.id) {
                Ok(_) => {},
                Err(pos) => entry.insert(pos, message),
            }
        }
    }

    /// Remove and return this channel's buffered messages with id strictly
    /// greater than `min_id`, ascending. Older buffered messages are
    /// discarded.
    pub(crate) fn drain_after(&mut self, chat_id: i64, min_id: i64) -> Vec<Message> {
        match self.posts.remove(&chat_id) {
            Some(messages) => messages.into_iter().filter(|m| m.id > min_id).collect(),
            None => Vec::new(),
        }
    }

    /// The newest buffered message for a channel, left in place.
    pub(crate) fn newest(&self, chat_id: i64) -> Option<Message> {
        self.posts.get(&chat_id).and_then(|m| m.last().cloned())
    }
}
