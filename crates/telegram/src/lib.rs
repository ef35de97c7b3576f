//! Telegram Bot API binding for tgferry.
//!
//! Implements the core [`ChannelClient`](tgferry_core::ChannelClient) seam
//! over plain HTTPS JSON calls. New channel posts are drained from
//! `getUpdates` into per-channel buffers, which the engine reads through its
//! cursor diff.

pub mod api;
pub mod client;
pub mod config;
mod updates;
mod wire;

pub use {
    api::{ApiError, BotApi},
    client::TelegramClient,
    config::TelegramConfig,
};
