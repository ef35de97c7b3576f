//! Core forwarding logic: cursor bookkeeping, the delivery engine, and the
//! run driver. All platform I/O goes through the [`client::ChannelClient`]
//! seam so the engine can be exercised without a live messaging backend.

pub mod client;
pub mod cursor;
pub mod driver;
pub mod engine;
pub mod error;
pub mod hook;
pub mod types;

pub use {
    client::ChannelClient,
    cursor::{CursorStore, Cursors},
    driver::{RunDriver, Schedule},
    engine::{DeliveryEngine, PassReport},
    error::{Error, Result},
    hook::ExitHook,
    types::{ChannelHandle, ChannelRef, Media, Message, parse_channel_list},
};
