use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    /// A channel identifier could not be mapped to a live channel.
    #[error("cannot resolve channel {channel}: {reason}")]
    Resolution { channel: String, reason: String },

    /// Listing messages for a channel failed; the channel is skipped for
    /// this pass and its cursor stays untouched.
    #[error("fetching messages for channel {channel_id} failed")]
    Fetch {
        channel_id: i64,
        #[source]
        source: BoxedSource,
    },

    /// A message could not be delivered, including the recreation fallback.
    #[error("message delivery failed")]
    Delivery {
        #[source]
        source: BoxedSource,
    },

    /// The cursor state file could not be written.
    #[error("persisting cursor state failed")]
    Persistence(#[from] std::io::Error),
}

impl Error {
    #[must_use]
    pub fn resolution(channel: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            channel: channel.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn fetch(
        channel_id: i64,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Fetch {
            channel_id,
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn delivery(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery {
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
