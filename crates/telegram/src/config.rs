use secrecy::Secret;

/// Connection settings for the Bot API binding.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub token: Secret<String>,

    /// API root, overridable for tests.
    pub api_root: String,

    /// Long-poll timeout for `getUpdates`, in seconds. 0 drains whatever is
    /// pending without blocking, which is what the pass-driven engine wants.
    pub poll_timeout_secs: u64,
}

impl TelegramConfig {
    pub fn new(token: Secret<String>) -> Self {
        Self {
            token,
            api_root: "https://api.telegram.org".into(),
            poll_timeout_secs: 0,
        }
    }

    #[must_use]
    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into();
        self
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[REDACTED]")
            .field("api_root", &self.api_root)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}
