//! Environment-sourced runtime configuration.
//!
//! Every option is a flag with an environment fallback, so deployments set
//! variables and local runs can override on the command line. The parsed
//! [`Settings`] value is constructed once at startup and handed to the run
//! driver; nothing reads the environment after that.

use std::{path::PathBuf, time::Duration};

use {
    anyhow::{Result, bail},
    clap::Parser,
    secrecy::Secret,
};

use tgferry_core::{ChannelRef, Schedule, parse_channel_list};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// One pass over all channels, then exit.
    Once,
    /// Repeat passes until the runtime budget is spent.
    Loop,
}

#[derive(Debug, Parser)]
#[command(
    name = "tgferry",
    about = "Forward new posts from source Telegram channels to one destination"
)]
pub struct Cli {
    /// Bot API token.
    #[arg(long, env = "TGFERRY_BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,

    /// Comma-separated source channel ids or @handles.
    #[arg(long, env = "TGFERRY_SOURCE_CHANNELS", allow_hyphen_values = true)]
    pub sources: String,

    /// Destination channel id or @handle.
    #[arg(long, env = "TGFERRY_DESTINATION", allow_hyphen_values = true)]
    pub destination: String,

    /// Path of the JSON cursor state file.
    #[arg(long, env = "TGFERRY_STATE_FILE", default_value = "last_message_ids.json")]
    pub state_file: PathBuf,

    /// Scheduling mode.
    #[arg(long, env = "TGFERRY_MODE", value_enum, default_value = "once")]
    pub mode: Mode,

    /// Wall-clock budget for loop mode, in seconds.
    #[arg(long, env = "TGFERRY_MAX_RUNTIME_SECS", default_value_t = 300)]
    pub max_runtime_secs: u64,

    /// Sleep between passes in loop mode, in seconds.
    #[arg(long, env = "TGFERRY_POLL_INTERVAL_SECS", default_value_t = 30)]
    pub poll_interval_secs: u64,

    /// Courtesy delay between message deliveries, in milliseconds.
    #[arg(long, env = "TGFERRY_MESSAGE_DELAY_MS", default_value_t = 2000)]
    pub message_delay_ms: u64,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "TGFERRY_LOG", default_value = "info")]
    pub log_level: String,

    /// Token used to dispatch the next run (enables the exit hook).
    #[arg(long, env = "TGFERRY_TRIGGER_TOKEN", hide_env_values = true)]
    pub trigger_token: Option<String>,

    /// `owner/repo` that receives the repository_dispatch event.
    #[arg(long, env = "TGFERRY_TRIGGER_REPO")]
    pub trigger_repo: Option<String>,

    /// Cooldown before the next run is dispatched, in seconds.
    #[arg(long, env = "TGFERRY_TRIGGER_COOLDOWN_SECS", default_value_t = 60)]
    pub trigger_cooldown_secs: u64,
}

/// Self-chaining trigger credentials; only present when both halves are set.
pub struct TriggerSettings {
    pub token: Secret<String>,
    pub repo: String,
}

/// Validated runtime configuration.
pub struct Settings {
    pub token: Secret<String>,
    pub sources: Vec<ChannelRef>,
    pub destination: ChannelRef,
    pub state_file: PathBuf,
    pub schedule: Schedule,
    pub message_delay: Duration,
    pub trigger: Option<TriggerSettings>,
    pub trigger_cooldown: Duration,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        if cli.bot_token.trim().is_empty() {
            bail!("bot token is empty");
        }

        let sources = parse_channel_list(&cli.sources);
        if sources.is_empty() {
            bail!("no source channels configured");
        }

        let destination = cli
            .destination
            .parse::<ChannelRef>()
            .map_err(|e| anyhow::anyhow!("invalid destination channel: {e}"))?;

        let schedule = match cli.mode {
            Mode::Once => Schedule::Once,
            Mode::Loop => Schedule::UntilDeadline {
                max_runtime: Duration::from_secs(cli.max_runtime_secs),
                interval: Duration::from_secs(cli.poll_interval_secs),
            },
        };

        let trigger = match (&cli.trigger_token, &cli.trigger_repo) {
            (Some(token), Some(repo)) => Some(TriggerSettings {
                token: Secret::new(token.clone()),
                repo: repo.clone(),
            }),
            (None, None) => None,
            _ => bail!("trigger token and trigger repo must be set together"),
        };

        Ok(Self {
            token: Secret::new(cli.bot_token.clone()),
            sources,
            destination,
            state_file: cli.state_file.clone(),
            schedule,
            message_delay: Duration::from_millis(cli.message_delay_ms),
            trigger,
            trigger_cooldown: Duration::from_secs(cli.trigger_cooldown_secs),
        })
    }
}
