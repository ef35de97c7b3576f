mod config;
mod trigger;

use std::sync::Arc;

use {
    anyhow::{Context, Result},
    clap::Parser,
    tracing::info,
    tracing_subscriber::EnvFilter,
};

use {
    tgferry_core::{ChannelClient, CursorStore, DeliveryEngine, RunDriver},
    tgferry_telegram::{TelegramClient, TelegramConfig},
};

use crate::config::{Cli, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let settings = Settings::from_cli(&cli).context("invalid configuration")?;

    let client = TelegramClient::connect(TelegramConfig::new(settings.token.clone()))
        .await
        .context("telegram authentication failed")?;

    // An unresolvable destination makes every delivery pointless, so unlike
    // source channels it is fatal.
    let destination = client
        .resolve(&settings.destination)
        .await
        .context("cannot resolve destination channel")?;
    info!(destination = %destination, sources = settings.sources.len(), "starting");

    let client: Arc<dyn ChannelClient> = Arc::new(client);
    let engine = DeliveryEngine::new(
        client,
        CursorStore::new(&settings.state_file),
        settings.sources.clone(),
        destination.id,
        settings.message_delay,
    );

    let mut driver = RunDriver::new(engine, settings.schedule);
    if let Some(trigger) = &settings.trigger {
        driver = driver.with_exit_hook(
            Arc::new(trigger::GithubDispatchHook::new(
                trigger.token.clone(),
                trigger.repo.clone(),
            )),
            settings.trigger_cooldown,
        );
    }

    let totals = driver.run().await;
    info!(
        forwarded = totals.forwarded,
        copied = totals.copied,
        failed = totals.failed,
        skipped_channels = totals.channels_skipped,
        "run complete"
    );
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
