use std::time::Duration;

use {anyhow::Result, async_trait::async_trait};

/// Fired once after the run driver finishes its schedule.
///
/// The delivery engine knows nothing about this. It exists for hosts that
/// need the process to arrange its own next invocation, e.g. a CI runner
/// with a maximum execution time.
#[async_trait]
pub trait ExitHook: Send + Sync {
    /// Arrange the next run after `delay`. Errors are logged by the driver,
    /// never fatal.
    async fn notify_next_run(&self, delay: Duration) -> Result<()>;
}
