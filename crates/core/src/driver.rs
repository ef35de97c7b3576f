//! Run orchestration: a single pass, a deadline-bounded loop, and the
//! optional on-exit trigger hook. The channel-processing logic itself lives
//! entirely in [`DeliveryEngine`]; this module only decides how often it
//! runs.

use std::{sync::Arc, time::Duration};

use {
    tokio::time::{self, Instant},
    tracing::{error, info, warn},
};

use crate::{
    engine::{DeliveryEngine, PassReport},
    hook::ExitHook,
};

/// Scheduling policy for the delivery engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// One pass over all channels, then exit.
    Once,
    /// Repeat passes until the wall-clock budget is spent, sleeping
    /// `interval` between passes.
    UntilDeadline {
        max_runtime: Duration,
        interval: Duration,
    },
}

pub struct RunDriver {
    engine: DeliveryEngine,
    schedule: Schedule,
    exit_hook: Option<Arc<dyn ExitHook>>,
    hook_delay: Duration,
}

impl RunDriver {
    pub fn new(engine: DeliveryEngine, schedule: Schedule) -> Self {
        Self {
            engine,
            schedule,
            exit_hook: None,
            hook_delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn with_exit_hook(mut self, hook: Arc<dyn ExitHook>, delay: Duration) -> Self {
        self.exit_hook = Some(hook);
        self.hook_delay = delay;
        self
    }

    /// Run the configured schedule to completion and return accumulated
    /// totals across all passes.
    pub async fn run(&self) -> PassReport {
        let mut cursors = self.engine.load_cursors().await;
        let mut totals = PassReport::default();

        match self.schedule {
            Schedule::Once => {
                let report = self.engine.run_pass(&mut cursors).await;
                log_pass(&report);
                totals.merge(&report);
            },
            Schedule::UntilDeadline {
                max_runtime,
                interval,
            } => {
                let deadline = Instant::now() + max_runtime;
                loop {
                    let report = self.engine.run_pass(&mut cursors).await;
                    log_pass(&report);
                    totals.merge(&report);
                    if Instant::now() + interval >= deadline {
                        info!("wall-clock budget spent, exiting loop");
                        break;
                    }
                    time::sleep(interval).await;
                }
            },
        }

        if let Err(e) = self.engine.save_cursors(&cursors).await {
            error!(error = %e, "final state save failed; next run may forward duplicates");
        }

        if let Some(hook) = &self.exit_hook
            && let Err(e) = hook.notify_next_run(self.hook_delay).await
        {
            warn!(error = %e, "exit hook failed");
        }

        totals
    }
}

fn log_pass(report: &PassReport) {
    info!(
        channels = report.channels_checked,
        skipped_channels = report.channels_skipped,
        forwarded = report.forwarded,
        copied = report.copied,
        failed = report.failed,
        "pass complete"
    );
}
