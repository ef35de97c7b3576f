//! GitHub `repository_dispatch` exit hook for self-chained runs.
//!
//! Hosted runners cap execution time, so a loop-mode run that exhausts its
//! budget can dispatch an event that starts the next run. The dispatch is
//! fire-and-forget: a rejected request is logged and never retried.

use std::time::Duration;

use {
    anyhow::Result,
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    serde_json::json,
    tracing::{info, warn},
};

use tgferry_core::ExitHook;

const DISPATCH_EVENT: &str = "tgferry-rerun";

pub struct GithubDispatchHook {
    http: reqwest::Client,
    api_root: String,
    token: Secret<String>,
    repo: String,
}

impl GithubDispatchHook {
    pub fn new(token: Secret<String>, repo: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_root: "https://api.github.com".into(),
            token,
            repo,
        }
    }

    #[must_use]
    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into();
        self
    }
}

#[async_trait]
impl ExitHook for GithubDispatchHook {
    async fn notify_next_run(&self, delay: Duration) -> Result<()> {
        if !delay.is_zero() {
            info!(secs = delay.as_secs(), "cooling down before dispatching next run");
            tokio::time::sleep(delay).await;
        }

        let url = format!("{}/repos/{}/dispatches", self.api_root, self.repo);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.token.expose_secret())
            .header("User-Agent", "tgferry")
            .header("Accept", "application/vnd.github+json")
            .json(&json!({"event_type": DISPATCH_EVENT}))
            .send()
            .await?;

        if resp.status().is_success() {
            info!(repo = %self.repo, "next run dispatched");
        } else {
            warn!(repo = %self.repo, status = %resp.status(), "dispatch request rejected");
        }
        Ok(())
    }
}
