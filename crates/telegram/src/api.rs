//! Minimal JSON-over-HTTPS caller for the Bot API.

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, de::DeserializeOwned},
    serde_json::Value,
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("telegram api error {code}: {description}")]
    Telegram { code: i64, description: String },
}

pub type ApiResult<T> = Result<T, ApiError>;

/// `{ok, result, description, error_code}` response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

/// Caller for a single bot token. Every Bot API method is a POST of a JSON
/// payload to `<root>/bot<token>/<method>`.
pub struct BotApi {
    http: reqwest::Client,
    base: String,
}

impl BotApi {
    pub fn new(api_root: &str, token: &Secret<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: format!(
                "{}/bot{}",
                api_root.trim_end_matches('/'),
                token.expose_secret()
            ),
        }
    }

    pub async fn call<T: DeserializeOwned>(&self, method: &str, payload: Value) -> ApiResult<T> {
        let url = format!("{}/{method}", self.base);
        let resp = self.http.post(&url).json(&payload).send().await?;
        let envelope: Envelope<T> = resp.json().await?;
        if envelope.ok
            && let Some(result) = envelope.result
        {
            Ok(result)
        } else {
            Err(ApiError::Telegram {
                code: envelope.error_code.unwrap_or(0),
                description: envelope
                    .description
                    .unwrap_or_else(|| "unknown error".into()),
            })
        }
    }
}
