// crates/core/src/error.rs
use thiserror::Error;

/// Errors from calls against the pipeline server.
///
/// The poller treats `Transport`, `Status`, and `Malformed` as
/// inconclusive (retry silently); only a server-declared `failed` job —
/// which is not an `ApiError` at all — is authoritative. `Server` carries
/// a `success:false` payload from a start or synchronous call and is
/// surfaced immediately.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server returned HTTP {code} for {url}")]
    Status { url: String, code: u16 },

    #[error("unparseable response body from {url}: {message}")]
    Malformed { url: String, message: String },

    #[error("{message}")]
    Server { message: String },

    #[error("start-job call succeeded but returned no job id")]
    MissingJobId,
}

impl ApiError {
    /// Classify a reqwest error for `url`. Decode failures become
    /// `Malformed`, everything else is `Transport`.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_decode() {
            Self::Malformed {
                url,
                message: source.to_string(),
            }
        } else {
            Self::Transport { url, source }
        }
    }

    /// `success:false` from the server, with its error text if present.
    pub fn server(message: Option<String>, fallback: &str) -> Self {
        Self::Server {
            message: message.unwrap_or_else(|| fallback.to_string()),
        }
    }

    /// Whether a poll cycle hitting this error should be retried silently.
    pub fn is_inconclusive(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Status { .. } | Self::Malformed { .. }
        )
    }
}
