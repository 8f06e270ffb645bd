//! Blocking HTTP GETs over a shared tokio runtime.
//!
//! The tools are synchronous batch jobs; the async reqwest client is driven
//! through `SHARED_RUNTIME.handle().block_on`.

use std::sync::LazyLock;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Whole-request timeout (feeds and images are small)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!("postmeta/", env!("CARGO_PKG_VERSION"));

/// Error types for fetch operations
#[derive(Debug)]
pub enum FetchError {
    /// HTTP error with optional status code
    Http {
        status: Option<u16>,
        message: String,
    },
    /// Response body was not what the caller needed
    Body(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Body(message) => write!(f, "bad response body: {message}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }

    /// Authentication or authorization rejected (expired session cookie).
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::Http {
                status: Some(401) | Some(403),
                ..
            }
        )
    }
}

static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .expect("failed to build HTTP client")
});

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Downloaded body plus its declared content type.
#[derive(Debug)]
pub struct Fetched {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    /// URL after redirects.
    pub final_url: String,
}

/// GET `url` with extra request headers.
pub fn fetch(url: &str, headers: &[(&str, &str)]) -> Result<Fetched, FetchError> {
    SHARED_RUNTIME.handle().block_on(async {
        let mut request = SHARED_CLIENT.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::from_reqwest(&e))?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let final_url = response.url().to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?;

        log::debug!("GET {url} → {} bytes", bytes.len());
        Ok(Fetched {
            bytes: bytes.to_vec(),
            content_type,
            final_url,
        })
    })
}

/// GET `url` and decode the body as UTF-8.
pub fn fetch_text(url: &str) -> Result<String, FetchError> {
    fetch_text_with(url, &[])
}

pub fn fetch_text_with(url: &str, headers: &[(&str, &str)]) -> Result<String, FetchError> {
    let fetched = fetch(url, headers)?;
    String::from_utf8(fetched.bytes).map_err(|e| FetchError::Body(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_err(status: u16) -> FetchError {
        FetchError::Http {
            status: Some(status),
            message: "test".to_string(),
        }
    }

    #[test]
    fn auth_errors() {
        assert!(http_err(401).is_auth());
        assert!(http_err(403).is_auth());
        assert!(!http_err(404).is_auth());
        assert!(!FetchError::Body("x".into()).is_auth());
    }

    #[test]
    fn display_http_with_status() {
        assert_eq!(format!("{}", http_err(404)), "HTTP 404: test");
    }

    #[test]
    fn display_http_without_status() {
        let err = FetchError::Http {
            status: None,
            message: "timeout".to_string(),
        };
        assert_eq!(format!("{err}"), "HTTP error: timeout");
    }

    #[test]
    #[ignore = "network"]
    fn fetch_medium_feed() {
        let text = fetch_text("https://medium.com/feed/@medium").unwrap();
        assert!(text.contains("<rss"));
    }
}
