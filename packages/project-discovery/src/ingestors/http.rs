//! HTTP page fetcher with ordered fallback channels.
//!
//! Many news and tender sites block plain requests, so the fetcher walks a
//! list of channels (direct request, JSON-wrapping proxy, raw proxy) and
//! returns the first one that yields a non-empty body.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchedPage, PageFetcher};

/// One way of getting at a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchChannel {
    /// Request the URL itself.
    Direct,
    /// Proxy that answers `{"contents": "..."}`; `{url}` in the template is
    /// replaced by the percent-encoded target.
    JsonProxy { template: String },
    /// Proxy that answers with the raw body; the encoded target is appended.
    RawProxy { prefix: String },
}

impl FetchChannel {
    pub fn label(&self) -> &'static str {
        match self {
            FetchChannel::Direct => "direct",
            FetchChannel::JsonProxy { .. } => "json-proxy",
            FetchChannel::RawProxy { .. } => "raw-proxy",
        }
    }

    /// Request URL for `target` on this channel.
    pub fn request_url(&self, target: &Url) -> String {
        match self {
            FetchChannel::Direct => target.to_string(),
            FetchChannel::JsonProxy { template } => {
                template.replace("{url}", &encode_component(target.as_str()))
            }
            FetchChannel::RawProxy { prefix } => {
                format!("{prefix}{}", encode_component(target.as_str()))
            }
        }
    }

    /// Parse a channel spec: `direct`, `json:<template>` or `raw:<prefix>`.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if spec.eq_ignore_ascii_case("direct") {
            Some(FetchChannel::Direct)
        } else if let Some(template) = spec.strip_prefix("json:") {
            Some(FetchChannel::JsonProxy {
                template: template.to_string(),
            })
        } else {
            spec.strip_prefix("raw:").map(|prefix| FetchChannel::RawProxy {
                prefix: prefix.to_string(),
            })
        }
    }
}

fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[derive(Deserialize)]
struct WrappedContents {
    contents: Option<String>,
}

/// HTTP fetcher trying each channel in order.
///
/// # Example
///
/// ```rust,ignore
/// use project_discovery::ingestors::{FetchChannel, HttpFetcher};
///
/// let fetcher = HttpFetcher::new()?.with_channels(vec![
///     FetchChannel::Direct,
///     FetchChannel::RawProxy { prefix: "https://corsproxy.io/?".into() },
/// ]);
/// let page = fetcher.fetch_page(&url).await?;
/// ```
pub struct HttpFetcher {
    client: reqwest::Client,
    channels: Vec<FetchChannel>,
    user_agent: String,
}

impl HttpFetcher {
    /// Create a fetcher with a 30 second timeout and the default channels.
    pub fn new() -> FetchResult<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;
        Ok(Self {
            client,
            channels: Self::default_channels(),
            user_agent: "ProjectIntelBot/1.0".to_string(),
        })
    }

    /// Direct request, then the two public proxies.
    pub fn default_channels() -> Vec<FetchChannel> {
        vec![
            FetchChannel::Direct,
            FetchChannel::JsonProxy {
                template: "https://api.allorigins.win/get?url={url}".to_string(),
            },
            FetchChannel::RawProxy {
                prefix: "https://corsproxy.io/?".to_string(),
            },
        ]
    }

    pub fn with_channels(mut self, channels: Vec<FetchChannel>) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn channels(&self) -> &[FetchChannel] {
        &self.channels
    }

    async fn fetch_via(&self, channel: &FetchChannel, target: &Url) -> FetchResult<String> {
        let request_url = channel.request_url(target);
        debug!(channel = channel.label(), url = %request_url, "HTTP fetch starting");

        let response = self
            .client
            .get(&request_url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: request_url,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        let body = match channel {
            FetchChannel::JsonProxy { .. } => serde_json::from_str::<WrappedContents>(&body)
                .map_err(|e| FetchError::Http(Box::new(e)))?
                .contents
                .unwrap_or_default(),
            _ => body,
        };

        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody {
                url: target.to_string(),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &Url) -> FetchResult<FetchedPage> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
            });
        }

        for channel in &self.channels {
            match self.fetch_via(channel, url).await {
                Ok(body) => {
                    info!(url = %url, channel = channel.label(), bytes = body.len(), "page fetched");
                    return Ok(FetchedPage::new(url.clone(), body, channel.label()));
                }
                Err(e) => {
                    warn!(url = %url, channel = channel.label(), error = %e, "fetch channel failed");
                }
            }
        }

        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts: self.channels.len(),
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_request_urls_encode_target() {
        let target = Url::parse("https://news.example.sa/a?id=1&x=2").unwrap();

        let json = FetchChannel::JsonProxy {
            template: "https://proxy.test/get?url={url}".to_string(),
        };
        assert_eq!(
            json.request_url(&target),
            "https://proxy.test/get?url=https%3A%2F%2Fnews.example.sa%2Fa%3Fid%3D1%26x%3D2"
        );

        let raw = FetchChannel::RawProxy {
            prefix: "https://raw.test/?".to_string(),
        };
        assert!(raw.request_url(&target).starts_with("https://raw.test/?https%3A"));
        assert_eq!(FetchChannel::Direct.request_url(&target), target.as_str());
    }

    #[test]
    fn test_channel_spec_parsing() {
        assert_eq!(FetchChannel::parse("direct"), Some(FetchChannel::Direct));
        assert_eq!(
            FetchChannel::parse("raw:https://corsproxy.io/?"),
            Some(FetchChannel::RawProxy {
                prefix: "https://corsproxy.io/?".to_string()
            })
        );
        assert_eq!(FetchChannel::parse("ftp:whatever"), None);
    }

    #[tokio::test]
    async fn test_non_http_scheme_is_rejected() {
        let fetcher = HttpFetcher::new().unwrap().with_channels(vec![]);
        let url = Url::parse("file:///etc/passwd").unwrap();
        let err = fetcher.fetch_page(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_no_channels_means_exhausted() {
        let fetcher = HttpFetcher::new().unwrap().with_channels(vec![]);
        let url = Url::parse("https://example.com").unwrap();
        let err = fetcher.fetch_page(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Exhausted { attempts: 0, .. }));
    }
}
