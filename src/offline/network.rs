use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url};
use std::time::Duration;

use crate::error::BoardResult;

/// Status text of synthetic responses served when the network is unreachable.
pub const OFFLINE: &'static str = "Offline";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    /// 0 for opaque (cross-origin, unreadable) responses
    pub status: u16,
    pub status_text: String,
    pub body: Bytes,
}

impl AssetResponse {
    pub fn new(status: u16, status_text: &str, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: status_text.to_string(),
            body: body.into(),
        }
    }

    /// Synthetic 503 returned by the cache strategies when offline.
    pub fn offline(body: &'static str) -> Self {
        Self::new(503, OFFLINE, body)
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_opaque(&self) -> bool {
        self.status == 0
    }
}

/// Network access used by the offline asset cache.
#[async_trait]
pub trait AssetNetwork: Send + Sync {
    /// Err only when no response was received at all.
    async fn fetch(&self, url: &Url) -> BoardResult<AssetResponse>;
}

pub struct HttpNetwork {
    http_client: Client,
}

impl HttpNetwork {
    pub fn new(timeout: Duration) -> BoardResult<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl AssetNetwork for HttpNetwork {
    async fn fetch(&self, url: &Url) -> BoardResult<AssetResponse> {
        let response = self.http_client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok(AssetResponse::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            body,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_statuses() {
        assert!(AssetResponse::new(200, "OK", "x").is_ok());
        assert!(!AssetResponse::new(404, "Not Found", "").is_ok());
        assert!(AssetResponse::new(0, "", "").is_opaque());

        let offline = AssetResponse::offline(OFFLINE);
        assert_eq!((offline.status, offline.status_text.as_str()), (503, OFFLINE));
        assert_eq!(offline.body, Bytes::from_static(b"Offline"));
    }
}
