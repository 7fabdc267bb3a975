use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Method, Url};
use serde_json::Value;
use thiserror::Error;

use crate::common::FailureKind;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ApiError {
    /// Không kết nối được tới server (DNS, refused, timeout...).
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server returned HTTP {0}")]
    HttpStatus(u16),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Server trả `status` khác "success".
    #[error("{0}")]
    Application(String),
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network(_) | Self::HttpStatus(_) | Self::Decode(_) => FailureKind::Network,
            Self::Application(_) => FailureKind::Application,
        }
    }
}

/// Tầng vận chuyển tới tracker: gửi một request JSON, nhận về JSON đã parse.
///
/// `query` là các cặp key/value; transport tự lo việc encode.
/// Phản hồi non-2xx hay lỗi mạng luôn là `Err`, không bao giờ là một `status`.
pub trait Transport: Clone + Send + Sync + 'static {
    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: Url) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url
    }
}

impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(path);
        let mut request = self.client.request(method.clone(), url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            if method != Method::GET {
                request = request.json(&body);
            }
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let transport =
            HttpTransport::new(Url::parse("http://127.0.0.1:8001/").unwrap()).unwrap();
        assert_eq!(
            transport.endpoint("/get-list").as_str(),
            "http://127.0.0.1:8001/get-list"
        );
    }

    #[test]
    fn error_kinds_split_network_from_application() {
        assert_eq!(ApiError::HttpStatus(502).kind(), FailureKind::Network);
        assert_eq!(
            ApiError::Application("Peer not found".to_string()).kind(),
            FailureKind::Application
        );
        assert_eq!(ApiError::HttpStatus(404).to_string(), "server returned HTTP 404");
    }
}
