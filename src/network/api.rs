use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::common::{PeerInfo, ServerMessage};

use super::transport::{ApiError, Transport};

const STATUS_SUCCESS: &str = "success";
const REJECTED: &str = "request rejected by server";

/// Phần chung của mọi phản hồi từ tracker.
#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PeerListResponse {
    #[serde(default)]
    peers: Vec<PeerInfo>,
}

/// Từng item được decode riêng để một item hỏng không làm mất cả lịch sử.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    messages: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct PeerRegistration<'a> {
    peer_id: &'a str,
    ip: &'a str,
    port: u16,
}

/// Wrapper có kiểu cho các endpoint của tracker server.
#[derive(Clone)]
pub struct TrackerApi<T: Transport> {
    transport: T,
}

impl<T: Transport> TrackerApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// POST /login. Trả về thông điệp của server khi thành công.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let body = self
            .call_with_fallback(
                Method::POST,
                "/login",
                &[],
                Some(json!({ "username": username, "password": password })),
                "Login failed",
            )
            .await?;
        Ok(body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Login successful")
            .to_string())
    }

    /// POST /submit-info
    pub async fn submit_info(&self, peer_id: &str, ip: &str, port: u16) -> Result<(), ApiError> {
        let registration = serde_json::to_value(PeerRegistration { peer_id, ip, port })?;
        self.call(Method::POST, "/submit-info", Some(registration))
            .await
            .map(drop)
    }

    /// GET /get-list
    pub async fn get_list(&self) -> Result<Vec<PeerInfo>, ApiError> {
        let body = self.call(Method::GET, "/get-list", None).await?;
        let response: PeerListResponse = serde_json::from_value(body)?;
        Ok(response.peers)
    }

    /// GET /get-messages?channel=X
    pub async fn get_messages(&self, channel: &str) -> Result<Vec<ServerMessage>, ApiError> {
        let body = self
            .call_with_fallback(
                Method::GET,
                "/get-messages",
                &[("channel", channel)],
                None,
                REJECTED,
            )
            .await?;
        let response: MessagesResponse = serde_json::from_value(body)?;
        Ok(response
            .messages
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<ServerMessage>(item) {
                Ok(message) => Some(message),
                Err(err) => {
                    log::debug!("Skipping malformed history item: {err}");
                    None
                }
            })
            .collect())
    }

    /// POST /broadcast-peer
    pub async fn broadcast(
        &self,
        from_peer: &str,
        message: &str,
        channel: &str,
    ) -> Result<(), ApiError> {
        self.call(
            Method::POST,
            "/broadcast-peer",
            Some(json!({ "from_peer": from_peer, "message": message, "channel": channel })),
        )
        .await
        .map(drop)
    }

    /// POST /send-peer
    pub async fn send_peer(
        &self,
        from_peer: &str,
        to_peer: &str,
        message: &str,
    ) -> Result<(), ApiError> {
        self.call(
            Method::POST,
            "/send-peer",
            Some(json!({ "from_peer": from_peer, "to_peer": to_peer, "message": message })),
        )
        .await
        .map(drop)
    }

    /// POST /connect-peer
    pub async fn connect_peer(&self, from_peer: &str, to_peer: &str) -> Result<(), ApiError> {
        self.call(
            Method::POST,
            "/connect-peer",
            Some(json!({ "from_peer": from_peer, "to_peer": to_peer })),
        )
        .await
        .map(drop)
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        self.call_with_fallback(method, path, &[], body, REJECTED)
            .await
    }

    /// `fallback` là thông báo lỗi khi server từ chối mà không kèm `message`.
    async fn call_with_fallback(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
        fallback: &str,
    ) -> Result<Value, ApiError> {
        let value = self.transport.request(method, path, query, body).await?;
        let envelope: StatusEnvelope = serde_json::from_value(value.clone())?;
        match envelope.status.as_deref() {
            Some(STATUS_SUCCESS) => Ok(value),
            _ => Err(ApiError::Application(
                envelope
                    .message
                    .unwrap_or_else(|| fallback.to_string()),
            )),
        }
    }
}
