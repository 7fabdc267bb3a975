use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Định danh một phiên đăng nhập. Mỗi lần login thành công sinh ra một id mới.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Timestamp do server cấp. Giá trị là chuỗi opaque (ISO-8601 trên thực tế),
/// so sánh bằng nhau tuyệt đối.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ServerTimestamp(String);

impl ServerTimestamp {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ServerTimestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Server Python trả về isoformat(), nhưng chấp nhận cả số (epoch).
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(raw) => Ok(Self(raw)),
            serde_json::Value::Number(num) => Ok(Self(num.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "timestamp must be a string or number, got {other}"
            ))),
        }
    }
}

/// Nguồn gốc một tin nhắn hiển thị. Chỉ ảnh hưởng cách render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOrigin {
    Own,
    Other,
    System,
}

/// Một tin nhắn trong lịch sử kênh, đúng như server trả về.
///
/// Server lưu `from`/`message` nguyên văn nên có thể là số hoặc null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerMessage {
    #[serde(rename = "from", default, deserialize_with = "scalar_as_string")]
    pub sender: String,
    #[serde(rename = "message", default, deserialize_with = "scalar_as_string")]
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<ServerTimestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => Ok(text),
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::Number(num) => Ok(num.to_string()),
        serde_json::Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a scalar, got {other}"
        ))),
    }
}

/// Peer đã đăng ký với tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfo {
    pub peer_id: String,
    pub ip: String,
    pub port: u16,
}

/// Phân loại lỗi mà UI cần phân biệt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Application,
}

/// Kết quả một lần gửi tin (broadcast hoặc direct).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    Failed { kind: FailureKind, detail: String },
}
