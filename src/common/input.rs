use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?P<cmd>\S+)(?:\s+(?P<rest>.*))?$").expect("command regex is valid")
});

static DIRECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<peer>\S+)\s+(?P<text>.+)$").expect("direct regex is valid")
});

/// Hành động suy ra từ một dòng nhập của người dùng.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Văn bản thường, gửi theo chế độ đang chọn (broadcast/direct).
    Send(String),
    Broadcast(String),
    Direct { to_peer: String, content: String },
    RefreshPeers,
    ConnectAll,
    Clear,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Nothing to send")]
    Empty,
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Unknown command: /{0}")]
    Unknown(String),
}

pub fn parse_input(line: &str) -> Result<InputAction, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(InputError::Empty);
    }

    let Some(caps) = COMMAND_RE.captures(line) else {
        return Ok(InputAction::Send(line.to_string()));
    };

    let rest = caps.name("rest").map(|m| m.as_str().trim()).unwrap_or("");
    match caps["cmd"].to_ascii_lowercase().as_str() {
        "msg" => {
            let direct = DIRECT_RE
                .captures(rest)
                .ok_or(InputError::Usage("/msg <peer_id> <message>"))?;
            Ok(InputAction::Direct {
                to_peer: direct["peer"].to_string(),
                content: direct["text"].trim().to_string(),
            })
        }
        "broadcast" => {
            if rest.is_empty() {
                Err(InputError::Usage("/broadcast <message>"))
            } else {
                Ok(InputAction::Broadcast(rest.to_string()))
            }
        }
        "peers" => Ok(InputAction::RefreshPeers),
        "connect" => Ok(InputAction::ConnectAll),
        "clear" => Ok(InputAction::Clear),
        "quit" => Ok(InputAction::Quit),
        other => Err(InputError::Unknown(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_sent_trimmed() {
        assert_eq!(
            parse_input("  hello there  "),
            Ok(InputAction::Send("hello there".to_string()))
        );
    }

    #[test]
    fn blank_line_is_rejected() {
        assert_eq!(parse_input("   "), Err(InputError::Empty));
    }

    #[test]
    fn msg_command_splits_peer_and_text() {
        assert_eq!(
            parse_input("/msg bob see you at 5"),
            Ok(InputAction::Direct {
                to_peer: "bob".to_string(),
                content: "see you at 5".to_string(),
            })
        );
    }

    #[test]
    fn msg_without_text_reports_usage() {
        assert_eq!(
            parse_input("/msg bob"),
            Err(InputError::Usage("/msg <peer_id> <message>"))
        );
    }

    #[test]
    fn simple_commands_are_case_insensitive() {
        assert_eq!(parse_input("/PEERS"), Ok(InputAction::RefreshPeers));
        assert_eq!(parse_input("/connect"), Ok(InputAction::ConnectAll));
        assert_eq!(parse_input("/clear"), Ok(InputAction::Clear));
        assert_eq!(parse_input("/quit"), Ok(InputAction::Quit));
        assert_eq!(
            parse_input("/broadcast hi all"),
            Ok(InputAction::Broadcast("hi all".to_string()))
        );
    }

    #[test]
    fn unknown_command_is_reported() {
        let err = parse_input("/dance now").unwrap_err();
        assert_eq!(err, InputError::Unknown("dance".to_string()));
        assert_eq!(err.to_string(), "Unknown command: /dance");
    }
}
