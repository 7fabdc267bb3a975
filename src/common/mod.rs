pub mod commands;
pub mod events;
pub mod input;
pub mod types;

pub use commands::NetworkCommand;
pub use events::{NetworkEvent, SessionEvent};
pub use input::{InputAction, InputError, parse_input};
pub use types::{
    FailureKind, MessageOrigin, PeerInfo, SendOutcome, ServerMessage, ServerTimestamp, SessionId,
};
