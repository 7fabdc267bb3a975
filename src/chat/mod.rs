pub mod message;
pub mod render;
pub mod session;
pub mod store;

pub use message::DisplayedMessage;
pub use render::{RenderHandle, Renderer};
pub use session::{ChatSession, InputOutcome};
