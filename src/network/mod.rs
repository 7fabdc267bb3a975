pub mod api;
pub mod client;
pub mod poller;
pub mod transport;

pub use api::TrackerApi;
pub use client::{ClientSettings, TrackerClient};
pub use transport::HttpTransport;
