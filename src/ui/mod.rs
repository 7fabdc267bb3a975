mod app;
mod components;
mod state;
mod timeline;

pub use app::ChatApp;
