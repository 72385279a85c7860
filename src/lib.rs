/// MIRA - film streaming service
///
/// Film library and curated collections, threaded comments with moderation,
/// per-viewer favorites and resume points, and an admin bridge to the
/// external video host.
pub mod account;
pub mod admin;
pub mod api;
pub mod auth;
pub mod catalog;
pub mod cli;
pub mod comments;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod server;
pub mod video_host;
pub mod viewing;

pub use context::AppContext;
pub use error::{MiraError, MiraResult};
