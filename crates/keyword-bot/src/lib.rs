pub mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod resolver;
pub mod server;
