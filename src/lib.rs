//! Command-line chat with a hosted assistant that answers from an uploaded
//! schedule file.

pub mod answer;
pub mod api;
pub mod chat;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod input;
pub mod logging;
pub mod poller;
pub mod session;
