//! primedash: operator client for the Prime AI bot dashboard backend.
//!
//! The [`dashboard::Dashboard`] state machine drives an [`api::Backend`];
//! [`api::client::HttpBackend`] is the real one. The `primedash` binary
//! wraps both in a terminal front-end.

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod feedback;
pub mod render;
pub mod session;
pub mod settings;
pub mod ui;
pub mod utils;
