//! dinners-web
//!
//! Serves a page listing planned dinners, loaded on every request from a
//! `dinners.json` file next to the application directory, plus the same data
//! as JSON.

pub mod cli;
pub mod config;
pub mod handler;
pub mod http;
pub mod loader;
pub mod logger;
pub mod server;
