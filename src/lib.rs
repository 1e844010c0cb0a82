// Public API for integration tests and potential library usage

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod janitor;
pub mod rate_limit;
pub mod scoring;
pub mod squares;
pub mod state;
pub mod trivia_flow;
pub mod types;
