pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod handlers;
pub mod models;
pub mod rate_limit;
pub mod state;
