// src/lib.rs
pub mod api_client;
pub mod banner;
pub mod config;
pub mod errors;
pub mod formatter;
pub mod models;
pub mod notifier;
pub mod poller;
pub mod store;
pub mod validator;
