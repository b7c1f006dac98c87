pub mod api;
pub mod app;
pub mod chat;
pub mod config;
pub mod logging;
pub mod ui;
