pub mod common;
pub mod config;
pub mod datetime;
pub mod device_client;
pub mod http_client;
pub mod network_config;
pub mod poll;
pub mod scheduler;
pub mod session;
pub mod ui;
pub mod validation;
