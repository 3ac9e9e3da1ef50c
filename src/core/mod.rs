pub mod app_info;
pub mod config;
pub mod context;
