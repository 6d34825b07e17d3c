pub mod config;
pub mod console_log;
pub mod dashboard;
pub mod demo;
pub mod export;
pub mod integrity;
pub mod matches;
pub mod pipeline;
pub mod stats;
pub mod store;
pub mod teams;
