pub mod alert;
pub mod config;
pub mod estimate;
pub mod output;
pub mod performance;
pub mod server;
pub mod store;
pub mod tables;
