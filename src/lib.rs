pub mod api;
pub mod classifier;
pub mod config;
pub mod detection;
pub mod expenses;
pub mod instance;
pub mod logging;
pub mod server;
