pub mod config;
pub mod jwt;
pub mod listing;
pub mod logging;
pub mod state;
