pub mod config;
pub mod search;
pub mod stats;
pub mod utils;
