pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod models;
pub mod reporting;
pub mod targets;
pub mod template;
pub mod utils;
