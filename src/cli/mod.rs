pub mod banner;
pub mod commands;
pub mod progress;
pub mod scan;
pub mod templates;

pub use commands::{Cli, Commands};
