pub mod formatting;
pub mod truncation;

pub use formatting::{escape_html, format_duration};
pub use truncation::{truncate_error, truncate_prefix, BODY_PREVIEW_CHARS};
