pub mod types;
pub mod classification;

pub use types::{ScanError, StepFailure, TransportError};
pub use classification::ErrorClassification;
