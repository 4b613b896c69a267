pub mod coordinator;
pub mod executor;
pub mod matcher;
pub mod request;
pub mod transport;

pub use coordinator::{ScanCoordinator, ScanOutcome};
pub use executor::{ProbeState, StepExecutor};
pub use matcher::{evaluate, evaluate_step, evaluate_template};
pub use request::{build_request, resolve_headers};
pub use transport::{HttpTransport, ReqwestTransport};
