pub mod exchange;
pub mod probe;
pub mod snapshot;
pub mod verdict;

pub use exchange::*;
pub use probe::*;
pub use snapshot::*;
pub use verdict::*;
