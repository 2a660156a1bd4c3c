pub mod batch;
pub mod pool;

pub use batch::{instantiate_units, resolve_universes};
pub use pool::WorkerPool;
