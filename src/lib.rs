pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod router;
pub mod seed;

pub use error::BackendError;
pub use router::{BackendState, backend_router};
