pub mod config;
pub mod error;
pub mod routes;

pub use config::{ConfigError, Params, ServerConfig};
pub use error::ApiError;
pub use routes::{build_router, AppState};
