pub mod config;
pub mod errors;

pub use config::{Config, Credentials, Endpoints};
pub use errors::ApiError;
