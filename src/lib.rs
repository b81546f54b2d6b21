pub mod activity;
pub mod api;
pub mod common;
pub mod session;
pub mod ui;
pub mod workflow;

pub use activity::Activity;
pub use api::{GarminApi, UploadOutcome};
pub use common::{ApiError, Config, Credentials, Endpoints};
pub use session::Session;
