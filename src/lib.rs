pub mod catalog;
pub mod config;
pub mod context;
pub mod encoding;
pub mod error;
pub mod model;
pub mod outcome;
pub mod request;
pub mod state;
pub mod telemetry;

pub use context::AppContext;
pub use error::{PredictError, Result};
