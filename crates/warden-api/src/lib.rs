//! Warden API Library
//!
//! HTTP surface of the scanning service: handlers, error rendering and application setup.

mod api_doc;
mod handlers;
mod telemetry;
mod utils;

pub mod error;
pub mod setup;
pub mod state;

pub use api_doc::ApiDoc;
pub use error::{ErrorResponse, HttpAppError};
