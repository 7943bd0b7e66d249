//! HTTP surface of EduAlign: matching, slider suggestions, college lookup
//! and financial planning over actix-web.

pub mod error;
pub mod rest;
pub mod state;

pub use error::ApiError;
pub use rest::{configure, RestApi};
pub use state::AppState;
