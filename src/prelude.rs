pub use std::sync::Arc;

pub use askama::Template;
pub use axum::extract::State;
pub use axum::http::StatusCode;
pub use axum::response::{IntoResponse, Redirect, Response};
pub use axum::routing::{get, post};
pub use axum::Json;

pub use crate::utils::config::Config;
pub use crate::utils::error::{AppError, AppResult};
pub use crate::utils::routing::{AppRouter, AxumRouter};
pub use crate::utils::types::SharedAppState;
