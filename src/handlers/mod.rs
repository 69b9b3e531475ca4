//! HTTP handlers

pub mod health;
pub mod webhook;
pub mod requests;


use axum::http::{Method, StatusCode};

use crate::{AppError, AppResult};

/// Method fallback for single-method routes: `OPTIONS` succeeds, the rest is 405
pub async fn method_fallback(method: Method) -> AppResult<StatusCode> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK);
    }
    Err(AppError::MethodNotAllowed)
}

/// Unknown path: `OPTIONS` succeeds, the rest is 404
pub async fn not_found(method: Method) -> AppResult<StatusCode> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK);
    }
    Err(AppError::NotFound)
}
