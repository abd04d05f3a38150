//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "success": true, "data": ... }` envelope;
//! failures are rendered by [`crate::error::AppError`] as
//! `{ "success": false, "error": ..., "code": ... }`. Use [`ApiResponse::ok`]
//! instead of ad-hoc `serde_json::json!({ "success": true, "data": ... })`
//! to get compile-time type safety and consistent serialization.

use serde::Serialize;

/// Standard `{ "success": true, "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(ApiResponse::ok(items)))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap a payload in the success envelope.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
