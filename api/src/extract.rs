use axum::extract::FromRequest;

use crate::response::ApiError;

/// `axum::Json` with rejections rendered in the API error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
