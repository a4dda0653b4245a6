use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use munigraph_core::MuniGraphError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("MuniGraph error: {0}")]
    MuniGraph(#[from] MuniGraphError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MuniGraph(err) => match err {
                MuniGraphError::NodeNotFound(_) => StatusCode::NOT_FOUND,
                e if e.is_upstream() => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
