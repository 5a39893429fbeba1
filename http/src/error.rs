use axum::{
    http::StatusCode,
    response::{
        IntoResponse,
        Response,
    },
};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Rendering the homepage failed: {0:#}")]
    Template(eyre::Report),
    #[error("No stats have been collected yet")]
    NoStats,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NoStats => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{self}");
        }
        (status, axum::Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
