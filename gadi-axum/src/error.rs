use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gadi_core::errors::GadiError;

#[derive(Debug)]
pub struct GadiAxumError(pub anyhow::Error);

impl From<anyhow::Error> for GadiAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for GadiAxumError {
    fn into_response(self) -> Response {
        // A structured GadiError (even wrapped in anyhow context) keeps
        // its status and public fields.
        if let Some(gadi) = self.0.chain().find_map(|e| e.downcast_ref::<GadiError>()) {
            let safe = gadi.sanitize_for_client();
            let status =
                StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return (status, Json(safe.to_json())).into_response();
        }

        // Anything else becomes a 500 GeneralError.
        let safe = GadiError::general_error(self.0.to_string()).sanitize_for_client();
        let status =
            StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(safe.to_json())).into_response()
    }
}
