use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogError;
use crate::file_store::FileStoreError;
use crate::metadata::MetadataError;

// ============================================================================
// JSend envelopes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JSendStatus {
    Error,
    Fail,
    Success,
}

/// `{"status": "success", "data": ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct JSend<T: Serialize> {
    pub data: T,
    pub status: JSendStatus,
}

impl<T: Serialize> JSend<T> {
    pub fn success(data: T) -> Json<JSend<T>> {
        Json(JSend {
            data,
            status: JSendStatus::Success,
        })
    }
}

/// `{"status": "fail", "data": {"message": ...}}`, used for 4xx.
#[derive(Debug, Serialize, Deserialize)]
pub struct JSendFail {
    pub data: FailData,
    pub status: JSendStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FailData {
    pub message: String,
}

/// `{"status": "error", "message": ...}`, used for 5xx.
#[derive(Debug, Serialize, Deserialize)]
pub struct JSendError {
    pub message: String,
    pub status: JSendStatus,
}

// ============================================================================
// Handler errors
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Fail(StatusCode, String),
    Error(StatusCode, String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::BAD_REQUEST, message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::NOT_FOUND, message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::PAYLOAD_TOO_LARGE, message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Error(StatusCode::INTERNAL_SERVER_ERROR, message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Fail(code, message) => {
                let body = JSendFail {
                    data: FailData { message },
                    status: JSendStatus::Fail,
                };
                (code, Json(body)).into_response()
            }
            ApiError::Error(code, message) => {
                let body = JSendError {
                    message,
                    status: JSendStatus::Error,
                };
                (code, Json(body)).into_response()
            }
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::InvalidInput(message) => ApiError::bad_request(message),
            CatalogError::Files(FileStoreError::InvalidPath(_)) => {
                ApiError::bad_request("Invalid file path")
            }
            CatalogError::Files(FileStoreError::NotFound(_)) => {
                ApiError::not_found("File not found")
            }
            CatalogError::Metadata(MetadataError::InvalidFlag(_)) => {
                ApiError::bad_request("isRendered must be a boolean")
            }
            other => {
                tracing::error!(error = %other, "Request failed");
                ApiError::internal(other.to_string())
            }
        }
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// `axum::Json` that rejects with a JSend fail body instead of plain text.
pub struct AppJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        let rejection = match axum::Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => return Ok(AppJson(value)),
            Err(rejection) => rejection,
        };

        let message = match rejection {
            JsonRejection::JsonDataError(err) => format!("Invalid request body: {}", err.body_text()),
            JsonRejection::JsonSyntaxError(_) => "Malformed JSON in request body".into(),
            JsonRejection::MissingJsonContentType(_) => {
                "Expected a JSON body with Content-Type: application/json".into()
            }
            _ => "Failed to read request body".into(),
        };
        Err(ApiError::bad_request(message))
    }
}
