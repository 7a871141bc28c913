use crate::store::StoreError;
use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Every way a relay request can fail. Each variant is terminal for the
/// request and maps to one status code with a plain-text body.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Invalid request method")]
    MethodNotAllowed,
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("Failed to parse form data: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Failed to parse form data: {0}")]
    MultipartRejected(#[from] MultipartRejection),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Failed to save image: {0}")]
    FrameWrite(#[source] StoreError),
    #[error("Failed to read image: {0}")]
    FrameRead(#[source] StoreError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::BadRequest(_) | RelayError::MultipartRejected(_) => {
                StatusCode::BAD_REQUEST
            }
            // 413 when the body limit is hit, 400 otherwise
            RelayError::Multipart(e) => e.status(),
            RelayError::NotFound(_) => StatusCode::NOT_FOUND,
            RelayError::FrameWrite(_) | RelayError::FrameRead(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message; never carries I/O details.
    fn body(&self) -> &'static str {
        match self {
            RelayError::MethodNotAllowed => "Invalid request method",
            RelayError::BadRequest(reason) | RelayError::NotFound(reason) => *reason,
            RelayError::Multipart(_) | RelayError::MultipartRejected(_) => {
                "Failed to parse form data"
            }
            RelayError::FrameWrite(_) => "Failed to save image",
            RelayError::FrameRead(_) => "Failed to read image",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Error: {}", self);
        } else {
            tracing::warn!(status = status.as_u16(), "Error: {}", self);
        }
        (status, self.body()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RelayError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            RelayError::BadRequest("Failed to read image").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::NotFound("No frame available").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RelayError::FrameWrite(StoreError::Io(io::Error::other("disk full"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_io_details_stay_out_of_the_body() {
        let err = RelayError::FrameWrite(StoreError::Io(io::Error::other("disk full")));
        assert!(err.to_string().contains("disk full"));
        assert_eq!(err.body(), "Failed to save image");
    }
}
