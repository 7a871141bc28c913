use super::form::UploadForm;
use crate::{error::RelayError, server::SharedState, store::StoreError};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::instrument;

#[instrument(skip(state, multipart))]
pub async fn upload_frame(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, RelayError> {
    state.metrics.record_request("upload_frame");

    let mut form = UploadForm::read(multipart?, &state.upload).await?;
    let image = form.image()?;

    save_frame(&state, &image, "upload_frame").await?;
    tracing::info!(bytes = image.len(), "Frame received and saved");

    Ok(StatusCode::OK)
}

#[instrument(skip(state))]
pub async fn get_frame(State(state): State<SharedState>) -> Result<Response, RelayError> {
    state.metrics.record_request("get_frame");

    let frame = state.frames.read().await.map_err(|e| match e {
        StoreError::NotFound => RelayError::NotFound("No frame available"),
        other => RelayError::FrameRead(other),
    })?;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], frame).into_response())
}

/// Writes the frame and records its size. Nothing else is touched on failure.
pub(super) async fn save_frame(
    state: &SharedState,
    image: &[u8],
    route: &str,
) -> Result<(), RelayError> {
    if let Err(e) = state.frames.write(image).await {
        state.metrics.record_store_error(route);
        return Err(RelayError::FrameWrite(e));
    }
    state.metrics.record_frame_size(image.len(), route);
    Ok(())
}
