use super::{form::UploadForm, frame::save_frame};
use crate::{error::RelayError, server::SharedState, store::DetectionRecord};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;

/// Saves the attached frame, then publishes the detection. The two updates
/// take separate locks, so a reader in between can see the new frame with
/// the previous detection.
#[instrument(skip(state, multipart))]
pub async fn notification(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, RelayError> {
    state.metrics.record_request("notification");

    let mut form = UploadForm::read(multipart?, &state.upload).await?;
    let image = form.image()?;
    let record = DetectionRecord {
        status: form.status.unwrap_or_default(),
        detail: form.detail.unwrap_or_default(),
    };

    save_frame(&state, &image, "notification").await?;
    state.detections.set(record);
    tracing::info!(bytes = image.len(), "Notification received and saved");

    Ok(StatusCode::OK)
}

#[instrument(skip(state))]
pub async fn get_detection(
    State(state): State<SharedState>,
) -> Result<Json<DetectionRecord>, RelayError> {
    state.metrics.record_request("get_detection");

    state
        .detections
        .get()
        .map(Json)
        .map_err(|_| RelayError::NotFound("No detection data available"))
}
