use crate::{config::UploadConfig, error::RelayError};
use axum::extract::{multipart::Field, Multipart};
use bytes::Bytes;

const JPEG_CONTENT_TYPES: [&str; 2] = ["image/jpeg", "image/jpg"];

/// Fields the camera side posts. Only the first occurrence of each name is
/// kept and unknown fields are skipped. An `image` part must be a file part,
/// i.e. carry a filename.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub image: Option<Bytes>,
    pub status: Option<String>,
    pub detail: Option<String>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart, policy: &UploadConfig) -> Result<Self, RelayError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("image") if form.image.is_none() && field.file_name().is_some() => {
                    if policy.require_jpeg && !is_jpeg(&field) {
                        return Err(RelayError::BadRequest("Invalid image type"));
                    }
                    form.image = Some(field.bytes().await?);
                }
                Some("status") if form.status.is_none() => {
                    form.status = Some(read_text(field).await?);
                }
                Some("detail") if form.detail.is_none() => {
                    form.detail = Some(read_text(field).await?);
                }
                _ => {}
            }
        }

        Ok(form)
    }

    pub fn image(&mut self) -> Result<Bytes, RelayError> {
        self.image
            .take()
            .ok_or(RelayError::BadRequest("Failed to read image"))
    }
}

/// multer decodes text lossily; invalid UTF-8 is a malformed form here.
async fn read_text(field: Field<'_>) -> Result<String, RelayError> {
    let data = field.bytes().await?;
    String::from_utf8(data.to_vec())
        .map_err(|_| RelayError::BadRequest("Failed to parse form data"))
}

/// A part without a declared type passes; the bytes are never inspected.
fn is_jpeg(field: &Field<'_>) -> bool {
    match field.content_type() {
        None => true,
        Some(content_type) => {
            let essence = content_type.split(';').next().unwrap_or_default().trim();
            JPEG_CONTENT_TYPES
                .iter()
                .any(|jpeg| essence.eq_ignore_ascii_case(jpeg))
        }
    }
}
