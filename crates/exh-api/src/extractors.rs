//! # Request Extraction
//!
//! JSON bodies and multipart uploads are taken as `Result<_, Rejection>` so
//! that a malformed request is answered with a structured [`AppError`]
//! instead of axum's plain-text rejection.

use std::collections::HashMap;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::Json;
use exh_core::FieldError;
use exh_exchange::ExchangeError;

use crate::error::AppError;

/// Name of the multipart part carrying the file.
pub const FILE_PART: &str = "archivo";

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// A parsed multipart upload: text parts by name plus the one file part.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    file: Option<(String, Vec<u8>)>,
}

impl UploadForm {
    /// Read every part of `multipart`.
    ///
    /// The file part is the one named `archivo`; its client file name is the
    /// name matched against the declarations. Every other part is read as
    /// text.
    pub async fn read(
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Self, AppError> {
        let mut multipart =
            multipart.map_err(|err| AppError::BadRequest(err.body_text()))?;
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if name == FILE_PART {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                form.file = Some((file_name, bytes.to_vec()));
            } else {
                let value = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    /// A required text part.
    pub fn field(&self, name: &str) -> Result<&str, ExchangeError> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ExchangeError::Validation(vec![FieldError::new(name, "is required")]))
    }

    /// The file part as `(file name, bytes)`.
    pub fn file(&self) -> Result<(&str, &[u8]), ExchangeError> {
        match &self.file {
            Some((name, bytes)) if !name.trim().is_empty() => Ok((name.as_str(), bytes.as_slice())),
            Some(_) => Err(ExchangeError::Validation(vec![FieldError::new(
                FILE_PART,
                "file name is required",
            )])),
            None => Err(ExchangeError::Validation(vec![FieldError::new(
                FILE_PART,
                "is required",
            )])),
        }
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}
