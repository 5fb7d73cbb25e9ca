use std::{io, path::PathBuf};

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tokio::task::JoinError;

/// Errors returned while turning a prompt into a bitmap
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("Unexpected response from the image API: {reason}")]
    MalformedResponse { reason: String },

    #[error("Couldn't decode the downloaded image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image decoding was interrupted: {0}")]
    Worker(#[from] JoinError),
}

impl GenerationError {
    /// Builds an `Api` error, preferring the `error.message` field of an OpenAI
    /// style error body over the raw text.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            error: ErrorDetail,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            message: String,
        }

        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| body.trim().to_string());
        Self::Api { status, message }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Couldn't encode the image as PNG: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Couldn't write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Image export was interrupted: {0}")]
    Worker(#[from] JoinError),
}

#[derive(Debug, Error)]
#[error("Secure credential storage failed: {0}")]
pub struct SecretStoreError(#[from] pub keyring::Error);
