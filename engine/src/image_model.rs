use std::{fmt, sync::Arc, time::Duration};

use chrono::{DateTime, Local};
use image::RgbaImage;
use log::info;
use reqwest::Client;

use crate::error::GenerationError;

pub mod open_ai_api;
pub use open_ai_api::DEFAULT_ENDPOINT;

pub type Bitmap = RgbaImage;

/// A decoded generation result together with what produced it
#[derive(Clone)]
pub struct GeneratedImage {
    pub bitmap: Arc<Bitmap>,
    pub prompt: String,
    pub created_at: DateTime<Local>,
}

impl fmt::Debug for GeneratedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedImage")
            .field("size", &self.bitmap.dimensions())
            .field("prompt", &self.prompt)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl GeneratedImage {
    pub fn new(bitmap: Bitmap, prompt: impl Into<String>) -> Self {
        Self {
            bitmap: Arc::new(bitmap),
            prompt: prompt.into(),
            created_at: Local::now(),
        }
    }
}

pub fn http_client(timeout: Option<Duration>) -> reqwest::Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// Generation client bound to one API key. Build a new one whenever the key
/// changes.
#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ImageClient {
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// The generation request `generate` sends for `prompt`
    pub fn generation_request(&self, prompt: &str) -> reqwest::RequestBuilder {
        open_ai_api::build_request(&self.client, &self.endpoint, prompt, &self.api_key)
    }

    /// Returns the URL of the generated image
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        open_ai_api::query(self.generation_request(prompt)).await
    }

    pub async fn fetch(&self, url: &str) -> Result<Bitmap, GenerationError> {
        open_ai_api::fetch(url, &self.client).await
    }

    /// Generates an image for `prompt` and downloads it. The download only
    /// starts once the generation request succeeded.
    pub async fn get_image(&self, prompt: &str) -> Result<GeneratedImage, GenerationError> {
        info!("Requesting image for {prompt:?}");
        let url = self.generate(prompt).await?;
        let bitmap = self.fetch(&url).await?;
        info!("Received {}x{} image", bitmap.width(), bitmap.height());

        Ok(GeneratedImage::new(bitmap, prompt))
    }
}
