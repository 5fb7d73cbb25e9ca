use image::RgbaImage;
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tokio::task;

use crate::error::GenerationError;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/images/generations";

#[derive(Debug, Serialize)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    pub n: u8,
}

#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    pub data: Vec<GeneratedItem>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedItem {
    pub url: Option<String>,
}

/// The POST that asks for exactly one image for `prompt`
pub fn build_request(
    client: &Client,
    endpoint: &str,
    prompt: &str,
    api_key: &str,
) -> RequestBuilder {
    client
        .post(endpoint)
        .bearer_auth(api_key)
        .json(&GenerationRequest { prompt, n: 1 })
}

/// Sends a request made by [`build_request`] and returns the URL of the first
/// image
pub async fn query(request: RequestBuilder) -> Result<String, GenerationError> {
    let resp = request.send().await?;

    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(GenerationError::from_response(status, &body));
    }

    debug!("Generation response: {body}");
    parse_image_url(&body)
}

pub fn parse_image_url(body: &str) -> Result<String, GenerationError> {
    let response: GenerationResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::malformed(e.to_string()))?;

    response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::malformed("no images in response"))?
        .url
        .ok_or_else(|| GenerationError::malformed("first image has no url"))
}

/// Downloads the image behind `url` and decodes it on the blocking pool
pub async fn fetch(url: &str, client: &Client) -> Result<RgbaImage, GenerationError> {
    let resp = client.get(url).send().await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(GenerationError::from_response(status, &body));
    }

    let bytes = resp.bytes().await?;
    debug!("Downloaded {} image bytes", bytes.len());
    let decoded = task::spawn_blocking(move || image::load_from_memory(&bytes)).await??;
    Ok(decoded.into_rgba8())
}
