use std::{path::PathBuf, sync::Arc, time::Duration};

use color_eyre::Result;
use engine::{
    ImageClient, SecretStore,
    image_model::{self, DEFAULT_ENDPOINT},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    /// Applies to the generation request and the image download separately
    pub request_timeout_secs: Option<u64>,
    /// Where the save dialog starts. Defaults to the pictures directory.
    pub save_dir: Option<PathBuf>,
    pub keyring_service: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            request_timeout_secs: Some(120),
            save_dir: None,
            keyring_service: "mudgiebo".into(),
        }
    }
}

#[derive(Clone)]
pub struct Context {
    pub config: Config,
    pub secrets: Arc<dyn SecretStore>,
    client: reqwest::Client,
}

impl Context {
    pub fn new(config: Config, secrets: Arc<dyn SecretStore>) -> Result<Self> {
        let client =
            image_model::http_client(config.request_timeout_secs.map(Duration::from_secs))?;
        Ok(Self {
            config,
            secrets,
            client,
        })
    }

    /// The stored API key, if there is a non-blank one
    pub fn stored_credential(&self) -> Option<String> {
        self.secrets.get().filter(|k| !k.trim().is_empty())
    }

    pub fn image_client(&self, credential: &str) -> ImageClient {
        ImageClient::new(self.client.clone(), &self.config.endpoint, credential)
    }
}
