pub mod error;
pub mod export;
pub mod image_model;
pub mod secret_store;

pub use error::{ExportError, GenerationError, SecretStoreError};
pub use image_model::{Bitmap, GeneratedImage, ImageClient};
pub use secret_store::{KeyringStore, SecretStore};
#[cfg(any(test, feature = "test-util"))]
pub use secret_store::MemoryStore;
