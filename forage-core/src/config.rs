//! Storage and identity configuration from environment variables.

use std::env;
use std::path::{Path, PathBuf};

/// Default identity token template.
pub const DEFAULT_IDENTITY_TEMPLATE: &str = "recipe-store";

/// Where recipes and images are written, and who writes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Root directory for recipe records and images.
    pub data_dir: PathBuf,
    /// Public prefix for durable image references.
    pub image_base_url: String,
    /// Identity token for authorized writes. `None` writes anonymously.
    pub identity_token: Option<String>,
    /// Template name passed to the identity provider.
    pub identity_template: String,
}

impl StorageConfig {
    /// Load configuration from environment variables. Every variable is
    /// optional:
    /// - `FORAGE_DATA_DIR`: Data directory (default: "~/.forage/data")
    /// - `FORAGE_IMAGE_BASE_URL`: Image URL prefix (default: "file://{data_dir}/images")
    /// - `FORAGE_IDENTITY_TOKEN`: Identity token (default: none)
    /// - `FORAGE_IDENTITY_TEMPLATE`: Token template (default: "recipe-store")
    pub fn from_env() -> Self {
        let data_dir = env::var("FORAGE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_data_dir());

        let image_base_url = env::var("FORAGE_IMAGE_BASE_URL")
            .unwrap_or_else(|_| default_image_base_url(&data_dir));

        let identity_token = env::var("FORAGE_IDENTITY_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        let identity_template = env::var("FORAGE_IDENTITY_TEMPLATE")
            .unwrap_or_else(|_| DEFAULT_IDENTITY_TEMPLATE.to_string());

        Self {
            data_dir,
            image_base_url,
            identity_token,
            identity_template,
        }
    }

    /// Configuration rooted at `data_dir`, with defaults for everything else.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            image_base_url: default_image_base_url(&data_dir),
            data_dir,
            identity_token: None,
            identity_template: DEFAULT_IDENTITY_TEMPLATE.to_string(),
        }
    }

    /// Get the default data directory: ~/.forage/data
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".forage").join("data"))
            .unwrap_or_else(|| PathBuf::from("data"))
    }

    pub fn recipes_dir(&self) -> PathBuf {
        self.data_dir.join("recipes")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.data_dir.join("images")
    }
}

fn default_image_base_url(data_dir: &Path) -> String {
    format!("file://{}", data_dir.join("images").display())
}
