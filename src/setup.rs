use std::path::{Path, PathBuf};
use std::time::Duration;
use reqwest::Client;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, BilingualError};

/// Prepares the working directories the application expects before serving
pub struct SetupManager {
    client: Client,
    endpoint: String,
    directories: Vec<PathBuf>,
}

impl SetupManager {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("bilingual/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(BilingualError::Http)?;

        Ok(Self {
            client,
            endpoint: config.pipeline.endpoint.clone(),
            directories: vec![
                config.ui.visualizations_dir.clone(),
                config.pipeline.resources_dir.clone(),
            ],
        })
    }

    /// Create every required directory if it doesn't exist
    pub fn initialize(&self) -> Result<()> {
        for dir in &self.directories {
            ensure_dir(dir)?;
        }
        info!("Initialization completed successfully");
        Ok(())
    }

    /// Check whether the inference server answers at all.
    /// An unreachable server is reported but not fatal; pipelines fail on load instead.
    pub async fn check_endpoint(&self) -> bool {
        let url = format!("{}/api/tags", self.endpoint);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Inference server reachable at {}", self.endpoint);
                true
            }
            Ok(response) => {
                warn!("Inference server at {} answered {}", self.endpoint, response.status());
                false
            }
            Err(e) => {
                warn!("Inference server at {} is not reachable: {}", self.endpoint, e);
                false
            }
        }
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        info!("Created directory {}", dir.display());
    }
    Ok(())
}
