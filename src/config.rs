use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::direction::Direction;
use crate::error::{Result, BilingualError};

// Default values for optional pipeline settings
fn default_reference_examples() -> usize {
    3
}

fn default_keep_alive() -> String {
    "30m".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub pipeline: PipelineConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the web UI binds to
    pub host: String,
    /// Port the web UI listens on
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Ollama endpoint URL
    pub endpoint: String,
    /// Model used for each translation direction
    pub models: DirectionModels,
    /// Maximum retries for failed translation requests
    pub max_retries: u32,
    /// Timeout for a single inference request (seconds)
    pub request_timeout_secs: u64,
    /// Directory holding per-direction resources and reference examples
    pub resources_dir: PathBuf,
    /// Number of reference examples included in each prompt
    #[serde(default = "default_reference_examples")]
    pub reference_examples: usize,
    /// How long the inference server keeps a warmed model in memory
    #[serde(default = "default_keep_alive")]
    pub keep_alive: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionModels {
    /// Model for Arabic to English
    #[serde(rename = "ar-en")]
    pub ar_en: String,
    /// Model for English to Arabic
    #[serde(rename = "en-ar")]
    pub en_ar: String,
}

impl DirectionModels {
    pub fn for_direction(&self, direction: Direction) -> &str {
        match direction {
            Direction::ArEn => &self.ar_en,
            Direction::EnAr => &self.en_ar,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Page title shown in the browser and the page header
    pub page_title: String,
    /// Output directory that must exist before the UI starts
    pub visualizations_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8501,
            },
            pipeline: PipelineConfig {
                endpoint: "http://localhost:11434".to_string(),
                models: DirectionModels {
                    ar_en: "llama3.2:3b".to_string(),
                    en_ar: "llama3.2:3b".to_string(),
                },
                max_retries: 3,
                request_timeout_secs: 300,
                resources_dir: PathBuf::from(".bilingual/resources"),
                reference_examples: default_reference_examples(),
                keep_alive: default_keep_alive(),
            },
            ui: UiConfig {
                page_title: "Bilingual Translation System".to_string(),
                visualizations_dir: PathBuf::from("visualizations"),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BilingualError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| BilingualError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| BilingualError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| BilingualError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Address string for binding the web server
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
