// Translation pipeline abstraction
//
// The loader only ever talks to pipelines through the `TranslationPipeline` trait:
// - ollama: Pipeline backed by an Ollama-compatible inference server
// - clean: Text cleaning applied before inference
// - reference: Per-direction reference examples used as prompt guidance

pub mod clean;
pub mod ollama;
pub mod reference;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use clean::clean_text;
pub use ollama::OllamaPipeline;
pub use reference::{ReferenceExample, ReferenceSet};

use crate::config::PipelineConfig;
use crate::direction::Direction;
use crate::error::Result;

/// Result of a single translation call. Either all three fields are present or the call failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationOutput {
    /// Raw user input
    pub original: String,
    /// Normalized form of the input that was sent to the model
    pub cleaned: String,
    /// Model output
    pub translated: String,
}

/// Main trait for a direction-bound translation pipeline.
///
/// Initialization runs `setup_resources`, `load_data` and `load_model` in that
/// order, each to completion. Once ready the pipeline is shared, so
/// `translate_text` must be safe to call concurrently.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationPipeline: Send + Sync {
    /// Direction this pipeline was built for
    fn direction(&self) -> Direction;

    /// Allocate clients, directories and other resources
    async fn setup_resources(&mut self) -> Result<()>;

    /// Load reference data used during translation
    async fn load_data(&mut self) -> Result<()>;

    /// Load (or warm) the model weights
    async fn load_model(&mut self) -> Result<()>;

    /// Clean and translate a piece of text
    async fn translate_text(&self, text: &str) -> Result<TranslationOutput>;
}

/// Constructs fresh, uninitialized pipelines for a direction
pub trait PipelineFactory: Send + Sync {
    fn create(&self, direction: Direction) -> Result<Box<dyn TranslationPipeline>>;
}

/// Factory for Ollama-backed pipelines
pub struct OllamaPipelineFactory {
    config: PipelineConfig,
}

impl OllamaPipelineFactory {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }
}

impl PipelineFactory for OllamaPipelineFactory {
    fn create(&self, direction: Direction) -> Result<Box<dyn TranslationPipeline>> {
        Ok(Box::new(OllamaPipeline::new(direction, self.config.clone())))
    }
}
