use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::direction::{language_name, Direction};
use crate::error::{Result, BilingualError};
use super::{clean_text, ReferenceSet, TranslationOutput, TranslationPipeline};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    pub text: String,
}

/// Pipeline backed by an Ollama-compatible inference server
pub struct OllamaPipeline {
    direction: Direction,
    config: PipelineConfig,
    client: Option<Client>,
    resource_dir: PathBuf,
    references: ReferenceSet,
}

impl OllamaPipeline {
    pub fn new(direction: Direction, config: PipelineConfig) -> Self {
        let resource_dir = config.resources_dir.join(direction.code());
        Self {
            direction,
            config,
            client: None,
            resource_dir,
            references: ReferenceSet::default(),
        }
    }

    fn model(&self) -> &str {
        self.config.models.for_direction(self.direction)
    }

    fn client(&self) -> Result<&Client> {
        self.client.as_ref().ok_or_else(|| {
            BilingualError::Model("Resources are not set up; call setup_resources first".to_string())
        })
    }

    /// Send one generation request and extract the translation
    async fn request_translation(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: self.model().to_string(),
            prompt: prompt.to_string(),
            stream: false,
            format: Some("json".to_string()),
            keep_alive: Some(self.config.keep_alive.clone()),
        };

        let url = format!("{}/api/generate", self.config.endpoint);
        debug!("Sending translation request to: {}", url);

        let response = self.client()?
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BilingualError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(BilingualError::Translation(format!(
                "Ollama API error {}: {}", status, error_text
            )));
        }

        let generated: GenerateResponse = response.json().await
            .map_err(|e| BilingualError::Translation(format!("Failed to parse response: {}", e)))?;

        let raw_response = generated.response.trim();
        debug!("Raw Ollama response: {}", raw_response);

        extract_translation(raw_response)
    }
}

#[async_trait]
impl TranslationPipeline for OllamaPipeline {
    fn direction(&self) -> Direction {
        self.direction
    }

    async fn setup_resources(&mut self) -> Result<()> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.request_timeout_secs))
            .user_agent(concat!("bilingual/", env!("CARGO_PKG_VERSION")))
            .build()?;

        tokio::fs::create_dir_all(&self.resource_dir).await?;
        self.client = Some(client);

        info!("Resources ready for {} in {}", self.direction, self.resource_dir.display());
        Ok(())
    }

    async fn load_data(&mut self) -> Result<()> {
        let path = self.resource_dir.join("reference.json");
        self.references = ReferenceSet::load(&path).await?;
        info!("Loaded {} reference examples for {}", self.references.len(), self.direction);
        Ok(())
    }

    async fn load_model(&mut self) -> Result<()> {
        let model = self.model().to_string();
        let client = self.client()?;

        let response = client
            .post(format!("{}/api/show", self.config.endpoint))
            .json(&json!({ "name": model }))
            .send()
            .await
            .map_err(|e| BilingualError::Model(format!("Failed to connect to Ollama: {}", e)))?;

        if !response.status().is_success() {
            return Err(BilingualError::Model(format!(
                "Ollama model '{}' not found. Please pull the model first: ollama pull {}",
                model, model
            )));
        }

        // An empty prompt makes the server load the weights without generating
        let warm_up = GenerateRequest {
            model: model.clone(),
            prompt: String::new(),
            stream: false,
            format: None,
            keep_alive: Some(self.config.keep_alive.clone()),
        };

        let response = client
            .post(format!("{}/api/generate", self.config.endpoint))
            .json(&warm_up)
            .send()
            .await
            .map_err(|e| BilingualError::Model(format!("Failed to warm up model '{}': {}", model, e)))?;

        if !response.status().is_success() {
            return Err(BilingualError::Model(format!(
                "Ollama refused to load model '{}': {}", model, response.status()
            )));
        }

        info!("Ollama model '{}' is loaded for {}", model, self.direction);
        Ok(())
    }

    async fn translate_text(&self, text: &str) -> Result<TranslationOutput> {
        let cleaned = clean_text(text, self.direction.source_language());
        if cleaned.is_empty() {
            return Err(BilingualError::Translation(
                "Input contains no translatable text after cleaning".to_string(),
            ));
        }

        let prompt = build_translation_prompt(
            &cleaned,
            self.direction,
            &self.references,
            self.config.reference_examples,
        );

        let mut last_error = None;
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                debug!("Retrying translation (attempt {}/{})", attempt + 1, self.config.max_retries + 1);
            }

            match self.request_translation(&prompt).await {
                Ok(translated) => {
                    return Ok(TranslationOutput {
                        original: text.to_string(),
                        cleaned,
                        translated,
                    });
                }
                Err(e) => {
                    warn!("Translation attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            BilingualError::Translation("Translation failed without a response".to_string())
        }))
    }
}

/// Build the translation prompt, asking for JSON output
fn build_translation_prompt(
    text: &str,
    direction: Direction,
    references: &ReferenceSet,
    example_limit: usize,
) -> String {
    let source_name = language_name(direction.source_language());
    let target_name = language_name(direction.target_language());

    let mut prompt = format!(
        "You are a professional {} to {} translator.\n\
         \n\
         CRITICAL: You must translate the text to {} ONLY.\n\
         Return ONLY the translation in JSON format as {{\"text\":\"your {} translation here\"}}.\n\
         Do not include any explanations, alternatives, or text in other languages.\n\
         \n",
        source_name, target_name, target_name, target_name
    );

    let examples = references.select(example_limit);
    if !examples.is_empty() {
        prompt.push_str("[Reference translations]\n");
        for example in examples {
            prompt.push_str(&format!("{}: {}\n{}: {}\n", source_name, example.source, target_name, example.target));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!("[Text to translate]\n{}\n", text));
    prompt
}

/// Pull the translation out of a model response
fn extract_translation(raw_response: &str) -> Result<String> {
    if raw_response.is_empty() {
        return Err(BilingualError::Translation("Empty translation received".to_string()));
    }

    if let Ok(result) = serde_json::from_str::<TranslationResult>(raw_response) {
        let text = result.text.trim();
        if text.is_empty() {
            return Err(BilingualError::Translation("Empty translation received".to_string()));
        }
        return Ok(text.to_string());
    }

    Ok(clean_translation_response(raw_response))
}

/// Clean up a free-form response to extract just the translation
fn clean_translation_response(response: &str) -> String {
    let lines: Vec<&str> = response.lines().collect();

    for &line in &lines {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with("Here is") ||
           trimmed.starts_with("Here's") ||
           trimmed.starts_with("Translation:") ||
           trimmed.starts_with("- ") ||
           trimmed.starts_with("* ") {
            continue;
        }

        if trimmed.starts_with("**") && trimmed.ends_with("**") {
            continue;
        }

        return trimmed.to_string();
    }

    response.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::pipeline::ReferenceExample;

    #[test]
    fn test_prompt_names_languages_and_text() {
        let prompt = build_translation_prompt("مرحبا", Direction::ArEn, &ReferenceSet::default(), 3);
        assert!(prompt.contains("Arabic to English"));
        assert!(prompt.contains("[Text to translate]\nمرحبا"));
        assert!(!prompt.contains("[Reference translations]"));
    }

    #[test]
    fn test_prompt_includes_limited_examples() {
        let references = ReferenceSet::new(vec![
            ReferenceExample { source: "hello".into(), target: "مرحبا".into() },
            ReferenceExample { source: "thanks".into(), target: "شكرا".into() },
        ]);
        let prompt = build_translation_prompt("good night", Direction::EnAr, &references, 1);
        assert!(prompt.contains("English: hello\nArabic: مرحبا"));
        assert!(!prompt.contains("thanks"));
    }

    #[test]
    fn test_extract_json_translation() {
        assert_eq!(extract_translation(r#"{"text": " Good morning "}"#).unwrap(), "Good morning");
        assert!(extract_translation(r#"{"text": ""}"#).is_err());
        assert!(extract_translation("").is_err());
    }

    #[test]
    fn test_extract_falls_back_to_first_meaningful_line() {
        let response = "Here is the translation:\n\n**Result**\nGood morning\nextra";
        assert_eq!(extract_translation(response).unwrap(), "Good morning");
    }

    #[tokio::test]
    async fn test_model_load_requires_resources() {
        let mut pipeline = OllamaPipeline::new(Direction::ArEn, Config::default().pipeline);
        let err = pipeline.load_model().await.unwrap_err();
        assert!(matches!(err, BilingualError::Model(_)));
    }

    #[tokio::test]
    async fn test_setup_and_data_use_direction_directory() {
        let temp = tempfile::tempdir().unwrap();
        let mut config = Config::default().pipeline;
        config.resources_dir = temp.path().to_path_buf();

        let mut pipeline = OllamaPipeline::new(Direction::EnAr, config);
        pipeline.setup_resources().await.unwrap();
        assert!(temp.path().join("en-ar").is_dir());

        std::fs::write(
            temp.path().join("en-ar").join("reference.json"),
            r#"[{"source": "hello", "target": "مرحبا"}]"#,
        ).unwrap();
        pipeline.load_data().await.unwrap();
        assert_eq!(pipeline.references.len(), 1);
    }

    #[tokio::test]
    async fn test_noise_only_input_fails_before_any_request() {
        let pipeline = OllamaPipeline::new(Direction::EnAr, Config::default().pipeline);
        let err = pipeline.translate_text("   https://example.com  ").await.unwrap_err();
        assert!(matches!(err, BilingualError::Translation(_)));
    }
}
