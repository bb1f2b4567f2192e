//! Render-pass controller: one user action in, one view state out.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::direction::Direction;
use crate::loader::PipelineLoader;
use crate::pipeline::TranslationOutput;

pub const EMPTY_INPUT_WARNING: &str = "Please enter text for translation";
pub const SUCCESS_MESSAGE: &str = "Translation completed successfully!";

/// Page tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Translate,
    Info,
}

/// User actions a render pass can carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectDirection(Direction),
    Submit(String),
    Clear,
}

/// Whether the pipeline for the current direction could be loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Ready,
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationView {
    pub result: TranslationOutput,
    pub elapsed: Duration,
}

impl TranslationView {
    /// Elapsed time as shown in the details block
    pub fn elapsed_display(&self) -> String {
        format!("{:.2} seconds", self.elapsed.as_secs_f64())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Idle,
    Warning(String),
    Translated(TranslationView),
    Failed(String),
}

/// Everything needed to render the page after one pass
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub direction: Direction,
    pub tab: Tab,
    pub input: String,
    pub availability: Availability,
    pub outcome: Outcome,
}

impl ViewState {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            tab: Tab::default(),
            input: String::new(),
            availability: Availability::Ready,
            outcome: Outcome::Idle,
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.tab = tab;
        self
    }

    pub fn input_label(&self) -> &'static str {
        self.direction.input_label()
    }

    pub fn output_label(&self) -> &'static str {
        self.direction.output_label()
    }

    /// Translation controls are disabled while the pipeline cannot be loaded
    pub fn can_translate(&self) -> bool {
        self.availability == Availability::Ready
    }

    /// The translation produced by this pass, or the message shown instead
    pub fn translation(&self) -> std::result::Result<&TranslationView, String> {
        if let Availability::Unavailable(message) = &self.availability {
            return Err(message.clone());
        }

        match &self.outcome {
            Outcome::Translated(translation) => Ok(translation),
            Outcome::Warning(message) | Outcome::Failed(message) => Err(message.clone()),
            Outcome::Idle => Err("No translation was requested".to_string()),
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(Direction::default())
    }
}

pub struct Controller {
    loader: Arc<PipelineLoader>,
}

impl Controller {
    pub fn new(loader: Arc<PipelineLoader>) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &Arc<PipelineLoader> {
        &self.loader
    }

    /// Run one render pass for `action` starting from `current`
    pub async fn handle(&self, current: &ViewState, action: Action) -> ViewState {
        let mut next = ViewState {
            outcome: Outcome::Idle,
            ..current.clone()
        };

        if let Action::SelectDirection(direction) = &action {
            next.direction = *direction;
        }

        let pipeline = match self.loader.load(next.direction).await {
            Ok(pipeline) => {
                next.availability = Availability::Ready;
                Some(pipeline)
            }
            Err(e) => {
                next.availability = Availability::Unavailable(e.to_string());
                None
            }
        };

        match action {
            Action::SelectDirection(_) => {}
            Action::Clear => {
                next.input.clear();
            }
            Action::Submit(text) => {
                next.tab = Tab::Translate;
                next.input = text;

                if next.input.trim().is_empty() {
                    next.outcome = Outcome::Warning(EMPTY_INPUT_WARNING.to_string());
                } else if let Some(pipeline) = pipeline {
                    let started = Instant::now();
                    let result = pipeline.translate_text(&next.input).await;
                    let elapsed = started.elapsed();

                    next.outcome = match result {
                        Ok(result) => {
                            info!(
                                "Translated {} characters ({}) in {:.2}s",
                                result.original.chars().count(),
                                next.direction,
                                elapsed.as_secs_f64()
                            );
                            Outcome::Translated(TranslationView { result, elapsed })
                        }
                        Err(e) => {
                            warn!("Translation failed ({}): {}", next.direction, e);
                            Outcome::Failed(format!("Translation failed: {}", e))
                        }
                    };
                }
            }
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoadStatus;
    use crate::loader::tests::RecordingFactory;
    use std::sync::atomic::Ordering;

    fn controller(factory: Arc<RecordingFactory>) -> Controller {
        Controller::new(Arc::new(PipelineLoader::new(factory)))
    }

    #[tokio::test]
    async fn test_submit_renders_original_and_translation() {
        let factory = Arc::new(RecordingFactory::default());
        let controller = controller(Arc::clone(&factory));

        let view = controller
            .handle(&ViewState::default(), Action::Submit("hello".to_string()))
            .await;

        match &view.outcome {
            Outcome::Translated(translation) => {
                assert_eq!(translation.result.original, "hello");
                assert_eq!(translation.result.translated, "bonjour");
                assert_eq!(translation.result.cleaned, "hello");
                assert!(translation.elapsed >= Duration::ZERO);
            }
            other => panic!("expected translation, got {:?}", other),
        }
        assert_eq!(view.input, "hello");
        assert_eq!(view.translation().unwrap().result.translated, "bonjour");
        assert_eq!(factory.translate_calls(), 1);
    }

    #[tokio::test]
    async fn test_blank_submit_warns_without_translating() {
        let factory = Arc::new(RecordingFactory::default());
        let controller = controller(Arc::clone(&factory));

        for input in ["", "   ", "\n\t "] {
            let view = controller
                .handle(&ViewState::default(), Action::Submit(input.to_string()))
                .await;
            assert_eq!(view.outcome, Outcome::Warning(EMPTY_INPUT_WARNING.to_string()));
            assert_eq!(view.translation().err().as_deref(), Some(EMPTY_INPUT_WARNING));
        }
        assert_eq!(factory.translate_calls(), 0);
    }

    #[tokio::test]
    async fn test_clear_empties_input_without_translating() {
        let factory = Arc::new(RecordingFactory::default());
        let controller = controller(Arc::clone(&factory));

        let translated = controller
            .handle(&ViewState::default(), Action::Submit("hello".to_string()))
            .await;
        let cleared = controller.handle(&translated, Action::Clear).await;

        assert_eq!(cleared.input, "");
        assert_eq!(cleared.outcome, Outcome::Idle);
        assert_eq!(factory.translate_calls(), 1);

        let cleared_again = controller
            .handle(&ViewState::default().with_input("مرحبا"), Action::Clear)
            .await;
        assert_eq!(cleared_again.input, "");
        assert_eq!(factory.translate_calls(), 1);
    }

    #[tokio::test]
    async fn test_select_direction_changes_labels_only() {
        let factory = Arc::new(RecordingFactory::default());
        let controller = controller(Arc::clone(&factory));

        let first = controller
            .handle(&ViewState::default(), Action::SelectDirection(Direction::ArEn))
            .await;
        let ar_en = controller.loader().load(Direction::ArEn).await.unwrap();
        assert_eq!(first.input_label(), "Arabic text");
        assert_eq!(first.output_label(), "English text");

        let switched = controller
            .handle(&first.clone().with_input("draft"), Action::SelectDirection(Direction::EnAr))
            .await;
        assert_eq!(switched.input_label(), "English text");
        assert_eq!(switched.output_label(), "Arabic text");
        assert_eq!(switched.input, "draft");
        assert_eq!(switched.outcome, Outcome::Idle);

        let back = controller
            .handle(&switched, Action::SelectDirection(Direction::ArEn))
            .await;
        assert_eq!(back.direction, Direction::ArEn);

        let ar_en_again = controller.loader().load(Direction::ArEn).await.unwrap();
        assert!(Arc::ptr_eq(&ar_en, &ar_en_again));
        assert_eq!(factory.created.load(Ordering::SeqCst), 2);
        assert_eq!(factory.translate_calls(), 0);
    }

    #[tokio::test]
    async fn test_translate_failure_is_recoverable() {
        let factory = Arc::new(RecordingFactory {
            fail_translations: true,
            ..Default::default()
        });
        let controller = controller(Arc::clone(&factory));

        let view = controller
            .handle(&ViewState::default(), Action::Submit("hello".to_string()))
            .await;

        match &view.outcome {
            Outcome::Failed(message) => assert!(message.contains("model crashed")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(view.can_translate());
        assert!(controller.loader().status(Direction::ArEn).await.is_ready());
        assert_eq!(factory.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_failure_blocks_translation_until_retry_succeeds() {
        let factory = Arc::new(RecordingFactory::default());
        factory.fail_model_loads.store(1, Ordering::SeqCst);
        let controller = controller(Arc::clone(&factory));

        let blocked = controller
            .handle(&ViewState::default(), Action::Submit("hello".to_string()))
            .await;
        assert!(!blocked.can_translate());
        assert_eq!(blocked.outcome, Outcome::Idle);
        assert!(blocked.translation().unwrap_err().contains("weights unavailable"));
        assert_eq!(blocked.input, "hello");
        assert_eq!(factory.translate_calls(), 0);
        assert!(matches!(
            controller.loader().status(Direction::ArEn).await,
            LoadStatus::Failed { .. }
        ));

        let retried = controller
            .handle(&blocked, Action::Submit("hello".to_string()))
            .await;
        assert!(retried.can_translate());
        assert!(matches!(retried.outcome, Outcome::Translated(_)));
    }

    #[test]
    fn test_elapsed_display_uses_two_decimals() {
        let view = TranslationView {
            result: TranslationOutput {
                original: "a".into(),
                cleaned: "a".into(),
                translated: "b".into(),
            },
            elapsed: Duration::from_millis(1234),
        };
        assert_eq!(view.elapsed_display(), "1.23 seconds");
    }
}
