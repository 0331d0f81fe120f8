//! Flow Orchestrator — owns the wizard state and every transition.
//!
//! States are data-carrying variants so illegal combinations (Results
//! without a result, Analyzing without preferences) cannot be constructed.
//! Only this module mutates the state; the UI drives it through the
//! transition methods and renders whatever state it is handed back.

use thiserror::Error;
use tracing::{error, info};

use crate::gemini::GeminiError;
use crate::models::{AnalysisResult, ImageFile, UserPreferences};

/// The one user-facing failure message. Every gateway error collapses to
/// this; the cause goes to the log, not the screen.
pub const ANALYSIS_ERROR_MESSAGE: &str =
    "Возникла проблема при анализе фото. Пожалуйста, попробуйте снова или проверьте интернет-соединение.";

/// Wizard position. Exactly one instance exists per process, inside
/// [`Flow`]. The machine is cyclic: retake always returns to Landing.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardState {
    Landing,
    Quiz,
    Upload {
        preferences: UserPreferences,
        /// Set when the previous analysis attempt failed; cleared on the
        /// next submission.
        error: Option<String>,
    },
    Analyzing {
        preferences: UserPreferences,
    },
    Results {
        result: AnalysisResult,
    },
}

impl WizardState {
    /// Short tag for logging.
    fn tag(&self) -> &'static str {
        match self {
            WizardState::Landing => "Landing",
            WizardState::Quiz => "Quiz",
            WizardState::Upload { .. } => "Upload",
            WizardState::Analyzing { .. } => "Analyzing",
            WizardState::Results { .. } => "Results",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FlowError {
    #[error("Transition '{attempted}' is not valid from state {from}")]
    InvalidTransition {
        from: &'static str,
        attempted: &'static str,
    },
}

/// Everything the gateway needs for one analysis call. Obtainable only via
/// [`Flow::begin_analysis`], so an analysis is never issued without both a
/// complete preference record and a selected image.
#[derive(Debug, Clone)]
pub struct AnalysisJob {
    pub preferences: UserPreferences,
    pub image: ImageFile,
}

/// The orchestrator. Created in Landing; nothing survives a process restart.
#[derive(Debug)]
pub struct Flow {
    state: WizardState,
}

impl Default for Flow {
    fn default() -> Self {
        Self::new()
    }
}

impl Flow {
    pub fn new() -> Self {
        Self {
            state: WizardState::Landing,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Landing → Quiz. User-initiated, no data required.
    pub fn begin_quiz(&mut self) -> Result<(), FlowError> {
        match self.state {
            WizardState::Landing => {
                self.transition(WizardState::Quiz);
                Ok(())
            }
            _ => Err(self.invalid("begin_quiz")),
        }
    }

    /// Quiz → Upload, storing the completed preferences.
    pub fn complete_quiz(&mut self, preferences: UserPreferences) -> Result<(), FlowError> {
        match self.state {
            WizardState::Quiz => {
                self.transition(WizardState::Upload {
                    preferences,
                    error: None,
                });
                Ok(())
            }
            _ => Err(self.invalid("complete_quiz")),
        }
    }

    /// Upload → Analyzing. Clears any prior error and returns the job the
    /// caller must hand to the gateway. The preferences stay in the state so
    /// a failure can restore them to Upload untouched.
    pub fn begin_analysis(&mut self, image: ImageFile) -> Result<AnalysisJob, FlowError> {
        match &self.state {
            WizardState::Upload { preferences, .. } => {
                let preferences = preferences.clone();
                let job = AnalysisJob {
                    preferences: preferences.clone(),
                    image,
                };
                self.transition(WizardState::Analyzing { preferences });
                Ok(job)
            }
            _ => Err(self.invalid("begin_analysis")),
        }
    }

    /// Analyzing → Results on success, Analyzing → Upload on failure.
    ///
    /// On failure the preferences are retained exactly as entered (the user
    /// does not redo the quiz) and the fixed user-facing message is set; the
    /// underlying error is logged here and goes no further.
    pub fn finish_analysis(
        &mut self,
        outcome: Result<AnalysisResult, GeminiError>,
    ) -> Result<(), FlowError> {
        match &self.state {
            WizardState::Analyzing { preferences } => match outcome {
                Ok(result) => {
                    info!(
                        "Analysis succeeded: {} recommendations",
                        result.recommendations.len()
                    );
                    self.transition(WizardState::Results { result });
                    Ok(())
                }
                Err(e) => {
                    error!("Analysis failed: {e}");
                    let preferences = preferences.clone();
                    self.transition(WizardState::Upload {
                        preferences,
                        error: Some(ANALYSIS_ERROR_MESSAGE.to_string()),
                    });
                    Ok(())
                }
            },
            _ => Err(self.invalid("finish_analysis")),
        }
    }

    /// Results → Landing. Preferences and result are dropped with their
    /// variants; the next run starts from scratch.
    pub fn retake(&mut self) -> Result<(), FlowError> {
        match self.state {
            WizardState::Results { .. } => {
                self.transition(WizardState::Landing);
                Ok(())
            }
            _ => Err(self.invalid("retake")),
        }
    }

    fn transition(&mut self, next: WizardState) {
        info!("Wizard: {} → {}", self.state.tag(), next.tag());
        self.state = next;
    }

    fn invalid(&self, attempted: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            from: self.state.tag(),
            attempted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetTier, Concern, ProductRecommendation, SkinType};
    use std::collections::BTreeSet;

    fn sample_preferences() -> UserPreferences {
        UserPreferences {
            skin_type: SkinType::Combination,
            concerns: BTreeSet::from([Concern::Acne, Concern::Redness]),
            budget: BudgetTier::Mid,
        }
    }

    fn sample_image() -> ImageFile {
        ImageFile {
            file_name: "selfie.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            skin_tone: "Светлый".to_string(),
            undertone: "Тёплый".to_string(),
            detected_features: vec!["Покраснения".to_string()],
            analysis_text: "Кожа в хорошем состоянии.".to_string(),
            recommendations: vec![ProductRecommendation {
                name: "Крем".to_string(),
                brand: "La Roche-Posay".to_string(),
                category: "Увлажняющий крем".to_string(),
                price: "1 490 ₽".to_string(),
                reason: "Успокаивает покраснения.".to_string(),
                rating: 4.5,
            }],
        }
    }

    fn flow_at_upload() -> Flow {
        let mut flow = Flow::new();
        flow.begin_quiz().unwrap();
        flow.complete_quiz(sample_preferences()).unwrap();
        flow
    }

    #[test]
    fn test_initial_state_is_landing() {
        assert_eq!(*Flow::new().state(), WizardState::Landing);
    }

    #[test]
    fn test_happy_path_reaches_results_with_verbatim_result() {
        let mut flow = flow_at_upload();
        let job = flow.begin_analysis(sample_image()).unwrap();
        assert_eq!(job.preferences, sample_preferences());
        assert_eq!(job.image.mime_type, "image/jpeg");
        assert!(matches!(flow.state(), WizardState::Analyzing { .. }));

        flow.finish_analysis(Ok(sample_result())).unwrap();
        match flow.state() {
            WizardState::Results { result } => assert_eq!(*result, sample_result()),
            other => panic!("expected Results, got {other:?}"),
        }
    }

    #[test]
    fn test_analysis_requires_preferences_and_image_by_construction() {
        // Without completing the quiz there is no Upload state, so no image
        // submission can start an analysis.
        let mut flow = Flow::new();
        assert!(flow.begin_analysis(sample_image()).is_err());
        flow.begin_quiz().unwrap();
        assert!(flow.begin_analysis(sample_image()).is_err());
    }

    #[test]
    fn test_failure_returns_to_upload_with_preferences_intact() {
        let mut flow = flow_at_upload();
        flow.begin_analysis(sample_image()).unwrap();
        flow.finish_analysis(Err(GeminiError::EmptyContent)).unwrap();

        match flow.state() {
            WizardState::Upload { preferences, error } => {
                assert_eq!(*preferences, sample_preferences());
                let message = error.as_deref().expect("error message must be set");
                assert!(!message.is_empty());
                assert_eq!(message, ANALYSIS_ERROR_MESSAGE);
            }
            other => panic!("expected Upload, got {other:?}"),
        }
    }

    #[test]
    fn test_all_failure_modes_collapse_to_the_same_message() {
        for err in [
            GeminiError::MissingApiKey,
            GeminiError::EmptyContent,
            GeminiError::Api {
                status: 429,
                message: "quota".to_string(),
            },
        ] {
            let mut flow = flow_at_upload();
            flow.begin_analysis(sample_image()).unwrap();
            flow.finish_analysis(Err(err)).unwrap();
            match flow.state() {
                WizardState::Upload { error, .. } => {
                    assert_eq!(error.as_deref(), Some(ANALYSIS_ERROR_MESSAGE));
                }
                other => panic!("expected Upload, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_resubmission_after_failure_clears_the_error() {
        let mut flow = flow_at_upload();
        flow.begin_analysis(sample_image()).unwrap();
        flow.finish_analysis(Err(GeminiError::EmptyContent)).unwrap();

        // Retry without redoing the quiz.
        flow.begin_analysis(sample_image()).unwrap();
        flow.finish_analysis(Ok(sample_result())).unwrap();
        assert!(matches!(flow.state(), WizardState::Results { .. }));
    }

    #[test]
    fn test_retake_returns_to_landing_and_drops_everything() {
        let mut flow = flow_at_upload();
        flow.begin_analysis(sample_image()).unwrap();
        flow.finish_analysis(Ok(sample_result())).unwrap();

        flow.retake().unwrap();
        assert_eq!(*flow.state(), WizardState::Landing);

        // The machine is cyclic: a fresh run starts from the quiz again.
        flow.begin_quiz().unwrap();
        assert_eq!(*flow.state(), WizardState::Quiz);
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let mut flow = Flow::new();
        assert!(flow.complete_quiz(sample_preferences()).is_err());
        assert!(flow.finish_analysis(Ok(sample_result())).is_err());
        assert!(flow.retake().is_err());

        flow.begin_quiz().unwrap();
        assert_eq!(
            flow.begin_quiz(),
            Err(FlowError::InvalidTransition {
                from: "Quiz",
                attempted: "begin_quiz",
            })
        );
    }
}
