pub mod model;
pub mod rules;

pub use model::StatisticalModelStrategy;
pub use rules::RuleBasedStrategy;

use crate::classifier::{artifacts, SpamModel};
use crate::error::Result;
use crate::heuristic_config::{HeuristicConfig, Thresholds};
use crate::verdict::{Assessment, EmailSample, Verdict};
use std::path::Path;

pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &str;
    fn score(&self, sample: &EmailSample) -> Result<Assessment>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMode {
    Model,
    RuleBased,
}

impl ScoringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMode::Model => "model",
            ScoringMode::RuleBased => "rule-based",
        }
    }
}

/// Maps an email to a [`Verdict`].
///
/// The strategy is chosen once, when the scorer is built. If the chosen
/// strategy fails on a particular email, that call is re-scored by the rule
/// engine and the failure is only logged.
pub struct EmailRiskScorer {
    primary: Box<dyn ScoringStrategy>,
    fallback: RuleBasedStrategy,
    thresholds: Thresholds,
    mode: ScoringMode,
}

impl EmailRiskScorer {
    /// Model-backed when `model` is present and its parts agree, rule-based otherwise.
    pub fn new(heuristics: HeuristicConfig, model: Option<SpamModel>) -> Result<Self> {
        let fallback = RuleBasedStrategy::new(heuristics)?;
        let thresholds = fallback.config().thresholds;

        let (primary, mode): (Box<dyn ScoringStrategy>, ScoringMode) = match model {
            Some(model) => match StatisticalModelStrategy::new(model) {
                Ok(strategy) => (Box::new(strategy), ScoringMode::Model),
                Err(e) => {
                    log::warn!("Model artifacts unusable, using rule-based detection: {}", e);
                    (Box::new(fallback.clone()), ScoringMode::RuleBased)
                }
            },
            None => (Box::new(fallback.clone()), ScoringMode::RuleBased),
        };

        log::info!("Email risk scorer ready ({} mode)", mode.as_str());

        Ok(Self {
            primary,
            fallback,
            thresholds,
            mode,
        })
    }

    pub fn rule_based(heuristics: HeuristicConfig) -> Result<Self> {
        Self::new(heuristics, None)
    }

    /// Loads model artifacts if both files can be read; missing or broken
    /// artifacts select rule-based mode.
    pub fn from_artifacts(
        heuristics: HeuristicConfig,
        model_path: &Path,
        vectorizer_path: &Path,
    ) -> Result<Self> {
        let model = match artifacts::load(model_path, vectorizer_path) {
            Ok(model) => Some(model),
            Err(e) => {
                log::warn!("ML model files not loaded ({}). Using rule-based detection.", e);
                None
            }
        };
        Self::new(heuristics, model)
    }

    pub fn with_strategy(
        strategy: Box<dyn ScoringStrategy>,
        heuristics: HeuristicConfig,
        mode: ScoringMode,
    ) -> Result<Self> {
        let fallback = RuleBasedStrategy::new(heuristics)?;
        let thresholds = fallback.config().thresholds;
        Ok(Self {
            primary: strategy,
            fallback,
            thresholds,
            mode,
        })
    }

    pub fn mode(&self) -> ScoringMode {
        self.mode
    }

    pub fn strategy_name(&self) -> &str {
        self.primary.name()
    }

    pub fn predict(&self, sample: &EmailSample) -> Verdict {
        let assessment = match self.primary.score(sample) {
            Ok(assessment) => assessment,
            Err(e) => {
                log::warn!(
                    "{} scoring failed, falling back to rules: {}",
                    self.primary.name(),
                    e
                );
                self.fallback.assess(sample)
            }
        };

        Verdict::from_assessment(assessment, &self.thresholds)
    }

    pub fn predict_email(&self, body: &str, subject: &str, sender: &str) -> Verdict {
        self.predict(&EmailSample::new(body, subject, sender))
    }
}

impl Default for EmailRiskScorer {
    fn default() -> Self {
        Self::rule_based(HeuristicConfig::default()).unwrap()
    }
}
