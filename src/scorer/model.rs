use super::ScoringStrategy;
use crate::classifier::SpamModel;
use crate::error::Result;
use crate::verdict::{Assessment, EmailSample};

/// Scores with a trained classifier and its paired vectorizer.
///
/// A black-box model gives no per-indicator explanation, so assessments from
/// this strategy never carry indicators.
#[derive(Debug)]
pub struct StatisticalModelStrategy {
    model: SpamModel,
}

impl StatisticalModelStrategy {
    /// Fails when the vectorizer and classifier disagree on the feature space.
    pub fn new(model: SpamModel) -> Result<Self> {
        model.check_compatible()?;
        Ok(Self { model })
    }

    pub fn model(&self) -> &SpamModel {
        &self.model
    }
}

impl ScoringStrategy for StatisticalModelStrategy {
    fn name(&self) -> &str {
        "model"
    }

    fn score(&self, sample: &EmailSample) -> Result<Assessment> {
        let text = sample.combined_text();
        let prediction = self.model.predict(&text)?;

        log::debug!(
            "Model scoring: label={} spam_probability={:.4}",
            prediction.is_spam,
            prediction.spam_probability
        );

        Ok(Assessment {
            confidence: prediction.spam_probability,
            indicators: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::training::{demo_dataset, train, TrainingOptions};

    fn trained() -> StatisticalModelStrategy {
        let options = TrainingOptions {
            test_size: 0.0,
            ..TrainingOptions::default()
        };
        let outcome = train(&demo_dataset(), &options).unwrap();
        StatisticalModelStrategy::new(outcome.model).unwrap()
    }

    #[test]
    fn test_model_scores_without_indicators() {
        let strategy = trained();
        let assessment = strategy
            .score(&EmailSample::new("Claim your free prize now", "", ""))
            .unwrap();

        assert!(assessment.indicators.is_empty());
        assert!((0.0..=1.0).contains(&assessment.confidence));
    }

    #[test]
    fn test_model_separates_training_texts() {
        let strategy = trained();
        let spam = strategy
            .score(&EmailSample::new("click now to claim your free prize, you won", "", ""))
            .unwrap();
        let ham = strategy
            .score(&EmailSample::new("meeting tomorrow about the project deadline", "", ""))
            .unwrap();

        assert!(spam.confidence > ham.confidence);
    }
}
