pub mod artifacts;
pub mod naive_bayes;
pub mod preprocess;
pub mod tfidf;
pub mod training;

pub use naive_bayes::MultinomialNaiveBayes;
pub use preprocess::TextPreprocessor;
pub use tfidf::TfidfVectorizer;

use crate::error::{DetectorError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub is_spam: bool,
    pub spam_probability: f64,
}

/// A vectorizer and the classifier trained on its feature space.
#[derive(Debug)]
pub struct SpamModel {
    vectorizer: TfidfVectorizer,
    classifier: MultinomialNaiveBayes,
}

impl SpamModel {
    /// No compatibility check here; see [`SpamModel::check_compatible`].
    pub fn from_parts(vectorizer: TfidfVectorizer, classifier: MultinomialNaiveBayes) -> Self {
        Self {
            vectorizer,
            classifier,
        }
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &MultinomialNaiveBayes {
        &self.classifier
    }

    pub fn check_compatible(&self) -> Result<()> {
        if !self.classifier.is_consistent() {
            return Err(DetectorError::ModelInference(
                "Classifier parameters are corrupted".to_string(),
            ));
        }
        if self.vectorizer.vocabulary_len() != self.classifier.n_features() {
            return Err(DetectorError::ModelInference(format!(
                "Vectorizer produces {} features but classifier was trained on {}",
                self.vectorizer.vocabulary_len(),
                self.classifier.n_features()
            )));
        }
        Ok(())
    }

    pub fn predict(&self, text: &str) -> Result<Prediction> {
        let features = self.vectorizer.transform(text)?;
        let spam_probability = self.classifier.predict_proba(&features)?;
        let is_spam = self.classifier.predict(&features)?;
        Ok(Prediction {
            is_spam,
            spam_probability,
        })
    }
}
