use crate::error::{DetectorError, Result};
use serde::{Deserialize, Serialize};

const HAM: usize = 0;
const SPAM: usize = 1;

/// Two-class multinomial Naive Bayes with additive smoothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNaiveBayes {
    alpha: f64,
    class_count: [f64; 2],
    class_log_prior: [f64; 2],
    feature_log_prob: [Vec<f64>; 2],
}

impl MultinomialNaiveBayes {
    pub fn fit(features: &[Vec<f64>], labels: &[bool], alpha: f64) -> Result<Self> {
        if features.is_empty() {
            return Err(DetectorError::Training("No training samples".to_string()));
        }
        if features.len() != labels.len() {
            return Err(DetectorError::Training(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(DetectorError::Training(format!(
                "Smoothing alpha must be positive, got {}",
                alpha
            )));
        }

        let n_features = features[0].len();
        if n_features == 0 {
            return Err(DetectorError::Training("Feature rows are empty".to_string()));
        }

        let mut class_count = [0.0f64; 2];
        let mut feature_count = [vec![0.0; n_features], vec![0.0; n_features]];

        for (row, &is_spam) in features.iter().zip(labels) {
            if row.len() != n_features {
                return Err(DetectorError::Training(format!(
                    "Ragged feature matrix: expected {} columns, got {}",
                    n_features,
                    row.len()
                )));
            }
            if row.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(DetectorError::Training(
                    "Feature values must be finite and non-negative".to_string(),
                ));
            }

            let class = if is_spam { SPAM } else { HAM };
            class_count[class] += 1.0;
            for (total, value) in feature_count[class].iter_mut().zip(row) {
                *total += value;
            }
        }

        if class_count[HAM] == 0.0 || class_count[SPAM] == 0.0 {
            return Err(DetectorError::Training(
                "Training data must contain both spam and ham samples".to_string(),
            ));
        }

        let total = class_count[HAM] + class_count[SPAM];
        let class_log_prior = [
            (class_count[HAM] / total).ln(),
            (class_count[SPAM] / total).ln(),
        ];

        let feature_log_prob = feature_count.map(|counts| {
            let smoothed_total = counts.iter().sum::<f64>() + alpha * n_features as f64;
            counts
                .iter()
                .map(|c| ((c + alpha) / smoothed_total).ln())
                .collect::<Vec<f64>>()
        });

        Ok(Self {
            alpha,
            class_count,
            class_log_prior,
            feature_log_prob,
        })
    }

    pub fn n_features(&self) -> usize {
        self.feature_log_prob[HAM].len()
    }

    pub fn is_consistent(&self) -> bool {
        self.feature_log_prob[HAM].len() == self.feature_log_prob[SPAM].len()
            && self
                .class_log_prior
                .iter()
                .chain(self.feature_log_prob.iter().flatten())
                .all(|v| v.is_finite())
    }

    fn joint_log_likelihood(&self, x: &[f64]) -> Result<[f64; 2]> {
        if !self.is_consistent() {
            return Err(DetectorError::ModelInference(
                "Classifier parameters are corrupted".to_string(),
            ));
        }
        if x.len() != self.n_features() {
            return Err(DetectorError::ModelInference(format!(
                "Feature vector has {} columns, classifier expects {}",
                x.len(),
                self.n_features()
            )));
        }

        let mut jll = self.class_log_prior;
        for (class, log_probs) in self.feature_log_prob.iter().enumerate() {
            jll[class] += x.iter().zip(log_probs).map(|(v, lp)| v * lp).sum::<f64>();
        }
        Ok(jll)
    }

    /// Probability of the spam class.
    pub fn predict_proba(&self, x: &[f64]) -> Result<f64> {
        let [ham, spam] = self.joint_log_likelihood(x)?;
        let max = ham.max(spam);
        let log_norm = max + ((ham - max).exp() + (spam - max).exp()).ln();
        let probability = (spam - log_norm).exp();

        if !probability.is_finite() {
            return Err(DetectorError::ModelInference(
                "Classifier produced a non-finite probability".to_string(),
            ));
        }
        Ok(probability)
    }

    /// Ties go to ham.
    pub fn predict(&self, x: &[f64]) -> Result<bool> {
        let [ham, spam] = self.joint_log_likelihood(x)?;
        Ok(spam > ham)
    }

    pub fn class_count(&self) -> (f64, f64) {
        (self.class_count[HAM], self.class_count[SPAM])
    }
}
