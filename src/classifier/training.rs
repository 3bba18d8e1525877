use super::{MultinomialNaiveBayes, SpamModel, TfidfVectorizer};
use crate::error::{DetectorError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    #[serde(alias = "Text")]
    pub text: String,
    #[serde(deserialize_with = "flag_or_number")]
    pub spam: bool,
}

impl LabeledSample {
    pub fn new(text: &str, spam: bool) -> Self {
        Self {
            text: text.to_string(),
            spam,
        }
    }
}

/// Accepts `true`/`false` as well as `1`/`0`.
fn flag_or_number<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Label {
        Flag(bool),
        Number(i64),
    }

    match Label::deserialize(deserializer)? {
        Label::Flag(flag) => Ok(flag),
        Label::Number(0) => Ok(false),
        Label::Number(1) => Ok(true),
        Label::Number(other) => Err(serde::de::Error::custom(format!(
            "spam label must be 0 or 1, got {}",
            other
        ))),
    }
}

pub fn demo_dataset() -> Vec<LabeledSample> {
    vec![
        LabeledSample::new("You won a lottery click now", true),
        LabeledSample::new("Meeting at 10 am tomorrow", false),
        LabeledSample::new("Claim your free prize now", true),
        LabeledSample::new("Project submission deadline", false),
        LabeledSample::new("Urgent update your account", true),
        LabeledSample::new("Happy birthday have a nice day", false),
    ]
}

/// Reads a JSON array of `{"text": ..., "spam": ...}` objects.
pub fn load_dataset(path: &Path) -> Result<Vec<LabeledSample>> {
    let content = fs::read_to_string(path).map_err(|e| {
        DetectorError::Training(format!("Failed to read dataset {}: {}", path.display(), e))
    })?;
    let samples: Vec<LabeledSample> = serde_json::from_str(&content).map_err(|e| {
        DetectorError::Training(format!("Failed to parse dataset {}: {}", path.display(), e))
    })?;
    if samples.is_empty() {
        return Err(DetectorError::Training(format!(
            "Dataset {} is empty",
            path.display()
        )));
    }
    Ok(samples)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingOptions {
    /// Fraction held out for evaluation; `0.0` trains on everything.
    pub test_size: f64,
    pub seed: u64,
    pub alpha: f64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            test_size: 0.3,
            seed: 0,
            alpha: 1.0,
        }
    }
}

#[derive(Debug)]
pub struct TrainingOutcome {
    pub model: SpamModel,
    /// Percentage correct on the held-out split; `None` when nothing was held out.
    pub accuracy: Option<f64>,
    pub train_size: usize,
    pub test_size: usize,
}

/// Shuffles with a seeded RNG and holds out `ceil(test_size * n)` items.
pub fn train_test_split<T: Clone>(items: &[T], test_size: f64, seed: u64) -> Result<(Vec<T>, Vec<T>)> {
    if !(0.0..1.0).contains(&test_size) {
        return Err(DetectorError::Training(format!(
            "test_size must be within [0, 1), got {}",
            test_size
        )));
    }

    let n_test = (test_size * items.len() as f64).ceil() as usize;
    if n_test >= items.len() {
        return Err(DetectorError::Training(format!(
            "Holding out {} of {} samples leaves nothing to train on",
            n_test,
            items.len()
        )));
    }

    let mut indices: Vec<usize> = (0..items.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test = indices[..n_test].iter().map(|&i| items[i].clone()).collect();
    let train = indices[n_test..].iter().map(|&i| items[i].clone()).collect();
    Ok((train, test))
}

pub fn accuracy(predicted: &[bool], actual: &[bool]) -> Option<f64> {
    if predicted.is_empty() || predicted.len() != actual.len() {
        return None;
    }
    let correct = predicted.iter().zip(actual).filter(|(p, a)| p == a).count();
    Some(correct as f64 / predicted.len() as f64 * 100.0)
}

/// Fits the vectorizer on every sample, then the classifier on the training split.
pub fn train(samples: &[LabeledSample], options: &TrainingOptions) -> Result<TrainingOutcome> {
    let texts: Vec<&str> = samples.iter().map(|s| s.text.as_str()).collect();
    let vectorizer = TfidfVectorizer::fit(&texts)?;

    let (train_set, test_set) = train_test_split(samples, options.test_size, options.seed)?;

    let train_features = vectorizer.transform_all(
        &train_set.iter().map(|s| s.text.as_str()).collect::<Vec<_>>(),
    )?;
    let train_labels: Vec<bool> = train_set.iter().map(|s| s.spam).collect();
    let classifier = MultinomialNaiveBayes::fit(&train_features, &train_labels, options.alpha)?;

    let mut predicted = Vec::with_capacity(test_set.len());
    for sample in &test_set {
        let features = vectorizer.transform(&sample.text)?;
        predicted.push(classifier.predict(&features)?);
    }
    let actual: Vec<bool> = test_set.iter().map(|s| s.spam).collect();
    let accuracy = accuracy(&predicted, &actual);

    log::info!(
        "Trained spam model on {} samples ({} held out, {} features)",
        train_set.len(),
        test_set.len(),
        vectorizer.vocabulary_len()
    );
    let (ham, spam) = classifier.class_count();
    log::debug!("Training split: {} ham, {} spam", ham, spam);
    log::debug!("Vocabulary: {}", vectorizer.feature_names().join(" "));

    Ok(TrainingOutcome {
        model: SpamModel::from_parts(vectorizer, classifier),
        accuracy,
        train_size: train_set.len(),
        test_size: test_set.len(),
    })
}
