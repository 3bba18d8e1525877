use super::{MultinomialNaiveBayes, SpamModel, TfidfVectorizer};
use crate::error::{DetectorError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub fn save(model: &SpamModel, model_path: &Path, vectorizer_path: &Path) -> Result<()> {
    write_json(model.classifier(), model_path)?;
    write_json(model.vectorizer(), vectorizer_path)?;
    log::info!(
        "Saved model artifacts to {} and {}",
        model_path.display(),
        vectorizer_path.display()
    );
    Ok(())
}

/// Loads both artifacts. Whether they fit together is checked by the scorer.
pub fn load(model_path: &Path, vectorizer_path: &Path) -> Result<SpamModel> {
    let classifier: MultinomialNaiveBayes = read_json(model_path)?;
    let vectorizer: TfidfVectorizer = read_json(vectorizer_path)?;
    Ok(SpamModel::from_parts(vectorizer, classifier))
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                DetectorError::ModelArtifact(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| DetectorError::ModelArtifact(e.to_string()))?;
    fs::write(path, json).map_err(|e| {
        DetectorError::ModelArtifact(format!("Failed to write {}: {}", path.display(), e))
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        DetectorError::ModelArtifact(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        DetectorError::ModelArtifact(format!("Failed to parse {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::training::{demo_dataset, train, TrainingOptions};
    use crate::heuristic_config::HeuristicConfig;
    use crate::scorer::{EmailRiskScorer, ScoringMode};

    #[test]
    fn test_saved_artifacts_load_into_model_mode() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("models/ml_model.json");
        let vectorizer_path = dir.path().join("models/vectorizer.json");

        let outcome = train(&demo_dataset(), &TrainingOptions::default()).unwrap();
        let before = outcome.model.predict("claim your free prize").unwrap();
        save(&outcome.model, &model_path, &vectorizer_path).unwrap();

        let loaded = load(&model_path, &vectorizer_path).unwrap();
        let after = loaded.predict("claim your free prize").unwrap();
        assert_eq!(before.is_spam, after.is_spam);
        assert!((before.spam_probability - after.spam_probability).abs() < 1e-12);

        let scorer =
            EmailRiskScorer::from_artifacts(HeuristicConfig::default(), &model_path, &vectorizer_path)
                .unwrap();
        assert_eq!(scorer.mode(), ScoringMode::Model);
    }

    #[test]
    fn test_corrupted_artifact_falls_back_to_rules() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("ml_model.json");
        let vectorizer_path = dir.path().join("vectorizer.json");
        fs::write(&model_path, "{ not json").unwrap();
        fs::write(&vectorizer_path, "{}").unwrap();

        assert!(matches!(
            load(&model_path, &vectorizer_path),
            Err(DetectorError::ModelArtifact(_))
        ));

        let scorer =
            EmailRiskScorer::from_artifacts(HeuristicConfig::default(), &model_path, &vectorizer_path)
                .unwrap();
        assert_eq!(scorer.mode(), ScoringMode::RuleBased);
    }
}
