use crate::error::{DetectorError, Result};
use crate::verdict::Severity;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A phrase matched by substring against lowercased text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhraseRule {
    pub phrase: String,
    pub weight: f64,
    pub severity: Severity,
}

impl PhraseRule {
    pub fn new(phrase: &str, weight: f64, severity: Severity) -> Self {
        Self {
            phrase: phrase.to_string(),
            weight,
            severity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkRule {
    pub markers: Vec<String>,
    pub weight: f64,
    pub severity: Severity,
}

impl Default for LinkRule {
    fn default() -> Self {
        Self {
            markers: vec![
                "http://".to_string(),
                "bit.ly".to_string(),
                "tinyurl".to_string(),
            ],
            weight: 0.12,
            severity: Severity::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SenderRule {
    /// Domains that fully match this pattern are considered ordinary.
    pub domain_pattern: String,
    pub weight: f64,
    pub severity: Severity,
}

impl Default for SenderRule {
    fn default() -> Self {
        Self {
            domain_pattern: r"^[a-zA-Z0-9-]+\.(com|org|edu|gov|net)$".to_string(),
            weight: 0.15,
            severity: Severity::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormattingRule {
    /// Words must be strictly longer than this to count as shouting.
    pub min_word_length: usize,
    /// Fires when the shouting word count is strictly above this.
    pub max_caps_words: usize,
    pub weight: f64,
    pub severity: Severity,
}

impl Default for FormattingRule {
    fn default() -> Self {
        Self {
            min_word_length: 3,
            max_caps_words: 5,
            weight: 0.10,
            severity: Severity::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    pub fake: f64,
    pub confidence_ceiling: f64,
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            fake: 0.5,
            confidence_ceiling: 0.99,
            critical: 0.85,
            high: 0.65,
            medium: 0.4,
        }
    }
}

/// Every list, weight and threshold used by the rule engine and verdict formatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeuristicConfig {
    pub keywords: Vec<PhraseRule>,
    pub urgency_phrases: Vec<PhraseRule>,
    pub links: LinkRule,
    pub sender: SenderRule,
    pub formatting: FormattingRule,
    pub thresholds: Thresholds,
}

const DEFAULT_KEYWORDS: [&str; 21] = [
    "urgent",
    "verify",
    "suspended",
    "confirm",
    "click here",
    "act now",
    "prize",
    "winner",
    "congratulations",
    "account security",
    "unusual activity",
    "password",
    "credit card",
    "social security",
    "bank account",
    "wire transfer",
    "limited time",
    "expire",
    "claim",
    "free",
    "guaranteed",
];

const DEFAULT_URGENCY_PHRASES: [&str; 5] = [
    "immediate action",
    "within 24 hours",
    "expire soon",
    "last chance",
    "act immediately",
];

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS
                .iter()
                .map(|k| PhraseRule::new(k, 0.1, Severity::High))
                .collect(),
            urgency_phrases: DEFAULT_URGENCY_PHRASES
                .iter()
                .map(|p| PhraseRule::new(p, 0.15, Severity::High))
                .collect(),
            links: LinkRule::default(),
            sender: SenderRule::default(),
            formatting: FormattingRule::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl HeuristicConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DetectorError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: HeuristicConfig = serde_yaml::from_str(&content).map_err(|e| {
            DetectorError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        log::info!(
            "Loaded heuristics from {} ({} keywords, {} urgency phrases)",
            path.display(),
            config.keywords.len(),
            config.urgency_phrases.len()
        );
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| DetectorError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        for rule in self.keywords.iter().chain(self.urgency_phrases.iter()) {
            if rule.phrase.is_empty() {
                return Err(DetectorError::Config("Empty phrase in rule list".to_string()));
            }
            if rule.phrase != rule.phrase.to_lowercase() {
                return Err(DetectorError::Config(format!(
                    "Phrase '{}' must be lowercase; it is matched against lowercased text",
                    rule.phrase
                )));
            }
            check_weight(&rule.phrase, rule.weight)?;
        }

        check_weight("links", self.links.weight)?;
        check_weight("sender", self.sender.weight)?;
        check_weight("formatting", self.formatting.weight)?;

        Regex::new(&self.sender.domain_pattern).map_err(|e| {
            DetectorError::Config(format!(
                "Invalid regex pattern '{}': {}",
                self.sender.domain_pattern, e
            ))
        })?;

        let t = &self.thresholds;
        for (name, value) in [
            ("fake", t.fake),
            ("confidence_ceiling", t.confidence_ceiling),
            ("critical", t.critical),
            ("high", t.high),
            ("medium", t.medium),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DetectorError::Config(format!(
                    "Threshold '{}' must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if !(t.medium <= t.high && t.high <= t.critical) {
            return Err(DetectorError::Config(
                "Threat thresholds must satisfy medium <= high <= critical".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_weight(name: &str, weight: f64) -> Result<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(DetectorError::Config(format!(
            "Weight for '{}' must be a non-negative number, got {}",
            name, weight
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_tables() {
        let config = HeuristicConfig::default();

        assert_eq!(config.keywords.len(), 21);
        assert_eq!(config.urgency_phrases.len(), 5);
        assert_eq!(config.keywords[0].phrase, "urgent");
        assert_eq!(config.keywords[20].phrase, "guaranteed");
        assert!(config
            .keywords
            .iter()
            .all(|k| k.weight == 0.1 && k.severity == Severity::High));
        assert!(config.urgency_phrases.iter().all(|p| p.weight == 0.15));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "keywords:\n  - phrase: \"gift card\"\n    weight: 0.3\n    severity: medium\nthresholds:\n  fake: 0.6"
        )
        .unwrap();

        let config = HeuristicConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.keywords.len(), 1);
        assert_eq!(config.keywords[0].severity, Severity::Medium);
        assert_eq!(config.urgency_phrases.len(), 5);
        assert_eq!(config.thresholds.fake, 0.6);
        assert_eq!(config.thresholds.critical, 0.85);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = HeuristicConfig::default();
        config.sender.domain_pattern = "([".to_string();
        assert!(config.validate().is_err());

        let mut config = HeuristicConfig::default();
        config.keywords.push(PhraseRule::new("FREE", 0.1, Severity::High));
        assert!(config.validate().is_err());

        let mut config = HeuristicConfig::default();
        config.thresholds.high = 0.9;
        assert!(config.validate().is_err());

        let mut config = HeuristicConfig::default();
        config.links.weight = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_round_trip_of_defaults() {
        let config = HeuristicConfig::default();
        let yaml = config.to_yaml().unwrap();
        let parsed: HeuristicConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
