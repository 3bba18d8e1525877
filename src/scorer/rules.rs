use super::ScoringStrategy;
use crate::error::{DetectorError, Result};
use crate::heuristic_config::HeuristicConfig;
use crate::verdict::{Assessment, EmailSample, Indicator, IndicatorType};
use regex::Regex;

/// Deterministic keyword and pattern heuristics. Always available.
#[derive(Debug, Clone)]
pub struct RuleBasedStrategy {
    config: HeuristicConfig,
    sender_domain: Regex,
}

impl Default for RuleBasedStrategy {
    fn default() -> Self {
        Self::new(HeuristicConfig::default()).unwrap()
    }
}

impl RuleBasedStrategy {
    pub fn new(config: HeuristicConfig) -> Result<Self> {
        config.validate()?;
        let sender_domain = Regex::new(&config.sender.domain_pattern).map_err(|e| {
            DetectorError::Config(format!(
                "Invalid regex pattern '{}': {}",
                config.sender.domain_pattern, e
            ))
        })?;

        Ok(Self {
            config,
            sender_domain,
        })
    }

    pub fn config(&self) -> &HeuristicConfig {
        &self.config
    }

    pub fn assess(&self, sample: &EmailSample) -> Assessment {
        let body_lower = sample.body.to_lowercase();
        let subject_lower = sample.subject.to_lowercase();

        let mut risk_score = 0.0;
        let mut indicators = Vec::new();

        for keyword in &self.config.keywords {
            if body_lower.contains(&keyword.phrase) || subject_lower.contains(&keyword.phrase) {
                risk_score += keyword.weight;
                indicators.push(Indicator::new(
                    IndicatorType::SuspiciousKeyword,
                    format!("Found suspicious phrase: \"{}\"", keyword.phrase),
                    keyword.severity,
                ));
            }
        }

        for phrase in &self.config.urgency_phrases {
            if body_lower.contains(&phrase.phrase) {
                risk_score += phrase.weight;
                indicators.push(Indicator::new(
                    IndicatorType::UrgencyTactic,
                    format!("Uses pressure tactic: \"{}\"", phrase.phrase),
                    phrase.severity,
                ));
            }
        }

        let links = &self.config.links;
        if links.markers.iter().any(|m| body_lower.contains(m.as_str())) {
            risk_score += links.weight;
            indicators.push(Indicator::new(
                IndicatorType::SuspiciousLink,
                "Email contains potentially malicious links".to_string(),
                links.severity,
            ));
        }

        if let Some(domain) = sender_domain(&sample.sender) {
            if !self.sender_domain.is_match(domain) {
                risk_score += self.config.sender.weight;
                indicators.push(Indicator::new(
                    IndicatorType::SuspiciousSender,
                    "Sender email has unusual domain".to_string(),
                    self.config.sender.severity,
                ));
            }
        }

        let formatting = &self.config.formatting;
        let caps_words = sample
            .body
            .split_whitespace()
            .filter(|word| is_shouting(word) && word.chars().count() > formatting.min_word_length)
            .count();
        if caps_words > formatting.max_caps_words {
            risk_score += formatting.weight;
            indicators.push(Indicator::new(
                IndicatorType::SuspiciousFormatting,
                "Excessive use of capital letters".to_string(),
                formatting.severity,
            ));
        }

        // Accumulated risk may exceed 1.0; only the reported confidence is capped.
        let confidence = risk_score.min(self.config.thresholds.confidence_ceiling);

        log::debug!(
            "Rule scoring: raw={:.2} confidence={:.2} indicators={}",
            risk_score,
            confidence,
            indicators.len()
        );

        Assessment {
            confidence,
            indicators,
        }
    }
}

impl ScoringStrategy for RuleBasedStrategy {
    fn name(&self) -> &str {
        "rule-based"
    }

    fn score(&self, sample: &EmailSample) -> Result<Assessment> {
        Ok(self.assess(sample))
    }
}

/// Text between the first `@` and the next one, if the sender has an `@` at all.
fn sender_domain(sender: &str) -> Option<&str> {
    if sender.is_empty() || !sender.contains('@') {
        return None;
    }
    sender.split('@').nth(1)
}

/// At least one cased letter and no lowercase letters.
fn is_shouting(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}
