use crate::heuristic_config::Thresholds;
use serde::{Deserialize, Serialize};

pub const FAKE_RECOMMENDATIONS: [&str; 5] = [
    "Do not click any links in this email",
    "Do not provide any personal or financial information",
    "Mark this email as spam and delete it",
    "Report this email to your IT security team",
    "Verify sender identity through official channels",
];

pub const LEGITIMATE_RECOMMENDATIONS: [&str; 4] = [
    "Email appears legitimate, but remain cautious",
    "Verify sender identity if requesting sensitive information",
    "Check for grammar and spelling errors",
    "Hover over links before clicking to verify destinations",
];

/// The three pieces of an email the scorer looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailSample {
    pub body: String,
    pub subject: String,
    pub sender: String,
}

impl EmailSample {
    pub fn new(body: impl Into<String>, subject: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            subject: subject.into(),
            sender: sender.into(),
        }
    }

    /// Subject first, one space, then body. Matches how training text is assembled.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.subject, self.body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorType {
    #[serde(rename = "Suspicious Keyword")]
    SuspiciousKeyword,
    #[serde(rename = "Urgency Tactic")]
    UrgencyTactic,
    #[serde(rename = "Suspicious Link")]
    SuspiciousLink,
    #[serde(rename = "Suspicious Sender")]
    SuspiciousSender,
    #[serde(rename = "Suspicious Formatting")]
    SuspiciousFormatting,
}

impl IndicatorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorType::SuspiciousKeyword => "Suspicious Keyword",
            IndicatorType::UrgencyTactic => "Urgency Tactic",
            IndicatorType::SuspiciousLink => "Suspicious Link",
            IndicatorType::SuspiciousSender => "Suspicious Sender",
            IndicatorType::SuspiciousFormatting => "Suspicious Formatting",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    #[serde(rename = "type")]
    pub indicator_type: IndicatorType,
    pub description: String,
    pub severity: Severity,
}

impl Indicator {
    pub fn new(indicator_type: IndicatorType, description: String, severity: Severity) -> Self {
        Self {
            indicator_type,
            description,
            severity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatLevel {
    /// Bands are exclusive lower bounds checked from the top down.
    pub fn from_confidence(confidence: f64, thresholds: &Thresholds) -> Self {
        if confidence > thresholds.critical {
            ThreatLevel::Critical
        } else if confidence > thresholds.high {
            ThreatLevel::High
        } else if confidence > thresholds.medium {
            ThreatLevel::Medium
        } else {
            ThreatLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Low => "low",
            ThreatLevel::Medium => "medium",
            ThreatLevel::High => "high",
            ThreatLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw strategy output before it is turned into a [`Verdict`].
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub confidence: f64,
    pub indicators: Vec<Indicator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub is_fake: bool,
    pub confidence: f64,
    pub threat_level: ThreatLevel,
    pub indicators: Vec<Indicator>,
    pub recommendations: Vec<String>,
}

impl Verdict {
    pub fn from_assessment(assessment: Assessment, thresholds: &Thresholds) -> Self {
        let confidence = assessment.confidence;
        let is_fake = confidence > thresholds.fake;

        let recommendations: &[&str] = if is_fake {
            &FAKE_RECOMMENDATIONS
        } else {
            &LEGITIMATE_RECOMMENDATIONS
        };

        Self {
            is_fake,
            confidence,
            threat_level: ThreatLevel::from_confidence(confidence, thresholds),
            indicators: assessment.indicators,
            recommendations: recommendations.iter().map(|r| r.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict_for(confidence: f64) -> Verdict {
        Verdict::from_assessment(
            Assessment {
                confidence,
                indicators: vec![],
            },
            &Thresholds::default(),
        )
    }

    #[test]
    fn test_threat_level_boundaries_fall_into_lower_band() {
        let thresholds = Thresholds::default();

        assert_eq!(ThreatLevel::from_confidence(0.0, &thresholds), ThreatLevel::Low);
        assert_eq!(ThreatLevel::from_confidence(0.4, &thresholds), ThreatLevel::Low);
        assert_eq!(ThreatLevel::from_confidence(0.41, &thresholds), ThreatLevel::Medium);
        assert_eq!(ThreatLevel::from_confidence(0.65, &thresholds), ThreatLevel::Medium);
        assert_eq!(ThreatLevel::from_confidence(0.66, &thresholds), ThreatLevel::High);
        assert_eq!(ThreatLevel::from_confidence(0.85, &thresholds), ThreatLevel::High);
        assert_eq!(ThreatLevel::from_confidence(0.86, &thresholds), ThreatLevel::Critical);
        assert_eq!(ThreatLevel::from_confidence(0.99, &thresholds), ThreatLevel::Critical);
    }

    #[test]
    fn test_threat_level_is_monotonic() {
        let thresholds = Thresholds::default();
        let mut previous = ThreatLevel::Low;
        for step in 0..=100 {
            let level = ThreatLevel::from_confidence(step as f64 / 100.0, &thresholds);
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn test_is_fake_uses_strict_threshold() {
        assert!(!verdict_for(0.5).is_fake);
        assert!(verdict_for(0.51).is_fake);
    }

    #[test]
    fn test_recommendation_lists() {
        let fake = verdict_for(0.9);
        assert_eq!(
            fake.recommendations,
            vec![
                "Do not click any links in this email",
                "Do not provide any personal or financial information",
                "Mark this email as spam and delete it",
                "Report this email to your IT security team",
                "Verify sender identity through official channels",
            ]
        );

        let legit = verdict_for(0.1);
        assert_eq!(
            legit.recommendations,
            vec![
                "Email appears legitimate, but remain cautious",
                "Verify sender identity if requesting sensitive information",
                "Check for grammar and spelling errors",
                "Hover over links before clicking to verify destinations",
            ]
        );
    }

    #[test]
    fn test_serialized_shape() {
        let verdict = Verdict::from_assessment(
            Assessment {
                confidence: 0.1,
                indicators: vec![Indicator::new(
                    IndicatorType::SuspiciousKeyword,
                    "Found suspicious phrase: \"free\"".to_string(),
                    Severity::High,
                )],
            },
            &Thresholds::default(),
        );

        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["isFake"], false);
        assert_eq!(json["threatLevel"], "low");
        assert_eq!(json["indicators"][0]["type"], "Suspicious Keyword");
        assert_eq!(json["indicators"][0]["severity"], "high");
        assert_eq!(json["recommendations"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_combined_text_puts_subject_first() {
        let sample = EmailSample::new("body text", "Subject", "a@b.com");
        assert_eq!(sample.combined_text(), "Subject body text");
    }
}
