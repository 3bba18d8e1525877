pub mod api;
pub mod auth;
pub mod classifier;
pub mod config;
pub mod error;
pub mod heuristic_config;
pub mod scorer;
pub mod storage;
pub mod verdict;

pub use config::AppConfig;
pub use error::{DetectorError, Result};
pub use heuristic_config::{HeuristicConfig, Thresholds};
pub use scorer::{EmailRiskScorer, ScoringMode, ScoringStrategy};
pub use verdict::{EmailSample, Indicator, IndicatorType, Severity, ThreatLevel, Verdict};
