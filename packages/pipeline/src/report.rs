//! Results of a pipeline run.

use std::collections::BTreeMap;

use risk_map_ai::parse::ParseAttempt;
use risk_map_district_models::AggregationMode;
use risk_map_scoring::timeline::{TimelinePoint, TimelineWeights};
use risk_map_scoring::{BaseScores, FinalScoreMap};
use strum_macros::{AsRefStr, Display};

/// Longest model or upstream text kept for diagnostics, in characters.
pub const DIAGNOSTIC_TEXT_LIMIT: usize = 2000;

/// Keeps at most [`DIAGNOSTIC_TEXT_LIMIT`] characters of `text`.
#[must_use]
pub fn truncate_for_diagnostics(text: &str) -> String {
    text.chars().take(DIAGNOSTIC_TEXT_LIMIT).collect()
}

/// File names each scoring source was read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFiles {
    /// Crime ledger files.
    pub crime: Vec<String>,
    /// Five-major-crime files.
    pub five: Vec<String>,
    /// Police-station files.
    pub policestation: Vec<String>,
}

/// Deterministic part of a run: which files were read and the base scores.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    /// Source files read.
    pub sources: SourceFiles,
    /// Base score of every roster district.
    pub scores: BaseScores,
}

/// How the final scores came about.
#[derive(Debug, Clone, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum AdjustmentOutcome {
    /// The model answered and its scores were applied.
    Adjusted,
    /// The model call failed or returned a non-success status.
    UpstreamFailure {
        /// HTTP status, when the endpoint answered.
        status: Option<u16>,
        /// Error description.
        message: String,
        /// Response body, truncated.
        body: Option<String>,
    },
    /// The model answered with text holding no usable scores.
    ParseFailure,
    /// No model call was made.
    Offline,
}

impl AdjustmentOutcome {
    /// Whether the final scores are the base scores.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        !matches!(self, Self::Adjusted)
    }
}

/// Inspection data of one run, exposed through the debug payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    /// Aggregation policy used.
    pub mode: AggregationMode,
    /// Model text, truncated.
    pub content: Option<String>,
    /// Failed parse strategies, in ladder order.
    pub parse_attempts: Vec<ParseAttempt>,
    /// Final minus base score per district.
    pub deltas: BTreeMap<String, i16>,
    /// Roster ids the model left out.
    pub filled_from_base: Vec<String>,
    /// Ids the model returned that are not districts.
    pub ignored: Vec<String>,
}

impl Diagnostics {
    pub(crate) const fn new(mode: AggregationMode) -> Self {
        Self {
            mode,
            content: None,
            parse_attempts: Vec::new(),
            deltas: BTreeMap::new(),
            filled_from_base: Vec::new(),
            ignored: Vec::new(),
        }
    }
}

/// Outcome of a scoring run.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskReport {
    /// Source files read.
    pub sources: SourceFiles,
    /// Base scores the final map started from.
    pub base: BaseScores,
    /// Final score of every roster district.
    pub scores: FinalScoreMap,
    /// How the final scores came about.
    pub outcome: AdjustmentOutcome,
    /// Inspection data.
    pub diagnostics: Diagnostics,
}

/// City-wide yearly trend.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineReport {
    /// Five-major-crime file used.
    pub five: String,
    /// 112 call file used.
    pub oneonetwo: String,
    /// Fusion weights.
    pub weights: TimelineWeights,
    /// One point per shared year, oldest first.
    pub points: Vec<TimelinePoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "강".repeat(DIAGNOSTIC_TEXT_LIMIT + 10);
        let truncated = truncate_for_diagnostics(&text);
        assert_eq!(truncated.chars().count(), DIAGNOSTIC_TEXT_LIMIT);
        assert_eq!(truncate_for_diagnostics("short"), "short");
    }

    #[test]
    fn outcome_tags() {
        assert_eq!(AdjustmentOutcome::Adjusted.as_ref(), "adjusted");
        assert_eq!(AdjustmentOutcome::ParseFailure.as_ref(), "parseFailure");
        let upstream = AdjustmentOutcome::UpstreamFailure {
            status: Some(500),
            message: "Upstream returned HTTP 500".to_string(),
            body: None,
        };
        assert_eq!(upstream.as_ref(), "upstreamFailure");
        assert!(upstream.is_fallback());
        assert!(!AdjustmentOutcome::Adjusted.is_fallback());
    }
}
