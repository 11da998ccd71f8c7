//! Defensive extraction of a district score map from model output.
//!
//! Model text may carry prose, code fences, or broken JSON. Parsing walks
//! an ordered ladder of [`ParseStrategy`] values; each attempt records why
//! it was rejected so the caller can report the failure chain.

use std::collections::BTreeMap;

use serde_json::Value;
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

/// Highest score the parser lets through.
pub const MAX_SCORE: f64 = 100.0;

/// One way of locating the JSON array in model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum ParseStrategy {
    /// Strip code fences, then parse the whole text.
    Direct,
    /// Parse the span from the first `[` to the last `]`.
    Bracketed,
}

impl ParseStrategy {
    /// Strategies in the order they are tried.
    pub const LADDER: [Self; 2] = [Self::Direct, Self::Bracketed];

    fn extract(self, text: &str) -> Result<Vec<Value>, Rejection> {
        let candidate = match self {
            Self::Direct => strip_fences(text),
            Self::Bracketed => {
                let start = text.find('[').ok_or(Rejection::NoBrackets)?;
                let end = text.rfind(']').ok_or(Rejection::NoBrackets)?;
                if end <= start {
                    return Err(Rejection::NoBrackets);
                }
                &text[start..=end]
            }
        };

        match serde_json::from_str(candidate) {
            Ok(Value::Array(entries)) => Ok(entries),
            Ok(_) => Err(Rejection::NotAnArray),
            Err(e) => Err(Rejection::InvalidJson {
                message: e.to_string(),
            }),
        }
    }
}

/// Why a strategy produced no scores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The candidate text is not JSON.
    #[error("invalid JSON: {message}")]
    InvalidJson {
        /// Parser message.
        message: String,
    },
    /// The candidate is JSON but not an array.
    #[error("JSON value is not an array")]
    NotAnArray,
    /// No `[` ... `]` span exists.
    #[error("no bracketed array found")]
    NoBrackets,
    /// The array holds no entry with a string `id` and numeric `riskScore`.
    #[error("array holds no usable entries")]
    NoUsableEntries,
}

/// One rung of the ladder that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAttempt {
    /// Strategy tried.
    pub strategy: ParseStrategy,
    /// Why it failed.
    pub rejection: Rejection,
}

/// Result of parsing one model response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseReport {
    /// Extracted scores, or `None` when every strategy failed.
    pub scores: Option<BTreeMap<String, u8>>,
    /// Failed attempts, in ladder order.
    pub attempts: Vec<ParseAttempt>,
}

impl ParseReport {
    /// Whether a non-empty score map was extracted.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.scores.is_some()
    }
}

/// Strips an optional leading `` ```json `` / `` ``` `` marker and an
/// optional trailing `` ``` `` marker.
fn strip_fences(text: &str) -> &str {
    let mut body = text.trim();

    if body
        .get(..7)
        .is_some_and(|head| head.eq_ignore_ascii_case("```json"))
    {
        body = &body[7..];
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }

    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Reads `riskScore` as a finite number, accepting numeric strings.
fn coerce_score(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_score(score: f64) -> u8 {
    score.round().clamp(0.0, MAX_SCORE) as u8
}

/// Keeps entries with a string `id` and a finite `riskScore`, clamped to
/// `[0, 100]` and rounded. Later duplicates win.
fn collect_scores(entries: &[Value]) -> BTreeMap<String, u8> {
    entries
        .iter()
        .filter_map(|entry| {
            let id = entry.get("id")?.as_str()?;
            let score = coerce_score(entry.get("riskScore"))?;
            Some((id.to_string(), clamp_score(score)))
        })
        .collect()
}

/// Runs the strategy ladder over `text`.
///
/// The first strategy that yields a JSON array decides the outcome: an
/// array without usable entries fails the whole parse rather than falling
/// through to the next rung.
#[must_use]
pub fn parse_scores(text: &str) -> ParseReport {
    let mut attempts = Vec::new();

    for strategy in ParseStrategy::LADDER {
        match strategy.extract(text) {
            Ok(entries) => {
                let scores = collect_scores(&entries);
                if scores.is_empty() {
                    attempts.push(ParseAttempt {
                        strategy,
                        rejection: Rejection::NoUsableEntries,
                    });
                    break;
                }
                return ParseReport {
                    scores: Some(scores),
                    attempts,
                };
            }
            Err(rejection) => {
                log::debug!("Parse strategy {strategy} rejected: {rejection}");
                attempts.push(ParseAttempt {
                    strategy,
                    rejection,
                });
            }
        }
    }

    ParseReport {
        scores: None,
        attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_over_range_score_is_clamped() {
        let report = parse_scores("```json\n[{\"id\":\"gangnam\",\"riskScore\":105}]\n```");
        let scores = report.scores.unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores["gangnam"], 100);
        assert!(report.attempts.is_empty());
    }

    #[test]
    fn refusal_text_yields_no_scores() {
        let report = parse_scores("I cannot help with that.");
        assert!(!report.is_success());

        let strategies: Vec<ParseStrategy> = report.attempts.iter().map(|a| a.strategy).collect();
        assert_eq!(strategies, ParseStrategy::LADDER);
        assert!(matches!(
            report.attempts[0].rejection,
            Rejection::InvalidJson { .. }
        ));
        assert_eq!(report.attempts[1].rejection, Rejection::NoBrackets);
    }

    #[test]
    fn array_inside_prose_is_found_by_brackets() {
        let report = parse_scores(
            "Here are the scores:\n[{\"id\":\"mapo\",\"riskScore\":41.6},{\"id\":\"jung\",\"riskScore\":\"-3\"}]\nHope that helps.",
        );
        let scores = report.scores.unwrap();
        assert_eq!(scores["mapo"], 42);
        assert_eq!(scores["jung"], 0);
        assert_eq!(report.attempts.len(), 1);
        assert_eq!(report.attempts[0].strategy, ParseStrategy::Direct);
    }

    #[test]
    fn bare_fence_is_stripped() {
        let report = parse_scores("```\n[{\"id\":\"guro\",\"riskScore\":7}]\n```");
        assert_eq!(report.scores.unwrap()["guro"], 7);
    }

    #[test]
    fn unusable_entries_are_skipped() {
        let report = parse_scores(
            r#"[{"id":1,"riskScore":5},{"id":"a"},{"id":"b","riskScore":null},{"id":"c","riskScore":"x"},{"id":"d","riskScore":12},{"id":"e","riskScore":true}]"#,
        );
        let scores = report.scores.unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores["d"], 12);
    }

    #[test]
    fn array_without_usable_entries_fails() {
        let report = parse_scores("[]");
        assert!(!report.is_success());
        assert_eq!(report.attempts.len(), 1);
        assert_eq!(report.attempts[0].rejection, Rejection::NoUsableEntries);
    }

    #[test]
    fn object_instead_of_array_fails_both_rungs() {
        let report = parse_scores(r#"{"gangnam": 50}"#);
        assert!(!report.is_success());
        assert_eq!(report.attempts[0].rejection, Rejection::NotAnArray);
        assert_eq!(report.attempts[1].rejection, Rejection::NoBrackets);
    }

    #[test]
    fn strategy_names_are_camel_case() {
        assert_eq!(ParseStrategy::Direct.as_ref(), "direct");
        assert_eq!(ParseStrategy::Bracketed.to_string(), "bracketed");
    }
}
