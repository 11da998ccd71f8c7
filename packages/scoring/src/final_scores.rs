//! The externally visible score map.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::base::BaseScores;

/// Highest final score.
pub const MAX_SCORE: u8 = 100;

/// Final score per district id, always covering the full roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalScoreMap {
    /// District id to score in `[0, 100]`.
    pub scores: BTreeMap<String, u8>,
    /// `true` when the scores are the unmodified base scores.
    pub fallback: bool,
}

/// Result of applying model scores over the base scores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjustment {
    /// The adjusted map.
    pub scores: FinalScoreMap,
    /// Roster ids the model omitted, which kept their base score.
    pub filled_from_base: Vec<String>,
    /// Ids the model returned that are not in the roster.
    pub ignored: Vec<String>,
}

impl FinalScoreMap {
    /// The base scores, flagged as a fallback.
    #[must_use]
    pub fn fallback(base: &BaseScores) -> Self {
        Self {
            scores: base.score_map(),
            fallback: true,
        }
    }

    /// Overlays model scores on the base scores.
    ///
    /// Returns `None` when `model_scores` names no roster district at all,
    /// which callers treat like an unparseable response.
    #[must_use]
    pub fn adjusted(base: &BaseScores, model_scores: &BTreeMap<String, u8>) -> Option<Adjustment> {
        let mut scores = BTreeMap::new();
        let mut filled_from_base = Vec::new();

        for district in base.iter() {
            let score = if let Some(score) = model_scores.get(&district.id) {
                (*score).min(MAX_SCORE)
            } else {
                filled_from_base.push(district.id.clone());
                district.base_score
            };
            scores.insert(district.id.clone(), score);
        }

        if filled_from_base.len() == base.len() {
            return None;
        }

        let ignored = model_scores
            .keys()
            .filter(|id| base.get(id).is_none())
            .cloned()
            .collect();

        Some(Adjustment {
            scores: Self {
                scores,
                fallback: false,
            },
            filled_from_base,
            ignored,
        })
    }

    /// Per-district change from the base score (final − base).
    #[must_use]
    pub fn deltas_from(&self, base: &BaseScores) -> BTreeMap<String, i16> {
        base.iter()
            .map(|district| {
                let score = self
                    .scores
                    .get(&district.id)
                    .copied()
                    .unwrap_or(district.base_score);
                (
                    district.id.clone(),
                    i16::from(score) - i16::from(district.base_score),
                )
            })
            .collect()
    }
}
