//! Instruction block sent to the model.

use std::fmt::Write as _;

use risk_map_district_models::{AggregationMode, SourceWeights};
use risk_map_scoring::BaseScores;

/// System message of every scoring request.
pub const SYSTEM_PROMPT: &str = "You output JSON only.";

fn scope_phrase(mode: AggregationMode) -> &'static str {
    match mode {
        AggregationMode::Latest => "latest snapshot of each dataset",
        AggregationMode::Cumulative => "totals summed over every year and file",
    }
}

/// Builds the user message asking the model to refine the base scores.
///
/// Districts are listed by descending base score so the most salient ones
/// come first.
#[must_use]
pub fn build_prompt(scores: &BaseScores, mode: AggregationMode) -> String {
    let weights = SourceWeights::STANDARD;
    let mut prompt = format!(
        "You are a data analyst. Combine the three datasets below ({}) into a \
         risk score (riskScore, 0-100) for each district of Seoul.\n\
         \n\
         Rules:\n\
         - The higher crimeTotal, fiveTotal and policeTotal are, the higher riskScore must be (monotonic).\n\
         - Keep every score within 0-100.\n\
         - Avoid tied scores where possible.\n\
         - Weight guidance: crime {} / five {} / police {}.\n\
         - baseScore is the reference point normalized with those weights. Adjust reasonably around it.\n\
         - Return a JSON array only, e.g. [{{\"id\":\"gangnam\",\"riskScore\":78}}, ...]\n\
         \n\
         Datasets (id, crimeTotal, fiveTotal, policeTotal, baseScore):\n",
        scope_phrase(mode),
        weights.crime,
        weights.five,
        weights.police,
    );

    for district in scores.by_salience() {
        let _ = writeln!(
            prompt,
            "{}: crime={}, five={}, police={}, baseScore={}",
            district.id,
            district.crime_total,
            district.five_total,
            district.police_total,
            district.base_score,
        );
    }

    prompt
}
