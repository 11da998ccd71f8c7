#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Risk score orchestration.
//!
//! A run loads the three scoring datasets, computes the deterministic base
//! scores, and asks a language model to refine them. Any upstream or parse
//! failure degrades to the base scores with `fallback = true`; only a
//! missing credential or missing primary data is an error.

pub mod config;
pub mod report;

use std::path::{Path, PathBuf};

use risk_map_ai::AiError;
use risk_map_ai::parse::parse_scores;
use risk_map_ai::prompt::{SYSTEM_PROMPT, build_prompt};
use risk_map_ai::providers::LlmProvider;
use risk_map_ai::providers::openai::OpenAiProvider;
use risk_map_dataset::timeline::{five_city_row, oneonetwo_city_row, yearly_totals};
use risk_map_dataset::{Dataset, DatasetError, Snapshot, aggregate, load_dataset};
use risk_map_district::{DistrictLookup, DistrictRoster, roster};
use risk_map_district_models::{AggregationMode, DataSource, SourceWeights};
use risk_map_scoring::timeline::{TimelineWeights, compute_timeline};
use risk_map_scoring::{BaseScores, FinalScoreMap, compute_base_scores};
use thiserror::Error;

pub use config::{ConfigError, PipelineConfig};
pub use report::{
    AdjustmentOutcome, Baseline, Diagnostics, RiskReport, SourceFiles, TimelineReport,
};

use report::truncate_for_diagnostics;

/// Errors that stop a run before any scores exist.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The model credential variable is unset or empty.
    #[error("{var} is not set")]
    MissingCredential {
        /// Name of the variable.
        var: String,
    },

    /// A dataset the run cannot do without has no files.
    #[error("No {dataset} data files found in {}", dir.display())]
    DataUnavailable {
        /// Missing dataset.
        dataset: DataSource,
        /// Directory that was searched.
        dir: PathBuf,
    },

    /// A dataset file could not be read or parsed.
    #[error(transparent)]
    Dataset(DatasetError),

    /// The model client could not be set up.
    #[error(transparent)]
    Ai(#[from] AiError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<DatasetError> for PipelineError {
    fn from(value: DatasetError) -> Self {
        match value {
            DatasetError::NotFound { dataset, dir } => Self::DataUnavailable { dataset, dir },
            other => Self::Dataset(other),
        }
    }
}

/// Scores the district roster from the configured data directory.
#[derive(Debug, Clone)]
pub struct RiskPipeline {
    config: PipelineConfig,
    roster: &'static DistrictRoster,
    lookup: DistrictLookup,
}

impl RiskPipeline {
    /// Creates a pipeline over the embedded district roster.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            roster: roster(),
            lookup: DistrictLookup::standard(),
        }
    }

    /// The pipeline settings.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn source_dir(&self, source: DataSource) -> PathBuf {
        self.config.data_dir.join(source.dir_name())
    }

    async fn load(&self, source: DataSource, mode: AggregationMode) -> Result<Dataset, DatasetError> {
        load_dataset(&self.source_dir(source), source, mode).await
    }

    /// Loads the scoring datasets and computes the base scores.
    ///
    /// # Errors
    ///
    /// * [`PipelineError::DataUnavailable`] if the crime ledger has no files
    /// * [`PipelineError::Dataset`] if a file cannot be read or parsed
    pub async fn baseline(&self) -> Result<Baseline, PipelineError> {
        let mode = self.config.mode;
        let (crime, five, police) = tokio::join!(
            self.load(DataSource::Crime, mode),
            self.load(DataSource::Five, mode),
            self.load(DataSource::PoliceStation, mode),
        );
        let (crime, five, police) = (crime?, five?, police?);

        let scores = compute_base_scores(
            self.roster,
            &aggregate(&crime, self.roster, &self.lookup, mode),
            &aggregate(&five, self.roster, &self.lookup, mode),
            &aggregate(&police, self.roster, &self.lookup, mode),
            &SourceWeights::STANDARD,
        );

        Ok(Baseline {
            sources: SourceFiles {
                crime: crime.file_names(),
                five: five.file_names(),
                policestation: police.file_names(),
            },
            scores,
        })
    }

    /// Runs the full pipeline with the configured `OpenAI`-compatible
    /// endpoint, authenticating with `credential`.
    ///
    /// The credential is checked before anything is read.
    ///
    /// # Errors
    ///
    /// * [`PipelineError::MissingCredential`] if `credential` is absent or blank
    /// * [`PipelineError::Ai`] if the HTTP client cannot be built
    /// * any error of [`Self::baseline`]
    pub async fn run(&self, credential: Option<&str>) -> Result<RiskReport, PipelineError> {
        let Some(api_key) = credential.map(str::trim).filter(|key| !key.is_empty()) else {
            return Err(PipelineError::MissingCredential {
                var: self.config.credential_var.clone(),
            });
        };

        let provider = OpenAiProvider::new(
            api_key.to_string(),
            self.config.model.clone(),
            &self.config.base_url,
            self.config.timeout,
        )?;

        self.run_with_provider(&provider).await
    }

    /// Runs the pipeline against `provider`. Exactly one model call is made.
    ///
    /// # Errors
    ///
    /// Any error of [`Self::baseline`]. Model failures are not errors; they
    /// yield the base scores flagged as a fallback.
    pub async fn run_with_provider(
        &self,
        provider: &dyn LlmProvider,
    ) -> Result<RiskReport, PipelineError> {
        let Baseline { sources, scores: base } = self.baseline().await?;
        let mut diagnostics = Diagnostics::new(self.config.mode);

        let prompt = build_prompt(&base, self.config.mode);
        log::debug!(
            "Requesting score adjustment from {} for {} districts",
            provider.model(),
            base.len()
        );

        let content = match provider.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Model call failed: {e}");
                let body = match &e {
                    AiError::Status { body, .. } => Some(truncate_for_diagnostics(body)),
                    _ => None,
                };
                let outcome = AdjustmentOutcome::UpstreamFailure {
                    status: e.status(),
                    message: e.to_string(),
                    body,
                };
                return Ok(Self::fallback(sources, base, outcome, diagnostics));
            }
        };

        diagnostics.content = Some(truncate_for_diagnostics(&content));
        let report = parse_scores(&content);
        diagnostics.parse_attempts = report.attempts;

        let Some(adjustment) = report
            .scores
            .and_then(|scores| FinalScoreMap::adjusted(&base, &scores))
        else {
            log::warn!(
                "Model response held no usable scores after {} strategies",
                diagnostics.parse_attempts.len()
            );
            return Ok(Self::fallback(
                sources,
                base,
                AdjustmentOutcome::ParseFailure,
                diagnostics,
            ));
        };

        if !adjustment.filled_from_base.is_empty() {
            log::debug!(
                "Model omitted {} districts; keeping their base scores",
                adjustment.filled_from_base.len()
            );
        }

        diagnostics.deltas = adjustment.scores.deltas_from(&base);
        diagnostics.filled_from_base = adjustment.filled_from_base;
        diagnostics.ignored = adjustment.ignored;

        Ok(RiskReport {
            sources,
            base,
            scores: adjustment.scores,
            outcome: AdjustmentOutcome::Adjusted,
            diagnostics,
        })
    }

    /// Computes the base scores and returns them as the final scores
    /// without calling any model.
    ///
    /// # Errors
    ///
    /// Any error of [`Self::baseline`].
    pub async fn run_offline(&self) -> Result<RiskReport, PipelineError> {
        let Baseline { sources, scores } = self.baseline().await?;
        Ok(Self::fallback(
            sources,
            scores,
            AdjustmentOutcome::Offline,
            Diagnostics::new(self.config.mode),
        ))
    }

    fn fallback(
        sources: SourceFiles,
        base: BaseScores,
        outcome: AdjustmentOutcome,
        mut diagnostics: Diagnostics,
    ) -> RiskReport {
        if !matches!(outcome, AdjustmentOutcome::Offline) {
            log::info!("Falling back to base scores ({outcome})");
        }
        let scores = FinalScoreMap::fallback(&base);
        diagnostics.deltas = scores.deltas_from(&base);

        RiskReport {
            sources,
            base,
            scores,
            outcome,
            diagnostics,
        }
    }

    /// Computes the city-wide yearly trend from the latest five-major-crime
    /// and 112 call snapshots.
    ///
    /// # Errors
    ///
    /// * [`PipelineError::DataUnavailable`] if either dataset has no files
    /// * [`PipelineError::Dataset`] if a file cannot be read or parsed
    pub async fn timeline(&self) -> Result<TimelineReport, PipelineError> {
        let (five, oneonetwo) = tokio::join!(
            self.load(DataSource::Five, AggregationMode::Latest),
            self.load(DataSource::OneOneTwo, AggregationMode::Latest),
        );
        let five = self.require_latest(five?)?;
        let oneonetwo = self.require_latest(oneonetwo?)?;

        let five_series = yearly_totals(five_city_row(&five.rows));
        let oneonetwo_series = yearly_totals(oneonetwo_city_row(&oneonetwo.rows));
        let weights = TimelineWeights::STANDARD;

        Ok(TimelineReport {
            five: five.file_name,
            oneonetwo: oneonetwo.file_name,
            weights,
            points: compute_timeline(&five_series, &oneonetwo_series, &weights),
        })
    }

    fn require_latest(&self, dataset: Dataset) -> Result<Snapshot, PipelineError> {
        let source = dataset.source;
        dataset
            .snapshots
            .into_iter()
            .next_back()
            .ok_or_else(|| PipelineError::DataUnavailable {
                dataset: source,
                dir: self.source_dir(source),
            })
    }

    /// Root data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::Path;

    use risk_map_ai::parse::Rejection;

    use super::*;

    enum Stub {
        Content(&'static str),
        Status(u16),
        Transport,
    }

    #[async_trait::async_trait]
    impl LlmProvider for Stub {
        async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AiError> {
            assert_eq!(system_prompt, SYSTEM_PROMPT);
            assert!(user_prompt.contains("baseScore="));
            match self {
                Self::Content(text) => Ok((*text).to_string()),
                Self::Status(status) => Err(AiError::Status {
                    status: *status,
                    body: r#"{"error":{"message":"server exploded"}}"#.to_string(),
                }),
                Self::Transport => Err(AiError::Http(transport_error().await)),
            }
        }

        fn model(&self) -> &str {
            "stub"
        }
    }

    /// A real `reqwest` error produced without touching the network.
    async fn transport_error() -> reqwest::Error {
        reqwest::Client::new()
            .get("not a url")
            .send()
            .await
            .unwrap_err()
    }

    fn write(dir: &Path, source: DataSource, name: &str, body: &str) {
        let dir = dir.join(source.dir_name());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(name), body).unwrap();
    }

    /// Gangnam leads every source; every other district is zero.
    fn gangnam_fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            DataSource::Crime,
            "crime_2023.json",
            r#"[{"범죄대분류": "합계", "서울 강남구": 100, "서울 마포구": "0", "부산 중구": 999}]"#,
        );
        write(
            dir.path(),
            DataSource::Five,
            "five_2023.json",
            r#"[
                {"자치구별(1)": "합계", "자치구별(2)": "소계", "2023": 80},
                {"자치구별(1)": "합계", "자치구별(2)": "강남구", "2023": 80}
            ]"#,
        );
        write(
            dir.path(),
            DataSource::PoliceStation,
            "police_2023.json",
            r#"[{"경찰서": "서울강남서", "살인": 1, "강도": 4, "절도": "25", "폭력": 20}]"#,
        );
        dir
    }

    fn pipeline(dir: &Path) -> RiskPipeline {
        RiskPipeline::new(PipelineConfig {
            data_dir: dir.to_path_buf(),
            ..PipelineConfig::default()
        })
    }

    #[tokio::test]
    async fn baseline_scores_gangnam_ninety_and_the_rest_ten() {
        let dir = gangnam_fixture();
        let baseline = pipeline(dir.path()).baseline().await.unwrap();

        assert_eq!(baseline.sources.crime, ["crime_2023.json"]);
        assert_eq!(baseline.sources.policestation, ["police_2023.json"]);
        assert_eq!(baseline.scores.len(), 25);

        let gangnam = baseline.scores.get("gangnam").unwrap();
        assert!((gangnam.crime_total - 100.0).abs() < f64::EPSILON);
        assert!((gangnam.police_total - 50.0).abs() < f64::EPSILON);
        assert_eq!(gangnam.base_score, 90);
        assert!(
            baseline
                .scores
                .iter()
                .filter(|s| s.id != "gangnam")
                .all(|s| s.base_score == 10)
        );
    }

    #[tokio::test]
    async fn upstream_500_falls_back_to_base_scores() {
        let dir = gangnam_fixture();
        let report = pipeline(dir.path())
            .run_with_provider(&Stub::Status(500))
            .await
            .unwrap();

        assert!(report.scores.fallback);
        assert_eq!(report.scores.scores, report.base.score_map());
        assert_eq!(report.scores.scores.len(), 25);
        match &report.outcome {
            AdjustmentOutcome::UpstreamFailure { status, body, .. } => {
                assert_eq!(*status, Some(500));
                assert!(body.as_deref().unwrap().contains("server exploded"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(report.diagnostics.deltas.values().all(|d| *d == 0));
    }

    #[tokio::test]
    async fn transport_failure_falls_back() {
        let dir = gangnam_fixture();
        let report = pipeline(dir.path())
            .run_with_provider(&Stub::Transport)
            .await
            .unwrap();

        assert!(report.scores.fallback);
        assert!(matches!(
            report.outcome,
            AdjustmentOutcome::UpstreamFailure { status: None, .. }
        ));
    }

    #[tokio::test]
    async fn unparseable_answer_falls_back_with_attempts_recorded() {
        let dir = gangnam_fixture();
        let report = pipeline(dir.path())
            .run_with_provider(&Stub::Content("I cannot help with that."))
            .await
            .unwrap();

        assert!(report.scores.fallback);
        assert_eq!(report.outcome, AdjustmentOutcome::ParseFailure);
        assert_eq!(report.scores.scores, report.base.score_map());
        assert_eq!(report.diagnostics.parse_attempts.len(), 2);
        assert_eq!(
            report.diagnostics.parse_attempts[1].rejection,
            Rejection::NoBrackets
        );
        assert_eq!(
            report.diagnostics.content.as_deref(),
            Some("I cannot help with that.")
        );
    }

    #[tokio::test]
    async fn answer_naming_no_district_is_a_parse_failure() {
        let dir = gangnam_fixture();
        let report = pipeline(dir.path())
            .run_with_provider(&Stub::Content(r#"[{"id":"atlantis","riskScore":50}]"#))
            .await
            .unwrap();
        assert_eq!(report.outcome, AdjustmentOutcome::ParseFailure);
        assert!(report.scores.fallback);
    }

    #[tokio::test]
    async fn parsed_answer_replaces_scores_and_keeps_full_roster() {
        let dir = gangnam_fixture();
        let report = pipeline(dir.path())
            .run_with_provider(&Stub::Content(
                "```json\n[{\"id\":\"gangnam\",\"riskScore\":105},{\"id\":\"mapo\",\"riskScore\":12.4}]\n```",
            ))
            .await
            .unwrap();

        assert!(!report.scores.fallback);
        assert_eq!(report.outcome, AdjustmentOutcome::Adjusted);
        assert_eq!(report.scores.scores.len(), 25);
        assert_eq!(report.scores.scores["gangnam"], 100);
        assert_eq!(report.scores.scores["mapo"], 12);
        assert_eq!(report.scores.scores["jung"], 10);
        assert_eq!(report.diagnostics.deltas["gangnam"], 10);
        assert_eq!(report.diagnostics.deltas["mapo"], 2);
        assert_eq!(report.diagnostics.filled_from_base.len(), 23);
    }

    #[tokio::test]
    async fn missing_credential_fails_before_reading_data() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(&dir.path().join("does-not-exist"));

        for credential in [None, Some(""), Some("   ")] {
            let err = pipeline.run(credential).await.unwrap_err();
            assert!(
                matches!(&err, PipelineError::MissingCredential { var } if var == "OPENAPI_KEY"),
                "unexpected error: {err}"
            );
        }
    }

    #[tokio::test]
    async fn missing_crime_data_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), DataSource::Five, "five.json", "[]");

        let err = pipeline(dir.path()).run_offline().await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::DataUnavailable {
                dataset: DataSource::Crime,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn malformed_crime_file_is_a_dataset_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), DataSource::Crime, "crime.json", "{not json");

        let err = pipeline(dir.path()).run_offline().await.unwrap_err();
        assert!(matches!(err, PipelineError::Dataset(DatasetError::Json { .. })));
    }

    #[tokio::test]
    async fn missing_secondary_sources_still_score() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            DataSource::Crime,
            "crime.json",
            r#"[{"서울 강남구": 10, "서울 마포구": 5}]"#,
        );

        let report = pipeline(dir.path()).run_offline().await.unwrap();
        assert!(report.sources.five.is_empty());
        assert!(report.sources.policestation.is_empty());
        assert_eq!(report.scores.scores["gangnam"], 68);
        assert_eq!(report.scores.scores["mapo"], 50);
        assert_eq!(report.scores.scores["jung"], 32);
    }

    #[tokio::test]
    async fn forced_fallback_is_idempotent() {
        let dir = gangnam_fixture();
        let pipeline = pipeline(dir.path());

        let first = pipeline.run_offline().await.unwrap();
        let second = pipeline.run_offline().await.unwrap();
        let third = pipeline
            .run_with_provider(&Stub::Status(503))
            .await
            .unwrap();

        assert_eq!(first.scores, second.scores);
        assert_eq!(first.scores, third.scores);
        assert_eq!(first.outcome, AdjustmentOutcome::Offline);
    }

    #[tokio::test]
    async fn cumulative_mode_double_counts_overlapping_years() {
        let dir = gangnam_fixture();
        write(
            dir.path(),
            DataSource::Five,
            "five_2024.json",
            r#"[{"자치구별(1)": "합계", "자치구별(2)": "강남구", "2023": 80, "2024": 20}]"#,
        );

        let cumulative = pipeline(dir.path()).baseline().await.unwrap();
        assert!((cumulative.scores.get("gangnam").unwrap().five_total - 180.0).abs() < f64::EPSILON);

        let latest = RiskPipeline::new(PipelineConfig {
            data_dir: dir.path().to_path_buf(),
            mode: AggregationMode::Latest,
            ..PipelineConfig::default()
        })
        .baseline()
        .await
        .unwrap();
        assert_eq!(latest.sources.five, ["five_2024.json"]);
        assert!((latest.scores.get("gangnam").unwrap().five_total - 20.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn timeline_uses_shared_years_of_latest_files() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            DataSource::Five,
            "five_2022.json",
            r#"[{"자치구별(1)": "합계", "자치구별(2)": "소계", "2019": 1}]"#,
        );
        write(
            dir.path(),
            DataSource::Five,
            "five_2024.json",
            r#"[
                {"자치구별(1)": "합계", "자치구별(2)": "강남구", "2021": 999},
                {"자치구별(1)": "합계", "자치구별(2)": "소계", "2020": 100, "2021": 300, "2022": 200}
            ]"#,
        );
        write(
            dir.path(),
            DataSource::OneOneTwo,
            "112.json",
            r#"[
                {"현황별(1)": "경찰관서", "현황별(2)": "소계", "2021": 1},
                {"현황별(1)": "112신고", "현황별(2)": "소계", "2021": 50, "2022": 10, "2023": 70}
            ]"#,
        );

        let timeline = pipeline(dir.path()).timeline().await.unwrap();
        assert_eq!(timeline.five, "five_2024.json");
        assert_eq!(timeline.oneonetwo, "112.json");

        let scores: BTreeMap<u16, u8> = timeline.points.iter().map(|p| (p.year, p.score)).collect();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[&2021], 100);
        assert_eq!(scores[&2022], 0);
    }

    #[tokio::test]
    async fn timeline_without_call_data_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), DataSource::Five, "five.json", "[]");

        let err = pipeline(dir.path()).timeline().await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::DataUnavailable {
                dataset: DataSource::OneOneTwo,
                ..
            }
        ));
    }
}
