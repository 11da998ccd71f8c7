#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the risk map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the pipeline's report types to allow independent evolution of the
//! API contract.

use std::collections::BTreeMap;

use risk_map_district_models::AggregationMode;
use serde::{Deserialize, Serialize};

/// Response for the health check endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error body of every non-200 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

/// Query parameters for the risk score endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiskScoreQueryParams {
    /// `1` to include the debug payload.
    pub debug: Option<String>,
}

impl RiskScoreQueryParams {
    /// Whether the debug payload was requested.
    #[must_use]
    pub fn wants_debug(&self) -> bool {
        self.debug.as_deref() == Some("1")
    }
}

/// File names each scoring source was read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSources {
    /// Crime ledger files.
    pub crime: Vec<String>,
    /// Five-major-crime files.
    pub five: Vec<String>,
    /// Police-station files.
    pub policestation: Vec<String>,
}

/// Response of `GET /api/risk-score`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRiskScore {
    /// Source files read.
    pub sources: ApiSources,
    /// District id to score in `[0, 100]`, covering every district.
    pub scores: BTreeMap<String, u8>,
    /// `true` when `scores` are the base scores.
    pub fallback: bool,
    /// Present only when requested with `?debug=1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<ApiDebug>,
}

/// A rejected parse strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiParseAttempt {
    /// Strategy name.
    pub strategy: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Debug payload of a risk score response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDebug {
    /// `adjusted`, `upstreamFailure`, or `parseFailure`.
    pub outcome: String,
    /// Aggregation policy used.
    pub mode: AggregationMode,
    /// Upstream HTTP status, when the model call failed with one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Upstream error body, truncated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
    /// Model output, truncated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Rejected parse strategies, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parse_attempts: Vec<ApiParseAttempt>,
    /// Final minus base score per district.
    pub deltas: BTreeMap<String, i16>,
    /// Districts the model omitted, which kept their base score.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filled_from_base: Vec<String>,
    /// Ids returned by the model that are not districts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignored_ids: Vec<String>,
}

/// Files the timeline was computed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiTimelineSources {
    /// Five-major-crime file.
    pub five: String,
    /// 112 call file.
    pub oneonetwo: String,
}

/// Fusion weights of the timeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ApiTimelineWeights {
    /// Five-major-crime weight.
    pub five: f64,
    /// 112 call weight.
    pub oneonetwo: f64,
}

/// One year of the city-wide trend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTimelinePoint {
    /// Calendar year.
    pub year: u16,
    /// Score in `[0, 100]`.
    pub score: u8,
    /// City five-major-crime total.
    pub five_total: f64,
    /// City 112 call total.
    pub oneonetwo_total: f64,
}

/// Response of `GET /api/risk-timeline`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiTimeline {
    /// Files used.
    pub sources: ApiTimelineSources,
    /// Fusion weights.
    pub weights: ApiTimelineWeights,
    /// Points, oldest year first.
    pub points: Vec<ApiTimelinePoint>,
}
