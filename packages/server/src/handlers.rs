//! HTTP handler functions for the risk map API.

use actix_web::{HttpResponse, web};
use risk_map_pipeline::{AdjustmentOutcome, PipelineError, RiskReport, TimelineReport};
use risk_map_server_models::{
    ApiDebug, ApiError, ApiHealth, ApiParseAttempt, ApiRiskScore, ApiSources, ApiTimeline,
    ApiTimelinePoint, ApiTimelineSources, ApiTimelineWeights, RiskScoreQueryParams,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/risk-score`
///
/// Scores every district, asking the configured model to refine the base
/// scores. Pass `?debug=1` to include the debug payload.
pub async fn risk_score(
    state: web::Data<AppState>,
    params: web::Query<RiskScoreQueryParams>,
) -> HttpResponse {
    let credential = (state.credential)(&state.pipeline.config().credential_var);

    match state.pipeline.run(credential.as_deref()).await {
        Ok(report) => HttpResponse::Ok().json(to_api_risk_score(report, params.wants_debug())),
        Err(e) => error_response(&e),
    }
}

/// `GET /api/risk-timeline`
///
/// Returns the city-wide yearly risk trend.
pub async fn risk_timeline(state: web::Data<AppState>) -> HttpResponse {
    match state.pipeline.timeline().await {
        Ok(timeline) => HttpResponse::Ok().json(to_api_timeline(timeline)),
        Err(e) => error_response(&e),
    }
}

fn error_response(e: &PipelineError) -> HttpResponse {
    let body = ApiError {
        error: e.to_string(),
    };

    match e {
        PipelineError::MissingCredential { .. } => {
            log::warn!("Rejecting request: {e}");
            HttpResponse::BadRequest().json(body)
        }
        PipelineError::DataUnavailable { .. } => {
            log::warn!("Rejecting request: {e}");
            HttpResponse::NotFound().json(body)
        }
        PipelineError::Dataset(_) | PipelineError::Ai(_) | PipelineError::Config(_) => {
            log::error!("Failed to compute risk scores: {e}");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn to_api_risk_score(report: RiskReport, include_debug: bool) -> ApiRiskScore {
    let debug = include_debug.then(|| {
        let diagnostics = report.diagnostics;
        let (status, message, response_text) = match &report.outcome {
            AdjustmentOutcome::UpstreamFailure {
                status,
                message,
                body,
            } => (*status, Some(message.clone()), body.clone()),
            AdjustmentOutcome::ParseFailure => (
                None,
                Some("Failed to parse model response".to_string()),
                None,
            ),
            AdjustmentOutcome::Adjusted | AdjustmentOutcome::Offline => (None, None, None),
        };

        ApiDebug {
            outcome: report.outcome.to_string(),
            mode: diagnostics.mode,
            status,
            message,
            response_text,
            content: diagnostics.content,
            parse_attempts: diagnostics
                .parse_attempts
                .into_iter()
                .map(|attempt| ApiParseAttempt {
                    strategy: attempt.strategy.to_string(),
                    reason: attempt.rejection.to_string(),
                })
                .collect(),
            deltas: diagnostics.deltas,
            filled_from_base: diagnostics.filled_from_base,
            ignored_ids: diagnostics.ignored,
        }
    });

    ApiRiskScore {
        sources: ApiSources {
            crime: report.sources.crime,
            five: report.sources.five,
            policestation: report.sources.policestation,
        },
        scores: report.scores.scores,
        fallback: report.scores.fallback,
        debug,
    }
}

fn to_api_timeline(timeline: TimelineReport) -> ApiTimeline {
    ApiTimeline {
        sources: ApiTimelineSources {
            five: timeline.five,
            oneonetwo: timeline.oneonetwo,
        },
        weights: ApiTimelineWeights {
            five: timeline.weights.five,
            oneonetwo: timeline.weights.oneonetwo,
        },
        points: timeline
            .points
            .into_iter()
            .map(|point| ApiTimelinePoint {
                year: point.year,
                score: point.score,
                five_total: point.five_total,
                oneonetwo_total: point.oneonetwo_total,
            })
            .collect(),
    }
}
