#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Language model side of the risk pipeline.
//!
//! [`prompt`] turns the base scores into an instruction block, a
//! [`providers::LlmProvider`] sends it to a chat-completion endpoint, and
//! [`parse`] extracts a district score map from whatever text comes back.
//! Any `OpenAI`-compatible server works via the `AI_BASE_URL` environment
//! variable.

pub mod parse;
pub mod prompt;
pub mod providers;

use thiserror::Error;

/// Errors that can occur while talking to a model.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The endpoint answered with a non-success status.
    #[error("Upstream returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

impl AiError {
    /// HTTP status of the failed call, when the endpoint answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
