//! Typed stream requests.
//!
//! # Responsibilities
//! - Promote matched path fields into a `StreamRequest`
//! - Enforce the per-kind season/episode rules
//!
//! # Design Decisions
//! - The enum tag decides which fields exist; a movie cannot carry an episode
//! - `build` is pure apart from a diagnostic log line on rejection

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the caller wants streams for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamRequest {
    Movie {
        id: String,
    },
    Series {
        id: String,
        season: String,
        episode: String,
    },
}

impl StreamRequest {
    /// Content kind as it appears in paths.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamRequest::Movie { .. } => "movie",
            StreamRequest::Series { .. } => "series",
        }
    }

    /// Numeric part of the content id.
    pub fn id(&self) -> &str {
        match self {
            StreamRequest::Movie { id } | StreamRequest::Series { id, .. } => id,
        }
    }

    /// Full addon content id, e.g. `tt0944947:3:10`.
    pub fn content_id(&self) -> String {
        match self {
            StreamRequest::Movie { id } => format!("tt{id}"),
            StreamRequest::Series {
                id,
                season,
                episode,
            } => format!("tt{id}:{season}:{episode}"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("series request is missing {missing}")]
    InvalidSeries { missing: &'static str },

    #[error("movie request carries season or episode")]
    InvalidMovie,

    #[error("unknown request kind: {0}")]
    InvalidKind(String),
}

/// Build a typed request from matched path fields.
pub fn build(
    kind: &str,
    id: &str,
    season: Option<&str>,
    episode: Option<&str>,
) -> Result<StreamRequest, RequestError> {
    let season = season.filter(|s| !s.is_empty());
    let episode = episode.filter(|e| !e.is_empty());

    match kind {
        "series" => match (season, episode) {
            (Some(season), Some(episode)) => Ok(StreamRequest::Series {
                id: id.to_string(),
                season: season.to_string(),
                episode: episode.to_string(),
            }),
            (season, episode) => {
                let missing = match (season, episode) {
                    (None, None) => "season and episode",
                    (None, Some(_)) => "season",
                    _ => "episode",
                };
                tracing::info!(
                    id = %id,
                    missing,
                    "Request type was series but season or episode was missing"
                );
                Err(RequestError::InvalidSeries { missing })
            }
        },
        "movie" => {
            if season.is_some() || episode.is_some() {
                tracing::info!(
                    id = %id,
                    season = ?season,
                    episode = ?episode,
                    "Request type was movie but season or episode was present"
                );
                return Err(RequestError::InvalidMovie);
            }
            Ok(StreamRequest::Movie { id: id.to_string() })
        }
        other => {
            tracing::info!(kind = %other, "Request type was invalid");
            Err(RequestError::InvalidKind(other.to_string()))
        }
    }
}
