//! Stream path matching.
//!
//! # Responsibilities
//! - Percent-decode the request path
//! - Strip the configuration segment
//! - Extract kind, id, season and episode from the remainder
//!
//! # Grammar
//! ```text
//! /stream/(movie|series)/tt<digits>{7,}(:<digits>+:<digits>+)?.json
//! ```
//!
//! # Design Decisions
//! - Hand-written parser, anchored at both ends
//! - Season and episode are optional together, never one without the other
//! - Errors carry the path with the configuration segment removed, so the
//!   opaque token never reaches a log line or a response

use thiserror::Error;

/// Minimum number of digits in a content id after the `tt` prefix.
pub const MIN_ID_DIGITS: usize = 7;

/// Top-level segments that can follow a configuration segment.
const CONFIGURED_ROUTES: [&str; 3] = ["stream", "configure", "manifest.json"];

/// Fields extracted from a well-formed stream path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch {
    pub kind: String,
    pub id: String,
    pub season: Option<String>,
    pub episode: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The path does not follow the stream grammar. `path` is redacted.
    #[error("malformed stream path: {path}")]
    Malformed { path: String },
}

/// Match a request path against the stream grammar.
///
/// `path` is the raw (still percent-encoded) request path and
/// `config_segment` the decoded configuration segment that prefixes it.
pub fn match_stream_path(path: &str, config_segment: &str) -> Result<PathMatch, PathError> {
    let prefix = format!("/{config_segment}");

    let decoded = match urlencoding::decode(path) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => {
            return Err(PathError::Malformed {
                path: redact_path(path),
            })
        }
    };

    let malformed = || PathError::Malformed {
        path: decoded.replacen(&prefix, "", 1),
    };

    let rest = decoded.strip_prefix(&prefix).ok_or_else(malformed)?;
    parse_stream_suffix(rest).ok_or_else(malformed)
}

/// Parse `/stream/<kind>/tt<id>[:<season>:<episode>].json`.
fn parse_stream_suffix(input: &str) -> Option<PathMatch> {
    let mut cursor = Cursor::new(input);

    cursor.eat("/stream/")?;
    let kind = if cursor.eat("movie/").is_some() {
        "movie"
    } else if cursor.eat("series/").is_some() {
        "series"
    } else {
        return None;
    };

    cursor.eat("tt")?;
    let id = cursor.digits();
    if id.len() < MIN_ID_DIGITS {
        return None;
    }

    let (season, episode) = if cursor.eat(":").is_some() {
        let season = cursor.non_empty_digits()?;
        cursor.eat(":")?;
        let episode = cursor.non_empty_digits()?;
        (Some(season.to_string()), Some(episode.to_string()))
    } else {
        (None, None)
    };

    cursor.eat(".json")?;
    if !cursor.is_empty() {
        return None;
    }

    Some(PathMatch {
        kind: kind.to_string(),
        id: id.to_string(),
        season,
        episode,
    })
}

/// Replace a leading configuration segment with a placeholder.
///
/// Used for anything that records request paths (trace spans, warnings).
/// Paths that cannot carry a configuration are returned unchanged.
pub fn redact_path(path: &str) -> String {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let mut parts = trimmed.splitn(3, '/');
    let first = parts.next().unwrap_or_default();
    let second = parts.next();

    match second {
        Some(route) if !first.is_empty() && CONFIGURED_ROUTES.contains(&route) => {
            match parts.next() {
                Some(tail) => format!("/<config>/{route}/{tail}"),
                None => format!("/<config>/{route}"),
            }
        }
        _ => path.to_string(),
    }
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    fn eat(&mut self, literal: &str) -> Option<()> {
        self.rest = self.rest.strip_prefix(literal)?;
        Some(())
    }

    fn digits(&mut self) -> &'a str {
        let end = self
            .rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest.len());
        let (digits, rest) = self.rest.split_at(end);
        self.rest = rest;
        digits
    }

    fn non_empty_digits(&mut self) -> Option<&'a str> {
        let digits = self.digits();
        (!digits.is_empty()).then_some(digits)
    }

    fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }
}
