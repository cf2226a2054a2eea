//! Error types and utilities for the transit-route toolkit
//!
//! Provides the shared error enum and fuzzy matching for stop-name
//! suggestions at the query boundary.

use std::fmt;
use strsim::{jaro_winkler, normalized_levenshtein};

/// Minimum combined score for a fuzzy suggestion to be offered.
///
/// Below this, a suggestion is more likely to confuse than to help
/// ("did you mean 'Airport'?" for input "xyzzy").
const SUGGESTION_THRESHOLD: f64 = 0.72;

/// Find the closest known name to a (presumably misspelled) input.
///
/// Returns `None` when the input matches a candidate exactly
/// (case-insensitively) — the caller's lookup failed for another reason
/// and a suggestion would be noise — or when nothing scores above the
/// threshold.
pub fn suggest_closest<'a, I>(input: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let input_lower = input.to_lowercase();

    let mut best_score = 0.0f64;
    let mut best_match: Option<&str> = None;

    for candidate in candidates {
        let candidate_lower = candidate.to_lowercase();

        if candidate_lower == input_lower {
            return None;
        }

        // Jaro-Winkler favors shared prefixes (good for truncated input),
        // normalized Levenshtein penalizes length mismatch; the blend is
        // more robust than either alone.
        let jw = jaro_winkler(&input_lower, &candidate_lower);
        let lev = normalized_levenshtein(&input_lower, &candidate_lower);
        let mut score = 0.6 * jw + 0.4 * lev;

        if candidate_lower.starts_with(&input_lower) || input_lower.starts_with(&candidate_lower) {
            score += 0.15;
        }

        if score >= SUGGESTION_THRESHOLD && score > best_score {
            best_score = score;
            best_match = Some(candidate);
        }
    }

    best_match.map(str::to_string)
}

/// Main error type for transit-route operations
#[derive(Debug)]
pub enum Error {
    /// Stop name not present in the network snapshot
    UnknownStop {
        name: String,
        suggestion: Option<String>,
    },

    /// Invalid configuration or network description
    InvalidInput(String),

    /// File I/O error
    IoError(std::io::Error),
}

impl Error {
    /// Build an `UnknownStop` with a fuzzy suggestion from the known names
    pub fn unknown_stop<'a, I>(name: &str, known: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Error::UnknownStop {
            name: name.to_string(),
            suggestion: suggest_closest(name, known),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownStop { name, suggestion } => match suggestion {
                Some(s) => {
                    write!(f, "Stop '{name}' is not in the network (did you mean '{s}'?)")
                }
                None => write!(f, "Stop '{name}' is not in the network"),
            },
            Error::InvalidInput(msg) => {
                write!(f, "Invalid input: {msg}")
            }
            Error::IoError(err) => {
                write!(f, "I/O error: {err}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

/// Convenience result type for transit-route operations
pub type Result<T> = std::result::Result<T, Error>;
