//! Route template parsing and url matching.
//!
//! A route template is split on `/`; each non-empty piece is either literal
//! text or a `:name` parameter. Matching requires equal segment counts and
//! literal equality at every text position; parameters bind positionally by
//! name. No wildcard, optional-segment, or regex support.

use crate::error::{Result, RetraceError};
use std::collections::HashMap;

/// One piece of a route template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteSegment {
    /// Literal text that must match the url segment exactly.
    Text(String),
    /// Named parameter binding the url segment at this position.
    Parameter(String),
}

/// A parsed route template such as `/person/:id/address`.
#[derive(Clone, Debug)]
pub struct RoutePattern {
    route_url: String,
    segments: Vec<RouteSegment>,
}

impl RoutePattern {
    /// Parses a route template. Empty pieces are ignored; `:name` pieces
    /// become parameters; everything else matches literally.
    pub fn parse(route_url: &str) -> Result<Self> {
        let mut segments = Vec::new();
        for piece in route_url.split('/') {
            let piece = piece.trim();
            if let Some(name) = piece.strip_prefix(':') {
                if name.is_empty() {
                    return Err(RetraceError::InvalidArgument(format!(
                        "route template {route_url:?} has an unnamed parameter segment"
                    )));
                }
                segments.push(RouteSegment::Parameter(name.to_string()));
            } else if !piece.is_empty() {
                segments.push(RouteSegment::Text(piece.to_string()));
            }
        }
        Ok(Self {
            route_url: route_url.to_string(),
            segments,
        })
    }

    /// The template this pattern was parsed from.
    pub fn route_url(&self) -> &str {
        &self.route_url
    }

    pub fn segments(&self) -> &[RouteSegment] {
        &self.segments
    }

    /// Matches a url against the template, returning the parameter bindings
    /// on success and `None` when the url does not match.
    pub fn match_url(&self, url: &str) -> Option<HashMap<String, String>> {
        let url_segments: Vec<&str> = url
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect();
        if url_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (url_segment, piece) in url_segments.iter().zip(&self.segments) {
            match piece {
                RouteSegment::Text(value) if value != url_segment => return None,
                RouteSegment::Text(_) => {}
                RouteSegment::Parameter(name) => {
                    params.insert(name.clone(), (*url_segment).to_string());
                }
            }
        }
        Some(params)
    }
}

/// Reduces an absolute http(s) url to its path so route matching sees the
/// same shape for absolute and relative urls. A host-only absolute url
/// reduces to `/`.
pub fn strip_origin(url: &str) -> &str {
    if !(url.starts_with("http:") || url.starts_with("https:")) {
        return url;
    }
    // the path starts at the first '/' past the scheme-and-authority prefix
    let start = 8.min(url.len());
    match url.get(start..).and_then(|rest| rest.find('/')) {
        Some(index) => &url[start + index..],
        None => "/",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_route_matches_and_binds() {
        let pattern = RoutePattern::parse("/person/:id").unwrap();
        let params = pattern.match_url("/person/42").unwrap();
        assert_eq!(params["id"], "42");
    }

    #[test]
    fn test_segment_count_mismatch() {
        let pattern = RoutePattern::parse("/person/:id").unwrap();
        assert!(pattern.match_url("/person/42/address").is_none());
        assert!(pattern.match_url("/person").is_none());
    }

    #[test]
    fn test_literal_mismatch() {
        let pattern = RoutePattern::parse("/person/:id").unwrap();
        assert!(pattern.match_url("/persons/42").is_none());
    }

    #[test]
    fn test_multiple_parameters() {
        let pattern = RoutePattern::parse("/person/:id/address/:line").unwrap();
        let params = pattern.match_url("/person/7/address/2").unwrap();
        assert_eq!(params["id"], "7");
        assert_eq!(params["line"], "2");
    }

    #[test]
    fn test_root_route() {
        let pattern = RoutePattern::parse("/").unwrap();
        assert!(pattern.match_url("/").is_some());
        assert!(pattern.match_url("/person").is_none());
    }

    #[test]
    fn test_unnamed_parameter_is_rejected() {
        assert!(RoutePattern::parse("/person/:").is_err());
    }

    #[test]
    fn test_strip_origin() {
        assert_eq!(strip_origin("/person/42"), "/person/42");
        assert_eq!(
            strip_origin("https://example.com/person/42"),
            "/person/42"
        );
        assert_eq!(strip_origin("http://example.com"), "/");
    }
}
