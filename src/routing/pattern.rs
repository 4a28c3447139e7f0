//! Path templates: literal segments and `{name}` parameter segments.

use std::sync::Arc;

/// Split a path into its segments. Leading and trailing slashes are ignored, so `""` and `"/"`
/// have no segments and `/api/users/` equals `/api/users`.
pub fn split_segments(path: &str) -> Vec<&str> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

/// Join a base path and a relative pattern into one normalized absolute path.
/// e.g. ("/api/users", "/{id}") -> "/api/users/{id}", ("/api/users", "/") -> "/api/users"
pub fn join_paths(base: &str, relative: &str) -> String {
    let segments: Vec<&str> = split_segments(base)
        .into_iter()
        .chain(split_segments(relative))
        .collect();
    format!("/{}", segments.join("/"))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// `{identifier}` where identifier is one or more ASCII alphanumerics or underscores.
fn param_name(segment: &str) -> Option<&str> {
    let name = segment.strip_prefix('{')?.strip_suffix('}')?;
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(name)
}

#[derive(Clone, Debug)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
    param_names: Arc<[String]>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Self {
        let segments: Vec<Segment> = split_segments(raw)
            .into_iter()
            .map(|s| match param_name(s) {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();
        let param_names = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) => Some(name.clone()),
                Segment::Literal(_) => None,
            })
            .collect::<Vec<_>>()
            .into();
        PathPattern {
            raw: raw.to_string(),
            segments,
            param_names,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn param_names(&self) -> &Arc<[String]> {
        &self.param_names
    }

    /// Same segment count, literals equal, parameters bound to a non-empty segment.
    pub fn matches(&self, path_segments: &[&str]) -> bool {
        self.segments.len() == path_segments.len()
            && self
                .segments
                .iter()
                .zip(path_segments)
                .all(|(pattern, actual)| match pattern {
                    Segment::Literal(lit) => lit == actual,
                    Segment::Param(_) => !actual.is_empty(),
                })
    }

    /// Parameter values in left-to-right order. Only meaningful after `matches` returned true.
    pub fn extract(&self, path_segments: &[&str]) -> Vec<String> {
        self.segments
            .iter()
            .zip(path_segments)
            .filter(|(pattern, _)| matches!(pattern, Segment::Param(_)))
            .map(|(_, actual)| (*actual).to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_ignores_outer_slashes() {
        assert!(split_segments("").is_empty());
        assert!(split_segments("/").is_empty());
        assert_eq!(split_segments("/api/users/"), vec!["api", "users"]);
        assert_eq!(split_segments("/a//b"), vec!["a", "", "b"]);
    }

    #[test]
    fn parse_distinguishes_params_from_literals() {
        let p = PathPattern::parse("/api/{id}/x{y}/{}/{a-b}");
        assert_eq!(
            p.segments(),
            &[
                Segment::Literal("api".into()),
                Segment::Param("id".into()),
                Segment::Literal("x{y}".into()),
                Segment::Literal("{}".into()),
                Segment::Literal("{a-b}".into()),
            ]
        );
        assert_eq!(&p.param_names()[..], &["id".to_string()]);
    }

    #[test]
    fn params_reject_empty_segments() {
        let p = PathPattern::parse("/a/{id}/b");
        assert!(p.matches(&["a", "7", "b"]));
        assert!(!p.matches(&["a", "", "b"]));
        assert!(!p.matches(&["a", "7"]));
    }

    #[test]
    fn extract_is_left_to_right() {
        let p = PathPattern::parse("/orders/{orderId}/items/{itemId}");
        assert_eq!(p.extract(&["orders", "9", "items", "3"]), vec!["9", "3"]);
    }

    #[test]
    fn join_normalizes() {
        assert_eq!(join_paths("/api/users", "/"), "/api/users");
        assert_eq!(join_paths("/api/users", "/{id}"), "/api/users/{id}");
        assert_eq!(join_paths("/", "/api"), "/api");
        assert_eq!(join_paths("/", "/"), "/");
    }
}
