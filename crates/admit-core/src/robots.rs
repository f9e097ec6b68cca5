//! Robots policy for the listing site.
//!
//! A fixed deny-list mirrored from the site's `robots.txt`. Matching is a
//! plain substring test so the same predicate works on paths and full URLs.

/// Paths the site disallows for automated clients.
pub const DISALLOWED_PATHS: &[&str] = &["/cgi-bin/", "/index-ad-test.php"];

/// Deny-list consulted before every outbound page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsPolicy {
    disallowed: Vec<String>,
}

impl Default for RobotsPolicy {
    fn default() -> Self {
        Self::new(DISALLOWED_PATHS.iter().copied())
    }
}

impl RobotsPolicy {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            disallowed: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the path or URL contains any disallowed pattern.
    pub fn is_disallowed(&self, path_or_url: &str) -> bool {
        self.disallowed
            .iter()
            .any(|pattern| path_or_url.contains(pattern.as_str()))
    }

    pub fn is_allowed(&self, path_or_url: &str) -> bool {
        !self.is_disallowed(path_or_url)
    }

    pub fn patterns(&self) -> &[String] {
        &self.disallowed
    }
}
