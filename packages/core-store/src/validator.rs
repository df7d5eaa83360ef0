//! Stock validators.

use crate::path::normalize;
use crate::Validator;

/// Accepts buckets at or below any of a fixed set of prefixes.
///
/// Prefixes are normalized on construction and matched as plain string
/// prefixes: `"x"` accepts `"x"`, `"x/y"` and `"xpath"`. The match is not
/// segment-aware; use [`is_descendant`](crate::is_descendant) for a check on
/// whole path segments.
#[derive(Debug, Clone, Default)]
pub struct PrefixValidator {
    prefixes: Vec<String>,
}

impl PrefixValidator {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            prefixes: prefixes.into_iter().map(|p| normalize(p.as_ref())).collect(),
        }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl Validator for PrefixValidator {
    fn is_valid(&self, bucket: &str) -> bool {
        self.prefixes.iter().any(|p| bucket.starts_with(p.as_str()))
    }
}
