//! Configuration for a metadata-carrying filesystem.
//!
//! Configurations are JSON objects like:
//! ```json
//! {"root": "/srv/data"}
//! {"root": "/srv/data", "validator": {"type": "always"}}
//! {"root": "/srv/data", "validator": {"type": "prefix", "prefixes": ["docs", "img"]}}
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use metafile_core_store::{PrefixValidator, Validator};
use serde::{Deserialize, Serialize};

use crate::filesystem::{FileKind, Filesystem};
use crate::Result;

/// How buckets the store has not seen yet are checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ValidatorConfig {
    /// Trust every path.
    Always,
    /// Accept paths that exist on the filesystem as a file or directory.
    #[default]
    Filesystem,
    /// Accept paths starting with one of the prefixes.
    Prefix { prefixes: Vec<String> },
}

impl ValidatorConfig {
    /// Build the validator this configuration describes for `fs`.
    ///
    /// Returns `None` for [`ValidatorConfig::Always`]: a store without a
    /// validator trusts every path.
    pub fn build<F>(&self, fs: &Arc<F>) -> Option<Box<dyn Validator>>
    where
        F: Filesystem + 'static,
    {
        match self {
            ValidatorConfig::Always => None,
            ValidatorConfig::Filesystem => Some(Box::new(StatValidator::new(Arc::clone(fs)))),
            ValidatorConfig::Prefix { prefixes } => Some(Box::new(PrefixValidator::new(prefixes))),
        }
    }
}

/// Configuration for [`MetaFs::from_config`](crate::MetaFs::from_config).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetaFsConfig {
    /// Directory the filesystem is rooted at.
    pub root: PathBuf,
    #[serde(default)]
    pub validator: ValidatorConfig,
}

impl MetaFsConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            validator: ValidatorConfig::default(),
        }
    }

    #[must_use]
    pub fn validator(mut self, validator: ValidatorConfig) -> Self {
        self.validator = validator;
        self
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Accepts buckets that exist on the filesystem as a regular file or a
/// directory.
pub struct StatValidator<F> {
    fs: Arc<F>,
}

impl<F> StatValidator<F> {
    pub fn new(fs: Arc<F>) -> Self {
        Self { fs }
    }
}

impl<F: Filesystem> Validator for StatValidator<F> {
    fn is_valid(&self, bucket: &str) -> bool {
        matches!(self.fs.kind(bucket), Ok(FileKind::File | FileKind::Dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OsFs;

    #[test]
    fn parse_minimal_config() {
        let config = MetaFsConfig::from_json(r#"{"root": "/srv/data"}"#).unwrap();
        assert_eq!(config, MetaFsConfig::new("/srv/data"));
        assert_eq!(config.validator, ValidatorConfig::Filesystem);
    }

    #[test]
    fn parse_validators() {
        let config =
            MetaFsConfig::from_json(r#"{"root": "r", "validator": {"type": "always"}}"#).unwrap();
        assert_eq!(config.validator, ValidatorConfig::Always);

        let config = MetaFsConfig::from_json(
            r#"{"root": "r", "validator": {"type": "prefix", "prefixes": ["docs"]}}"#,
        )
        .unwrap();
        assert_eq!(
            config.validator,
            ValidatorConfig::Prefix {
                prefixes: vec!["docs".to_string()]
            }
        );
    }

    #[test]
    fn bad_config_is_an_error() {
        let result = MetaFsConfig::from_json(r#"{"validator": {"type": "bogus"}}"#);
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = MetaFsConfig::new("/data").validator(ValidatorConfig::Prefix {
            prefixes: vec!["a".to_string(), "b".to_string()],
        });
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(MetaFsConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn stat_validator_checks_existence() {
        let dir = tempfile::tempdir().unwrap();
        let fs = Arc::new(OsFs::new(dir.path()));
        fs.create("present.txt").unwrap();
        fs.create_dir_all("folder").unwrap();

        let validator = ValidatorConfig::Filesystem.build(&fs).unwrap();
        assert!(validator.is_valid("present.txt"));
        assert!(validator.is_valid("folder"));
        assert!(validator.is_valid(""));
        assert!(!validator.is_valid("absent.txt"));
        assert!(!validator.is_valid("../escape"));
    }

    #[test]
    fn always_has_no_validator() {
        let dir = tempfile::tempdir().unwrap();
        let fs = Arc::new(OsFs::new(dir.path()));
        assert!(ValidatorConfig::Always.build(&fs).is_none());
    }
}
