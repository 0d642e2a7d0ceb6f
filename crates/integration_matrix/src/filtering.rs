use regex::bytes as regex;

use crate::errors::ConfigError;
use crate::matrix::MatrixEntry;

/// Given a string representing a glob pattern, return a regular expression which can match it.
pub fn compile_glob(glob: &str) -> Result<regex::Regex, ConfigError> {
    let invalid = |source| ConfigError::InvalidGlob {
        pattern: glob.to_string(),
        source,
    };

    let parsed_glob = globset::Glob::new(glob).map_err(invalid)?;
    // globset guarantees that the regex it hands out is valid.
    let r = regex::Regex::new(parsed_glob.regex())
        .expect("globset should always produce a valid regular expression");
    Ok(r)
}

/// Restricts a run to the tests whose names match a glob, e.g. `*AsProto*` or `Counter*`.
#[derive(Debug, Default)]
pub struct TestFilter {
    glob: Option<regex::Regex>,
}

impl TestFilter {
    pub fn new(pattern: Option<&str>) -> Result<TestFilter, ConfigError> {
        Ok(TestFilter {
            glob: pattern.map(compile_glob).transpose()?,
        })
    }

    pub fn matches(&self, test_name: &str) -> bool {
        self.glob
            .as_ref()
            .map(|g| g.is_match(test_name.as_bytes()))
            .unwrap_or(true)
    }

    /// Get an iterator over the entries which match this filter.
    pub fn apply<'a>(
        &'a self,
        entries: &'a [MatrixEntry],
    ) -> impl Iterator<Item = &'a MatrixEntry> + 'a {
        entries
            .iter()
            .filter(move |e| self.matches(&e.identity.test_name))
    }
}
