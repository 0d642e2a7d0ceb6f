//! Enumerates the test matrix: every template, crossed with every format, crossed with every topic variant.
use std::path::{Path, PathBuf};

use crate::errors::{FsError, MatrixError};
use crate::format::SerFormat;
use crate::identity::{TestIdentity, TestLayout};
use crate::parameters::{Parameters, TopicVariant};

/// One (template, format, topic variant) triple, with its names and paths already worked out.
#[derive(Clone, Debug)]
pub struct MatrixEntry {
    pub template: PathBuf,
    pub format: SerFormat,
    pub variant: TopicVariant,
    pub identity: TestIdentity,
    pub layout: TestLayout,
}

impl MatrixEntry {
    pub fn new(
        gen_root: &Path,
        template: &Path,
        format: SerFormat,
        variant: &TopicVariant,
    ) -> MatrixEntry {
        let identity = TestIdentity::derive(template, format, variant);
        let layout = TestLayout::new(gen_root, &identity);
        MatrixEntry {
            template: template.to_path_buf(),
            format,
            variant: variant.clone(),
            identity,
            layout,
        }
    }
}

impl std::fmt::Display for MatrixEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (template {}, format {}, topics {})",
            self.identity.test_name,
            self.template.display(),
            self.format,
            self.variant.name
        )
    }
}

/// Templates in the template directory, sorted by path.
pub fn discover_templates(params: &Parameters) -> Result<Vec<PathBuf>, FsError> {
    if !params.template_dir.is_dir() {
        return Err(FsError::new(
            "list templates in",
            &params.template_dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "template directory does not exist"),
        ));
    }

    crate::workspace::files_matching(&params.template_dir, &params.template_glob)
}

/// Cross the given templates with the formats and topic variants of the table.
///
/// Order is template, then format, then variant, each in the order given.  Fails if any two triples would produce the
/// same test name, since they would then overwrite each other's output.
pub fn expand_matrix(
    params: &Parameters,
    templates: &[PathBuf],
) -> Result<Vec<MatrixEntry>, MatrixError> {
    use itertools::Itertools;

    let entries = templates
        .iter()
        .cartesian_product(params.formats.iter())
        .cartesian_product(params.topic_variants.iter())
        .map(|((template, format), variant)| {
            MatrixEntry::new(&params.gen_root, template, *format, variant)
        })
        .collect::<Vec<_>>();

    let groups = entries
        .iter()
        .map(|e| e.identity.test_name.as_str())
        .sorted()
        .group_by(|name| *name);
    let duplicates = groups
        .into_iter()
        .filter_map(|(name, group)| (group.count() > 1).then(|| name.to_string()))
        .collect::<Vec<_>>();

    if !duplicates.is_empty() {
        return Err(MatrixError::DuplicateTests(duplicates));
    }

    Ok(entries)
}

/// Discover templates and build the full matrix.
pub fn build_matrix(params: &Parameters) -> Result<Vec<MatrixEntry>, MatrixError> {
    let templates = discover_templates(params)?;
    if templates.is_empty() {
        log::warn!(
            "No templates matching {} in {}",
            params.template_glob,
            params.template_dir.display()
        );
    }
    expand_matrix(params, &templates)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::parameters::RawParameters;

    fn params() -> Parameters {
        Parameters::from_raw(RawParameters::default()).unwrap()
    }

    #[test]
    fn test_count_and_order() {
        let params = params();
        let templates = vec![PathBuf::from("Bar.tt"), PathBuf::from("Foo.tt")];
        let entries = expand_matrix(&params, &templates).unwrap();

        assert_eq!(entries.len(), 2 * 5 * 2);
        let names = entries
            .iter()
            .take(4)
            .map(|e| e.identity.test_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "BarTogetherAsAvro",
                "BarSeparateAsAvro",
                "BarTogetherAsCbor",
                "BarSeparateAsCbor"
            ]
        );
        assert_eq!(
            entries.last().unwrap().identity.test_name,
            "FooSeparateAsProto3"
        );
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let params = params();
        let templates = vec![PathBuf::from("a/Foo.tt"), PathBuf::from("b/Foo.tt")];
        let err = expand_matrix(&params, &templates).unwrap_err();
        match err {
            MatrixError::DuplicateTests(names) => {
                assert_eq!(names.len(), 10);
                assert!(names.contains(&"FooTogetherAsJson".to_string()));
            }
            e => panic!("Unexpected error {e}"),
        }
    }

    #[test]
    fn test_discover_templates() {
        let tmp = tempfile::tempdir().unwrap();
        let mut raw = RawParameters::default();
        raw.template_dir = tmp.path().to_path_buf();
        let params = Parameters::from_raw(raw).unwrap();

        std::fs::write(tmp.path().join("Foo.tt"), b"").unwrap();
        std::fs::write(tmp.path().join("Bar.tt"), b"").unwrap();
        std::fs::write(tmp.path().join("README.md"), b"").unwrap();

        let templates = discover_templates(&params).unwrap();
        assert_eq!(
            templates,
            vec![tmp.path().join("Bar.tt"), tmp.path().join("Foo.tt")]
        );
        assert_eq!(build_matrix(&params).unwrap().len(), 20);
    }

    #[test]
    fn test_missing_template_dir() {
        let mut raw = RawParameters::default();
        raw.template_dir = PathBuf::from("/definitely/not/here");
        let params = Parameters::from_raw(raw).unwrap();
        assert!(matches!(
            build_matrix(&params),
            Err(MatrixError::Templates(_))
        ));
    }
}
