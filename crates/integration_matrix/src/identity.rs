//! Naming and layout of one generated test.
//!
//! Both the generation and the execution drivers get their names and paths from here and nowhere else.  If the two
//! ever disagreed, execution would quietly point at a directory that generation never wrote.
use std::path::{Path, PathBuf};

use crate::format::SerFormat;
use crate::parameters::TopicVariant;

/// Identifiers of the service test produced by one (template, format, topic variant) triple.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TestIdentity {
    /// Template base name plus topic variant, e.g. `FooTogether`.
    pub service_name: String,

    /// e.g. `FooTogetherAsJson`.  Also the name of the test's output directory.
    pub test_name: String,

    /// DTDL model id, e.g. `dtmi:jsonTest:FooTogether;1`.
    pub model_id: String,

    /// Namespace derived from the model id, e.g. `dtmi_jsonTest_FooTogether__1`.  Used as a folder name by every
    /// generator.
    pub namespace: String,
}

/// The template's file name without its final extension: `templates/Foo.tt` becomes `Foo`.
pub fn template_base_name(template: &Path) -> String {
    template
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl TestIdentity {
    pub fn derive(template: &Path, format: SerFormat, variant: &TopicVariant) -> TestIdentity {
        let service_name = format!("{}{}", template_base_name(template), variant.name);
        let format_name = format.as_str();

        TestIdentity {
            test_name: format!("{service_name}As{}", format.capitalized()),
            model_id: format!("dtmi:{format_name}Test:{service_name};1"),
            namespace: format!("dtmi_{format_name}Test_{service_name}__1"),
            service_name,
        }
    }
}

/// Where everything for one test lives, under `<gen_root>/<test_name>/`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestLayout {
    pub test_root: PathBuf,
    pub model_dir: PathBuf,
    pub model_path: PathBuf,
    pub schemas_dir: PathBuf,

    /// `schemas/<namespace>`, where the schema generator puts this test's schemas.
    pub namespace_schemas_dir: PathBuf,

    /// `schemas/<namespace>/<service_name>.annex.json`.
    pub annex_path: PathBuf,

    /// `dotnet/library`.
    pub lib_path: PathBuf,

    /// `dotnet/library/<namespace>`.
    pub lib_ns_path: PathBuf,

    /// `dotnet/standalone`, written by the test code generator and run by the execution driver.
    pub standalone_path: PathBuf,
    pub cases_dir: PathBuf,
}

impl TestLayout {
    pub fn new(gen_root: &Path, identity: &TestIdentity) -> TestLayout {
        let test_root = gen_root.join(&identity.test_name);
        let model_dir = test_root.join("model");
        let schemas_dir = test_root.join("schemas");
        let namespace_schemas_dir = schemas_dir.join(&identity.namespace);
        let lib_path = test_root.join("dotnet").join("library");

        TestLayout {
            model_path: model_dir.join(format!("{}.json", identity.test_name)),
            annex_path: namespace_schemas_dir.join(format!("{}.annex.json", identity.service_name)),
            lib_ns_path: lib_path.join(&identity.namespace),
            standalone_path: test_root.join("dotnet").join("standalone"),
            cases_dir: test_root.join("cases"),
            model_dir,
            schemas_dir,
            namespace_schemas_dir,
            lib_path,
            test_root,
        }
    }
}
